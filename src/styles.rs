// ABOUTME: Stylesheet pipeline for the revealpack build
// ABOUTME: Compiles project styles and print styles and copies reveal.js dist files

use crate::compiler::StyleCompiler;
use crate::config::BuildPaths;
use crate::errors::{PackError, Result};
use crate::fsync::{self, StagingArea};
use crate::utils;
use log::info;
use std::path::{Path, PathBuf};

const STYLE_PATTERNS: [&str; 3] = ["*.scss", "*.sass", "*.css"];

/// Print stylesheets bundled with reveal.js, always compiled
pub const PRINT_STYLES: [&str; 2] = ["paper", "pdf"];

/// reveal.js distribution files and their location in the build
pub const FRAMEWORK_FILES: [(&str, &str); 6] = [
    ("dist/reset.css", "src/css/reset.css"),
    ("dist/reveal.css", "src/css/reveal.css"),
    ("dist/reveal.js", "src/reveal.js"),
    ("dist/reveal.js.map", "src/reveal.js.map"),
    ("dist/reveal.esm.js", "src/reveal.esm.js"),
    ("dist/reveal.esm.js.map", "src/reveal.esm.js.map"),
];

/// List the stylesheet sources in `dir`, sorted by file name
pub fn find_style_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for pattern in STYLE_PATTERNS {
        let pattern = format!("{}/{}", glob::Pattern::escape(&dir.to_string_lossy()), pattern);
        let entries = glob::glob(&pattern)
            .map_err(|e| PackError::ValidationError(format!("Invalid glob pattern: {}", e)))?;
        sources.extend(entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));
    }
    sources.sort_by_key(|path| utils::file_name_string(path));
    Ok(sources)
}

/// Compile the project's stylesheets from `assets/styles` into `{build}/src/css`.
///
/// Sources are staged into the framework's theme source tree so their
/// imports resolve against reveal.js, then removed again. Plain CSS is
/// copied through.
pub fn compile_styles(paths: &BuildPaths, compiler: &dyn StyleCompiler) -> Result<Vec<PathBuf>> {
    info!("Copying and compiling styles...");
    utils::ensure_directory_exists(&paths.build_css)?;

    if !paths.styles_dir.is_dir() {
        info!("No styles directory at {:?}, skipping.", paths.styles_dir);
        return Ok(Vec::new());
    }

    let mut staging = StagingArea::new(&paths.theme_compiler_root);
    let mut staged = Vec::new();
    for file in find_style_sources(&paths.styles_dir)? {
        let staged_path = paths.theme_compiler_root.join(utils::file_name_string(&file));
        info!("Copying {:?} to Reveal Theme Source for SASS compilation.", file);
        staging.stage_file(&file, &staged_path)?;
        staged.push(staged_path);
    }

    let mut outputs = Vec::new();
    for file in &staged {
        let target = paths
            .build_css
            .join(file.with_extension("css").file_name().unwrap_or_default());
        if file.extension().map(|ext| ext == "css").unwrap_or(false) {
            fsync::copy_file_if_different(file, &target)?;
        } else {
            info!("Compiling temporary SASS file '{}'...", utils::file_name_string(file));
            compiler.compile(file, &target)?;
        }
        outputs.push(target);
    }

    staging.cleanup()?;
    info!("Styles copied and compiled successfully.");
    Ok(outputs)
}

/// Compile reveal.js's paper and pdf print stylesheets into `{build}/src/css/print`
pub fn compile_print_styles(paths: &BuildPaths, compiler: &dyn StyleCompiler) -> Result<Vec<PathBuf>> {
    let source_dir = paths.framework_root.join("css").join("print");
    let target_dir = paths.build_css.join("print");
    utils::ensure_directory_exists(&target_dir)?;

    let mut outputs = Vec::new();
    for name in PRINT_STYLES {
        let target = target_dir.join(format!("{}.css", name));
        compiler.compile(&source_dir.join(format!("{}.scss", name)), &target)?;
        outputs.push(target);
    }
    Ok(outputs)
}

/// Copy the reveal.js runtime files into the build and compile its print styles
pub fn copy_framework(paths: &BuildPaths, compiler: &dyn StyleCompiler) -> Result<()> {
    info!("Copying Reveal.js files...");
    for (source, target) in FRAMEWORK_FILES {
        let source_path = paths.framework_root.join(source);
        utils::validate_file_exists(&source_path)?;
        fsync::copy_file_if_different(&source_path, &paths.build_root.join(target))?;
    }
    compile_print_styles(paths, compiler)?;
    info!("Reveal.js files copied successfully.");
    Ok(())
}
