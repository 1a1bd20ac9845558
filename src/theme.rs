// ABOUTME: Theme resolution and compilation for the revealpack build
// ABOUTME: Locates the active theme, stages it for the compiler and emits theme CSS

use crate::compiler::StyleCompiler;
use crate::config::{BuildPaths, Config};
use crate::errors::{PackError, Result};
use crate::fsync::{self, StagingArea};
use crate::utils;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Highlight.js style used when the configuration names none
pub const DEFAULT_HIGHLIGHT_THEME: &str = "monokai";

const THEME_EXTENSIONS: [&str; 3] = ["scss", "sass", "css"];

/// Where the active theme came from, which decides how it is staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeOrigin {
    /// Already compiled CSS, copied through unchanged
    Precompiled,
    /// Lives inside the vendored reveal.js tree
    InFramework,
    /// A single theme file directly in the project root
    InProjectRoot,
    /// A theme file inside its own directory, staged together with its siblings
    Nested,
}

/// The single theme that is active for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeReference {
    pub path: PathBuf,
    pub origin: ThemeOrigin,
    /// `fonts` directory next to the theme file, when there is one
    pub fonts_dir: Option<PathBuf>,
}

impl ThemeReference {
    /// Classify a located theme file
    pub fn classify(path: &Path, paths: &BuildPaths) -> Self {
        let path = absolute_or_self(path);
        let framework_root = absolute_or_self(&paths.framework_root);
        let project_root = absolute_or_self(&paths.root);

        let origin = if has_extension(&path, "css") {
            ThemeOrigin::Precompiled
        } else if path.starts_with(&framework_root) {
            ThemeOrigin::InFramework
        } else if path.parent() == Some(project_root.as_path()) {
            ThemeOrigin::InProjectRoot
        } else {
            ThemeOrigin::Nested
        };

        let fonts_dir = path
            .parent()
            .map(|parent| parent.join("fonts"))
            .filter(|fonts| fonts.is_dir());

        Self {
            path,
            origin,
            fonts_dir,
        }
    }

    pub fn is_precompiled(&self) -> bool {
        self.origin == ThemeOrigin::Precompiled
    }

    pub fn file_name(&self) -> String {
        utils::file_name_string(&self.path)
    }

    /// Compiled theme location: `{build}/src/theme/{stem}.css`
    pub fn build_css_path(&self, paths: &BuildPaths) -> PathBuf {
        paths.build_theme.join(self.path.with_extension("css").file_name().unwrap_or_default())
    }

    /// The file handed to the stylesheet compiler
    pub fn compiler_input(&self, paths: &BuildPaths) -> PathBuf {
        match self.origin {
            ThemeOrigin::Precompiled | ThemeOrigin::InFramework => self.path.clone(),
            ThemeOrigin::InProjectRoot | ThemeOrigin::Nested => {
                paths.theme_compiler_root.join(self.file_name())
            }
        }
    }
}

/// Result of the theme stage
#[derive(Debug, Clone)]
pub struct CompiledTheme {
    pub theme: ThemeReference,
    pub css_path: PathBuf,
    pub highlight_css: Option<PathBuf>,
}

fn absolute_or_self(path: &Path) -> PathBuf {
    utils::get_absolute_path(path).unwrap_or_else(|_| path.to_path_buf())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Candidate file names for a theme reference without an extension
fn theme_file_candidates(base: &Path) -> Vec<PathBuf> {
    if base.extension().is_some() {
        return vec![base.to_path_buf()];
    }
    THEME_EXTENSIONS
        .iter()
        .map(|ext| base.with_extension(ext))
        .collect()
}

/// Find the configured theme file.
///
/// Checked in order: the reference as given (absolute, or relative to the
/// project root), relative to the source root, in the framework's theme
/// sources, and in the framework's precompiled themes.
pub fn locate_theme(config: &Config, paths: &BuildPaths) -> Option<PathBuf> {
    let theme = Path::new(config.theme.trim());
    let as_given = if theme.is_absolute() {
        theme.to_path_buf()
    } else {
        paths.root.join(theme)
    };
    let locations = [
        as_given,
        paths.source_root.join(theme),
        paths.theme_compiler_root.join(theme),
        paths.framework_root.join("dist").join("theme").join(theme),
    ];

    locations
        .iter()
        .flat_map(|location| theme_file_candidates(location))
        .inspect(|candidate| debug!("Looking for theme at {:?}", candidate))
        .find(|candidate| candidate.is_file())
}

/// Locate and classify the active theme, failing when it does not exist anywhere
pub fn resolve_theme(config: &Config, paths: &BuildPaths) -> Result<ThemeReference> {
    let path = locate_theme(config, paths).ok_or_else(|| PackError::ThemeNotFound(config.theme.clone()))?;
    Ok(ThemeReference::classify(&path, paths))
}

/// Find the optional highlight.js stylesheet.
///
/// Checked in order: the name as given, the framework's highlight plugin
/// styles, and the project root. A missing style is not an error.
pub fn resolve_highlight_style(config: &Config, paths: &BuildPaths) -> Option<PathBuf> {
    let name = config
        .highlight_theme
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_HIGHLIGHT_THEME);
    let mut highlight = PathBuf::from(name);
    if highlight.extension().is_none() {
        highlight.set_extension("css");
    }
    let file_name = highlight.file_name()?.to_owned();

    let as_given = if highlight.is_absolute() {
        highlight.clone()
    } else {
        paths.root.join(&highlight)
    };
    let candidates = [
        as_given,
        paths.framework_root.join("plugin").join("highlight").join(&file_name),
        paths.root.join(&file_name),
    ];
    candidates.into_iter().find(|candidate| candidate.is_file())
}

fn copy_fonts(fonts: &Path, paths: &BuildPaths, staging: Option<&mut StagingArea>) -> Result<()> {
    let fonts_in_build = paths.build_theme.join("fonts");
    info!("\tCopying fonts from {:?} to {:?}...", fonts, fonts_in_build);
    fsync::copy_and_overwrite(fonts, &fonts_in_build)?;
    if let Some(staging) = staging {
        let fonts_in_compiler = paths.theme_compiler_root.join("fonts");
        staging.stage_tree(fonts, &fonts_in_compiler)?;
    }
    Ok(())
}

/// Whether `dir` is the framework tree or one of its ancestors
fn contains_framework(dir: &Path, paths: &BuildPaths) -> bool {
    absolute_or_self(&paths.framework_root).starts_with(absolute_or_self(dir))
}

/// Stage the theme for compilation according to its origin
fn stage_theme(theme: &ThemeReference, paths: &BuildPaths, staging: &mut StagingArea) -> Result<()> {
    match theme.origin {
        ThemeOrigin::Precompiled => {
            warn!("\tProvided theme is a CSS file. It will not be parsed with Reveal.js dynamic variables.");
            fsync::copy_file_if_different(&theme.path, &theme.build_css_path(paths))?;
            if let Some(fonts) = &theme.fonts_dir {
                copy_fonts(fonts, paths, None)?;
            }
        }
        ThemeOrigin::InFramework => {
            info!("\tUsing reveal.js theme '{}'.", theme.file_name());
            if let Some(fonts) = &theme.fonts_dir {
                copy_fonts(fonts, paths, Some(&mut *staging))?;
            }
        }
        ThemeOrigin::InProjectRoot => {
            if let Some(fonts) = &theme.fonts_dir {
                copy_fonts(fonts, paths, Some(&mut *staging))?;
            }
            info!("\tUsing theme file {}.", theme.file_name());
            staging.stage_file(&theme.path, &theme.compiler_input(paths))?;
        }
        ThemeOrigin::Nested => {
            if let Some(fonts) = &theme.fonts_dir {
                copy_fonts(fonts, paths, Some(&mut *staging))?;
            }
            let theme_dir = theme.path.parent().unwrap_or(Path::new("."));
            if contains_framework(theme_dir, paths) {
                // the directory holds reveal.js itself, so only the file is staged
                info!("\tUsing theme file {} from {:?}.", theme.file_name(), theme_dir);
                staging.stage_file(&theme.path, &theme.compiler_input(paths))?;
            } else {
                info!(
                    "\tUsing theme file {} with contents of {:?}.",
                    theme.file_name(),
                    theme_dir
                );
                staging.stage_tree(theme_dir, &paths.theme_compiler_root)?;
            }
        }
    }
    Ok(())
}

/// Resolve, stage and compile the active theme into `{build}/src/theme`.
///
/// Staged copies inside the framework tree are removed before returning,
/// whether compilation succeeded or not.
pub fn compile_theme(
    config: &Config,
    paths: &BuildPaths,
    compiler: &dyn StyleCompiler,
) -> Result<CompiledTheme> {
    info!("Compiling theme...");
    utils::ensure_directory_exists(&paths.build_theme)?;

    let theme = resolve_theme(config, paths)?;
    info!("Copying theme '{}'...", theme.file_name());

    let mut staging = StagingArea::new(&paths.theme_compiler_root);
    stage_theme(&theme, paths, &mut staging)?;

    let highlight_css = match resolve_highlight_style(config, paths) {
        Some(source) => {
            let target = paths.build_theme.join(utils::file_name_string(&source));
            info!("Copying highlight style {:?} to {:?}", source, target);
            fsync::copy_file_if_different(&source, &target)?;
            Some(target)
        }
        None => {
            info!("No highlight style found, skipping.");
            None
        }
    };

    let css_path = theme.build_css_path(paths);
    if !theme.is_precompiled() {
        compiler.compile(&theme.compiler_input(paths), &css_path)?;
    }

    if !staging.staged_paths().is_empty() || !staging.overwritten_paths().is_empty() {
        info!("Removing temporary files from compiling theme.");
    }
    staging.cleanup()?;

    info!("Theme compiled successfully.");
    Ok(CompiledTheme {
        theme,
        css_path,
        highlight_css,
    })
}
