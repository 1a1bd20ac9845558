// ABOUTME: Build driver for revealpack
// ABOUTME: Runs every stage in order, from asset copying to the table of contents

use crate::compiler::StyleCompiler;
use crate::config::{BuildPaths, Config};
use crate::deck::{self, DeckOutcome};
use crate::errors::{PackError, Result};
use crate::html::TemplateRenderer;
use crate::plugins;
use crate::styles;
use crate::theme::{self, CompiledTheme};
use crate::toc::{self, TocEntry};
use crate::utils;
use log::{error, info};
use std::path::{Path, PathBuf};

/// What a build produced
#[derive(Debug)]
pub struct BuildReport {
    pub theme: CompiledTheme,
    pub decks: Vec<DeckOutcome>,
    pub toc_path: PathBuf,
}

impl BuildReport {
    pub fn failed_decks(&self) -> Vec<String> {
        self.decks
            .iter()
            .filter(|outcome| !outcome.is_ok())
            .map(|outcome| outcome.id.clone())
            .collect()
    }

    pub fn toc_entries(&self) -> Vec<TocEntry> {
        successful_entries(&self.decks)
    }

    /// Turn failed decks into an error once everything else has been written
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed_decks();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(PackError::DeckFailures(failed))
        }
    }
}

fn successful_entries(decks: &[DeckOutcome]) -> Vec<TocEntry> {
    decks
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().ok().cloned())
        .collect()
}

/// Run the full build for the project at `root`.
///
/// Stages run strictly in sequence since later stages reference files the
/// earlier ones write: libraries, plugins, custom files, styles, theme,
/// reveal.js files, decks, then the index page.
pub fn run_build(root: &Path, config: &Config, compiler: &dyn StyleCompiler) -> Result<BuildReport> {
    let paths = BuildPaths::new(root, config);
    info!("Building presentations from {:?} into {:?}", paths.source_root, paths.build_root);

    let renderer = TemplateRenderer::new(&paths.source_root);
    renderer.require(&paths.reveal_template)?;
    renderer.require(&paths.toc_template)?;
    utils::ensure_directory_exists(&paths.build_root)?;

    plugins::copy_libraries(&paths)?;
    plugins::copy_plugins(config, &paths)?;
    plugins::copy_custom_scripts(config, &paths)?;
    plugins::copy_custom_css(config, &paths)?;
    styles::compile_styles(&paths, compiler)?;
    let theme = theme::compile_theme(config, &paths, compiler)?;
    styles::copy_framework(&paths, compiler)?;

    let decks = deck::assemble_decks(config, &paths, &renderer)?;
    for outcome in decks.iter().filter(|outcome| !outcome.is_ok()) {
        error!("Skipped presentation {} in the table of contents", outcome.id);
    }
    let entries = successful_entries(&decks);
    let toc_path = toc::generate_toc(&entries, &paths.toc_template, &paths.build_root, &renderer, &config.info)?;

    info!(
        "Build finished: {} of {} presentation(s) generated.",
        entries.len(),
        decks.len()
    );
    Ok(BuildReport {
        theme,
        decks,
        toc_path,
    })
}
