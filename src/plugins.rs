// ABOUTME: Plugin and library copying for the revealpack build
// ABOUTME: Mirrors reveal.js plugins, shared libraries and custom scripts/CSS into the build

use crate::config::{BuildPaths, Config};
use crate::errors::Result;
use crate::fsync;
use crate::utils;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// One plugin to publish: where it is cached and where it goes in the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCopy {
    pub name: String,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Map every declared plugin to its source and target directories.
///
/// Built-in plugins come from the framework's `plugin` directory under their
/// own name. External plugins come from `cached/{name}-{version}` and land
/// under their alias, or their name when no alias is declared.
pub fn plan_plugins(config: &Config, paths: &BuildPaths) -> Vec<PluginCopy> {
    let plugins = &config.packages.reveal_plugins;
    let framework_plugins = paths.framework_root.join("plugin");

    let built_in = plugins.built_in.iter().map(|name| PluginCopy {
        name: name.clone(),
        source: framework_plugins.join(name),
        target: paths.build_plugin.join(name),
    });
    let external = plugins.external.iter().map(|(name, plugin)| PluginCopy {
        name: name.clone(),
        source: paths.cached.join(plugin.cached_dir_name(name)),
        target: paths.build_plugin.join(plugin.target_dir_name(name)),
    });
    built_in.chain(external).collect()
}

/// Copy plugins to `{build}/src/plugin`, warning about any that are missing
pub fn copy_plugins(config: &Config, paths: &BuildPaths) -> Result<Vec<PluginCopy>> {
    info!("Copying plugins...");
    utils::ensure_directory_exists(&paths.build_plugin)?;

    let mut copied = Vec::new();
    for plugin in plan_plugins(config, paths) {
        if plugin.source.exists() {
            fsync::copy_and_overwrite(&plugin.source, &plugin.target)?;
            copied.push(plugin);
        } else {
            warn!(
                "Plugin {} not found in source directory {:?}.",
                plugin.name, plugin.source
            );
        }
    }
    info!("Plugins copied successfully.");
    Ok(copied)
}

/// Mirror the shared libraries directory into the build
pub fn copy_libraries(paths: &BuildPaths) -> Result<()> {
    info!("Copying libraries...");
    if !paths.libraries_source.is_dir() {
        error!(
            "Source directory for libraries not found: {:?}",
            paths.libraries_source
        );
        return Ok(());
    }
    fsync::copy_and_overwrite(&paths.libraries_source, &paths.libraries_target)?;
    info!("Libraries copied successfully.");
    Ok(())
}

/// Copy allow-listed files from `source_dir`, keeping only their file names
fn copy_allow_listed(kind: &str, items: &[String], source_dir: &Path, target_dir: &Path) -> Result<usize> {
    if items.is_empty() {
        info!("No {} provided.", kind);
        return Ok(0);
    }
    info!("Copying {}...", kind);
    let mut count = 0;
    for item in items {
        let source = source_dir.join(item);
        if !source.is_file() {
            warn!("Custom file {} not found in {:?}.", item, source_dir);
            continue;
        }
        let target = target_dir.join(utils::file_name_string(&source));
        fsync::copy_file_if_different(&source, &target)?;
        count += 1;
    }
    info!("{} copied successfully.", utils::title_case(kind));
    Ok(count)
}

/// Copy `custom_scripts` entries to `{build}/{libraries}/custom_scripts`
pub fn copy_custom_scripts(config: &Config, paths: &BuildPaths) -> Result<usize> {
    copy_allow_listed(
        "custom scripts",
        &config.custom_scripts,
        &paths.custom_scripts_dir,
        &paths.libraries_target.join("custom_scripts"),
    )
}

/// Copy `custom_css` entries to `{build}/src/css`
pub fn copy_custom_css(config: &Config, paths: &BuildPaths) -> Result<usize> {
    copy_allow_listed(
        "custom css",
        &config.custom_css,
        &paths.custom_css_dir,
        &paths.build_css,
    )
}
