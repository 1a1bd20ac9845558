// ABOUTME: Configuration module for the revealpack build
// ABOUTME: Loads config.json and resolves the directory layout into BuildPaths

use crate::errors::{PackError, Result};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file expected at the project root
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Project configuration, immutable for the duration of a build
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Free-form project metadata handed to the templates
    #[serde(default)]
    pub info: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub directories: Directories,
    #[serde(default)]
    pub packages: Packages,
    /// Theme reference: a file name, relative path or absolute path
    pub theme: String,
    #[serde(default)]
    pub highlight_theme: Option<String>,
    #[serde(default = "default_reveal_template")]
    pub reveal_template: String,
    #[serde(default = "default_toc_template")]
    pub toc_template: String,
    #[serde(default)]
    pub custom_scripts: Vec<String>,
    #[serde(default)]
    pub custom_css: Vec<String>,
    /// Log level used when RUST_LOG is not set
    #[serde(default)]
    pub logging: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Directories {
    #[serde(default = "default_build_dir")]
    pub build: String,
    #[serde(default)]
    pub source: SourceDirectories,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            build: default_build_dir(),
            source: SourceDirectories::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDirectories {
    #[serde(default = "default_source_root")]
    pub root: String,
    #[serde(default = "default_presentation_root")]
    pub presentation_root: String,
    #[serde(default = "default_libraries")]
    pub libraries: String,
}

impl Default for SourceDirectories {
    fn default() -> Self {
        Self {
            root: default_source_root(),
            presentation_root: default_presentation_root(),
            libraries: default_libraries(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packages {
    #[serde(default)]
    pub reveal_plugins: RevealPlugins,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevealPlugins {
    /// Plugins shipped inside the reveal.js distribution, by directory name
    #[serde(default)]
    pub built_in: Vec<String>,
    /// Separately downloaded plugins keyed by their declared name
    #[serde(default)]
    pub external: BTreeMap<String, ExternalPlugin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalPlugin {
    pub version: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ExternalPlugin {
    /// Directory name the plugin is cached under: `{name}-{version}`
    pub fn cached_dir_name(&self, name: &str) -> String {
        format!("{}-{}", name, self.version)
    }

    /// Directory name the plugin is published under in the build
    pub fn target_dir_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(name)
    }
}

fn default_build_dir() -> String {
    "prod".to_string()
}

fn default_source_root() -> String {
    "source".to_string()
}

fn default_presentation_root() -> String {
    "presentations".to_string()
}

fn default_libraries() -> String {
    "libraries".to_string()
}

fn default_reveal_template() -> String {
    "default.html".to_string()
}

fn default_toc_template() -> String {
    "toc_template.html".to_string()
}

impl Config {
    /// Load `config.json` from the project root
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(PackError::ConfigError(format!(
                "{} not found in {:?}",
                CONFIG_FILE_NAME, root
            )));
        }
        debug!("Reading configuration from {:?}", path);
        let content = fs::read_to_string(&path).map_err(|e| PackError::at(&path, e))?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a configuration document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| PackError::ConfigError(format!("{} is invalid: {}", CONFIG_FILE_NAME, e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.theme.trim().is_empty() {
            return Err(PackError::ConfigError("'theme' must not be empty".to_string()));
        }
        if self.directories.build.trim().is_empty() {
            return Err(PackError::ConfigError(
                "'directories.build' must not be empty".to_string(),
            ));
        }
        for (name, plugin) in &self.packages.reveal_plugins.external {
            if plugin.version.trim().is_empty() {
                return Err(PackError::ConfigError(format!(
                    "external plugin '{}' has no version",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Log filter to use when the environment does not set one
    pub fn log_level(&self) -> &str {
        self.logging.as_deref().unwrap_or("info")
    }
}

/// Every location the build reads from or writes to, resolved against the project root
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub source_root: PathBuf,
    pub presentation_root: PathBuf,
    pub libraries_source: PathBuf,
    pub libraries_target: PathBuf,
    /// Downloaded third-party packages (`{source}/cached`)
    pub cached: PathBuf,
    /// The vendored reveal.js tree
    pub framework_root: PathBuf,
    /// Where the framework expects theme sources to live for compilation
    pub theme_compiler_root: PathBuf,
    pub styles_dir: PathBuf,
    pub custom_scripts_dir: PathBuf,
    pub custom_css_dir: PathBuf,
    pub build_root: PathBuf,
    pub build_css: PathBuf,
    pub build_theme: PathBuf,
    pub build_plugin: PathBuf,
    pub reveal_template: PathBuf,
    pub toc_template: PathBuf,
}

impl BuildPaths {
    pub fn new(root: &Path, config: &Config) -> Self {
        let root = root.to_path_buf();
        let source = &config.directories.source;
        let source_root = root.join(&source.root);
        let build_root = root.join(&config.directories.build);
        let cached = source_root.join("cached");
        let framework_root = cached.join("reveal.js");
        let build_src = build_root.join("src");

        Self {
            presentation_root: source_root.join(&source.presentation_root),
            libraries_source: source_root.join(&source.libraries),
            libraries_target: build_root.join(&source.libraries),
            theme_compiler_root: framework_root.join("css").join("theme").join("source"),
            styles_dir: root.join("assets").join("styles"),
            custom_scripts_dir: root.join("custom_scripts"),
            custom_css_dir: root.join("custom_css"),
            build_css: build_src.join("css"),
            build_theme: build_src.join("theme"),
            build_plugin: build_src.join("plugin"),
            reveal_template: source_root.join(&config.reveal_template),
            toc_template: source_root.join(&config.toc_template),
            cached,
            framework_root,
            source_root,
            build_root,
            root,
        }
    }
}
