// ABOUTME: Stylesheet compiler interface for the revealpack build
// ABOUTME: Invokes an external Sass executable to turn SCSS/Sass sources into CSS

use crate::errors::{PackError, Result};
use crate::utils;
use log::{debug, info};
use std::env;
use std::path::Path;
use std::process::Command;

/// Default executable used to compile stylesheets
pub const DEFAULT_SASS_PROGRAM: &str = "sass";

/// Turns one stylesheet source into one CSS file
pub trait StyleCompiler {
    fn compile(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Compiles stylesheets by running the Dart Sass command-line tool
#[derive(Debug, Clone)]
pub struct SassCommand {
    pub program: String,
}

impl Default for SassCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_SASS_PROGRAM.to_string(),
        }
    }
}

impl SassCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `REVEALPACK_SASS` when set, otherwise `sass` from the PATH
    pub fn from_env() -> Self {
        match env::var("REVEALPACK_SASS") {
            Ok(program) if !program.trim().is_empty() => Self::new(program),
            _ => Self::default(),
        }
    }
}

impl StyleCompiler for SassCommand {
    fn compile(&self, source: &Path, destination: &Path) -> Result<()> {
        utils::validate_file_exists(source)?;
        utils::ensure_parent_directory_exists(destination)?;

        let mut command = Command::new(&self.program);
        command.arg("--no-source-map").arg(source).arg(destination);
        debug!("Running {:?}", command);

        let output = command.output().map_err(|e| PackError::CompileError {
            source_path: source.to_path_buf(),
            message: format!("failed to run '{}': {}", self.program, e),
        })?;
        if !output.status.success() {
            return Err(PackError::CompileError {
                source_path: source.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!("Compiled {:?} -> {:?}", source, destination);
        Ok(())
    }
}
