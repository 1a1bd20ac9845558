// ABOUTME: Utility functions for the revealpack build
// ABOUTME: Path validation, directory creation and display-name helpers

use crate::errors::{PackError, Result};
use std::path::{Path, PathBuf};

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PackError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(PackError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PackError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(PackError::ValidationError(format!(
            "Path is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| PackError::at(path, e))?;
    } else if !path.is_dir() {
        return Err(PackError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory_exists(parent)?;
        }
    }
    Ok(())
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        PackError::ValidationError(format!("Failed to get absolute path for {:?}: {}", path, e))
    })
}

/// File name of a path as an owned string, empty when there is none
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Capitalise the first letter of every word and lowercase the rest.
///
/// A word is a run of alphabetic characters, so `"intro-to_rust 2"` becomes
/// `"Intro-To_Rust 2"`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            result.push(c);
            previous_is_alpha = false;
        }
    }
    result
}
