// ABOUTME: Idempotent file synchronisation primitives for the build
// ABOUTME: Copy-if-different, recursive mirroring and the scoped compiler staging area

use crate::errors::{PackError, Result};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of mirroring a file or directory tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopySummary {
    /// Files and directories that did not exist before the copy
    pub created: Vec<PathBuf>,
    /// Files whose content was written
    pub copied: usize,
    /// Files left alone because the destination already matched
    pub unchanged: usize,
}

fn same_content(src: &Path, dest: &Path) -> Result<bool> {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(PackError::at(dest, e)),
    };
    let src_meta = fs::metadata(src).map_err(|e| PackError::at(src, e))?;
    if !dest_meta.is_file() || src_meta.len() != dest_meta.len() {
        return Ok(false);
    }
    let src_bytes = fs::read(src).map_err(|e| PackError::at(src, e))?;
    let dest_bytes = fs::read(dest).map_err(|e| PackError::at(dest, e))?;
    Ok(src_bytes == dest_bytes)
}

/// Create `dir` and any missing ancestors, recording each directory created
fn create_dir_tracked(dir: &Path, created: &mut Vec<PathBuf>) -> Result<()> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if path.as_os_str().is_empty() || path.exists() {
            break;
        }
        missing.push(path.to_path_buf());
        current = path.parent();
    }
    if missing.is_empty() {
        return Ok(());
    }
    // recorded before creating, outermost first, so a failure is still undone
    created.extend(missing.into_iter().rev());
    fs::create_dir_all(dir).map_err(|e| PackError::at(dir, e))?;
    Ok(())
}

fn copy_file_tracked(src: &Path, dest: &Path, summary: &mut CopySummary) -> Result<()> {
    if same_content(src, dest)? {
        debug!("Unchanged, skipping {:?}", dest);
        summary.unchanged += 1;
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        create_dir_tracked(parent, &mut summary.created)?;
    }
    let existed = dest.exists();
    fs::copy(src, dest).map_err(|e| PackError::at(src, e))?;
    if !existed {
        summary.created.push(dest.to_path_buf());
    }
    summary.copied += 1;
    Ok(())
}

/// Copy `src` to `dest` unless `dest` already holds identical bytes.
///
/// Returns whether the destination was written.
pub fn copy_file_if_different(src: &Path, dest: &Path) -> Result<bool> {
    let mut summary = CopySummary::default();
    copy_file_tracked(src, dest, &mut summary)?;
    Ok(summary.copied == 1)
}

/// Recursively mirror `src` onto `dest`, overwriting files that differ.
///
/// Files present only in `dest` are left in place. A file `src` is copied
/// like [`copy_file_if_different`].
pub fn copy_and_overwrite(src: &Path, dest: &Path) -> Result<CopySummary> {
    let mut summary = CopySummary::default();
    if !src.exists() {
        return Err(PackError::PathNotFoundError(src.to_path_buf()));
    }
    if src.is_file() {
        copy_file_tracked(src, dest, &mut summary)?;
        return Ok(summary);
    }

    create_dir_tracked(dest, &mut summary.created)?;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| PackError::UnknownError(e.to_string()))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            create_dir_tracked(&target, &mut summary.created)?;
        } else {
            copy_file_tracked(entry.path(), &target, &mut summary)?;
        }
    }
    debug!(
        "Mirrored {:?} to {:?} ({} copied, {} unchanged)",
        src, dest, summary.copied, summary.unchanged
    );
    Ok(summary)
}

/// Temporary inputs placed inside the stylesheet compiler's source tree.
///
/// Paths created through the area are removed again, deepest path first,
/// and files it overwrote get their original bytes back. Both happen in
/// [`StagingArea::cleanup`] or when the area is dropped. Every path is
/// recorded before it is written, so a copy that fails halfway is undone too.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    paths: Vec<PathBuf>,
    backups: Vec<(PathBuf, Vec<u8>)>,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: Vec::new(),
            backups: Vec::new(),
        }
    }

    /// Paths currently scheduled for removal
    pub fn staged_paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Pre-existing files that staging overwrote and will restore
    pub fn overwritten_paths(&self) -> Vec<&Path> {
        self.backups.iter().map(|(path, _)| path.as_path()).collect()
    }

    /// Schedule a path this build created for removal
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    fn back_up(&mut self, path: &Path) -> Result<()> {
        if self.backups.iter().any(|(saved, _)| saved == path) {
            return Ok(());
        }
        let original = fs::read(path).map_err(|e| PackError::at(path, e))?;
        debug!("Backing up {:?} before staging over it", path);
        self.backups.push((path.to_path_buf(), original));
        Ok(())
    }

    /// Copy a single file into the staging tree
    pub fn stage_file(&mut self, src: &Path, dest: &Path) -> Result<()> {
        if same_content(src, dest)? {
            debug!("Unchanged, skipping {:?}", dest);
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            create_dir_tracked(parent, &mut self.paths)?;
        }
        if dest.is_file() {
            self.back_up(dest)?;
        } else if !dest.exists() {
            self.paths.push(dest.to_path_buf());
        }
        fs::copy(src, dest).map_err(|e| PackError::at(src, e))?;
        Ok(())
    }

    /// Mirror a file or directory tree into the staging tree.
    ///
    /// Entries on the path to, or below, the staging root or `dest` are
    /// skipped, so a source directory holding the staging tree is never
    /// copied into itself.
    pub fn stage_tree(&mut self, src: &Path, dest: &Path) -> Result<()> {
        if !src.exists() {
            return Err(PackError::PathNotFoundError(src.to_path_buf()));
        }
        if src.is_file() {
            return self.stage_file(src, dest);
        }

        create_dir_tracked(dest, &mut self.paths)?;
        let root = self.root.clone();
        let target_root = dest.to_path_buf();
        let entries = WalkDir::new(src)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                let path = entry.path();
                !(overlaps(path, &root) || overlaps(path, &target_root))
            });
        for entry in entries {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| PackError::UnknownError(e.to_string()))?;
            let target = dest.join(relative);
            if entry.file_type().is_dir() {
                create_dir_tracked(&target, &mut self.paths)?;
            } else {
                self.stage_file(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    /// Remove created paths deepest first, then restore overwritten files
    fn unwind(&mut self) -> Option<PackError> {
        let mut first_error = None;
        let mut paths = std::mem::take(&mut self.paths);
        paths.sort();
        paths.dedup();
        paths.reverse();
        for path in paths {
            if let Err(e) = remove_staged(&path) {
                warn!("Failed to remove temporary path {:?}: {}", path, e);
                first_error.get_or_insert(e);
            }
        }
        for (path, original) in std::mem::take(&mut self.backups) {
            debug!("Restoring {:?}", path);
            if let Err(e) = fs::write(&path, &original) {
                warn!("Failed to restore {:?}: {}", path, e);
                first_error.get_or_insert(PackError::at(&path, e));
            }
        }
        first_error
    }

    /// Undo everything staged, reporting the first failure
    pub fn cleanup(mut self) -> Result<()> {
        match self.unwind() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        // failures were already logged
        let _ = self.unwind();
    }
}

/// Whether one path lies inside the other
fn overlaps(path: &Path, other: &Path) -> bool {
    path.starts_with(other) || other.starts_with(path)
}

fn remove_staged(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(PackError::at(path, e)),
    };
    debug!("Deleting temporary path {:?}", path);
    if meta.is_dir() {
        match fs::remove_dir(path) {
            Ok(()) => Ok(()),
            // still holds files this build did not create
            Err(_) if fs::read_dir(path).map(|mut d| d.next().is_some()).unwrap_or(false) => {
                warn!("Leaving non-empty directory {:?} in place", path);
                Ok(())
            }
            Err(e) => Err(PackError::at(path, e)),
        }
    } else {
        fs::remove_file(path).map_err(|e| PackError::at(path, e))
    }
}
