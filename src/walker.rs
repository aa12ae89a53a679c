//! Deterministic directory traversal.
//!
//! Uses the `ignore` crate's walker with every implicit filter turned off:
//! hidden files, `.gitignore` and friends are all visited. Entries of each
//! directory are yielded in file-name order, depth-first, so two walks over
//! an unchanged tree always agree.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop detected: {path}")]
    SymlinkLoop { path: PathBuf },
}

/// Entry from directory walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Full path: the root joined with the entry's relative path.
    pub path: PathBuf,
    /// Whether this is a regular file, or a symlink to one.
    pub is_file: bool,
}

/// Walk a directory tree in file-name order.
///
/// The root is validated up front; errors hit while descending are
/// yielded in place of the entry that failed. Symlinked directories are
/// not descended into, but a symlink to a regular file counts as a file.
///
/// # Examples
///
/// ```no_run
/// use srcmerge::walker::walk;
/// use std::path::Path;
///
/// for entry in walk(Path::new("."))?.flatten() {
///     println!("{}", entry.path.display());
/// }
/// # Ok::<(), srcmerge::walker::WalkError>(())
/// ```
pub fn walk(
    root: &Path,
) -> Result<impl Iterator<Item = Result<WalkEntry, WalkError>>, WalkError> {
    let metadata = std::fs::metadata(root).map_err(|e| io_error(root, e))?;
    if !metadata.is_dir() {
        return Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a: &OsStr, b: &OsStr| -> Ordering { a.cmp(b) });

    Ok(builder.build().map(|result| match result {
        Ok(entry) => {
            let is_file = match entry.file_type() {
                Some(ft) if ft.is_symlink() => symlink_to_file(entry.path()),
                Some(ft) => ft.is_file(),
                None => false,
            };
            trace!(path = %entry.path().display(), is_file, "walk entry");
            Ok(WalkEntry {
                path: entry.path().to_path_buf(),
                is_file,
            })
        }
        Err(e) => Err(convert_error(e, None)),
    }))
}

/// Whether a symlink resolves to a regular file. Dangling links do not.
fn symlink_to_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unresolvable symlink");
            false
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> WalkError {
    let path = path.to_path_buf();
    match source.kind() {
        std::io::ErrorKind::NotFound => WalkError::NotFound { path },
        std::io::ErrorKind::PermissionDenied => WalkError::PermissionDenied { path },
        _ => WalkError::Io { path, source },
    }
}

/// Flatten the `ignore` error wrappers down to a path and a cause.
fn convert_error(error: ignore::Error, path: Option<PathBuf>) -> WalkError {
    match error {
        ignore::Error::WithPath { path, err } => convert_error(*err, Some(path)),
        ignore::Error::WithDepth { err, .. } => convert_error(*err, path),
        ignore::Error::WithLineNumber { err, .. } => convert_error(*err, path),
        ignore::Error::Loop { child, .. } => WalkError::SymlinkLoop { path: child },
        ignore::Error::Io(source) => {
            io_error(&path.unwrap_or_else(|| PathBuf::from("<walk error>")), source)
        }
        other => WalkError::Io {
            path: path.unwrap_or_else(|| PathBuf::from("<walk error>")),
            source: std::io::Error::other(other.to_string()),
        },
    }
}
