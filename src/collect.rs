//! Collection of qualifying files.
//!
//! Walks the root, keeps the files the [`Filter`] accepts and reads each one
//! fully into memory. The result preserves discovery order.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::filter::Filter;
use crate::output::absolute;
use crate::walker::{walk, WalkError};

/// Errors that can occur while collecting files.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// A file read during collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Full path as discovered under the root.
    pub path: PathBuf,
    /// Entire file content.
    pub content: String,
}

/// Ordered mapping from path to content, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    files: Vec<CollectedFile>,
}

impl Collected {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file. Paths are unique per walk, so no lookup is done.
    pub fn insert(&mut self, path: PathBuf, content: String) {
        self.files.push(CollectedFile { path, content });
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectedFile> {
        self.files.iter()
    }

    /// Total content size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Collected {
    type Item = &'a CollectedFile;
    type IntoIter = std::slice::Iter<'a, CollectedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Collect every qualifying file under `root`.
///
/// `skip` names a path that is never collected even if it qualifies
/// (the output document when it lives inside the root).
///
/// # Examples
///
/// ```no_run
/// use srcmerge::collect::collect;
/// use srcmerge::filter::Filter;
/// use std::path::Path;
///
/// let filter = Filter::new(vec!["node_modules".into()], ".js");
/// let collected = collect(Path::new("./web"), &filter, None)?;
/// for file in &collected {
///     println!("{} ({} bytes)", file.path.display(), file.content.len());
/// }
/// # Ok::<(), srcmerge::collect::CollectError>(())
/// ```
pub fn collect(
    root: &Path,
    filter: &Filter,
    skip: Option<&Path>,
) -> Result<Collected, CollectError> {
    let mut collected = Collected::new();
    let skip = skip.map(absolute);

    for entry in walk(root)? {
        let entry = entry?;
        if !entry.is_file {
            continue;
        }
        if skip.as_ref().is_some_and(|s| *s == absolute(&entry.path)) {
            debug!(path = %entry.path.display(), "skipping output document");
            continue;
        }
        if !filter.qualifies_path(&entry.path) {
            debug!(path = %entry.path.display(), "not qualifying");
            continue;
        }

        let content = read_text(&entry.path)?;
        debug!(path = %entry.path.display(), bytes = content.len(), "collected");
        collected.insert(entry.path, content);
    }

    info!(root = %root.display(), files = collected.len(), "collection finished");
    Ok(collected)
}

/// Read a whole file and decode it as UTF-8.
fn read_text(path: &Path) -> Result<String, CollectError> {
    let bytes = std::fs::read(path).map_err(|source| CollectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| CollectError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}
