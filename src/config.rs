//! Run configuration.
//!
//! Everything a merge run needs is carried in [`MergeConfig`] and passed
//! explicitly through the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::tokens::Encoding;

/// Default output document name, placed inside the root.
pub const DEFAULT_OUTPUT_NAME: &str = "merge.md";

/// Default file-name suffix a file must end with to be merged.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Default language tag written after the opening fence.
pub const DEFAULT_LANGUAGE: &str = "js";

/// Path fragments excluded unless the caller replaces them.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "data"];

/// Configuration for a single merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Directory to traverse.
    pub root: PathBuf,
    /// Output file name, joined onto `root`.
    pub output_name: PathBuf,
    /// Substrings that disqualify a path.
    pub excludes: Vec<String>,
    /// Suffix a path must end with.
    pub extension: String,
    /// Language tag for the opening fence.
    pub language: String,
    /// Write into a temporary file and rename it into place.
    pub atomic: bool,
    /// Fail instead of warning when content contains a closing fence line.
    pub strict_fences: bool,
    /// Encoding used for the token estimate in the report.
    #[serde(skip)]
    pub encoding: Encoding,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_name: PathBuf::from(DEFAULT_OUTPUT_NAME),
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            extension: DEFAULT_EXTENSION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            atomic: false,
            strict_fences: false,
            encoding: Encoding::default(),
        }
    }
}

impl MergeConfig {
    /// Default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Full path of the output document.
    ///
    /// An absolute `output_name` is used as-is.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_name)
    }

    /// The inclusion predicate described by this configuration.
    pub fn filter(&self) -> Filter {
        Filter::new(self.excludes.clone(), self.extension.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
