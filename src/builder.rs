//! Fluent builder API and pipeline orchestration.
//!
//! A run is collect → merge → report, executed once, sequentially.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::collect::collect;
use crate::config::MergeConfig;
use crate::errors::MergeError;
use crate::output::{format_document, merge, MergeOptions};
use crate::tokens::Encoding;

/// Builder for a merge run.
///
/// # Examples
///
/// ```no_run
/// use srcmerge::builder::Merger;
///
/// let report = Merger::new("./web")
///     .extension(".ts")
///     .language("ts")
///     .exclude("dist")
///     .run()?;
///
/// println!("{} files -> {}", report.files, report.output.display());
/// # Ok::<(), srcmerge::MergeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    /// Start from the default configuration for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: MergeConfig::new(root),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Output file name, joined onto the root.
    pub fn output(mut self, name: impl Into<PathBuf>) -> Self {
        self.config.output_name = name.into();
        self
    }

    /// Add an exclusion fragment.
    pub fn exclude(mut self, fragment: impl Into<String>) -> Self {
        self.config.excludes.push(fragment.into());
        self
    }

    /// Replace all exclusion fragments.
    pub fn excludes<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.excludes = fragments.into_iter().map(Into::into).collect();
        self
    }

    /// Required file-name suffix.
    pub fn extension(mut self, suffix: impl Into<String>) -> Self {
        self.config.extension = suffix.into();
        self
    }

    /// Language tag for the opening fence.
    pub fn language(mut self, tag: impl Into<String>) -> Self {
        self.config.language = tag.into();
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.config.atomic = atomic;
        self
    }

    pub fn strict_fences(mut self, strict: bool) -> Self {
        self.config.strict_fences = strict;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Collect and write the merged document.
    pub fn run(self) -> Result<MergeReport, MergeError> {
        run(&self.config)
    }

    /// Collect and render the document without writing it.
    pub fn render(self) -> Result<String, MergeError> {
        let output_path = self.config.output_path();
        let collected = collect(
            self.config.root(),
            &self.config.filter(),
            Some(&output_path),
        )?;
        Ok(format_document(
            &output_path,
            &collected,
            &self.config.language,
        ))
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Where the document was written.
    pub output: PathBuf,
    /// Merged file paths, relative to the root, in document order.
    pub merged: Vec<PathBuf>,
    /// Number of merged files.
    pub files: usize,
    /// Size of the document in bytes.
    pub bytes: u64,
    /// Estimated token count of the document, summed over entries.
    pub tokens: usize,
    /// Encoding used for `tokens`.
    pub encoding: String,
}

/// Run the whole pipeline for `config`.
pub fn run(config: &MergeConfig) -> Result<MergeReport, MergeError> {
    let output_path = config.output_path();
    info!(
        root = %config.root.display(),
        output = %output_path.display(),
        extension = %config.extension,
        "merging"
    );

    let collected = collect(config.root(), &config.filter(), Some(&output_path))?;

    let options = MergeOptions {
        language: config.language.clone(),
        atomic: config.atomic,
        strict_fences: config.strict_fences,
        encoding: config.encoding,
    };
    let stats = merge(&output_path, &collected, &options)?;

    Ok(MergeReport {
        merged: collected
            .paths()
            .map(|p| relative_to_root(p, config.root()))
            .collect(),
        files: collected.len(),
        output: output_path,
        bytes: stats.bytes,
        tokens: stats.tokens,
        encoding: config.encoding.to_string(),
    })
}

fn relative_to_root(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
