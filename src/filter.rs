//! File qualification.
//!
//! A path qualifies when it contains none of the excluded fragments and
//! ends with the configured suffix. Matching is plain substring/suffix
//! matching on the whole path string, so `data` also rejects `metadata/`.

use std::path::Path;

/// Inclusion predicate for merged files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    excludes: Vec<String>,
    extension: String,
}

impl Filter {
    /// Create a filter from exclusion fragments and a required suffix.
    pub fn new(excludes: Vec<String>, extension: impl Into<String>) -> Self {
        Self {
            excludes,
            extension: extension.into(),
        }
    }

    /// Check whether `path` should be merged.
    ///
    /// # Examples
    ///
    /// ```
    /// use srcmerge::filter::Filter;
    ///
    /// let filter = Filter::new(vec!["node_modules".into()], ".js");
    /// assert!(filter.qualifies("src/app.js"));
    /// assert!(!filter.qualifies("node_modules/dep.js"));
    /// assert!(!filter.qualifies("README.md"));
    /// ```
    pub fn qualifies(&self, path: &str) -> bool {
        if self.excluded_by(path).is_some() {
            return false;
        }
        path.ends_with(&self.extension)
    }

    /// Path form of [`Filter::qualifies`].
    pub fn qualifies_path(&self, path: &Path) -> bool {
        self.qualifies(&path.to_string_lossy())
    }

    /// The first exclusion fragment found in `path`, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        self.excludes
            .iter()
            .map(String::as_str)
            .find(|fragment| path.contains(fragment))
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }
}
