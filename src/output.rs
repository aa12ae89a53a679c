//! Merged document output.
//!
//! Each collected file becomes one entry:
//!
//! ````text
//! relative/path.js:
//! ```js
//! <content>
//! ```
//!
//! ````
//!
//! Content is written verbatim. A file containing its own closing fence
//! line makes the document ambiguous; see [`MergeOptions::strict_fences`].

use std::fs::{File, Permissions};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::collect::Collected;
use crate::tokens::{estimate_tokens, Encoding};

/// Fence marker opening and closing each code block.
pub const FENCE: &str = "```";

/// Errors that can occur while writing the merged document.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} contains a closing fence line")]
    FenceCollision { path: PathBuf },
}

/// Options controlling how the document is written.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Language tag after the opening fence.
    pub language: String,
    /// Write to a temporary file, then rename over the destination.
    pub atomic: bool,
    /// Refuse content containing a closing fence line.
    pub strict_fences: bool,
    /// Encoding for the token estimate.
    pub encoding: Encoding,
}

/// What a merge wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Size of the document in bytes.
    pub bytes: u64,
    /// Token estimate, summed over entries.
    pub tokens: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            language: crate::config::DEFAULT_LANGUAGE.to_string(),
            atomic: false,
            strict_fences: false,
            encoding: Encoding::default(),
        }
    }
}

/// Write `collected` to `output_path`, truncating any existing file.
///
/// Entries are rendered and counted one at a time, so the document is
/// never held in memory as a whole.
pub fn merge(
    output_path: &Path,
    collected: &Collected,
    options: &MergeOptions,
) -> Result<MergeStats, OutputError> {
    check_fences(collected, options.strict_fences)?;

    let base = output_dir(output_path);
    let stats = if options.atomic {
        write_atomic(output_path, base, collected, options)?
    } else {
        let file = File::create(output_path).map_err(|source| OutputError::Create {
            path: output_path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        write_document(&mut out, base, collected, options)
            .and_then(|stats| out.flush().map(|_| stats))
            .map_err(|source| OutputError::Write {
                path: output_path.to_path_buf(),
                source,
            })?
    };

    info!(
        output = %output_path.display(),
        files = collected.len(),
        bytes = stats.bytes,
        "merged document written"
    );
    Ok(stats)
}

/// Render the whole document into a string.
pub fn format_document(output_path: &Path, collected: &Collected, language: &str) -> String {
    let base = output_dir(output_path);
    let mut document = String::with_capacity(collected.total_bytes() + 64 * collected.len());
    for file in collected {
        document.push_str(&format_entry(
            &relative_path(&file.path, base),
            &file.content,
            language,
        ));
    }
    document
}

/// Render a single entry.
pub fn format_entry(relative: &Path, content: &str, language: &str) -> String {
    format!(
        "{}:\n{FENCE}{language}\n{content}\n{FENCE}\n\n",
        display_path(relative)
    )
}

fn write_document<W: Write>(
    out: &mut W,
    base: &Path,
    collected: &Collected,
    options: &MergeOptions,
) -> std::io::Result<MergeStats> {
    let mut stats = MergeStats::default();
    for file in collected {
        let entry = format_entry(
            &relative_path(&file.path, base),
            &file.content,
            &options.language,
        );
        out.write_all(entry.as_bytes())?;
        stats.bytes += entry.len() as u64;
        stats.tokens += estimate_tokens(&entry, options.encoding);
    }
    Ok(stats)
}

fn write_atomic(
    output_path: &Path,
    base: &Path,
    collected: &Collected,
    options: &MergeOptions,
) -> Result<MergeStats, OutputError> {
    let dir = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    let tmp = NamedTempFile::new_in(dir).map_err(|source| OutputError::Create {
        path: output_path.to_path_buf(),
        source,
    })?;

    let write_err = |source: std::io::Error| OutputError::Write {
        path: output_path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(tmp);
    let stats = write_document(&mut out, base, collected, options).map_err(write_err)?;
    let tmp = out.into_inner().map_err(|e| write_err(e.into_error()))?;

    // Temp files are created 0600; give the result the mode a direct write would.
    if let Some(permissions) = target_permissions(output_path) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(write_err)?;
    }
    tmp.persist(output_path).map_err(|e| write_err(e.error))?;
    Ok(stats)
}

/// Permissions of the file being replaced, or 0644 for a new one.
fn target_permissions(output_path: &Path) -> Option<Permissions> {
    match std::fs::metadata(output_path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Reject or report files whose content contains a closing fence line.
fn check_fences(collected: &Collected, strict: bool) -> Result<(), OutputError> {
    for file in collected {
        if contains_fence_line(&file.content) {
            if strict {
                return Err(OutputError::FenceCollision {
                    path: file.path.clone(),
                });
            }
            warn!(
                path = %file.path.display(),
                "content contains a closing fence line; merged document will be ambiguous"
            );
        }
    }
    Ok(())
}

/// Whether any line of `content` is a bare fence marker.
pub fn contains_fence_line(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim_end() == FENCE)
}

/// Directory containing the output document.
fn output_dir(output_path: &Path) -> &Path {
    output_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Express `path` relative to `base`.
///
/// Both sides are made absolute against the working directory and
/// normalized first, so a relative root and an absolute output (or an
/// output under `..`) still agree. Uses `..` segments when `path` is
/// outside `base`. Yields `.` when both are the same.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = absolute(path);
    let base = absolute(base);
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}

/// Join onto the working directory if relative, then fold `.` and `..`.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Forward-slash rendering so documents match across platforms.
fn display_path(path: &Path) -> String {
    if path.has_root() {
        return path.display().to_string();
    }
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}
