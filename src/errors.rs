//! Error types for srcmerge.

use crate::collect::CollectError;
use crate::output::OutputError;
use crate::walker::WalkError;

/// Top-level error type for srcmerge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("collect error: {0}")]
    Collect(#[from] CollectError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Root missing or unreadable, or a source file unreadable.
    FileSystem,
    /// A qualifying file is not valid UTF-8.
    Encoding,
    /// The output document could not be produced.
    Io,
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::Walk(_) => ErrorKind::FileSystem,
            MergeError::Collect(CollectError::Walk(_) | CollectError::Read { .. }) => {
                ErrorKind::FileSystem
            }
            MergeError::Collect(CollectError::Encoding { .. }) => ErrorKind::Encoding,
            MergeError::Output(_) | MergeError::Io(_) | MergeError::Serialization(_) => {
                ErrorKind::Io
            }
        }
    }

    fn walk_error(&self) -> Option<&WalkError> {
        match self {
            MergeError::Walk(e) | MergeError::Collect(CollectError::Walk(e)) => Some(e),
            _ => None,
        }
    }
}

/// Map an error to its exit code.
pub fn exit_code(error: &MergeError) -> i32 {
    match error.walk_error() {
        Some(WalkError::NotFound { .. }) => return 3,
        Some(WalkError::PermissionDenied { .. }) => return 4,
        Some(_) => return 2,
        None => {}
    }
    match error {
        MergeError::Collect(CollectError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::PermissionDenied =>
        {
            4
        }
        MergeError::Collect(CollectError::Read { .. }) => 2,
        MergeError::Collect(CollectError::Encoding { .. }) => 5,
        MergeError::Output(OutputError::FenceCollision { .. }) => 6,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn encoding_error() -> MergeError {
        let source = String::from_utf8(vec![0xff]).unwrap_err();
        CollectError::Encoding {
            path: PathBuf::from("bad.js"),
            source,
        }
        .into()
    }

    #[test]
    fn test_kinds() {
        let missing: MergeError = CollectError::Walk(WalkError::NotFound {
            path: PathBuf::from("/missing"),
        })
        .into();
        assert_eq!(missing.kind(), ErrorKind::FileSystem);
        assert_eq!(encoding_error().kind(), ErrorKind::Encoding);

        let write: MergeError = OutputError::Create {
            path: PathBuf::from("merge.md"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(write.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_exit_codes() {
        let missing: MergeError = WalkError::NotFound {
            path: PathBuf::from("/missing"),
        }
        .into();
        assert_eq!(exit_code(&missing), 3);

        let denied: MergeError = CollectError::Walk(WalkError::PermissionDenied {
            path: PathBuf::from("/root"),
        })
        .into();
        assert_eq!(exit_code(&denied), 4);

        assert_eq!(exit_code(&encoding_error()), 5);

        let fence: MergeError = OutputError::FenceCollision {
            path: PathBuf::from("a.js"),
        }
        .into();
        assert_eq!(exit_code(&fence), 6);

        let io: MergeError = std::io::Error::other("disk full").into();
        assert_eq!(exit_code(&io), 1);
    }

    #[test]
    fn test_message_names_file() {
        assert!(encoding_error().to_string().contains("bad.js"));
    }
}
