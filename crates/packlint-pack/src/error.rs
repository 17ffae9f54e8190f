//! Pack-specific error types.
//!
//! Structured errors for loading and scanning package trees. All errors
//! carry the file path involved so a finding can be traced to its source
//! without re-running the checker.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading package files.
#[derive(Debug, Error)]
pub enum PackError {
    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying serde_yaml error.
        source: serde_yaml::Error,
    },

    /// A required file was not found.
    #[error("required file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The tree root does not exist or is not a directory.
    #[error("package tree root is not a directory: {path}")]
    InvalidRoot {
        /// The offending root path.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pack operations.
pub type PackResult<T> = Result<T, PackError>;

impl PackError {
    /// Whether this error is confined to a single file.
    ///
    /// Per-file errors become violations in the report; anything else
    /// aborts the run.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            PackError::YamlParse { .. } | PackError::FileNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let err = PackError::FileNotFound {
            path: PathBuf::from("/tmp/missing.yaml"),
        };
        assert!(format!("{err}").contains("/tmp/missing.yaml"));
    }

    #[test]
    fn invalid_root_display() {
        let err = PackError::InvalidRoot {
            path: PathBuf::from("/no/such/tree"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/no/such/tree"));
        assert!(msg.contains("not a directory"));
    }

    #[test]
    fn yaml_parse_is_file_local() {
        let source = serde_yaml::from_str::<serde_yaml::Value>("{unbalanced").unwrap_err();
        let err = PackError::YamlParse {
            path: PathBuf::from("common/base.yaml"),
            source,
        };
        assert!(err.is_file_local());
        assert!(format!("{err}").contains("common/base.yaml"));
    }

    #[test]
    fn io_error_is_not_file_local() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PackError::from(io_err);
        assert!(!err.is_file_local());
        assert!(format!("{err}").contains("denied"));
    }
}
