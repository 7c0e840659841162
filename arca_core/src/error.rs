//! Error types for arca_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using arca_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository and object operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A path expected to be a directory is an existing file.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Creation target already holds a repository (or is unusable).
    #[error("Repository exists at {path}: {reason}")]
    RepositoryExists { path: PathBuf, reason: String },

    /// No repository metadata directory found.
    #[error("Not an arca repository: {path}")]
    NotARepository { path: PathBuf },

    /// Repository has no configuration document.
    #[error("Configuration file missing in {path}")]
    MissingConfiguration { path: PathBuf },

    /// Configuration names a format version this build does not support.
    #[error("Unsupported repository format version: {version}")]
    UnsupportedFormatVersion { version: String },

    /// Stored object is corrupted or its header lies about the payload.
    #[error("Malformed object at {path}: {reason}")]
    MalformedObject { path: PathBuf, reason: String },

    /// Object header names a kind outside the closed set.
    #[error("Unknown object type: {kind}")]
    UnknownObjectType { kind: String },

    /// Invalid hash format or encoding.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// Configuration document could not be parsed.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Compression or decompression failure.
    #[error("Compression error: {reason}")]
    Compression { reason: String },
}

impl Error {
    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory { path: path.into() }
    }

    /// Create a RepositoryExists error.
    pub fn repository_exists(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::RepositoryExists {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotARepository error.
    pub fn not_a_repository(path: impl Into<PathBuf>) -> Self {
        Error::NotARepository { path: path.into() }
    }

    /// Create a MissingConfiguration error.
    pub fn missing_configuration(path: impl Into<PathBuf>) -> Self {
        Error::MissingConfiguration { path: path.into() }
    }

    /// Create an UnsupportedFormatVersion error.
    pub fn unsupported_format_version(version: impl Into<String>) -> Self {
        Error::UnsupportedFormatVersion {
            version: version.into(),
        }
    }

    /// Create a MalformedObject error.
    pub fn malformed_object(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedObject {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownObjectType error.
    pub fn unknown_object_type(kind: impl Into<String>) -> Self {
        Error::UnknownObjectType { kind: kind.into() }
    }

    /// Create an InvalidHash error.
    pub fn invalid_hash(reason: impl Into<String>) -> Self {
        Error::InvalidHash {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a Compression error.
    pub fn compression_error(reason: impl Into<String>) -> Self {
        Error::Compression {
            reason: reason.into(),
        }
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
