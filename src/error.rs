//! Error types for package lifecycle operations

use thiserror::Error;

/// Errors raised by the package store and lifecycle manager.
///
/// Everything except [`PackageError::Storage`] is recoverable: the shell
/// renders it as a single line and keeps reading input.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Invalid package name: '{0}'")]
    InvalidName(String),

    #[error("Package '{0}' already exists.")]
    AlreadyExists(String),

    #[error("Package '{0}' not found in available packages.")]
    NotAvailable(String),

    #[error("Package '{0}' is not installed.")]
    NotInstalled(String),

    #[error("You don't have permissions to run this command.")]
    PermissionDenied,

    #[error("Package '{0}' could not be uninstalled: directory is not empty.")]
    NotEmpty(String),

    #[error("I/O error on package '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute package '{name}': {reason}")]
    Execution { name: String, reason: String },

    /// Package storage itself is unusable (e.g. the directories are gone)
    #[error("Package storage unavailable: {0}")]
    Storage(#[source] std::io::Error),
}

impl PackageError {
    /// Whether the error must end the shell session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PackageError::Storage(_))
    }

    /// True for both flavours of "no such package".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PackageError::NotAvailable(_) | PackageError::NotInstalled(_)
        )
    }

    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        PackageError::Io {
            name: name.to_string(),
            source,
        }
    }
}

/// Result type alias for package operations
pub type Result<T> = std::result::Result<T, PackageError>;
