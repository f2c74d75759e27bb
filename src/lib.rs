//! # Storefront - users and products over a single SQLite file
//!
//! Storefront provides:
//! - A store initializer that creates the database file, schema and seed rows on first run
//! - A record access layer with list/get/create/update/delete for `users` and `products`
//! - Scoped connections: every operation opens, uses and releases its own connection

pub mod entity;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{Ack, Product, ProductFields, User, UserFields};
pub use storage::{DbStats, InitOutcome, SqliteStore};

/// Result type alias for Storefront operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers mapping failures to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required field missing or malformed
    Validation,
    /// A unique column already holds the value
    Uniqueness,
    /// No record with the requested id
    NotFound,
    /// Store initialization failed; startup must halt
    Fatal,
    /// Any other SQLite failure
    Storage,
    /// Filesystem failure
    Io,
}

/// Error types for Storefront operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Duplicate {field}: '{value}' is already taken")]
    Uniqueness { field: String, value: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Failed to initialize store at {path}: {message}")]
    Init { path: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Uniqueness { .. } => ErrorKind::Uniqueness,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Init { .. } => ErrorKind::Fatal,
            Error::Storage(_) => ErrorKind::Storage,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::validation("name", "is required").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::NotFound { entity: "user", id: 7 }.kind(),
            ErrorKind::NotFound
        );
        let init = Error::Init {
            path: "db.sqlite".into(),
            message: "denied".into(),
        };
        assert_eq!(init.kind(), ErrorKind::Fatal);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::Uniqueness {
            field: "email".into(),
            value: "alice@example.com".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate email: 'alice@example.com' is already taken"
        );
        assert_eq!(
            Error::validation("price", "is required").to_string(),
            "Invalid price: is required"
        );
    }
}
