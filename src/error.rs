//! Error types for the records core.
//!
//! Each layer has its own enum: field validation, association management,
//! registry mutations and persistence. The binary flattens all of them into
//! `anyhow::Error`.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::EntityKind;

/// A field failed validation when an entity was built or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("'{0}' is not a valid email address")]
    MalformedEmail(String),

    #[error("age must be a positive integer, got {0}")]
    NonPositiveAge(i64),

    #[error("{field} must be {expected}, got '{value}'")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// An association was requested between entities that cannot be linked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    #[error("wrong kind of id '{id}': expected {expected}, found {found}")]
    WrongKind {
        id: String,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
}

/// Errors raised by [`School`](crate::registry::School) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} '{id}' references unknown {target} '{target_id}'")]
    DanglingReference {
        kind: EntityKind,
        id: String,
        target: EntityKind,
        target_id: String,
    },

    #[error("{kind} '{id}' lists {target} '{target_id}' but the reverse link is missing")]
    UnmirroredLink {
        kind: EntityKind,
        id: String,
        target: EntityKind,
        target_id: String,
    },

    #[error("{kind} '{id}' lists {target} '{target_id}' more than once")]
    DuplicateLink {
        kind: EntityKind,
        id: String,
        target: EntityKind,
        target_id: String,
    },
}

/// Errors raised while saving or loading the whole state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error on {}: {source}", path.display())]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("corrupt data in {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("unsupported data format version {found} in {}", path.display())]
    UnsupportedVersion { path: PathBuf, found: String },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
