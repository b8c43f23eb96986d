//! Whole-state persistence.
//!
//! A [`Store`] saves and loads the entire [`School`] at once. Links are
//! written as id references and the loaded state is rebuilt with
//! [`School::from_parts`], so every id maps to exactly one in-memory entity
//! and a file whose links do not line up is rejected as corrupt.
//!
//! Loading never touches the caller's state: `load` returns a fresh
//! `School`, which the caller swaps in only on success.

mod json;
mod schema;
mod sqlite;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, RegistryError};
use crate::models::{Course, Instructor, Student};
use crate::registry::School;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

/// Version written into every snapshot; loads of any other version fail.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A persistence backend for the whole state.
pub trait Store {
    /// Replace whatever is at the target with `school`.
    fn save(&self, school: &School) -> Result<(), PersistenceError>;

    /// Read the state back. A missing target yields an empty `School`.
    fn load(&self) -> Result<School, PersistenceError>;

    fn path(&self) -> &Path;

    fn format(&self) -> StoreFormat;
}

/// The serialized form of a [`School`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub students: Vec<Student>,
    pub instructors: Vec<Instructor>,
    pub courses: Vec<Course>,
}

impl Snapshot {
    pub fn capture(school: &School) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            students: school.students().to_vec(),
            instructors: school.instructors().to_vec(),
            courses: school.courses().to_vec(),
        }
    }

    pub fn restore(self) -> Result<School, RegistryError> {
        School::from_parts(self.students, self.instructors, self.courses)
    }
}

/// On-disk format of the data file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreFormat {
    Json,
    Sqlite,
}

impl StoreFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Self::Json),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Guess the format from a file extension; anything unrecognised is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("db" | "sqlite" | "sqlite3") => Self::Sqlite,
            _ => Self::Json,
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open the store for `path`, inferring the format when none is given.
pub fn open_store(path: impl Into<PathBuf>, format: Option<StoreFormat>) -> Box<dyn Store> {
    let path = path.into();
    match format.unwrap_or_else(|| StoreFormat::from_path(&path)) {
        StoreFormat::Json => Box::new(JsonStore::new(path)),
        StoreFormat::Sqlite => Box::new(SqliteStore::new(path)),
    }
}
