//! Records for a small school: students, instructors and courses, the
//! registrations and teaching assignments between them, search, and
//! whole-state persistence to a local file.
//!
//! [`School`] holds the state and is the only mutator of associations.
//! [`store`] saves and restores it, [`search`] filters it, and [`render`] and
//! [`export`] turn it into tables, roster trees and CSV.

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod registry;
pub mod render;
pub mod search;
pub mod store;

pub use error::{AssociationError, PersistenceError, RegistryError, ValidationError};
pub use registry::School;
