use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Snapshot, Store, StoreFormat, SNAPSHOT_VERSION};
use crate::error::PersistenceError;
use crate::registry::School;

#[derive(Deserialize)]
struct Header {
    version: u32,
}

/// Stores the snapshot as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Store for JsonStore {
    fn save(&self, school: &School) -> Result<(), PersistenceError> {
        let snapshot = Snapshot::capture(school);
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| PersistenceError::corrupt(&self.path, e))?;

        write_atomic(&self.path, &bytes)?;

        tracing::info!(
            path = %self.path.display(),
            students = snapshot.students.len(),
            instructors = snapshot.instructors.len(),
            courses = snapshot.courses.len(),
            "Saved school data"
        );
        Ok(())
    }

    fn load(&self) -> Result<School, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "No saved data found");
                return Ok(School::new());
            }
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        // Other versions may lay the document out differently, so only the
        // header is read until the version is known.
        let header: Header = serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::corrupt(&self.path, e))?;
        if header.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                path: self.path.clone(),
                found: header.version.to_string(),
            });
        }

        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::corrupt(&self.path, e))?;

        let school = snapshot
            .restore()
            .map_err(|e| PersistenceError::corrupt(&self.path, e))?;

        tracing::info!(path = %self.path.display(), "Loaded school data");
        Ok(school)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StoreFormat {
        StoreFormat::Json
    }
}

/// Write through a temp file in the same directory and rename it over the
/// target, so the previous file survives any failure before the rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| PersistenceError::io(&parent, e))?;

    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("school_data"),
        std::process::id()
    ));

    let written = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()
    })();
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::io(&tmp, e));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::io(path, e));
    }

    if let Ok(dir) = fs::File::open(&parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}
