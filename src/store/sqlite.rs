use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, Transaction};

use super::{schema, Store, StoreFormat, SNAPSHOT_VERSION};
use crate::error::PersistenceError;
use crate::models::{Course, Instructor, PersonDetails, Student};
use crate::registry::School;

/// Stores the snapshot in a SQLite file.
///
/// Every save rewrites all rows inside one transaction, so the file holds
/// either the previous snapshot or the new one. Loads open the file
/// read-only and refuse files whose schema is not the current one.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_error(&self, source: rusqlite::Error) -> PersistenceError {
        PersistenceError::Sqlite {
            path: self.path.clone(),
            source,
        }
    }

    /// Errors that mean the file content is bad are reported as corrupt;
    /// everything else stays a SQLite error.
    fn read_error(&self, source: rusqlite::Error) -> PersistenceError {
        let bad_content = match &source {
            rusqlite::Error::SqliteFailure(failure, _) => matches!(
                failure.code,
                ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt
            ),
            rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..) => true,
            _ => false,
        };

        if bad_content {
            PersistenceError::corrupt(&self.path, source)
        } else {
            self.write_error(source)
        }
    }

    fn read_school(&self, conn: &Connection) -> Result<School, PersistenceError> {
        let sql = |e: rusqlite::Error| self.read_error(e);

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM snapshot_meta WHERE key = 'version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql)?;
        if let Some(found) = version {
            if found != SNAPSHOT_VERSION.to_string() {
                return Err(PersistenceError::UnsupportedVersion {
                    path: self.path.clone(),
                    found,
                });
            }
        }

        let mut students = read_people(
            conn,
            "SELECT student_id, name, age, email FROM students ORDER BY position",
        )
        .map_err(sql)?
        .into_iter()
        .map(|(student_id, person)| Student {
            student_id,
            person,
            registered_courses: Vec::new(),
        })
        .collect::<Vec<_>>();

        let mut instructors = read_people(
            conn,
            "SELECT instructor_id, name, age, email FROM instructors ORDER BY position",
        )
        .map_err(sql)?
        .into_iter()
        .map(|(instructor_id, person)| Instructor {
            instructor_id,
            person,
            assigned_courses: Vec::new(),
        })
        .collect::<Vec<_>>();

        let mut courses = {
            let mut stmt = conn
                .prepare("SELECT course_id, course_name, instructor_id FROM courses ORDER BY position")
                .map_err(sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Course {
                        course_id: row.get(0)?,
                        course_name: row.get(1)?,
                        instructor_id: row.get(2)?,
                        enrolled_students: Vec::new(),
                    })
                })
                .map_err(sql)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sql)?;
            rows
        };

        let registrations = read_pairs(
            conn,
            "SELECT student_id, course_id FROM registrations ORDER BY student_position",
        )
        .map_err(sql)?;
        for (student_id, course_id) in registrations {
            let student = students
                .iter_mut()
                .find(|s| s.student_id == student_id)
                .ok_or_else(|| self.orphan("registration", &student_id))?;
            student.registered_courses.push(course_id);
        }

        let enrollments = read_pairs(
            conn,
            "SELECT course_id, student_id FROM registrations ORDER BY course_position",
        )
        .map_err(sql)?;
        for (course_id, student_id) in enrollments {
            let course = courses
                .iter_mut()
                .find(|c| c.course_id == course_id)
                .ok_or_else(|| self.orphan("registration", &course_id))?;
            course.enrolled_students.push(student_id);
        }

        let assignments = read_pairs(
            conn,
            "SELECT instructor_id, course_id FROM assignments ORDER BY position",
        )
        .map_err(sql)?;
        for (instructor_id, course_id) in assignments {
            let instructor = instructors
                .iter_mut()
                .find(|i| i.instructor_id == instructor_id)
                .ok_or_else(|| self.orphan("assignment", &instructor_id))?;
            instructor.assigned_courses.push(course_id);
        }

        School::from_parts(students, instructors, courses)
            .map_err(|e| PersistenceError::corrupt(&self.path, e))
    }

    fn orphan(&self, table: &str, id: &str) -> PersistenceError {
        PersistenceError::corrupt(
            &self.path,
            format!("{} row references unknown id '{}'", table, id),
        )
    }
}

impl Store for SqliteStore {
    fn save(&self, school: &School) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let mut conn = Connection::open(&self.path).map_err(|e| self.write_error(e))?;
        schema::run_migrations(&conn).map_err(|e| self.write_error(e))?;

        let tx = conn.transaction().map_err(|e| self.write_error(e))?;
        write_school(&tx, school).map_err(|e| self.write_error(e))?;
        tx.commit().map_err(|e| self.write_error(e))?;

        tracing::info!(
            path = %self.path.display(),
            students = school.students().len(),
            instructors = school.instructors().len(),
            courses = school.courses().len(),
            "Saved school data"
        );
        Ok(())
    }

    fn load(&self) -> Result<School, PersistenceError> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "No saved data found");
            return Ok(School::new());
        }

        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| self.read_error(e))?;

        match schema::applied_versions(&conn).map_err(|e| self.read_error(e))? {
            None => {
                return Err(PersistenceError::corrupt(
                    &self.path,
                    "not a school records database",
                ))
            }
            Some(versions) if versions.last().map(String::as_str) != Some(schema::latest_version()) => {
                return Err(PersistenceError::UnsupportedVersion {
                    path: self.path.clone(),
                    found: versions.last().cloned().unwrap_or_else(|| "none".to_string()),
                });
            }
            Some(_) => {}
        }

        let school = self.read_school(&conn)?;
        tracing::info!(path = %self.path.display(), "Loaded school data");
        Ok(school)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StoreFormat {
        StoreFormat::Sqlite
    }
}

fn write_school(tx: &Transaction<'_>, school: &School) -> rusqlite::Result<()> {
    tx.execute_batch(
        "DELETE FROM registrations;
         DELETE FROM assignments;
         DELETE FROM courses;
         DELETE FROM instructors;
         DELETE FROM students;
         DELETE FROM snapshot_meta;",
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO students (student_id, name, age, email, position) VALUES (?, ?, ?, ?, ?)",
        )?;
        for (position, student) in school.students().iter().enumerate() {
            stmt.execute((
                student.id(),
                student.name(),
                student.age(),
                student.email(),
                position as i64,
            ))?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO instructors (instructor_id, name, age, email, position) VALUES (?, ?, ?, ?, ?)",
        )?;
        for (position, instructor) in school.instructors().iter().enumerate() {
            stmt.execute((
                instructor.id(),
                instructor.name(),
                instructor.age(),
                instructor.email(),
                position as i64,
            ))?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO courses (course_id, course_name, instructor_id, position) VALUES (?, ?, ?, ?)",
        )?;
        for (position, course) in school.courses().iter().enumerate() {
            stmt.execute((
                course.id(),
                course.name(),
                course.instructor_id(),
                position as i64,
            ))?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO registrations (student_id, course_id, student_position, course_position)
             VALUES (?, ?, ?, ?)",
        )?;
        for student in school.students() {
            for (student_position, course_id) in student.registered_courses().iter().enumerate() {
                let course_position = school
                    .course(course_id)
                    .and_then(|c| c.enrolled_students().iter().position(|s| s == student.id()))
                    .map(|p| p as i64)
                    .unwrap_or(i64::MAX);
                stmt.execute((
                    student.id(),
                    course_id,
                    student_position as i64,
                    course_position,
                ))?;
            }
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO assignments (instructor_id, course_id, position) VALUES (?, ?, ?)",
        )?;
        for instructor in school.instructors() {
            for (position, course_id) in instructor.assigned_courses().iter().enumerate() {
                stmt.execute((instructor.id(), course_id, position as i64))?;
            }
        }
    }

    tx.execute(
        "INSERT INTO snapshot_meta (key, value) VALUES ('version', ?), ('saved_at', ?)",
        (SNAPSHOT_VERSION.to_string(), Utc::now().to_rfc3339()),
    )?;

    Ok(())
}

fn read_people(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<(String, PersonDetails)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                PersonDetails {
                    name: row.get(1)?,
                    age: row.get(2)?,
                    email: row.get(3)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn read_pairs(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
