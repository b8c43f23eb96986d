//! Case-insensitive substring search over ids and names.
//!
//! Results keep the insertion order of the backing collection. An empty
//! term matches every record.

use crate::models::{Course, Instructor, Student};
use crate::registry::School;

/// Matches across all three collections for one search term.
#[derive(Debug, Default)]
pub struct SearchResults<'a> {
    pub students: Vec<&'a Student>,
    pub instructors: Vec<&'a Instructor>,
    pub courses: Vec<&'a Course>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.instructors.is_empty() && self.courses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.students.len() + self.instructors.len() + self.courses.len()
    }
}

/// True when any of `fields` contains `term`, ignoring case.
pub fn matches(term: &str, fields: &[&str]) -> bool {
    let term = term.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

pub fn students<'a>(school: &'a School, term: &str) -> Vec<&'a Student> {
    school
        .students()
        .iter()
        .filter(|s| matches(term, &[s.id(), s.name()]))
        .collect()
}

pub fn instructors<'a>(school: &'a School, term: &str) -> Vec<&'a Instructor> {
    school
        .instructors()
        .iter()
        .filter(|i| matches(term, &[i.id(), i.name()]))
        .collect()
}

pub fn courses<'a>(school: &'a School, term: &str) -> Vec<&'a Course> {
    school
        .courses()
        .iter()
        .filter(|c| matches(term, &[c.id(), c.name()]))
        .collect()
}

pub fn all<'a>(school: &'a School, term: &str) -> SearchResults<'a> {
    SearchResults {
        students: students(school, term),
        instructors: instructors(school, term),
        courses: courses(school, term),
    }
}
