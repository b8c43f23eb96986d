use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::person::{require, PersonDetails};
use crate::error::ValidationError;

/// An instructor and the courses assigned to them.
///
/// A course has at most one instructor, so an id appears in at most one
/// instructor's `assigned_courses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub(crate) instructor_id: String,
    #[serde(flatten)]
    pub(crate) person: PersonDetails,
    #[serde(default)]
    pub(crate) assigned_courses: Vec<String>,
}

impl Instructor {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        email: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let instructor = Self {
            instructor_id: instructor_id.into(),
            person: PersonDetails {
                name: name.into(),
                age,
                email: email.into(),
            },
            assigned_courses: Vec::new(),
        };
        instructor.validate()?;
        Ok(instructor)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.person.validate()?;
        require("instructor_id", &self.instructor_id)
    }

    pub fn id(&self) -> &str {
        &self.instructor_id
    }

    pub fn person(&self) -> &PersonDetails {
        &self.person
    }

    pub fn name(&self) -> &str {
        &self.person.name
    }

    pub fn age(&self) -> u32 {
        self.person.age
    }

    pub fn email(&self) -> &str {
        &self.person.email
    }

    pub fn assigned_courses(&self) -> &[String] {
        &self.assigned_courses
    }

    pub fn teaches(&self, course_id: &str) -> bool {
        self.assigned_courses.iter().any(|c| c == course_id)
    }
}

impl PartialEq for Instructor {
    fn eq(&self, other: &Self) -> bool {
        self.instructor_id == other.instructor_id
    }
}

impl Eq for Instructor {}

impl Hash for Instructor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instructor_id.hash(state);
    }
}

/// Input for creating a new instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstructorInput {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub instructor_id: String,
}

/// Input for editing an instructor. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInstructorInput {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub instructor_id: Option<String>,
}
