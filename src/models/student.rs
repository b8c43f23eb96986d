use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::person::{require, PersonDetails};
use crate::error::ValidationError;

/// A student and the courses they are registered in.
///
/// `registered_courses` holds course ids, never course copies. It is kept in
/// sync with each course's enrolled list by
/// [`School`](crate::registry::School), which is the only code allowed to
/// change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub(crate) student_id: String,
    #[serde(flatten)]
    pub(crate) person: PersonDetails,
    #[serde(default)]
    pub(crate) registered_courses: Vec<String>,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        email: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let student = Self {
            student_id: student_id.into(),
            person: PersonDetails {
                name: name.into(),
                age,
                email: email.into(),
            },
            registered_courses: Vec::new(),
        };
        student.validate()?;
        Ok(student)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.person.validate()?;
        require("student_id", &self.student_id)
    }

    pub fn id(&self) -> &str {
        &self.student_id
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

    /// Ids of registered courses, in registration order.
    pub fn registered_courses(&self) -> &[String] {
        &self.registered_courses
    }

    pub fn is_registered_in(&self, course_id: &str) -> bool {
        self.registered_courses.iter().any(|c| c == course_id)
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.student_id == other.student_id
    }
}

impl Eq for Student {}

impl Hash for Student {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.student_id.hash(state);
    }
}

/// Input for creating a new student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentInput {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub student_id: String,
}

/// Input for editing a student. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentInput {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    /// Renames the student; every course roster is rewritten to the new id.
    pub student_id: Option<String>,
}
