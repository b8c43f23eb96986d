use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::person::require;
use crate::error::ValidationError;

/// A course, its instructor and its enrolled students.
///
/// Both links are stored as ids. `instructor_id` is single-valued: assigning
/// a new instructor through [`School`](crate::registry::School) also removes
/// the course from the previous instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    #[serde(default)]
    pub(crate) instructor_id: Option<String>,
    #[serde(default)]
    pub(crate) enrolled_students: Vec<String>,
}

impl Course {
    pub fn new(
        course_id: impl Into<String>,
        course_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let course = Self {
            course_id: course_id.into(),
            course_name: course_name.into(),
            instructor_id: None,
            enrolled_students: Vec::new(),
        };
        course.validate()?;
        Ok(course)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("course_id", &self.course_id)?;
        require("course_name", &self.course_name)
    }

    pub fn id(&self) -> &str {
        &self.course_id
    }

    pub fn name(&self) -> &str {
        &self.course_name
    }

    pub fn instructor_id(&self) -> Option<&str> {
        self.instructor_id.as_deref()
    }

    /// Ids of enrolled students, in enrollment order.
    pub fn enrolled_students(&self) -> &[String] {
        &self.enrolled_students
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.enrolled_students.iter().any(|s| s == student_id)
    }
}

impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        self.course_id == other.course_id
    }
}

impl Eq for Course {}

impl Hash for Course {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.course_id.hash(state);
    }
}

/// Input for creating a new course. Instructor and students are linked afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseInput {
    pub course_id: String,
    pub course_name: String,
}

/// Input for editing a course. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseInput {
    pub course_id: Option<String>,
    pub course_name: Option<String>,
}
