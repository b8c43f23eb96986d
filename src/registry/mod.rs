//! In-memory state of the records system.
//!
//! [`School`] owns every student, instructor and course and is the only
//! place where links between them change. Each association operation
//! updates both sides in one call, so the id lists on students, instructors
//! and courses always mirror each other:
//!
//! - a course id is in `student.registered_courses` exactly when the student
//!   id is in `course.enrolled_students`;
//! - `course.instructor_id` names an instructor exactly when that
//!   instructor's `assigned_courses` contains the course.
//!
//! Removal cascades: deleting an entity strips its id from every list that
//! referenced it. Ids are unique per kind and renames are propagated.

mod integrity;

use tracing::debug;

use crate::error::{AssociationError, RegistryError};
use crate::models::*;

#[derive(Debug, Clone, Default)]
pub struct School {
    students: Vec<Student>,
    instructors: Vec<Instructor>,
    courses: Vec<Course>,
}

impl School {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from deserialized records.
    ///
    /// The records must already carry mirrored id lists; nothing is repaired.
    /// Any invalid field, duplicate id, unknown reference or one-sided link
    /// fails the whole rebuild.
    pub fn from_parts(
        students: Vec<Student>,
        instructors: Vec<Instructor>,
        courses: Vec<Course>,
    ) -> Result<Self, RegistryError> {
        let school = Self {
            students,
            instructors,
            courses,
        };
        school.check_integrity()?;
        Ok(school)
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.instructors.is_empty() && self.courses.is_empty()
    }

    // ============================================================
    // Lookups
    // ============================================================

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.student_id == id)
    }

    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.instructor_id == id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_id == id)
    }

    /// Which kind of entity owns `id`, checking students, then instructors,
    /// then courses.
    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        if self.student(id).is_some() {
            Some(EntityKind::Student)
        } else if self.instructor(id).is_some() {
            Some(EntityKind::Instructor)
        } else if self.course(id).is_some() {
            Some(EntityKind::Course)
        } else {
            None
        }
    }

    pub fn courses_of_student<'a>(
        &'a self,
        student: &'a Student,
    ) -> impl Iterator<Item = &'a Course> + 'a {
        student
            .registered_courses
            .iter()
            .filter_map(move |id| self.course(id))
    }

    pub fn courses_of_instructor<'a>(
        &'a self,
        instructor: &'a Instructor,
    ) -> impl Iterator<Item = &'a Course> + 'a {
        instructor
            .assigned_courses
            .iter()
            .filter_map(move |id| self.course(id))
    }

    pub fn students_of_course<'a>(
        &'a self,
        course: &'a Course,
    ) -> impl Iterator<Item = &'a Student> + 'a {
        course
            .enrolled_students
            .iter()
            .filter_map(move |id| self.student(id))
    }

    pub fn instructor_of_course(&self, course: &Course) -> Option<&Instructor> {
        course
            .instructor_id
            .as_deref()
            .and_then(|id| self.instructor(id))
    }

    fn student_index(&self, id: &str) -> Option<usize> {
        self.students.iter().position(|s| s.student_id == id)
    }

    fn instructor_index(&self, id: &str) -> Option<usize> {
        self.instructors.iter().position(|i| i.instructor_id == id)
    }

    fn course_index(&self, id: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.course_id == id)
    }

    /// Find the index of `id` among entities of kind `expected`.
    ///
    /// When the id is missing but belongs to another kind, the error says so
    /// instead of a plain not-found.
    fn locate(&self, expected: EntityKind, id: &str) -> Result<usize, AssociationError> {
        let index = match expected {
            EntityKind::Student => self.student_index(id),
            EntityKind::Instructor => self.instructor_index(id),
            EntityKind::Course => self.course_index(id),
        };

        index.ok_or_else(|| match self.kind_of(id) {
            Some(found) => AssociationError::WrongKind {
                id: id.to_string(),
                expected,
                found,
            },
            None => AssociationError::NotFound {
                kind: expected,
                id: id.to_string(),
            },
        })
    }

    // ============================================================
    // Student operations
    // ============================================================

    pub fn create_student(&mut self, input: CreateStudentInput) -> Result<&Student, RegistryError> {
        let student = Student::new(input.name, input.age, input.email, input.student_id)?;
        self.add_student(student)
    }

    /// Insert an already built student.
    ///
    /// Any course ids the value carries are discarded; links are only made
    /// through the association operations.
    pub fn add_student(&mut self, mut student: Student) -> Result<&Student, RegistryError> {
        student.validate()?;
        if self.student(&student.student_id).is_some() {
            return Err(duplicate(EntityKind::Student, &student.student_id));
        }
        student.registered_courses.clear();

        debug!(student_id = %student.student_id, "Added student");
        self.students.push(student);
        Ok(&self.students[self.students.len() - 1])
    }

    /// Apply a partial edit. The merged record is validated before anything
    /// changes, and a new id is written through to every course roster.
    pub fn update_student(
        &mut self,
        id: &str,
        input: UpdateStudentInput,
    ) -> Result<&Student, RegistryError> {
        let idx = self
            .student_index(id)
            .ok_or_else(|| not_found(EntityKind::Student, id))?;

        let mut updated = self.students[idx].clone();
        if let Some(name) = input.name {
            updated.person.name = name;
        }
        if let Some(age) = input.age {
            updated.person.age = age;
        }
        if let Some(email) = input.email {
            updated.person.email = email;
        }
        if let Some(student_id) = input.student_id {
            updated.student_id = student_id;
        }
        updated.validate()?;

        if updated.student_id != id {
            if self.student(&updated.student_id).is_some() {
                return Err(duplicate(EntityKind::Student, &updated.student_id));
            }
            for course in &mut self.courses {
                rename_in(&mut course.enrolled_students, id, &updated.student_id);
            }
            debug!(from = id, to = %updated.student_id, "Renamed student");
        }

        self.students[idx] = updated;
        Ok(&self.students[idx])
    }

    /// Remove a student and drop them from every course roster.
    pub fn remove_student(&mut self, id: &str) -> Result<Student, RegistryError> {
        let idx = self
            .student_index(id)
            .ok_or_else(|| not_found(EntityKind::Student, id))?;
        let student = self.students.remove(idx);

        for course_id in &student.registered_courses {
            if let Some(course) = self.courses.iter_mut().find(|c| &c.course_id == course_id) {
                course.enrolled_students.retain(|s| s != id);
            }
        }

        debug!(
            student_id = id,
            courses = student.registered_courses.len(),
            "Removed student"
        );
        Ok(student)
    }

    // ============================================================
    // Instructor operations
    // ============================================================

    pub fn create_instructor(
        &mut self,
        input: CreateInstructorInput,
    ) -> Result<&Instructor, RegistryError> {
        let instructor =
            Instructor::new(input.name, input.age, input.email, input.instructor_id)?;
        self.add_instructor(instructor)
    }

    pub fn add_instructor(
        &mut self,
        mut instructor: Instructor,
    ) -> Result<&Instructor, RegistryError> {
        instructor.validate()?;
        if self.instructor(&instructor.instructor_id).is_some() {
            return Err(duplicate(EntityKind::Instructor, &instructor.instructor_id));
        }
        instructor.assigned_courses.clear();

        debug!(instructor_id = %instructor.instructor_id, "Added instructor");
        self.instructors.push(instructor);
        Ok(&self.instructors[self.instructors.len() - 1])
    }

    pub fn update_instructor(
        &mut self,
        id: &str,
        input: UpdateInstructorInput,
    ) -> Result<&Instructor, RegistryError> {
        let idx = self
            .instructor_index(id)
            .ok_or_else(|| not_found(EntityKind::Instructor, id))?;

        let mut updated = self.instructors[idx].clone();
        if let Some(name) = input.name {
            updated.person.name = name;
        }
        if let Some(age) = input.age {
            updated.person.age = age;
        }
        if let Some(email) = input.email {
            updated.person.email = email;
        }
        if let Some(instructor_id) = input.instructor_id {
            updated.instructor_id = instructor_id;
        }
        updated.validate()?;

        if updated.instructor_id != id {
            if self.instructor(&updated.instructor_id).is_some() {
                return Err(duplicate(EntityKind::Instructor, &updated.instructor_id));
            }
            for course in &mut self.courses {
                if course.instructor_id.as_deref() == Some(id) {
                    course.instructor_id = Some(updated.instructor_id.clone());
                }
            }
            debug!(from = id, to = %updated.instructor_id, "Renamed instructor");
        }

        self.instructors[idx] = updated;
        Ok(&self.instructors[idx])
    }

    /// Remove an instructor and leave their courses without one.
    pub fn remove_instructor(&mut self, id: &str) -> Result<Instructor, RegistryError> {
        let idx = self
            .instructor_index(id)
            .ok_or_else(|| not_found(EntityKind::Instructor, id))?;
        let instructor = self.instructors.remove(idx);

        for course in &mut self.courses {
            if course.instructor_id.as_deref() == Some(id) {
                course.instructor_id = None;
            }
        }

        debug!(
            instructor_id = id,
            courses = instructor.assigned_courses.len(),
            "Removed instructor"
        );
        Ok(instructor)
    }

    // ============================================================
    // Course operations
    // ============================================================

    pub fn create_course(&mut self, input: CreateCourseInput) -> Result<&Course, RegistryError> {
        let course = Course::new(input.course_id, input.course_name)?;
        self.add_course(course)
    }

    /// Insert an already built course with no instructor and no students.
    pub fn add_course(&mut self, mut course: Course) -> Result<&Course, RegistryError> {
        course.validate()?;
        if self.course(&course.course_id).is_some() {
            return Err(duplicate(EntityKind::Course, &course.course_id));
        }
        course.instructor_id = None;
        course.enrolled_students.clear();

        debug!(course_id = %course.course_id, "Added course");
        self.courses.push(course);
        Ok(&self.courses[self.courses.len() - 1])
    }

    pub fn update_course(
        &mut self,
        id: &str,
        input: UpdateCourseInput,
    ) -> Result<&Course, RegistryError> {
        let idx = self
            .course_index(id)
            .ok_or_else(|| not_found(EntityKind::Course, id))?;

        let mut updated = self.courses[idx].clone();
        if let Some(course_name) = input.course_name {
            updated.course_name = course_name;
        }
        if let Some(course_id) = input.course_id {
            updated.course_id = course_id;
        }
        updated.validate()?;

        if updated.course_id != id {
            if self.course(&updated.course_id).is_some() {
                return Err(duplicate(EntityKind::Course, &updated.course_id));
            }
            for student in &mut self.students {
                rename_in(&mut student.registered_courses, id, &updated.course_id);
            }
            for instructor in &mut self.instructors {
                rename_in(&mut instructor.assigned_courses, id, &updated.course_id);
            }
            debug!(from = id, to = %updated.course_id, "Renamed course");
        }

        self.courses[idx] = updated;
        Ok(&self.courses[idx])
    }

    /// Remove a course, unregistering its students and unassigning its instructor.
    pub fn remove_course(&mut self, id: &str) -> Result<Course, RegistryError> {
        let idx = self
            .course_index(id)
            .ok_or_else(|| not_found(EntityKind::Course, id))?;
        let course = self.courses.remove(idx);

        for student in &mut self.students {
            student.registered_courses.retain(|c| c != id);
        }
        if let Some(instructor_id) = &course.instructor_id {
            if let Some(instructor) = self
                .instructors
                .iter_mut()
                .find(|i| &i.instructor_id == instructor_id)
            {
                instructor.assigned_courses.retain(|c| c != id);
            }
        }

        debug!(
            course_id = id,
            students = course.enrolled_students.len(),
            "Removed course"
        );
        Ok(course)
    }

    /// Remove any kind of entity by id, cascading to its links.
    pub fn remove_entity(&mut self, kind: EntityKind, id: &str) -> Result<(), RegistryError> {
        match kind {
            EntityKind::Student => self.remove_student(id).map(|_| ()),
            EntityKind::Instructor => self.remove_instructor(id).map(|_| ()),
            EntityKind::Course => self.remove_course(id).map(|_| ()),
        }
    }

    // ============================================================
    // Associations
    // ============================================================

    /// Register a student in a course, updating both sides.
    ///
    /// Returns `false` when the pair was already registered; nothing changes
    /// in that case.
    pub fn register_student_in_course(
        &mut self,
        student_id: &str,
        course_id: &str,
    ) -> Result<bool, AssociationError> {
        let s = self.locate(EntityKind::Student, student_id)?;
        let c = self.locate(EntityKind::Course, course_id)?;

        if self.students[s].is_registered_in(course_id) {
            return Ok(false);
        }

        self.students[s]
            .registered_courses
            .push(course_id.to_string());
        self.courses[c]
            .enrolled_students
            .push(student_id.to_string());

        debug!(student_id, course_id, "Registered student in course");
        Ok(true)
    }

    /// Returns `false` when the student was not registered in the course.
    pub fn unregister_student_from_course(
        &mut self,
        student_id: &str,
        course_id: &str,
    ) -> Result<bool, AssociationError> {
        let s = self.locate(EntityKind::Student, student_id)?;
        let c = self.locate(EntityKind::Course, course_id)?;

        if !self.students[s].is_registered_in(course_id) {
            return Ok(false);
        }

        self.students[s].registered_courses.retain(|id| id != course_id);
        self.courses[c].enrolled_students.retain(|id| id != student_id);

        debug!(student_id, course_id, "Unregistered student from course");
        Ok(true)
    }

    /// Make `instructor_id` the instructor of `course_id`.
    ///
    /// A course has one instructor, so the previous instructor (if any) loses
    /// the course from its assigned list. Returns `false` when the instructor
    /// was already assigned.
    pub fn assign_instructor_to_course(
        &mut self,
        instructor_id: &str,
        course_id: &str,
    ) -> Result<bool, AssociationError> {
        let i = self.locate(EntityKind::Instructor, instructor_id)?;
        let c = self.locate(EntityKind::Course, course_id)?;

        if self.courses[c].instructor_id.as_deref() == Some(instructor_id) {
            return Ok(false);
        }

        if let Some(previous) = self.courses[c].instructor_id.take() {
            if let Some(prev) = self
                .instructors
                .iter_mut()
                .find(|x| x.instructor_id == previous)
            {
                prev.assigned_courses.retain(|id| id != course_id);
            }
            debug!(course_id, previous = %previous, "Replaced course instructor");
        }

        self.courses[c].instructor_id = Some(instructor_id.to_string());
        self.instructors[i]
            .assigned_courses
            .push(course_id.to_string());

        debug!(instructor_id, course_id, "Assigned instructor to course");
        Ok(true)
    }

    /// Clear a course's instructor, returning the id that was removed.
    pub fn unassign_instructor(
        &mut self,
        course_id: &str,
    ) -> Result<Option<String>, AssociationError> {
        let c = self.locate(EntityKind::Course, course_id)?;

        let Some(previous) = self.courses[c].instructor_id.take() else {
            return Ok(None);
        };

        if let Some(instructor) = self
            .instructors
            .iter_mut()
            .find(|i| i.instructor_id == previous)
        {
            instructor.assigned_courses.retain(|id| id != course_id);
        }

        debug!(course_id, instructor_id = %previous, "Unassigned instructor");
        Ok(Some(previous))
    }
}

fn rename_in(ids: &mut [String], from: &str, to: &str) {
    for id in ids.iter_mut().filter(|id| id.as_str() == from) {
        *id = to.to_string();
    }
}

fn duplicate(kind: EntityKind, id: &str) -> RegistryError {
    RegistryError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

fn not_found(kind: EntityKind, id: &str) -> RegistryError {
    RegistryError::NotFound {
        kind,
        id: id.to_string(),
    }
}
