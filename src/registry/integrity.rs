use std::collections::HashSet;

use super::School;
use crate::error::RegistryError;
use crate::models::EntityKind;

impl School {
    /// Verify every invariant the association operations maintain.
    ///
    /// States built through `School` methods always pass. This exists for
    /// states rebuilt from storage, where the file may have been edited or
    /// truncated.
    pub fn check_integrity(&self) -> Result<(), RegistryError> {
        for student in &self.students {
            student.validate()?;
        }
        for instructor in &self.instructors {
            instructor.validate()?;
        }
        for course in &self.courses {
            course.validate()?;
        }

        unique_ids(EntityKind::Student, self.students.iter().map(|s| s.id()))?;
        unique_ids(
            EntityKind::Instructor,
            self.instructors.iter().map(|i| i.id()),
        )?;
        unique_ids(EntityKind::Course, self.courses.iter().map(|c| c.id()))?;

        for student in &self.students {
            let link = Link::new(EntityKind::Student, student.id(), EntityKind::Course);
            link.no_repeats(&student.registered_courses)?;
            for course_id in &student.registered_courses {
                let course = self
                    .course(course_id)
                    .ok_or_else(|| link.dangling(course_id))?;
                if !course.has_student(student.id()) {
                    return Err(link.unmirrored(course_id));
                }
            }
        }

        for course in &self.courses {
            let link = Link::new(EntityKind::Course, course.id(), EntityKind::Student);
            link.no_repeats(&course.enrolled_students)?;
            for student_id in &course.enrolled_students {
                let student = self
                    .student(student_id)
                    .ok_or_else(|| link.dangling(student_id))?;
                if !student.is_registered_in(course.id()) {
                    return Err(link.unmirrored(student_id));
                }
            }

            if let Some(instructor_id) = course.instructor_id() {
                let link = Link::new(EntityKind::Course, course.id(), EntityKind::Instructor);
                let instructor = self
                    .instructor(instructor_id)
                    .ok_or_else(|| link.dangling(instructor_id))?;
                if !instructor.teaches(course.id()) {
                    return Err(link.unmirrored(instructor_id));
                }
            }
        }

        for instructor in &self.instructors {
            let link = Link::new(EntityKind::Instructor, instructor.id(), EntityKind::Course);
            link.no_repeats(&instructor.assigned_courses)?;
            for course_id in &instructor.assigned_courses {
                let course = self
                    .course(course_id)
                    .ok_or_else(|| link.dangling(course_id))?;
                if course.instructor_id() != Some(instructor.id()) {
                    return Err(link.unmirrored(course_id));
                }
            }
        }

        Ok(())
    }
}

fn unique_ids<'a>(
    kind: EntityKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RegistryError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// One side of a relation, used to build precise error values.
struct Link<'a> {
    kind: EntityKind,
    id: &'a str,
    target: EntityKind,
}

impl<'a> Link<'a> {
    fn new(kind: EntityKind, id: &'a str, target: EntityKind) -> Self {
        Self { kind, id, target }
    }

    fn no_repeats(&self, targets: &[String]) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for target_id in targets {
            if !seen.insert(target_id.as_str()) {
                return Err(RegistryError::DuplicateLink {
                    kind: self.kind,
                    id: self.id.to_string(),
                    target: self.target,
                    target_id: target_id.clone(),
                });
            }
        }
        Ok(())
    }

    fn dangling(&self, target_id: &str) -> RegistryError {
        RegistryError::DanglingReference {
            kind: self.kind,
            id: self.id.to_string(),
            target: self.target,
            target_id: target_id.to_string(),
        }
    }

    fn unmirrored(&self, target_id: &str) -> RegistryError {
        RegistryError::UnmirroredLink {
            kind: self.kind,
            id: self.id.to_string(),
            target: self.target,
            target_id: target_id.to_string(),
        }
    }
}
