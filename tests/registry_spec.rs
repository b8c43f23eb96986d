use school_records::models::*;
use school_records::{AssociationError, RegistryError, School, ValidationError};
use speculate2::speculate;

fn add_student(school: &mut School, id: &str, name: &str) {
    school
        .create_student(CreateStudentInput {
            name: name.to_string(),
            age: 20,
            email: format!("{}@x.com", name.to_lowercase()),
            student_id: id.to_string(),
        })
        .expect("Failed to create student");
}

fn add_instructor(school: &mut School, id: &str, name: &str) {
    school
        .create_instructor(CreateInstructorInput {
            name: name.to_string(),
            age: 45,
            email: format!("{}@x.com", name.to_lowercase()),
            instructor_id: id.to_string(),
        })
        .expect("Failed to create instructor");
}

fn add_course(school: &mut School, id: &str, name: &str) {
    school
        .create_course(CreateCourseInput {
            course_id: id.to_string(),
            course_name: name.to_string(),
        })
        .expect("Failed to create course");
}

speculate! {
    before {
        let mut school = School::new();
        add_student(&mut school, "S001", "Ana");
        add_instructor(&mut school, "I001", "Lee");
        add_course(&mut school, "C100", "Algorithms");
    }

    describe "create_student" {
        it "rejects a malformed email" {
            let result = school.create_student(CreateStudentInput {
                name: "Bob".to_string(),
                age: 20,
                email: "not-an-email".to_string(),
                student_id: "S002".to_string(),
            });

            assert_eq!(
                result.unwrap_err(),
                RegistryError::Validation(ValidationError::MalformedEmail("not-an-email".to_string()))
            );
            assert_eq!(school.students().len(), 1);
        }

        it "rejects a zero age" {
            let result = school.create_student(CreateStudentInput {
                name: "Bob".to_string(),
                age: 0,
                email: "bob@x.com".to_string(),
                student_id: "S002".to_string(),
            });

            assert!(matches!(
                result,
                Err(RegistryError::Validation(ValidationError::NonPositiveAge(0)))
            ));
        }

        it "rejects a blank name" {
            let result = school.create_student(CreateStudentInput {
                name: "   ".to_string(),
                age: 20,
                email: "bob@x.com".to_string(),
                student_id: "S002".to_string(),
            });

            assert!(matches!(
                result,
                Err(RegistryError::Validation(ValidationError::MissingField { field: "name" }))
            ));
        }

        it "rejects a duplicate id" {
            let result = school.create_student(CreateStudentInput {
                name: "Another Ana".to_string(),
                age: 22,
                email: "ana2@x.com".to_string(),
                student_id: "S001".to_string(),
            });

            assert!(matches!(result, Err(RegistryError::DuplicateId { .. })));
            assert_eq!(school.students().len(), 1);
            assert_eq!(school.student("S001").unwrap().name(), "Ana");
        }
    }

    describe "create_course" {
        it "rejects a blank name" {
            let result = school.create_course(CreateCourseInput {
                course_id: "C200".to_string(),
                course_name: "  ".to_string(),
            });

            assert_eq!(
                result.unwrap_err(),
                RegistryError::Validation(ValidationError::MissingField { field: "course_name" })
            );
            assert_eq!(school.courses().len(), 1);
        }

        it "rejects a blank id" {
            let result = school.create_course(CreateCourseInput {
                course_id: String::new(),
                course_name: "Databases".to_string(),
            });

            assert_eq!(
                result.unwrap_err(),
                RegistryError::Validation(ValidationError::MissingField { field: "course_id" })
            );
            assert_eq!(school.courses().len(), 1);
        }
    }

    describe "add_course" {
        it "inserts a constructed course" {
            let course = Course::new("C200", "Databases").expect("Invalid course");
            school.add_course(course).expect("Failed to add");

            let ids: Vec<&str> = school.courses().iter().map(|c| c.id()).collect();
            assert_eq!(ids, vec!["C100", "C200"]);
        }

        it "rejects an id that is already taken" {
            let course = Course::new("C100", "Another Algorithms").expect("Invalid course");
            let result = school.add_course(course);

            assert!(matches!(result, Err(RegistryError::DuplicateId { kind: EntityKind::Course, .. })));
            assert_eq!(school.course("C100").unwrap().name(), "Algorithms");
        }
    }

    describe "update_student" {
        it "applies a partial edit" {
            school
                .update_student("S001", UpdateStudentInput {
                    email: Some("ana@school.edu".to_string()),
                    ..Default::default()
                })
                .expect("Failed to update");

            let ana = school.student("S001").unwrap();
            assert_eq!(ana.email(), "ana@school.edu");
            assert_eq!(ana.name(), "Ana");
            assert_eq!(ana.age(), 20);
        }

        it "leaves the record untouched when the edit is invalid" {
            let result = school.update_student("S001", UpdateStudentInput {
                email: Some("broken".to_string()),
                age: Some(30),
                ..Default::default()
            });

            assert!(result.is_err());
            let ana = school.student("S001").unwrap();
            assert_eq!(ana.email(), "ana@x.com");
            assert_eq!(ana.age(), 20);
        }

        it "writes a new id through to course rosters" {
            school.register_student_in_course("S001", "C100").unwrap();
            school
                .update_student("S001", UpdateStudentInput {
                    student_id: Some("S900".to_string()),
                    ..Default::default()
                })
                .expect("Failed to rename");

            let course = school.course("C100").unwrap();
            assert_eq!(course.enrolled_students(), ["S900".to_string()]);
            assert!(school.student("S001").is_none());
            assert!(school.check_integrity().is_ok());
        }

        it "refuses to rename onto an existing id" {
            add_student(&mut school, "S002", "Bob");
            let result = school.update_student("S001", UpdateStudentInput {
                student_id: Some("S002".to_string()),
                ..Default::default()
            });

            assert!(matches!(result, Err(RegistryError::DuplicateId { .. })));
            assert_eq!(school.student("S001").unwrap().name(), "Ana");
        }

        it "reports an unknown id" {
            let result = school.update_student("S404", UpdateStudentInput::default());
            assert!(matches!(result, Err(RegistryError::NotFound { kind: EntityKind::Student, .. })));
        }
    }

    describe "update_instructor" {
        it "writes a new id through to the courses taught" {
            school.assign_instructor_to_course("I001", "C100").unwrap();
            school
                .update_instructor("I001", UpdateInstructorInput {
                    instructor_id: Some("I009".to_string()),
                    ..Default::default()
                })
                .expect("Failed to rename");

            assert_eq!(school.course("C100").unwrap().instructor_id(), Some("I009"));
            assert!(school.instructor("I001").is_none());
            assert!(school.instructor("I009").unwrap().teaches("C100"));
            assert!(school.check_integrity().is_ok());
        }

        it "leaves the record untouched when the edit is invalid" {
            let result = school.update_instructor("I001", UpdateInstructorInput {
                name: Some("Dr. Lee".to_string()),
                age: Some(0),
                ..Default::default()
            });

            assert_eq!(
                result.unwrap_err(),
                RegistryError::Validation(ValidationError::NonPositiveAge(0))
            );
            let lee = school.instructor("I001").unwrap();
            assert_eq!(lee.name(), "Lee");
            assert_eq!(lee.age(), 45);
        }

        it "refuses to rename onto an existing id" {
            add_instructor(&mut school, "I002", "Kim");
            let result = school.update_instructor("I001", UpdateInstructorInput {
                instructor_id: Some("I002".to_string()),
                ..Default::default()
            });

            assert!(matches!(result, Err(RegistryError::DuplicateId { kind: EntityKind::Instructor, .. })));
            assert_eq!(school.instructor("I001").unwrap().name(), "Lee");
            assert_eq!(school.instructor("I002").unwrap().name(), "Kim");
        }
    }

    describe "update_course" {
        it "renames in student and instructor links" {
            school.register_student_in_course("S001", "C100").unwrap();
            school.assign_instructor_to_course("I001", "C100").unwrap();

            school
                .update_course("C100", UpdateCourseInput {
                    course_id: Some("C101".to_string()),
                    course_name: Some("Advanced Algorithms".to_string()),
                })
                .expect("Failed to rename course");

            assert_eq!(school.student("S001").unwrap().registered_courses(), ["C101".to_string()]);
            assert_eq!(school.instructor("I001").unwrap().assigned_courses(), ["C101".to_string()]);
            assert!(school.check_integrity().is_ok());
        }
    }

    describe "register_student_in_course" {
        it "links both sides" {
            assert_eq!(school.register_student_in_course("S001", "C100"), Ok(true));

            assert!(school.student("S001").unwrap().is_registered_in("C100"));
            assert!(school.course("C100").unwrap().has_student("S001"));

            let course = school.course("C100").unwrap();
            let names: Vec<&str> = school.students_of_course(course).map(|s| s.name()).collect();
            assert_eq!(names, vec!["Ana"]);
        }

        it "is idempotent" {
            school.register_student_in_course("S001", "C100").unwrap();
            assert_eq!(school.register_student_in_course("S001", "C100"), Ok(false));

            assert_eq!(school.student("S001").unwrap().registered_courses().len(), 1);
            assert_eq!(school.course("C100").unwrap().enrolled_students().len(), 1);
        }

        it "rejects an instructor id in the student slot" {
            let result = school.register_student_in_course("I001", "C100");

            assert_eq!(
                result,
                Err(AssociationError::WrongKind {
                    id: "I001".to_string(),
                    expected: EntityKind::Student,
                    found: EntityKind::Instructor,
                })
            );
            assert!(school.course("C100").unwrap().enrolled_students().is_empty());
        }

        it "rejects an unknown course" {
            let result = school.register_student_in_course("S001", "C999");
            assert!(matches!(result, Err(AssociationError::NotFound { kind: EntityKind::Course, .. })));
            assert!(school.student("S001").unwrap().registered_courses().is_empty());
        }
    }

    describe "unregister_student_from_course" {
        it "removes the link on both sides" {
            school.register_student_in_course("S001", "C100").unwrap();
            assert_eq!(school.unregister_student_from_course("S001", "C100"), Ok(true));

            assert!(school.student("S001").unwrap().registered_courses().is_empty());
            assert!(school.course("C100").unwrap().enrolled_students().is_empty());
        }

        it "returns false when not registered" {
            assert_eq!(school.unregister_student_from_course("S001", "C100"), Ok(false));
        }
    }

    describe "assign_instructor_to_course" {
        it "links both sides" {
            assert_eq!(school.assign_instructor_to_course("I001", "C100"), Ok(true));

            let course = school.course("C100").unwrap();
            assert_eq!(course.instructor_id(), Some("I001"));
            assert!(school.instructor("I001").unwrap().teaches("C100"));
            assert_eq!(school.instructor_of_course(course).map(|i| i.name()), Some("Lee"));
        }

        it "moves the course away from the previous instructor" {
            add_instructor(&mut school, "I002", "Kim");
            school.assign_instructor_to_course("I001", "C100").unwrap();
            school.assign_instructor_to_course("I002", "C100").unwrap();

            assert!(!school.instructor("I001").unwrap().teaches("C100"));
            assert!(school.instructor("I002").unwrap().teaches("C100"));
            assert_eq!(school.course("C100").unwrap().instructor_id(), Some("I002"));
            assert!(school.check_integrity().is_ok());
        }

        it "returns false for the current instructor" {
            school.assign_instructor_to_course("I001", "C100").unwrap();
            assert_eq!(school.assign_instructor_to_course("I001", "C100"), Ok(false));
            assert_eq!(school.instructor("I001").unwrap().assigned_courses().len(), 1);
        }

        it "rejects a course id in the instructor slot" {
            let result = school.assign_instructor_to_course("C100", "C100");
            assert!(matches!(
                result,
                Err(AssociationError::WrongKind { expected: EntityKind::Instructor, found: EntityKind::Course, .. })
            ));
        }
    }

    describe "unassign_instructor" {
        it "returns the previous instructor" {
            school.assign_instructor_to_course("I001", "C100").unwrap();

            assert_eq!(school.unassign_instructor("C100"), Ok(Some("I001".to_string())));
            assert!(school.course("C100").unwrap().instructor_id().is_none());
            assert!(school.instructor("I001").unwrap().assigned_courses().is_empty());
            assert_eq!(school.unassign_instructor("C100"), Ok(None));
        }
    }

    describe "removal" {
        it "drops a removed student from every roster" {
            add_course(&mut school, "C200", "Databases");
            school.register_student_in_course("S001", "C100").unwrap();
            school.register_student_in_course("S001", "C200").unwrap();

            school.remove_student("S001").expect("Failed to remove");

            assert!(school.student("S001").is_none());
            assert!(school.courses().iter().all(|c| c.enrolled_students().is_empty()));
            assert!(school.check_integrity().is_ok());
        }

        it "clears the instructor of courses taught by a removed instructor" {
            school.assign_instructor_to_course("I001", "C100").unwrap();

            school.remove_entity(EntityKind::Instructor, "I001").expect("Failed to remove");

            assert!(school.course("C100").unwrap().instructor_id().is_none());
        }

        it "unlinks students and instructor from a removed course" {
            school.register_student_in_course("S001", "C100").unwrap();
            school.assign_instructor_to_course("I001", "C100").unwrap();

            let removed = school.remove_course("C100").expect("Failed to remove");

            assert_eq!(removed.id(), "C100");
            assert!(school.student("S001").unwrap().registered_courses().is_empty());
            assert!(school.instructor("I001").unwrap().assigned_courses().is_empty());
        }

        it "reports an unknown id" {
            let result = school.remove_entity(EntityKind::Course, "C404");
            assert!(matches!(result, Err(RegistryError::NotFound { kind: EntityKind::Course, .. })));
        }
    }

    describe "kind_of" {
        it "resolves each collection" {
            assert_eq!(school.kind_of("S001"), Some(EntityKind::Student));
            assert_eq!(school.kind_of("I001"), Some(EntityKind::Instructor));
            assert_eq!(school.kind_of("C100"), Some(EntityKind::Course));
            assert_eq!(school.kind_of("X1"), None);
        }
    }

    describe "introduce" {
        it "uses the person's name and age" {
            let ana = school.student("S001").unwrap();
            assert_eq!(ana.person().introduce(), "My name is Ana, and I am 20 years old.");
        }
    }
}
