//! Text rendering of records: the flat table listing and the course roster tree.

use crate::models::{Course, EntityKind, Instructor, Student};
use crate::registry::School;
use crate::search::SearchResults;

const NONE: &str = "None";

/// One displayed row, shared by the table listing and CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub id: String,
    pub kind: EntityKind,
    pub details: String,
}

impl Record {
    pub fn fields(&self) -> [&str; 4] {
        [&self.name, &self.id, self.kind.label(), &self.details]
    }
}

pub fn student_record(school: &School, student: &Student) -> Record {
    let courses: Vec<&str> = school.courses_of_student(student).map(|c| c.name()).collect();
    Record {
        name: student.name().to_string(),
        id: student.id().to_string(),
        kind: EntityKind::Student,
        details: courses.join(", "),
    }
}

pub fn instructor_record(school: &School, instructor: &Instructor) -> Record {
    let courses: Vec<&str> = school
        .courses_of_instructor(instructor)
        .map(|c| c.name())
        .collect();
    Record {
        name: instructor.name().to_string(),
        id: instructor.id().to_string(),
        kind: EntityKind::Instructor,
        details: courses.join(", "),
    }
}

pub fn course_record(school: &School, course: &Course) -> Record {
    let instructor = school
        .instructor_of_course(course)
        .map(|i| i.name())
        .unwrap_or(NONE);
    let students: Vec<&str> = school.students_of_course(course).map(|s| s.name()).collect();
    let students = if students.is_empty() {
        NONE.to_string()
    } else {
        students.join(", ")
    };

    Record {
        name: course.name().to_string(),
        id: course.id().to_string(),
        kind: EntityKind::Course,
        details: format!("Instructor: {}, Enrolled Students: {}", instructor, students),
    }
}

/// Every record: students, then instructors, then courses.
pub fn records(school: &School) -> Vec<Record> {
    let students = school.students().iter().map(|s| student_record(school, s));
    let instructors = school
        .instructors()
        .iter()
        .map(|i| instructor_record(school, i));
    let courses = school.courses().iter().map(|c| course_record(school, c));
    students.chain(instructors).chain(courses).collect()
}

pub fn search_records(school: &School, results: &SearchResults<'_>) -> Vec<Record> {
    let students = results.students.iter().map(|s| student_record(school, s));
    let instructors = results
        .instructors
        .iter()
        .map(|i| instructor_record(school, i));
    let courses = results.courses.iter().map(|c| course_record(school, c));
    students.chain(instructors).chain(courses).collect()
}

/// Render records as an aligned table with a header row.
///
/// ```text
/// Name        ID    Type     Details
/// Ana         S001  Student  Algorithms
/// Algorithms  C100  Course   Instructor: None, Enrolled Students: Ana
/// ```
pub fn table(records: &[Record]) -> String {
    const HEADER: [&str; 4] = ["Name", "ID", "Type", "Details"];

    let mut widths = HEADER.map(str::len);
    for record in records {
        for (width, field) in widths.iter_mut().zip(record.fields()) {
            *width = (*width).max(field.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &HEADER, &widths);
    for record in records {
        push_row(&mut output, &record.fields(), &widths);
    }
    output
}

fn push_row(output: &mut String, fields: &[&str; 4], widths: &[usize; 4]) {
    let mut line = String::new();
    for (i, (field, width)) in fields.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(field);
        let pad = width.saturating_sub(field.chars().count());
        line.extend(std::iter::repeat(' ').take(pad));
    }
    output.push_str(line.trim_end());
    output.push('\n');
}

/// A labelled node in the roster tree.
struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

/// Render a course with its instructor and students as an ASCII tree.
///
/// ```text
/// Algorithms (C100)
/// ├── Instructor: Dr. Lee (I001)
/// └── Students
///     ├── Ana (S001)
///     └── Bob (S002)
/// ```
pub fn roster(school: &School, course: &Course) -> String {
    let instructor = match school.instructor_of_course(course) {
        Some(i) => format!("Instructor: {} ({})", i.name(), i.id()),
        None => format!("Instructor: {}", NONE),
    };

    let students: Vec<Node> = school
        .students_of_course(course)
        .map(|s| Node::leaf(format!("{} ({})", s.name(), s.id())))
        .collect();
    let students = if students.is_empty() {
        Node::leaf(format!("Students: {}", NONE))
    } else {
        Node {
            label: "Students".to_string(),
            children: students,
        }
    };

    let root = Node {
        label: format!("{} ({})", course.name(), course.id()),
        children: vec![Node::leaf(instructor), students],
    };

    let mut output = String::new();
    render_node(&mut output, &root, "", true, true);
    output
}

fn render_node(output: &mut String, node: &Node, prefix: &str, is_last: bool, is_root: bool) {
    if is_root {
        output.push_str(&node.label);
        output.push('\n');
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&node.label);
        output.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}
