//! Domain models for school records.
//!
//! # Core Concepts
//!
//! - [`Student`]: a person registered in zero or more courses.
//! - [`Instructor`]: a person assigned to teach zero or more courses.
//! - [`Course`]: has at most one instructor and any number of enrolled students.
//! - [`PersonDetails`]: the name, age and email shared by students and instructors.
//!
//! Entities compare equal when their ids match. Links between entities are
//! stored as ids on both sides and are only changed through
//! [`School`](crate::registry::School).

mod course;
mod instructor;
mod kind;
mod person;
mod student;

pub use course::*;
pub use instructor::*;
pub use kind::*;
pub use person::*;
pub use student::*;
