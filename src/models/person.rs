use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// The person-shaped fields shared by students and instructors.
///
/// A `PersonDetails` is never stored on its own. It is validated as a whole
/// whenever a student or instructor is created or edited, so a value that
/// made it into a [`School`](crate::registry::School) always satisfies
/// [`PersonDetails::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonDetails {
    pub name: String,
    pub age: u32,
    pub email: String,
}

impl PersonDetails {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let details = Self {
            name: name.into(),
            age,
            email: email.into(),
        };
        details.validate()?;
        Ok(details)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        validate_age(self.age)?;
        validate_email(&self.email)
    }

    pub fn introduce(&self) -> String {
        format!("My name is {}, and I am {} years old.", self.name, self.age)
    }
}

/// Reject empty or whitespace-only values.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

pub fn validate_age(age: u32) -> Result<(), ValidationError> {
    if age == 0 {
        return Err(ValidationError::NonPositiveAge(0));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require("email", email)?;
    if !email_regex().is_match(email) {
        return Err(ValidationError::MalformedEmail(email.to_string()));
    }
    Ok(())
}

/// Convert a raw form value into an age.
///
/// Anything that is not an integer is a `WrongType`; integers that are zero
/// or negative are a `NonPositiveAge`.
pub fn parse_age(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    require("age", raw)?;

    let value: i64 = raw.parse().map_err(|_| ValidationError::WrongType {
        field: "age",
        expected: "an integer",
        value: raw.to_string(),
    })?;

    if value <= 0 {
        return Err(ValidationError::NonPositiveAge(value));
    }

    u32::try_from(value).map_err(|_| ValidationError::WrongType {
        field: "age",
        expected: "an integer that fits in 32 bits",
        value: raw.to_string(),
    })
}
