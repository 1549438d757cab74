//! Input validation predicates shared by model, repository and service.
//!
//! # Responsibility
//! - Provide pure predicates callers can run before any mutating call.
//! - Convert predicate failures into typed `ValidationError` values.
//!
//! # Invariants
//! - Predicates never touch storage.
//! - `validate_email` matches the whole input; surrounding whitespace fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .unwrap_or_else(|err| panic!("email pattern must compile: {err}"))
});

/// Validation failure raised before data reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    EmptyField(&'static str),
    /// Email does not match `local@domain.tld`.
    InvalidEmail(String),
    /// Age is below zero.
    NegativeAge(i64),
    /// Identifier is zero or negative.
    InvalidId { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::InvalidEmail(email) => write!(f, "invalid email format: `{email}`"),
            Self::NegativeAge(age) => write!(f, "age must be non-negative, got {age}"),
            Self::InvalidId { field, value } => {
                write!(f, "{field} must be a positive integer, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns whether `email` has the `local@domain.tld` shape.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns whether `age` is a non-negative value.
pub fn validate_age(age: i64) -> bool {
    age >= 0
}

/// Returns `true` iff every value is non-empty after trimming.
pub fn nonempty(values: &[&str]) -> bool {
    values.iter().all(|value| !value.trim().is_empty())
}

/// Requires a non-blank value for `field`.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if nonempty(&[value]) {
        Ok(())
    } else {
        Err(ValidationError::EmptyField(field))
    }
}

/// Requires a well-formed email.
pub fn require_email(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Requires a non-negative age.
pub fn require_age(age: i64) -> Result<(), ValidationError> {
    if validate_age(age) {
        Ok(())
    } else {
        Err(ValidationError::NegativeAge(age))
    }
}

/// Requires a strictly positive identifier.
pub fn require_id(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidId { field, value })
    }
}

/// Checks the shared person shape used by students and instructors.
///
/// Check order is stable: id, name, email presence, email format, age.
pub fn check_person(
    id_field: &'static str,
    id: i64,
    name: &str,
    age: i64,
    email: &str,
) -> Result<(), ValidationError> {
    require_id(id_field, id)?;
    require_text("name", name)?;
    require_text("email", email)?;
    require_email(email)?;
    require_age(age)
}
