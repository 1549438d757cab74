//! Domain model for students, instructors and courses.
//!
//! # Responsibility
//! - Define the in-memory shape of every school entity.
//! - Provide record (de)serialization independent of the storage engine.
//!
//! # Invariants
//! - Identifiers are strictly positive `i64` values.
//! - An entity that fails `validate()` cannot be produced by deserialization.
//! - Course membership sets are derived from enrollment rows, never stored twice.

pub mod course;
pub mod instructor;
pub mod record;
pub mod school;
pub mod student;

/// Stable student identifier.
pub type StudentId = i64;
/// Stable instructor identifier.
pub type InstructorId = i64;
/// Stable course identifier.
pub type CourseId = i64;

/// Entity families that own a primary identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Instructor,
    Course,
}

impl EntityKind {
    /// Lowercase label used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Course => "course",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
