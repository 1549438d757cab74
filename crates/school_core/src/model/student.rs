//! Student domain model.
//!
//! # Invariants
//! - `email` matches the shared email pattern and `age >= 0`.
//! - `registered_courses` is a set; ordering carries no meaning.

use crate::model::{CourseId, StudentId};
use crate::validation::{check_person, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Student with the set of courses they are enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StudentWire")]
pub struct Student {
    pub student_id: StudentId,
    pub name: String,
    pub age: i64,
    pub email: String,
    /// Derived from enrollment rows when loaded from storage.
    pub registered_courses: BTreeSet<CourseId>,
}

#[derive(Deserialize)]
struct StudentWire {
    student_id: StudentId,
    name: String,
    age: i64,
    email: String,
    #[serde(default)]
    registered_courses: BTreeSet<CourseId>,
}

impl TryFrom<StudentWire> for Student {
    type Error = ValidationError;

    fn try_from(wire: StudentWire) -> Result<Self, Self::Error> {
        let student = Student {
            student_id: wire.student_id,
            name: wire.name,
            age: wire.age,
            email: wire.email,
            registered_courses: wire.registered_courses,
        };
        student.validate()?;
        Ok(student)
    }
}

impl Student {
    /// Creates a validated student with no registrations.
    pub fn new(
        student_id: StudentId,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let student = Self {
            student_id,
            name: name.into(),
            age,
            email: email.into(),
            registered_courses: BTreeSet::new(),
        };
        student.validate()?;
        Ok(student)
    }

    /// Checks id, name, email and age.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_person("student_id", self.student_id, &self.name, self.age, &self.email)
    }

    /// Returns whether this student is registered in `course_id`.
    pub fn is_registered(&self, course_id: CourseId) -> bool {
        self.registered_courses.contains(&course_id)
    }
}
