//! Instructor domain model.

use crate::model::{CourseId, InstructorId};
use crate::validation::{check_person, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Instructor with the set of courses they teach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstructorWire")]
pub struct Instructor {
    pub instructor_id: InstructorId,
    pub name: String,
    pub age: i64,
    pub email: String,
    /// Derived from `courses.instructor_id` when loaded from storage.
    pub assigned_courses: BTreeSet<CourseId>,
}

#[derive(Deserialize)]
struct InstructorWire {
    instructor_id: InstructorId,
    name: String,
    age: i64,
    email: String,
    #[serde(default)]
    assigned_courses: BTreeSet<CourseId>,
}

impl TryFrom<InstructorWire> for Instructor {
    type Error = ValidationError;

    fn try_from(wire: InstructorWire) -> Result<Self, Self::Error> {
        let instructor = Instructor {
            instructor_id: wire.instructor_id,
            name: wire.name,
            age: wire.age,
            email: wire.email,
            assigned_courses: wire.assigned_courses,
        };
        instructor.validate()?;
        Ok(instructor)
    }
}

impl Instructor {
    /// Creates a validated instructor with no assignments.
    pub fn new(
        instructor_id: InstructorId,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let instructor = Self {
            instructor_id,
            name: name.into(),
            age,
            email: email.into(),
            assigned_courses: BTreeSet::new(),
        };
        instructor.validate()?;
        Ok(instructor)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_person(
            "instructor_id",
            self.instructor_id,
            &self.name,
            self.age,
            &self.email,
        )
    }
}
