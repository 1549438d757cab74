//! Course domain model.
//!
//! # Responsibility
//! - Hold one course with its optional instructor and enrolled students.
//!
//! # Invariants
//! - At most one instructor per course.
//! - `enrolled_students` holds each student id at most once, ordered by id.

use crate::model::instructor::Instructor;
use crate::model::student::Student;
use crate::model::{CourseId, InstructorId, StudentId};
use crate::validation::{require_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Course hydrated with nested instructor and student records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CourseWire")]
pub struct Course {
    pub course_id: CourseId,
    pub course_name: String,
    pub instructor: Option<Instructor>,
    pub enrolled_students: Vec<Student>,
}

#[derive(Deserialize)]
struct CourseWire {
    course_id: CourseId,
    course_name: String,
    #[serde(default)]
    instructor: Option<Instructor>,
    #[serde(default)]
    enrolled_students: Vec<Student>,
}

impl TryFrom<CourseWire> for Course {
    type Error = ValidationError;

    fn try_from(wire: CourseWire) -> Result<Self, Self::Error> {
        let course = Course {
            course_id: wire.course_id,
            course_name: wire.course_name,
            instructor: wire.instructor,
            enrolled_students: wire.enrolled_students,
        };
        course.validate()?;
        Ok(course)
    }
}

impl Course {
    /// Creates a validated course without instructor or students.
    pub fn new(course_id: CourseId, course_name: impl Into<String>) -> Result<Self, ValidationError> {
        let course = Self {
            course_id,
            course_name: course_name.into(),
            instructor: None,
            enrolled_students: Vec::new(),
        };
        course.validate()?;
        Ok(course)
    }

    /// Checks id and name, then every nested record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("course_id", self.course_id)?;
        require_text("course_name", &self.course_name)?;
        if let Some(instructor) = &self.instructor {
            instructor.validate()?;
        }
        for student in &self.enrolled_students {
            student.validate()?;
        }
        Ok(())
    }

    /// Identifier of the assigned instructor, if any.
    pub fn instructor_id(&self) -> Option<InstructorId> {
        self.instructor.as_ref().map(|instructor| instructor.instructor_id)
    }

    /// Identifiers of enrolled students.
    pub fn student_ids(&self) -> BTreeSet<StudentId> {
        self.enrolled_students
            .iter()
            .map(|student| student.student_id)
            .collect()
    }

    /// Adds `student` unless already enrolled. Returns `false` on duplicate.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self
            .enrolled_students
            .iter()
            .any(|existing| existing.student_id == student.student_id)
        {
            return false;
        }
        let position = self
            .enrolled_students
            .partition_point(|existing| existing.student_id < student.student_id);
        self.enrolled_students.insert(position, student);
        true
    }
}
