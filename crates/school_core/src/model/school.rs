//! In-memory school state.
//!
//! # Responsibility
//! - Hold all entity collections for the file-backed variant.
//! - Serve as the full-state payload for JSON dump/restore and CSV export.
//!
//! # Invariants
//! - Each collection holds at most one entity per identifier.
//! - `add_*` replaces an entity with the same identifier in place.

use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::student::Student;
use crate::model::{CourseId, InstructorId, StudentId};
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Complete set of students, instructors and courses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub students: Vec<Student>,
    pub instructors: Vec<Instructor>,
    pub courses: Vec<Course>,
}

impl School {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a student by id.
    pub fn add_student(&mut self, student: Student) -> Result<(), ValidationError> {
        student.validate()?;
        upsert_by(&mut self.students, student, |item| item.student_id);
        Ok(())
    }

    /// Inserts or replaces an instructor by id.
    pub fn add_instructor(&mut self, instructor: Instructor) -> Result<(), ValidationError> {
        instructor.validate()?;
        upsert_by(&mut self.instructors, instructor, |item| item.instructor_id);
        Ok(())
    }

    /// Inserts or replaces a course by id.
    pub fn add_course(&mut self, course: Course) -> Result<(), ValidationError> {
        course.validate()?;
        upsert_by(&mut self.courses, course, |item| item.course_id);
        Ok(())
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|item| item.student_id == id)
    }

    pub fn instructor(&self, id: InstructorId) -> Option<&Instructor> {
        self.instructors.iter().find(|item| item.instructor_id == id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|item| item.course_id == id)
    }

    /// Total number of entities across all collections.
    pub fn len(&self) -> usize {
        self.students.len() + self.instructors.len() + self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn upsert_by<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let id = key(&item);
    match items.iter().position(|existing| key(existing) == id) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::School;
    use crate::model::student::Student;

    #[test]
    fn add_student_replaces_same_id() {
        let mut school = School::new();
        school
            .add_student(Student::new(1, "Ann", 20, "ann@x.com").unwrap())
            .unwrap();
        school
            .add_student(Student::new(1, "Annie", 21, "annie@x.com").unwrap())
            .unwrap();

        assert_eq!(school.students.len(), 1);
        assert_eq!(school.student(1).unwrap().name, "Annie");
    }
}
