//! Field-scoped text matching for hydrated entities.
//!
//! # Responsibility
//! - Parse user-facing field labels into `SearchField`.
//! - Expose one searchable text per entity and field.
//!
//! # Invariants
//! - `field_text` returns `None` for fields an entity kind does not carry.

use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::student::Student;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Field a search query is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Every displayed column joined by spaces.
    All,
    Id,
    Name,
    Email,
    /// Registered (student) or assigned (instructor) course ids.
    Course,
    /// Enrolled student names of a course.
    Student,
    /// Instructor name of a course.
    Instructor,
}

/// Label did not name a known search field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSearchField(pub String);

impl Display for UnknownSearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown search field `{}`", self.0)
    }
}

impl Error for UnknownSearchField {}

impl FromStr for SearchField {
    type Err = UnknownSearchField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "course" | "assignedcourse" | "courses" => Ok(Self::Course),
            "student" | "students" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            other => Err(UnknownSearchField(other.to_string())),
        }
    }
}

/// Text view of an entity used for search matching.
pub trait Searchable {
    /// Returns the haystack for `field`, or `None` when the field does not apply.
    fn field_text(&self, field: SearchField) -> Option<String>;
}

impl Searchable for Student {
    fn field_text(&self, field: SearchField) -> Option<String> {
        let courses = join_ids(&self.registered_courses);
        match field {
            SearchField::All => Some(format!(
                "{} {} {} {} {}",
                self.student_id, self.name, self.age, self.email, courses
            )),
            SearchField::Id => Some(self.student_id.to_string()),
            SearchField::Name => Some(self.name.clone()),
            SearchField::Email => Some(self.email.clone()),
            SearchField::Course => Some(courses),
            SearchField::Student | SearchField::Instructor => None,
        }
    }
}

impl Searchable for Instructor {
    fn field_text(&self, field: SearchField) -> Option<String> {
        let courses = join_ids(&self.assigned_courses);
        match field {
            SearchField::All => Some(format!(
                "{} {} {} {} {}",
                self.instructor_id, self.name, self.age, self.email, courses
            )),
            SearchField::Id => Some(self.instructor_id.to_string()),
            SearchField::Name => Some(self.name.clone()),
            SearchField::Email => Some(self.email.clone()),
            SearchField::Course => Some(courses),
            SearchField::Student | SearchField::Instructor => None,
        }
    }
}

impl Searchable for Course {
    fn field_text(&self, field: SearchField) -> Option<String> {
        let instructor = self
            .instructor
            .as_ref()
            .map(|instructor| instructor.name.clone())
            .unwrap_or_default();
        let students = self
            .enrolled_students
            .iter()
            .map(|student| student.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        match field {
            SearchField::All => Some(format!(
                "{} {} {} {}",
                self.course_id, self.course_name, instructor, students
            )),
            SearchField::Id => Some(self.course_id.to_string()),
            SearchField::Name => Some(self.course_name.clone()),
            SearchField::Instructor => Some(instructor),
            SearchField::Student => Some(students),
            SearchField::Email | SearchField::Course => None,
        }
    }
}

/// Returns whether `item` matches `query` on `field`.
pub fn matches<T: Searchable>(item: &T, field: SearchField, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.field_text(field)
        .is_some_and(|haystack| haystack.to_lowercase().contains(&needle))
}

/// Keeps the items matching `query` on `field`, preserving order.
pub fn filter_entities<T: Searchable>(items: Vec<T>, field: SearchField, query: &str) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| matches(item, field, query))
        .collect()
}

fn join_ids(ids: &BTreeSet<i64>) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
