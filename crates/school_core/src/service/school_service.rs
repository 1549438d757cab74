//! School use-case service.
//!
//! # Responsibility
//! - Provide the operation set a form-based UI calls into.
//! - Normalize and validate input before delegating to the repository.
//! - Guard instructor reassignment behind explicit confirmation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Every mutating call emits exactly one structured log event.

use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::school::School;
use crate::model::student::Student;
use crate::model::{CourseId, EntityKind, InstructorId, StudentId};
use crate::repo::school_repo::{CourseRow, EnrollmentRow, RepoError, SchoolRepository};
use crate::search::{filter_entities, SearchField};
use crate::validation::{check_person, require_id, require_text, ValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to UI callers.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any store access.
    Validation(ValidationError),
    /// Course already has another instructor and the caller did not confirm.
    ReassignNeedsConfirmation {
        course_id: CourseId,
        current_instructor: InstructorId,
    },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReassignNeedsConfirmation {
                course_id,
                current_instructor,
            } => write!(
                f,
                "course {course_id} already has instructor {current_instructor}; confirmation required"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ReassignNeedsConfirmation { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of an instructor assignment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Course had no instructor before.
    Assigned,
    /// Course already had this instructor.
    Unchanged,
    /// Course moved from `previous` to the requested instructor.
    Reassigned { previous: InstructorId },
}

/// Form input for a student or instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonForm {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl PersonForm {
    pub fn new(id: i64, name: impl Into<String>, age: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    fn normalized(&self, id_field: &'static str) -> Result<Self, ValidationError> {
        let form = Self {
            id: self.id,
            name: self.name.trim().to_string(),
            age: self.age,
            email: self.email.trim().to_string(),
        };
        check_person(id_field, form.id, &form.name, form.age, &form.email)?;
        Ok(form)
    }
}

/// Use-case service over a school repository.
pub struct SchoolService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> SchoolService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Adds a student or overwrites the one with the same id.
    pub fn save_student(&mut self, form: &PersonForm) -> ServiceResult<()> {
        let form = form.normalized("student_id")?;
        let result = self
            .repo
            .upsert_student(form.id, &form.name, form.age, &form.email);
        log_outcome("student_upsert", &format!("student_id={}", form.id), &result);
        Ok(result?)
    }

    /// Adds an instructor or overwrites the one with the same id.
    pub fn save_instructor(&mut self, form: &PersonForm) -> ServiceResult<()> {
        let form = form.normalized("instructor_id")?;
        let result = self
            .repo
            .upsert_instructor(form.id, &form.name, form.age, &form.email);
        log_outcome(
            "instructor_upsert",
            &format!("instructor_id={}", form.id),
            &result,
        );
        Ok(result?)
    }

    /// Adds a course or overwrites the one with the same id.
    pub fn save_course(
        &mut self,
        course_id: CourseId,
        course_name: &str,
        instructor_id: Option<InstructorId>,
    ) -> ServiceResult<()> {
        let course_name = course_name.trim();
        require_id("course_id", course_id)?;
        require_text("course_name", course_name)?;
        let result = self
            .repo
            .upsert_course(course_id, course_name, instructor_id);
        log_outcome("course_upsert", &format!("course_id={course_id}"), &result);
        Ok(result?)
    }

    /// Assigns an instructor, requiring `confirmed` to replace a different one.
    pub fn assign_instructor(
        &mut self,
        course_id: CourseId,
        instructor_id: InstructorId,
        confirmed: bool,
    ) -> ServiceResult<AssignOutcome> {
        require_id("course_id", course_id)?;
        require_id("instructor_id", instructor_id)?;

        let course = self
            .repo
            .get_course_row(course_id)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            })?;
        let outcome = match course.instructor_id {
            None => AssignOutcome::Assigned,
            Some(current) if current == instructor_id => return Ok(AssignOutcome::Unchanged),
            Some(current) if !confirmed => {
                return Err(ServiceError::ReassignNeedsConfirmation {
                    course_id,
                    current_instructor: current,
                });
            }
            Some(previous) => AssignOutcome::Reassigned { previous },
        };

        let result = self.repo.assign_instructor(course_id, instructor_id);
        log_outcome(
            "instructor_assign",
            &format!("course_id={course_id} instructor_id={instructor_id}"),
            &result,
        );
        result?;
        Ok(outcome)
    }

    pub fn unassign_instructor(&mut self, course_id: CourseId) -> ServiceResult<()> {
        let result = self.repo.unassign_instructor(course_id);
        log_outcome("instructor_unassign", &format!("course_id={course_id}"), &result);
        Ok(result?)
    }

    /// Enrolls a student. Returns `false` when already enrolled.
    pub fn enroll(&mut self, student_id: StudentId, course_id: CourseId) -> ServiceResult<bool> {
        require_id("student_id", student_id)?;
        require_id("course_id", course_id)?;
        let result = self.repo.enroll(student_id, course_id);
        log_outcome(
            "enroll",
            &format!("student_id={student_id} course_id={course_id}"),
            &result,
        );
        Ok(result?)
    }

    pub fn unenroll(&mut self, student_id: StudentId, course_id: CourseId) -> ServiceResult<bool> {
        let result = self.repo.unenroll(student_id, course_id);
        log_outcome(
            "unenroll",
            &format!("student_id={student_id} course_id={course_id}"),
            &result,
        );
        Ok(result?)
    }

    pub fn delete(&mut self, kind: EntityKind, id: i64) -> ServiceResult<()> {
        let result = match kind {
            EntityKind::Student => self.repo.delete_student(id),
            EntityKind::Instructor => self.repo.delete_instructor(id),
            EntityKind::Course => self.repo.delete_course(id),
        };
        log_outcome(
            "entity_delete",
            &format!("kind={} id={id}", kind.as_str()),
            &result,
        );
        Ok(result?)
    }

    /// Renames a primary identifier, propagating to every reference.
    pub fn rename(&mut self, kind: EntityKind, old_id: i64, new_id: i64) -> ServiceResult<()> {
        let result = self.repo.rename_identifier(kind, old_id, new_id);
        log_outcome(
            "entity_rename",
            &format!("kind={} old_id={old_id} new_id={new_id}", kind.as_str()),
            &result,
        );
        Ok(result?)
    }

    /// Replaces all stored data with `school`.
    pub fn import(&mut self, school: &School) -> ServiceResult<()> {
        let result = self.repo.replace_all(school);
        log_outcome(
            "school_import",
            &format!(
                "students={} instructors={} courses={}",
                school.students.len(),
                school.instructors.len(),
                school.courses.len()
            ),
            &result,
        );
        Ok(result?)
    }

    pub fn students(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students()?)
    }

    pub fn instructors(&self) -> ServiceResult<Vec<Instructor>> {
        Ok(self.repo.list_instructors()?)
    }

    pub fn courses(&self) -> ServiceResult<Vec<CourseRow>> {
        Ok(self.repo.list_courses()?)
    }

    pub fn roster(&self, course_id: CourseId) -> ServiceResult<Vec<EnrollmentRow>> {
        Ok(self.repo.list_enrollments(course_id)?)
    }

    pub fn snapshot_state(&self) -> ServiceResult<School> {
        Ok(self.repo.load_school()?)
    }

    pub fn search_students(&self, field: SearchField, query: &str) -> ServiceResult<Vec<Student>> {
        Ok(filter_entities(self.repo.list_students()?, field, query))
    }

    pub fn search_instructors(
        &self,
        field: SearchField,
        query: &str,
    ) -> ServiceResult<Vec<Instructor>> {
        Ok(filter_entities(self.repo.list_instructors()?, field, query))
    }

    pub fn search_courses(&self, field: SearchField, query: &str) -> ServiceResult<Vec<Course>> {
        Ok(filter_entities(self.repo.load_courses()?, field, query))
    }
}

fn log_outcome<T>(event: &str, fields: &str, result: &Result<T, RepoError>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok {fields}"),
        Err(err) => warn!("event={event} module=service status=error {fields} error={err}"),
    }
}
