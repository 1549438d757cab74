//! Core domain logic for the school records store.
//! This crate is the single source of truth for validation and referential invariants.

pub mod backup;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod status;
pub mod validation;

pub use backup::{export_csv, load_from_file, save_to_file, snapshot, BackupError, BackupResult};
pub use db::{open_db, open_db_in_memory, DbConfig, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::course::Course;
pub use model::instructor::Instructor;
pub use model::record::{Record, RecordCodec, RecordError, RecordResult};
pub use model::school::School;
pub use model::student::Student;
pub use model::{CourseId, EntityKind, InstructorId, StudentId};
pub use repo::school_repo::{
    CourseRow, EnrollmentRow, RepoError, RepoResult, SchoolRepository, SqliteSchoolRepository,
};
pub use search::{SearchField, Searchable};
pub use service::school_service::{
    AssignOutcome, PersonForm, SchoolService, ServiceError, ServiceResult,
};
pub use status::{StatusLine, StatusTicket};
pub use validation::{nonempty, validate_age, validate_email, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
