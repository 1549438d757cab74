//! CSV export of the three entity collections.

use super::{io_error, BackupResult};
use crate::model::school::School;
use log::info;
use std::fs::File;
use std::path::Path;

pub const STUDENTS_CSV: &str = "students.csv";
pub const INSTRUCTORS_CSV: &str = "instructors.csv";
pub const COURSES_CSV: &str = "courses.csv";

pub const STUDENTS_HEADER: [&str; 5] = ["ID", "Name", "Age", "Email", "RegisteredCourses"];
pub const INSTRUCTORS_HEADER: [&str; 5] = ["ID", "Name", "Age", "Email", "AssignedCourses"];
pub const COURSES_HEADER: [&str; 4] = ["ID", "Name", "Instructor", "EnrolledStudents"];

/// Separator used inside list-valued cells.
pub const LIST_DELIMITER: &str = "|";

/// Writes `students.csv`, `instructors.csv` and `courses.csv` into `target_dir`.
///
/// # Side effects
/// - Creates `target_dir` when missing and overwrites existing files.
pub fn export_csv(school: &School, target_dir: impl AsRef<Path>) -> BackupResult<()> {
    let target_dir = target_dir.as_ref();
    std::fs::create_dir_all(target_dir).map_err(io_error(target_dir))?;

    let mut writer = open_writer(&target_dir.join(STUDENTS_CSV))?;
    writer.write_record(STUDENTS_HEADER)?;
    for student in &school.students {
        writer.write_record([
            student.student_id.to_string(),
            student.name.clone(),
            student.age.to_string(),
            student.email.clone(),
            join_list(student.registered_courses.iter().map(i64::to_string)),
        ])?;
    }
    writer.flush().map_err(io_error(target_dir.join(STUDENTS_CSV)))?;

    let mut writer = open_writer(&target_dir.join(INSTRUCTORS_CSV))?;
    writer.write_record(INSTRUCTORS_HEADER)?;
    for instructor in &school.instructors {
        writer.write_record([
            instructor.instructor_id.to_string(),
            instructor.name.clone(),
            instructor.age.to_string(),
            instructor.email.clone(),
            join_list(instructor.assigned_courses.iter().map(i64::to_string)),
        ])?;
    }
    writer
        .flush()
        .map_err(io_error(target_dir.join(INSTRUCTORS_CSV)))?;

    let mut writer = open_writer(&target_dir.join(COURSES_CSV))?;
    writer.write_record(COURSES_HEADER)?;
    for course in &school.courses {
        let instructor = course
            .instructor
            .as_ref()
            .map(|instructor| instructor.name.clone())
            .unwrap_or_default();
        writer.write_record([
            course.course_id.to_string(),
            course.course_name.clone(),
            instructor,
            join_list(
                course
                    .enrolled_students
                    .iter()
                    .map(|student| student.name.clone()),
            ),
        ])?;
    }
    writer.flush().map_err(io_error(target_dir.join(COURSES_CSV)))?;

    info!(
        "event=csv_export module=backup status=ok students={} instructors={} courses={}",
        school.students.len(),
        school.instructors.len(),
        school.courses.len()
    );
    Ok(())
}

fn open_writer(path: &Path) -> BackupResult<csv::Writer<File>> {
    let file = File::create(path).map_err(io_error(path))?;
    Ok(csv::Writer::from_writer(file))
}

fn join_list(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(LIST_DELIMITER)
}
