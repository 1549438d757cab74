//! School repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/list/delete APIs over `students`, `instructors`,
//!   `courses` and `enrollments`.
//! - Enforce per-type email uniqueness and instructor/course references.
//! - Hydrate query results back into domain entities.
//!
//! # Invariants
//! - Email uniqueness is per entity type, never across types.
//! - Deleting a student or course removes its enrollment rows; deleting an
//!   instructor clears `courses.instructor_id`.
//! - Identifier renames update the primary row and every referencing row in
//!   one transaction, or leave the store untouched.
//! - List results are ordered by primary identifier ascending.

use crate::db::DbError;
use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::school::School;
use crate::model::student::Student;
use crate::model::{CourseId, EntityKind, InstructorId, StudentId};
use crate::validation::{check_person, require_id, require_text, ValidationError};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for school persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input failed validation before reaching storage.
    Validation(ValidationError),
    /// Email already belongs to another entity of the same kind.
    DuplicateEmail { kind: EntityKind, email: String },
    /// Target identifier is already taken for that kind.
    DuplicateId { kind: EntityKind, id: i64 },
    /// Operation referenced an identifier that does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Course references an instructor that does not exist.
    UnknownInstructor(InstructorId),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Connection was opened without `PRAGMA foreign_keys=ON`.
    ForeignKeysDisabled,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateEmail { kind, email } => {
                write!(f, "{kind} email already in use: {email}")
            }
            Self::DuplicateId { kind, id } => write!(f, "{kind} id already exists: {id}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UnknownInstructor(id) => write!(f, "instructor does not exist: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "school repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "school repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "school repository requires column `{column}` in table `{table}`"
            ),
            Self::ForeignKeysDisabled => {
                write!(f, "school repository requires PRAGMA foreign_keys=ON")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Course list row with left-joined instructor contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub course_id: CourseId,
    pub course_name: String,
    /// `None` when no instructor is assigned.
    pub instructor_id: Option<InstructorId>,
    pub instructor_name: Option<String>,
    pub instructor_email: Option<String>,
}

/// Minimal student projection shown in a course roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRow {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
}

/// Repository interface for school CRUD operations.
pub trait SchoolRepository {
    /// Inserts or overwrites the student row with matching id.
    fn upsert_student(
        &mut self,
        student_id: StudentId,
        name: &str,
        age: i64,
        email: &str,
    ) -> RepoResult<()>;
    /// Inserts or overwrites the instructor row with matching id.
    fn upsert_instructor(
        &mut self,
        instructor_id: InstructorId,
        name: &str,
        age: i64,
        email: &str,
    ) -> RepoResult<()>;
    /// Inserts or overwrites the course row. Non-positive instructor ids mean "none".
    fn upsert_course(
        &mut self,
        course_id: CourseId,
        course_name: &str,
        instructor_id: Option<InstructorId>,
    ) -> RepoResult<()>;
    /// Points a course at an existing instructor.
    fn assign_instructor(
        &mut self,
        course_id: CourseId,
        instructor_id: InstructorId,
    ) -> RepoResult<()>;
    /// Clears a course's instructor reference.
    fn unassign_instructor(&mut self, course_id: CourseId) -> RepoResult<()>;
    /// Enrolls a student. Returns `false` when the pair already existed.
    fn enroll(&mut self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool>;
    /// Removes one enrollment pair. Returns `false` when it did not exist.
    fn unenroll(&mut self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool>;
    fn get_student(&self, student_id: StudentId) -> RepoResult<Option<Student>>;
    fn get_instructor(&self, instructor_id: InstructorId) -> RepoResult<Option<Instructor>>;
    fn get_course_row(&self, course_id: CourseId) -> RepoResult<Option<CourseRow>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn list_instructors(&self) -> RepoResult<Vec<Instructor>>;
    fn list_courses(&self) -> RepoResult<Vec<CourseRow>>;
    /// Students enrolled in `course_id`, ordered by student id.
    fn list_enrollments(&self, course_id: CourseId) -> RepoResult<Vec<EnrollmentRow>>;
    /// Courses with nested instructor and enrolled students.
    fn load_courses(&self) -> RepoResult<Vec<Course>>;
    /// Full store contents as an in-memory `School`.
    fn load_school(&self) -> RepoResult<School>;
    fn delete_student(&mut self, student_id: StudentId) -> RepoResult<()>;
    fn delete_instructor(&mut self, instructor_id: InstructorId) -> RepoResult<()>;
    fn delete_course(&mut self, course_id: CourseId) -> RepoResult<()>;
    /// Changes a primary identifier and every row that references it.
    fn rename_identifier(&mut self, kind: EntityKind, old_id: i64, new_id: i64)
        -> RepoResult<()>;
    /// Replaces the whole store with `school` in one transaction.
    fn replace_all(&mut self, school: &School) -> RepoResult<()>;
}

/// SQLite-backed school repository.
pub struct SqliteSchoolRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSchoolRepository<'conn> {
    /// Constructs a repository from a migrated connection with foreign keys on.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        super::readiness::ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Read-only access to the underlying connection (snapshots, diagnostics).
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }

    fn upsert_person(
        &mut self,
        table: &'static Table,
        id: i64,
        name: &str,
        age: i64,
        email: &str,
    ) -> RepoResult<()> {
        let name = name.trim();
        let email = email.trim();
        check_person(table.id_field, id, name, age, email)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(owner) = email_owner(&tx, table, email)? {
            if owner != id {
                return Err(RepoError::DuplicateEmail {
                    kind: table.kind,
                    email: email.to_string(),
                });
            }
        }

        tx.execute(
            &format!(
                "INSERT INTO {table} ({id_col}, name, age, email)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT({id_col}) DO UPDATE SET
                    name = excluded.name,
                    age = excluded.age,
                    email = excluded.email;",
                table = table.name,
                id_col = table.id_column,
            ),
            params![id, name, age, email],
        )
        .map_err(|err| map_email_conflict(err, table.kind, email))?;
        tx.commit()?;
        Ok(())
    }

    fn delete_by_id(&mut self, table: &'static Table, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1;",
                table.name, table.id_column
            ),
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: table.kind,
                id,
            });
        }
        Ok(())
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn upsert_student(
        &mut self,
        student_id: StudentId,
        name: &str,
        age: i64,
        email: &str,
    ) -> RepoResult<()> {
        self.upsert_person(&STUDENTS, student_id, name, age, email)
    }

    fn upsert_instructor(
        &mut self,
        instructor_id: InstructorId,
        name: &str,
        age: i64,
        email: &str,
    ) -> RepoResult<()> {
        self.upsert_person(&INSTRUCTORS, instructor_id, name, age, email)
    }

    fn upsert_course(
        &mut self,
        course_id: CourseId,
        course_name: &str,
        instructor_id: Option<InstructorId>,
    ) -> RepoResult<()> {
        let course_name = course_name.trim();
        require_id("course_id", course_id)?;
        require_text("course_name", course_name)?;
        let instructor_id = instructor_id.filter(|id| *id > 0);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(instructor_id) = instructor_id {
            if !row_exists(&tx, &INSTRUCTORS, instructor_id)? {
                return Err(RepoError::UnknownInstructor(instructor_id));
            }
        }

        tx.execute(
            "INSERT INTO courses (course_id, course_name, instructor_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(course_id) DO UPDATE SET
                course_name = excluded.course_name,
                instructor_id = excluded.instructor_id;",
            params![course_id, course_name, instructor_id],
        )
        .map_err(|err| match (is_foreign_key_violation(&err), instructor_id) {
            (true, Some(id)) => RepoError::UnknownInstructor(id),
            _ => RepoError::from(err),
        })?;
        tx.commit()?;
        Ok(())
    }

    fn assign_instructor(
        &mut self,
        course_id: CourseId,
        instructor_id: InstructorId,
    ) -> RepoResult<()> {
        require_id("course_id", course_id)?;
        require_id("instructor_id", instructor_id)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !row_exists(&tx, &COURSES, course_id)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            });
        }
        if !row_exists(&tx, &INSTRUCTORS, instructor_id)? {
            return Err(RepoError::UnknownInstructor(instructor_id));
        }

        tx.execute(
            "UPDATE courses SET instructor_id = ?1 WHERE course_id = ?2;",
            params![instructor_id, course_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn unassign_instructor(&mut self, course_id: CourseId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE courses SET instructor_id = NULL WHERE course_id = ?1;",
            [course_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            });
        }
        Ok(())
    }

    fn enroll(&mut self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool> {
        require_id("student_id", student_id)?;
        require_id("course_id", course_id)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !row_exists(&tx, &STUDENTS, student_id)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Student,
                id: student_id,
            });
        }
        if !row_exists(&tx, &COURSES, course_id)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            });
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO enrollments (student_id, course_id) VALUES (?1, ?2);",
            params![student_id, course_id],
        )?;
        tx.commit()?;
        Ok(inserted == 1)
    }

    fn unenroll(&mut self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM enrollments WHERE student_id = ?1 AND course_id = ?2;",
            params![student_id, course_id],
        )?;
        Ok(removed == 1)
    }

    fn get_student(&self, student_id: StudentId) -> RepoResult<Option<Student>> {
        let person = self
            .conn
            .query_row(
                "SELECT student_id, name, age, email FROM students WHERE student_id = ?1;",
                [student_id],
                |row| PersonRow::from_row(row, "student_id"),
            )
            .optional()?;
        let Some(person) = person else {
            return Ok(None);
        };
        let courses = linked_course_ids(
            &*self.conn,
            "SELECT course_id FROM enrollments WHERE student_id = ?1;",
            person.id,
        )?;
        Ok(Some(person_into_student(person, courses)?))
    }

    fn get_instructor(&self, instructor_id: InstructorId) -> RepoResult<Option<Instructor>> {
        let person = self
            .conn
            .query_row(
                "SELECT instructor_id, name, age, email FROM instructors WHERE instructor_id = ?1;",
                [instructor_id],
                |row| PersonRow::from_row(row, "instructor_id"),
            )
            .optional()?;
        let Some(person) = person else {
            return Ok(None);
        };
        let courses = linked_course_ids(
            &*self.conn,
            "SELECT course_id FROM courses WHERE instructor_id = ?1;",
            person.id,
        )?;
        Ok(Some(person_into_instructor(person, courses)?))
    }

    fn get_course_row(&self, course_id: CourseId) -> RepoResult<Option<CourseRow>> {
        let row = self
            .conn
            .query_row(
                &format!("{COURSE_ROW_SELECT_SQL} WHERE c.course_id = ?1;"),
                [course_id],
                parse_course_row,
            )
            .optional()?;
        Ok(row)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut registrations = registrations_by_student(&*self.conn)?;
        let mut stmt = self.conn.prepare(
            "SELECT student_id, name, age, email
             FROM students
             ORDER BY student_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let person = PersonRow::from_row(row, "student_id")?;
            let courses = registrations.remove(&person.id).unwrap_or_default();
            students.push(person_into_student(person, courses)?);
        }
        Ok(students)
    }

    fn list_instructors(&self) -> RepoResult<Vec<Instructor>> {
        let mut assignments = assignments_by_instructor(&*self.conn)?;
        let mut stmt = self.conn.prepare(
            "SELECT instructor_id, name, age, email
             FROM instructors
             ORDER BY instructor_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut instructors = Vec::new();
        while let Some(row) = rows.next()? {
            let person = PersonRow::from_row(row, "instructor_id")?;
            let courses = assignments.remove(&person.id).unwrap_or_default();
            instructors.push(person_into_instructor(person, courses)?);
        }
        Ok(instructors)
    }

    fn list_courses(&self) -> RepoResult<Vec<CourseRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_ROW_SELECT_SQL} ORDER BY c.course_id ASC;"))?;
        let rows = stmt.query_map([], parse_course_row)?;
        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?);
        }
        Ok(courses)
    }

    fn list_enrollments(&self, course_id: CourseId) -> RepoResult<Vec<EnrollmentRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.student_id, s.name, s.email
             FROM enrollments e
             INNER JOIN students s ON s.student_id = e.student_id
             WHERE e.course_id = ?1
             ORDER BY s.student_id ASC;",
        )?;
        let rows = stmt.query_map([course_id], |row| {
            Ok(EnrollmentRow {
                student_id: row.get("student_id")?,
                name: row.get("name")?,
                email: row.get("email")?,
            })
        })?;
        let mut roster = Vec::new();
        for row in rows {
            roster.push(row?);
        }
        Ok(roster)
    }

    fn load_courses(&self) -> RepoResult<Vec<Course>> {
        let instructors: BTreeMap<InstructorId, Instructor> = self
            .list_instructors()?
            .into_iter()
            .map(|instructor| (instructor.instructor_id, instructor))
            .collect();
        let students: BTreeMap<StudentId, Student> = self
            .list_students()?
            .into_iter()
            .map(|student| (student.student_id, student))
            .collect();
        let mut rosters: BTreeMap<CourseId, Vec<Student>> = BTreeMap::new();
        for student in students.values() {
            for course_id in &student.registered_courses {
                rosters.entry(*course_id).or_default().push(student.clone());
            }
        }

        let mut courses = Vec::new();
        for row in self.list_courses()? {
            let instructor = match row.instructor_id {
                Some(id) => Some(instructors.get(&id).cloned().ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "course {} references missing instructor {id}",
                        row.course_id
                    ))
                })?),
                None => None,
            };
            let course = Course {
                course_id: row.course_id,
                course_name: row.course_name,
                instructor,
                enrolled_students: rosters.remove(&row.course_id).unwrap_or_default(),
            };
            course.validate().map_err(|err| {
                RepoError::InvalidData(format!("course {}: {err}", course.course_id))
            })?;
            courses.push(course);
        }
        Ok(courses)
    }

    fn load_school(&self) -> RepoResult<School> {
        Ok(School {
            students: self.list_students()?,
            instructors: self.list_instructors()?,
            courses: self.load_courses()?,
        })
    }

    fn delete_student(&mut self, student_id: StudentId) -> RepoResult<()> {
        self.delete_by_id(&STUDENTS, student_id)
    }

    fn delete_instructor(&mut self, instructor_id: InstructorId) -> RepoResult<()> {
        self.delete_by_id(&INSTRUCTORS, instructor_id)
    }

    fn delete_course(&mut self, course_id: CourseId) -> RepoResult<()> {
        self.delete_by_id(&COURSES, course_id)
    }

    fn rename_identifier(
        &mut self,
        kind: EntityKind,
        old_id: i64,
        new_id: i64,
    ) -> RepoResult<()> {
        let table = table_for(kind);
        require_id(table.id_field, old_id)?;
        require_id(table.id_field, new_id)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !row_exists(&tx, table, old_id)? {
            return Err(RepoError::NotFound { kind, id: old_id });
        }
        if old_id == new_id {
            return Ok(());
        }
        if row_exists(&tx, table, new_id)? {
            return Err(RepoError::DuplicateId { kind, id: new_id });
        }

        // Referencing rows follow through ON UPDATE CASCADE.
        tx.execute(
            &format!(
                "UPDATE {} SET {col} = ?1 WHERE {col} = ?2;",
                table.name,
                col = table.id_column
            ),
            params![new_id, old_id],
        )?;

        let leftover = count_references(&tx, kind, old_id)?;
        if leftover > 0 {
            return Err(RepoError::InvalidData(format!(
                "{kind} rename {old_id}->{new_id} left {leftover} dangling references"
            )));
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&mut self, school: &School) -> RepoResult<()> {
        let plan = ImportPlan::from_school(school)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(
            "DELETE FROM enrollments;
             DELETE FROM courses;
             DELETE FROM students;
             DELETE FROM instructors;",
        )?;

        for instructor in plan.instructors.values() {
            insert_person(
                &tx,
                &INSTRUCTORS,
                instructor.instructor_id,
                &instructor.name,
                instructor.age,
                &instructor.email,
            )?;
        }
        for student in plan.students.values() {
            insert_person(
                &tx,
                &STUDENTS,
                student.student_id,
                &student.name,
                student.age,
                &student.email,
            )?;
        }
        for (course_id, (course_name, instructor_id)) in &plan.courses {
            tx.execute(
                "INSERT INTO courses (course_id, course_name, instructor_id) VALUES (?1, ?2, ?3);",
                params![course_id, course_name, instructor_id],
            )?;
        }
        for (student_id, course_id) in &plan.enrollments {
            if !plan.courses.contains_key(course_id) {
                return Err(RepoError::NotFound {
                    kind: EntityKind::Course,
                    id: *course_id,
                });
            }
            tx.execute(
                "INSERT OR IGNORE INTO enrollments (student_id, course_id) VALUES (?1, ?2);",
                params![student_id, course_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

/// Static description of one entity table.
struct Table {
    kind: EntityKind,
    name: &'static str,
    id_column: &'static str,
    id_field: &'static str,
}

const STUDENTS: Table = Table {
    kind: EntityKind::Student,
    name: "students",
    id_column: "student_id",
    id_field: "student_id",
};

const INSTRUCTORS: Table = Table {
    kind: EntityKind::Instructor,
    name: "instructors",
    id_column: "instructor_id",
    id_field: "instructor_id",
};

const COURSES: Table = Table {
    kind: EntityKind::Course,
    name: "courses",
    id_column: "course_id",
    id_field: "course_id",
};

fn table_for(kind: EntityKind) -> &'static Table {
    match kind {
        EntityKind::Student => &STUDENTS,
        EntityKind::Instructor => &INSTRUCTORS,
        EntityKind::Course => &COURSES,
    }
}

const COURSE_ROW_SELECT_SQL: &str = "SELECT
    c.course_id,
    c.course_name,
    c.instructor_id,
    i.name AS instructor_name,
    i.email AS instructor_email
FROM courses c
LEFT JOIN instructors i ON i.instructor_id = c.instructor_id";

/// Raw person columns shared by students and instructors.
struct PersonRow {
    id: i64,
    name: String,
    age: i64,
    email: String,
}

impl PersonRow {
    fn from_row(row: &Row<'_>, id_column: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(id_column)?,
            name: row.get("name")?,
            age: row.get("age")?,
            email: row.get("email")?,
        })
    }
}

fn person_into_student(person: PersonRow, courses: BTreeSet<CourseId>) -> RepoResult<Student> {
    let student = Student {
        student_id: person.id,
        name: person.name,
        age: person.age,
        email: person.email,
        registered_courses: courses,
    };
    student.validate().map_err(|err| {
        RepoError::InvalidData(format!("student {}: {err}", student.student_id))
    })?;
    Ok(student)
}

fn person_into_instructor(
    person: PersonRow,
    courses: BTreeSet<CourseId>,
) -> RepoResult<Instructor> {
    let instructor = Instructor {
        instructor_id: person.id,
        name: person.name,
        age: person.age,
        email: person.email,
        assigned_courses: courses,
    };
    instructor.validate().map_err(|err| {
        RepoError::InvalidData(format!("instructor {}: {err}", instructor.instructor_id))
    })?;
    Ok(instructor)
}

fn parse_course_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        course_id: row.get("course_id")?,
        course_name: row.get("course_name")?,
        instructor_id: row.get("instructor_id")?,
        instructor_name: row.get("instructor_name")?,
        instructor_email: row.get("instructor_email")?,
    })
}

fn registrations_by_student(
    conn: &Connection,
) -> RepoResult<BTreeMap<StudentId, BTreeSet<CourseId>>> {
    let mut stmt = conn.prepare("SELECT student_id, course_id FROM enrollments;")?;
    let mut rows = stmt.query([])?;
    let mut map: BTreeMap<StudentId, BTreeSet<CourseId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        map.entry(row.get(0)?).or_default().insert(row.get(1)?);
    }
    Ok(map)
}

fn assignments_by_instructor(
    conn: &Connection,
) -> RepoResult<BTreeMap<InstructorId, BTreeSet<CourseId>>> {
    let mut stmt = conn.prepare(
        "SELECT instructor_id, course_id
         FROM courses
         WHERE instructor_id IS NOT NULL;",
    )?;
    let mut rows = stmt.query([])?;
    let mut map: BTreeMap<InstructorId, BTreeSet<CourseId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        map.entry(row.get(0)?).or_default().insert(row.get(1)?);
    }
    Ok(map)
}

fn linked_course_ids(conn: &Connection, sql: &str, id: i64) -> RepoResult<BTreeSet<CourseId>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([id], |row| row.get::<_, CourseId>(0))?;
    let mut ids = BTreeSet::new();
    for row in rows {
        ids.insert(row?);
    }
    Ok(ids)
}

fn row_exists(conn: &Connection, table: &Table, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            table.name, table.id_column
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn email_owner(conn: &Connection, table: &Table, email: &str) -> RepoResult<Option<i64>> {
    let owner = conn
        .query_row(
            &format!(
                "SELECT {} FROM {} WHERE email = ?1;",
                table.id_column, table.name
            ),
            [email],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

fn count_references(conn: &Connection, kind: EntityKind, id: i64) -> RepoResult<i64> {
    let sql = match kind {
        EntityKind::Student => "SELECT COUNT(*) FROM enrollments WHERE student_id = ?1;",
        EntityKind::Course => "SELECT COUNT(*) FROM enrollments WHERE course_id = ?1;",
        EntityKind::Instructor => "SELECT COUNT(*) FROM courses WHERE instructor_id = ?1;",
    };
    let count = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(count)
}

fn insert_person(
    conn: &Connection,
    table: &Table,
    id: i64,
    name: &str,
    age: i64,
    email: &str,
) -> RepoResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} ({}, name, age, email) VALUES (?1, ?2, ?3, ?4);",
            table.name, table.id_column
        ),
        params![id, name, age, email],
    )
    .map_err(|err| map_email_conflict(err, table.kind, email))?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn map_email_conflict(err: rusqlite::Error, kind: EntityKind, email: &str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateEmail {
            kind,
            email: email.to_string(),
        }
    } else {
        RepoError::from(err)
    }
}

/// Normalized import payload derived from a `School`.
///
/// Nested course records contribute their instructor and students when the
/// top-level collections do not already hold that id. An instructor's
/// `assigned_courses` sets the course's instructor; a course claimed by two
/// different instructors, or an assignment to an absent course, is rejected.
struct ImportPlan {
    students: BTreeMap<StudentId, Student>,
    instructors: BTreeMap<InstructorId, Instructor>,
    courses: BTreeMap<CourseId, (String, Option<InstructorId>)>,
    enrollments: BTreeSet<(StudentId, CourseId)>,
}

impl ImportPlan {
    fn from_school(school: &School) -> RepoResult<Self> {
        let mut plan = Self {
            students: BTreeMap::new(),
            instructors: BTreeMap::new(),
            courses: BTreeMap::new(),
            enrollments: BTreeSet::new(),
        };

        for student in &school.students {
            student.validate()?;
            plan.add_student(student);
        }
        for instructor in &school.instructors {
            instructor.validate()?;
            plan.instructors
                .entry(instructor.instructor_id)
                .or_insert_with(|| instructor.clone());
        }
        for course in &school.courses {
            course.validate()?;
            if let Some(instructor) = &course.instructor {
                plan.instructors
                    .entry(instructor.instructor_id)
                    .or_insert_with(|| instructor.clone());
            }
            for student in &course.enrolled_students {
                plan.add_student(student);
                plan.enrollments.insert((student.student_id, course.course_id));
            }
            plan.courses.insert(
                course.course_id,
                (course.course_name.trim().to_string(), course.instructor_id()),
            );
        }

        let claims: Vec<(InstructorId, CourseId)> = plan
            .instructors
            .values()
            .flat_map(|instructor| {
                instructor
                    .assigned_courses
                    .iter()
                    .map(move |course_id| (instructor.instructor_id, *course_id))
            })
            .collect();
        for (instructor_id, course_id) in claims {
            plan.assign(instructor_id, course_id)?;
        }
        Ok(plan)
    }

    fn assign(&mut self, instructor_id: InstructorId, course_id: CourseId) -> RepoResult<()> {
        let Some((_, current)) = self.courses.get_mut(&course_id) else {
            return Err(RepoError::InvalidData(format!(
                "instructor {instructor_id} is assigned to unknown course {course_id}"
            )));
        };
        match current {
            Some(existing) if *existing != instructor_id => {
                Err(RepoError::InvalidData(format!(
                    "course {course_id} is assigned to both instructor {existing} and {instructor_id}"
                )))
            }
            _ => {
                *current = Some(instructor_id);
                Ok(())
            }
        }
    }

    fn add_student(&mut self, student: &Student) {
        for course_id in &student.registered_courses {
            self.enrollments.insert((student.student_id, *course_id));
        }
        self.students
            .entry(student.student_id)
            .or_insert_with(|| student.clone());
    }
}
