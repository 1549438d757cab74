//! Command-line front end for the school records store.
//!
//! # Responsibility
//! - Map subcommands onto `SchoolService` operations over one SQLite file.
//! - Print results as tab-separated rows for scripting.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use school_core::{
    export_csv, load_from_file, save_to_file, snapshot, AssignOutcome, DbConfig, EntityKind,
    LogTarget, PersonForm, SchoolService, SearchField, SqliteSchoolRepository,
};
use std::error::Error;
use std::path::PathBuf;

/// School records command-line client
#[derive(Parser, Debug)]
#[command(name = "school")]
#[command(version, about = "Manage students, instructors, courses and enrollments")]
struct Args {
    /// SQLite database file (created when missing)
    #[arg(long)]
    db: PathBuf,

    /// Absolute directory for rotating log files; logs go to stderr when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add or overwrite a student
    AddStudent {
        id: i64,
        name: String,
        age: i64,
        email: String,
    },
    /// Add or overwrite an instructor
    AddInstructor {
        id: i64,
        name: String,
        age: i64,
        email: String,
    },
    /// Add or overwrite a course
    AddCourse {
        id: i64,
        name: String,
        #[arg(long)]
        instructor: Option<i64>,
    },
    /// Assign an instructor to a course
    Assign {
        course: i64,
        instructor: i64,
        /// Replace a different instructor already assigned
        #[arg(long)]
        confirm: bool,
    },
    /// Clear a course's instructor
    Unassign { course: i64 },
    /// Enroll a student in a course
    Enroll { student: i64, course: i64 },
    /// Remove a student from a course
    Unenroll { student: i64, course: i64 },
    /// Delete an entity and its references
    Delete { kind: KindArg, id: i64 },
    /// Change an entity's identifier everywhere it is referenced
    Rename { kind: KindArg, old_id: i64, new_id: i64 },
    ListStudents,
    ListInstructors,
    ListCourses,
    /// Students enrolled in a course
    Roster { course: i64 },
    /// Filter one entity kind by a field
    Search {
        kind: KindArg,
        /// all|id|name|email|course|student|instructor
        #[arg(long, default_value = "all")]
        field: String,
        query: String,
    },
    /// Write students.csv, instructors.csv and courses.csv
    ExportCsv { dir: PathBuf },
    /// Copy the database to a new file
    Snapshot { path: PathBuf },
    /// Write the whole store as JSON
    DumpJson { path: PathBuf },
    /// Replace the whole store with a JSON dump
    LoadJson { path: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Student,
    Instructor,
    Course,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Student => EntityKind::Student,
            KindArg::Instructor => EntityKind::Instructor,
            KindArg::Course => EntityKind::Course,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(school_core::default_log_level());
    let target = match &args.log_dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    school_core::init_logging(level, target)?;

    let mut conn = DbConfig::file(&args.db).open()?;
    let repo = SqliteSchoolRepository::try_new(&mut conn)?;
    let mut service = SchoolService::new(repo);
    info!(
        "event=cli_command module=cli status=start db={} command={:?}",
        args.db.display(),
        args.command
    );

    match args.command {
        Command::AddStudent {
            id,
            name,
            age,
            email,
        } => service.save_student(&PersonForm::new(id, name, age, email))?,
        Command::AddInstructor {
            id,
            name,
            age,
            email,
        } => service.save_instructor(&PersonForm::new(id, name, age, email))?,
        Command::AddCourse {
            id,
            name,
            instructor,
        } => service.save_course(id, &name, instructor)?,
        Command::Assign {
            course,
            instructor,
            confirm,
        } => match service.assign_instructor(course, instructor, confirm)? {
            AssignOutcome::Assigned => println!("assigned"),
            AssignOutcome::Unchanged => println!("unchanged"),
            AssignOutcome::Reassigned { previous } => println!("reassigned from {previous}"),
        },
        Command::Unassign { course } => service.unassign_instructor(course)?,
        Command::Enroll { student, course } => {
            if !service.enroll(student, course)? {
                println!("already enrolled");
            }
        }
        Command::Unenroll { student, course } => {
            if !service.unenroll(student, course)? {
                println!("not enrolled");
            }
        }
        Command::Delete { kind, id } => service.delete(kind.into(), id)?,
        Command::Rename {
            kind,
            old_id,
            new_id,
        } => service.rename(kind.into(), old_id, new_id)?,
        Command::ListStudents => {
            for student in service.students()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    student.student_id,
                    student.name,
                    student.age,
                    student.email,
                    join_ids(student.registered_courses.iter())
                );
            }
        }
        Command::ListInstructors => {
            for instructor in service.instructors()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    instructor.instructor_id,
                    instructor.name,
                    instructor.age,
                    instructor.email,
                    join_ids(instructor.assigned_courses.iter())
                );
            }
        }
        Command::ListCourses => {
            for course in service.courses()? {
                println!(
                    "{}\t{}\t{}",
                    course.course_id,
                    course.course_name,
                    course.instructor_name.unwrap_or_default()
                );
            }
        }
        Command::Roster { course } => {
            for row in service.roster(course)? {
                println!("{}\t{}\t{}", row.student_id, row.name, row.email);
            }
        }
        Command::Search { kind, field, query } => {
            let field: SearchField = field.parse()?;
            match EntityKind::from(kind) {
                EntityKind::Student => {
                    for student in service.search_students(field, &query)? {
                        println!("{}\t{}", student.student_id, student.name);
                    }
                }
                EntityKind::Instructor => {
                    for instructor in service.search_instructors(field, &query)? {
                        println!("{}\t{}", instructor.instructor_id, instructor.name);
                    }
                }
                EntityKind::Course => {
                    for course in service.search_courses(field, &query)? {
                        println!("{}\t{}", course.course_id, course.course_name);
                    }
                }
            }
        }
        Command::ExportCsv { dir } => export_csv(&service.snapshot_state()?, dir)?,
        Command::Snapshot { path } => snapshot(service.repository().connection(), path)?,
        Command::DumpJson { path } => save_to_file(&service.snapshot_state()?, path)?,
        Command::LoadJson { path } => service.import(&load_from_file(path)?)?,
    }

    Ok(())
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a i64>) -> String {
    ids.map(i64::to_string).collect::<Vec<_>>().join(",")
}
