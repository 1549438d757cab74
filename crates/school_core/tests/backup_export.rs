use school_core::backup::{
    export_csv, load_from_file, save_to_file, snapshot, COURSES_CSV, INSTRUCTORS_CSV,
    STUDENTS_CSV,
};
use school_core::db::{open_db, open_db_in_memory};
use school_core::{
    BackupError, Course, Instructor, RepoError, School, SchoolRepository, SqliteSchoolRepository,
    Student,
};

fn seed(repo: &mut SqliteSchoolRepository<'_>) {
    repo.upsert_student(1, "Ann", 20, "ann@x.com").unwrap();
    repo.upsert_student(2, "Bea, Jr.", 22, "bea@x.com").unwrap();
    repo.upsert_instructor(5, "Dr. Lee", 44, "lee@uni.edu").unwrap();
    repo.upsert_course(10, "CS101", Some(5)).unwrap();
    repo.upsert_course(11, "Math", None).unwrap();
    repo.enroll(1, 10).unwrap();
    repo.enroll(2, 10).unwrap();
    repo.enroll(1, 11).unwrap();
}

#[test]
fn export_csv_writes_three_files_with_headers() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);
    let school = repo.load_school().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("export");
    export_csv(&school, &target).unwrap();

    let students = std::fs::read_to_string(target.join(STUDENTS_CSV)).unwrap();
    let lines: Vec<&str> = students.lines().collect();
    assert_eq!(lines[0], "ID,Name,Age,Email,RegisteredCourses");
    assert_eq!(lines[1], "1,Ann,20,ann@x.com,10|11");
    assert_eq!(lines[2], "2,\"Bea, Jr.\",22,bea@x.com,10");

    let instructors = std::fs::read_to_string(target.join(INSTRUCTORS_CSV)).unwrap();
    let lines: Vec<&str> = instructors.lines().collect();
    assert_eq!(lines[0], "ID,Name,Age,Email,AssignedCourses");
    assert_eq!(lines[1], "5,Dr. Lee,44,lee@uni.edu,10");

    let courses = std::fs::read_to_string(target.join(COURSES_CSV)).unwrap();
    let lines: Vec<&str> = courses.lines().collect();
    assert_eq!(lines[0], "ID,Name,Instructor,EnrolledStudents");
    assert_eq!(lines[1], "10,CS101,Dr. Lee,\"Ann|Bea, Jr.\"");
    assert_eq!(lines[2], "11,Math,,Ann");
}

#[test]
fn export_csv_overwrites_previous_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut school = School::new();
    school
        .add_student(Student::new(1, "Ann", 20, "ann@x.com").unwrap())
        .unwrap();
    school
        .add_student(Student::new(2, "Bea", 22, "bea@x.com").unwrap())
        .unwrap();
    export_csv(&school, dir.path()).unwrap();

    export_csv(&School::new(), dir.path()).unwrap();
    let students = std::fs::read_to_string(dir.path().join(STUDENTS_CSV)).unwrap();
    assert_eq!(students.lines().count(), 1);
}

#[test]
fn snapshot_is_restorable_and_independent() {
    let dir = tempfile::tempdir().unwrap();
    let live_path = dir.path().join("live.db");
    let backup_path = dir.path().join("backup.db");

    let mut conn = open_db(&live_path).unwrap();
    {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        seed(&mut repo);
        snapshot(repo.connection(), &backup_path).unwrap();
        repo.delete_student(1).unwrap();
    }

    let mut restored = open_db(&backup_path).unwrap();
    let repo = SqliteSchoolRepository::try_new(&mut restored).unwrap();
    let students = repo.list_students().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(repo.list_enrollments(10).unwrap().len(), 2);
}

#[test]
fn snapshot_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let backup_path = dir.path().join("backup.db");
    std::fs::write(&backup_path, b"stale").unwrap();

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);
    snapshot(repo.connection(), &backup_path).unwrap();

    let mut restored = open_db(&backup_path).unwrap();
    let repo = SqliteSchoolRepository::try_new(&mut restored).unwrap();
    assert_eq!(repo.list_courses().unwrap().len(), 2);
}

#[test]
fn failed_snapshot_keeps_previous_backup() {
    let dir = tempfile::tempdir().unwrap();
    let backup_path = dir.path().join("backup.db");
    std::fs::write(&backup_path, b"previous good backup").unwrap();

    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        seed(&mut repo);
    }
    conn.execute_batch("BEGIN;").unwrap();

    let err = snapshot(&conn, &backup_path).unwrap_err();
    assert!(matches!(err, BackupError::Db(_)));
    assert_eq!(
        std::fs::read(&backup_path).unwrap(),
        b"previous good backup".to_vec()
    );
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1, "staging file should be cleaned up");
}

#[test]
fn json_dump_and_replace_all_restore_full_state() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("school.json");

    let mut source = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut source).unwrap();
    seed(&mut repo);
    let original = repo.load_school().unwrap();
    save_to_file(&original, &dump).unwrap();

    let mut target = open_db_in_memory().unwrap();
    let mut restored = SqliteSchoolRepository::try_new(&mut target).unwrap();
    restored.upsert_student(99, "Old", 50, "old@x.com").unwrap();

    let loaded = load_from_file(&dump).unwrap();
    assert_eq!(loaded, original);
    restored.replace_all(&loaded).unwrap();

    assert!(restored.get_student(99).unwrap().is_none());
    assert_eq!(restored.load_school().unwrap(), original);
}

#[test]
fn load_from_file_rejects_invalid_records() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("bad.json");
    std::fs::write(
        &dump,
        r#"{"students":[{"student_id":1,"name":"Ann","age":-1,"email":"ann@x.com"}],"instructors":[],"courses":[]}"#,
    )
    .unwrap();

    assert!(matches!(load_from_file(&dump), Err(BackupError::Json(_))));
    assert!(matches!(
        load_from_file(dir.path().join("missing.json")),
        Err(BackupError::Io { .. })
    ));
}

#[test]
fn replace_all_imports_nested_course_members() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();

    let mut course = Course::new(10, "CS101").unwrap();
    course.add_student(Student::new(3, "Cy", 23, "cy@x.com").unwrap());
    let mut school = School::new();
    school.add_course(course).unwrap();

    repo.replace_all(&school).unwrap();
    let cy = repo.get_student(3).unwrap().unwrap();
    assert!(cy.is_registered(10));
}

#[test]
fn replace_all_applies_instructor_side_assignments() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();

    let mut lee = Instructor::new(5, "Dr. Lee", 44, "lee@uni.edu").unwrap();
    lee.assigned_courses.insert(10);
    let mut school = School::new();
    school.add_instructor(lee).unwrap();
    school.add_course(Course::new(10, "CS101").unwrap()).unwrap();

    repo.replace_all(&school).unwrap();
    let row = repo.get_course_row(10).unwrap().unwrap();
    assert_eq!(row.instructor_id, Some(5));
    assert!(repo
        .get_instructor(5)
        .unwrap()
        .unwrap()
        .assigned_courses
        .contains(&10));
}

#[test]
fn replace_all_rejects_inconsistent_assignments() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    let mut kim = Instructor::new(6, "Dr. Kim", 51, "kim@uni.edu").unwrap();
    kim.assigned_courses.insert(99);
    let mut dangling = School::new();
    dangling.add_instructor(kim.clone()).unwrap();
    dangling.add_course(Course::new(10, "CS101").unwrap()).unwrap();
    assert!(matches!(
        repo.replace_all(&dangling).unwrap_err(),
        RepoError::InvalidData(_)
    ));

    kim.assigned_courses = [10].into_iter().collect();
    let mut course = Course::new(10, "CS101").unwrap();
    course.instructor = Some(Instructor::new(5, "Dr. Lee", 44, "lee@uni.edu").unwrap());
    let mut conflicting = School::new();
    conflicting.add_instructor(kim).unwrap();
    conflicting.add_course(course).unwrap();
    assert!(matches!(
        repo.replace_all(&conflicting).unwrap_err(),
        RepoError::InvalidData(_)
    ));

    assert_eq!(repo.list_students().unwrap().len(), 2);
    assert_eq!(repo.get_course_row(10).unwrap().unwrap().instructor_id, Some(5));
}

#[test]
fn replace_all_with_duplicate_email_keeps_previous_state() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    let mut school = School::new();
    school
        .add_student(Student::new(1, "Ann", 20, "dup@x.com").unwrap())
        .unwrap();
    school
        .add_student(Student::new(2, "Bea", 22, "dup@x.com").unwrap())
        .unwrap();

    let err = repo.replace_all(&school).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail { .. }));
    assert_eq!(repo.list_students().unwrap().len(), 2);
    assert_eq!(repo.list_enrollments(10).unwrap().len(), 2);
}
