use school_core::{Course, Instructor, Record, RecordCodec, RecordError, Student};
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn sample_course() -> Course {
    let mut ann = Student::new(1, "Ann", 20, "ann@x.com").unwrap();
    ann.registered_courses.insert(10);
    let mut bea = Student::new(2, "Bea", 22, "bea@x.com").unwrap();
    bea.registered_courses.insert(10);
    let mut lee = Instructor::new(5, "Dr. Lee", 44, "lee@uni.edu").unwrap();
    lee.assigned_courses.insert(10);

    let mut course = Course::new(10, "CS101").unwrap();
    course.instructor = Some(lee);
    assert!(course.add_student(bea));
    assert!(course.add_student(ann));
    course
}

#[test]
fn student_record_uses_field_names() {
    let mut student = Student::new(1, "Ann", 20, "ann@x.com").unwrap();
    student.registered_courses.insert(11);
    student.registered_courses.insert(10);

    let encoded = student.to_record().unwrap();
    assert_eq!(encoded["student_id"], json!(1));
    assert_eq!(encoded["name"], json!("Ann"));
    assert_eq!(encoded["age"], json!(20));
    assert_eq!(encoded["email"], json!("ann@x.com"));
    assert_eq!(encoded["registered_courses"], json!([10, 11]));

    assert_eq!(Student::from_record(&encoded).unwrap(), student);
}

#[test]
fn nested_course_survives_record_round_trip() {
    let course = sample_course();
    let encoded = course.to_record().unwrap();

    assert_eq!(encoded["instructor"]["instructor_id"], json!(5));
    assert_eq!(encoded["enrolled_students"][0]["student_id"], json!(1));
    assert_eq!(Course::from_record(&encoded).unwrap(), course);
}

#[test]
fn encoding_is_deterministic() {
    let first = sample_course().to_record().unwrap();
    let second = sample_course().to_record().unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn course_without_instructor_encodes_null() {
    let course = Course::new(11, "Math").unwrap();
    let encoded = course.to_record().unwrap();
    assert_eq!(encoded["instructor"], serde_json::Value::Null);
    assert_eq!(encoded["enrolled_students"], json!([]));

    let minimal = record(json!({ "course_id": 11, "course_name": "Math" }));
    assert_eq!(Course::from_record(&minimal).unwrap(), course);
}

#[test]
fn missing_required_key_is_malformed() {
    let incomplete = record(json!({ "student_id": 1, "name": "Ann", "age": 20 }));
    let err = Student::from_record(&incomplete).unwrap_err();
    match err {
        RecordError::Malformed(message) => assert!(message.contains("email")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_value_type_is_malformed() {
    let wrong = record(json!({
        "instructor_id": "five",
        "name": "Dr. Lee",
        "age": 44,
        "email": "lee@uni.edu"
    }));
    assert!(matches!(
        Instructor::from_record(&wrong),
        Err(RecordError::Malformed(_))
    ));
}

#[test]
fn invalid_field_value_is_malformed() {
    let bad_email = record(json!({
        "student_id": 1,
        "name": "Ann",
        "age": 20,
        "email": "ann-at-x"
    }));
    let err = Student::from_record(&bad_email).unwrap_err();
    assert!(err.to_string().contains("invalid email"));

    let negative_age = record(json!({
        "student_id": 1,
        "name": "Ann",
        "age": -2,
        "email": "ann@x.com"
    }));
    assert!(matches!(
        Student::from_record(&negative_age),
        Err(RecordError::Malformed(_))
    ));
}

#[test]
fn invalid_nested_record_fails_the_whole_course() {
    let nested = record(json!({
        "course_id": 10,
        "course_name": "CS101",
        "instructor": null,
        "enrolled_students": [
            { "student_id": 1, "name": "", "age": 20, "email": "ann@x.com" }
        ]
    }));
    assert!(matches!(
        Course::from_record(&nested),
        Err(RecordError::Malformed(_))
    ));
}

#[test]
fn add_student_rejects_duplicates_and_keeps_order() {
    let mut course = sample_course();
    let again = Student::new(2, "Bea", 22, "bea@x.com").unwrap();
    assert!(!course.add_student(again));
    assert_eq!(course.enrolled_students.len(), 2);
    assert_eq!(course.enrolled_students[0].student_id, 1);
}
