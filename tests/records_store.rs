use school_records::store::Document;
use school_records::{
    Course, JsonFileStore, MemoryStore, RecordsError, RecordsStore, Student, Teacher, Test,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn fields(v: Value) -> Document {
    v.as_object().cloned().expect("object literal")
}

fn memory_records() -> RecordsStore {
    RecordsStore::new(Arc::new(MemoryStore::new()))
}

async fn teacher(records: &RecordsStore) -> Teacher {
    records
        .create(fields(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@school.test",
            "department": "Mathematics"
        })))
        .await
        .unwrap()
}

async fn course(records: &RecordsStore, teacher_id: i64, name: &str) -> Course {
    records
        .create(fields(json!({
            "code": "MTH1W",
            "name": name,
            "teacherId": teacher_id,
            "semester": "Fall",
            "room": "204"
        })))
        .await
        .unwrap()
}

async fn student(records: &RecordsStore) -> Student {
    records
        .create(fields(json!({
            "firstName": "Sam",
            "lastName": "Lee",
            "grade": 9,
            "studentNumber": "S-1001"
        })))
        .await
        .unwrap()
}

async fn test_record(records: &RecordsStore, student_id: i64, course_id: i64, mark: f64, out_of: f64) -> Test {
    records
        .create(fields(json!({
            "studentId": student_id,
            "courseId": course_id,
            "testName": "Unit test",
            "date": "2024-10-01",
            "mark": mark,
            "outOf": out_of
        })))
        .await
        .unwrap()
}

#[tokio::test]
async fn created_records_can_be_read_back() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;
    let x = test_record(&records, s.id, c.id, 8.0, 10.0).await;

    assert_eq!(records.get::<Teacher>(t.id).await.unwrap(), t);
    assert_eq!(records.get::<Course>(c.id).await.unwrap(), c);
    assert_eq!(records.get::<Student>(s.id).await.unwrap(), s);
    assert_eq!(records.get::<Test>(x.id).await.unwrap(), x);
    assert_eq!(t.room, None);
    assert_eq!(records.list::<Teacher>().await.unwrap(), vec![t]);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let records = memory_records();
    let err = records.get::<Test>(42).await.unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "Test record not found"));
    let err = records.delete::<Student>(42).await.unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "Student not found"));
}

#[tokio::test]
async fn missing_required_fields_are_rejected() {
    let records = memory_records();
    let err = records
        .create::<Course>(fields(json!({"code": "MTH1W"})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m.starts_with("Missing required fields")));
}

#[tokio::test]
async fn course_with_unknown_teacher_is_rejected_and_not_inserted() {
    let records = memory_records();
    let err = records
        .create::<Course>(fields(json!({
            "code": "SCI",
            "name": "Science",
            "teacherId": 99,
            "semester": "Fall",
            "room": "101"
        })))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m == "Invalid teacherId: teacher not found"));
    assert!(records.list::<Course>().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_requires_existing_student_and_course() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let err = records
        .create::<Test>(fields(json!({
            "studentId": 5,
            "courseId": c.id,
            "testName": "Quiz",
            "date": "2024-10-01",
            "mark": 5,
            "outOf": 10
        })))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m == "Invalid studentId: student not found"));
    assert!(records.list::<Test>().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_update_fails_without_mutation() {
    let records = memory_records();
    let t = teacher(&records).await;
    let err = records.update::<Teacher>(t.id, Document::new()).await.unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m == "No fields provided for update"));
    assert_eq!(records.get::<Teacher>(t.id).await.unwrap(), t);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let records = memory_records();
    let t = teacher(&records).await;
    let updated: Teacher = records
        .update(t.id, fields(json!({"room": "B12", "department": "Computing"})))
        .await
        .unwrap();
    assert_eq!(updated.room.as_deref(), Some("B12"));
    assert_eq!(updated.department, "Computing");
    assert_eq!(updated.first_name, t.first_name);
    assert_eq!(updated.email, t.email);
    assert_eq!(records.get::<Teacher>(t.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_revalidates_foreign_keys() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let err = records
        .update::<Course>(c.id, fields(json!({"teacherId": 77})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(_)));
    assert_eq!(records.get::<Course>(c.id).await.unwrap().teacher_id, t.id);

    let other: Teacher = records
        .create(fields(json!({
            "firstName": "Alan",
            "lastName": "Turing",
            "email": "alan@school.test",
            "department": "Computing"
        })))
        .await
        .unwrap();
    let moved: Course = records
        .update(c.id, fields(json!({"teacherId": other.id})))
        .await
        .unwrap();
    assert_eq!(moved.teacher_id, other.id);
}

#[tokio::test]
async fn teacher_delete_is_blocked_until_courses_are_gone() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;

    let err = records.delete::<Teacher>(t.id).await.unwrap_err();
    assert!(matches!(err, RecordsError::Conflict(ref m) if m == "Cannot delete teacher with existing course records"));
    assert!(records.get::<Teacher>(t.id).await.is_ok());

    let deleted = records.delete::<Course>(c.id).await.unwrap();
    assert_eq!(deleted, c);
    let deleted = records.delete::<Teacher>(t.id).await.unwrap();
    assert_eq!(deleted, t);
    assert!(records.list::<Teacher>().await.unwrap().is_empty());
}

#[tokio::test]
async fn student_and_course_deletes_are_blocked_by_tests() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;
    let x = test_record(&records, s.id, c.id, 7.0, 10.0).await;

    assert!(matches!(records.delete::<Student>(s.id).await, Err(RecordsError::Conflict(_))));
    assert!(matches!(records.delete::<Course>(c.id).await, Err(RecordsError::Conflict(_))));

    records.delete::<Test>(x.id).await.unwrap();
    records.delete::<Student>(s.id).await.unwrap();
    records.delete::<Course>(c.id).await.unwrap();
}

#[tokio::test]
async fn student_average_over_percentages() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;
    test_record(&records, s.id, c.id, 8.0, 10.0).await;
    test_record(&records, s.id, c.id, 18.0, 20.0).await;

    let avg = records.average_for_student(s.id).await.unwrap();
    assert_eq!(avg.average, 85.0);
    assert_eq!(avg.test_count, 2);

    let avg = records.average_for_course(c.id).await.unwrap();
    assert_eq!(avg.average, 85.0);
}

#[tokio::test]
async fn average_without_tests_is_not_found() {
    let records = memory_records();
    let s = student(&records).await;
    let err = records.average_for_student(s.id).await.unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "No tests found for student"));
    let err = records.average_for_student(s.id + 1).await.unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "Student not found"));
}

#[tokio::test]
async fn tests_are_filtered_by_parent() {
    let records = memory_records();
    let t = teacher(&records).await;
    let math = course(&records, t.id, "Math").await;
    let art = course(&records, t.id, "Art").await;
    let s = student(&records).await;
    let a = test_record(&records, s.id, math.id, 5.0, 10.0).await;
    let b = test_record(&records, s.id, art.id, 6.0, 10.0).await;

    assert_eq!(records.tests_for_course(math.id).await.unwrap(), vec![a.clone()]);
    assert_eq!(records.tests_for_student(s.id).await.unwrap(), vec![a, b]);
    assert!(matches!(records.tests_for_course(999).await, Err(RecordsError::NotFound(_))));
}

#[tokio::test]
async fn teacher_summary_counts_tests_per_course() {
    let records = memory_records();
    let t = teacher(&records).await;
    let x = course(&records, t.id, "Math").await;
    let y = course(&records, t.id, "Art").await;
    let s = student(&records).await;
    for _ in 0..3 {
        test_record(&records, s.id, x.id, 5.0, 10.0).await;
    }

    let summary = records.teacher_summary(t.id).await.unwrap();
    assert_eq!(summary.teacher_name, "Ada Lovelace");
    let counts: Vec<(i64, usize)> = summary.courses.iter().map(|c| (c.course_id, c.test_count)).collect();
    assert_eq!(counts, vec![(x.id, 3), (y.id, 0)]);
    assert_eq!(summary.courses[0].course_name, "Math");
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let records = Arc::new(memory_records());
    let mut handles = Vec::new();
    for _ in 0..16 {
        let records = records.clone();
        handles.push(tokio::spawn(async move { student(&records).await.id }));
    }
    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

#[tokio::test]
async fn file_backed_records_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let (t, c) = {
        let records = RecordsStore::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap()));
        let t = teacher(&records).await;
        let c = course(&records, t.id, "Math").await;
        (t, c)
    };
    let records = RecordsStore::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap()));
    assert_eq!(records.get::<Teacher>(t.id).await.unwrap(), t);
    assert_eq!(records.get::<Course>(c.id).await.unwrap(), c);
    assert!(matches!(records.delete::<Teacher>(t.id).await, Err(RecordsError::Conflict(_))));
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let records = memory_records();
    let err = records
        .update::<Teacher>(999, fields(json!({"room": "B12"})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "Teacher not found"));
}

#[tokio::test]
async fn test_update_revalidates_student_and_course() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;
    let x = test_record(&records, s.id, c.id, 7.0, 10.0).await;

    let err = records
        .update::<Test>(x.id, fields(json!({"studentId": 77})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m == "Invalid studentId: student not found"));

    let err = records
        .update::<Test>(x.id, fields(json!({"courseId": 88})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(ref m) if m == "Invalid courseId: course not found"));

    assert_eq!(records.get::<Test>(x.id).await.unwrap(), x);
}

#[tokio::test]
async fn course_average_without_tests_is_not_found() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let err = records.average_for_course(c.id).await.unwrap_err();
    assert!(matches!(err, RecordsError::NotFound(ref m) if m == "No tests found for course"));
}

#[tokio::test]
async fn non_finite_percentage_is_rejected_on_create_and_update() {
    let records = memory_records();
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;

    let err = records
        .create::<Test>(fields(json!({
            "studentId": s.id,
            "courseId": c.id,
            "testName": "Overflow",
            "date": "2024-10-01",
            "mark": 1e308,
            "outOf": 1e-10
        })))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(_)));
    assert!(records.list::<Test>().await.unwrap().is_empty());

    let x = test_record(&records, s.id, c.id, 1e300, 1.0).await;
    let err = records
        .update::<Test>(x.id, fields(json!({"outOf": 1e-10})))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(_)));
    assert_eq!(records.get::<Test>(x.id).await.unwrap(), x);
}

#[tokio::test]
async fn stored_date_matches_returned_date() {
    let dir = tempfile::tempdir().unwrap();
    let records = RecordsStore::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap()));
    let t = teacher(&records).await;
    let c = course(&records, t.id, "Math").await;
    let s = student(&records).await;

    let err = records
        .create::<Test>(fields(json!({
            "studentId": s.id,
            "courseId": c.id,
            "testName": "Quiz",
            "date": "2024-9-3",
            "mark": 5,
            "outOf": 10
        })))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Validation(_)));

    let x = test_record(&records, s.id, c.id, 5.0, 10.0).await;
    let raw = std::fs::read_to_string(dir.path().join("tests.json")).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["date"], x.date.format("%Y-%m-%d").to_string());
}
