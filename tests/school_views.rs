use std::sync::Arc;

use chrono::NaiveDate;
use school_records::logic::{AttendanceCategory, UNKNOWN_STUDENT};
use school_records::model::{
    AttendanceStatus, GradeCategory, NewAttendanceRecord, NewClassSection, NewGrade, NewStudent,
    RecordId, StudentStatus,
};
use school_records::service::{AttendanceMark, SchoolServices};
use school_records::store::MemoryStore;
use school_records::ServiceError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn services() -> SchoolServices {
    SchoolServices::new(Arc::new(MemoryStore::school()))
}

fn new_student(first: &str, status: StudentStatus) -> NewStudent {
    NewStudent {
        first_name: first.to_string(),
        last_name: "Rivera".to_string(),
        email: format!("{}@school.edu", first.to_lowercase()),
        grade: "9th".to_string(),
        date_of_birth: date(2009, 2, 1),
        enrollment_date: date(2023, 8, 28),
        status,
    }
}

fn new_class(name: &str) -> NewClassSection {
    NewClassSection {
        name: name.to_string(),
        subject: "Science".to_string(),
        period: "3rd".to_string(),
        room: "Lab 1".to_string(),
        semester: "Fall".to_string(),
        year: 2024,
    }
}

fn new_grade(student_id: RecordId, class_id: RecordId, score: f64) -> NewGrade {
    NewGrade {
        student_id,
        class_id,
        assignment_name: "Unit Test".to_string(),
        score,
        max_score: 100.0,
        date: date(2024, 9, 20),
        category: GradeCategory::Test,
    }
}

fn mark(student_id: RecordId, status: &str) -> AttendanceMark {
    AttendanceMark {
        student_id,
        status: AttendanceStatus::from(status),
        notes: None,
    }
}

#[tokio::test]
async fn one_active_student_with_a_b_average() {
    let services = services();
    let active = services
        .students
        .create(new_student("Ana", StudentStatus::Active))
        .await
        .unwrap();
    services
        .students
        .create(new_student("Ben", StudentStatus::Inactive))
        .await
        .unwrap();
    let class = services.classes.create(new_class("Biology")).await.unwrap();
    services
        .grades
        .create(new_grade(active.id, class.id, 85.0))
        .await
        .unwrap();

    let stats = services.dashboard(date(2024, 9, 20)).await.unwrap();
    let summary = services.student_summary(active.id).await.unwrap();

    assert_eq!(active.id, 1);
    assert_eq!(stats.active_students, 1);
    assert_eq!(stats.total_classes, 1);
    assert_eq!(stats.average_grade, 85.0);
    assert_eq!(summary.gpa, 3.0);
    assert_eq!(summary.gpa_display, "3.00");
    assert_eq!(summary.grades[0].letter().map(|l| l.as_str()), Some("B"));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let services = services();

    let summary = services.student_summary(9).await.unwrap_err();
    let roster = services.class_roster(9).await.unwrap_err();
    let sheet = services
        .record_attendance(9, date(2024, 9, 9), vec![mark(1, "Present")])
        .await
        .unwrap_err();

    assert!(matches!(summary, ServiceError::NotFound { entity: "student", id: 9 }));
    assert!(roster.is_not_found());
    assert!(sheet.is_not_found());
}

#[tokio::test]
async fn roster_is_implicit_from_grades_and_attendance() {
    let services = services();
    let mut ids = Vec::new();
    for name in ["Ana", "Ben", "Cal"] {
        let student = services
            .students
            .create(new_student(name, StudentStatus::Active))
            .await
            .unwrap();
        ids.push(student.id);
    }
    let biology = services.classes.create(new_class("Biology")).await.unwrap();
    let chemistry = services.classes.create(new_class("Chemistry")).await.unwrap();

    services
        .grades
        .create(new_grade(ids[2], biology.id, 70.0))
        .await
        .unwrap();
    services
        .grades
        .create(new_grade(ids[1], chemistry.id, 95.0))
        .await
        .unwrap();
    services
        .attendance
        .create(NewAttendanceRecord {
            student_id: ids[0],
            class_id: biology.id,
            date: date(2024, 9, 9),
            status: AttendanceStatus::Late,
            notes: Some("bus".to_string()),
        })
        .await
        .unwrap();

    let roster = services.class_roster(biology.id).await.unwrap();

    let enrolled: Vec<RecordId> = roster.students.iter().map(|e| e.student.id).collect();
    assert_eq!(enrolled, vec![ids[0], ids[2]]);
    assert_eq!(roster.students[0].average_percentage, None);
    assert_eq!(roster.students[1].average_percentage, Some(70.0));
    assert_eq!(roster.average_grade, 70.0);
    assert_eq!(roster.attendance.late, 1);
    assert_eq!(roster.attendance_rate, 0.0);
}

#[tokio::test]
async fn attendance_sheet_updates_existing_and_creates_missing() {
    let services = services();
    let ana = services
        .students
        .create(new_student("Ana", StudentStatus::Active))
        .await
        .unwrap();
    let ben = services
        .students
        .create(new_student("Ben", StudentStatus::Active))
        .await
        .unwrap();
    let class = services.classes.create(new_class("Biology")).await.unwrap();
    let day = date(2024, 9, 9);

    let first = services
        .record_attendance(class.id, day, vec![mark(ana.id, "Absent")])
        .await
        .unwrap();
    assert!(first.is_complete());

    let second = services
        .record_attendance(
            class.id,
            day,
            vec![mark(ana.id, "Present"), mark(ben.id, "Excused")],
        )
        .await
        .unwrap();
    assert!(second.is_complete());
    assert_eq!(second.saved.len(), 2);

    let records = services.attendance.get_all().await.unwrap();
    assert_eq!(records.len(), 2);
    let ana_record = records.iter().find(|r| r.student_id == ana.id).unwrap();
    assert_eq!(ana_record.id, first.saved[0].id);
    assert_eq!(ana_record.status, AttendanceStatus::Present);
    assert_eq!(ana_record.notes, None);

    let ben_record = records.iter().find(|r| r.student_id == ben.id).unwrap();
    assert_eq!(ben_record.status, AttendanceStatus::Other("Excused".to_string()));
    assert_eq!(ben_record.status.category(), AttendanceCategory::Absent);

    let stats = services.dashboard(day).await.unwrap();
    assert_eq!(stats.today.total, 2);
    assert_eq!(stats.today.present, 1);
    assert_eq!(stats.today.absent, 0);
    assert_eq!(stats.today_attendance_rate, 50.0);
}

#[tokio::test]
async fn repeated_student_in_one_sheet_is_a_failed_item() {
    let services = services();
    let ana = services
        .students
        .create(new_student("Ana", StudentStatus::Active))
        .await
        .unwrap();
    let class = services.classes.create(new_class("Biology")).await.unwrap();

    let outcome = services
        .record_attendance(
            class.id,
            date(2024, 9, 9),
            vec![mark(ana.id, "Late"), mark(ana.id, "Present")],
        )
        .await
        .unwrap();

    assert_eq!(outcome.saved.len(), 1);
    assert_eq!(outcome.saved[0].status, AttendanceStatus::Late);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].index, 1);
    assert_eq!(outcome.failed[0].status_code, Some(409));
}

#[tokio::test]
async fn deleting_a_student_leaves_grades_dangling() {
    let services = services();
    let ana = services
        .students
        .create(new_student("Ana", StudentStatus::Active))
        .await
        .unwrap();
    let class = services.classes.create(new_class("Biology")).await.unwrap();
    services
        .grades
        .create(new_grade(ana.id, class.id, 91.0))
        .await
        .unwrap();

    services.students.delete(ana.id).await.unwrap();
    let snapshot = services.snapshot().await.unwrap();
    let roster = services.class_roster(class.id).await.unwrap();

    assert_eq!(snapshot.grades.len(), 1);
    assert_eq!(
        school_records::logic::student_name_for(&snapshot.students, snapshot.grades[0].student_id),
        UNKNOWN_STUDENT
    );
    assert!(roster.students.is_empty());
    assert_eq!(roster.grade_count, 1);
}

#[tokio::test]
async fn resubmitting_a_sheet_keeps_existing_notes_unless_replaced() {
    let services = services();
    let ana = services
        .students
        .create(new_student("Ana", StudentStatus::Active))
        .await
        .unwrap();
    let class = services.classes.create(new_class("Biology")).await.unwrap();
    let day = date(2024, 9, 9);

    let late = AttendanceMark {
        notes: Some("bus".to_string()),
        ..mark(ana.id, "Late")
    };
    services
        .record_attendance(class.id, day, vec![late])
        .await
        .unwrap();
    services
        .record_attendance(class.id, day, vec![mark(ana.id, "Present")])
        .await
        .unwrap();

    let records = services.attendance.get_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Present);
    assert_eq!(records[0].notes.as_deref(), Some("bus"));
}
