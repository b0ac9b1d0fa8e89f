use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use log::info;

use crate::model::{
    AttendanceStatus, GradeCategory, NewAttendanceRecord, NewClassSection, NewGrade, NewStudent,
    RecordId, StudentStatus,
};
use crate::service::{BatchOutcome, SchoolServices};

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("invalid seed date {}-{}-{}", year, month, day))
}

fn ids_of<E, F>(what: &str, batch: BatchOutcome<E>, id: F) -> Result<Vec<RecordId>>
where
    F: Fn(&E) -> RecordId,
{
    if let Some(item) = batch.failed.first() {
        return Err(anyhow!(
            "failed to seed {} (item {}): {}",
            what,
            item.index,
            item.message.clone().unwrap_or_default()
        ));
    }
    Ok(batch.saved.iter().map(id).collect())
}

fn student(
    first_name: &str,
    last_name: &str,
    grade: &str,
    date_of_birth: NaiveDate,
    status: StudentStatus,
) -> Result<NewStudent> {
    Ok(NewStudent {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@school.edu",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        grade: grade.to_string(),
        date_of_birth,
        enrollment_date: date(2023, 8, 28)?,
        status,
    })
}

fn class(name: &str, subject: &str, period: &str, room: &str) -> NewClassSection {
    NewClassSection {
        name: name.to_string(),
        subject: subject.to_string(),
        period: period.to_string(),
        room: room.to_string(),
        semester: "Fall".to_string(),
        year: 2024,
    }
}

/// Load a small demo school: five students, three classes, a handful of grades
/// and two days of attendance.
pub async fn load_seed_data(services: &SchoolServices) -> Result<()> {
    let students = services
        .students
        .create_many(vec![
            student("Emma", "Johnson", "10th", date(2008, 3, 14)?, StudentStatus::Active)?,
            student("Liam", "Garcia", "10th", date(2008, 7, 2)?, StudentStatus::Active)?,
            student("Olivia", "Chen", "11th", date(2007, 11, 23)?, StudentStatus::Active)?,
            student("Noah", "Patel", "9th", date(2009, 1, 9)?, StudentStatus::Active)?,
            student("Ava", "Williams", "11th", date(2007, 5, 30)?, StudentStatus::Inactive)?,
        ])
        .await?;
    let students = ids_of("students", students, |s| s.id)?;

    let classes = services
        .classes
        .create_many(vec![
            class("Algebra II", "Mathematics", "1st", "204"),
            class("Biology", "Science", "3rd", "Lab 2"),
            class("American Literature", "English", "5th", "118"),
        ])
        .await?;
    let classes = ids_of("classes", classes, |c| c.id)?;

    let assignments = [
        ("Chapter 1 Quiz", GradeCategory::Quiz, 10.0_f64, date(2024, 9, 6)?),
        ("Unit 1 Test", GradeCategory::Test, 100.0, date(2024, 9, 20)?),
        ("Lab Report", GradeCategory::Project, 50.0, date(2024, 9, 27)?),
    ];
    let scores: [f64; 4] = [0.92, 0.78, 0.85, 0.64];

    let mut grades = Vec::new();
    for (s, student_id) in students.iter().take(scores.len()).enumerate() {
        for (a, (name, category, max_score, when)) in assignments.iter().enumerate() {
            let class_id = classes[a % classes.len()];
            let score = (scores[s] * max_score).round();
            grades.push(NewGrade {
                student_id: *student_id,
                class_id,
                assignment_name: name.to_string(),
                score,
                max_score: *max_score,
                date: *when,
                category: *category,
            });
        }
    }
    let grades = services.grades.create_many(grades).await?;
    let grade_count = ids_of("grades", grades, |g| g.id)?.len();

    let days = [date(2024, 9, 9)?, date(2024, 9, 10)?];
    let pattern = [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
    ];
    let mut attendance = Vec::new();
    for (d, day) in days.iter().enumerate() {
        for (s, student_id) in students.iter().take(pattern.len()).enumerate() {
            attendance.push(NewAttendanceRecord {
                student_id: *student_id,
                class_id: classes[0],
                date: *day,
                status: pattern[(s + d) % pattern.len()].clone(),
                notes: None,
            });
        }
    }
    let attendance = services.attendance.create_many(attendance).await?;
    let attendance_count = ids_of("attendance", attendance, |r| r.id)?.len();

    info!(
        "Seeded {} students, {} classes, {} grades, {} attendance records",
        students.len(),
        classes.len(),
        grade_count,
        attendance_count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seed_fills_every_collection() {
        let services = SchoolServices::new(Arc::new(MemoryStore::school()));

        load_seed_data(&services).await.unwrap();
        let snapshot = services.snapshot().await.unwrap();

        assert_eq!(snapshot.students.len(), 5);
        assert_eq!(snapshot.classes.len(), 3);
        assert_eq!(snapshot.grades.len(), 12);
        assert_eq!(snapshot.attendance.len(), 8);
        assert!(snapshot
            .grades
            .iter()
            .all(|grade| grade.percentage().is_some_and(|p| p <= 100.0)));
    }
}
