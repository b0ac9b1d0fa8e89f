use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::logic::summary::{self, ClassRoster, DashboardStats, StudentSummary};
use crate::model::{
    AttendanceRecord, AttendanceRecordPatch, AttendanceStatus, ClassSection, Entity, Grade,
    NewAttendanceRecord, RecordId, Student,
};
use crate::service::{BatchOutcome, FailedItem, SchoolServices};

/// One student's status in a class attendance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: RecordId,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// All four collections, loaded together.
#[derive(Debug, Clone, Default)]
pub struct SchoolSnapshot {
    pub students: Vec<Student>,
    pub classes: Vec<ClassSection>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<AttendanceRecord>,
}

impl SchoolServices {
    pub async fn snapshot(&self) -> Result<SchoolSnapshot, ServiceError> {
        let (students, classes, grades, attendance) = tokio::try_join!(
            self.students.get_all(),
            self.classes.get_all(),
            self.grades.get_all(),
            self.attendance.get_all(),
        )?;
        Ok(SchoolSnapshot {
            students,
            classes,
            grades,
            attendance,
        })
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats, ServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(summary::dashboard_stats(
            &snapshot.students,
            &snapshot.classes,
            &snapshot.grades,
            &snapshot.attendance,
            today,
        ))
    }

    pub async fn student_summary(&self, id: RecordId) -> Result<StudentSummary, ServiceError> {
        let (student, grades, attendance) = tokio::try_join!(
            self.students.get_by_id(id),
            self.grades.get_all(),
            self.attendance.get_all(),
        )?;
        let student = student.ok_or(ServiceError::NotFound {
            entity: Student::KIND,
            id,
        })?;
        Ok(summary::student_summary(student, &grades, &attendance))
    }

    pub async fn class_roster(&self, id: RecordId) -> Result<ClassRoster, ServiceError> {
        let (class, students, grades, attendance) = tokio::try_join!(
            self.classes.get_by_id(id),
            self.students.get_all(),
            self.grades.get_all(),
            self.attendance.get_all(),
        )?;
        let class = class.ok_or(ServiceError::NotFound {
            entity: ClassSection::KIND,
            id,
        })?;
        Ok(summary::class_roster(class, &students, &grades, &attendance))
    }

    /// Save an attendance sheet for one class and day. A student who already
    /// has a record for that class and day gets it updated; everyone else gets
    /// a new record. A student listed twice keeps the first mark; the repeat is
    /// reported as a failed item with status 409.
    pub async fn record_attendance(
        &self,
        class_id: RecordId,
        date: NaiveDate,
        marks: Vec<AttendanceMark>,
    ) -> Result<BatchOutcome<AttendanceRecord>, ServiceError> {
        let (class, attendance) = tokio::try_join!(
            self.classes.get_by_id(class_id),
            self.attendance.get_all(),
        )?;
        if class.is_none() {
            return Err(ServiceError::NotFound {
                entity: ClassSection::KIND,
                id: class_id,
            });
        }

        let existing: HashMap<RecordId, RecordId> = attendance
            .iter()
            .filter(|record| record.class_id == class_id && record.date == date)
            .map(|record| (record.student_id, record.id))
            .collect();

        let mut batch = BatchOutcome::default();
        let mut seen = HashSet::new();
        let mut updates = Vec::new();
        let mut update_positions = Vec::new();
        let mut creates = Vec::new();
        let mut create_positions = Vec::new();

        for (index, mark) in marks.into_iter().enumerate() {
            if !seen.insert(mark.student_id) {
                batch.failed.push(FailedItem {
                    index,
                    id: None,
                    message: Some(format!(
                        "student {} is already marked in this sheet",
                        mark.student_id
                    )),
                    errors: Vec::new(),
                    status_code: Some(409),
                });
                continue;
            }

            match existing.get(&mark.student_id) {
                Some(record_id) => {
                    updates.push((
                        *record_id,
                        AttendanceRecordPatch {
                            status: Some(mark.status),
                            notes: mark.notes,
                            ..AttendanceRecordPatch::default()
                        },
                    ));
                    update_positions.push(index);
                }
                None => {
                    creates.push(NewAttendanceRecord {
                        student_id: mark.student_id,
                        class_id,
                        date,
                        status: mark.status,
                        notes: mark.notes,
                    });
                    create_positions.push(index);
                }
            }
        }

        let (updated, created) = tokio::try_join!(
            self.attendance.update_many(updates),
            self.attendance.create_many(creates),
        )?;

        for (part, positions) in [(updated, update_positions), (created, create_positions)] {
            batch.saved.extend(part.saved);
            batch.failed.extend(part.failed.into_iter().map(|mut item| {
                item.index = positions[item.index];
                item
            }));
        }
        batch.failed.sort_by_key(|item| item.index);

        info!(
            "Recorded attendance for class {} on {}: {} saved, {} failed",
            class_id,
            date,
            batch.saved.len(),
            batch.failed.len()
        );
        Ok(batch)
    }
}
