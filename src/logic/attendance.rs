use serde::{Deserialize, Serialize};

use crate::model::{AttendanceRecord, AttendanceStatus};

/// Display category for an attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceCategory {
    Present,
    Absent,
    Late,
}

impl AttendanceCategory {
    pub fn tag(self) -> &'static str {
        match self {
            AttendanceCategory::Present => "attendance-present",
            AttendanceCategory::Absent => "attendance-absent",
            AttendanceCategory::Late => "attendance-late",
        }
    }
}

/// Unrecognized and missing statuses are classified as absent.
pub fn attendance_category(status: Option<&str>) -> AttendanceCategory {
    match status {
        Some("Present") => AttendanceCategory::Present,
        Some("Late") => AttendanceCategory::Late,
        _ => AttendanceCategory::Absent,
    }
}

impl AttendanceStatus {
    pub fn category(&self) -> AttendanceCategory {
        attendance_category(Some(self.as_str()))
    }
}

/// Per-status counts over a set of attendance records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTally {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl AttendanceTally {
    /// Share of records marked present, in percent; 0 for an empty tally.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.present as f64 / self.total as f64 * 100.0
    }
}

/// Statuses outside Present/Absent/Late only count toward the total.
pub fn tally_attendance<'a, I>(records: I) -> AttendanceTally
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .fold(AttendanceTally::default(), |mut tally, record| {
            tally.total += 1;
            match record.status {
                AttendanceStatus::Present => tally.present += 1,
                AttendanceStatus::Absent => tally.absent += 1,
                AttendanceStatus::Late => tally.late += 1,
                AttendanceStatus::Other(_) => {}
            }
            tally
        })
}

pub fn attendance_rate<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    tally_attendance(records).rate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: u64, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id: 1,
            class_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            status: AttendanceStatus::from(status),
            notes: None,
        }
    }

    #[test]
    fn known_statuses_map_to_distinct_tags() {
        let present = attendance_category(Some("Present")).tag();
        let absent = attendance_category(Some("Absent")).tag();
        let late = attendance_category(Some("Late")).tag();

        assert_eq!(present, "attendance-present");
        assert_eq!(absent, "attendance-absent");
        assert_eq!(late, "attendance-late");
        assert_ne!(present, absent);
        assert_ne!(absent, late);
    }

    #[test]
    fn unrecognized_status_is_classified_absent() {
        // Preserved behavior: a new status value such as "Excused" shows as absent.
        assert_eq!(
            attendance_category(Some("Excused")),
            AttendanceCategory::Absent
        );
        assert_eq!(attendance_category(None), AttendanceCategory::Absent);
        assert_eq!(
            AttendanceStatus::from("Excused").category(),
            AttendanceCategory::Absent
        );
    }

    #[test]
    fn tally_counts_each_status() {
        let records = vec![
            record(1, "Present"),
            record(2, "Present"),
            record(3, "Late"),
            record(4, "Absent"),
            record(5, "Excused"),
        ];

        let tally = tally_attendance(&records);

        assert_eq!(
            tally,
            AttendanceTally {
                total: 5,
                present: 2,
                absent: 1,
                late: 1
            }
        );
        assert_eq!(tally.rate(), 40.0);
    }

    #[test]
    fn rate_of_nothing_is_zero() {
        assert_eq!(attendance_rate(&Vec::<AttendanceRecord>::new()), 0.0);
    }
}
