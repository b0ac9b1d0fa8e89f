//! Aggregation views over already-loaded records.
//!
//! Enrollment is implicit: a student belongs to a class when at least one
//! grade or attendance record links the two. References may dangle after a
//! delete; lookups then fall back to placeholder names.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::logic::attendance::{tally_attendance, AttendanceTally};
use crate::logic::format::format_gpa;
use crate::logic::grading::gpa;
use crate::model::{AttendanceRecord, ClassSection, Grade, RecordId, Student};

pub const UNKNOWN_STUDENT: &str = "Unknown Student";
pub const UNKNOWN_CLASS: &str = "Unknown Class";

const RECENT_STUDENTS: usize = 5;
const RECENT_GRADES: usize = 5;
const RECENT_ATTENDANCE: usize = 10;

pub fn student_name_for(students: &[Student], id: RecordId) -> String {
    students
        .iter()
        .find(|student| student.id == id)
        .map(Student::full_name)
        .unwrap_or_else(|| UNKNOWN_STUDENT.to_string())
}

pub fn class_name_for(classes: &[ClassSection], id: RecordId) -> String {
    classes
        .iter()
        .find(|class| class.id == id)
        .map(|class| class.name.clone())
        .unwrap_or_else(|| UNKNOWN_CLASS.to_string())
}

/// Case-insensitive match on full name, email and grade level.
pub fn search_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return students.iter().collect();
    }
    students
        .iter()
        .filter(|student| {
            student.full_name().to_lowercase().contains(&needle)
                || student.email.to_lowercase().contains(&needle)
                || student.grade.to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub class_id: Option<RecordId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub student_id: Option<RecordId>,
}

/// Query strings send unset filters as `key=`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Search matches assignment name, student name or class name.
pub fn filter_grades<'a>(
    grades: &'a [Grade],
    students: &[Student],
    classes: &[ClassSection],
    filter: &GradeFilter,
) -> Vec<&'a Grade> {
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    grades
        .iter()
        .filter(|grade| filter.class_id.map_or(true, |id| grade.class_id == id))
        .filter(|grade| filter.student_id.map_or(true, |id| grade.student_id == id))
        .filter(|grade| match &needle {
            None => true,
            Some(needle) => {
                grade.assignment_name.to_lowercase().contains(needle)
                    || students
                        .iter()
                        .find(|s| s.id == grade.student_id)
                        .is_some_and(|s| s.full_name().to_lowercase().contains(needle))
                    || classes
                        .iter()
                        .find(|c| c.id == grade.class_id)
                        .is_some_and(|c| c.name.to_lowercase().contains(needle))
            }
        })
        .collect()
}

pub fn enrolled_student_ids(
    class_id: RecordId,
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> BTreeSet<RecordId> {
    grades
        .iter()
        .filter(|grade| grade.class_id == class_id)
        .map(|grade| grade.student_id)
        .chain(
            attendance
                .iter()
                .filter(|record| record.class_id == class_id)
                .map(|record| record.student_id),
        )
        .collect()
}

/// Mean of the available grade percentages; 0 when there are none.
pub fn average_percentage<'a, I>(grades: I) -> f64
where
    I: IntoIterator<Item = &'a Grade>,
{
    let percentages: Vec<f64> = grades.into_iter().filter_map(Grade::percentage).collect();
    if percentages.is_empty() {
        return 0.0;
    }
    percentages.iter().sum::<f64>() / percentages.len() as f64
}

fn newest_first<T, F>(items: &[T], limit: usize, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> (NaiveDate, RecordId),
{
    items
        .iter()
        .sorted_by(|a, b| key(*b).cmp(&key(*a)))
        .take(limit)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_students: usize,
    pub total_classes: usize,
    pub average_grade: f64,
    pub today: AttendanceTally,
    pub today_attendance_rate: f64,
    pub recent_students: Vec<Student>,
    pub recent_grades: Vec<Grade>,
}

pub fn dashboard_stats(
    students: &[Student],
    classes: &[ClassSection],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
    today: NaiveDate,
) -> DashboardStats {
    let today_tally = tally_attendance(attendance.iter().filter(|record| record.date == today));

    DashboardStats {
        active_students: students.iter().filter(|s| s.is_active()).count(),
        total_classes: classes.len(),
        average_grade: average_percentage(grades),
        today: today_tally,
        today_attendance_rate: today_tally.rate(),
        recent_students: students
            .iter()
            .sorted_by(|a, b| b.id.cmp(&a.id))
            .take(RECENT_STUDENTS)
            .cloned()
            .collect(),
        recent_grades: newest_first(grades, RECENT_GRADES, |g| (g.date, g.id)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student: Student,
    pub gpa: f64,
    pub gpa_display: String,
    pub attendance: AttendanceTally,
    pub attendance_rate: f64,
    pub grades: Vec<Grade>,
    pub recent_grades: Vec<Grade>,
    pub recent_attendance: Vec<AttendanceRecord>,
}

pub fn student_summary(
    student: Student,
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> StudentSummary {
    let own_grades: Vec<Grade> = grades
        .iter()
        .filter(|grade| grade.student_id == student.id)
        .cloned()
        .collect();
    let own_attendance: Vec<AttendanceRecord> = attendance
        .iter()
        .filter(|record| record.student_id == student.id)
        .cloned()
        .collect();

    let student_gpa = gpa(&own_grades);
    let tally = tally_attendance(&own_attendance);

    StudentSummary {
        gpa: student_gpa,
        gpa_display: format_gpa(student_gpa),
        attendance: tally,
        attendance_rate: tally.rate(),
        recent_grades: newest_first(&own_grades, RECENT_GRADES, |g| (g.date, g.id)),
        recent_attendance: newest_first(&own_attendance, RECENT_ATTENDANCE, |a| (a.date, a.id)),
        grades: own_grades,
        student,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student: Student,
    pub average_percentage: Option<f64>,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoster {
    pub class: ClassSection,
    pub students: Vec<RosterEntry>,
    pub grade_count: usize,
    pub average_grade: f64,
    pub attendance: AttendanceTally,
    pub attendance_rate: f64,
}

/// Students whose enrollment points at a deleted record are skipped.
pub fn class_roster(
    class: ClassSection,
    students: &[Student],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> ClassRoster {
    let class_grades: Vec<&Grade> = grades.iter().filter(|g| g.class_id == class.id).collect();
    let class_attendance: Vec<&AttendanceRecord> = attendance
        .iter()
        .filter(|a| a.class_id == class.id)
        .collect();

    let entries = enrolled_student_ids(class.id, grades, attendance)
        .into_iter()
        .filter_map(|id| students.iter().find(|s| s.id == id))
        .map(|student| {
            let scores: Vec<f64> = class_grades
                .iter()
                .filter(|g| g.student_id == student.id)
                .filter_map(|g| g.percentage())
                .collect();
            let average = (!scores.is_empty())
                .then(|| scores.iter().sum::<f64>() / scores.len() as f64);
            RosterEntry {
                student: student.clone(),
                average_percentage: average,
                attendance_rate: tally_attendance(
                    class_attendance
                        .iter()
                        .copied()
                        .filter(|a| a.student_id == student.id),
                )
                .rate(),
            }
        })
        .collect();

    let tally = tally_attendance(class_attendance.iter().copied());

    ClassRoster {
        grade_count: class_grades.len(),
        average_grade: average_percentage(class_grades.iter().copied()),
        attendance: tally,
        attendance_rate: tally.rate(),
        students: entries,
        class,
    }
}
