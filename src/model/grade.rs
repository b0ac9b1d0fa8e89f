use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::grading::{self, LetterGrade, Scored};
use crate::model::{Entity, FieldMap, FieldSpec, RawRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeCategory {
    Assignment,
    Quiz,
    Test,
    Exam,
    Project,
    Homework,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: RecordId,
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub assignment_name: String,
    /// Stored grades may lack either number; the percentage is then unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    pub date: NaiveDate,
    pub category: GradeCategory,
}

impl Grade {
    pub fn percentage(&self) -> Option<f64> {
        grading::percentage(self.score, self.max_score)
    }

    /// Derived on every call; letter grades are never stored.
    pub fn letter(&self) -> Option<LetterGrade> {
        self.percentage().map(grading::letter_grade)
    }
}

impl Scored for Grade {
    fn score(&self) -> Option<f64> {
        self.score
    }

    fn max_score(&self) -> Option<f64> {
        self.max_score
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGrade {
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub assignment_name: String,
    pub score: f64,
    pub max_score: f64,
    pub date: NaiveDate,
    pub category: GradeCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<GradeCategory>,
}

pub static GRADE_FIELDS: FieldMap = FieldMap {
    table: "grade_c",
    fields: &[
        FieldSpec::reference("studentId", "student_id_c"),
        FieldSpec::reference("classId", "class_id_c"),
        FieldSpec::text("assignmentName", "assignment_name_c"),
        FieldSpec::number("score", "score_c"),
        FieldSpec::number("maxScore", "max_score_c"),
        FieldSpec::date("date", "date_c"),
        FieldSpec::text("category", "category_c"),
    ],
};

impl Entity for Grade {
    type New = NewGrade;
    type Patch = GradePatch;

    const KIND: &'static str = "grade";

    fn fields() -> &'static FieldMap {
        &GRADE_FIELDS
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn record_name(friendly: &RawRecord) -> Option<String> {
        friendly
            .get("assignmentName")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_from_storage_with_lookup_references() {
        let raw = json!({
            "Id": 12,
            "Name": "Chapter 3 Quiz",
            "student_id_c": {"Id": 2, "Name": "Liam Smith"},
            "class_id_c": "5",
            "assignment_name_c": "Chapter 3 Quiz",
            "score_c": "17",
            "max_score_c": 20,
            "date_c": "2024-02-10T08:30:00Z",
            "category_c": "Quiz"
        });

        let friendly = GRADE_FIELDS.from_storage(raw.as_object().unwrap());
        let grade: Grade = serde_json::from_value(Value::Object(friendly)).unwrap();

        assert_eq!(grade.student_id, 2);
        assert_eq!(grade.class_id, 5);
        assert_eq!(grade.score, Some(17.0));
        assert_eq!(grade.percentage(), Some(85.0));
        assert_eq!(grade.letter(), Some(LetterGrade::B));
        assert_eq!(grade.date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }

    #[test]
    fn missing_maximum_decodes_without_a_percentage() {
        let raw = json!({
            "Id": 4,
            "student_id_c": 1,
            "class_id_c": 1,
            "assignment_name_c": "Essay",
            "score_c": 40,
            "date_c": "2024-02-12",
            "category_c": "Assignment"
        });

        let friendly = GRADE_FIELDS.from_storage(raw.as_object().unwrap());
        let grade: Grade = serde_json::from_value(Value::Object(friendly)).unwrap();

        assert_eq!(grade.max_score, None);
        assert_eq!(grade.percentage(), None);
        assert_eq!(grade.letter(), None);
    }
}
