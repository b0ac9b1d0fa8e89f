use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Entity, FieldMap, FieldSpec, RawRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Grade level label, e.g. "10th".
    pub grade: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
    #[serde(default)]
    pub status: StudentStatus,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

/// Input model for creating a student (id is assigned by the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
    #[serde(default)]
    pub status: StudentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StudentStatus>,
}

pub static STUDENT_FIELDS: FieldMap = FieldMap {
    table: "student_c",
    fields: &[
        FieldSpec::text("firstName", "first_name_c"),
        FieldSpec::text("lastName", "last_name_c"),
        FieldSpec::text("email", "email_c"),
        FieldSpec::text("grade", "grade_c"),
        FieldSpec::date("dateOfBirth", "date_of_birth_c"),
        FieldSpec::date("enrollmentDate", "enrollment_date_c"),
        FieldSpec::text("status", "status_c"),
    ],
};

impl Entity for Student {
    type New = NewStudent;
    type Patch = StudentPatch;

    const KIND: &'static str = "student";

    fn fields() -> &'static FieldMap {
        &STUDENT_FIELDS
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn record_name(friendly: &RawRecord) -> Option<String> {
        let first = friendly.get("firstName").and_then(Value::as_str)?;
        let last = friendly.get("lastName").and_then(Value::as_str).unwrap_or_default();
        Some(format!("{} {}", first, last).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_record_carries_display_name() {
        let friendly = json!({
            "firstName": "Emma",
            "lastName": "Johnson",
            "email": "emma@school.edu",
            "grade": "10th",
            "dateOfBirth": "2008-03-15",
            "enrollmentDate": "2023-09-01",
            "status": "Active"
        });

        let record = Student::to_storage_record(friendly.as_object().unwrap());

        assert_eq!(record["Name"], json!("Emma Johnson"));
        assert_eq!(record["first_name_c"], json!("Emma"));
        assert_eq!(record["date_of_birth_c"], json!("2008-03-15"));
        assert_eq!(record["status_c"], json!("Active"));
    }

    #[test]
    fn missing_status_defaults_to_active() {
        let student: Student = serde_json::from_value(json!({
            "id": 1,
            "firstName": "Liam",
            "lastName": "Smith",
            "email": "liam@school.edu",
            "grade": "9th",
            "dateOfBirth": "2009-01-02",
            "enrollmentDate": "2023-09-01"
        }))
        .unwrap();

        assert!(student.is_active());
        assert_eq!(student.full_name(), "Liam Smith");
    }
}
