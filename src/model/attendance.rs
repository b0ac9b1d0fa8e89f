use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Entity, FieldMap, FieldSpec, RawRecord, RecordId};

/// Attendance status as stored. Values outside the three known ones are kept
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Other(String),
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Other(value) => value,
        }
    }
}

impl From<String> for AttendanceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Present" => AttendanceStatus::Present,
            "Absent" => AttendanceStatus::Absent,
            "Late" => AttendanceStatus::Late,
            _ => AttendanceStatus::Other(value),
        }
    }
}

impl From<&str> for AttendanceStatus {
    fn from(value: &str) -> Self {
        AttendanceStatus::from(value.to_string())
    }
}

impl From<AttendanceStatus> for String {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendanceRecord {
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub static ATTENDANCE_FIELDS: FieldMap = FieldMap {
    table: "attendance_c",
    fields: &[
        FieldSpec::reference("studentId", "student_id_c"),
        FieldSpec::reference("classId", "class_id_c"),
        FieldSpec::date("date", "date_c"),
        FieldSpec::text("status", "status_c"),
        FieldSpec::text("notes", "notes_c").optional(),
    ],
};

impl Entity for AttendanceRecord {
    type New = NewAttendanceRecord;
    type Patch = AttendanceRecordPatch;

    const KIND: &'static str = "attendance";

    fn fields() -> &'static FieldMap {
        &ATTENDANCE_FIELDS
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn record_name(friendly: &RawRecord) -> Option<String> {
        friendly
            .get("date")
            .and_then(Value::as_str)
            .map(|date| format!("Attendance - {}", date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_survives_a_round_trip() {
        let status: AttendanceStatus = serde_json::from_value(json!("Excused")).unwrap();
        assert_eq!(status, AttendanceStatus::Other("Excused".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Excused"));
    }

    #[test]
    fn known_statuses_parse_to_variants() {
        assert_eq!(AttendanceStatus::from("Late"), AttendanceStatus::Late);
        assert_eq!(AttendanceStatus::Present.to_string(), "Present");
    }
}
