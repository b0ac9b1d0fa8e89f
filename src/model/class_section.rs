use serde::{Deserialize, Serialize};

use crate::model::{Entity, FieldMap, FieldSpec, RecordId};

/// A class section taught in one period and room for one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: RecordId,
    pub name: String,
    pub subject: String,
    pub period: String,
    pub room: String,
    pub semester: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClassSection {
    pub name: String,
    pub subject: String,
    pub period: String,
    pub room: String,
    pub semester: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

pub static CLASS_FIELDS: FieldMap = FieldMap {
    table: "class_c",
    fields: &[
        FieldSpec::text("name", "Name"),
        FieldSpec::text("subject", "subject_c"),
        FieldSpec::text("period", "period_c"),
        FieldSpec::text("room", "room_c"),
        FieldSpec::text("semester", "semester_c"),
        FieldSpec::integer("year", "year_c"),
    ],
};

impl Entity for ClassSection {
    type New = NewClassSection;
    type Patch = ClassSectionPatch;

    const KIND: &'static str = "class";

    fn fields() -> &'static FieldMap {
        &CLASS_FIELDS
    }

    fn id(&self) -> RecordId {
        self.id
    }
}
