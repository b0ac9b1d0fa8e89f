use serde::{Deserialize, Serialize};

/// Store-assigned record identifier. Positive, unique within one collection.
pub type RecordId = u64;

/// A record as the storage adapter sees it: storage field names mapped to JSON values.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Storage column holding the record id.
pub const ID_FIELD: &str = "Id";

/// Storage column holding the record's display name.
pub const NAME_FIELD: &str = "Name";

/// Friendly field holding the record id.
pub const FRIENDLY_ID_FIELD: &str = "id";

/// A field-level complaint from the backing store about one record in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_label: field_label.into(),
            message: message.into(),
        }
    }
}
