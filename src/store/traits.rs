use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{FieldError, RawRecord, RecordId, ID_FIELD};

/// Result for one item of a batch write, in the shape the record API reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl RecordOutcome {
    pub fn saved(data: RawRecord) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn deleted(id: RecordId) -> Self {
        let mut data = RawRecord::new();
        data.insert(ID_FIELD.to_string(), id.into());
        Self::saved(data)
    }

    pub fn failed(status_code: u16, message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors,
            status_code: Some(status_code),
            ..Self::default()
        }
    }

    pub fn not_found(id: RecordId) -> Self {
        Self::failed(404, format!("Record {} does not exist", id), Vec::new())
    }

    pub fn is_not_found(&self) -> bool {
        !self.success && self.status_code == Some(404)
    }
}

/// Boundary between the record services and whatever holds the records.
///
/// Records cross this boundary in storage naming. Write operations report one
/// outcome per input item, in input order; only whole-request failures are
/// returned as `Err`. Retry and timeout policy belong to the implementation.
#[async_trait::async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Ordering is implementation-defined and only fit for display.
    async fn fetch_all(&self, table: &str, fields: &[&str]) -> Result<Vec<RawRecord>, StoreError>;
    async fn fetch_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Option<RawRecord>, StoreError>;
    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError>;
    /// Each record must carry its `Id`; supplied columns are merged over the stored ones.
    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError>;
    async fn delete_records(
        &self,
        table: &str,
        ids: &[RecordId],
    ) -> Result<Vec<RecordOutcome>, StoreError>;
}
