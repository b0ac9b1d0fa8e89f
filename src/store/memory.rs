use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::StoreError;
use crate::model::{
    FieldError, FieldMap, RawRecord, RecordId, ATTENDANCE_FIELDS, CLASS_FIELDS, GRADE_FIELDS,
    ID_FIELD, STUDENT_FIELDS,
};
use crate::store::traits::{RecordOutcome, StorageAdapter};

/// One table: records keyed by id plus the highest id ever handed out.
#[derive(Debug, Default)]
struct Collection {
    records: BTreeMap<RecordId, RawRecord>,
    last_id: RecordId,
    required: Vec<&'static str>,
}

impl Collection {
    fn next_id(&mut self) -> RecordId {
        let highest = self.records.keys().next_back().copied().unwrap_or(0);
        self.last_id = self.last_id.max(highest) + 1;
        self.last_id
    }

    fn missing_fields(&self, record: &RawRecord) -> Vec<FieldError> {
        self.required
            .iter()
            .filter(|field| match record.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|field| FieldError::new(*field, "is required"))
            .collect()
    }
}

/// In-process record store used for local runs and tests.
///
/// Each table sits behind its own mutex, so id assignment is serialized per
/// table. Ids are never reused within the lifetime of the store. `fetch_all`
/// returns records in id order, which is also insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<Mutex<Collection>>>>,
    latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that knows the required columns of the four school tables.
    pub fn school() -> Self {
        Self::new()
            .with_schema(&STUDENT_FIELDS)
            .with_schema(&CLASS_FIELDS)
            .with_schema(&GRADE_FIELDS)
            .with_schema(&ATTENDANCE_FIELDS)
    }

    /// Reject creates and updates that leave a required column of `fields` empty.
    pub fn with_schema(self, fields: &FieldMap) -> Self {
        self.collection(fields.table).lock().required = fields.required_storage_fields();
        self
    }

    /// Delay every operation, to mimic a remote round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn collection(&self, table: &str) -> Arc<Mutex<Collection>> {
        if let Some(collection) = self.collections.read().get(table) {
            return Arc::clone(collection);
        }
        let mut collections = self.collections.write();
        Arc::clone(collections.entry(table.to_string()).or_default())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn project(record: &RawRecord, fields: &[&str]) -> RawRecord {
    if fields.is_empty() {
        return record.clone();
    }
    record
        .iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn record_id(record: &RawRecord) -> Option<RecordId> {
    match record.get(ID_FIELD)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait::async_trait]
impl StorageAdapter for MemoryStore {
    async fn fetch_all(&self, table: &str, fields: &[&str]) -> Result<Vec<RawRecord>, StoreError> {
        self.simulate_latency().await;
        let collection = self.collection(table);
        let collection = collection.lock();
        Ok(collection
            .records
            .values()
            .map(|record| project(record, fields))
            .collect())
    }

    async fn fetch_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Option<RawRecord>, StoreError> {
        self.simulate_latency().await;
        let collection = self.collection(table);
        let collection = collection.lock();
        Ok(collection.records.get(&id).map(|record| project(record, fields)))
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.simulate_latency().await;
        let collection = self.collection(table);
        let mut collection = collection.lock();

        let outcomes = records
            .into_iter()
            .map(|mut record| {
                let missing = collection.missing_fields(&record);
                if !missing.is_empty() {
                    return RecordOutcome::failed(400, "Required fields are missing", missing);
                }
                let id = collection.next_id();
                record.insert(ID_FIELD.to_string(), id.into());
                collection.records.insert(id, record.clone());
                debug!("Created {} record {}", table, id);
                RecordOutcome::saved(record)
            })
            .collect();

        Ok(outcomes)
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.simulate_latency().await;
        let collection = self.collection(table);
        let mut collection = collection.lock();

        let outcomes = records
            .into_iter()
            .map(|changes| {
                let Some(id) = record_id(&changes) else {
                    return RecordOutcome::failed(400, "Record Id is required", Vec::new());
                };
                let Some(existing) = collection.records.get(&id) else {
                    return RecordOutcome::not_found(id);
                };

                let mut merged = existing.clone();
                for (key, value) in changes {
                    if key != ID_FIELD {
                        merged.insert(key, value);
                    }
                }

                let missing = collection.missing_fields(&merged);
                if !missing.is_empty() {
                    return RecordOutcome::failed(400, "Required fields are missing", missing);
                }

                collection.records.insert(id, merged.clone());
                debug!("Updated {} record {}", table, id);
                RecordOutcome::saved(merged)
            })
            .collect();

        Ok(outcomes)
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[RecordId],
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.simulate_latency().await;
        let collection = self.collection(table);
        let mut collection = collection.lock();

        Ok(ids
            .iter()
            .map(|id| match collection.records.remove(id) {
                Some(_) => {
                    debug!("Deleted {} record {}", table, id);
                    RecordOutcome::deleted(*id)
                }
                None => RecordOutcome::not_found(*id),
            })
            .collect())
    }
}
