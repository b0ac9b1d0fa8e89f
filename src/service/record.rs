use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use log::{error, info};
use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;
use crate::model::{Entity, FieldError, RawRecord, RecordId};
use crate::store::traits::{RecordOutcome, StorageAdapter};

/// One batch item the store refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    /// Position of the item in the submitted batch.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl FailedItem {
    fn from_outcome(index: usize, id: Option<RecordId>, outcome: RecordOutcome) -> Self {
        Self {
            index,
            id,
            message: outcome.message,
            errors: outcome.errors,
            status_code: outcome.status_code,
        }
    }
}

/// Result of a batch write: whatever was saved, plus the items that were not.
/// Batches are not atomic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome<E> {
    pub saved: Vec<E>,
    pub failed: Vec<FailedItem>,
}

impl<E> BatchOutcome<E> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<E> Default for BatchOutcome<E> {
    fn default() -> Self {
        Self {
            saved: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// CRUD over one entity collection, in friendly field naming.
///
/// Translation to and from storage naming happens only through the entity's
/// [`crate::model::FieldMap`].
pub struct RecordService<E> {
    store: Arc<dyn StorageAdapter>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for RecordService<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> RecordService<E> {
    pub fn new(store: Arc<dyn StorageAdapter>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        E::fields().table
    }

    fn decode(raw: &RawRecord) -> Result<E, ServiceError> {
        let friendly = E::fields().from_storage(raw);
        serde_json::from_value(Value::Object(friendly)).map_err(|source| ServiceError::Codec {
            entity: E::KIND,
            source,
        })
    }

    fn to_friendly<T: Serialize>(value: &T) -> Result<RawRecord, ServiceError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ServiceError::Codec {
                entity: E::KIND,
                source: serde::ser::Error::custom("record did not serialize to an object"),
            }),
            Err(source) => Err(ServiceError::Codec {
                entity: E::KIND,
                source,
            }),
        }
    }

    fn encode<T: Serialize>(value: &T) -> Result<RawRecord, ServiceError> {
        Ok(E::to_storage_record(&Self::to_friendly(value)?))
    }

    /// Overlay the fields present in `patch` on `existing`.
    fn merge(existing: &E, patch: &E::Patch) -> Result<E, ServiceError> {
        let mut merged = Self::to_friendly(existing)?;
        merged.extend(Self::to_friendly(patch)?);
        serde_json::from_value(Value::Object(merged)).map_err(|source| ServiceError::Codec {
            entity: E::KIND,
            source,
        })
    }

    fn log_failures(&self, action: &str, failed: &[FailedItem]) {
        if failed.is_empty() {
            return;
        }
        error!(
            "Failed to {} {} {} records",
            action,
            failed.len(),
            E::KIND
        );
        for item in failed {
            if let Some(message) = &item.message {
                error!("  item {}: {}", item.index, message);
            }
            for field in &item.errors {
                error!("  item {}: {}: {}", item.index, field.field_label, field.message);
            }
        }
    }

    fn collect(
        &self,
        action: &str,
        outcomes: Vec<RecordOutcome>,
        ids: &[Option<RecordId>],
        expected: usize,
    ) -> Result<BatchOutcome<E>, ServiceError> {
        let mut batch = BatchOutcome::default();
        let mut outcomes = outcomes.into_iter();

        for index in 0..expected {
            let id = ids.get(index).copied().flatten();
            match outcomes.next() {
                Some(RecordOutcome {
                    success: true,
                    data: Some(raw),
                    ..
                }) => batch.saved.push(Self::decode(&raw)?),
                Some(outcome) => batch.failed.push(FailedItem::from_outcome(index, id, outcome)),
                None => batch.failed.push(FailedItem {
                    index,
                    id,
                    message: Some("store returned no result for this item".to_string()),
                    errors: Vec::new(),
                    status_code: None,
                }),
            }
        }

        self.log_failures(action, &batch.failed);
        Ok(batch)
    }

    fn single(mut batch: BatchOutcome<E>, id: Option<RecordId>) -> Result<E, ServiceError> {
        if let Some(saved) = batch.saved.pop() {
            return Ok(saved);
        }
        match batch.failed.pop() {
            Some(item) if item.status_code == Some(404) => Err(ServiceError::NotFound {
                entity: E::KIND,
                id: id.or(item.id).unwrap_or_default(),
            }),
            Some(item) => Err(ServiceError::Rejected {
                entity: E::KIND,
                message: item.message,
                errors: item.errors,
            }),
            None => Err(ServiceError::Rejected {
                entity: E::KIND,
                message: None,
                errors: Vec::new(),
            }),
        }
    }

    /// Every record in the collection. Ordering depends on the store: the
    /// memory store yields id order, the remote store newest first.
    pub async fn get_all(&self) -> Result<Vec<E>, ServiceError> {
        let fields = E::fields().storage_fields();
        let rows = self.store.fetch_all(self.table(), &fields).await?;
        rows.iter().map(Self::decode).collect()
    }

    /// `Ok(None)` when no record has this id.
    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<E>, ServiceError> {
        let fields = E::fields().storage_fields();
        match self.store.fetch_by_id(self.table(), id, &fields).await? {
            Some(raw) => Self::decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Create one record. A store-side rejection of the only item is
    /// reported as [`ServiceError::Rejected`].
    pub async fn create(&self, data: E::New) -> Result<E, ServiceError> {
        let batch = self.create_many(vec![data]).await?;
        let created = Self::single(batch, None)?;
        info!("Created {} {}", E::KIND, created.id());
        Ok(created)
    }

    pub async fn create_many(&self, items: Vec<E::New>) -> Result<BatchOutcome<E>, ServiceError> {
        if items.is_empty() {
            return Ok(BatchOutcome::default());
        }
        let records = items
            .iter()
            .map(Self::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let expected = records.len();
        let outcomes = self.store.create_records(self.table(), records).await?;
        self.collect("create", outcomes, &[], expected)
    }

    /// Merge `patch` over the stored record. Fails with `NotFound` for an
    /// unknown id.
    pub async fn update(&self, id: RecordId, patch: E::Patch) -> Result<E, ServiceError> {
        let existing = self.get_by_id(id).await?.ok_or(ServiceError::NotFound {
            entity: E::KIND,
            id,
        })?;
        let merged = Self::merge(&existing, &patch)?;
        let outcomes = self
            .store
            .update_records(self.table(), vec![Self::encode(&merged)?])
            .await?;
        let batch = self.collect("update", outcomes, &[Some(id)], 1)?;
        let updated = Self::single(batch, Some(id))?;
        info!("Updated {} {}", E::KIND, id);
        Ok(updated)
    }

    /// Partial updates for several records. Unknown ids are reported as
    /// failed items with status 404.
    pub async fn update_many(
        &self,
        items: Vec<(RecordId, E::Patch)>,
    ) -> Result<BatchOutcome<E>, ServiceError> {
        if items.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let current: HashMap<RecordId, E> = self
            .get_all()
            .await?
            .into_iter()
            .map(|record| (record.id(), record))
            .collect();

        let mut batch = BatchOutcome::default();
        let mut records = Vec::new();
        let mut positions = Vec::new();
        for (index, (id, patch)) in items.iter().enumerate() {
            match current.get(id) {
                Some(existing) => {
                    records.push(Self::encode(&Self::merge(existing, patch)?)?);
                    positions.push((index, *id));
                }
                None => batch.failed.push(FailedItem::from_outcome(
                    index,
                    Some(*id),
                    RecordOutcome::not_found(*id),
                )),
            }
        }

        if !records.is_empty() {
            let ids: Vec<Option<RecordId>> = positions.iter().map(|(_, id)| Some(*id)).collect();
            let outcomes = self.store.update_records(self.table(), records).await?;
            let sent = self.collect("update", outcomes, &ids, positions.len())?;
            batch.saved.extend(sent.saved);
            batch.failed.extend(sent.failed.into_iter().map(|mut item| {
                item.index = positions[item.index].0;
                item
            }));
        }

        batch.failed.sort_by_key(|item| item.index);
        Ok(batch)
    }

    /// Remove a record. Deleting an id that does not resolve fails with
    /// `NotFound`; it never succeeds twice.
    pub async fn delete(&self, id: RecordId) -> Result<bool, ServiceError> {
        let outcomes = self.store.delete_records(self.table(), &[id]).await?;
        match outcomes.into_iter().next() {
            Some(outcome) if outcome.success => {
                info!("Deleted {} {}", E::KIND, id);
                Ok(true)
            }
            Some(outcome) if outcome.is_not_found() => Err(ServiceError::NotFound {
                entity: E::KIND,
                id,
            }),
            Some(outcome) => {
                let item = FailedItem::from_outcome(0, Some(id), outcome);
                self.log_failures("delete", std::slice::from_ref(&item));
                Err(ServiceError::Rejected {
                    entity: E::KIND,
                    message: item.message,
                    errors: item.errors,
                })
            }
            None => Err(ServiceError::Rejected {
                entity: E::KIND,
                message: Some("store returned no result".to_string()),
                errors: Vec::new(),
            }),
        }
    }
}
