use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::{RawRecord, RecordId, FRIENDLY_ID_FIELD, ID_FIELD, NAME_FIELD};

/// How a storage value is normalized when crossing the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    /// Calendar date; timestamps are cut down to their `YYYY-MM-DD` part.
    Date,
    /// Id of another record. The store may hand back `{"Id": 3, "Name": "..."}`
    /// instead of a bare id.
    Reference,
}

impl FieldKind {
    pub fn normalize(self, value: &Value) -> Value {
        match self {
            FieldKind::Reference => match value {
                Value::Object(lookup) => lookup
                    .get(ID_FIELD)
                    .map(|id| FieldKind::Integer.normalize(id))
                    .unwrap_or(Value::Null),
                other => FieldKind::Integer.normalize(other),
            },
            FieldKind::Integer => match value {
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| value.clone()),
                Value::Number(n) if n.is_f64() => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| Value::from(f.trunc() as i64))
                    .unwrap_or_else(|| value.clone()),
                _ => value.clone(),
            },
            FieldKind::Number => match value {
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| value.clone()),
                _ => value.clone(),
            },
            FieldKind::Date => match value {
                Value::String(s) => match s.split_once('T') {
                    Some((date, _)) => Value::String(date.to_string()),
                    None => value.clone(),
                },
                _ => value.clone(),
            },
            FieldKind::Text => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub friendly: &'static str,
    pub storage: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn new(friendly: &'static str, storage: &'static str, kind: FieldKind) -> Self {
        Self {
            friendly,
            storage,
            kind,
            required: true,
        }
    }

    pub const fn text(friendly: &'static str, storage: &'static str) -> Self {
        Self::new(friendly, storage, FieldKind::Text)
    }

    pub const fn integer(friendly: &'static str, storage: &'static str) -> Self {
        Self::new(friendly, storage, FieldKind::Integer)
    }

    pub const fn number(friendly: &'static str, storage: &'static str) -> Self {
        Self::new(friendly, storage, FieldKind::Number)
    }

    pub const fn date(friendly: &'static str, storage: &'static str) -> Self {
        Self::new(friendly, storage, FieldKind::Date)
    }

    pub const fn reference(friendly: &'static str, storage: &'static str) -> Self {
        Self::new(friendly, storage, FieldKind::Reference)
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// The one place where an entity's friendly field names meet the backing
/// store's `_c` column names.
#[derive(Debug)]
pub struct FieldMap {
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FieldMap {
    /// Columns to request from the store: `Name` first, then every mapped column.
    pub fn storage_fields(&self) -> Vec<&'static str> {
        std::iter::once(NAME_FIELD)
            .chain(
                self.fields
                    .iter()
                    .map(|spec| spec.storage)
                    .filter(|storage| *storage != NAME_FIELD),
            )
            .collect()
    }

    pub fn required_storage_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.storage)
            .collect()
    }

    pub fn storage_name(&self, friendly: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|spec| spec.friendly == friendly)
            .map(|spec| spec.storage)
    }

    pub fn friendly_name(&self, storage: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|spec| spec.storage == storage)
            .map(|spec| spec.friendly)
    }

    /// Friendly record -> storage record. Unmapped keys are dropped.
    pub fn to_storage(&self, friendly: &RawRecord) -> RawRecord {
        let mut record = RawRecord::new();
        if let Some(id) = friendly.get(FRIENDLY_ID_FIELD).filter(|id| !id.is_null()) {
            record.insert(ID_FIELD.to_string(), FieldKind::Integer.normalize(id));
        }
        for spec in self.fields {
            if let Some(value) = friendly.get(spec.friendly) {
                record.insert(spec.storage.to_string(), spec.kind.normalize(value));
            }
        }
        record
    }

    /// Storage record -> friendly record. Null columns are left out so that
    /// optional and defaulted fields decode cleanly.
    pub fn from_storage(&self, raw: &RawRecord) -> RawRecord {
        let mut record = RawRecord::new();
        if let Some(id) = raw.get(ID_FIELD) {
            record.insert(
                FRIENDLY_ID_FIELD.to_string(),
                FieldKind::Integer.normalize(id),
            );
        }
        for spec in self.fields {
            match raw.get(spec.storage) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    record.insert(spec.friendly.to_string(), spec.kind.normalize(value));
                }
            }
        }
        record
    }
}

/// A record type managed by a [`crate::service::RecordService`].
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Creation payload (no id).
    type New: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Partial update payload; absent fields keep their stored value.
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Human-readable entity name used in errors and logs.
    const KIND: &'static str;

    fn fields() -> &'static FieldMap;

    fn id(&self) -> RecordId;

    /// Value for the store's `Name` column, derived from the friendly record.
    fn record_name(_friendly: &RawRecord) -> Option<String> {
        None
    }

    fn to_storage_record(friendly: &RawRecord) -> RawRecord {
        let mut record = Self::fields().to_storage(friendly);
        if let Some(name) = Self::record_name(friendly) {
            record.insert(NAME_FIELD.to_string(), Value::String(name));
        }
        record
    }
}
