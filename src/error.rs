use thiserror::Error;

use crate::model::{FieldError, RecordId};

/// Failures reaching or talking to the backing record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("record store request failed: {message}")]
    Backend { status: Option<u16>, message: String },
}

impl StoreError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        StoreError::Backend {
            status,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the record services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("{entity} record rejected: {}", describe_rejection(.message, .errors))]
    Rejected {
        entity: &'static str,
        message: Option<String>,
        errors: Vec<FieldError>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not convert {entity} record: {source}")]
    Codec {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

fn describe_rejection(message: &Option<String>, errors: &[FieldError]) -> String {
    let details = errors
        .iter()
        .map(|e| format!("{}: {}", e.field_label, e.message))
        .collect::<Vec<_>>()
        .join(", ");
    match (message.as_deref(), details.is_empty()) {
        (Some(message), true) => message.to_string(),
        (Some(message), false) => format!("{} ({})", message, details),
        (None, false) => details,
        (None, true) => "no reason given".to_string(),
    }
}
