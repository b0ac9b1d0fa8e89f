//! HTTP client for a hosted record API.
//!
//! Every table lives under `{base_url}/tables/{table}`. Responses are wrapped
//! in an envelope `{success, message, data, results}`; batch writes report one
//! entry in `results` per submitted record.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::StoreError;
use crate::model::{RawRecord, RecordId, ID_FIELD};
use crate::store::traits::{RecordOutcome, StorageAdapter};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub base_url: String,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout: Duration,
    /// Extra attempts for reads that fail to connect or time out.
    pub max_retries: u32,
}

impl RemoteOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: None,
            public_key: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
    #[serde(default)]
    results: Option<Vec<RecordOutcome>>,
}

#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
    project_id: Option<String>,
    public_key: Option<String>,
    max_retries: u32,
    client: Client,
}

impl RemoteStore {
    pub fn new(options: RemoteOptions) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            project_id: options.project_id,
            public_key: options.public_key,
            max_retries: options.max_retries,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref project_id) = self.project_id {
            req = req.header("X-Project-Id", project_id);
        }
        if let Some(ref key) = self.public_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request, retrying connect failures and timeouts when `idempotent`.
    async fn execute<F>(&self, build: F, idempotent: bool) -> Result<Response, StoreError>
    where
        F: Fn() -> RequestBuilder,
    {
        let attempts = if idempotent { self.max_retries + 1 } else { 1 };
        let mut attempt = 0;
        loop {
            attempt += 1;
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts && (e.is_connect() || e.is_timeout()) => {
                    warn!(
                        "Record store request failed (attempt {}/{}): {}",
                        attempt, attempts, e
                    );
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::backend(
                Some(status.as_u16()),
                format!("{}: {}", status, body),
            ));
        }
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(StoreError::backend(
                Some(status.as_u16()),
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        Ok(envelope)
    }

    fn field_spec(fields: &[&str]) -> serde_json::Value {
        fields
            .iter()
            .map(|name| json!({ "field": { "Name": name } }))
            .collect()
    }

    async fn write(
        &self,
        method: Method,
        table: &str,
        body: serde_json::Value,
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        let path = format!("/tables/{}/records", table);
        let response = self
            .execute(|| self.request(method.clone(), &path).json(&body), false)
            .await?;
        let envelope: Envelope<serde_json::Value> = Self::envelope(response).await?;
        Ok(envelope.results.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl StorageAdapter for RemoteStore {
    async fn fetch_all(&self, table: &str, fields: &[&str]) -> Result<Vec<RawRecord>, StoreError> {
        let path = format!("/tables/{}/query", table);
        let body = json!({
            "fields": Self::field_spec(fields),
            "orderBy": [{ "fieldName": ID_FIELD, "sorttype": "DESC" }],
        });
        debug!("Fetching {} records", table);
        let response = self
            .execute(|| self.request(Method::POST, &path).json(&body), true)
            .await?;
        let envelope: Envelope<Vec<RawRecord>> = Self::envelope(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn fetch_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Option<RawRecord>, StoreError> {
        let path = format!("/tables/{}/records/{}/query", table, id);
        let body = json!({ "fields": Self::field_spec(fields) });
        let response = self
            .execute(|| self.request(Method::POST, &path).json(&body), true)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: Envelope<RawRecord> = Self::envelope(response).await?;
        Ok(envelope.data)
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.write(Method::POST, table, json!({ "records": records }))
            .await
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.write(Method::PUT, table, json!({ "records": records }))
            .await
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[RecordId],
    ) -> Result<Vec<RecordOutcome>, StoreError> {
        self.write(Method::DELETE, table, json!({ "RecordIds": ids }))
            .await
    }
}
