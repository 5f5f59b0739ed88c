//! HTTP client for a PostgREST table store
//!
//! Every request carries the project key both as `apikey` and as a bearer
//! token, and asks for the affected rows back so callers can see how many
//! rows an insert or delete touched.

use crate::config::StoreCredentials;
use crate::error::{CliError, Result};
use crate::store::types::{DeleteResponse, EqFilter, InsertResponse, StoreErrorBody};
use crate::store::{endpoints, TableStore};
use async_trait::async_trait;
use livesim_common::types::Record;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Longest raw error body quoted in an error message
const MAX_ERROR_BODY_CHARS: usize = 300;

/// REST client for one table store project
pub struct RestTableClient {
    client: Client,
    base_url: String,
}

impl RestTableClient {
    /// Create a client authenticated with `credentials`
    pub fn new(credentials: &StoreCredentials, timeout: Duration) -> Result<Self> {
        let key = HeaderValue::from_str(credentials.key())
            .map_err(|_| CliError::config("store key contains characters not allowed in a header"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.key()))
            .map_err(|_| CliError::config("store key contains characters not allowed in a header"))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=representation"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: credentials.url().as_str().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TableStore for RestTableClient {
    async fn insert(&self, table: &str, records: &[Record]) -> Result<InsertResponse> {
        let url = endpoints::table_url(&self.base_url, table);
        debug!(%url, records = records.len(), "POST insert");

        let response = self.client.post(&url).json(records).send().await?;
        let returned = returned_rows(response).await?;

        Ok(InsertResponse {
            submitted: records.len(),
            returned,
        })
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<DeleteResponse> {
        let url = endpoints::filtered_table_url(&self.base_url, table, filters);
        debug!(%url, "DELETE rows");

        let response = self.client.delete(&url).send().await?;
        let returned = returned_rows(response).await?;

        Ok(DeleteResponse { returned })
    }
}

/// Count the rows in a representation body, or fail on a non-2xx status
async fn returned_rows(response: Response) -> Result<Option<usize>> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(CliError::store(status.as_u16(), error_message(status, &body)));
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Array(rows)) => Ok(Some(rows.len())),
        _ => Ok(None),
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Some(summary) = serde_json::from_str::<StoreErrorBody>(body)
        .ok()
        .and_then(|b| b.summary())
    {
        return summary;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}
