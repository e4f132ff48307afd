//! Implementation of RestSink for PostgREST.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use rest_sink::{CreateResponse, RestSink, UpdateResponse};
use serde_json::Value;
use sync_core::RecordId;

use crate::connect::{default_headers, rest_base_url, PostgrestOpts};

/// reqwest client bound to one project's REST endpoint.
#[derive(Clone)]
pub struct PostgrestSink {
    client: Client,
    base_url: String,
}

impl PostgrestSink {
    /// Build a client for the project described by `opts`.
    ///
    /// No request is made; an unreachable store surfaces on the first call.
    pub fn new(opts: &PostgrestOpts) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(&opts.supabase_key)?)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: rest_base_url(&opts.supabase_url),
        })
    }

    /// REST base every collection path is joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }
}

fn id_filter(id: &RecordId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait::async_trait]
impl RestSink for PostgrestSink {
    async fn create_rows(&self, table: &str, rows: &[Value]) -> Result<CreateResponse> {
        let url = self.table_url(table);
        let response = self
            .client
            .post(&url)
            .json(rows)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {url}"))?;

        match response.status() {
            StatusCode::CREATED => {
                let body: Value = response
                    .json()
                    .await
                    .with_context(|| format!("Malformed create response from {url}"))?;
                let count = match &body {
                    Value::Array(inserted) => inserted.len(),
                    _ => 1,
                };
                tracing::debug!("{table}: store returned {body}");
                Ok(CreateResponse::Created { count })
            }
            StatusCode::CONFLICT => Ok(CreateResponse::Conflict),
            status => Ok(CreateResponse::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn update_row(
        &self,
        table: &str,
        id: &RecordId,
        row: &Value,
    ) -> Result<UpdateResponse> {
        let url = self.table_url(table);
        let response = self
            .client
            .patch(&url)
            .query(&id_filter(id))
            .json(row)
            .send()
            .await
            .with_context(|| format!("Failed to PATCH {url} for id {id}"))?;

        match response.status() {
            StatusCode::OK => {
                // The body lists the rows the filter matched
                let rows: Vec<Value> = response
                    .json()
                    .await
                    .with_context(|| format!("Malformed update response from {url}"))?;
                if rows.is_empty() {
                    Ok(UpdateResponse::NoMatch)
                } else {
                    Ok(UpdateResponse::Updated)
                }
            }
            StatusCode::NO_CONTENT => Ok(UpdateResponse::Updated),
            status => Ok(UpdateResponse::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn row_exists(&self, table: &str, id: &RecordId) -> Result<bool> {
        let url = self.table_url(table);
        let response = self
            .client
            .get(&url)
            .query(&id_filter(id))
            .send()
            .await
            .with_context(|| format!("Failed to GET {url} for id {id}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Existence check for {table} id {id} failed with HTTP {status}: {body}");
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("Malformed existence response from {url}"))?;
        Ok(!rows.is_empty())
    }
}
