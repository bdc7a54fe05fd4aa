// Redash HTTP client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::credentials::Credentials;
use crate::error::{QueryError, Result};
use crate::types::{
    Job, JobEnvelope, Parameters, QueryResultEnvelope, ResultSet, RunQueryBody, SubmittedJob,
};

/// Per-request ceiling applied by [`RemoteJobClient::new`] callers that do not pick one
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The three Redash calls a query execution is made of.
///
/// Implementations must be safe to share across concurrent executions.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Start a fresh run of a saved query and return the job id
    async fn submit(&self, query_id: u64, parameters: &Parameters) -> Result<String>;

    /// Fetch the current state of a job
    async fn poll_status(&self, job_id: &str) -> Result<Job>;

    /// Fetch the `data` payload of a finished query result
    async fn fetch_result(&self, query_id: u64, result_id: u64) -> Result<ResultSet>;
}

/// Redash REST client (HTTP direct, pooled connections)
#[derive(Clone)]
pub struct RemoteJobClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RemoteJobClient {
    /// Create a client authenticated with the given credentials
    pub fn new(credentials: &Credentials, request_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&credentials.authorization()).map_err(|_| {
            QueryError::Configuration("Invalid API key format".to_string())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| QueryError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: credentials.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-success response into a `Remote` error carrying its body
    async fn ensure_success(
        response: reqwest::Response,
        context: &'static str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());

        tracing::warn!(status = %status, body = %body, "{}", context);

        Err(QueryError::Remote {
            context,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| QueryError::MissingData(format!("unexpected {} response: {}", what, e)))
    }
}

#[async_trait]
impl JobApi for RemoteJobClient {
    async fn submit(&self, query_id: u64, parameters: &Parameters) -> Result<String> {
        let url = format!("{}/api/queries/{}/results", self.base_url, query_id);
        let body = RunQueryBody {
            max_age: 0,
            parameters,
        };

        let response = self.http_client.post(&url).json(&body).send().await?;
        let response = Self::ensure_success(response, "Query execution failed").await?;
        let envelope: JobEnvelope<SubmittedJob> = Self::decode(response, "run query").await?;

        tracing::debug!(query_id, job_id = %envelope.job.id, "Query submitted");
        Ok(envelope.job.id)
    }

    async fn poll_status(&self, job_id: &str) -> Result<Job> {
        let url = format!("{}/api/jobs/{}", self.base_url, job_id);

        let response = self.http_client.get(&url).send().await?;
        let response = Self::ensure_success(response, "Job status check failed").await?;
        let envelope: JobEnvelope<Job> = Self::decode(response, "job status").await?;

        let mut job = envelope.job;
        if job.id.is_empty() {
            job.id = job_id.to_string();
        }
        Ok(job)
    }

    async fn fetch_result(&self, query_id: u64, result_id: u64) -> Result<ResultSet> {
        let url = format!(
            "{}/api/queries/{}/results/{}.json",
            self.base_url, query_id, result_id
        );

        let response = self.http_client.get(&url).send().await?;
        let response = Self::ensure_success(response, "Failed to get results").await?;
        let envelope: QueryResultEnvelope = Self::decode(response, "query result").await?;

        envelope
            .query_result
            .data
            .ok_or_else(|| QueryError::MissingData("query_result.data is absent".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let creds = Credentials::from_parts(
            Some("https://redash.example.com/".to_string()),
            Some("test-key".to_string()),
        )
        .unwrap();

        let client = RemoteJobClient::new(&creds, DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://redash.example.com");
    }

    #[test]
    fn test_api_key_with_newline_rejected() {
        let creds = Credentials::from_parts(
            Some("https://redash.example.com".to_string()),
            Some("bad\nkey".to_string()),
        )
        .unwrap();

        let result = RemoteJobClient::new(&creds, DEFAULT_REQUEST_TIMEOUT);
        assert!(matches!(result, Err(QueryError::Configuration(_))));
    }
}
