use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{QueryError, Result};

/// Opaque tabular payload of a finished query, passed through unchanged.
pub type ResultSet = Value;

/// Query parameters forwarded to Redash as-is.
pub type Parameters = Map<String, Value>;

/// One request to run a saved query
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    query_id: u64,
    parameters: Parameters,
}

impl ExecutionRequest {
    pub fn new(query_id: u64) -> Result<Self> {
        if query_id == 0 {
            return Err(QueryError::Validation(
                "query_id must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            query_id,
            parameters: Parameters::new(),
        })
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn query_id(&self) -> u64 {
        self.query_id
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// Lifecycle of a Redash job as reported by `/api/jobs/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum JobStatus {
    Pending,
    Started,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(JobStatus::Pending),
            2 => Ok(JobStatus::Started),
            3 => Ok(JobStatus::Completed),
            4 => Ok(JobStatus::Failed),
            5 => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status code {}", other)),
        }
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => 1,
            JobStatus::Started => 2,
            JobStatus::Completed => 3,
            JobStatus::Failed => 4,
            JobStatus::Cancelled => 5,
        }
    }
}

/// Server-side job handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub query_result_id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

// Wire envelopes

#[derive(Debug, Serialize)]
pub(crate) struct RunQueryBody<'a> {
    pub max_age: u32,
    pub parameters: &'a Parameters,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmittedJob {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEnvelope<J> {
    pub job: J,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResultEnvelope {
    pub query_result: QueryResultBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResultBody {
    #[serde(default)]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_query_id_rejected() {
        let err = ExecutionRequest::new(0).unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }

    #[test]
    fn test_request_defaults_to_empty_parameters() {
        let request = ExecutionRequest::new(42).unwrap();
        assert_eq!(request.query_id(), 42);
        assert!(request.parameters().is_empty());
    }

    #[test]
    fn test_job_status_from_wire() {
        let job: Job = serde_json::from_value(json!({
            "id": "abc",
            "status": 3,
            "query_result_id": 99
        }))
        .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.query_result_id, Some(99));
        assert!(job.status.is_terminal());
    }

    #[test]
    fn test_pending_job_has_no_result() {
        let job: Job = serde_json::from_value(json!({
            "id": "abc",
            "status": 1,
            "query_result_id": null
        }))
        .unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.query_result_id, None);
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn test_unknown_status_code_rejected() {
        let result: std::result::Result<Job, _> =
            serde_json::from_value(json!({ "id": "abc", "status": 9 }));
        assert!(result.is_err());
    }
}
