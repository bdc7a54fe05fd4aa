use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure categories surfaced to callers of the query core.
///
/// Every [`QueryError`] belongs to exactly one kind. Protocol layers map kinds,
/// not variants, onto their own error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Network,
    Remote,
    MissingData,
    Timeout,
    UnknownTool,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Remote => "remote",
            ErrorKind::MissingData => "missing_data",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{context}: {body}")]
    Remote {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("Query execution failed (job {job_id}): {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Missing data in Redash response: {0}")]
    MissingData(String),

    #[error("Query execution timeout: job {job_id} still running after {}s", .waited.as_secs())]
    Timeout { job_id: String, waited: Duration },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Configuration(_) => ErrorKind::Configuration,
            QueryError::Validation(_) => ErrorKind::Validation,
            QueryError::Network(_) => ErrorKind::Network,
            QueryError::Remote { .. } | QueryError::JobFailed { .. } => ErrorKind::Remote,
            QueryError::MissingData(_) => ErrorKind::MissingData,
            QueryError::Timeout { .. } => ErrorKind::Timeout,
            QueryError::UnknownTool(_) => ErrorKind::UnknownTool,
            QueryError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_failure_is_remote_kind() {
        let err = QueryError::JobFailed {
            job_id: "abc".to_string(),
            message: "syntax error".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_remote_error_keeps_body() {
        let err = QueryError::Remote {
            context: "Query execution failed",
            status: 403,
            body: "{\"message\": \"forbidden\"}".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "Query execution failed: {\"message\": \"forbidden\"}");
    }

    #[test]
    fn test_timeout_message() {
        let err = QueryError::Timeout {
            job_id: "job-1".to_string(),
            waited: Duration::from_secs(30),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("after 30s"));
    }
}
