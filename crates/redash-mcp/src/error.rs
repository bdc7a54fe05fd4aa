use redash_query::{ErrorKind, QueryError};
use rmcp::model::{ErrorCode, ErrorData};
use serde_json::json;

/// Protocol error codes outside the JSON-RPC reserved set.
pub mod codes {
    use rmcp::model::ErrorCode;

    pub const TIMEOUT: ErrorCode = ErrorCode(-32001);
    pub const INVALID_CONFIGURATION: ErrorCode = ErrorCode(-32002);
    pub const NETWORK_ERROR: ErrorCode = ErrorCode(-32003);
}

/// Protocol code for a core error kind
pub fn error_code(kind: ErrorKind) -> ErrorCode {
    match kind {
        ErrorKind::UnknownTool => ErrorCode::METHOD_NOT_FOUND,
        ErrorKind::Validation => ErrorCode::INVALID_PARAMS,
        ErrorKind::Configuration => codes::INVALID_CONFIGURATION,
        ErrorKind::Network => codes::NETWORK_ERROR,
        ErrorKind::Timeout => codes::TIMEOUT,
        ErrorKind::Remote | ErrorKind::MissingData | ErrorKind::Internal => {
            ErrorCode::INTERNAL_ERROR
        }
    }
}

/// Re-express a core error as an MCP error, keeping its message
pub fn to_mcp_error(err: &QueryError) -> ErrorData {
    let kind = err.kind();
    ErrorData::new(
        error_code(kind),
        err.to_string(),
        Some(json!({ "kind": kind.to_string() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_every_kind_has_a_stable_code() {
        assert_eq!(error_code(ErrorKind::UnknownTool).0, -32601);
        assert_eq!(error_code(ErrorKind::Validation).0, -32602);
        assert_eq!(error_code(ErrorKind::Internal).0, -32603);
        assert_eq!(error_code(ErrorKind::Timeout).0, -32001);
        assert_eq!(error_code(ErrorKind::Configuration).0, -32002);
        assert_eq!(error_code(ErrorKind::Network).0, -32003);
    }

    #[test]
    fn test_message_preserved() {
        let err = QueryError::Timeout {
            job_id: "job-9".to_string(),
            waited: Duration::from_secs(30),
        };
        let mcp = to_mcp_error(&err);

        assert_eq!(mcp.code, codes::TIMEOUT);
        assert_eq!(mcp.message, err.to_string());
        assert_eq!(mcp.data, Some(json!({ "kind": "timeout" })));
    }

    #[test]
    fn test_job_failure_maps_to_internal_error() {
        let err = QueryError::JobFailed {
            job_id: "job-9".to_string(),
            message: "division by zero".to_string(),
        };
        assert_eq!(to_mcp_error(&err).code, ErrorCode::INTERNAL_ERROR);
    }
}
