use redash_query::{
    Credentials, ExecutionController, PollPolicy, QueryError, Result, ResultSet,
};
use rmcp::model::{CallToolResult, Content, ErrorData, JsonObject, Tool};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::to_mcp_error;
use crate::tool::{execute_query_tool, parse_execute_query_args, EXECUTE_QUERY};

enum Backend {
    Ready(ExecutionController),
    /// Credentials were missing or unusable at startup
    Unconfigured(String),
}

/// Bridges MCP tool calls onto the query execution core.
///
/// Built once per process and shared by every invocation. When credentials
/// are unavailable the adapter still answers `tools/list`, and every
/// `execute_query` call fails with a configuration error before any network
/// activity.
pub struct ToolInvocationAdapter {
    backend: Backend,
}

impl ToolInvocationAdapter {
    pub fn new(controller: ExecutionController) -> Self {
        Self {
            backend: Backend::Ready(controller),
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unconfigured(reason.into()),
        }
    }

    /// Build from the outcome of credential loading
    pub fn from_credentials(
        credentials: Result<Credentials>,
        policy: PollPolicy,
        request_timeout: Duration,
    ) -> Self {
        let controller = credentials.and_then(|creds| {
            ExecutionController::with_request_timeout(&creds, policy, request_timeout)
        });

        match controller {
            Ok(controller) => Self::new(controller),
            Err(err) => {
                tracing::warn!(error = %err, "Redash credentials unavailable; queries will be refused");
                Self::unconfigured(config_reason(err))
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        vec![execute_query_tool()]
    }

    /// Handle one `tools/call` request
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let span = tracing::info_span!(
            "call_tool",
            tool = %name,
            invocation_id = %Uuid::new_v4()
        );

        async {
            let result = self.invoke(name, arguments.as_ref()).await;
            match result {
                Ok(data) => match serde_json::to_string(&data) {
                    Ok(text) => {
                        tracing::info!(bytes = text.len(), "Tool call succeeded");
                        Ok(CallToolResult::success(vec![Content::text(text)]))
                    }
                    Err(e) => Err(to_mcp_error(&QueryError::Internal(format!(
                        "Failed to serialize result: {}",
                        e
                    )))),
                },
                Err(err) => {
                    tracing::warn!(kind = %err.kind(), error = %err, "Tool call failed");
                    Err(to_mcp_error(&err))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Protocol-agnostic part of `call_tool`
    pub async fn invoke(&self, name: &str, arguments: Option<&JsonObject>) -> Result<ResultSet> {
        if name != EXECUTE_QUERY {
            return Err(QueryError::UnknownTool(name.to_string()));
        }

        let controller = match &self.backend {
            Backend::Ready(controller) => controller,
            Backend::Unconfigured(reason) => {
                return Err(QueryError::Configuration(reason.clone()))
            }
        };

        let request = parse_execute_query_args(arguments)?;
        controller.execute(&request).await
    }
}

fn config_reason(err: QueryError) -> String {
    match err {
        QueryError::Configuration(reason) => reason,
        other => other.to_string(),
    }
}
