use anyhow::Result;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorData, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;

use crate::adapter::ToolInvocationAdapter;

/// MCP server exposing the Redash query tool
#[derive(Clone)]
pub struct RedashMcpServer {
    adapter: Arc<ToolInvocationAdapter>,
}

impl RedashMcpServer {
    pub fn new(adapter: ToolInvocationAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }

    /// Serve over stdin/stdout until the host closes the stream
    pub async fn serve_stdio(self) -> Result<()> {
        let service = self.serve(rmcp::transport::stdio()).await?;
        tracing::info!("MCP server ready on stdio");

        let reason = service.waiting().await?;
        tracing::info!(reason = ?reason, "MCP session closed");
        Ok(())
    }
}

impl ServerHandler for RedashMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Runs saved Redash queries. Call execute_query with a query_id and optional params."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.adapter.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        self.adapter
            .call_tool(&request.name, request.arguments)
            .await
    }
}
