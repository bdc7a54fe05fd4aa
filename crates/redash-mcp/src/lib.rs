pub mod adapter;
pub mod error;
pub mod server;
pub mod tool;

pub use adapter::ToolInvocationAdapter;
pub use error::{error_code, to_mcp_error};
pub use server::RedashMcpServer;
pub use tool::{execute_query_tool, EXECUTE_QUERY};
