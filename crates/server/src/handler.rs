//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::hosts::{HostsParams, list_impl, page_impl, regenerate_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use subdex_client::Pipeline;

/// The main MCP server handler for subdex.
#[derive(Clone)]
pub struct HostsServer {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<Pipeline>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HostsServer {
    /// Create a new server handler over a shared pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { tool_router: Self::tool_router(), pipeline }
    }

    /// List live subdomains with their scraped metadata.
    #[tool(
        description = "List live subdomains of the configured domain found in certificate transparency logs, with title, description and icon. Any other domain is rejected. Slow: resolves DNS and scrapes every host."
    )]
    async fn hosts_list(&self, params: Parameters<HostsParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.pipeline, params.0).await
    }

    /// Return the rendered listing page.
    #[tool(description = "Get the rendered HTML listing page. Served from cache; built on first use.")]
    async fn hosts_page(&self) -> Result<CallToolResult, McpError> {
        page_impl(&self.pipeline).await
    }

    /// Rebuild the listing page.
    #[tool(description = "Rebuild the HTML listing page now and overwrite the cached copy. Returns size, location and listed hosts.")]
    async fn hosts_regenerate(&self) -> Result<CallToolResult, McpError> {
        regenerate_impl(&self.pipeline).await
    }
}

impl ServerHandler for HostsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "subdex".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
