//! hosts_page tool implementation.
//!
//! Returns the cached listing page, building it first on a cache miss.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use subdex_client::Pipeline;

use super::text_result;

/// Implementation of the hosts_page tool.
pub async fn page_impl(pipeline: &Pipeline) -> Result<CallToolResult, McpError> {
    let config = pipeline.config();
    let page = pipeline.get_page(&config.domain, &config.serving_host).await?;

    tracing::debug!(location = ?page.location, bytes = page.html.len(), "serving hosts page");

    Ok(text_result(page.html))
}
