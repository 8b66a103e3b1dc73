//! hosts_regenerate tool implementation.
//!
//! Forces a full rebuild of the listing page, replacing the cached copy.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use subdex_client::Pipeline;
use subdex_core::{CacheLocation, Error};

use super::text_result;

/// Output from the hosts_regenerate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegenerateOutput {
    /// Size of the rendered page in bytes.
    pub bytes: usize,
    /// Where the page was written.
    pub location: CacheLocation,
    /// Listed hosts, in page order.
    pub hosts: Vec<String>,
}

/// Implementation of the hosts_regenerate tool.
pub async fn regenerate_impl(pipeline: &Pipeline) -> Result<CallToolResult, McpError> {
    let config = pipeline.config();
    let built = pipeline.build_page(&config.domain, &config.serving_host).await?;

    let output = RegenerateOutput {
        bytes: built.html.len(),
        location: built.location,
        hosts: built.hosts.iter().map(|r| r.host.to_string()).collect(),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(text_result(json))
}
