//! hosts_list tool implementation.
//!
//! Runs discovery, liveness and scraping, returning the listed records.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use subdex_client::Pipeline;
use subdex_core::Error;

use super::{HostsParams, text_result};

/// Implementation of the hosts_list tool.
pub async fn list_impl(pipeline: &Pipeline, params: HostsParams) -> Result<CallToolResult, McpError> {
    let domain = params.domain(pipeline)?;
    let records = pipeline.list(domain, &pipeline.config().serving_host).await?;

    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize hosts: {e}")))?;

    Ok(text_result(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::hosts::testing;
    use subdex_core::HostRecord;

    #[tokio::test]
    async fn test_list_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _ct) = testing::empty_pipeline(&dir, "list").await;

        let result = list_impl(&pipeline, HostsParams::default()).await.unwrap();
        let records: Vec<HostRecord> = serde_json::from_str(&testing::text(&result)).unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_other_domain() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, ct) = testing::empty_pipeline(&dir, "list-other").await;

        let params = HostsParams { domain: Some("other.org".into()) };
        let err = list_impl(&pipeline, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("example.com"));
        assert!(ct.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_accepts_configured_domain() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _ct) = testing::empty_pipeline(&dir, "list-configured").await;

        let params = HostsParams { domain: Some("EXAMPLE.com.".into()) };
        let result = list_impl(&pipeline, params).await.unwrap();
        assert_eq!(testing::text(&result), "[]");
    }
}
