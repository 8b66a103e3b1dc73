//! Host listing MCP tools.
//!
//! One root domain is served, so the page tools take no arguments and
//! hosts_list only accepts the configured domain. The serving host always
//! comes from configuration.

pub mod list;
pub mod page;
pub mod regenerate;

pub use list::list_impl;
pub use page::page_impl;
pub use regenerate::regenerate_impl;

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use subdex_client::Pipeline;
use subdex_core::{Error, normalize_domain};

/// Parameters for hosts_list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HostsParams {
    /// Root domain to enumerate. Must match the configured domain when given.
    #[serde(default)]
    pub domain: Option<String>,
}

impl HostsParams {
    /// The configured domain, if the request names it or names nothing.
    ///
    /// Case and a trailing dot are ignored when comparing.
    pub fn domain<'a>(&self, pipeline: &'a Pipeline) -> Result<&'a str, Error> {
        let configured = pipeline.config().domain.as_str();
        match self.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => Ok(configured),
            Some(requested) if normalize_domain(requested) == normalize_domain(configured) => Ok(configured),
            Some(requested) => Err(Error::InvalidInput(format!(
                "domain {requested:?} is not served; this server lists {configured}"
            ))),
        }
    }
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}
