//! Certificate transparency lookup of candidate subdomains.
//!
//! ### Query
//! - `GET <base>/?q=%25.<domain>&output=json` with the configured User-Agent.
//! - The response is a JSON array of certificate entries.
//!
//! ### Name extraction
//! - Each entry carries `name_value` (falling back to `common_name`).
//! - One value may list several names separated by newlines.
//! - A leading `*.` is stripped and names are lowercased.
//! - Only the domain itself and its subdomains are kept, deduplicated.
//!
//! Any failure yields an empty candidate list.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Deserialize;
use subdex_core::{Error, Host, PipelineConfig};

/// One certificate entry from the aggregator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CtEntry {
    #[serde(default)]
    pub name_value: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
}

impl CtEntry {
    /// The raw, possibly multi-line, certificate name.
    fn names(&self) -> &str {
        self.name_value
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(self.common_name.as_deref())
            .unwrap_or("")
    }
}

/// Clean one certificate name, returning it only if it belongs to `domain`.
fn candidate(raw: &str, domain: &str) -> Option<Host> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix("*.").unwrap_or(trimmed);
    let host = Host::parse(name).ok()?;
    host.is_within(domain).then_some(host)
}

/// Deduplicated candidate hosts from parsed entries, in first-seen order.
pub fn candidates(entries: &[CtEntry], domain: &str) -> Vec<Host> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .flat_map(|entry| entry.names().split('\n'))
        .filter_map(|name| candidate(name, domain))
        .filter(|host| seen.insert(host.clone()))
        .collect()
}

/// Parse a raw aggregator response.
pub fn parse_response(body: &[u8], domain: &str) -> Result<Vec<Host>, serde_json::Error> {
    let entries: Vec<CtEntry> = serde_json::from_slice(body)?;
    Ok(candidates(&entries, domain))
}

/// Client for the certificate transparency aggregator.
#[derive(Debug, Clone)]
pub struct CtClient {
    http: reqwest::Client,
    base_url: String,
}

impl CtClient {
    /// Create a new CT client.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, Error> {
        Self::new(&config.ct_base_url, &config.user_agent, config.ct_timeout)
    }

    /// The query URL for `domain`.
    pub fn query_url(&self, domain: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(domain.as_bytes()).collect();
        format!("{}/?q=%25.{}&output=json", self.base_url, encoded)
    }

    /// Candidate subdomains of `domain` seen in certificate logs.
    ///
    /// Never fails: network and parse errors are logged and yield an empty list.
    pub async fn query(&self, domain: &str) -> Vec<Host> {
        match self.try_query(domain).await {
            Ok(hosts) => hosts,
            Err(e) => {
                tracing::warn!(domain, error = %e, "certificate transparency query failed");
                Vec::new()
            }
        }
    }

    async fn try_query(&self, domain: &str) -> Result<Vec<Host>, Error> {
        let start = Instant::now();
        let url = self.query_url(domain);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { Error::FetchTimeout(e.to_string()) } else { Error::HttpError(e.to_string()) }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        let hosts = parse_response(&body, domain).map_err(|e| Error::HttpError(format!("invalid JSON: {}", e)))?;

        tracing::info!(
            domain,
            candidates = hosts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "certificate transparency query completed"
        );

        Ok(hosts)
    }
}
