//! Per-host metadata scraping.
//!
//! ### Algorithm
//! 1. Fetch `https://<host>/`, then `http://<host>/` if that fails.
//! 2. Extract title and description from the first page retrieved.
//! 3. Resolve the declared icon against the requested homepage URL, or
//!    look for `/favicon.ico` over HTTPS then HTTP. Icons stay on the scraped
//!    host even when the homepage redirected elsewhere.
//!
//! Every failure degrades the host's record to "no metadata". Nothing here
//! returns an error.

pub mod local;

pub use local::{self_metadata, self_record};

use std::sync::Arc;

use async_trait::async_trait;
use subdex_core::{Error, Host, HostRecord, PipelineConfig};

use crate::extract::{MetadataExtractor, extractor_for, resolve_icon_href};
use crate::fetch::{FetchClient, FetchConfig, FetchResponse, Scheme, favicon, homepage};

/// Metadata scraping seam used by the pipeline.
#[async_trait]
pub trait HostScraper: Send + Sync {
    /// Record for `host`, with absent fields where scraping failed.
    async fn scrape(&self, host: &Host) -> HostRecord;
}

/// Scrapes hosts over HTTP(S).
#[derive(Clone)]
pub struct HttpScraper {
    fetch: FetchClient,
    extractor: Arc<dyn MetadataExtractor>,
}

impl HttpScraper {
    pub fn new(fetch: FetchClient, extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self { fetch, extractor }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, Error> {
        let fetch = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self::new(fetch, extractor_for(config.extractor)))
    }

    /// First homepage that answers, HTTPS first.
    async fn fetch_homepage(&self, host: &Host) -> Option<FetchResponse> {
        for scheme in Scheme::FALLBACK_ORDER {
            let url = match homepage(scheme, host.as_str()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!(host = %host, %scheme, error = %e, "unusable homepage URL");
                    continue;
                }
            };

            match self.fetch.fetch(&url).await {
                Ok(response) => return Some(response),
                Err(e) => tracing::debug!(host = %host, %scheme, error = %e, "homepage fetch failed"),
            }
        }

        None
    }

    /// `/favicon.ico` URL of the first scheme that serves one.
    async fn probe_favicon(&self, host: &Host) -> Option<String> {
        for scheme in Scheme::FALLBACK_ORDER {
            let Ok(url) = favicon(scheme, host.as_str()) else {
                continue;
            };
            if self.fetch.exists(&url).await {
                return Some(url.to_string());
            }
        }

        None
    }
}

#[async_trait]
impl HostScraper for HttpScraper {
    async fn scrape(&self, host: &Host) -> HostRecord {
        let Some(response) = self.fetch_homepage(host).await else {
            tracing::debug!(host = %host, "no homepage reachable");
            return HostRecord::bare(host.clone());
        };

        let html = response.text();
        let metadata = self.extractor.extract(&html);

        let icon = match self.extractor.icon_href(&html) {
            Some(href) => Some(resolve_icon_href(&href, &response.url)),
            None => self.probe_favicon(host).await,
        };

        tracing::debug!(
            host = %host,
            url = %response.final_url,
            fetch_ms = response.fetch_ms,
            has_title = metadata.title.is_some(),
            has_icon = icon.is_some(),
            "scraped host"
        );

        HostRecord::from_metadata(host.clone(), metadata, icon)
    }
}
