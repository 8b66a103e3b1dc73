//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SUBDEX_*)
//! 2. TOML config file (if SUBDEX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::host::{Host, normalize_domain};

mod validation;

pub use validation::ConfigError;

/// Which metadata extractor implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Regex heuristics over the raw markup.
    #[default]
    Pattern,
    /// Full HTML parse with CSS selectors.
    Dom,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SUBDEX_*)
/// 2. TOML config file (if SUBDEX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root domain whose subdomains are listed.
    ///
    /// Set via SUBDEX_DOMAIN_NAME environment variable. Required.
    #[serde(default)]
    pub domain_name: Option<String>,

    /// Host serving the listing page; never scraped over the network.
    ///
    /// Set via SUBDEX_HOST_NAME environment variable.
    #[serde(default = "default_host_name")]
    pub host_name: String,

    /// Primary cache directory, relative to the working directory.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Cache file name, shared by the primary and the temp-dir fallback.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Collection template (`{{ PROJECTS_LIST }}`, `{{ CURRENT_YEAR }}`).
    #[serde(default = "default_collection_template")]
    pub collection_template: PathBuf,

    /// Item template (`{{ TITLE }}`, `{{ URL }}`, `{{ DESCRIPTION }}`, `{{ IMAGE }}`).
    #[serde(default = "default_item_template")]
    pub item_template: PathBuf,

    /// Local page the serving host's own title and description are read from.
    #[serde(default = "default_self_template")]
    pub self_template: PathBuf,

    /// Image used for hosts without a resolvable icon.
    #[serde(default = "default_icon")]
    pub default_icon: String,

    /// Description used for hosts without one.
    #[serde(default = "default_no_description")]
    pub no_description: String,

    /// Certificate transparency aggregator base URL.
    #[serde(default = "default_ct_base_url")]
    pub ct_base_url: String,

    /// User-Agent string for outbound requests.
    ///
    /// Set via SUBDEX_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// CT query timeout in milliseconds.
    #[serde(default = "default_ct_timeout_ms")]
    pub ct_timeout_ms: u64,

    /// Per-host DNS timeout in milliseconds.
    #[serde(default = "default_dns_timeout_ms")]
    pub dns_timeout_ms: u64,

    /// Per-request scrape timeout in milliseconds.
    #[serde(default = "default_scrape_timeout_ms")]
    pub scrape_timeout_ms: u64,

    /// Maximum homepage body size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// In-flight cap for each fan-out stage.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Metadata extractor implementation.
    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Scheduled regeneration period in seconds, 0 disables it.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Build the page once right after startup.
    #[serde(default)]
    pub refresh_on_start: bool,
}

fn default_host_name() -> String {
    "localhost".into()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_cache_file() -> String {
    "index.html".into()
}

fn default_collection_template() -> PathBuf {
    PathBuf::from("public/templates/index.html")
}

fn default_item_template() -> PathBuf {
    PathBuf::from("public/templates/project.html")
}

fn default_self_template() -> PathBuf {
    PathBuf::from("public/index.html")
}

fn default_icon() -> String {
    "../icons/logo_192.png".into()
}

fn default_no_description() -> String {
    "Aucune description disponible.".into()
}

fn default_ct_base_url() -> String {
    "https://crt.sh".into()
}

fn default_user_agent() -> String {
    "subdex/0.1".into()
}

fn default_ct_timeout_ms() -> u64 {
    20_000
}

fn default_dns_timeout_ms() -> u64 {
    1_500
}

fn default_scrape_timeout_ms() -> u64 {
    6_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_concurrency() -> usize {
    16
}

fn default_refresh_interval_secs() -> u64 {
    3_600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            domain_name: None,
            host_name: default_host_name(),
            cache_dir: default_cache_dir(),
            cache_file: default_cache_file(),
            collection_template: default_collection_template(),
            item_template: default_item_template(),
            self_template: default_self_template(),
            default_icon: default_icon(),
            no_description: default_no_description(),
            ct_base_url: default_ct_base_url(),
            user_agent: default_user_agent(),
            ct_timeout_ms: default_ct_timeout_ms(),
            dns_timeout_ms: default_dns_timeout_ms(),
            scrape_timeout_ms: default_scrape_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_concurrency: default_max_concurrency(),
            extractor: ExtractorKind::default(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_on_start: false,
        }
    }
}

/// Immutable settings threaded through every pipeline call.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub domain: String,
    pub serving_host: Host,
    pub cache_dir: PathBuf,
    pub cache_file: String,
    pub collection_template: PathBuf,
    pub item_template: PathBuf,
    pub self_template: PathBuf,
    pub default_icon: String,
    pub no_description: String,
    pub ct_base_url: String,
    pub user_agent: String,
    pub ct_timeout: Duration,
    pub dns_timeout: Duration,
    pub scrape_timeout: Duration,
    pub max_bytes: usize,
    pub max_concurrency: usize,
    pub extractor: ExtractorKind,
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SUBDEX_`
    /// 2. TOML file from `SUBDEX_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SUBDEX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SUBDEX_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The root domain, normalized.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no domain is configured.
    pub fn require_domain(&self) -> Result<String, ConfigError> {
        self.domain_name
            .as_deref()
            .map(normalize_domain)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "domain_name".into(),
                hint: "Set SUBDEX_DOMAIN_NAME environment variable".into(),
            })
    }

    /// Scheduled regeneration period, `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    /// Derive the immutable pipeline settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the domain is missing or the serving host is invalid.
    pub fn pipeline(&self) -> Result<PipelineConfig, ConfigError> {
        let domain = self.require_domain()?;
        let serving_host = Host::parse(&self.host_name)
            .map_err(|e| ConfigError::Invalid { field: "host_name".into(), reason: e.to_string() })?;

        Ok(PipelineConfig {
            domain,
            serving_host,
            cache_dir: self.cache_dir.clone(),
            cache_file: self.cache_file.clone(),
            collection_template: self.collection_template.clone(),
            item_template: self.item_template.clone(),
            self_template: self.self_template.clone(),
            default_icon: self.default_icon.clone(),
            no_description: self.no_description.clone(),
            ct_base_url: self.ct_base_url.trim_end_matches('/').to_string(),
            user_agent: self.user_agent.clone(),
            ct_timeout: Duration::from_millis(self.ct_timeout_ms),
            dns_timeout: Duration::from_millis(self.dns_timeout_ms),
            scrape_timeout: Duration::from_millis(self.scrape_timeout_ms),
            max_bytes: self.max_bytes,
            max_concurrency: self.max_concurrency,
            extractor: self.extractor,
        })
    }
}

impl PipelineConfig {
    /// Settings for `domain` with every other field at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `domain` is empty.
    pub fn for_domain(domain: &str) -> Result<Self, ConfigError> {
        AppConfig { domain_name: Some(domain.to_string()), ..Default::default() }.pipeline()
    }
}
