//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::path::Path;

use crate::config::AppConfig;
use crate::host::Host;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `domain_name` is unset, and
    /// `ConfigError::Invalid` if:
    /// - `domain_name` or `host_name` is not a valid host
    /// - any timeout is below 100ms or above 5 minutes
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `max_concurrency` is 0 or exceeds 256
    /// - `user_agent` is empty
    /// - `cache_file` is empty or not a bare file name
    pub fn validate(&self) -> Result<(), ConfigError> {
        let domain = self.require_domain()?;
        Host::parse(&domain).map_err(|e| invalid("domain_name", &e.to_string()))?;
        Host::parse(&self.host_name).map_err(|e| invalid("host_name", &e.to_string()))?;

        check_timeout("ct_timeout_ms", self.ct_timeout_ms)?;
        check_timeout("dns_timeout_ms", self.dns_timeout_ms)?;
        check_timeout("scrape_timeout_ms", self.scrape_timeout_ms)?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.max_concurrency == 0 {
            return Err(invalid("max_concurrency", "must be at least 1"));
        }
        if self.max_concurrency > 256 {
            return Err(invalid("max_concurrency", "must not exceed 256"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.cache_file.is_empty() {
            return Err(invalid("cache_file", "must not be empty"));
        }
        if Path::new(&self.cache_file).file_name().and_then(|n| n.to_str()) != Some(self.cache_file.as_str()) {
            return Err(invalid("cache_file", "must be a file name without directories"));
        }

        if self.refresh_on_start && self.refresh_interval_secs == 0 {
            tracing::warn!("refresh_on_start is set but the scheduler is disabled; it will be ignored");
        }

        Ok(())
    }
}
