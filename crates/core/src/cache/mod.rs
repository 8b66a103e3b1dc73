//! On-disk cache for the rendered listing page.
//!
//! The page lives at a primary path (`<cwd>/<cache_dir>/<cache_file>`) with a
//! fallback in the system temp directory (`<tmp>/<cache_file>`):
//!
//! - Reads prefer the primary path, then the fallback. Missing files and
//!   read errors both yield "no cache".
//! - Writes replace the whole file. A permission error on the primary path
//!   triggers exactly one retry at the fallback path; every other failure is
//!   returned to the caller.
//!
//! Overlapping writers are not serialized: the last write observed wins.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::config::PipelineConfig;

/// Where a page was read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CacheLocation {
    Primary,
    Fallback,
}

/// A cached page and the location it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub html: String,
    pub location: CacheLocation,
}

/// Primary and fallback locations of the cached page.
#[derive(Debug, Clone)]
pub struct PageCache {
    primary: PathBuf,
    fallback: PathBuf,
}

impl PageCache {
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self { primary: primary.into(), fallback: fallback.into() }
    }

    /// Paths derived from the configured directory and file name.
    ///
    /// A relative `cache_dir` resolves against the current working directory.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let dir = if config.cache_dir.is_absolute() {
            config.cache_dir.clone()
        } else {
            std::env::current_dir().unwrap_or_default().join(&config.cache_dir)
        };

        Self::new(dir.join(&config.cache_file), std::env::temp_dir().join(&config.cache_file))
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn fallback(&self) -> &Path {
        &self.fallback
    }

    pub fn path_of(&self, location: CacheLocation) -> &Path {
        match location {
            CacheLocation::Primary => &self.primary,
            CacheLocation::Fallback => &self.fallback,
        }
    }

    /// Read the cached page, primary first.
    pub async fn read(&self) -> Option<CachedPage> {
        for location in [CacheLocation::Primary, CacheLocation::Fallback] {
            let path = self.path_of(location);
            match tokio::fs::read_to_string(path).await {
                Ok(html) => {
                    tracing::debug!(path = %path.display(), ?location, "cache hit");
                    return Some(CachedPage { html, location });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable cache file, ignoring");
                }
            }
        }

        tracing::debug!("no cached page");
        None
    }

    /// Write `html`, replacing any previous content.
    ///
    /// Returns the location that was written.
    pub async fn write(&self, html: &str) -> Result<CacheLocation, Error> {
        self.write_with(html, write_page(&self.primary, html)).await
    }

    /// Settle a write given the outcome of the primary attempt.
    async fn write_with(
        &self, html: &str, primary_write: impl Future<Output = io::Result<()>>,
    ) -> Result<CacheLocation, Error> {
        match primary_write.await {
            Ok(()) => Ok(CacheLocation::Primary),
            Err(e) if should_fall_back(&e) => {
                tracing::warn!(
                    primary = %self.primary.display(),
                    fallback = %self.fallback.display(),
                    "permission denied on primary cache path, writing to fallback"
                );
                write_page(&self.fallback, html)
                    .await
                    .map_err(|source| Error::CacheWrite { path: self.fallback.clone(), source })?;
                Ok(CacheLocation::Fallback)
            }
            Err(source) => Err(Error::CacheWrite { path: self.primary.clone(), source }),
        }
    }
}

/// Only permission errors are retried at the fallback path.
pub fn should_fall_back(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

async fn write_page(path: &Path, html: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await
}
