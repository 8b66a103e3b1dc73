//! Core types and shared functionality for subdex.
//!
//! This crate provides:
//! - Host names and host records
//! - Unified error types
//! - Configuration structures
//! - Listing page renderer
//! - On-disk page cache with temp-dir fallback

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod render;

pub use cache::{CacheLocation, CachedPage, PageCache};
pub use config::{AppConfig, ConfigError, ExtractorKind, PipelineConfig};
pub use error::Error;
pub use host::{Host, HostRecord, PageMetadata, normalize_domain};
pub use render::{PageRenderer, RenderDefaults};
