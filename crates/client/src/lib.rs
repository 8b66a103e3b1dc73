//! Outbound side of subdex.
//!
//! Certificate transparency lookup, DNS liveness probing, homepage scraping
//! and the pipeline that ties them to the renderer and the page cache.

pub mod batch;
pub mod ct;
pub mod dns;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod scrape;

pub use batch::join_bounded;
pub use ct::CtClient;
pub use dns::{HostResolver, LivenessProber, SystemResolver};
pub use extract::{DomExtractor, MetadataExtractor, PatternExtractor, extractor_for, resolve_icon_href};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use pipeline::{BuiltPage, Pipeline};
pub use scrape::{HostScraper, HttpScraper};
