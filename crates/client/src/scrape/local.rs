//! Metadata of the serving host, read from its own page on disk.

use std::path::Path;

use subdex_core::{Host, HostRecord, PageMetadata};

use crate::extract::MetadataExtractor;

/// Title and description declared by the local page at `path`.
///
/// An unreadable file yields empty metadata.
pub async fn self_metadata(path: &Path, extractor: &dyn MetadataExtractor) -> PageMetadata {
    match tokio::fs::read_to_string(path).await {
        Ok(html) => extractor.extract(&html),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "self template unreadable");
            PageMetadata::default()
        }
    }
}

/// Record for the serving host built from its local page.
pub async fn self_record(host: &Host, path: &Path, extractor: &dyn MetadataExtractor) -> HostRecord {
    HostRecord::from_metadata(host.clone(), self_metadata(path, extractor).await, None)
}
