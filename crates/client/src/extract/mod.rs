//! Best-effort page metadata extraction.
//!
//! Provides a stable extraction abstraction that can be swapped later.
//!
//! ### Extracted fields
//! - Title: content of the first `<title>` element.
//! - Description: `meta[name=description]`, else `meta[property=og:description]`.
//! - Icon: `href` of the first `<link>` whose `rel` mentions `icon`.
//!
//! Values are trimmed; whitespace-only values count as absent.
//!
//! ### Implementations
//! - [`PatternExtractor`]: regex heuristics over raw markup. Lossy: it does
//!   not decode entities, and it can be fooled by markup inside comments or
//!   scripts. The first match wins.
//! - [`DomExtractor`]: full HTML parse with CSS selectors.

pub mod dom;
pub mod icon;

pub use dom::DomExtractor;
pub use icon::resolve_icon_href;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use subdex_core::host::non_empty;
use subdex_core::{ExtractorKind, PageMetadata};

/// Stable extractor trait for page metadata.
pub trait MetadataExtractor: Send + Sync {
    /// Title and description of a page.
    fn extract(&self, html: &str) -> PageMetadata;

    /// Raw `href` of the page's declared icon, unresolved.
    fn icon_href(&self, html: &str) -> Option<String>;
}

/// Build the extractor selected in configuration.
pub fn extractor_for(kind: ExtractorKind) -> Arc<dyn MetadataExtractor> {
    match kind {
        ExtractorKind::Pattern => Arc::new(PatternExtractor),
        ExtractorKind::Dom => Arc::new(DomExtractor),
    }
}

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("invalid title pattern"));
static META_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("invalid meta pattern"));
static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("invalid link pattern"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("invalid attribute pattern")
});

/// Value of attribute `name` (case-insensitive) within one tag.
fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE.captures_iter(tag).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)).map(|m| m.as_str())
    })
}

/// `content` of the first meta tag whose `key` attribute equals `value`.
fn meta_content(html: &str, key: &str, value: &str) -> Option<String> {
    META_TAG
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|tag| attr(tag, key).is_some_and(|v| v.trim().eq_ignore_ascii_case(value)))
        .find_map(|tag| attr(tag, "content").and_then(non_empty))
}

/// Regex-based heuristic extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl MetadataExtractor for PatternExtractor {
    fn extract(&self, html: &str) -> PageMetadata {
        let title = TITLE.captures(html).and_then(|caps| non_empty(&caps[1]));
        let description =
            meta_content(html, "name", "description").or_else(|| meta_content(html, "property", "og:description"));

        PageMetadata { title, description }
    }

    fn icon_href(&self, html: &str) -> Option<String> {
        LINK_TAG
            .find_iter(html)
            .map(|m| m.as_str())
            .filter(|tag| attr(tag, "rel").is_some_and(|rel| rel.to_ascii_lowercase().contains("icon")))
            .find_map(|tag| attr(tag, "href").and_then(non_empty))
    }
}
