//! Metadata extraction from a parsed HTML document.

use scraper::{ElementRef, Html, Selector};
use subdex_core::PageMetadata;
use subdex_core::host::non_empty;

use super::MetadataExtractor;

/// Value of attribute `name` compared case-insensitively to `expected`.
fn attr_is(element: &ElementRef<'_>, name: &str, expected: &str) -> bool {
    element
        .value()
        .attr(name)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

/// `scraper`-backed extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomExtractor;

impl DomExtractor {
    fn meta_content(document: &Html, key: &str, value: &str) -> Option<String> {
        let selector = Selector::parse("meta[content]").expect("invalid selector");
        document
            .select(&selector)
            .filter(|el| attr_is(el, key, value))
            .find_map(|el| el.value().attr("content").and_then(non_empty))
    }
}

impl MetadataExtractor for DomExtractor {
    fn extract(&self, html: &str) -> PageMetadata {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("title").expect("invalid selector");

        let title = document
            .select(&title_selector)
            .next()
            .and_then(|el| non_empty(&el.text().collect::<String>()));

        let description = Self::meta_content(&document, "name", "description")
            .or_else(|| Self::meta_content(&document, "property", "og:description"));

        PageMetadata { title, description }
    }

    fn icon_href(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("link[rel][href]").expect("invalid selector");

        document
            .select(&selector)
            .filter(|el| {
                el.value()
                    .attr("rel")
                    .is_some_and(|rel| rel.to_ascii_lowercase().contains("icon"))
            })
            .find_map(|el| el.value().attr("href").and_then(non_empty))
    }
}
