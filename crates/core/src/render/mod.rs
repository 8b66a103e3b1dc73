//! Listing page rendering by literal placeholder substitution.
//!
//! Templates are plain UTF-8 files. A placeholder is a marker name framed by
//! double braces with optional inner whitespace (`{{TITLE}}`, `{{ TITLE }}`).
//! Nothing else in the template is interpreted, and substituted values are
//! inserted verbatim.

use std::path::Path;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::{Error, HostRecord, PipelineConfig};

/// Collection template marker for the rendered item list.
pub const PROJECTS_LIST: &str = "PROJECTS_LIST";
/// Collection template marker for the current year.
pub const CURRENT_YEAR: &str = "CURRENT_YEAR";
/// Item template markers.
pub const TITLE: &str = "TITLE";
pub const URL: &str = "URL";
pub const DESCRIPTION: &str = "DESCRIPTION";
pub const IMAGE: &str = "IMAGE";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z_]+)\s*\}\}").expect("placeholder pattern is valid"));

/// Replace the named markers in one pass over `template`.
///
/// Unknown markers are left as they are. Values are never expanded, so a
/// `$` or `{{` inside a value is copied as is.
pub fn substitute_all(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fallback values for records missing metadata.
#[derive(Debug, Clone)]
pub struct RenderDefaults {
    pub no_description: String,
    pub default_icon: String,
}

impl From<&PipelineConfig> for RenderDefaults {
    fn from(config: &PipelineConfig) -> Self {
        Self { no_description: config.no_description.clone(), default_icon: config.default_icon.clone() }
    }
}

/// The two loaded templates plus fallback values.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    collection: String,
    item: String,
    defaults: RenderDefaults,
}

impl PageRenderer {
    pub fn new(collection: impl Into<String>, item: impl Into<String>, defaults: RenderDefaults) -> Self {
        Self { collection: collection.into(), item: item.into(), defaults }
    }

    /// Read both templates from disk.
    pub async fn load(collection: &Path, item: &Path, defaults: RenderDefaults) -> Result<Self, Error> {
        let collection = read_template(collection).await?;
        let item = read_template(item).await?;
        Ok(Self::new(collection, item, defaults))
    }

    /// Read the templates named by `config`.
    pub async fn from_config(config: &PipelineConfig) -> Result<Self, Error> {
        Self::load(&config.collection_template, &config.item_template, config.into()).await
    }

    /// Render one item from a record.
    ///
    /// Values are inserted as raw markup with no escaping. Scraped titles and
    /// descriptions come from third-party pages, so templates must only place
    /// them where markup from those hosts is acceptable.
    pub fn render_item(&self, record: &HostRecord) -> String {
        let url = format!("https://{}", record.host);
        let title = record.name.as_deref().unwrap_or(record.host.as_str());
        let description = record.description.as_deref().unwrap_or(&self.defaults.no_description);
        let image = record.icon.as_deref().unwrap_or(&self.defaults.default_icon);

        substitute_all(&self.item, &[(TITLE, title), (URL, &url), (DESCRIPTION, description), (IMAGE, image)])
    }

    /// Render the full page for already sorted `records`.
    ///
    /// Output depends only on the templates, the records and `year`.
    pub fn render(&self, records: &[HostRecord], year: i32) -> String {
        let items = records.iter().map(|r| self.render_item(r)).collect::<Vec<_>>().join("\n");
        let year = year.to_string();

        substitute_all(&self.collection, &[(PROJECTS_LIST, &items), (CURRENT_YEAR, &year)])
    }

    /// Render with the current UTC year.
    pub fn render_now(&self, records: &[HostRecord]) -> String {
        self.render(records, chrono::Utc::now().year())
    }
}

async fn read_template(path: &Path) -> Result<String, Error> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Template { path: path.to_path_buf(), source })
}
