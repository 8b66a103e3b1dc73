//! The listing pipeline: discovery, liveness, scraping, rendering, caching.
//!
//! ```text
//! CT query -> liveness (bounded fan-out) -> drop root/www
//!          -> scrape (bounded fan-out, serving host excluded) + self metadata
//!          -> keep records with a name or description -> sort by host
//!          -> render -> cache
//! ```
//!
//! Per-host failures never abort a run. The only fatal errors are invalid
//! input, unreadable templates and cache write failures; they surface as a
//! single [`Error::Pipeline`] naming the failed operation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use subdex_core::{CacheLocation, CachedPage, Error, Host, HostRecord, PageCache, PageRenderer, PipelineConfig};

use crate::batch::join_bounded;
use crate::ct::CtClient;
use crate::dns::{HostResolver, LivenessProber, SystemResolver};
use crate::extract::{MetadataExtractor, extractor_for};
use crate::fetch::{FetchClient, FetchConfig};
use crate::scrape::{HostScraper, HttpScraper, self_record};

const LIST_FAILED: &str = "Failed to list hosts";
const GET_PAGE_FAILED: &str = "Failed to get hosts page";
const BUILD_PAGE_FAILED: &str = "Failed to build hosts page";

/// A freshly rendered and persisted page.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltPage {
    pub html: String,
    pub location: CacheLocation,
    pub hosts: Vec<HostRecord>,
}

/// Orchestrates every stage for one configuration.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    ct: CtClient,
    prober: LivenessProber,
    scraper: Arc<dyn HostScraper>,
    extractor: Arc<dyn MetadataExtractor>,
    cache: PageCache,
}

impl Pipeline {
    /// Build the pipeline with the system resolver and an HTTP scraper.
    pub fn new(config: PipelineConfig) -> Result<Self, Error> {
        let extractor = extractor_for(config.extractor);
        let fetch = FetchClient::new(FetchConfig::from(&config))?;

        Ok(Self {
            ct: CtClient::from_config(&config)?,
            prober: LivenessProber::new(Arc::new(SystemResolver), config.dns_timeout, config.max_concurrency),
            scraper: Arc::new(HttpScraper::new(fetch, extractor.clone())),
            extractor,
            cache: PageCache::from_config(&config),
            config,
        })
    }

    /// Replace the DNS resolver used for liveness probing.
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.prober = LivenessProber::new(resolver, self.config.dns_timeout, self.config.max_concurrency);
        self
    }

    /// Replace the metadata scraper.
    pub fn with_scraper(mut self, scraper: Arc<dyn HostScraper>) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Live, described hosts of `domain`, sorted by host.
    pub async fn list(&self, domain: &str, serving_host: &Host) -> Result<Vec<HostRecord>, Error> {
        self.collect(domain, serving_host).await.map_err(|e| e.at_boundary(LIST_FAILED))
    }

    /// The cached page, or a freshly built one when nothing is cached.
    pub async fn get_page(&self, domain: &str, serving_host: &Host) -> Result<CachedPage, Error> {
        if let Some(page) = self.cache.read().await {
            return Ok(page);
        }

        tracing::info!(domain, "no cached page, building");
        let built = self.build(domain, serving_host).await.map_err(|e| e.at_boundary(GET_PAGE_FAILED))?;
        Ok(CachedPage { html: built.html, location: built.location })
    }

    /// Run the whole pipeline, render and persist the page.
    pub async fn build_page(&self, domain: &str, serving_host: &Host) -> Result<BuiltPage, Error> {
        self.build(domain, serving_host).await.map_err(|e| e.at_boundary(BUILD_PAGE_FAILED))
    }

    async fn build(&self, domain: &str, serving_host: &Host) -> Result<BuiltPage, Error> {
        let start = Instant::now();
        let hosts = self.collect(domain, serving_host).await?;

        let renderer = PageRenderer::from_config(&self.config).await?;
        let html = renderer.render_now(&hosts);
        let location = self.cache.write(&html).await?;

        tracing::info!(
            domain,
            hosts = hosts.len(),
            bytes = html.len(),
            ?location,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "hosts page built"
        );

        Ok(BuiltPage { html, location, hosts })
    }

    async fn collect(&self, domain: &str, serving_host: &Host) -> Result<Vec<HostRecord>, Error> {
        let start = Instant::now();
        let domain = Host::parse(domain)?;
        let root = domain.as_str();

        let candidates = self.ct.query(root).await;
        let live = self.prober.live_hosts(candidates).await;

        let listed: Vec<Host> = live
            .into_iter()
            .filter(|host| host.as_str() != root && !host.as_str().starts_with("www."))
            .collect();

        let (serving, others): (Vec<Host>, Vec<Host>) = listed.into_iter().partition(|host| host == serving_host);

        let mut records = join_bounded(others, self.config.max_concurrency, |host| {
            let scraper = self.scraper.clone();
            async move { scraper.scrape(&host).await }
        })
        .await;

        if !serving.is_empty() {
            records.push(self_record(serving_host, &self.config.self_template, self.extractor.as_ref()).await);
        }

        let scraped = records.len();
        records.retain(HostRecord::is_listable);
        records.sort_by(|a, b| a.host.as_str().cmp(b.host.as_str()));

        tracing::info!(
            domain = root,
            scraped,
            listed = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "hosts collected"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, query_param},
    };

    const COLLECTION: &str = "<ul>\n{{ PROJECTS_LIST }}\n</ul><footer>{{ CURRENT_YEAR }}</footer>";
    const ITEM: &str = r#"<li><a href="{{URL}}">{{TITLE}}</a> {{DESCRIPTION}} <img src="{{IMAGE}}"></li>"#;
    const SELF_PAGE: &str = r#"<title>Home</title><meta name="description" content="The index">"#;

    struct Resolves(HashSet<String>);

    #[async_trait]
    impl HostResolver for Resolves {
        async fn resolves(&self, host: &str) -> bool {
            self.0.contains(host)
        }
    }

    fn resolves(hosts: &[&str]) -> Arc<Resolves> {
        Arc::new(Resolves(hosts.iter().map(|h| h.to_string()).collect()))
    }

    /// Scraper answering from a table and recording every host it is asked for.
    #[derive(Default)]
    struct TableScraper {
        records: HashMap<String, HostRecord>,
        asked: Mutex<Vec<String>>,
    }

    impl TableScraper {
        fn with(records: Vec<HostRecord>) -> Self {
            Self {
                records: records.into_iter().map(|r| (r.host.to_string(), r)).collect(),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HostScraper for TableScraper {
        async fn scrape(&self, host: &Host) -> HostRecord {
            self.asked.lock().unwrap().push(host.to_string());
            self.records.get(host.as_str()).cloned().unwrap_or_else(|| HostRecord::bare(host.clone()))
        }
    }

    fn named(host: &str, name: &str) -> HostRecord {
        HostRecord { name: Some(name.to_string()), ..HostRecord::bare(Host::parse(host).unwrap()) }
    }

    fn ct_body(names: &[&str]) -> serde_json::Value {
        serde_json::Value::Array(names.iter().map(|n| serde_json::json!({ "name_value": n })).collect())
    }

    async fn ct_server(domain: &str, names: &[&str]) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", format!("%.{domain}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(names)))
            .mount(&server)
            .await;
        server
    }

    fn write_templates(dir: &Path) {
        std::fs::create_dir_all(dir.join("templates")).unwrap();
        std::fs::write(dir.join("templates/index.html"), COLLECTION).unwrap();
        std::fs::write(dir.join("templates/project.html"), ITEM).unwrap();
        std::fs::write(dir.join("index.html"), SELF_PAGE).unwrap();
    }

    fn config(dir: &TempDir, ct: &MockServer, serving: &str) -> PipelineConfig {
        let mut config = PipelineConfig::for_domain("example.com").unwrap();
        config.serving_host = Host::parse(serving).unwrap();
        config.ct_base_url = ct.uri();
        config.cache_dir = dir.path().join("cache");
        config.cache_file = format!("subdex-test-{}.html", std::process::id());
        config.collection_template = dir.path().join("templates/index.html");
        config.item_template = dir.path().join("templates/project.html");
        config.self_template = dir.path().join("index.html");
        config
    }

    fn pipeline(config: PipelineConfig, live: &[&str], scraper: Arc<TableScraper>) -> Pipeline {
        Pipeline::new(config).unwrap().with_resolver(resolves(live)).with_scraper(scraper)
    }

    fn hosts(records: &[HostRecord]) -> Vec<&str> {
        records.iter().map(|r| r.host.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_keeps_only_live_subdomains() {
        let dir = tempfile::tempdir().unwrap();
        let ct = ct_server("example.com", &["*.example.com", "api.example.com", "www.example.com", "example.com"]).await;
        let scraper = Arc::new(TableScraper::with(vec![named("api.example.com", "API")]));
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &["api.example.com"], scraper.clone());

        let serving = Host::parse("localhost").unwrap();
        let records = pipeline.list("example.com", &serving).await.unwrap();

        assert_eq!(hosts(&records), vec!["api.example.com"]);
        assert_eq!(*scraper.asked.lock().unwrap(), vec!["api.example.com"]);
    }

    #[tokio::test]
    async fn test_list_drops_root_www_and_undescribed() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["example.com", "www.example.com", "blog.example.com", "api.example.com", "bare.example.com"];
        let ct = ct_server("example.com", &names).await;
        let scraper = Arc::new(TableScraper::with(vec![
            named("blog.example.com", "Blog"),
            HostRecord {
                description: Some("Endpoints".into()),
                ..HostRecord::bare(Host::parse("api.example.com").unwrap())
            },
            named("www.example.com", "WWW"),
        ]));
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &names, scraper.clone());

        let records = pipeline.list("Example.COM.", &Host::parse("localhost").unwrap()).await.unwrap();

        assert_eq!(hosts(&records), vec!["api.example.com", "blog.example.com"]);
        assert_eq!(records[0].name, None);

        let mut asked = scraper.asked.lock().unwrap().clone();
        asked.sort();
        assert_eq!(asked, vec!["api.example.com", "bare.example.com", "blog.example.com"]);
    }

    #[tokio::test]
    async fn test_list_uses_local_metadata_for_serving_host() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        let names = ["home.example.com", "api.example.com"];
        let ct = ct_server("example.com", &names).await;
        let scraper = Arc::new(TableScraper::with(vec![named("api.example.com", "API")]));
        let pipeline = pipeline(config(&dir, &ct, "home.example.com"), &names, scraper.clone());

        let serving = Host::parse("home.example.com").unwrap();
        let records = pipeline.list("example.com", &serving).await.unwrap();

        assert_eq!(hosts(&records), vec!["api.example.com", "home.example.com"]);
        assert_eq!(records[1].name.as_deref(), Some("Home"));
        assert_eq!(records[1].description.as_deref(), Some("The index"));
        assert!(!scraper.asked.lock().unwrap().contains(&"home.example.com".to_string()));
    }

    #[tokio::test]
    async fn test_list_ct_failure_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ct = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&ct)
            .await;
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &[], Arc::new(TableScraper::default()));

        let records = pipeline.list("example.com", &Host::parse("localhost").unwrap()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_empty_domain() {
        let dir = tempfile::tempdir().unwrap();
        let ct = MockServer::start().await;
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &[], Arc::new(TableScraper::default()));

        let err = pipeline.list(" . ", &Host::parse("localhost").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Pipeline { ref message, status: 400 } if message == LIST_FAILED));
    }

    #[tokio::test]
    async fn test_build_page_renders_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        let ct = ct_server("example.com", &["api.example.com", "docs.example.com"]).await;
        let scraper = Arc::new(TableScraper::with(vec![
            named("docs.example.com", "Docs"),
            HostRecord { icon: Some("https://api.example.com/i.png".into()), ..named("api.example.com", "API") },
        ]));
        let live = ["api.example.com", "docs.example.com"];
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &live, scraper);

        let built = pipeline.build_page("example.com", &Host::parse("localhost").unwrap()).await.unwrap();

        assert_eq!(built.location, CacheLocation::Primary);
        assert_eq!(hosts(&built.hosts), vec!["api.example.com", "docs.example.com"]);

        let api = built.html.find("https://api.example.com").unwrap();
        let docs = built.html.find("https://docs.example.com").unwrap();
        assert!(api < docs);
        assert!(built.html.contains(r#"<img src="https://api.example.com/i.png">"#));
        assert!(built.html.contains("Aucune description disponible."));
        assert!(built.html.contains(r#"<img src="../icons/logo_192.png">"#));

        let on_disk = std::fs::read_to_string(pipeline.cache().primary()).unwrap();
        assert_eq!(on_disk, built.html);
    }

    #[tokio::test]
    async fn test_build_page_missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ct = ct_server("example.com", &[]).await;
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &[], Arc::new(TableScraper::default()));

        let err = pipeline.build_page("example.com", &Host::parse("localhost").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Pipeline { ref message, status: 500 } if message == BUILD_PAGE_FAILED));
        assert!(!pipeline.cache().primary().exists());
    }

    #[tokio::test]
    async fn test_get_page_prefers_cache() {
        let dir = tempfile::tempdir().unwrap();
        let ct = ct_server("example.com", &[]).await;
        let pipeline = pipeline(config(&dir, &ct, "localhost"), &[], Arc::new(TableScraper::default()));

        let primary = pipeline.cache().primary().to_path_buf();
        std::fs::create_dir_all(primary.parent().unwrap()).unwrap();
        std::fs::write(&primary, "<p>cached</p>").unwrap();

        let page = pipeline.get_page("example.com", &Host::parse("localhost").unwrap()).await.unwrap();
        assert_eq!(page.html, "<p>cached</p>");
        assert_eq!(page.location, CacheLocation::Primary);
    }

    #[tokio::test]
    async fn test_get_page_builds_on_miss() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        let ct = ct_server("example.com", &["api.example.com"]).await;
        let scraper = Arc::new(TableScraper::with(vec![named("api.example.com", "API")]));
        let mut config = config(&dir, &ct, "localhost");
        config.cache_file = format!("subdex-miss-{}.html", std::process::id());
        let pipeline = pipeline(config, &["api.example.com"], scraper);
        let _ = std::fs::remove_file(pipeline.cache().fallback());

        let page = pipeline.get_page("example.com", &Host::parse("localhost").unwrap()).await.unwrap();

        assert_eq!(page.location, CacheLocation::Primary);
        assert!(page.html.contains(">API</a>"));
        assert_eq!(std::fs::read_to_string(pipeline.cache().primary()).unwrap(), page.html);
    }

    #[tokio::test]
    async fn test_get_page_failure_names_operation() {
        let dir = tempfile::tempdir().unwrap();
        let ct = ct_server("example.com", &[]).await;
        let mut config = config(&dir, &ct, "localhost");
        config.cache_file = format!("subdex-fail-{}.html", std::process::id());
        let pipeline = pipeline(config, &[], Arc::new(TableScraper::default()));
        let _ = std::fs::remove_file(pipeline.cache().fallback());

        let err = pipeline.get_page("example.com", &Host::parse("localhost").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Pipeline { ref message, .. } if message == GET_PAGE_FAILED));
    }
}
