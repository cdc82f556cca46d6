use crate::error::{Result, ScanError};
use crate::extract::PathExtractor;
use crate::page::{Origin, Page};
use crate::result::{CrawlReport, CrawlResult};
use crate::store::CrawlStore;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One pending fetch. The start URL has depth 1.
#[derive(Debug, Clone)]
struct WorkItem {
    url: String,
    depth: usize,
}

pub struct Crawler {
    client: Client,
    max_depth: usize,
    workers: usize,
    extractor: Arc<PathExtractor>,
    progress_callback: Option<ProgressCallback>,
    timeout_secs: u64,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .user_agent(concat!("sitetree/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_depth: DEFAULT_MAX_DEPTH,
            workers: 1,
            extractor: Arc::new(PathExtractor::default()),
            progress_callback: None,
            timeout_secs,
        })
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_extractor(mut self, extractor: PathExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Crawls every same-origin page reachable from `start_url` within `max_depth` hops.
    ///
    /// The work list is a stack and children are pushed in reverse document order, so a single
    /// worker visits pages in the same depth-first order a recursive walk would. Unreachable pages
    /// are recorded with an error and never abort the crawl; only a bad start URL does.
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlReport> {
        info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            start_url, self.max_depth, self.workers
        );

        let mut parsed_url = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        parsed_url.set_fragment(None);
        let origin = Origin::from_url(&parsed_url)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", start_url)))?;
        let start = parsed_url.to_string();

        let store = Arc::new(CrawlStore::new());
        let ctx = Arc::new(WorkerContext {
            client: self.client.clone(),
            origin,
            max_depth: self.max_depth,
            extractor: self.extractor.clone(),
            progress_callback: self.progress_callback.clone(),
            store: store.clone(),
            frontier: Mutex::new(vec![WorkItem {
                url: start.clone(),
                depth: 1,
            }]),
            in_flight: AtomicUsize::new(0),
        });

        let handles: Vec<_> = (0..self.workers)
            .map(|worker_id| tokio::spawn(run_worker(ctx.clone(), worker_id)))
            .collect();

        for joined in join_all(handles).await {
            joined?;
        }
        drop(ctx);

        let store = Arc::try_unwrap(store)
            .map_err(|_| ScanError::Other("crawl state still shared after workers exited".into()))?;
        let report = store.into_report(start);
        info!(
            "Crawl complete. Visited {} URLs, found {} directories",
            report.visited.len(),
            report.directories.len()
        );
        Ok(report)
    }
}

struct WorkerContext {
    client: Client,
    origin: Origin,
    max_depth: usize,
    extractor: Arc<PathExtractor>,
    progress_callback: Option<ProgressCallback>,
    store: Arc<CrawlStore>,
    frontier: Mutex<Vec<WorkItem>>,
    in_flight: AtomicUsize,
}

async fn run_worker(ctx: Arc<WorkerContext>, worker_id: usize) {
    debug!("Worker {} started", worker_id);

    loop {
        // Pop and the in-flight increment happen under the frontier lock, so an empty stack with
        // nothing in flight really means the crawl is over.
        let work_item = {
            let mut frontier = ctx.frontier.lock().await;
            match frontier.pop() {
                Some(item) => {
                    ctx.in_flight.fetch_add(1, Ordering::SeqCst);
                    Some(item)
                }
                None if ctx.in_flight.load(Ordering::SeqCst) == 0 => break,
                None => None,
            }
        };

        let Some(item) = work_item else {
            tokio::time::sleep(Duration::from_millis(10)).await;
            continue;
        };

        let children = ctx.process(worker_id, item).await;
        if !children.is_empty() {
            let mut frontier = ctx.frontier.lock().await;
            frontier.extend(children.into_iter().rev());
        }
        ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    debug!("Worker {} finished", worker_id);
}

impl WorkerContext {
    async fn process(&self, worker_id: usize, item: WorkItem) -> Vec<WorkItem> {
        if item.depth > self.max_depth {
            debug!("Pruned {} (depth {} > {})", item.url, item.depth, self.max_depth);
            return Vec::new();
        }
        if !self.store.try_visit(&item.url).await {
            debug!("Pruned {} (already visited)", item.url);
            return Vec::new();
        }

        if let Some(ref callback) = self.progress_callback {
            callback(worker_id, item.url.clone());
        }

        let result = match fetch_page(
            &self.client,
            &item.url,
            item.depth,
            &self.extractor,
            &self.origin,
        )
        .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!("Skipping {}: {}", item.url, e);
                let mut failed = CrawlResult::with_error(item.url.clone(), item.depth, e.to_string());
                if let ScanError::HttpStatus { status, .. } = e {
                    failed.status_code = status;
                }
                failed
            }
        };

        let children = result
            .links_found
            .iter()
            .map(|link| WorkItem {
                url: link.clone(),
                depth: item.depth + 1,
            })
            .collect();

        self.store.record(result).await;
        children
    }
}

async fn fetch_page(
    client: &Client,
    url: &str,
    depth: usize,
    extractor: &PathExtractor,
    origin: &Origin,
) -> Result<CrawlResult> {
    debug!("Fetching {}", url);

    let start = Instant::now();
    let response = client.get(url).send().await?;
    let response_time = start.elapsed();

    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = response.text().await?;

    let mut result = CrawlResult::new(url.to_string(), depth);
    result.status_code = status.as_u16();
    result.content_type = content_type.clone();
    result.response_time = response_time;

    // A missing content-type is treated as HTML
    let is_html = content_type
        .as_ref()
        .map(|ct| ct.contains("html"))
        .unwrap_or(true);
    if !is_html {
        debug!("Not parsing {} ({:?})", url, content_type);
        return Ok(result);
    }

    // Links resolve against the requested URL, not wherever a redirect landed
    let page = Page::parse(url, &body)?;
    result.paths_found = extractor.extract(page.extraction_text());
    result.links_found = page.internal_links(origin);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractorConfig;
    use std::sync::Mutex as StdMutex;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn html_page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_bytes(format!("<html><body>{}</body></html>", body).into_bytes())
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str, expected_hits: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_page(body))
            .expect(expected_hits)
            .mount(server)
            .await;
    }

    fn url_of(server: &MockServer, route: &str) -> String {
        format!("{}{}", server.uri(), route)
    }

    /// Test basic link discovery and path extraction
    #[tokio::test]
    async fn test_link_discovery() {
        let mock_server = MockServer::start().await;

        mount_page(
            &mock_server,
            "/",
            r#"<a href="/about">About</a> <a href="/team/people">Team</a>"#,
            1,
        )
        .await;
        mount_page(&mock_server, "/about", "<p>Contact via /contact-us</p>", 1).await;
        mount_page(&mock_server, "/team/people", "<img src='/assets/logo'>", 1).await;

        let crawler = Crawler::new().unwrap().with_max_depth(2);
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        assert!(report.visited.contains(&url_of(&mock_server, "/about")));
        for dir in ["/about", "/team/people", "/contact-us", "/assets/logo"] {
            assert!(
                report.directories.contains(dir),
                "missing {} in {:?}",
                dir,
                report.directories
            );
        }
    }

    /// A linear chain longer than the depth ceiling stops exactly at the ceiling
    #[tokio::test]
    async fn test_depth_ceiling_is_inclusive() {
        let mock_server = MockServer::start().await;

        mount_page(&mock_server, "/", r#"<a href="/step-a">next</a>"#, 1).await;
        mount_page(&mock_server, "/step-a", r#"<a href="/step-b">next</a>"#, 1).await;
        mount_page(&mock_server, "/step-b", r#"<a href="/step-c">next</a>"#, 1).await;
        mount_page(&mock_server, "/step-c", r#"<a href="/step-d">next</a>"#, 0).await;
        mount_page(&mock_server, "/step-d", "end", 0).await;

        let crawler = Crawler::new().unwrap().with_max_depth(3);
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        assert!(!report.visited.contains(&url_of(&mock_server, "/step-c")));
        // /step-c was linked from a depth-3 page, so it still shows up as a path
        assert!(report.directories.contains("/step-c"));
    }

    /// A -> B -> A fetches each page exactly once
    #[tokio::test]
    async fn test_cycle_fetches_each_page_once() {
        let mock_server = MockServer::start().await;

        mount_page(&mock_server, "/", r#"<a href="/b">B</a>"#, 1).await;
        mount_page(&mock_server, "/b", r#"<a href="/">A</a> <a href="/b">self</a>"#, 1).await;

        let crawler = Crawler::new().unwrap().with_max_depth(10);
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 2);
        assert_eq!(report.pages.len(), 2);
    }

    #[tokio::test]
    async fn test_cross_origin_links_are_ignored() {
        let mock_server = MockServer::start().await;

        mount_page(
            &mock_server,
            "/",
            r#"<a href="http://other.example/x">elsewhere</a> <a href="/local">here</a>"#,
            1,
        )
        .await;
        mount_page(&mock_server, "/local", "local page", 1).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 2);
        assert!(report.visited.iter().all(|u| !u.contains("other.example")));
    }

    /// Failed pages are skipped without stopping their siblings
    #[tokio::test]
    async fn test_failed_fetch_is_a_silent_leaf() {
        let mock_server = MockServer::start().await;

        mount_page(
            &mock_server,
            "/",
            r#"<a href="/missing">gone</a> <a href="/present">ok</a>"#,
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(b"<a href=\"/secret-area\">x</a>".to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_page(&mock_server, "/present", "fine", 1).await;
        mount_page(&mock_server, "/secret-area", "never", 0).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        assert!(!report.directories.contains("/secret-area"));

        let failed: Vec<_> = report.failed_pages().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].status_code, 404);
        assert!(failed[0].url.ends_with("/missing"));
    }

    #[tokio::test]
    async fn test_timeout_does_not_abort_crawl() {
        let mock_server = MockServer::start().await;

        mount_page(
            &mock_server,
            "/",
            r#"<a href="/slow">slow</a> <a href="/fast">fast</a>"#,
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html_page("late").set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;
        mount_page(&mock_server, "/fast", "quick", 1).await;

        let crawler = Crawler::with_timeout(1).unwrap();
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        assert_eq!(report.failed_pages().count(), 1);
    }

    #[tokio::test]
    async fn test_non_html_is_not_expanded() {
        let mock_server = MockServer::start().await;

        mount_page(&mock_server, "/", r#"<a href="/data">data</a>"#, 1).await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(br#"{"next": "/hidden-api"}"#.to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 2);
        assert!(!report.directories.contains("/hidden-api"));
    }

    /// One worker walks depth-first in document order
    #[tokio::test]
    async fn test_single_worker_visits_depth_first() {
        let mock_server = MockServer::start().await;

        mount_page(
            &mock_server,
            "/",
            r#"<a href="/left">L</a> <a href="/right">R</a>"#,
            1,
        )
        .await;
        mount_page(&mock_server, "/left", r#"<a href="/left/child">LC</a>"#, 1).await;
        mount_page(&mock_server, "/left/child", "leaf", 1).await;
        mount_page(&mock_server, "/right", "leaf", 1).await;

        let order: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let order_clone = order.clone();
        let crawler = Crawler::new()
            .unwrap()
            .with_progress_callback(Arc::new(move |_worker_id: usize, url: String| {
                order_clone.lock().unwrap().push(url);
            }));
        crawler.crawl(&mock_server.uri()).await.unwrap();

        let order = order.lock().unwrap();
        let expected: Vec<String> = ["/", "/left", "/left/child", "/right"]
            .iter()
            .map(|route| url_of(&mock_server, route))
            .collect();
        assert_eq!(*order, expected);
    }

    /// Parallel workers still fetch every URL exactly once
    #[tokio::test]
    async fn test_multiple_workers_fetch_once() {
        let mock_server = MockServer::start().await;

        let mut root_html = String::new();
        for name in ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta"] {
            root_html.push_str(&format!(r#"<a href="/{}">{}</a>"#, name, name));
            // every page links back to the root and to its neighbour
            mount_page(
                &mock_server,
                &format!("/{}", name),
                r#"<a href="/">home</a> <a href="/alpha">first</a>"#,
                1,
            )
            .await;
        }
        mount_page(&mock_server, "/", &root_html, 1).await;

        let crawler = Crawler::new().unwrap().with_workers(4);
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 9);
        assert_eq!(report.pages.len(), 9);
    }

    #[tokio::test]
    async fn test_custom_denylist_applies() {
        let mock_server = MockServer::start().await;

        mount_page(&mock_server, "/", "<p>/private/area and /public/area</p>", 1).await;

        let extractor = PathExtractor::new(ExtractorConfig::empty().with_denied(["/private"]));
        let crawler = Crawler::new().unwrap().with_extractor(extractor);
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert!(report.directories.contains("/public/area"));
        assert!(!report.directories.contains("/private/area"));
    }

    /// A start page that redirects to another host spelling still has its links followed
    #[tokio::test]
    async fn test_redirected_start_page_keeps_crawling() {
        let mock_server = MockServer::start().await;
        let other_spelling = mock_server.uri().replace("127.0.0.1", "localhost");

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/home", other_spelling)),
            )
            .mount(&mock_server)
            .await;
        mount_page(
            &mock_server,
            "/home",
            r#"<a href="/about">About</a> <a href="/team">Team</a>"#,
            1,
        )
        .await;
        mount_page(&mock_server, "/about", "about", 1).await;
        mount_page(&mock_server, "/team", "team", 1).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        assert!(report.visited.contains(&url_of(&mock_server, "/about")));
        assert!(report.visited.contains(&url_of(&mock_server, "/team")));
    }

    #[test]
    fn test_builder_settings() {
        let crawler = Crawler::with_timeout(4).unwrap().with_max_depth(6).with_workers(0);
        assert_eq!(crawler.max_depth(), 6);
        assert_eq!(crawler.timeout_secs(), 4);
        assert_eq!(crawler.workers, 1);
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let crawler = Crawler::new().unwrap();
        let result = crawler.crawl("not a url").await;
        assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
    }
}
