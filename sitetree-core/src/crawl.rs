use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sitetree_scanner::crawler::{DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS};
use sitetree_scanner::{CrawlReport, Crawler, ExtractorConfig, PathExtractor};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: String,
    pub max_depth: usize,
    pub timeout_secs: u64,
    pub workers: usize,
    pub extractor: ExtractorConfig,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: 1,
            extractor: ExtractorConfig::default(),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport> {
    let CrawlOptions {
        url,
        max_depth,
        timeout_secs,
        workers,
        extractor,
        show_progress_bars,
    } = options;

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let count_clone = processed_count.clone();
    let outer_callback = progress_callback.clone();
    let internal_progress_callback: sitetree_scanner::ProgressCallback =
        Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!(
                    "Crawling... {} URLs processed ({})",
                    count,
                    extract_url_path(&url)
                ));
                pb.tick();
            }
            if let Some(ref callback) = outer_callback {
                callback(url);
            }
        });

    let crawler = Crawler::with_timeout(timeout_secs)?
        .with_max_depth(max_depth)
        .with_workers(workers)
        .with_extractor(PathExtractor::new(extractor))
        .with_progress_callback(internal_progress_callback);
    info!(
        "Crawling {} (max depth {}, timeout {}s, {} workers)",
        url,
        crawler.max_depth(),
        crawler.timeout_secs(),
        workers
    );

    let result = crawler.crawl(&url).await;

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        if result.is_ok() {
            pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
        } else {
            pb.finish_and_clear();
        }
    }

    let report = result?;
    info!(
        "{}: {} pages, {} directories",
        report.start_url,
        report.pages.len(),
        report.directories.len()
    );
    Ok(report)
}

/// Generate a plain-text summary of a finished crawl
pub fn generate_crawl_report(report: &CrawlReport) -> String {
    let failed = report.failed_pages().count();

    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Start URL: {}\n", report.start_url));
    out.push_str(&format!("  URLs visited: {}\n", report.visited.len()));
    out.push_str(&format!("  Pages failed: {}\n", failed));
    out.push_str(&format!("  Directories found: {}\n", report.directories.len()));

    let mut by_status: BTreeMap<u16, usize> = BTreeMap::new();
    for page in &report.pages {
        *by_status.entry(page.status_code).or_default() += 1;
    }
    if !by_status.is_empty() {
        out.push_str("\n# Responses:\n");
        for (status, count) in by_status {
            let label = if status == 0 {
                "no response".to_string()
            } else {
                status.to_string()
            };
            out.push_str(&format!("  {}: {}\n", label, count));
        }
    }

    if failed > 0 {
        out.push_str("\n# Skipped:\n");
        for page in report.failed_pages() {
            out.push_str(&format!(
                "  {} ({})\n",
                extract_url_path(&page.url),
                page.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}
