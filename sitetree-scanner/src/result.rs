use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// What happened to a single visited URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub depth: usize,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub links_found: Vec<String>,
    pub paths_found: Vec<String>,
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn new(url: String, depth: usize) -> Self {
        Self {
            url,
            depth,
            status_code: 0,
            content_type: None,
            response_time: Duration::from_secs(0),
            links_found: Vec::new(),
            paths_found: Vec::new(),
            error: None,
        }
    }

    pub fn with_error(url: String, depth: usize, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(url, depth)
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a finished crawl gathered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub visited: BTreeSet<String>,
    pub directories: BTreeSet<String>,
    pub pages: Vec<CrawlResult>,
}

impl CrawlReport {
    pub fn failed_pages(&self) -> impl Iterator<Item = &CrawlResult> {
        self.pages.iter().filter(|p| p.is_failure())
    }
}
