use crate::result::{CrawlReport, CrawlResult};
use std::collections::{BTreeSet, HashSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct StoreInner {
    visited: HashSet<String>,
    directories: BTreeSet<String>,
    pages: Vec<CrawlResult>,
}

/// Single owner of all state a crawl accumulates. Workers only touch it through these methods.
#[derive(Default)]
pub(crate) struct CrawlStore {
    inner: Mutex<StoreInner>,
}

impl CrawlStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `url` visited. Returns false when it already was.
    pub(crate) async fn try_visit(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.visited.contains(url) {
            return false;
        }
        inner.visited.insert(url.to_string());
        true
    }

    pub(crate) async fn record(&self, result: CrawlResult) {
        let mut inner = self.inner.lock().await;
        inner.directories.extend(result.paths_found.iter().cloned());
        inner.pages.push(result);
    }

    pub(crate) fn into_report(self, start_url: String) -> CrawlReport {
        let inner = self.inner.into_inner();
        CrawlReport {
            start_url,
            visited: inner.visited.into_iter().collect(),
            directories: inner.directories,
            pages: inner.pages,
        }
    }
}
