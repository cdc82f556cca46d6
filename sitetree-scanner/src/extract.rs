//! Pulls path-shaped strings out of page text.
//!
//! A candidate is a maximal run of `/segment` pieces (alphanumerics, `_`, `-`) with an optional trailing
//! `/`. Candidates carrying an `@`, ending in a digit, or containing a denylisted substring are dropped.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/[A-Za-z0-9_-]+)+/?").expect("path pattern is valid"));

/// Substrings that only ever show up as noise on real sites.
pub const DEFAULT_DENYLIST: &[&str] = &["/cdn-cgi", "/wp-json", "/wp-includes"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub denylist: BTreeSet<String>,
}

impl ExtractorConfig {
    /// A config with no denylist at all.
    pub fn empty() -> Self {
        Self {
            denylist: BTreeSet::new(),
        }
    }

    pub fn with_denied<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist.extend(
            entries
                .into_iter()
                .map(Into::<String>::into)
                .filter(|s| !s.is_empty()),
        );
        self
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::empty().with_denied(DEFAULT_DENYLIST.iter().copied())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathExtractor {
    config: ExtractorConfig,
}

impl PathExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        extract_paths(text, &self.config)
    }

    pub fn is_kept(&self, candidate: &str) -> bool {
        keep_candidate(candidate, &self.config)
    }
}

pub fn extract_paths(text: &str, config: &ExtractorConfig) -> Vec<String> {
    PATH_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| keep_candidate(candidate, config))
        .map(str::to_string)
        .collect()
}

fn keep_candidate(candidate: &str, config: &ExtractorConfig) -> bool {
    // PATH_RE never yields '@' today; guard for when it admits more characters
    if candidate.contains('@') {
        return false;
    }
    if candidate.ends_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    !config
        .denylist
        .iter()
        .any(|noise| candidate.contains(noise.as_str()))
}
