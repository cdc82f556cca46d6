use crate::error::{Result, ScanError};
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

// `scheme://authority` or a protocol-relative `//authority`, up to the first path slash
static AUTHORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[A-Za-z][A-Za-z0-9+.-]*:)?//[^/\s"'<>]*"#)
        .expect("authority pattern is valid")
});

/// The (scheme, host) pair two URLs must share to count as internal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    pub fn of(url: &str) -> Option<Self> {
        Url::parse(url).ok().and_then(|u| Self::from_url(&u))
    }

    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_string(),
        })
    }

    pub fn is_internal(&self, url: &str) -> bool {
        Self::of(url).as_ref() == Some(self)
    }
}

/// A fetched HTML page, reduced to what the crawler needs from it.
///
/// `scraper::Html` is not `Send`, so everything is pulled out of the document up front and the
/// document itself is dropped before the page crosses an await point.
#[derive(Debug, Clone)]
pub struct Page {
    url: String,
    links: Vec<String>,
    text: String,
}

impl Page {
    pub fn parse(url: &str, body: &str) -> Result<Self> {
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        let document = Html::parse_document(body);
        let link_selector =
            Selector::parse("a[href]").map_err(|e| ScanError::ParseError(format!("{:?}", e)))?;

        let links = document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect();

        Ok(Self {
            url: url.to_string(),
            links,
            text: extraction_text(&document),
        })
    }

    /// Raw `href` values in document order.
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Text nodes and attribute values, one per line.
    pub fn extraction_text(&self) -> &str {
        &self.text
    }

    /// Resolved links sharing `origin`, first occurrence only, in document order.
    pub fn internal_links(&self, origin: &Origin) -> Vec<String> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter_map(|href| resolve_url(&self.url, href))
            .filter(|absolute| origin.is_internal(absolute))
            .filter(|absolute| seen.insert(absolute.clone()))
            .collect()
    }
}

fn extraction_text(document: &Html) -> String {
    let mut lines: Vec<String> = Vec::new();

    for node in document.tree.nodes() {
        match node.value() {
            Node::Text(text) => {
                let stripped = AUTHORITY_RE.replace_all(text, "");
                let trimmed = stripped.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            Node::Element(element) => {
                for (_, value) in element.attrs() {
                    lines.push(attribute_text(value));
                }
            }
            _ => {}
        }
    }

    lines.join("\n")
}

// Absolute URLs only contribute their path; the authority part is never a directory.
fn attribute_text(value: &str) -> String {
    match Url::parse(value) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => value.to_string(),
    }
}

pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    // Skip empty, javascript:, mailto:, tel:, etc.
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}
