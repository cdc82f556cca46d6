pub mod crawler;
pub mod error;
pub mod extract;
pub mod page;
pub mod result;
mod store;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{ExtractorConfig, PathExtractor, extract_paths};
pub use page::{Origin, Page, resolve_url};
pub use result::{CrawlReport, CrawlResult};
