pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    TreeFormat, build_extractor_config, build_tree, expand_path, load_tree, normalize_start_url,
};

// Re-export crawl functionality from sitetree-core
pub use sitetree_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_report,
};
