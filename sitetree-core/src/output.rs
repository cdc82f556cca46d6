// Output files written after a crawl

use crate::error::{CoreError, Result};
use crate::lines::write_lines;
use crate::tree::VirtualTree;
use sitetree_scanner::CrawlReport;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FALLBACK_NAME: &str = "site";

/// Where the two crawl outputs ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dirs: PathBuf,
    pub tree: PathBuf,
}

/// Short name for a crawl target: `https://www.example.com/x` becomes `example`.
///
/// Drops the scheme and a leading `www.`, then keeps everything before the first `.`, `:` or `/`.
pub fn base_name_from_url(url: &str) -> String {
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    // userinfo is not part of the name
    let authority_end = without_scheme.find('/').unwrap_or(without_scheme.len());
    let host_part = match without_scheme[..authority_end].rfind('@') {
        Some(idx) => &without_scheme[idx + 1..],
        None => without_scheme,
    };
    let host_part = host_part.strip_prefix("www.").unwrap_or(host_part);

    let name: String = host_part
        .split(['.', ':', '/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

pub fn dirs_file_name(name: &str) -> String {
    format!("dirs_{}.txt", name)
}

pub fn tree_file_name(name: &str) -> String {
    format!("tree_{}.txt", name)
}

pub fn output_paths(url: &str, output_dir: &Path) -> OutputPaths {
    let name = base_name_from_url(url);
    OutputPaths {
        dirs: output_dir.join(dirs_file_name(&name)),
        tree: output_dir.join(tree_file_name(&name)),
    }
}

/// Writes the sorted directory list and the rendered tree. Both files are written even when the
/// crawl found nothing.
pub fn save_crawl_outputs(report: &CrawlReport, output_dir: &Path) -> Result<OutputPaths> {
    fs::create_dir_all(output_dir).map_err(|e| CoreError::io(output_dir, e))?;
    let paths = output_paths(&report.start_url, output_dir);

    // BTreeSet iteration is already lexical
    write_lines(&paths.dirs, &report.directories)?;
    debug!("Wrote {} directories to {}", report.directories.len(), paths.dirs.display());

    let tree = VirtualTree::from_paths(&report.directories);
    save_tree(&tree, &paths.tree)?;
    debug!("Wrote tree of {} nodes to {}", tree.len(), paths.tree.display());

    Ok(paths)
}

pub fn save_tree(tree: &VirtualTree, path: &Path) -> Result<()> {
    fs::write(path, tree.render()).map_err(|e| CoreError::io(path, e))
}

pub fn save_tree_json(tree: &VirtualTree, path: &Path) -> Result<()> {
    let json = tree.to_json()?;
    fs::write(path, json).map_err(|e| CoreError::io(path, e))
}
