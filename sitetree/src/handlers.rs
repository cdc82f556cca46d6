use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitetree_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_report};
use sitetree_core::lines::read_lines;
use sitetree_core::output::{save_crawl_outputs, save_tree, save_tree_json};
use sitetree_core::tree::VirtualTree;
use sitetree_scanner::ExtractorConfig;
use std::path::{Path, PathBuf};
use tracing::Level;
use url::Url;

/// How a tree is written out in tree mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Text,
    Json,
}

impl TreeFormat {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(TreeFormat::Text),
            "json" => Some(TreeFormat::Json),
            _ => None,
        }
    }
}

pub fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    // A subscriber may already be installed (tests); keep it
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Expands a leading `~` the same way a shell would.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Parse the start URL, adding http:// when no scheme is given
pub fn normalize_start_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw)
        && url.has_host()
    {
        return Ok(url);
    }

    let with_scheme = format!("http://{}", raw);
    match Url::parse(&with_scheme) {
        Ok(url) if url.has_host() => Ok(url),
        _ => bail!("'{}' is not a crawlable URL", raw),
    }
}

/// Denylist from the built-in defaults (unless disabled), `--deny` values and a denylist file.
pub fn build_extractor_config(
    deny: &[String],
    denylist_file: Option<&Path>,
    no_default: bool,
) -> Result<ExtractorConfig> {
    let mut config = if no_default {
        ExtractorConfig::empty()
    } else {
        ExtractorConfig::default()
    };
    config = config.with_denied(deny.iter().cloned());

    if let Some(path) = denylist_file {
        let entries = read_lines(path)
            .with_context(|| format!("failed to read denylist {}", path.display()))?;
        config = config.with_denied(entries);
    }
    Ok(config)
}

/// Builds a tree from `paths`, ticking a progress bar per path when `show_progress` is set.
pub fn build_tree(paths: &[String], show_progress: bool) -> VirtualTree {
    let pb = if show_progress {
        ProgressBar::new(paths.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}: {percent}% |{bar:30.cyan/blue}| {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Building Tree");

    let mut tree = VirtualTree::new();
    for path in paths {
        tree.add_path(path);
        pb.inc(1);
    }
    pb.finish_and_clear();
    tree
}

/// Reads a path list and builds its tree.
pub fn load_tree(input: &Path, sorted: bool, show_progress: bool) -> Result<VirtualTree> {
    let mut paths =
        read_lines(input).with_context(|| format!("failed to read {}", input.display()))?;
    if sorted {
        paths.sort();
    }
    Ok(build_tree(&paths, show_progress))
}

pub fn render_tree(tree: &VirtualTree, format: TreeFormat) -> Result<String> {
    Ok(match format {
        TreeFormat::Text => tree.render(),
        TreeFormat::Json => {
            let mut json = tree.to_json()?;
            json.push('\n');
            json
        }
    })
}

fn write_tree(tree: &VirtualTree, path: &Path, format: TreeFormat) -> Result<()> {
    match format {
        TreeFormat::Text => save_tree(tree, path)?,
        TreeFormat::Json => save_tree_json(tree, path)?,
    }
    Ok(())
}

pub fn handle_tree(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let input = sub_matches
        .get_one::<String>("input")
        .map(|p| expand_path(p))
        .context("--input is required")?;
    let output = sub_matches.get_one::<String>("output").map(|p| expand_path(p));
    let verbose = sub_matches.get_flag("verbose");
    let sorted = sub_matches.get_flag("sorted");
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| TreeFormat::from_name(f))
        .unwrap_or(TreeFormat::Text);

    let tree = load_tree(&input, sorted, !quiet)?;

    if let Some(ref output) = output {
        write_tree(&tree, output, format)
            .with_context(|| format!("failed to save tree to {}", output.display()))?;
        println!("Tree structure saved to {}", output.display());
    }

    if verbose {
        print!("{}", render_tree(&tree, format)?);
    }

    Ok(())
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let raw_url = sub_matches
        .get_one::<String>("URL")
        .context("a URL to crawl is required")?;
    let url = normalize_start_url(raw_url)?;
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let workers = *sub_matches.get_one::<usize>("threads").unwrap_or(&1);
    let output_dir = sub_matches
        .get_one::<String>("output-dir")
        .map(|p| expand_path(p))
        .unwrap_or_else(|| PathBuf::from("."));
    let deny: Vec<String> = sub_matches
        .get_many::<String>("deny")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let denylist_file = sub_matches
        .get_one::<String>("denylist-file")
        .map(|p| expand_path(p));
    let no_default = sub_matches.get_flag("no-default-denylist");

    let extractor = build_extractor_config(&deny, denylist_file.as_deref(), no_default)?;

    if !quiet {
        println!(
            "\n{} Crawling {}",
            "→".blue().bold(),
            url.as_str().bright_white()
        );
        println!("Max depth: {}", max_depth);
        println!("Workers: {}", workers);
        println!("Denylist entries: {}\n", extractor.denylist.len());
    }

    let options = CrawlOptions {
        url: url.to_string(),
        max_depth,
        timeout_secs,
        workers,
        extractor,
        show_progress_bars: !quiet,
    };

    let report = execute_crawl(options, None)
        .await
        .with_context(|| format!("crawl of {} failed", url))?;

    let paths = save_crawl_outputs(&report, &output_dir).context("failed to write crawl outputs")?;

    if !quiet {
        println!();
        print!("{}", generate_crawl_report(&report));
        println!(
            "{} Directories: {}",
            "✓".green().bold(),
            paths.dirs.display().to_string().bright_white()
        );
        println!(
            "{} Tree: {}",
            "✓".green().bold(),
            paths.tree.display().to_string().bright_white()
        );
    }

    Ok(())
}
