//! Line-delimited text files: one path or pattern per line.

use crate::error::{CoreError, Result};
use std::fs;
use std::path::Path;

/// Reads `path` and returns its non-empty lines, trimmed.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    Ok(parse_lines(&content))
}

pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Writes each item on its own line, newline-terminated.
pub fn write_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| CoreError::io(path, e))
}
