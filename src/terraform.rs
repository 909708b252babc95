//! Terraform file loading and writing.
//!
//! The file is held as an ordered list of raw lines, each keeping its own
//! line terminator, so writing the list back reproduces the input byte for byte.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Split text into lines, keeping the terminators.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

/// Read a Terraform file into lines.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read Terraform file: {}", path.display()))?;

    let lines = split_lines(&content);
    debug!(path = %path.display(), lines = lines.len(), "Loaded Terraform file");

    Ok(lines)
}

/// Overwrite a file with the concatenated lines.
pub fn write_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
    let path = path.as_ref();

    fs::write(path, lines.concat())
        .with_context(|| format!("Failed to write Terraform file: {}", path.display()))?;

    debug!(path = %path.display(), lines = lines.len(), "Wrote Terraform file");
    Ok(())
}
