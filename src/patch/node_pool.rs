//! Node pool duplication for AMI upgrades.
//!
//! The last node pool in the `node_pools` list is copied verbatim, renamed
//! to the next index and optionally pointed at a new AMI release version.
//! The copy is appended right after the original, which gains a trailing
//! comma so the list stays valid.

use anyhow::Result;
use std::ops::Range;
use tracing::{debug, info, warn};

use super::LineChange;
use crate::error::TfupError;
use crate::pattern::{self, AMI_RELEASE_VERSION, PEERING_CONFIGS, POOL_NAME};

/// Result of appending a node pool.
#[derive(Debug, Clone)]
pub struct NodePoolPatch {
    pub lines: Vec<String>,
    /// Zero-based line range of the template block in the input.
    pub template: Range<usize>,
    /// Renames and AMI changes inside the new block, numbered in the output.
    pub changes: Vec<LineChange>,
}

impl NodePoolPatch {
    /// Name given to the appended pool.
    pub fn new_pool_name(&self) -> Option<&str> {
        self.changes
            .iter()
            .find(|c| c.marker == POOL_NAME.marker)
            .map(|c| c.to.as_str())
    }

    pub fn added_lines(&self) -> usize {
        self.template.len()
    }
}

/// End (exclusive) of the template node pool block.
///
/// The block ends on the line before the last `peering_configs` line.
pub fn find_block_end(lines: &[String]) -> Result<usize> {
    let marker = lines
        .iter()
        .rposition(|line| line.contains(PEERING_CONFIGS))
        .ok_or_else(|| TfupError::MarkerNotFound(PEERING_CONFIGS.to_string()))?;

    Ok(marker.saturating_sub(1))
}

/// Copy the template lines, renumbering pool names and setting the AMI release version.
///
/// `first_line` is the zero-based output position of the copy, used for change reporting.
fn copy_block(
    template: &[String],
    first_line: usize,
    ami_release_version: Option<&str>,
) -> Result<(Vec<String>, Vec<LineChange>)> {
    let mut copied = Vec::with_capacity(template.len());
    let mut changes = Vec::new();

    for (offset, line) in template.iter().enumerate() {
        let line_no = first_line + offset + 1;

        if POOL_NAME.matches(line) {
            let current = POOL_NAME
                .current(line)
                .ok_or_else(|| TfupError::malformed(line_no, &POOL_NAME.to_string(), line))?;
            let next = pattern::increment_suffix(current)
                .ok_or_else(|| TfupError::InvalidPoolName(current.to_string()))?;
            let rewritten = POOL_NAME
                .rewrite(line, &next)
                .ok_or_else(|| TfupError::malformed(line_no, &POOL_NAME.to_string(), line))?;

            changes.push(LineChange {
                line: line_no,
                marker: POOL_NAME.marker,
                from: current.to_string(),
                to: next,
            });
            copied.push(rewritten);
        } else if let Some(version) =
            ami_release_version.filter(|_| AMI_RELEASE_VERSION.matches(line))
        {
            let current = AMI_RELEASE_VERSION.current(line).ok_or_else(|| {
                TfupError::malformed(line_no, &AMI_RELEASE_VERSION.to_string(), line)
            })?;
            let rewritten = AMI_RELEASE_VERSION.rewrite(line, version).ok_or_else(|| {
                TfupError::malformed(line_no, &AMI_RELEASE_VERSION.to_string(), line)
            })?;

            changes.push(LineChange {
                line: line_no,
                marker: AMI_RELEASE_VERSION.marker,
                from: current.to_string(),
                to: version.to_string(),
            });
            copied.push(rewritten);
        } else {
            copied.push(line.clone());
        }
    }

    Ok((copied, changes))
}

/// Append a copy of the node pool block `[start, end)` right after it.
///
/// `end` is found with [`find_block_end`]. The output is
/// `lines[..end] + copy + lines[end..]` with `lines[end - 1]` closed by `},`.
pub fn add_new_node_pool(
    mut lines: Vec<String>,
    start: usize,
    ami_release_version: Option<&str>,
) -> Result<NodePoolPatch> {
    info!("Upgrading node pool");

    let end = find_block_end(&lines)?;
    if end <= start {
        return Err(TfupError::InvalidNodePoolRange { start, end }.into());
    }

    debug!(start, end, "Located template node pool block");

    let (copied, changes) = copy_block(&lines[start..end], end, ami_release_version)?;

    if !changes.iter().any(|c| c.marker == POOL_NAME.marker) {
        warn!(start, end, "Template node pool has no name line, the copy keeps its name");
    }
    if ami_release_version.is_some()
        && !changes
            .iter()
            .any(|c| c.marker == AMI_RELEASE_VERSION.marker)
    {
        warn!(start, end, "Template node pool has no ami_release_version line");
    }

    let closed = pattern::close_list_element(&lines[end - 1])
        .ok_or_else(|| TfupError::malformed(end, "closing `}`", &lines[end - 1]))?;
    lines[end - 1] = closed;

    let suffix = lines.split_off(end);
    lines.extend(copied);
    lines.extend(suffix);

    for change in &changes {
        info!(
            line = change.line,
            field = change.marker,
            from = %change.from,
            to = %change.to,
            "Appended node pool field"
        );
    }

    Ok(NodePoolPatch {
        lines,
        template: start..end,
        changes,
    })
}
