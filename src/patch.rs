//! Patch operations over the Terraform line list.
//!
//! Each operation consumes the lines and returns the patched lines together
//! with the changes it made, so operations chain in any combination.

pub mod addons;
pub mod kubernetes;
pub mod node_pool;

use anyhow::Result;

use crate::error::TfupError;
use crate::pattern::LinePattern;

/// A value rewritten on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// 1-based line number in the patched file.
    pub line: usize,
    pub marker: &'static str,
    pub from: String,
    pub to: String,
}

impl LineChange {
    /// The line matched but already held the requested value.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Patched lines plus the changes applied to them.
#[derive(Debug, Clone)]
pub struct Patch {
    pub lines: Vec<String>,
    pub changes: Vec<LineChange>,
}

/// Rewrite the value on every line for which `select` names a pattern and a new value.
///
/// Lines without a selection pass through untouched. A selected line that
/// lacks the pattern's delimiters fails the whole patch.
fn rewrite_lines<'v, F>(lines: Vec<String>, select: F) -> Result<Patch>
where
    F: Fn(&str) -> Option<(LinePattern, &'v str)>,
{
    let mut changes = Vec::new();
    let mut patched = Vec::with_capacity(lines.len());

    for (idx, line) in lines.into_iter().enumerate() {
        let Some((pattern, value)) = select(&line) else {
            patched.push(line);
            continue;
        };

        let from = pattern
            .current(&line)
            .ok_or_else(|| TfupError::malformed(idx + 1, &pattern.to_string(), &line))?
            .to_string();
        let rewritten = pattern
            .rewrite(&line, value)
            .ok_or_else(|| TfupError::malformed(idx + 1, &pattern.to_string(), &line))?;

        changes.push(LineChange {
            line: idx + 1,
            marker: pattern.marker,
            from,
            to: value.to_string(),
        });
        patched.push(rewritten);
    }

    Ok(Patch {
        lines: patched,
        changes,
    })
}
