//! EKS Kubernetes version update.

use anyhow::Result;
use tracing::{info, warn};

use super::{Patch, rewrite_lines};
use crate::pattern::EKS_VERSION;

/// Replace the quoted value on every `eks_version` line.
pub fn update_kubernetes_version(lines: Vec<String>, version: &str) -> Result<Patch> {
    let patch = rewrite_lines(lines, |line| {
        EKS_VERSION.matches(line).then_some((EKS_VERSION, version))
    })?;

    if patch.changes.is_empty() {
        warn!("No eks_version assignment found in Terraform file");
    }

    for change in &patch.changes {
        if change.is_noop() {
            info!(line = change.line, version = %change.to, "Kubernetes version already up to date");
        } else {
            info!(
                line = change.line,
                from = %change.from,
                to = %change.to,
                "Upgrading Kubernetes version"
            );
        }
    }

    Ok(patch)
}
