//! EKS add-on version updates.

use anyhow::Result;
use tracing::{debug, info};

use super::{Patch, rewrite_lines};
use crate::manifest::{self, AddonVersions};
use crate::pattern::{self, LinePattern};

/// Manifest key and Terraform line pattern for each add-on.
const ADDONS: [(&str, LinePattern); 3] = [
    (manifest::CSI_DRIVER_VERSION, pattern::CSI_DRIVER_VERSION),
    (manifest::COREDNS_VERSION, pattern::COREDNS_VERSION),
    (manifest::KUBE_PROXY_VERSION, pattern::KUBE_PROXY_VERSION),
];

/// Replace the quoted version on every add-on line whose version was supplied.
///
/// A line is expected to carry at most one add-on marker. If it carries
/// several, the last add-on in [`ADDONS`] order with a supplied version wins.
pub fn update_addons_version(lines: Vec<String>, versions: &AddonVersions) -> Result<Patch> {
    info!("Upgrading add-on versions");

    let patch = rewrite_lines(lines, |line| {
        ADDONS.iter().rev().find_map(|(key, pattern)| {
            if pattern.matches(line) {
                versions.get(key).map(|version| (*pattern, version))
            } else {
                None
            }
        })
    })?;

    for change in &patch.changes {
        if change.is_noop() {
            debug!(line = change.line, addon = change.marker, version = %change.to, "Add-on already up to date");
        } else {
            info!(
                line = change.line,
                addon = change.marker,
                from = %change.from,
                to = %change.to,
                "Updated add-on version"
            );
        }
    }

    Ok(patch)
}
