//! Upgrade pipeline: manifest lookup, patch operations and write-back.

use anyhow::Result;
use colored::Colorize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::manifest::VersionManifest;
use crate::patch::LineChange;
use crate::patch::{addons, kubernetes, node_pool};
use crate::terraform;

/// What an upgrade run changed.
#[derive(Debug, Clone, Default)]
pub struct UpgradeReport {
    pub addons: Vec<LineChange>,
    /// Set when a node pool was appended.
    pub node_pool: Option<NodePoolSummary>,
    pub kubernetes: Vec<LineChange>,
    pub lines_before: usize,
    pub lines_after: usize,
    pub written: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePoolSummary {
    pub name: Option<String>,
    pub ami_release_version: Option<String>,
    pub added_lines: usize,
}

impl UpgradeReport {
    /// Count of values that actually changed.
    pub fn changed_values(&self) -> usize {
        self.addons
            .iter()
            .chain(&self.kubernetes)
            .filter(|c| !c.is_noop())
            .count()
    }
}

/// Apply every upgrade enabled in `config` to `lines`, in the fixed order
/// add-ons, node pool, Kubernetes version. Each step reads the output of the previous one.
pub fn apply(
    lines: Vec<String>,
    manifest: &VersionManifest,
    config: &Config,
) -> Result<(Vec<String>, UpgradeReport)> {
    let mut report = UpgradeReport {
        lines_before: lines.len(),
        ..Default::default()
    };
    let mut lines = lines;

    if config.upgrade_addons {
        let versions = manifest.find_eks_addons();
        if versions.is_empty() {
            warn!("No add-on versions found in manifest, skipping add-on upgrade");
        } else {
            let patch = addons::update_addons_version(lines, &versions)?;
            lines = patch.lines;
            report.addons = patch.changes;
        }
    }

    if config.upgrade_ami_version {
        let ami_release_version = manifest.find_ami_version();
        let patch = node_pool::add_new_node_pool(
            lines,
            config.node_pool_start,
            ami_release_version.as_deref(),
        )?;

        report.node_pool = Some(NodePoolSummary {
            name: patch.new_pool_name().map(str::to_string),
            ami_release_version,
            added_lines: patch.added_lines(),
        });
        lines = patch.lines;
    }

    if config.upgrade_kubernetes_version {
        match manifest.find_eks_version() {
            Some(version) => {
                let patch = kubernetes::update_kubernetes_version(lines, &version)?;
                lines = patch.lines;
                report.kubernetes = patch.changes;
            }
            None => warn!("Skipping Kubernetes version upgrade"),
        }
    }

    report.lines_after = lines.len();
    Ok((lines, report))
}

/// Read the Terraform file, apply the configured upgrades and write it back.
///
/// The manifest is only read when at least one upgrade is enabled. With no
/// upgrades the file is rewritten unchanged.
pub fn run(config: &Config) -> Result<UpgradeReport> {
    let lines = terraform::read_lines(&config.terraform_path)?;

    let (lines, mut report) = if config.has_upgrades() {
        let manifest = VersionManifest::load(&config.manifest_path)?;
        apply(lines, &manifest, config)?
    } else {
        debug!("No upgrade flags set");
        let lines_before = lines.len();
        (
            lines,
            UpgradeReport {
                lines_before,
                lines_after: lines_before,
                ..Default::default()
            },
        )
    };

    if config.dry_run {
        info!(path = %config.terraform_path.display(), "Dry run, Terraform file not written");
    } else {
        terraform::write_lines(&config.terraform_path, &lines)?;
        report.written = true;
        info!(path = %config.terraform_path.display(), lines = lines.len(), "Terraform file updated");
    }

    Ok(report)
}

/// Print a human-readable summary of an upgrade run.
pub fn print_summary(report: &UpgradeReport, config: &Config) {
    println!();
    println!("{}", "=== Upgrade Summary ===".cyan().bold());

    for change in &report.addons {
        print_change("add-on", change);
    }

    if let Some(pool) = &report.node_pool {
        println!(
            "  {:<12} {} ({} lines, AMI {})",
            "node pool",
            pool.name.as_deref().unwrap_or("(unnamed)").bold(),
            pool.added_lines,
            pool.ami_release_version
                .as_deref()
                .unwrap_or("unchanged")
        );
    }

    for change in &report.kubernetes {
        print_change("kubernetes", change);
    }

    if report.addons.is_empty() && report.node_pool.is_none() && report.kubernetes.is_empty() {
        println!("  {}", "No changes".dimmed());
    }

    let target = config.terraform_path.display().to_string();
    if report.written {
        println!(
            "{} {} ({} -> {} lines)",
            "Updated".green().bold(),
            target,
            report.lines_before,
            report.lines_after
        );
    } else {
        println!("{} {} not written", "[DRY RUN]".yellow(), target);
    }
}

fn print_change(kind: &str, change: &LineChange) {
    if change.is_noop() {
        println!(
            "  {:<12} {} {} (unchanged, line {})",
            kind,
            change.marker,
            change.to,
            change.line
        );
    } else {
        println!(
            "  {:<12} {} {} -> {} (line {})",
            kind,
            change.marker,
            change.from.red(),
            change.to.green(),
            change.line
        );
    }
}
