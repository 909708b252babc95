//! CLI configuration and argument parsing.

use clap::Parser;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Terraform file patched in place, relative to the base path.
pub const TERRAFORM_FILE: &str = "terraform/kubernetes/main.tf";

/// Version manifest, relative to the base path.
pub const MANIFEST_FILE: &str = "VERSIONS/aws.yaml";

/// Zero-based line where the template node pool block starts.
pub const DEFAULT_NODE_POOL_START: usize = 12;

/// Bumps EKS add-on, AMI and Kubernetes versions in a Terraform cluster definition.
///
/// Versions are read from `VERSIONS/aws.yaml` and written into
/// `terraform/kubernetes/main.tf` under the base path.
#[derive(Parser, Debug, Clone)]
#[command(name = "tfup")]
#[command(about = "Bumps EKS versions in a Terraform cluster definition")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    /// Update csi driver, coredns and kube-proxy add-on versions
    #[arg(long, default_value = "false")]
    pub upgrade_addons: bool,

    /// Append a new node pool running the manifest AMI release version
    #[arg(long, default_value = "false")]
    pub upgrade_ami_version: bool,

    /// Update the EKS Kubernetes version
    #[arg(long, default_value = "false")]
    pub upgrade_kubernetes_version: bool,

    /// Root directory holding terraform/ and VERSIONS/
    #[arg(long, value_name = "DIR")]
    pub base_path: PathBuf,

    /// Zero-based line where the template node pool block starts
    #[arg(long, value_name = "LINE", default_value_t = DEFAULT_NODE_POOL_START)]
    pub node_pool_start: usize,

    /// Apply the upgrades without writing the Terraform file
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TFUP_LOG_LEVEL")]
    pub log_level: String,
}

/// Application configuration derived from CLI args.
#[derive(Debug, Clone)]
pub struct Config {
    pub upgrade_addons: bool,
    pub upgrade_ami_version: bool,
    pub upgrade_kubernetes_version: bool,
    pub terraform_path: PathBuf,
    pub manifest_path: PathBuf,
    pub node_pool_start: usize,
    pub dry_run: bool,
    pub log_level: String,
}

impl Config {
    /// Create config from CLI arguments.
    pub fn from_args(args: Args) -> Self {
        Self {
            upgrade_addons: args.upgrade_addons,
            upgrade_ami_version: args.upgrade_ami_version,
            upgrade_kubernetes_version: args.upgrade_kubernetes_version,
            terraform_path: args.base_path.join(TERRAFORM_FILE),
            manifest_path: args.base_path.join(MANIFEST_FILE),
            node_pool_start: args.node_pool_start,
            dry_run: args.dry_run,
            log_level: args.log_level,
        }
    }

    /// Check if any upgrade was requested.
    pub fn has_upgrades(&self) -> bool {
        self.upgrade_addons || self.upgrade_ami_version || self.upgrade_kubernetes_version
    }
}
