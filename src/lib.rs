//! tfup - bumps EKS versions in a Terraform cluster definition.
//!
//! Reads desired versions from `VERSIONS/aws.yaml` and patches
//! `terraform/kubernetes/main.tf` in place:
//! - csi driver, coredns and kube-proxy add-on versions
//! - a new node pool appended for AMI upgrades
//! - the EKS Kubernetes version

pub mod config;
pub mod error;
pub mod manifest;
pub mod patch;
pub mod pattern;
pub mod terraform;
pub mod upgrade;
