//! Version manifest (`VERSIONS/aws.yaml`) lookup.

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::TfupError;

pub const CSI_DRIVER_VERSION: &str = "csi_driver_version";
pub const COREDNS_VERSION: &str = "coredns_version";
pub const KUBE_PROXY_VERSION: &str = "kube_proxy_version";
pub const AMI_RELEASE_VERSION: &str = "ami_release_version";
pub const EKS_VERSION: &str = "eks_version";

/// A single `{name, version}` manifest entry.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub name: String,
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Option<String>,
}

/// The whole manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// Add-on versions found in the manifest. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonVersions {
    pub csi_driver: Option<String>,
    pub coredns: Option<String>,
    pub kube_proxy: Option<String>,
}

impl AddonVersions {
    /// Version for a manifest add-on key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            CSI_DRIVER_VERSION => self.csi_driver.as_deref(),
            COREDNS_VERSION => self.coredns.as_deref(),
            KUBE_PROXY_VERSION => self.kube_proxy.as_deref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.csi_driver.is_none() && self.coredns.is_none() && self.kube_proxy.is_none()
    }
}

/// Accept quoted strings as well as bare YAML numbers (`version: 1.29`).
fn deserialize_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a version string, found {:?}",
            other
        ))),
    }
}

impl VersionManifest {
    /// Load the manifest from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| TfupError::ManifestRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let manifest: VersionManifest =
            serde_yaml::from_str(&content).map_err(|e| TfupError::ManifestParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            path = %path.display(),
            entries = manifest.versions.len(),
            "Loaded version manifest"
        );

        Ok(manifest)
    }

    /// Version of the first entry named `key`. Empty versions count as absent.
    pub fn find(&self, key: &str) -> Option<&str> {
        self.versions
            .iter()
            .find(|entry| entry.name == key)
            .and_then(|entry| entry.version.as_deref())
            .filter(|version| !version.is_empty())
    }

    /// Look up the csi driver, coredns and kube-proxy versions.
    pub fn find_eks_addons(&self) -> AddonVersions {
        let lookup = |key: &str| {
            let version = self.find(key).map(str::to_string);
            if version.is_none() {
                warn!(key, "Add-on version not found in manifest, skipping");
            }
            version
        };

        AddonVersions {
            csi_driver: lookup(CSI_DRIVER_VERSION),
            coredns: lookup(COREDNS_VERSION),
            kube_proxy: lookup(KUBE_PROXY_VERSION),
        }
    }

    pub fn find_ami_version(&self) -> Option<String> {
        let version = self.find(AMI_RELEASE_VERSION).map(str::to_string);
        if version.is_none() {
            warn!("ami_release_version not found in manifest");
        }
        version
    }

    pub fn find_eks_version(&self) -> Option<String> {
        let version = self.find(EKS_VERSION).map(str::to_string);
        if version.is_none() {
            warn!("eks_version not found in manifest");
        }
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn manifest(yaml: &str) -> VersionManifest {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_load_manifest() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "versions:").unwrap();
        writeln!(temp_file, "  - name: eks_version").unwrap();
        writeln!(temp_file, "    version: \"1.29\"").unwrap();
        writeln!(temp_file, "  - name: coredns_version").unwrap();
        writeln!(temp_file, "    version: v1.11.1-eksbuild.4").unwrap();

        let manifest = VersionManifest::load(temp_file.path()).unwrap();
        assert_eq!(manifest.versions.len(), 2);
        assert_eq!(manifest.find(EKS_VERSION), Some("1.29"));
        assert_eq!(manifest.find(COREDNS_VERSION), Some("v1.11.1-eksbuild.4"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VersionManifest::load(dir.path().join("aws.yaml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TfupError>(),
            Some(TfupError::ManifestRead { .. })
        ));
    }

    #[test]
    fn test_load_without_versions_key() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "releases: []").unwrap();

        let err = VersionManifest::load(temp_file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TfupError>(),
            Some(TfupError::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_find_returns_first_match() {
        let m = manifest(
            "versions:\n  - name: eks_version\n    version: '1.29'\n  - name: eks_version\n    version: '1.30'\n",
        );
        assert_eq!(m.find(EKS_VERSION), Some("1.29"));
        assert_eq!(m.find("unknown"), None);
    }

    #[test]
    fn test_unquoted_number_version() {
        let m = manifest("versions:\n  - name: eks_version\n    version: 1.29\n");
        assert_eq!(m.find_eks_version().as_deref(), Some("1.29"));
    }

    #[test]
    fn test_null_and_empty_versions_are_absent() {
        let m = manifest(
            "versions:\n  - name: eks_version\n    version: ~\n  - name: ami_release_version\n    version: ''\n",
        );
        assert_eq!(m.find_eks_version(), None);
        assert_eq!(m.find_ami_version(), None);
    }

    #[test]
    fn test_non_scalar_version_is_rejected() {
        let result: Result<VersionManifest, _> =
            serde_yaml::from_str("versions:\n  - name: eks_version\n    version: [1, 2]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_find_eks_addons_partial() {
        let m = manifest(
            "versions:\n  - name: csi_driver_version\n    version: v1.28.0-eksbuild.1\n  - name: kube_proxy_version\n    version: v1.29.0-eksbuild.1\n",
        );
        let addons = m.find_eks_addons();
        assert_eq!(addons.csi_driver.as_deref(), Some("v1.28.0-eksbuild.1"));
        assert_eq!(addons.coredns, None);
        assert_eq!(addons.get(KUBE_PROXY_VERSION), Some("v1.29.0-eksbuild.1"));
        assert!(!addons.is_empty());
    }

    #[test]
    fn test_find_eks_addons_none() {
        let m = manifest("versions: []\n");
        assert!(m.find_eks_addons().is_empty());
    }

    #[test]
    fn test_addon_versions_get_unknown_key() {
        let addons = AddonVersions {
            csi_driver: Some("v1".to_string()),
            ..Default::default()
        };
        assert_eq!(addons.get(EKS_VERSION), None);
        assert_eq!(addons.get(CSI_DRIVER_VERSION), Some("v1"));
    }
}
