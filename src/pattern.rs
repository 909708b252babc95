//! Line patterns recognised in the Terraform cluster definition.
//!
//! tfup never parses HCL. Every edit is a substring contract: a marker that
//! selects a line and a delimiter pair that encloses the value to rewrite.
//! Each contract lives here under its own name so that a change in the
//! file layout breaks a test instead of silently corrupting output.

use std::fmt;
use std::ops::Range;

/// Boundary marker: the template node pool block ends on the line before it.
pub const PEERING_CONFIGS: &str = "peering_configs";

/// A value enclosed between an opening and a closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimited {
    pub open: &'static str,
    pub close: &'static str,
}

/// `key = "value"`
pub const ASSIGNMENT: Delimited = Delimited {
    open: "= \"",
    close: "\"",
};

/// `"key" : "value"`
pub const ATTRIBUTE: Delimited = Delimited {
    open: ": \"",
    close: "\"",
};

/// `"key" : "value",`
pub const LISTED_ATTRIBUTE: Delimited = Delimited {
    open: ": \"",
    close: "\",",
};

impl Delimited {
    /// Byte range of the enclosed value, searching for `close` after `open`.
    pub fn span(&self, line: &str) -> Option<Range<usize>> {
        let start = line.find(self.open)? + self.open.len();
        let len = line[start..].find(self.close)?;
        Some(start..start + len)
    }

    /// The enclosed value.
    pub fn value<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.span(line).map(|range| &line[range])
    }

    /// Copy of `line` with the enclosed value replaced by `value`.
    pub fn replace(&self, line: &str, value: &str) -> Option<String> {
        let range = self.span(line)?;
        let mut out = String::with_capacity(line.len() - range.len() + value.len());
        out.push_str(&line[..range.start]);
        out.push_str(value);
        out.push_str(&line[range.end..]);
        Some(out)
    }
}

impl fmt::Display for Delimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` .. `{}`", self.open, self.close)
    }
}

/// A marker selecting lines plus the delimiter pair around the value to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePattern {
    pub marker: &'static str,
    pub value: Delimited,
}

pub const CSI_DRIVER_VERSION: LinePattern = LinePattern {
    marker: "csi_driver_version",
    value: ASSIGNMENT,
};

pub const COREDNS_VERSION: LinePattern = LinePattern {
    marker: "coredns_version",
    value: ASSIGNMENT,
};

pub const KUBE_PROXY_VERSION: LinePattern = LinePattern {
    marker: "kube_proxy_version",
    value: ASSIGNMENT,
};

pub const EKS_VERSION: LinePattern = LinePattern {
    marker: "eks_version",
    value: ASSIGNMENT,
};

pub const POOL_NAME: LinePattern = LinePattern {
    marker: "\"name\" :",
    value: ATTRIBUTE,
};

pub const AMI_RELEASE_VERSION: LinePattern = LinePattern {
    marker: "ami_release_version",
    value: LISTED_ATTRIBUTE,
};

impl LinePattern {
    pub fn matches(&self, line: &str) -> bool {
        line.contains(self.marker)
    }

    /// Current value on a matching line.
    pub fn current<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.value.value(line)
    }

    /// Rewrite the value on a matching line. `None` when the delimiters are missing.
    pub fn rewrite(&self, line: &str, value: &str) -> Option<String> {
        self.value.replace(line, value)
    }
}

impl fmt::Display for LinePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` with {}", self.marker, self.value)
    }
}

/// Increment the trailing `-<N>` of a node pool name (`pool-3` -> `pool-4`).
pub fn increment_suffix(name: &str) -> Option<String> {
    let (prefix, suffix) = name.rsplit_once('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u64 = suffix.parse().ok()?;
    Some(format!("{}-{}", prefix, index + 1))
}

/// Turn the closing brace of a list element into `},` so another element can follow.
///
/// Lines already closed with `},` are returned unchanged. `None` when the line has no brace.
pub fn close_list_element(line: &str) -> Option<String> {
    let pos = line.rfind('}')?;
    if line[pos + 1..].starts_with(',') {
        return Some(line.to_string());
    }
    let mut out = String::with_capacity(line.len() + 1);
    out.push_str(&line[..=pos]);
    out.push(',');
    out.push_str(&line[pos + 1..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_value() {
        let line = "  coredns_version = \"v1.11.1-eksbuild.4\"\n";
        assert_eq!(ASSIGNMENT.value(line), Some("v1.11.1-eksbuild.4"));
    }

    #[test]
    fn test_assignment_replace_keeps_surrounding_text() {
        let line = "    csi_driver_version = \"v1.25.0-eksbuild.1\",\n";
        assert_eq!(
            ASSIGNMENT.replace(line, "v1.28.0-eksbuild.1").unwrap(),
            "    csi_driver_version = \"v1.28.0-eksbuild.1\",\n"
        );
    }

    #[test]
    fn test_replace_touches_only_the_delimited_value() {
        // The old value also appears in a trailing comment.
        let line = "  eks_version = \"1.28\" # was 1.28\n";
        assert_eq!(
            EKS_VERSION.rewrite(line, "1.29").unwrap(),
            "  eks_version = \"1.29\" # was 1.28\n"
        );
    }

    #[test]
    fn test_replace_empty_value() {
        assert_eq!(
            ASSIGNMENT.replace("x = \"\"\n", "1").unwrap(),
            "x = \"1\"\n"
        );
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(ASSIGNMENT.span("  eks_version = var.eks_version\n"), None);
        assert_eq!(ASSIGNMENT.span("  eks_version = \"1.28\n"), None);
        assert!(EKS_VERSION.rewrite("eks_version\n", "1.29").is_none());
    }

    #[test]
    fn test_listed_attribute_value() {
        let line = "      \"ami_release_version\" : \"1.28.5-20240227\",\n";
        assert!(AMI_RELEASE_VERSION.matches(line));
        assert_eq!(AMI_RELEASE_VERSION.current(line), Some("1.28.5-20240227"));
        assert_eq!(
            AMI_RELEASE_VERSION.rewrite(line, "1.29.0-20240315").unwrap(),
            "      \"ami_release_version\" : \"1.29.0-20240315\",\n"
        );
    }

    #[test]
    fn test_listed_attribute_requires_trailing_comma() {
        let line = "      \"ami_release_version\" : \"1.28.5-20240227\"\n";
        assert_eq!(AMI_RELEASE_VERSION.current(line), None);
    }

    #[test]
    fn test_pool_name_pattern() {
        let line = "      \"name\" : \"captain-pool-3\",\n";
        assert!(POOL_NAME.matches(line));
        assert_eq!(POOL_NAME.current(line), Some("captain-pool-3"));
        assert!(!POOL_NAME.matches("      \"instance_type\" : \"t3a.large\",\n"));
    }

    #[test]
    fn test_addon_markers_are_distinct() {
        let line = "  kube_proxy_version = \"v1.28.6-eksbuild.2\"\n";
        assert!(KUBE_PROXY_VERSION.matches(line));
        assert!(!COREDNS_VERSION.matches(line));
        assert!(!CSI_DRIVER_VERSION.matches(line));
    }

    #[test]
    fn test_increment_suffix() {
        assert_eq!(increment_suffix("pool-7").as_deref(), Some("pool-8"));
        assert_eq!(increment_suffix("pool-9").as_deref(), Some("pool-10"));
        assert_eq!(
            increment_suffix("cluster-10-pool-1").as_deref(),
            Some("cluster-10-pool-2")
        );
    }

    #[test]
    fn test_increment_suffix_invalid() {
        assert_eq!(increment_suffix("pool"), None);
        assert_eq!(increment_suffix("pool-"), None);
        assert_eq!(increment_suffix("pool-a"), None);
    }

    #[test]
    fn test_close_list_element() {
        assert_eq!(close_list_element("    }\n").as_deref(), Some("    },\n"));
        assert_eq!(close_list_element("    }\r\n").as_deref(), Some("    },\r\n"));
        assert_eq!(close_list_element("    },\n").as_deref(), Some("    },\n"));
        assert_eq!(close_list_element("    ]\n"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            EKS_VERSION.to_string(),
            "`eks_version` with `= \"` .. `\"`"
        );
    }
}
