//! Package identity and source references.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of a package as supplied by package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub full_name: String,
    pub vendor: String,
    pub name: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub version: String,
}

impl PackageIdentity {
    /// Build an identity, deriving `vendor` and `name` from `full_name`.
    ///
    /// `"vendor/name"` splits on the first `/`; anything after a second `/` is
    /// dropped. A name without `/` has an empty vendor.
    pub fn new(
        full_name: impl Into<String>,
        package_type: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let full_name = full_name.into();
        let (vendor, name) = match full_name.split_once('/') {
            Some((vendor, rest)) => {
                let name = rest.split('/').next().unwrap_or(rest);
                (vendor.to_string(), name.to_string())
            }
            None => (String::new(), full_name.clone()),
        };
        Self {
            full_name,
            vendor,
            name,
            package_type: package_type.into(),
            version: version.into(),
        }
    }

    /// Template variables: `type`, `vendor` and `name`.
    pub fn template_vars(&self) -> HashMap<String, String> {
        HashMap::from([
            ("type".to_string(), self.package_type.clone()),
            ("vendor".to_string(), self.vendor.clone()),
            ("name".to_string(), self.name.clone()),
        ])
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.version)
    }
}

/// Where a package's files come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceRef {
    /// Local directory copied as-is.
    Path { path: PathBuf },
    /// Git repository checked out at `reference` (branch, tag or commit).
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    /// Zip archive on disk.
    Archive { path: PathBuf },
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Path { path } => write!(f, "path:{}", path.display()),
            SourceRef::Git {
                url,
                reference: Some(reference),
            } => write!(f, "git:{url}#{reference}"),
            SourceRef::Git {
                url,
                reference: None,
            } => write!(f, "git:{url}"),
            SourceRef::Archive { path } => write!(f, "archive:{}", path.display()),
        }
    }
}

/// A package to install: identity plus where to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    #[serde(flatten)]
    pub identity: PackageIdentity,
    pub source: SourceRef,
}

impl Package {
    pub fn new(identity: PackageIdentity, source: SourceRef) -> Self {
        Self { identity, source }
    }

    pub fn full_name(&self) -> &str {
        &self.identity.full_name
    }

    pub fn package_type(&self) -> &str {
        &self.identity.package_type
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }
}
