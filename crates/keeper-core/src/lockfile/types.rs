//! Lockfile types for recorded install state.
//!
//! Tracks what was installed where, which sub-paths were preserved, and the
//! content of every managed file at install time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::LockfileError;
use crate::exclusion::{DEFAULT_SEPARATOR, ExclusionSet};
use crate::fs::{FileManifest, manifest_digest};
use crate::package::{Package, PackageIdentity, SourceRef};

pub const LOCKFILE_VERSION: u32 = 1;

/// Lockfile for installed packages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockfile {
    /// Lockfile format version
    pub version: u32,

    /// Timestamp of the last write
    pub generated_at: chrono::DateTime<chrono::Utc>,

    /// Installed packages keyed by full name
    #[serde(default)]
    pub packages: BTreeMap<String, LockedPackage>,
}

impl Lockfile {
    /// Create a new empty lockfile
    pub fn new() -> Self {
        Self {
            version: LOCKFILE_VERSION,
            generated_at: chrono::Utc::now(),
            packages: BTreeMap::new(),
        }
    }

    /// Add or replace a locked package
    pub fn add_package(&mut self, package: LockedPackage) {
        self.packages.insert(package.name.clone(), package);
    }

    pub fn get_package(&self, name: &str) -> Option<&LockedPackage> {
        self.packages.get(name)
    }

    pub fn remove_package(&mut self, name: &str) -> Option<LockedPackage> {
        self.packages.remove(name)
    }

    /// Validate the lockfile
    pub fn validate(&self) -> Result<(), LockfileError> {
        if self.version != LOCKFILE_VERSION {
            return Err(LockfileError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for Lockfile {
    fn default() -> Self {
        Self::new()
    }
}

/// An installed package with its managed file manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockedPackage {
    /// Full package name (`vendor/name`)
    pub name: String,

    #[serde(rename = "type")]
    pub package_type: String,

    pub version: String,

    /// Directory the package occupies
    pub install_path: PathBuf,

    /// Where the files were fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    /// Preserved sub-paths in effect at install time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,

    #[serde(default = "default_separator")]
    pub separator: char,

    /// Relative path -> blake3 digest of every managed file
    #[serde(default)]
    pub files: FileManifest,

    /// Digest over `files`
    pub tree_hash: String,

    pub installed_at: chrono::DateTime<chrono::Utc>,
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl LockedPackage {
    pub fn new(package: &Package, install_path: PathBuf, files: FileManifest) -> Self {
        let identity = &package.identity;
        Self {
            name: identity.full_name.clone(),
            package_type: identity.package_type.clone(),
            version: identity.version.clone(),
            install_path,
            source: Some(package.source.clone()),
            exclusions: Vec::new(),
            separator: DEFAULT_SEPARATOR,
            tree_hash: manifest_digest(&files),
            files,
            installed_at: chrono::Utc::now(),
        }
    }

    /// Record the exclusions the install preserved.
    pub fn with_exclusions(mut self, exclusions: &ExclusionSet) -> Self {
        self.exclusions = exclusions.entries().to_vec();
        self.separator = exclusions.separator();
        self
    }

    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(&self.name, &self.package_type, &self.version)
    }

    /// Rebuild the installable package, if the source was recorded.
    pub fn package(&self) -> Option<Package> {
        self.source
            .clone()
            .map(|source| Package::new(self.identity(), source))
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::with_separator(&self.exclusions, self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LockedPackage {
        let package = Package::new(
            PackageIdentity::new("drupal/core", "drupal-core", "8.0.0"),
            SourceRef::Path {
                path: PathBuf::from("/dist/core"),
            },
        );
        let mut files = FileManifest::new();
        files.insert("index.php".to_string(), "abc".to_string());
        LockedPackage::new(&package, PathBuf::from("web"), files)
            .with_exclusions(&ExclusionSet::new(["core/vendor/", "modules/"]))
    }

    #[test]
    fn locked_package_round_trips_identity() {
        let locked = sample();
        let identity = locked.identity();
        assert_eq!(identity.vendor, "drupal");
        assert_eq!(identity.name, "core");
        assert_eq!(locked.package().map(|p| p.identity), Some(identity));
        assert_eq!(locked.exclusion_set().entries(), &["core/vendor", "modules"]);
    }

    #[test]
    fn serialized_form_uses_type_key() {
        let json = serde_json::to_value(sample()).expect("serialize should succeed");
        assert_eq!(json["type"], "drupal-core");
        assert_eq!(json["source"]["kind"], "path");
        assert_eq!(json["files"]["index.php"], "abc");
    }

    #[test]
    fn validate_rejects_unknown_version() {
        let mut lockfile = Lockfile::new();
        lockfile.version = 7;
        assert!(matches!(
            lockfile.validate(),
            Err(LockfileError::UnsupportedVersion(7))
        ));
    }
}
