//! Configuration schema for keeper.toml
//!
//! ```toml
//! [installer]
//! vendor-dir = "vendor"
//! separator = "/"
//!
//! [custom-installer]
//! drupal-site = "sites/{$name}/"
//!
//! [merge-exclusions]
//! drupal-core = ["core/vendor/", "modules/"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;
use crate::exclusion::ExclusionSet;
use crate::package::PackageIdentity;
use crate::template;

/// Placeholders filled from a package identity.
const KNOWN_PLACEHOLDERS: [&str; 3] = ["type", "vendor", "name"];

/// Root configuration structure for keeper.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct InstallerConfig {
    /// General installer settings
    #[serde(default)]
    pub installer: InstallerSettings,

    /// Install path template per package type
    #[serde(default)]
    pub custom_installer: BTreeMap<String, String>,

    /// Preserved sub-paths per package type
    #[serde(default)]
    pub merge_exclusions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct InstallerSettings {
    /// Install root for package types without a template
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Separator used by exclusion entries and relative paths
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Install state file, relative to the project root
    #[serde(default = "default_lockfile")]
    pub lockfile: String,
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

fn default_separator() -> String {
    "/".to_string()
}

fn default_lockfile() -> String {
    "keeper.lock".to_string()
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            vendor_dir: default_vendor_dir(),
            separator: default_separator(),
            lockfile: default_lockfile(),
        }
    }
}

impl InstallerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a path template is configured for `package_type`.
    pub fn supports_type(&self, package_type: &str) -> bool {
        self.template_for(package_type).is_some()
    }

    /// Configured template for `package_type`, if any and non-empty.
    pub fn template_for(&self, package_type: &str) -> Option<&str> {
        self.custom_installer
            .get(package_type)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Exclusions for `package_type`, or `None` when the type uses plain installs.
    pub fn exclusions_for(&self, package_type: &str) -> Option<ExclusionSet> {
        let entries = self.merge_exclusions.get(package_type)?;
        let set = ExclusionSet::with_separator(entries, self.separator());
        if set.is_empty() { None } else { Some(set) }
    }

    pub fn separator(&self) -> char {
        self.installer.separator.chars().next().unwrap_or('/')
    }

    /// Install path relative to the project root.
    ///
    /// Types with a template resolve it; everything else lands in
    /// `<vendor-dir>/<full name>`.
    pub fn install_path(&self, identity: &PackageIdentity) -> PathBuf {
        match self.template_for(&identity.package_type) {
            Some(template) => template::resolve_install_path(identity, template),
            None => PathBuf::from(&self.installer.vendor_dir).join(&identity.full_name),
        }
    }

    /// Set a template for a package type (builder style, mainly for tests and tooling).
    pub fn with_template(mut self, package_type: &str, template: &str) -> Self {
        self.custom_installer
            .insert(package_type.to_string(), template.to_string());
        self
    }

    /// Set exclusions for a package type.
    pub fn with_exclusions<I, S>(mut self, package_type: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merge_exclusions.insert(
            package_type.to_string(),
            entries.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.installer;
        if settings.separator.chars().count() != 1 {
            return Err(ConfigError::Invalid(format!(
                "installer.separator must be a single character, got '{}'",
                settings.separator
            )));
        }
        if settings.vendor_dir.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "installer.vendor-dir must not be empty".to_string(),
            ));
        }

        for (package_type, template) in &self.custom_installer {
            if template.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "custom-installer.{package_type}: template must not be empty"
                )));
            }
            let path = Path::new(template);
            if path.has_root() || path.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "custom-installer.{package_type}: '{template}' must be relative to the project root"
                )));
            }
            if path.components().any(|c| c == Component::ParentDir) {
                return Err(ConfigError::Invalid(format!(
                    "custom-installer.{package_type}: '{template}' must not contain '..'"
                )));
            }
            if !path.components().any(|c| matches!(c, Component::Normal(_))) {
                return Err(ConfigError::Invalid(format!(
                    "custom-installer.{package_type}: '{template}' must name a directory below the project root"
                )));
            }
            for name in template::placeholders(template) {
                if !KNOWN_PLACEHOLDERS.contains(&name.as_str()) {
                    tracing::warn!(
                        package_type = %package_type,
                        placeholder = %name,
                        "template placeholder is not a package field and will be kept verbatim"
                    );
                }
            }
        }

        let sep = self.separator();
        for (package_type, entries) in &self.merge_exclusions {
            for entry in entries {
                if entry.starts_with(sep) {
                    return Err(ConfigError::Invalid(format!(
                        "merge-exclusions.{package_type}: '{entry}' must be relative to the install path"
                    )));
                }
                if entry.split(sep).any(|segment| segment == "..") {
                    return Err(ConfigError::Invalid(format!(
                        "merge-exclusions.{package_type}: '{entry}' must not contain '..'"
                    )));
                }
            }
        }

        Ok(())
    }
}
