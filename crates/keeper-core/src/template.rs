//! Install path templates with `{$name}` style placeholders.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::package::PackageIdentity;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\$([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// Substitute every `{$identifier}` in `template` whose identifier is in `vars`.
///
/// Unknown placeholders and any other text pass through unchanged.
pub fn resolve(template: &str, vars: &HashMap<String, String>) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Resolve `template` against a package's `type`, `vendor` and `name`.
pub fn resolve_install_path(identity: &PackageIdentity, template: &str) -> PathBuf {
    PathBuf::from(resolve(template, &identity.template_vars()))
}

/// Identifiers referenced by `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
