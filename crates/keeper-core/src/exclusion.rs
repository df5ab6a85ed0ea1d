//! Exclusion sets: relative sub-paths of an install root that survive reinstalls.
//!
//! Entries are configured with or without a trailing separator (`core/vendor/`
//! and `core/vendor` are the same exclusion). They are normalized once at
//! construction so that candidate paths built during a tree walk, which never
//! carry a trailing separator, compare exactly at every depth.

pub const DEFAULT_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    entries: Vec<String>,
    separator: char,
}

impl ExclusionSet {
    /// Build a set using the default `/` separator.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_separator(entries, DEFAULT_SEPARATOR)
    }

    pub fn with_separator<I, S>(entries: I, separator: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for entry in entries {
            let raw = entry.as_ref();
            let trimmed = raw.trim_end_matches(separator);
            if trimmed.is_empty() {
                tracing::warn!(entry = raw, "ignoring exclusion that names the install root");
                continue;
            }
            if !normalized.iter().any(|e: &String| e == trimmed) {
                normalized.push(trimmed.to_string());
            }
        }
        Self {
            entries: normalized,
            separator,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when `path` is an exclusion or a strict ancestor directory of one.
    ///
    /// Deleting such a path would destroy excluded content, so pruning skips it.
    pub fn is_ancestor_or_exact(&self, path: &str) -> bool {
        let path = path.trim_end_matches(self.separator);
        self.entries.iter().any(|entry| {
            entry == path
                || (entry.len() > path.len()
                    && entry.starts_with(path)
                    && entry[path.len()..].starts_with(self.separator))
        })
    }

    /// True only when `path` is itself an exclusion.
    pub fn is_exact_match(&self, path: &str) -> bool {
        let path = path.trim_end_matches(self.separator);
        self.entries.iter().any(|entry| entry == path)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Prefix accumulated while walking a tree: empty at the root, otherwise ending in the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativePath {
    prefix: String,
}

impl RelativePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Candidate path for an entry directly under this prefix.
    pub fn candidate(&self, name: &str) -> String {
        let mut candidate = self.prefix.clone();
        candidate.push_str(name);
        candidate
    }

    /// Prefix for the entries inside directory `name`.
    pub fn descend(&self, name: &str, separator: char) -> Self {
        let mut prefix = self.candidate(name);
        prefix.push(separator);
        Self { prefix }
    }
}
