//! Resource selection by include and exclude patterns

use std::fmt;
use tracing::debug;

/// A single selection pattern
///
/// `*` alone matches everything, a leading `*` matches by suffix, a trailing
/// `*` by prefix, both by substring. Anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl PathPattern {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "*" || raw == "**" {
            return Self::Any;
        }
        match (raw.strip_prefix('*'), raw.strip_suffix('*')) {
            (Some(rest), Some(_)) => Self::Contains(rest[..rest.len() - 1].to_string()),
            (Some(suffix), None) => Self::Suffix(suffix.to_string()),
            (None, Some(prefix)) => Self::Prefix(prefix.to_string()),
            (None, None) => Self::Exact(raw.to_string()),
        }
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
            Self::Contains(fragment) => path.contains(fragment.as_str()),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(exact) => write!(f, "{exact}"),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
            Self::Suffix(suffix) => write!(f, "*{suffix}"),
            Self::Contains(fragment) => write!(f, "*{fragment}*"),
        }
    }
}

/// Include and exclude sets of path patterns
#[derive(Debug, Clone, Default)]
pub struct SelectionRule {
    includes: Vec<PathPattern>,
    excludes: Vec<PathPattern>,
}

impl SelectionRule {
    pub fn new<I, E, S, T>(includes: I, excludes: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let includes: Vec<_> = includes
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect();
        let excludes: Vec<_> = excludes
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect();

        debug!(
            includes = includes.len(),
            excludes = excludes.len(),
            "selection rule built"
        );
        Self { includes, excludes }
    }

    /// Rule that selects every resource
    #[must_use]
    pub fn select_all() -> Self {
        Self::default()
    }

    /// Whether `path` takes part in transformation. Excludes always win.
    #[must_use]
    pub fn is_included(&self, path: &str) -> bool {
        let path = normalize(path);
        if self.excludes.iter().any(|p| p.matches(&path)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|p| p.matches(&path))
    }

    #[must_use]
    pub fn includes(&self) -> &[PathPattern] {
        &self.includes
    }

    #[must_use]
    pub fn excludes(&self) -> &[PathPattern] {
        &self.excludes
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}
