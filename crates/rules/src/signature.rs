//! Package, text and bundle identity rewriting

use jtrans_errors::ConfigError;
use jtrans_types::{BundleUpdate, ChangeKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};

static DOTTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)+")
        .expect("dotted name pattern is valid")
});

static SLASHED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(?:/[A-Za-z_$][A-Za-z0-9_$]*)+")
        .expect("slashed name pattern is valid")
});

/// Swap keys and values of a rename map
///
/// When several keys share a value the last key in sorted order wins.
#[must_use]
pub fn invert(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter().map(|(k, v)| (v.clone(), k.clone())).collect()
}

/// Result of a successful package lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMatch {
    /// The rename key that matched, in dotted form
    pub from: String,
    /// The package it was renamed to, in dotted form
    pub to: String,
    /// Full rewritten name, in the separator of the input
    pub replaced: String,
    /// Version token registered for the new package
    pub version: Option<String>,
}

/// A rewritten piece of text and the changes that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRewrite {
    pub text: String,
    pub changes: Vec<ChangeKind>,
}

/// Builder for [`SignatureRule`]
#[derive(Debug, Default)]
pub struct SignatureRuleBuilder {
    renames: BTreeMap<String, String>,
    versions: BTreeMap<String, String>,
    bundles: BTreeMap<String, BundleUpdate>,
    direct: BTreeMap<String, String>,
    invert: bool,
}

impl SignatureRuleBuilder {
    #[must_use]
    pub fn renames<I, K, V>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.renames = renames
            .into_iter()
            .map(|(k, v)| (strip_wildcard(k.into()), strip_wildcard(v.into())))
            .collect();
        self
    }

    #[must_use]
    pub fn versions<I, K, V>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.versions = versions
            .into_iter()
            .map(|(k, v)| (strip_wildcard(k.into()), v.into()))
            .collect();
        self
    }

    #[must_use]
    pub fn bundles<I, K>(mut self, bundles: I) -> Self
    where
        I: IntoIterator<Item = (K, BundleUpdate)>,
        K: Into<String>,
    {
        self.bundles = bundles.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    #[must_use]
    pub fn direct<I, K, V>(mut self, direct: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.direct = direct
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Resolve inversion and validate the rule maps
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RuleInconsistency`] for the first version key,
    /// in sorted order, that is not a value of the effective rename map.
    pub fn build(self) -> Result<SignatureRule, ConfigError> {
        let renames = if self.invert {
            info!(renames = self.renames.len(), "package renames inverted");
            invert(&self.renames)
        } else {
            self.renames
        };

        if let Some(key) = self
            .versions
            .keys()
            .find(|key| !renames.values().any(|value| value == *key))
        {
            return Err(ConfigError::RuleInconsistency { key: key.clone() });
        }

        let mut direct_order: Vec<String> = self.direct.keys().cloned().collect();
        direct_order.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        debug!(
            renames = renames.len(),
            versions = self.versions.len(),
            bundles = self.bundles.len(),
            direct = self.direct.len(),
            "signature rule built"
        );

        Ok(SignatureRule {
            renames,
            versions: self.versions,
            bundles: self.bundles,
            direct: self.direct,
            direct_order,
            inverted: self.invert,
        })
    }
}

/// Pattern based rewrite engine for symbolic text
///
/// Inversion is resolved when the rule is built, so `renames` is always the
/// effective map and lookups never consult the flag.
#[derive(Debug, Clone, Default)]
pub struct SignatureRule {
    renames: BTreeMap<String, String>,
    versions: BTreeMap<String, String>,
    bundles: BTreeMap<String, BundleUpdate>,
    direct: BTreeMap<String, String>,
    direct_order: Vec<String>,
    inverted: bool,
}

impl SignatureRule {
    #[must_use]
    pub fn builder() -> SignatureRuleBuilder {
        SignatureRuleBuilder::default()
    }

    /// Rename a dotted name by longest package prefix
    #[must_use]
    pub fn replace_package(&self, name: &str) -> Option<PackageMatch> {
        self.replace_package_with(name, '.')
    }

    /// Rename a name whose segments are joined by `separator`
    #[must_use]
    pub fn replace_package_with(&self, name: &str, separator: char) -> Option<PackageMatch> {
        if self.renames.is_empty() || name.is_empty() {
            return None;
        }

        // Longest candidate first: the whole name, then each shorter prefix.
        let mut end = name.len();
        loop {
            let candidate = &name[..end];
            let key = if separator == '.' {
                candidate.to_string()
            } else {
                candidate.replace(separator, ".")
            };
            if let Some(to) = self.renames.get(&key) {
                let prefix = if separator == '.' {
                    to.clone()
                } else {
                    to.replace('.', &separator.to_string())
                };
                return Some(PackageMatch {
                    replaced: format!("{prefix}{}", &name[end..]),
                    version: self.versions.get(to).cloned(),
                    from: key,
                    to: to.clone(),
                });
            }
            end = candidate.rfind(separator)?;
        }
    }

    /// Rewrite every package qualified name in a line, then apply direct
    /// string substitutions
    ///
    /// Both dotted (`a.b.C`) and slashed (`a/b/C`) names are recognised.
    #[must_use]
    pub fn replace_text(&self, text: &str) -> Option<TextRewrite> {
        let mut changes = Vec::new();
        let mut current = text.to_string();

        if !self.renames.is_empty() {
            for (pattern, separator) in [(&*DOTTED_NAME, '.'), (&*SLASHED_NAME, '/')] {
                if let Some(rewritten) = self.replace_names(&current, pattern, separator, &mut changes)
                {
                    current = rewritten;
                }
            }
        }

        if let Some(rewritten) = self.replace_direct(&current, &mut changes) {
            current = rewritten;
        }

        if changes.is_empty() {
            None
        } else {
            Some(TextRewrite {
                text: current,
                changes,
            })
        }
    }

    /// Bundle update for a symbolic name, falling back to the `*` entry
    #[must_use]
    pub fn bundle_update_for(&self, symbolic_name: &str) -> Option<&BundleUpdate> {
        self.bundles
            .get(symbolic_name)
            .or_else(|| self.bundles.get(BundleUpdate::WILDCARD_KEY))
    }

    /// Version token registered for a (renamed) package
    #[must_use]
    pub fn version_for(&self, package: &str) -> Option<&str> {
        self.versions.get(package).map(String::as_str)
    }

    #[must_use]
    pub fn renames(&self) -> &BTreeMap<String, String> {
        &self.renames
    }

    #[must_use]
    pub fn versions(&self) -> &BTreeMap<String, String> {
        &self.versions
    }

    #[must_use]
    pub fn bundles(&self) -> &BTreeMap<String, BundleUpdate> {
        &self.bundles
    }

    #[must_use]
    pub fn direct(&self) -> &BTreeMap<String, String> {
        &self.direct
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn replace_names(
        &self,
        text: &str,
        pattern: &Regex,
        separator: char,
        changes: &mut Vec<ChangeKind>,
    ) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut changed = false;

        for found in pattern.find_iter(text) {
            if text[..found.start()]
                .chars()
                .next_back()
                .is_some_and(is_identifier_char)
            {
                continue;
            }
            // A type descriptor such as `La/b/Foo;` carries its name after the `L`.
            let start = if separator == '/'
                && found.as_str().starts_with('L')
                && text[found.end()..].starts_with(';')
            {
                found.start() + 1
            } else {
                found.start()
            };
            if let Some(matched) =
                self.replace_package_with(&text[start..found.end()], separator)
            {
                out.push_str(&text[last..start]);
                out.push_str(&matched.replaced);
                last = found.end();
                changed = true;
                changes.push(ChangeKind::PackageRenamed {
                    from: matched.from,
                    to: matched.to,
                });
            }
        }

        if changed {
            out.push_str(&text[last..]);
            Some(out)
        } else {
            None
        }
    }

    /// Substitute direct strings in one left to right scan
    ///
    /// At each token start the keys are tried longest first. Emitted values
    /// are never scanned again, so one key cannot rewrite another's output.
    fn replace_direct(&self, text: &str, changes: &mut Vec<ChangeKind>) -> Option<String> {
        if self.direct.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(text.len());
        let mut applied: Vec<&str> = Vec::new();
        let mut pos = 0;
        let mut previous: Option<char> = None;

        while let Some(c) = text[pos..].chars().next() {
            if !previous.is_some_and(is_identifier_char) {
                if let Some((key, value)) = self.direct_match(&text[pos..]) {
                    out.push_str(value);
                    if !applied.contains(&key) {
                        applied.push(key);
                        changes.push(ChangeKind::DirectString {
                            from: key.to_string(),
                            to: value.to_string(),
                        });
                    }
                    pos += key.len();
                    previous = key.chars().next_back();
                    continue;
                }
            }
            out.push(c);
            pos += c.len_utf8();
            previous = Some(c);
        }

        if applied.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Longest direct key that is a whole token at the start of `rest`
    fn direct_match<'a>(&'a self, rest: &str) -> Option<(&'a str, &'a str)> {
        self.direct_order.iter().find_map(|key| {
            let tail = rest.strip_prefix(key.as_str())?;
            if tail.chars().next().is_some_and(is_identifier_char) {
                return None;
            }
            let value = self.direct.get(key)?;
            Some((key.as_str(), value.as_str()))
        })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn strip_wildcard(name: String) -> String {
    match name.strip_suffix(".*") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(renames: &[(&str, &str)]) -> SignatureRule {
        SignatureRule::builder()
            .renames(renames.iter().map(|(k, v)| (*k, *v)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_longest_prefix_wins() {
        let rule = rule(&[("a.b", "x"), ("a.b.c", "y")]);
        let matched = rule.replace_package("a.b.c.D").unwrap();
        assert_eq!(matched.from, "a.b.c");
        assert_eq!(matched.replaced, "y.D");

        let matched = rule.replace_package("a.b.E").unwrap();
        assert_eq!(matched.replaced, "x.E");
    }

    #[test]
    fn test_prefix_respects_segments() {
        let rule = rule(&[("a.b", "x.y")]);
        assert!(rule.replace_package("a.bc.D").is_none());
        assert!(rule.replace_package("z.a.b.D").is_none());
        assert_eq!(rule.replace_package("a.b").unwrap().replaced, "x.y");
    }

    #[test]
    fn test_slashed_names() {
        let rule = rule(&[("a.b", "x.y")]);
        let matched = rule.replace_package_with("a/b/Foo", '/').unwrap();
        assert_eq!(matched.replaced, "x/y/Foo");
        assert_eq!(matched.to, "x.y");
    }

    #[test]
    fn test_wildcard_keys_are_prefixes() {
        let rule = rule(&[("javax.servlet.*", "jakarta.servlet")]);
        assert_eq!(
            rule.replace_package("javax.servlet.http.HttpServlet")
                .unwrap()
                .replaced,
            "jakarta.servlet.http.HttpServlet"
        );
    }

    #[test]
    fn test_replace_text_header_value() {
        let rule = rule(&[("a.b", "x.y")]);
        let rewrite = rule.replace_text("Key: a.b.OldName").unwrap();
        assert_eq!(rewrite.text, "Key: x.y.OldName");
        assert_eq!(rewrite.changes.len(), 1);
    }

    #[test]
    fn test_replace_text_skips_embedded_names() {
        let rule = rule(&[("a.b", "x.y")]);
        assert!(rule.replace_text("za.b.C").is_none());
        assert!(rule.replace_text("nothing here").is_none());
    }

    #[test]
    fn test_replace_text_both_forms() {
        let rule = rule(&[("a.b", "x.y")]);
        let rewrite = rule.replace_text("a.b.Foo and a/b/Foo.class").unwrap();
        assert_eq!(rewrite.text, "x.y.Foo and x/y/Foo.class");
        assert_eq!(rewrite.changes.len(), 2);
    }

    #[test]
    fn test_direct_strings_whole_tokens() {
        let rule = SignatureRule::builder()
            .direct([("Old", "New")])
            .build()
            .unwrap();
        let rewrite = rule.replace_text("Old value, OldValue, (Old)").unwrap();
        assert_eq!(rewrite.text, "New value, OldValue, (New)");
        assert_eq!(rewrite.changes.len(), 1);
    }

    #[test]
    fn test_direct_strings_do_not_chain() {
        let rule = SignatureRule::builder()
            .direct([("Foo", "Ab"), ("Ab", "Z")])
            .build()
            .unwrap();
        let rewrite = rule.replace_text("Foo Ab").unwrap();
        assert_eq!(rewrite.text, "Ab Z");
        assert_eq!(rewrite.changes.len(), 2);
    }

    #[test]
    fn test_direct_strings_longest_key_first() {
        let rule = SignatureRule::builder()
            .direct([("Old", "New"), ("Old Name", "Fresh")])
            .build()
            .unwrap();
        let rewrite = rule.replace_text("Old Name, Old").unwrap();
        assert_eq!(rewrite.text, "Fresh, New");
    }

    #[test]
    fn test_replace_text_type_descriptors() {
        let rule = rule(&[("a.b", "x.y")]);
        let rewrite = rule.replace_text("La/b/Foo;").unwrap();
        assert_eq!(rewrite.text, "Lx/y/Foo;");

        let rewrite = rule.replace_text("(La/b/Foo;I)[La/b/Bar;").unwrap();
        assert_eq!(rewrite.text, "(Lx/y/Foo;I)[Lx/y/Bar;");
        assert!(rule.replace_text("La/b/Foo").is_none());
    }

    #[test]
    fn test_versions_must_target_renames() {
        let err = SignatureRule::builder()
            .renames([("a.b", "x.y")])
            .versions([("q.r", "1.0")])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::RuleInconsistency { key } if key == "q.r"));

        let ok = SignatureRule::builder()
            .renames([("a.b", "x.y")])
            .versions([("x.y", "[5.0,6)")])
            .build()
            .unwrap();
        assert_eq!(
            ok.replace_package("a.b.C").unwrap().version.as_deref(),
            Some("[5.0,6)")
        );
    }

    #[test]
    fn test_inversion() {
        let rule = SignatureRule::builder()
            .renames([("a.b", "x.y")])
            .invert(true)
            .build()
            .unwrap();
        assert!(rule.is_inverted());
        assert!(rule.replace_package("a.b.Foo").is_none());
        assert_eq!(rule.replace_package("x.y.Foo").unwrap().replaced, "a.b.Foo");
    }

    #[test]
    fn test_bundle_wildcard_fallback() {
        let exact = BundleUpdate::parse("com.old", "com.new,2,n,d").unwrap();
        let any = BundleUpdate::parse("*", "com.any,2,n,d").unwrap();
        let rule = SignatureRule::builder()
            .bundles([("com.old", exact.clone()), ("*", any.clone())])
            .build()
            .unwrap();
        assert_eq!(rule.bundle_update_for("com.old"), Some(&exact));
        assert_eq!(rule.bundle_update_for("com.other"), Some(&any));
    }
}
