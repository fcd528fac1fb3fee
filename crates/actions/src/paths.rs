//! Entry path renaming
//!
//! Class and source entries live under a directory structure that mirrors
//! their package, so a package rename moves them. The roots
//! `WEB-INF/classes/` and `META-INF/versions/<n>/` are kept in place.

use jtrans_rules::SignatureRule;

const WEB_CLASSES: &str = "WEB-INF/classes/";
const VERSIONS: &str = "META-INF/versions/";

/// Split an entry path into its class root and the package relative rest
#[must_use]
pub fn split_root(path: &str) -> (&str, &str) {
    if let Some(rest) = path.strip_prefix(WEB_CLASSES) {
        return path.split_at(path.len() - rest.len());
    }
    if let Some(rest) = path.strip_prefix(VERSIONS) {
        if let Some((version, _)) = rest.split_once('/') {
            if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) {
                return path.split_at(VERSIONS.len() + version.len() + 1);
            }
        }
    }
    ("", path)
}

/// Renamed path of a file entry such as `a/b/Foo.class`
///
/// Only the directories are matched against package renames; the file name
/// itself is kept.
#[must_use]
pub fn rename_file_path(signature: &SignatureRule, path: &str) -> Option<String> {
    let (root, rest) = split_root(path);
    let (directory, file) = rest.rsplit_once('/')?;
    let matched = signature.replace_package_with(directory, '/')?;
    Some(format!("{root}{}/{file}", matched.replaced))
}

/// Renamed path of a directory entry such as `a/b/`
#[must_use]
pub fn rename_directory(signature: &SignatureRule, path: &str) -> Option<String> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let (root, rest) = split_root(trimmed);
    if rest.is_empty() {
        return None;
    }
    let matched = signature.replace_package_with(rest, '/')?;
    let slash = if path.ends_with('/') { "/" } else { "" };
    Some(format!("{root}{}{slash}", matched.replaced))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> SignatureRule {
        SignatureRule::builder()
            .renames([("a.b", "x.y")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_split_root() {
        assert_eq!(split_root("a/b/Foo.class"), ("", "a/b/Foo.class"));
        assert_eq!(
            split_root("WEB-INF/classes/a/b/Foo.class"),
            ("WEB-INF/classes/", "a/b/Foo.class")
        );
        assert_eq!(
            split_root("META-INF/versions/11/a/b/Foo.class"),
            ("META-INF/versions/11/", "a/b/Foo.class")
        );
        assert_eq!(
            split_root("META-INF/versions/x/Foo.class"),
            ("", "META-INF/versions/x/Foo.class")
        );
    }

    #[test]
    fn test_rename_file_path() {
        let rule = rule();
        assert_eq!(
            rename_file_path(&rule, "a/b/Foo.class").as_deref(),
            Some("x/y/Foo.class")
        );
        assert_eq!(
            rename_file_path(&rule, "a/b/c/Foo.class").as_deref(),
            Some("x/y/c/Foo.class")
        );
        assert_eq!(
            rename_file_path(&rule, "WEB-INF/classes/a/b/Foo.class").as_deref(),
            Some("WEB-INF/classes/x/y/Foo.class")
        );
        assert_eq!(rename_file_path(&rule, "a/bc/Foo.class"), None);
        assert_eq!(rename_file_path(&rule, "Foo.class"), None);
    }

    #[test]
    fn test_rename_directory() {
        let rule = rule();
        assert_eq!(rename_directory(&rule, "a/b/").as_deref(), Some("x/y/"));
        assert_eq!(rename_directory(&rule, "a/b/c/").as_deref(), Some("x/y/c/"));
        assert_eq!(rename_directory(&rule, "a/").as_deref(), None);
        assert_eq!(rename_directory(&rule, "WEB-INF/classes/"), None);
    }
}
