//! Match predicates for every action type
//!
//! Detection looks only at the entry name and, where a format has one, the
//! leading magic bytes. The passthrough type accepts everything, which keeps
//! dispatch inside containers total.

use jtrans_types::ActionType;
use std::path::Path;

/// Magic bytes of a class file
pub const CLASS_MAGIC: &[u8] = &[0xCA, 0xFE, 0xBA, 0xBE];

/// Local file header of a zip archive
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// End of central directory record, the start of an empty zip archive
pub const EMPTY_ZIP_MAGIC: &[u8] = b"PK\x05\x06";

/// Directory holding service loader descriptors
pub const SERVICES_DIR: &str = "META-INF/services/";

/// File name of a bundle manifest
pub const MANIFEST_NAME: &str = "MANIFEST.MF";

/// Number of leading bytes read for content probes
pub const PROBE_LEN: usize = 4;

/// Whether `action_type` handles an artifact named `name`
///
/// `probe` holds the first bytes of the content when they are available.
/// Directories are never accepted here; the composite detects them from the
/// file system.
#[must_use]
pub fn accepts(action_type: ActionType, name: &str, probe: Option<&[u8]>) -> bool {
    match action_type {
        ActionType::Directory => false,
        ActionType::Class => {
            has_extension(name, "class") && probe.is_none_or(|p| p.starts_with(CLASS_MAGIC))
        }
        ActionType::Java => has_extension(name, "java"),
        ActionType::ServiceConfig => service_name(name).is_some(),
        ActionType::Manifest => is_bundle_manifest(name),
        ActionType::Feature => has_extension(name, "mf") && !is_bundle_manifest(name),
        ActionType::Jar => has_extension(name, "jar"),
        ActionType::War => has_extension(name, "war"),
        ActionType::Rar => has_extension(name, "rar"),
        ActionType::Ear => has_extension(name, "ear"),
        ActionType::Zip => {
            has_extension(name, "zip")
                || probe.is_some_and(|p| p.starts_with(ZIP_MAGIC) || p.starts_with(EMPTY_ZIP_MAGIC))
        }
        ActionType::Null => true,
    }
}

/// Whether `action_type` handles a top-level input at `path`
///
/// A top-level manifest has no enclosing `META-INF`, so it is recognised by
/// its file name alone.
#[must_use]
pub fn accepts_root(action_type: ActionType, path: &str, probe: Option<&[u8]>) -> bool {
    let bare_manifest = file_name(path).eq_ignore_ascii_case(MANIFEST_NAME);
    match action_type {
        ActionType::Manifest => bare_manifest,
        ActionType::Feature => has_extension(path, "mf") && !bare_manifest,
        other => accepts(other, path, probe),
    }
}

/// Whether an entry is the `META-INF/MANIFEST.MF` of its container
#[must_use]
pub fn is_bundle_manifest(name: &str) -> bool {
    let normalized = name.replace('\\', "/");
    let mut segments = normalized.rsplit('/');
    segments
        .next()
        .is_some_and(|file| file.eq_ignore_ascii_case(MANIFEST_NAME))
        && segments
            .next()
            .is_some_and(|parent| parent.eq_ignore_ascii_case("META-INF"))
}

/// Service interface name of a `META-INF/services/<name>` entry
#[must_use]
pub fn service_name(name: &str) -> Option<&str> {
    // Separators are single bytes, so offsets carry over to `name`.
    let normalized = name.replace('\\', "/");
    let start = normalized.find(SERVICES_DIR)? + SERVICES_DIR.len();
    let service = &name[start..];
    if service.is_empty() || service.contains(['/', '\\']) {
        None
    } else {
        Some(service)
    }
}

/// Last path segment of an entry name
#[must_use]
pub fn file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(file_name(name))
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
