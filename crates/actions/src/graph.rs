//! Container to candidate action adjacency
//!
//! The table is static: for every container type it lists the action types
//! tried for a nested entry, in priority order. Every list ends with the
//! passthrough type, and no container lists itself.

use jtrans_types::ActionType;

use jtrans_types::ActionType::{
    Class, Directory, Ear, Feature, Jar, Java, Manifest, Null, Rar, ServiceConfig, War, Zip,
};

const DIRECTORY: &[ActionType] = &[
    Class,
    Java,
    ServiceConfig,
    Manifest,
    Feature,
    Jar,
    War,
    Rar,
    Ear,
    Zip,
    Null,
];

const JAR: &[ActionType] = &[Class, Java, ServiceConfig, Manifest, Feature, Null];

const WAR: &[ActionType] = &[Class, Java, ServiceConfig, Manifest, Feature, Jar, Null];

const RAR: &[ActionType] = WAR;

const EAR: &[ActionType] = &[Manifest, Jar, War, Rar, Null];

const ZIP: &[ActionType] = &[
    Class,
    Java,
    ServiceConfig,
    Manifest,
    Feature,
    Jar,
    War,
    Rar,
    Ear,
    Null,
];

/// Candidates for a top-level input, tried after the directory check
const ROOT: &[ActionType] = &[
    Class,
    Java,
    ServiceConfig,
    Manifest,
    Feature,
    Jar,
    War,
    Rar,
    Ear,
    Zip,
];

/// Ordered candidate types for entries of `container`
///
/// Leaf types have no entries and get an empty list.
#[must_use]
pub fn candidates(container: ActionType) -> &'static [ActionType] {
    match container {
        Directory => DIRECTORY,
        Jar => JAR,
        War => WAR,
        Rar => RAR,
        Ear => EAR,
        Zip => ZIP,
        Class | Java | ServiceConfig | Manifest | Feature | Null => &[],
    }
}

/// Candidate types for a top-level file
///
/// The passthrough is absent: an input nothing recognises is a dispatch error.
#[must_use]
pub fn root_candidates() -> &'static [ActionType] {
    ROOT
}

/// First candidate accepted by `predicate`
pub fn select_first<F>(candidates: &[ActionType], mut predicate: F) -> Option<ActionType>
where
    F: FnMut(ActionType) -> bool,
{
    candidates.iter().copied().find(|candidate| predicate(*candidate))
}
