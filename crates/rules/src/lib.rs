#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Rewrite rules for jtrans
//!
//! Two read-only rule objects drive every action:
//! - [`SelectionRule`] decides whether a resource path takes part at all
//! - [`SignatureRule`] rewrites package names, text, versions and bundle
//!   identities
//!
//! Both are built once per run from already parsed rule maps and shared by
//! reference through the whole traversal.

pub mod selection;
pub mod signature;

pub use selection::{PathPattern, SelectionRule};
pub use signature::{invert, PackageMatch, SignatureRule, SignatureRuleBuilder, TextRewrite};
