#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Actions and dispatch for the jtrans rewriting engine
//!
//! Leaf actions rewrite a single artifact (class file, manifest, service
//! descriptor, source file). Container actions walk a directory tree or a zip
//! archive and hand every entry to the action selected for it by the
//! [`Composite`] dispatcher, then reassemble the output in entry order.

mod action;
mod composite;
mod container;
pub mod detect;
pub mod graph;
mod leaf;
pub mod paths;

pub use action::{Action, Applied, Rules};
pub use composite::Composite;
pub use leaf::classfile;
pub use leaf::headers;
