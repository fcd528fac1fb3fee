//! Leaf actions: rewrite one artifact without recursion

mod class;
pub mod classfile;
pub mod headers;
mod java;
mod manifest;
mod null;
mod service;

pub use class::ClassAction;
pub use java::JavaAction;
pub use manifest::ManifestAction;
pub use null::NullAction;
pub use service::ServiceConfigAction;

use jtrans_errors::TransformError;

/// Decode text content or fail with an encoding error naming the entry
pub(crate) fn decode_text<'a>(name: &str, input: &'a [u8]) -> Result<&'a str, TransformError> {
    std::str::from_utf8(input).map_err(|e| TransformError::Encoding {
        path: name.to_string(),
        message: e.to_string(),
    })
}
