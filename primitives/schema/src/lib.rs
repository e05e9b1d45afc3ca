#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! rrgen Schema Intermediate Representation (IR)
//!
//! This crate defines the language-neutral, post-parse representation of an
//! interface-definition schema: files, messages, enums, services, extend
//! blocks and the custom options applied to all of them. The IR is the
//! currency exchanged between the orchestrator and every plugin.
//!
//! All nodes are plain immutable value trees. Identity of types and services
//! is their [`RSDeclarationUrl`]; options reference the field that declares
//! them through an [`RSTypeMemberUrl`].
//!
//! The external schema loader hands the IR over as a JSON array of
//! [`RSFile`]s, see [`load_files`] and [`save_files`].

pub mod field;
pub mod file;
pub mod location;
pub mod option;
pub mod service;
pub mod types;
pub mod value;

use std::path::Path;

pub use field::{Namespaces, RSField, RSOneOf};
pub use file::RSFile;
pub use location::RSElementLocation;
pub use option::{RSOption, RSOptionValue, RSOptions};
pub use service::{RSRpc, RSService};
use thiserror::Error;
pub use types::{RSEnclosingType, RSEnum, RSEnumConstant, RSExtend, RSMessage, RSType};
pub use value::{
    Language, LocationPath, RSDeclarationUrl, RSFieldLabel, RSPackageName, RSTypeMemberUrl,
    StreamableRSTypeUrl,
};

/// Errors raised while reading or writing IR files.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// I/O error while accessing the file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The file does not contain a valid IR document.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias for schema I/O.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Load a list of IR files from a JSON document.
pub fn load_files(path: &Path) -> Result<Vec<RSFile>> {
    let content = std::fs::read_to_string(path)?;
    let files = serde_json::from_str(&content)?;
    Ok(files)
}

/// Save a list of IR files as a pretty-printed JSON document, creating parent
/// directories as needed.
pub fn save_files(path: &Path, files: &[RSFile]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(files)?;
    std::fs::write(path, content)?;
    Ok(())
}
