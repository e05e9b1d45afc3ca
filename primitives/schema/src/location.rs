//! Source positions of schema elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::LocationPath;

/// Where an element was declared.
///
/// The `base_path:relative_path` pair doubles as the lookup key for files in
/// the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct RSElementLocation {
    /// Root the schema was loaded from.
    pub base_path: LocationPath,
    /// Path of the file relative to `base_path`.
    pub relative_path: LocationPath,
    /// One-based line, if known.
    pub line: Option<u32>,
    /// One-based column, if known.
    pub column: Option<u32>,
}

impl RSElementLocation {
    /// Location with no information attached.
    pub const UNKNOWN: Self = Self {
        base_path: LocationPath(String::new()),
        relative_path: LocationPath(String::new()),
        line: None,
        column: None,
    };

    /// Creates a file-level location.
    pub fn new(base_path: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            base_path: LocationPath::new(base_path),
            relative_path: LocationPath::new(relative_path),
            line: None,
            column: None,
        }
    }

    /// Returns a copy pointing at the given line and column.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Key identifying the file this location belongs to.
    pub fn file_key(&self) -> String { format!("{}:{}", self.base_path, self.relative_path) }
}

impl fmt::Display for RSElementLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base_path.is_blank() && self.relative_path.is_blank() {
            return f.write_str("unknown");
        }
        if !self.base_path.is_blank() {
            write!(f, "{}:", self.base_path)?;
        }
        if !self.relative_path.is_blank() {
            write!(f, "{}", self.relative_path)?;
        }
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(column) = self.column {
            write!(f, ":{}", column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RSElementLocation::UNKNOWN.to_string(), "unknown");
        assert_eq!(RSElementLocation::new("protos", "a/b.proto").to_string(), "protos:a/b.proto");
        assert_eq!(
            RSElementLocation::new("protos", "a/b.proto").at(3, 7).to_string(),
            "protos:a/b.proto:3:7"
        );
        assert_eq!(RSElementLocation::new("", "b.proto").to_string(), "b.proto");
    }

    #[test]
    fn test_file_key_ignores_position() {
        let plain = RSElementLocation::new("root", "x.proto");
        let positioned = plain.clone().at(10, 2);
        assert_eq!(plain.file_key(), positioned.file_key());
        assert_eq!(plain.file_key(), "root:x.proto");
    }
}
