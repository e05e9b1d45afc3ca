//! Plugin option descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type accepted by an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionTypeKind {
    /// Free text.
    Text,
    /// `true` or `false`.
    Boolean,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Filesystem path.
    Path,
    /// One of a fixed set of values.
    Choice(Vec<String>),
}

impl OptionTypeKind {
    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            OptionTypeKind::Text | OptionTypeKind::Path => true,
            OptionTypeKind::Boolean => matches!(value, "true" | "false"),
            OptionTypeKind::Int => value.parse::<i32>().is_ok(),
            OptionTypeKind::Long => value.parse::<i64>().is_ok(),
            OptionTypeKind::Float => value.parse::<f32>().is_ok(),
            OptionTypeKind::Double => value.parse::<f64>().is_ok(),
            OptionTypeKind::Choice(variants) => variants.iter().any(|variant| variant == value),
        }
    }
}

impl fmt::Display for OptionTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionTypeKind::Text => f.write_str("text"),
            OptionTypeKind::Boolean => f.write_str("boolean"),
            OptionTypeKind::Int => f.write_str("int"),
            OptionTypeKind::Long => f.write_str("long"),
            OptionTypeKind::Float => f.write_str("float"),
            OptionTypeKind::Double => f.write_str("double"),
            OptionTypeKind::Path => f.write_str("path"),
            OptionTypeKind::Choice(variants) => write!(f, "one of [{}]", variants.join(", ")),
        }
    }
}

/// Describes one option a plugin understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionDescriptor {
    /// Option key, without the plugin prefix.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Whether the option may be given more than once.
    pub is_repeatable: bool,
    /// Accepted values.
    pub kind: OptionTypeKind,
}

impl OptionDescriptor {
    /// Creates a single-valued option.
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionTypeKind) -> Self {
        Self { name: name.into(), description: description.into(), is_repeatable: false, kind }
    }

    /// Marks the option as repeatable.
    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }
}

impl fmt::Display for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.kind)?;
        if self.is_repeatable {
            f.write_str(" (repeatable)")?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}
