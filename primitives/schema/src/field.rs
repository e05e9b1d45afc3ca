//! Message fields, extension fields and `oneof` groups.

use serde::{Deserialize, Serialize};

use crate::location::RSElementLocation;
use crate::option::RSOptions;
use crate::value::{RSDeclarationUrl, RSFieldLabel, RSPackageName};

/// A field of a message or of an extend block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSField {
    /// Field number, unique within the owning message.
    pub tag: i32,
    /// Field name as declared.
    pub name: String,
    /// Options applied to the field.
    pub options: RSOptions,
    /// Doc comment attached to the field.
    pub documentation: String,
    /// Type of the field.
    pub type_url: RSDeclarationUrl,
    /// Cardinality.
    pub label: RSFieldLabel,
    /// Declaration site.
    pub location: RSElementLocation,
    /// Whether the field is declared inside an `extend` block.
    pub is_extension: bool,
    /// For extensions: the declaring package followed by the simple names of
    /// the enclosing types.
    pub namespaces: Vec<String>,
}

/// Scope an extension field was declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// Declaring package.
    pub package_name: RSPackageName,
    /// Simple names of the enclosing types, outermost first.
    pub simple_names: Vec<String>,
}

impl RSField {
    /// Creates a singular field.
    pub fn new(tag: i32, name: impl Into<String>, type_url: RSDeclarationUrl) -> Self {
        Self { tag, name: name.into(), type_url, ..Self::default() }
    }

    /// Whether the field belongs to a `oneof` group.
    pub fn is_in_one_of(&self) -> bool { self.label == RSFieldLabel::OneOf }

    /// Whether the field is repeated.
    pub fn is_repeated(&self) -> bool { self.label == RSFieldLabel::Repeated }

    /// Declaring scope, only meaningful for extension fields.
    pub fn namespaces(&self) -> Option<Namespaces> {
        if !self.is_extension {
            return None;
        }
        let mut parts = self.namespaces.iter();
        let package_name = parts.next().map(RSPackageName::new).unwrap_or_default();
        Some(Namespaces { package_name, simple_names: parts.cloned().collect() })
    }

    /// Name qualified by the declaring package and enclosing types, e.g.
    /// `acme.Outer.timeout`. Plain fields return their name unchanged.
    pub fn proto_qualified_name(&self) -> String {
        let Some(namespaces) = self.namespaces() else {
            return self.name.clone();
        };
        let mut segments: Vec<&str> = Vec::with_capacity(namespaces.simple_names.len() + 2);
        if !namespaces.package_name.as_str().trim().is_empty() {
            segments.push(namespaces.package_name.as_str());
        }
        segments.extend(namespaces.simple_names.iter().map(String::as_str));
        segments.push(&self.name);
        segments.join(".")
    }
}

/// A group of mutually exclusive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSOneOf {
    /// Group name.
    pub name: String,
    /// Members of the group.
    pub fields: Vec<RSField>,
    /// Doc comment attached to the group.
    pub documentation: String,
    /// Options applied to the group.
    pub options: RSOptions,
    /// Declaration site.
    pub location: RSElementLocation,
}
