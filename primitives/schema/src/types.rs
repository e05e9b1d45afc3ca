//! Named declarations: messages, enums and enclosing types, plus extend blocks.

use serde::{Deserialize, Serialize};

use crate::field::{RSField, RSOneOf};
use crate::location::RSElementLocation;
use crate::option::RSOptions;
use crate::value::RSDeclarationUrl;

/// A named declaration of a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RSType {
    /// `message` declaration.
    Message(RSMessage),
    /// `enum` declaration.
    Enum(RSEnum),
    /// Type that only exists to scope nested declarations.
    Enclosing(RSEnclosingType),
}

/// A `message` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSMessage {
    /// Simple name.
    pub name: String,
    /// Doc comment.
    pub documentation: String,
    /// Regular fields.
    pub fields: Vec<RSField>,
    /// `oneof` groups.
    pub one_ofs: Vec<RSOneOf>,
    /// Options applied to the message.
    pub options: RSOptions,
    /// Declaration url.
    pub type_url: RSDeclarationUrl,
    /// Extend blocks declared inside the message.
    pub nested_extends: Vec<RSExtend>,
    /// Declarations nested inside the message.
    pub nested_types: Vec<RSType>,
    /// Declaration site.
    pub location: RSElementLocation,
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSEnum {
    /// Simple name.
    pub name: String,
    /// Declared constants.
    pub constants: Vec<RSEnumConstant>,
    /// Doc comment.
    pub documentation: String,
    /// Options applied to the enum.
    pub options: RSOptions,
    /// Declaration url.
    pub type_url: RSDeclarationUrl,
    /// Extend blocks declared inside the enum.
    pub nested_extends: Vec<RSExtend>,
    /// Declarations nested inside the enum.
    pub nested_types: Vec<RSType>,
    /// Declaration site.
    pub location: RSElementLocation,
}

/// A declaration that only scopes nested types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSEnclosingType {
    /// Simple name.
    pub name: String,
    /// Doc comment.
    pub documentation: String,
    /// Declaration url.
    pub type_url: RSDeclarationUrl,
    /// Extend blocks declared inside the type.
    pub nested_extends: Vec<RSExtend>,
    /// Options applied to the type.
    pub options: RSOptions,
    /// Declaration site.
    pub location: RSElementLocation,
    /// Declarations nested inside the type.
    pub nested_types: Vec<RSType>,
}

/// One constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSEnumConstant {
    /// Constant name.
    pub name: String,
    /// Numeric value.
    pub tag: i32,
    /// Options applied to the constant.
    pub options: RSOptions,
    /// Doc comment.
    pub documentation: String,
    /// Declaration site.
    pub location: RSElementLocation,
}

/// An `extend` block adding fields to a well-known options type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSExtend {
    /// Extended type, e.g. `google.protobuf.MethodOptions`.
    pub type_url: RSDeclarationUrl,
    /// Name of the block.
    pub name: String,
    /// Declared extension fields.
    pub fields: Vec<RSField>,
    /// Doc comment.
    pub documentation: String,
    /// Declaration site.
    pub location: RSElementLocation,
}

impl RSType {
    /// Simple name.
    pub fn name(&self) -> &str {
        match self {
            RSType::Message(message) => &message.name,
            RSType::Enum(enumeration) => &enumeration.name,
            RSType::Enclosing(enclosing) => &enclosing.name,
        }
    }

    /// Declaration url.
    pub fn type_url(&self) -> &RSDeclarationUrl {
        match self {
            RSType::Message(message) => &message.type_url,
            RSType::Enum(enumeration) => &enumeration.type_url,
            RSType::Enclosing(enclosing) => &enclosing.type_url,
        }
    }

    /// Doc comment.
    pub fn documentation(&self) -> &str {
        match self {
            RSType::Message(message) => &message.documentation,
            RSType::Enum(enumeration) => &enumeration.documentation,
            RSType::Enclosing(enclosing) => &enclosing.documentation,
        }
    }

    /// Options applied to the declaration.
    pub fn options(&self) -> &RSOptions {
        match self {
            RSType::Message(message) => &message.options,
            RSType::Enum(enumeration) => &enumeration.options,
            RSType::Enclosing(enclosing) => &enclosing.options,
        }
    }

    /// Mutable access to the applied options.
    pub fn options_mut(&mut self) -> &mut RSOptions {
        match self {
            RSType::Message(message) => &mut message.options,
            RSType::Enum(enumeration) => &mut enumeration.options,
            RSType::Enclosing(enclosing) => &mut enclosing.options,
        }
    }

    /// Declaration site.
    pub fn location(&self) -> &RSElementLocation {
        match self {
            RSType::Message(message) => &message.location,
            RSType::Enum(enumeration) => &enumeration.location,
            RSType::Enclosing(enclosing) => &enclosing.location,
        }
    }

    /// Declarations nested one level below this one.
    pub fn nested_types(&self) -> &[RSType] {
        match self {
            RSType::Message(message) => &message.nested_types,
            RSType::Enum(enumeration) => &enumeration.nested_types,
            RSType::Enclosing(enclosing) => &enclosing.nested_types,
        }
    }

    /// Mutable access to the nested declarations.
    pub fn nested_types_mut(&mut self) -> &mut Vec<RSType> {
        match self {
            RSType::Message(message) => &mut message.nested_types,
            RSType::Enum(enumeration) => &mut enumeration.nested_types,
            RSType::Enclosing(enclosing) => &mut enclosing.nested_types,
        }
    }

    /// Extend blocks declared directly inside this declaration.
    pub fn nested_extends(&self) -> &[RSExtend] {
        match self {
            RSType::Message(message) => &message.nested_extends,
            RSType::Enum(enumeration) => &enumeration.nested_extends,
            RSType::Enclosing(enclosing) => &enclosing.nested_extends,
        }
    }

    /// Mutable access to the nested extend blocks.
    pub fn nested_extends_mut(&mut self) -> &mut Vec<RSExtend> {
        match self {
            RSType::Message(message) => &mut message.nested_extends,
            RSType::Enum(enumeration) => &mut enumeration.nested_extends,
            RSType::Enclosing(enclosing) => &mut enclosing.nested_extends,
        }
    }

    /// Every extend block declared in this declaration or any declaration
    /// nested below it.
    pub fn all_extends(&self) -> Vec<&RSExtend> {
        let mut result = Vec::new();
        let mut level: Vec<&RSType> = vec![self];
        while !level.is_empty() {
            let mut next = Vec::new();
            for ty in level {
                result.extend(ty.nested_extends());
                next.extend(ty.nested_types());
            }
            level = next;
        }
        result
    }

    /// The message payload, if this is a message.
    pub fn as_message(&self) -> Option<&RSMessage> {
        match self {
            RSType::Message(message) => Some(message),
            _ => None,
        }
    }

    /// The enum payload, if this is an enum.
    pub fn as_enum(&self) -> Option<&RSEnum> {
        match self {
            RSType::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }
}

impl RSMessage {
    /// Regular fields followed by the members of every `oneof` group.
    pub fn all_fields(&self) -> impl Iterator<Item = &RSField> {
        self.fields.iter().chain(self.one_ofs.iter().flat_map(|one_of| one_of.fields.iter()))
    }

    /// Field with the given number, looking into `oneof` groups as well.
    pub fn field_by_tag(&self, tag: i32) -> Option<&RSField> {
        self.all_fields().find(|field| field.tag == tag)
    }

    /// Field with the given name, looking into `oneof` groups as well.
    pub fn field_by_name(&self, name: &str) -> Option<&RSField> {
        self.all_fields().find(|field| field.name == name)
    }
}

impl From<RSMessage> for RSType {
    fn from(message: RSMessage) -> Self { RSType::Message(message) }
}

impl From<RSEnum> for RSType {
    fn from(enumeration: RSEnum) -> Self { RSType::Enum(enumeration) }
}

impl From<RSEnclosingType> for RSType {
    fn from(enclosing: RSEnclosingType) -> Self { RSType::Enclosing(enclosing) }
}
