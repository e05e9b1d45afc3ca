//! Value objects used as identities and references across the schema tree.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identity of a type: a scalar keyword (`int32`), a synthetic map
/// encoding (`map<string, int32>`) or a fully qualified url
/// (`type.googleapis.com/package.Name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RSDeclarationUrl(Cow<'static, str>);

impl RSDeclarationUrl {
    /// Placeholder for nodes whose declaration is not known.
    pub const UNKNOWN: Self = Self::from_static("unknown");

    /// `int32` scalar.
    pub const INT32: Self = Self::from_static("int32");
    /// `int64` scalar.
    pub const INT64: Self = Self::from_static("int64");
    /// `sint32` scalar.
    pub const SINT32: Self = Self::from_static("sint32");
    /// `sint64` scalar.
    pub const SINT64: Self = Self::from_static("sint64");
    /// `uint32` scalar.
    pub const UINT32: Self = Self::from_static("uint32");
    /// `uint64` scalar.
    pub const UINT64: Self = Self::from_static("uint64");
    /// `fixed32` scalar.
    pub const FIXED32: Self = Self::from_static("fixed32");
    /// `fixed64` scalar.
    pub const FIXED64: Self = Self::from_static("fixed64");
    /// `sfixed32` scalar.
    pub const SFIXED32: Self = Self::from_static("sfixed32");
    /// `sfixed64` scalar.
    pub const SFIXED64: Self = Self::from_static("sfixed64");
    /// `bool` scalar.
    pub const BOOL: Self = Self::from_static("bool");
    /// `string` scalar.
    pub const STRING: Self = Self::from_static("string");
    /// `bytes` scalar.
    pub const BYTES: Self = Self::from_static("bytes");
    /// `float` scalar.
    pub const FLOAT: Self = Self::from_static("float");
    /// `double` scalar.
    pub const DOUBLE: Self = Self::from_static("double");

    /// `google.protobuf.Any`.
    pub const ANY: Self = Self::from_static("type.googleapis.com/google.protobuf.Any");
    /// `google.protobuf.Timestamp`.
    pub const TIMESTAMP: Self = Self::from_static("type.googleapis.com/google.protobuf.Timestamp");
    /// `google.protobuf.Duration`.
    pub const DURATION: Self = Self::from_static("type.googleapis.com/google.protobuf.Duration");
    /// `google.protobuf.Empty`.
    pub const EMPTY: Self = Self::from_static("type.googleapis.com/google.protobuf.Empty");
    /// `google.protobuf.Struct`.
    pub const STRUCT: Self = Self::from_static("type.googleapis.com/google.protobuf.Struct");
    /// `google.protobuf.Value`.
    pub const STRUCT_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.Value");
    /// `google.protobuf.NullValue`.
    pub const STRUCT_NULL: Self = Self::from_static("type.googleapis.com/google.protobuf.NullValue");
    /// `google.protobuf.ListValue`.
    pub const STRUCT_LIST: Self = Self::from_static("type.googleapis.com/google.protobuf.ListValue");

    /// `google.protobuf.DoubleValue`.
    pub const DOUBLE_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.DoubleValue");
    /// `google.protobuf.FloatValue`.
    pub const FLOAT_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.FloatValue");
    /// `google.protobuf.Int32Value`.
    pub const INT32_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.Int32Value");
    /// `google.protobuf.Int64Value`.
    pub const INT64_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.Int64Value");
    /// `google.protobuf.UInt32Value`.
    pub const UINT32_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.UInt32Value");
    /// `google.protobuf.UInt64Value`.
    pub const UINT64_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.UInt64Value");
    /// `google.protobuf.StringValue`.
    pub const STRING_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.StringValue");
    /// `google.protobuf.BytesValue`.
    pub const BYTES_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.BytesValue");
    /// `google.protobuf.BoolValue`.
    pub const BOOL_VALUE: Self = Self::from_static("type.googleapis.com/google.protobuf.BoolValue");

    /// Marker type used by rpcs that carry no payload in one direction.
    pub const ACK: Self = Self::from_static("type.googleapis.com/timemates.rrpc.Ack");

    /// `google.protobuf.FileOptions`.
    pub const FILE_OPTIONS: Self = Self::from_static("type.googleapis.com/google.protobuf.FileOptions");
    /// `google.protobuf.MessageOptions`.
    pub const MESSAGE_OPTIONS: Self =
        Self::from_static("type.googleapis.com/google.protobuf.MessageOptions");
    /// `google.protobuf.ServiceOptions`.
    pub const SERVICE_OPTIONS: Self =
        Self::from_static("type.googleapis.com/google.protobuf.ServiceOptions");
    /// `google.protobuf.FieldOptions`.
    pub const FIELD_OPTIONS: Self = Self::from_static("type.googleapis.com/google.protobuf.FieldOptions");
    /// `google.protobuf.OneofOptions`.
    pub const ONEOF_OPTIONS: Self = Self::from_static("type.googleapis.com/google.protobuf.OneofOptions");
    /// `google.protobuf.EnumOptions`.
    pub const ENUM_OPTIONS: Self = Self::from_static("type.googleapis.com/google.protobuf.EnumOptions");
    /// `google.protobuf.EnumValueOptions`.
    pub const ENUM_VALUE_OPTIONS: Self =
        Self::from_static("type.googleapis.com/google.protobuf.EnumValueOptions");
    /// `google.protobuf.MethodOptions`.
    pub const METHOD_OPTIONS: Self =
        Self::from_static("type.googleapis.com/google.protobuf.MethodOptions");
    /// `google.protobuf.ExtensionRangeOptions`.
    pub const EXTENSION_RANGE_OPTIONS: Self =
        Self::from_static("type.googleapis.com/google.protobuf.ExtensionRangeOptions");

    const SCALARS: [Self; 15] = [
        Self::INT32,
        Self::INT64,
        Self::SINT32,
        Self::SINT64,
        Self::UINT32,
        Self::UINT64,
        Self::FIXED32,
        Self::FIXED64,
        Self::SFIXED32,
        Self::SFIXED64,
        Self::BOOL,
        Self::STRING,
        Self::BYTES,
        Self::FLOAT,
        Self::DOUBLE,
    ];

    const WRAPPERS: [Self; 9] = [
        Self::DOUBLE_VALUE,
        Self::FLOAT_VALUE,
        Self::INT32_VALUE,
        Self::INT64_VALUE,
        Self::UINT32_VALUE,
        Self::UINT64_VALUE,
        Self::STRING_VALUE,
        Self::BYTES_VALUE,
        Self::BOOL_VALUE,
    ];

    const GOOGLE_BUILTINS: [Self; 8] = [
        Self::ANY,
        Self::TIMESTAMP,
        Self::DURATION,
        Self::EMPTY,
        Self::STRUCT,
        Self::STRUCT_VALUE,
        Self::STRUCT_NULL,
        Self::STRUCT_LIST,
    ];

    /// Creates a url from any string.
    pub fn new(value: impl Into<String>) -> Self { Self(Cow::Owned(value.into())) }

    /// Creates a url from a static string without allocating.
    pub const fn from_static(value: &'static str) -> Self { Self(Cow::Borrowed(value)) }

    /// Builds the synthetic `map<K, V>` url.
    pub fn of_map(key: &RSDeclarationUrl, value: &RSDeclarationUrl) -> Self {
        Self::new(format!("map<{}, {}>", key.as_str(), value.as_str()))
    }

    /// Raw string form of the url.
    pub fn as_str(&self) -> &str { &self.0 }

    /// Whether the url names a scalar keyword.
    pub fn is_scalar(&self) -> bool { Self::SCALARS.contains(self) }

    /// Whether the url names one of the `google.protobuf.*Value` wrappers.
    pub fn is_wrapper(&self) -> bool { Self::WRAPPERS.contains(self) }

    /// Whether the url names a well-known `google.protobuf` type.
    pub fn is_google_builtin(&self) -> bool { Self::GOOGLE_BUILTINS.contains(self) }

    /// Whether the url is a synthetic map encoding.
    pub fn is_map(&self) -> bool { self.0.starts_with("map<") }

    /// Key type of a map url.
    pub fn first_type_argument(&self) -> Option<RSDeclarationUrl> {
        if !self.is_map() {
            return None;
        }
        let inner = self.0.strip_prefix("map<")?;
        let (key, _) = inner.split_once(',')?;
        Some(Self::new(key.trim()))
    }

    /// Value type of a map url.
    pub fn second_type_argument(&self) -> Option<RSDeclarationUrl> {
        if !self.is_map() {
            return None;
        }
        let (_, rest) = self.0.split_once(',')?;
        let value = rest.strip_suffix('>').unwrap_or(rest);
        Some(Self::new(value.trim()))
    }

    /// Last segment of the url, e.g. `Name` for `type.googleapis.com/pkg.Outer.Name`.
    pub fn simple_name(&self) -> &str {
        let tail = self.0.rsplit('/').next().unwrap_or(&self.0);
        tail.rsplit('.').next().unwrap_or(tail)
    }

    /// Everything between the scheme and the simple name: the package, or the
    /// enclosing type for nested declarations.
    pub fn enclosing_type_or_package(&self) -> Option<&str> {
        let tail = self.0.rsplit('/').next().unwrap_or(&self.0);
        tail.rfind('.').map(|dot| &tail[..dot])
    }
}

impl Default for RSDeclarationUrl {
    fn default() -> Self { Self::UNKNOWN }
}

impl fmt::Display for RSDeclarationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for RSDeclarationUrl {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for RSDeclarationUrl {
    fn from(value: String) -> Self { Self::new(value) }
}

/// Reference to one member (field) of a declaration: `typeUrl#member`.
///
/// Applied options point at the extension field that declares them through
/// this url.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct RSTypeMemberUrl {
    type_url: RSDeclarationUrl,
    member_name: Cow<'static, str>,
}

impl RSTypeMemberUrl {
    /// Creates a member url.
    pub fn new(type_url: RSDeclarationUrl, member_name: impl Into<String>) -> Self {
        Self { type_url, member_name: Cow::Owned(member_name.into()) }
    }

    /// Creates a member url from static parts.
    pub const fn from_static(type_url: RSDeclarationUrl, member_name: &'static str) -> Self {
        Self { type_url, member_name: Cow::Borrowed(member_name) }
    }

    /// Url of the declaring type.
    pub fn type_url(&self) -> &RSDeclarationUrl { &self.type_url }

    /// Name of the member within the declaring type.
    pub fn member_name(&self) -> &str { &self.member_name }
}

impl fmt::Display for RSTypeMemberUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_url, self.member_name)
    }
}

/// Package declared by a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RSPackageName(pub String);

impl RSPackageName {
    /// Creates a package name.
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    /// Raw string form.
    pub fn as_str(&self) -> &str { &self.0 }

    /// Whether no package was declared.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for RSPackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A slash-separated path as written by the schema loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LocationPath(pub String);

impl LocationPath {
    /// Creates a path.
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    /// Raw string form.
    pub fn as_str(&self) -> &str { &self.0 }

    /// Whether the path is empty or whitespace only.
    pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RSFieldLabel {
    /// Singular field.
    #[default]
    None,
    /// Member of a `oneof` group.
    OneOf,
    /// Repeated field.
    Repeated,
}

/// Request or response type of an rpc, possibly streamed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct StreamableRSTypeUrl {
    /// Whether values are streamed.
    pub is_streaming: bool,
    /// Transferred type.
    pub type_url: RSDeclarationUrl,
}

impl StreamableRSTypeUrl {
    /// Single (non-streamed) value of the given type.
    pub fn single(type_url: RSDeclarationUrl) -> Self { Self { is_streaming: false, type_url } }

    /// Stream of values of the given type.
    pub fn stream(type_url: RSDeclarationUrl) -> Self { Self { is_streaming: true, type_url } }
}

/// Target languages with their own naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Java.
    Java,
    /// Kotlin.
    Kotlin,
    /// PHP.
    Php,
    /// C#.
    CSharp,
    /// Python.
    Python,
    /// Go.
    Go,
    /// Ruby.
    Ruby,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_builtin_classification() {
        assert!(RSDeclarationUrl::new("int32").is_scalar());
        assert!(RSDeclarationUrl::STRING.is_scalar());
        assert!(!RSDeclarationUrl::ANY.is_scalar());
        assert!(RSDeclarationUrl::ANY.is_google_builtin());
        assert!(RSDeclarationUrl::BOOL_VALUE.is_wrapper());
        assert!(!RSDeclarationUrl::new("type.googleapis.com/foo.Bar").is_wrapper());
    }

    #[test]
    fn test_map_type_arguments() {
        let url = RSDeclarationUrl::of_map(
            &RSDeclarationUrl::STRING,
            &RSDeclarationUrl::new("type.googleapis.com/foo.Bar"),
        );
        assert_eq!(url.as_str(), "map<string, type.googleapis.com/foo.Bar>");
        assert!(url.is_map());
        assert_eq!(url.first_type_argument(), Some(RSDeclarationUrl::STRING));
        assert_eq!(
            url.second_type_argument(),
            Some(RSDeclarationUrl::new("type.googleapis.com/foo.Bar"))
        );
        assert_eq!(RSDeclarationUrl::INT32.first_type_argument(), None);
    }

    #[test]
    fn test_names() {
        let url = RSDeclarationUrl::new("type.googleapis.com/foo.bar.Outer.Inner");
        assert_eq!(url.simple_name(), "Inner");
        assert_eq!(url.enclosing_type_or_package(), Some("foo.bar.Outer"));

        let top = RSDeclarationUrl::new("type.googleapis.com/Root");
        assert_eq!(top.simple_name(), "Root");
        assert_eq!(top.enclosing_type_or_package(), None);
    }

    #[test]
    fn test_static_and_owned_urls_are_equal() {
        let owned = RSDeclarationUrl::new("type.googleapis.com/timemates.rrpc.Ack");
        assert_eq!(owned, RSDeclarationUrl::ACK);

        let mut set = std::collections::HashSet::new();
        set.insert(RSTypeMemberUrl::from_static(RSDeclarationUrl::METHOD_OPTIONS, "deprecated"));
        assert!(set.contains(&RSTypeMemberUrl::new(
            RSDeclarationUrl::new("type.googleapis.com/google.protobuf.MethodOptions"),
            "deprecated"
        )));
    }

    #[test]
    fn test_member_url_display() {
        let url = RSTypeMemberUrl::new(RSDeclarationUrl::new("type.googleapis.com/a.B"), "c");
        assert_eq!(url.to_string(), "type.googleapis.com/a.B#c");
    }
}
