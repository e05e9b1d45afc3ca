//! Applied custom options and their values.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{RSDeclarationUrl, RSTypeMemberUrl};

/// Value of an applied option.
///
/// Message-typed options nest recursively through [`RSOptionValue::MessageMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RSOptionValue {
    /// Scalar or enum value in its textual form.
    Raw(String),
    /// Map-typed option with scalar keys and values.
    RawMap(Vec<(String, String)>),
    /// Message-typed option, keyed by the member each value belongs to.
    MessageMap(Vec<(RSTypeMemberUrl, RSOptionValue)>),
}

impl RSOptionValue {
    /// Text of a [`RSOptionValue::Raw`] value.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            RSOptionValue::Raw(value) => Some(value),
            _ => None,
        }
    }

    /// Copy without the message entries whose member is in `removed`, at any
    /// depth.
    pub fn without(&self, removed: &HashSet<RSTypeMemberUrl>) -> Self {
        match self {
            RSOptionValue::MessageMap(entries) => RSOptionValue::MessageMap(
                entries
                    .iter()
                    .filter(|(member, _)| !removed.contains(member))
                    .map(|(member, value)| (member.clone(), value.without(removed)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Strictly parsed boolean of a raw value (`"true"` / `"false"`).
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_raw()? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for RSOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RSOptionValue::Raw(value) => f.write_str(value),
            RSOptionValue::RawMap(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            RSOptionValue::MessageMap(entries) => {
                f.write_str("{")?;
                for (index, (member, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", member.member_name(), value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// One option applied to a schema element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSOption {
    /// Name as written in the schema.
    pub name: String,
    /// Field that declares the option.
    pub field_url: RSTypeMemberUrl,
    /// Applied value, absent when the option is only declared.
    pub value: Option<RSOptionValue>,
}

impl RSOption {
    /// `deprecated` on methods.
    pub const DEPRECATED: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::METHOD_OPTIONS, "deprecated");
    /// `retention` on fields.
    pub const RETENTION: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FIELD_OPTIONS, "retention");
    /// Marks a message as used only at generation time.
    pub const SOURCE_ONLY_MESSAGE: RSTypeMemberUrl = RSTypeMemberUrl::from_static(
        RSDeclarationUrl::MESSAGE_OPTIONS,
        "timemates.rrpc.internal.source_only_message",
    );
    /// Marks an enum as used only at generation time.
    pub const SOURCE_ONLY_ENUM: RSTypeMemberUrl = RSTypeMemberUrl::from_static(
        RSDeclarationUrl::ENUM_OPTIONS,
        "timemates.rrpc.internal.source_only_enum",
    );

    /// Creates an option.
    pub fn new(
        name: impl Into<String>,
        field_url: RSTypeMemberUrl,
        value: Option<RSOptionValue>,
    ) -> Self {
        Self { name: name.into(), field_url, value }
    }

    /// Shortcut for an option with a raw textual value.
    pub fn raw(name: impl Into<String>, field_url: RSTypeMemberUrl, value: &str) -> Self {
        Self::new(name, field_url, Some(RSOptionValue::Raw(value.to_string())))
    }
}

/// Ordered collection of options applied to one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RSOptions(Vec<RSOption>);

impl RSOptions {
    /// Collection with no options.
    pub const EMPTY: Self = Self(Vec::new());

    /// Wraps a list of options.
    pub fn new(options: Vec<RSOption>) -> Self { Self(options) }

    /// First option declared by `field_url`.
    pub fn get(&self, field_url: &RSTypeMemberUrl) -> Option<&RSOption> {
        self.0.iter().find(|option| &option.field_url == field_url)
    }

    /// Whether an option declared by `field_url` is applied.
    pub fn contains(&self, field_url: &RSTypeMemberUrl) -> bool { self.get(field_url).is_some() }

    /// Iterates over the options in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, RSOption> { self.0.iter() }

    /// Number of applied options.
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no option is applied.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Copy without the options whose declaring field is in `removed`.
    /// Message-typed values lose their entries for removed members.
    pub fn without(&self, removed: &HashSet<RSTypeMemberUrl>) -> Self {
        Self(
            self.0
                .iter()
                .filter(|option| !removed.contains(&option.field_url))
                .map(|option| RSOption {
                    value: option.value.as_ref().map(|value| value.without(removed)),
                    ..option.clone()
                })
                .collect(),
        )
    }

    /// Whether `deprecated = true` is applied.
    pub fn is_deprecated(&self) -> bool {
        self.raw_value(&RSOption::DEPRECATED).and_then(RSOptionValue::as_bool).unwrap_or(false)
    }

    /// Whether the element only exists at generation time and must not be
    /// emitted at runtime.
    pub fn is_source_only(&self) -> bool {
        self.raw_value(&RSOption::RETENTION).and_then(RSOptionValue::as_raw)
            == Some("RETENTION_SOURCE")
            || self.flag(&RSOption::SOURCE_ONLY_MESSAGE)
            || self.flag(&RSOption::SOURCE_ONLY_ENUM)
    }

    /// Whether the element is retained at runtime.
    pub fn is_retention_runtime(&self) -> bool {
        self.raw_value(&RSOption::RETENTION).and_then(RSOptionValue::as_raw)
            != Some("RETENTION_SOURCE")
    }

    fn raw_value(&self, field_url: &RSTypeMemberUrl) -> Option<&RSOptionValue> {
        self.get(field_url).and_then(|option| option.value.as_ref())
    }

    fn flag(&self, field_url: &RSTypeMemberUrl) -> bool {
        self.raw_value(field_url).map(|value| value.to_string() == "true").unwrap_or(false)
    }
}

impl From<Vec<RSOption>> for RSOptions {
    fn from(options: Vec<RSOption>) -> Self { Self(options) }
}

impl<'a> IntoIterator for &'a RSOptions {
    type Item = &'a RSOption;
    type IntoIter = std::slice::Iter<'a, RSOption>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(member: &str) -> RSTypeMemberUrl {
        RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, member)
    }

    #[test]
    fn test_get_and_contains() {
        let options = RSOptions::new(vec![
            RSOption::raw("deprecated", RSOption::DEPRECATED, "true"),
            RSOption::raw("acme.timeout", custom("acme.timeout"), "30"),
        ]);
        assert!(options.contains(&custom("acme.timeout")));
        assert_eq!(
            options.get(&custom("acme.timeout")).and_then(|o| o.value.as_ref()),
            Some(&RSOptionValue::Raw("30".to_string()))
        );
        assert!(!options.contains(&custom("acme.retries")));
        assert!(options.is_deprecated());
    }

    #[test]
    fn test_deprecated_requires_strict_true() {
        let options = RSOptions::new(vec![RSOption::raw("deprecated", RSOption::DEPRECATED, "yes")]);
        assert!(!options.is_deprecated());
        assert!(!RSOptions::EMPTY.is_deprecated());
    }

    #[test]
    fn test_source_only() {
        let retention =
            RSOptions::new(vec![RSOption::raw("retention", RSOption::RETENTION, "RETENTION_SOURCE")]);
        assert!(retention.is_source_only());
        assert!(!retention.is_retention_runtime());

        let message_marker = RSOptions::new(vec![RSOption::raw(
            "source_only_message",
            RSOption::SOURCE_ONLY_MESSAGE,
            "true",
        )]);
        assert!(message_marker.is_source_only());
        assert!(message_marker.is_retention_runtime());

        assert!(!RSOptions::EMPTY.is_source_only());
    }

    #[test]
    fn test_without() {
        let options = RSOptions::new(vec![
            RSOption::raw("a", custom("a"), "1"),
            RSOption::raw("b", custom("b"), "2"),
        ]);
        let removed: HashSet<_> = [custom("a")].into_iter().collect();
        let filtered = options.without(&removed);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains(&custom("b")));
        // the original collection is untouched
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_without_prunes_message_entries() {
        let value = RSOptionValue::MessageMap(vec![
            (custom("kept"), RSOptionValue::MessageMap(vec![(custom("gone"), RSOptionValue::Raw("x".to_string()))])),
            (custom("gone"), RSOptionValue::Raw("y".to_string())),
        ]);
        let options = RSOptions::new(vec![RSOption::new("acme.limits", custom("acme.limits"), Some(value))]);
        let removed: HashSet<_> = [custom("gone")].into_iter().collect();

        let filtered = options.without(&removed);
        assert_eq!(
            filtered.get(&custom("acme.limits")).and_then(|option| option.value.clone()),
            Some(RSOptionValue::MessageMap(vec![(custom("kept"), RSOptionValue::MessageMap(Vec::new()))]))
        );
    }

    #[test]
    fn test_nested_value_display() {
        let value = RSOptionValue::MessageMap(vec![
            (custom("limit"), RSOptionValue::Raw("5".to_string())),
            (
                custom("labels"),
                RSOptionValue::RawMap(vec![("k".to_string(), "v".to_string())]),
            ),
        ]);
        assert_eq!(value.to_string(), "{limit: 5, labels: {k: v}}");
    }
}
