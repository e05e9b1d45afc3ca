//! Schema files, the roots of the IR tree.

use serde::{Deserialize, Serialize};

use crate::location::RSElementLocation;
use crate::option::{RSOptionValue, RSOptions};
use crate::service::RSService;
use crate::types::{RSExtend, RSType};
use crate::value::{Language, LocationPath, RSDeclarationUrl, RSPackageName, RSTypeMemberUrl};

/// One schema source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSFile {
    /// File name.
    pub name: String,
    /// Declared package. Generators should prefer
    /// [`RSFile::platform_package_name`].
    pub package_name: RSPackageName,
    /// File-level options.
    pub options: RSOptions,
    /// Declared services.
    pub services: Vec<RSService>,
    /// Top-level extend blocks.
    pub extends: Vec<RSExtend>,
    /// Where the file is located.
    pub location: RSElementLocation,
    /// Imported files.
    pub imports: Vec<LocationPath>,
    /// Top-level declarations.
    pub types: Vec<RSType>,
}

impl RSFile {
    /// `java_package` file option.
    pub const JAVA_PACKAGE: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FILE_OPTIONS, "java_package");
    /// `go_package` file option.
    pub const GO_PACKAGE: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FILE_OPTIONS, "go_package");
    /// `php_namespace` file option.
    pub const PHP_NAMESPACE: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FILE_OPTIONS, "php_namespace");
    /// `ruby_package` file option.
    pub const RUBY_PACKAGE: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FILE_OPTIONS, "ruby_package");
    /// `csharp_namespace` file option.
    pub const CSHARP_NAMESPACE: RSTypeMemberUrl =
        RSTypeMemberUrl::from_static(RSDeclarationUrl::FILE_OPTIONS, "csharp_namespace");

    /// Creates an empty file at `location`.
    pub fn new(name: impl Into<String>, location: RSElementLocation) -> Self {
        Self { name: name.into(), location, ..Self::default() }
    }

    /// Top-level declarations followed by every nested declaration, level by
    /// level.
    pub fn all_types(&self) -> Vec<&RSType> {
        let mut result = Vec::new();
        let mut level: Vec<&RSType> = self.types.iter().collect();
        while !level.is_empty() {
            let next: Vec<&RSType> = level.iter().copied().flat_map(RSType::nested_types).collect();
            result.extend(level);
            level = next;
        }
        result
    }

    /// Top-level extend blocks followed by those declared inside any type.
    pub fn all_extends(&self) -> Vec<&RSExtend> {
        let mut result: Vec<&RSExtend> = self.extends.iter().collect();
        for ty in self.all_types() {
            result.extend(ty.nested_extends());
        }
        result
    }

    /// Package name for `language`, taken from the matching file option and
    /// falling back to the declared package.
    pub fn platform_package_name(&self, language: Language) -> RSPackageName {
        let option = match language {
            Language::Java | Language::Kotlin => Some(Self::JAVA_PACKAGE),
            Language::Php => Some(Self::PHP_NAMESPACE),
            Language::CSharp => Some(Self::CSHARP_NAMESPACE),
            Language::Go => Some(Self::GO_PACKAGE),
            Language::Ruby => Some(Self::RUBY_PACKAGE),
            Language::Python => None,
        };
        option
            .and_then(|url| self.options.get(&url))
            .and_then(|option| option.value.as_ref())
            .and_then(RSOptionValue::as_raw)
            .map(RSPackageName::new)
            .unwrap_or_else(|| self.package_name.clone())
    }

    /// Service with the given name.
    pub fn find_service(&self, name: &str) -> Option<&RSService> {
        self.services.iter().find(|service| service.name == name)
    }
}
