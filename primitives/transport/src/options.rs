//! Generation options: an ordered multimap of string keys to values.
//!
//! Plugin specific options are written as `<plugin>:<key>` and handed to
//! the plugin as `<key>` by [`GenerationOptions::scoped_for`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::{OptionDescriptor, OptionTypeKind};

/// A well-known option understood by the orchestrator itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOption {
    /// Key.
    pub name: &'static str,
    /// Help text.
    pub description: &'static str,
    /// Accepted values.
    pub kind: OptionTypeKind,
    /// Whether the option may be given more than once.
    pub is_repeatable: bool,
}

impl GenerationOption {
    /// Wire form of this option.
    pub fn descriptor(&self) -> OptionDescriptor {
        OptionDescriptor {
            name: self.name.to_string(),
            description: self.description.to_string(),
            is_repeatable: self.is_repeatable,
            kind: self.kind.clone(),
        }
    }
}

/// Options of one generation run, or of one plugin after scoping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationOptions {
    values: BTreeMap<String, Vec<String>>,
}

impl GenerationOptions {
    /// Schema sources to generate code for.
    pub const SOURCE_INPUT: GenerationOption = GenerationOption {
        name: "source_input",
        description: "Schema sources to generate code for.",
        kind: OptionTypeKind::Path,
        is_repeatable: true,
    };
    /// Schema sources only used to resolve references.
    pub const CONTEXT_INPUT: GenerationOption = GenerationOption {
        name: "context_input",
        description: "Schema sources used for resolution only; no code is generated for them.",
        kind: OptionTypeKind::Path,
        is_repeatable: true,
    };
    /// Whether packages may depend on each other cyclically.
    pub const PERMIT_PACKAGE_CYCLES: GenerationOption = GenerationOption {
        name: "permit_package_cycles",
        description: "Allow cyclic dependencies between packages.",
        kind: OptionTypeKind::Boolean,
        is_repeatable: false,
    };
    /// Root of all generated output. Every plugin receives its own
    /// subdirectory.
    pub const GEN_OUTPUT: GenerationOption = GenerationOption {
        name: "gen_output",
        description: "Directory for generated code. Each plugin writes to <gen_output>/<plugin name>.",
        kind: OptionTypeKind::Path,
        is_repeatable: false,
    };

    /// Descriptors of the options the orchestrator understands.
    pub fn base_options() -> Vec<OptionDescriptor> {
        [Self::SOURCE_INPUT, Self::CONTEXT_INPUT, Self::PERMIT_PACKAGE_CYCLES, Self::GEN_OUTPUT]
            .iter()
            .map(GenerationOption::descriptor)
            .collect()
    }

    /// Creates an empty set of options.
    pub fn new() -> Self { Self::default() }

    /// Replaces every value of `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Adds a value to `key`, keeping existing ones.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> { self.values.remove(key) }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Every value of `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// First value of `key` read as a boolean. Anything but `true` is false.
    pub fn get_bool(&self, key: &str) -> Option<bool> { self.get(key).map(|value| value == "true") }

    /// Whether `key` has at least one value.
    pub fn contains(&self, key: &str) -> bool { self.values.contains_key(key) }

    /// Number of keys.
    pub fn len(&self) -> usize { self.values.len() }

    /// Whether no option is set.
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Every key with its values, ordered by key.
    pub fn raw(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Output directory.
    pub fn gen_output(&self) -> Option<PathBuf> {
        self.get(Self::GEN_OUTPUT.name).map(PathBuf::from)
    }

    /// Sets the output directory.
    pub fn set_gen_output(&mut self, path: &Path) {
        self.set(Self::GEN_OUTPUT.name, path.to_string_lossy());
    }

    /// Whether cyclic package dependencies are allowed. Defaults to false.
    pub fn permit_package_cycles(&self) -> bool {
        self.get_bool(Self::PERMIT_PACKAGE_CYCLES.name).unwrap_or(false)
    }

    /// Schema sources to generate code for.
    pub fn source_inputs(&self) -> Vec<PathBuf> {
        self.get_all(Self::SOURCE_INPUT.name).iter().map(PathBuf::from).collect()
    }

    /// Schema sources used for resolution only.
    pub fn context_inputs(&self) -> Vec<PathBuf> {
        self.get_all(Self::CONTEXT_INPUT.name).iter().map(PathBuf::from).collect()
    }

    /// Options as seen by the plugin called `plugin_name`.
    ///
    /// Keys prefixed with `<plugin_name>:` are passed without the prefix.
    /// `permit_package_cycles` is passed through, and `gen_output` becomes
    /// `<gen_output>/<plugin_name>`. Other keys are not passed.
    pub fn scoped_for(&self, plugin_name: &str) -> GenerationOptions {
        let prefix = format!("{}:", plugin_name);
        let mut scoped = GenerationOptions::new();
        for (key, values) in &self.values {
            if let Some(stripped) = key.strip_prefix(&prefix) {
                if !stripped.is_empty() {
                    scoped.values.insert(stripped.to_string(), values.clone());
                }
            }
        }
        scoped.set(Self::PERMIT_PACKAGE_CYCLES.name, self.permit_package_cycles().to_string());
        if let Some(root) = self.gen_output() {
            scoped.set_gen_output(&root.join(plugin_name));
        }
        scoped
    }
}

impl FromIterator<(String, String)> for GenerationOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut options = GenerationOptions::new();
        for (key, value) in iter {
            options.append(key, value);
        }
        options
    }
}
