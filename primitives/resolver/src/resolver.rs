//! Lookup over a set of schema files.
//!
//! Indexes are built lazily on first use and hold positions into the owned
//! file list, so a resolver is a plain value that can be cloned, merged and
//! moved across threads.

use std::collections::HashMap;
use std::sync::OnceLock;

use schema::{
    LocationPath, RSDeclarationUrl, RSElementLocation, RSExtend, RSField, RSFile, RSService, RSType,
    RSTypeMemberUrl,
};

use crate::{OptionsTarget, ResolverError};

/// Position of a type: owning file, then indexes through `types` and each
/// level of `nested_types`.
#[derive(Debug, Clone)]
struct TypePath {
    file: usize,
    path: Vec<usize>,
}

/// Position of an extend block, either top-level or nested in a type.
#[derive(Debug, Clone)]
struct ExtendPath {
    file: usize,
    owner: Option<Vec<usize>>,
    index: usize,
}

#[derive(Debug, Clone)]
enum FieldPath {
    Extension { extend: ExtendPath, field: usize },
    /// `field` indexes [`schema::RSMessage::all_fields`].
    Message { ty: TypePath, field: usize },
}

/// Read-only, indexed view over a list of schema files.
///
/// When two declarations share a url the one from the later file wins.
#[derive(Debug, Default)]
pub struct RSResolver {
    files: Vec<RSFile>,
    services: OnceLock<HashMap<RSDeclarationUrl, (usize, usize)>>,
    types: OnceLock<HashMap<RSDeclarationUrl, TypePath>>,
    fields: OnceLock<HashMap<RSTypeMemberUrl, FieldPath>>,
    files_by_location: OnceLock<HashMap<String, usize>>,
    extends_by_target: OnceLock<HashMap<RSDeclarationUrl, Vec<ExtendPath>>>,
}

impl Clone for RSResolver {
    fn clone(&self) -> Self { Self::new(self.files.clone()) }
}

impl PartialEq for RSResolver {
    fn eq(&self, other: &Self) -> bool { self.files == other.files }
}

impl From<Vec<RSFile>> for RSResolver {
    fn from(files: Vec<RSFile>) -> Self { Self::new(files) }
}

/// Walks a file's types breadth-first, yielding each type with its path.
fn walk_types(file: &RSFile) -> Vec<(Vec<usize>, &RSType)> {
    let mut result = Vec::new();
    let mut level: Vec<(Vec<usize>, &RSType)> =
        file.types.iter().enumerate().map(|(index, ty)| (vec![index], ty)).collect();
    while !level.is_empty() {
        let mut next = Vec::new();
        for (path, ty) in &level {
            for (index, nested) in ty.nested_types().iter().enumerate() {
                let mut nested_path = path.clone();
                nested_path.push(index);
                next.push((nested_path, nested));
            }
        }
        result.extend(level);
        level = next;
    }
    result
}

/// Walks a file's extend blocks in [`RSFile::all_extends`] order.
fn walk_extends(file: &RSFile) -> Vec<(Option<Vec<usize>>, usize, &RSExtend)> {
    let mut result: Vec<(Option<Vec<usize>>, usize, &RSExtend)> =
        file.extends.iter().enumerate().map(|(index, extend)| (None, index, extend)).collect();
    for (path, ty) in walk_types(file) {
        for (index, extend) in ty.nested_extends().iter().enumerate() {
            result.push((Some(path.clone()), index, extend));
        }
    }
    result
}

impl RSResolver {
    /// Creates a resolver over `files`. Nothing is indexed until the first
    /// lookup.
    pub fn new(files: Vec<RSFile>) -> Self { Self { files, ..Self::default() } }

    /// Combines several resolvers into one over the concatenation of their
    /// files.
    pub fn merge<'a>(resolvers: impl IntoIterator<Item = &'a RSResolver>) -> Self {
        Self::new(resolvers.into_iter().flat_map(|resolver| resolver.files.iter().cloned()).collect())
    }

    /// Every file, in input order.
    pub fn resolve_available_files(&self) -> &[RSFile] { &self.files }

    /// Consumes the resolver, returning its files.
    pub fn into_files(self) -> Vec<RSFile> { self.files }

    /// Service declared under `url`.
    pub fn resolve_service(&self, url: &RSDeclarationUrl) -> Option<&RSService> {
        let (file, index) = *self.service_index().get(url)?;
        self.files.get(file)?.services.get(index)
    }

    /// Type declared under `url`, at any nesting depth.
    pub fn resolve_type(&self, url: &RSDeclarationUrl) -> Option<&RSType> {
        self.type_at(self.type_index().get(url)?)
    }

    /// File declaring the type `url`.
    pub fn resolve_file_of(&self, url: &RSDeclarationUrl) -> Option<&RSFile> {
        self.files.get(self.type_index().get(url)?.file)
    }

    /// Field identified by `url`.
    ///
    /// Extension fields are keyed by the extended type and their
    /// package-qualified name, message fields by the owning message and their
    /// plain name.
    pub fn resolve_field(&self, url: &RSTypeMemberUrl) -> Option<&RSField> {
        match self.field_index().get(url)? {
            FieldPath::Extension { extend, field } => self.extend_at(extend)?.fields.get(*field),
            FieldPath::Message { ty, field } => {
                self.type_at(ty)?.as_message()?.all_fields().nth(*field)
            }
        }
    }

    /// File whose relative path equals `path`.
    pub fn resolve_file_at(&self, path: &LocationPath) -> Option<&RSFile> {
        self.files.iter().find(|file| file.location.relative_path == *path)
    }

    /// File located exactly at `location`.
    pub fn resolve_file_at_location(&self, location: &RSElementLocation) -> Option<&RSFile> {
        let index = *self.location_index().get(&location.file_key())?;
        self.files.get(index)
    }

    /// Every service, once per url, in file order.
    pub fn resolve_all_services(&self) -> Vec<&RSService> {
        let index = self.service_index();
        let mut result = Vec::new();
        for (file_index, file) in self.files.iter().enumerate() {
            for (service_index, service) in file.services.iter().enumerate() {
                if index.get(&service.type_url) == Some(&(file_index, service_index)) {
                    result.push(service);
                }
            }
        }
        result
    }

    /// Every type at any depth, once per url, in file order.
    pub fn resolve_all_types(&self) -> Vec<&RSType> {
        let index = self.type_index();
        let mut result = Vec::new();
        for (file_index, file) in self.files.iter().enumerate() {
            for (path, ty) in walk_types(file) {
                let winner = index
                    .get(ty.type_url())
                    .is_some_and(|found| found.file == file_index && found.path == path);
                if winner {
                    result.push(ty);
                }
            }
        }
        result
    }

    /// Every extend block of every file.
    pub fn resolve_all_extends(&self) -> Vec<&RSExtend> {
        self.files.iter().flat_map(RSFile::all_extends).collect()
    }

    /// Extend blocks targeting `url`.
    pub fn resolve_extends_of_type(&self, url: &RSDeclarationUrl) -> Vec<&RSExtend> {
        self.extends_index()
            .get(url)
            .map(|paths| paths.iter().filter_map(|path| self.extend_at(path)).collect())
            .unwrap_or_default()
    }

    /// Extend blocks adding options of the given kind.
    ///
    /// Only the option kinds a code generator reads are indexed: file,
    /// service and method options. Other targets are rejected.
    pub fn extends_of_kind(&self, target: OptionsTarget) -> Result<Vec<&RSExtend>, ResolverError> {
        let url = match target {
            OptionsTarget::File => RSDeclarationUrl::FILE_OPTIONS,
            OptionsTarget::Service => RSDeclarationUrl::SERVICE_OPTIONS,
            OptionsTarget::Method => RSDeclarationUrl::METHOD_OPTIONS,
            other => return Err(ResolverError::UnsupportedOptionsTarget(other)),
        };
        Ok(self.resolve_extends_of_type(&url))
    }

    fn type_at(&self, path: &TypePath) -> Option<&RSType> {
        let (first, rest) = path.path.split_first()?;
        let mut ty = self.files.get(path.file)?.types.get(*first)?;
        for index in rest {
            ty = ty.nested_types().get(*index)?;
        }
        Some(ty)
    }

    fn extend_at(&self, path: &ExtendPath) -> Option<&RSExtend> {
        match &path.owner {
            None => self.files.get(path.file)?.extends.get(path.index),
            Some(owner) => {
                let ty = self.type_at(&TypePath { file: path.file, path: owner.clone() })?;
                ty.nested_extends().get(path.index)
            }
        }
    }

    fn service_index(&self) -> &HashMap<RSDeclarationUrl, (usize, usize)> {
        self.services.get_or_init(|| {
            let mut index = HashMap::new();
            for (file_index, file) in self.files.iter().enumerate() {
                for (service_index, service) in file.services.iter().enumerate() {
                    index.insert(service.type_url.clone(), (file_index, service_index));
                }
            }
            index
        })
    }

    fn type_index(&self) -> &HashMap<RSDeclarationUrl, TypePath> {
        self.types.get_or_init(|| {
            let mut index = HashMap::new();
            for (file_index, file) in self.files.iter().enumerate() {
                for (path, ty) in walk_types(file) {
                    index.insert(ty.type_url().clone(), TypePath { file: file_index, path });
                }
            }
            index
        })
    }

    fn field_index(&self) -> &HashMap<RSTypeMemberUrl, FieldPath> {
        self.fields.get_or_init(|| {
            let mut index = HashMap::new();
            for (file_index, file) in self.files.iter().enumerate() {
                for (owner, extend_index, extend) in walk_extends(file) {
                    let extend_path = ExtendPath { file: file_index, owner, index: extend_index };
                    for (field_index, field) in extend.fields.iter().enumerate() {
                        index.insert(
                            RSTypeMemberUrl::new(extend.type_url.clone(), field.proto_qualified_name()),
                            FieldPath::Extension { extend: extend_path.clone(), field: field_index },
                        );
                    }
                }
                for (path, ty) in walk_types(file) {
                    let Some(message) = ty.as_message() else { continue };
                    for (field_index, field) in message.all_fields().enumerate() {
                        index.insert(
                            RSTypeMemberUrl::new(message.type_url.clone(), field.name.clone()),
                            FieldPath::Message {
                                ty: TypePath { file: file_index, path: path.clone() },
                                field: field_index,
                            },
                        );
                    }
                }
            }
            index
        })
    }

    fn location_index(&self) -> &HashMap<String, usize> {
        self.files_by_location.get_or_init(|| {
            self.files
                .iter()
                .enumerate()
                .map(|(index, file)| (file.location.file_key(), index))
                .collect()
        })
    }

    fn extends_index(&self) -> &HashMap<RSDeclarationUrl, Vec<ExtendPath>> {
        self.extends_by_target.get_or_init(|| {
            let mut index: HashMap<RSDeclarationUrl, Vec<ExtendPath>> = HashMap::new();
            for (file_index, file) in self.files.iter().enumerate() {
                for (owner, extend_index, extend) in walk_extends(file) {
                    index.entry(extend.type_url.clone()).or_default().push(ExtendPath {
                        file: file_index,
                        owner,
                        index: extend_index,
                    });
                }
            }
            index
        })
    }
}
