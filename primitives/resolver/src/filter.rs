//! Visitor-driven pruning.
//!
//! Pruning runs in two passes. The first rebuilds the tree keeping only what
//! the visitor accepts and records every field that disappeared, keyed by
//! the URL of its owning message or extend target. The second strips
//! options, and message-typed option entries, that reference a recorded
//! field, so no surviving node references a removed member.

use std::collections::HashSet;

use schema::{
    RSDeclarationUrl, RSEnclosingType, RSEnum, RSExtend, RSField, RSFile, RSMessage, RSOneOf, RSService, RSType,
    RSTypeMemberUrl,
};
use tracing::debug;

use crate::visitor::Visitor;
use crate::RSResolver;

type Removed = HashSet<RSTypeMemberUrl>;

impl RSResolver {
    /// New resolver holding only the nodes `visitor` accepts.
    ///
    /// A rejected node takes its whole subtree with it. Options referencing
    /// a removed field are dropped from every surviving node. A visitor accepting everything returns an equal
    /// resolver.
    pub fn filter(&self, visitor: &mut dyn Visitor<(), bool>) -> RSResolver {
        let mut removed = Removed::new();
        let files: Vec<RSFile> = self
            .resolve_available_files()
            .iter()
            .filter_map(|file| filter_file(file, visitor, &mut removed))
            .collect();

        if removed.is_empty() {
            return RSResolver::new(files);
        }
        debug!(removed = removed.len(), "Stripping options of removed fields");
        RSResolver::new(files.into_iter().map(|file| strip_file(file, &removed)).collect())
    }
}

fn record_field(owner: &RSDeclarationUrl, field: &RSField, removed: &mut Removed) {
    removed.insert(RSTypeMemberUrl::new(owner.clone(), field.name.clone()));
    let qualified = field.proto_qualified_name();
    if qualified != field.name {
        removed.insert(RSTypeMemberUrl::new(owner.clone(), qualified));
    }
}

fn record_extend(extend: &RSExtend, removed: &mut Removed) {
    for field in &extend.fields {
        record_field(&extend.type_url, field, removed);
    }
}

fn record_type(ty: &RSType, removed: &mut Removed) {
    if let RSType::Message(message) = ty {
        for field in message.all_fields() {
            record_field(&message.type_url, field, removed);
        }
    }
    for extend in ty.nested_extends() {
        record_extend(extend, removed);
    }
    for nested in ty.nested_types() {
        record_type(nested, removed);
    }
}

fn filter_file(file: &RSFile, visitor: &mut dyn Visitor<(), bool>, removed: &mut Removed) -> Option<RSFile> {
    if !visitor.visit_file(file, ()) {
        for ty in &file.types {
            record_type(ty, removed);
        }
        for extend in &file.extends {
            record_extend(extend, removed);
        }
        return None;
    }
    Some(RSFile {
        name: file.name.clone(),
        package_name: file.package_name.clone(),
        options: file.options.clone(),
        services: file.services.iter().filter_map(|service| filter_service(service, visitor)).collect(),
        extends: filter_extends(&file.extends, visitor, removed),
        location: file.location.clone(),
        imports: file.imports.clone(),
        types: filter_types(&file.types, visitor, removed),
    })
}

fn filter_types(types: &[RSType], visitor: &mut dyn Visitor<(), bool>, removed: &mut Removed) -> Vec<RSType> {
    types.iter().filter_map(|ty| filter_type(ty, visitor, removed)).collect()
}

fn filter_extends(
    extends: &[RSExtend],
    visitor: &mut dyn Visitor<(), bool>,
    removed: &mut Removed,
) -> Vec<RSExtend> {
    extends.iter().filter_map(|extend| filter_extend(extend, visitor, removed)).collect()
}

fn filter_fields(
    owner: &RSDeclarationUrl,
    fields: &[RSField],
    visitor: &mut dyn Visitor<(), bool>,
    removed: &mut Removed,
) -> Vec<RSField> {
    let mut kept = Vec::with_capacity(fields.len());
    for field in fields {
        if visitor.visit_field(field, ()) {
            kept.push(field.clone());
        } else {
            record_field(owner, field, removed);
        }
    }
    kept
}

fn filter_one_ofs(
    owner: &RSDeclarationUrl,
    one_ofs: &[RSOneOf],
    visitor: &mut dyn Visitor<(), bool>,
    removed: &mut Removed,
) -> Vec<RSOneOf> {
    let mut kept = Vec::with_capacity(one_ofs.len());
    for one_of in one_ofs {
        if visitor.visit_one_of(one_of, ()) {
            kept.push(RSOneOf { fields: filter_fields(owner, &one_of.fields, visitor, removed), ..one_of.clone() });
        } else {
            for field in &one_of.fields {
                record_field(owner, field, removed);
            }
        }
    }
    kept
}

fn filter_type(ty: &RSType, visitor: &mut dyn Visitor<(), bool>, removed: &mut Removed) -> Option<RSType> {
    if !visitor.visit_type(ty, ()) {
        record_type(ty, removed);
        return None;
    }
    let kept = match ty {
        RSType::Message(message) => RSType::Message(RSMessage {
            name: message.name.clone(),
            documentation: message.documentation.clone(),
            fields: filter_fields(&message.type_url, &message.fields, visitor, removed),
            one_ofs: filter_one_ofs(&message.type_url, &message.one_ofs, visitor, removed),
            options: message.options.clone(),
            type_url: message.type_url.clone(),
            nested_extends: filter_extends(&message.nested_extends, visitor, removed),
            nested_types: filter_types(&message.nested_types, visitor, removed),
            location: message.location.clone(),
        }),
        RSType::Enum(enumeration) => RSType::Enum(RSEnum {
            name: enumeration.name.clone(),
            constants: enumeration
                .constants
                .iter()
                .filter(|constant| visitor.visit_constant(constant, ()))
                .cloned()
                .collect(),
            documentation: enumeration.documentation.clone(),
            options: enumeration.options.clone(),
            type_url: enumeration.type_url.clone(),
            nested_extends: filter_extends(&enumeration.nested_extends, visitor, removed),
            nested_types: filter_types(&enumeration.nested_types, visitor, removed),
            location: enumeration.location.clone(),
        }),
        RSType::Enclosing(enclosing) => RSType::Enclosing(RSEnclosingType {
            name: enclosing.name.clone(),
            documentation: enclosing.documentation.clone(),
            type_url: enclosing.type_url.clone(),
            nested_extends: filter_extends(&enclosing.nested_extends, visitor, removed),
            options: enclosing.options.clone(),
            location: enclosing.location.clone(),
            nested_types: filter_types(&enclosing.nested_types, visitor, removed),
        }),
    };
    Some(kept)
}

fn filter_extend(extend: &RSExtend, visitor: &mut dyn Visitor<(), bool>, removed: &mut Removed) -> Option<RSExtend> {
    if !visitor.visit_extend(extend, ()) {
        record_extend(extend, removed);
        return None;
    }
    let fields = filter_fields(&extend.type_url, &extend.fields, visitor, removed);
    Some(RSExtend { fields, ..extend.clone() })
}

fn filter_service(service: &RSService, visitor: &mut dyn Visitor<(), bool>) -> Option<RSService> {
    if !visitor.visit_service(service, ()) {
        return None;
    }
    Some(RSService {
        rpcs: service.rpcs.iter().filter(|rpc| visitor.visit_rpc(rpc, ())).cloned().collect(),
        ..service.clone()
    })
}

fn strip_file(mut file: RSFile, removed: &Removed) -> RSFile {
    file.options = file.options.without(removed);
    for ty in &mut file.types {
        strip_type(ty, removed);
    }
    for extend in &mut file.extends {
        strip_extend(extend, removed);
    }
    for service in &mut file.services {
        service.options = service.options.without(removed);
        for rpc in &mut service.rpcs {
            rpc.options = rpc.options.without(removed);
        }
    }
    file
}

fn strip_fields(fields: &mut [RSField], removed: &Removed) {
    for field in fields {
        field.options = field.options.without(removed);
    }
}

fn strip_extend(extend: &mut RSExtend, removed: &Removed) { strip_fields(&mut extend.fields, removed); }

fn strip_type(ty: &mut RSType, removed: &Removed) {
    let options = ty.options().without(removed);
    *ty.options_mut() = options;
    match ty {
        RSType::Message(message) => {
            strip_fields(&mut message.fields, removed);
            for one_of in &mut message.one_ofs {
                one_of.options = one_of.options.without(removed);
                strip_fields(&mut one_of.fields, removed);
            }
        }
        RSType::Enum(enumeration) => {
            for constant in &mut enumeration.constants {
                constant.options = constant.options.without(removed);
            }
        }
        RSType::Enclosing(_) => {}
    }
    for nested in ty.nested_types_mut() {
        strip_type(nested, removed);
    }
    for extend in ty.nested_extends_mut() {
        strip_extend(extend, removed);
    }
}
