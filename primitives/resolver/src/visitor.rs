//! Visitor framework over the schema tree.
//!
//! [`Visitor`] has one method per node kind. Two adapters cover the common
//! cases without implementing every method by hand:
//!
//! - [`EmptyVisitor`] routes every method to a single [`NodeHandler`], which
//!   is all a keep/drop decision function needs.
//! - [`DefaultVisitor`] walks the whole tree depth-first and calls the
//!   handler for every node, children before their parent.

use schema::{RSEnumConstant, RSExtend, RSField, RSFile, RSOneOf, RSOptions, RSRpc, RSService, RSType};

/// Borrowed view of any schema node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A schema file.
    File(&'a RSFile),
    /// A service.
    Service(&'a RSService),
    /// A message, enum or enclosing type.
    Type(&'a RSType),
    /// An extend block.
    Extend(&'a RSExtend),
    /// A message or extension field.
    Field(&'a RSField),
    /// A `oneof` group.
    OneOf(&'a RSOneOf),
    /// An enum constant.
    Constant(&'a RSEnumConstant),
    /// An rpc.
    Rpc(&'a RSRpc),
}

impl Node<'_> {
    /// Declared name of the node. Files report their file name and extend
    /// blocks the url of the extended type.
    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Service(service) => &service.name,
            Node::Type(ty) => ty.name(),
            Node::Extend(extend) => extend.type_url.as_str(),
            Node::Field(field) => &field.name,
            Node::OneOf(one_of) => &one_of.name,
            Node::Constant(constant) => &constant.name,
            Node::Rpc(rpc) => &rpc.name,
        }
    }

    /// Options applied to the node. Extend blocks carry none.
    pub fn options(&self) -> Option<&RSOptions> {
        match self {
            Node::File(file) => Some(&file.options),
            Node::Service(service) => Some(&service.options),
            Node::Type(ty) => Some(ty.options()),
            Node::Extend(_) => None,
            Node::Field(field) => Some(&field.options),
            Node::OneOf(one_of) => Some(&one_of.options),
            Node::Constant(constant) => Some(&constant.options),
            Node::Rpc(rpc) => Some(&rpc.options),
        }
    }
}

/// Operation over the schema tree, one method per node kind.
///
/// `D` is data threaded through the traversal and `R` the per-node result.
/// The resolver's pruning uses `Visitor<(), bool>` as a keep/drop predicate.
pub trait Visitor<D, R> {
    /// Visit a file.
    fn visit_file(&mut self, file: &RSFile, data: D) -> R;
    /// Visit a service.
    fn visit_service(&mut self, service: &RSService, data: D) -> R;
    /// Visit a type.
    fn visit_type(&mut self, ty: &RSType, data: D) -> R;
    /// Visit an extend block.
    fn visit_extend(&mut self, extend: &RSExtend, data: D) -> R;
    /// Visit a field.
    fn visit_field(&mut self, field: &RSField, data: D) -> R;
    /// Visit a `oneof` group.
    fn visit_one_of(&mut self, one_of: &RSOneOf, data: D) -> R;
    /// Visit an enum constant.
    fn visit_constant(&mut self, constant: &RSEnumConstant, data: D) -> R;
    /// Visit an rpc.
    fn visit_rpc(&mut self, rpc: &RSRpc, data: D) -> R;
}

/// Single decision function shared by every node kind.
pub trait NodeHandler<D, R> {
    /// Handle any node.
    fn default_handler(&mut self, node: Node<'_>, data: D) -> R;
}

impl<D, R, F> NodeHandler<D, R> for F
where
    F: FnMut(Node<'_>, D) -> R,
{
    fn default_handler(&mut self, node: Node<'_>, data: D) -> R { self(node, data) }
}

/// Visitor that forwards every node to its handler and does not descend.
#[derive(Debug, Clone, Default)]
pub struct EmptyVisitor<H> {
    handler: H,
}

impl<H> EmptyVisitor<H> {
    /// Wraps a handler.
    pub fn new(handler: H) -> Self { Self { handler } }

    /// Wraps a closure, pinning its signature to the handler shape.
    pub fn from_fn<D, R>(handler: H) -> Self
    where
        H: FnMut(Node<'_>, D) -> R,
    {
        Self { handler }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &H { &self.handler }

    /// Unwraps the handler, e.g. to read what it collected.
    pub fn into_inner(self) -> H { self.handler }
}

impl<D, R, H: NodeHandler<D, R>> Visitor<D, R> for EmptyVisitor<H> {
    fn visit_file(&mut self, file: &RSFile, data: D) -> R {
        self.handler.default_handler(Node::File(file), data)
    }

    fn visit_service(&mut self, service: &RSService, data: D) -> R {
        self.handler.default_handler(Node::Service(service), data)
    }

    fn visit_type(&mut self, ty: &RSType, data: D) -> R {
        self.handler.default_handler(Node::Type(ty), data)
    }

    fn visit_extend(&mut self, extend: &RSExtend, data: D) -> R {
        self.handler.default_handler(Node::Extend(extend), data)
    }

    fn visit_field(&mut self, field: &RSField, data: D) -> R {
        self.handler.default_handler(Node::Field(field), data)
    }

    fn visit_one_of(&mut self, one_of: &RSOneOf, data: D) -> R {
        self.handler.default_handler(Node::OneOf(one_of), data)
    }

    fn visit_constant(&mut self, constant: &RSEnumConstant, data: D) -> R {
        self.handler.default_handler(Node::Constant(constant), data)
    }

    fn visit_rpc(&mut self, rpc: &RSRpc, data: D) -> R {
        self.handler.default_handler(Node::Rpc(rpc), data)
    }
}

/// Visitor that walks the full tree depth-first.
///
/// Order: file → services → rpcs, file → types → fields / oneofs /
/// constants → nested types → nested extends, file → extends → fields.
/// Children are visited before the handler sees their parent; the results
/// of child visits are discarded.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor<H> {
    handler: H,
}

impl<H> DefaultVisitor<H> {
    /// Wraps a handler.
    pub fn new(handler: H) -> Self { Self { handler } }

    /// Wraps a closure, pinning its signature to the handler shape.
    pub fn from_fn<D, R>(handler: H) -> Self
    where
        H: FnMut(Node<'_>, D) -> R,
    {
        Self { handler }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &H { &self.handler }

    /// Unwraps the handler.
    pub fn into_inner(self) -> H { self.handler }
}

impl<D: Clone, R, H: NodeHandler<D, R>> Visitor<D, R> for DefaultVisitor<H> {
    fn visit_file(&mut self, file: &RSFile, data: D) -> R {
        for service in &file.services {
            self.visit_service(service, data.clone());
        }
        for ty in &file.types {
            self.visit_type(ty, data.clone());
        }
        for extend in &file.extends {
            self.visit_extend(extend, data.clone());
        }
        self.handler.default_handler(Node::File(file), data)
    }

    fn visit_service(&mut self, service: &RSService, data: D) -> R {
        for rpc in &service.rpcs {
            self.visit_rpc(rpc, data.clone());
        }
        self.handler.default_handler(Node::Service(service), data)
    }

    fn visit_type(&mut self, ty: &RSType, data: D) -> R {
        match ty {
            RSType::Message(message) => {
                for field in &message.fields {
                    self.visit_field(field, data.clone());
                }
                for one_of in &message.one_ofs {
                    self.visit_one_of(one_of, data.clone());
                }
            }
            RSType::Enum(enumeration) => {
                for constant in &enumeration.constants {
                    self.visit_constant(constant, data.clone());
                }
            }
            RSType::Enclosing(_) => {}
        }
        for nested in ty.nested_types() {
            self.visit_type(nested, data.clone());
        }
        for extend in ty.nested_extends() {
            self.visit_extend(extend, data.clone());
        }
        self.handler.default_handler(Node::Type(ty), data)
    }

    fn visit_extend(&mut self, extend: &RSExtend, data: D) -> R {
        for field in &extend.fields {
            self.visit_field(field, data.clone());
        }
        self.handler.default_handler(Node::Extend(extend), data)
    }

    fn visit_field(&mut self, field: &RSField, data: D) -> R {
        self.handler.default_handler(Node::Field(field), data)
    }

    fn visit_one_of(&mut self, one_of: &RSOneOf, data: D) -> R {
        for field in &one_of.fields {
            self.visit_field(field, data.clone());
        }
        self.handler.default_handler(Node::OneOf(one_of), data)
    }

    fn visit_constant(&mut self, constant: &RSEnumConstant, data: D) -> R {
        self.handler.default_handler(Node::Constant(constant), data)
    }

    fn visit_rpc(&mut self, rpc: &RSRpc, data: D) -> R {
        self.handler.default_handler(Node::Rpc(rpc), data)
    }
}

#[cfg(test)]
mod tests {
    use schema::{RSDeclarationUrl, RSEnum, RSMessage};

    use super::*;

    fn sample_file() -> RSFile {
        let mut file = RSFile::new("a.proto", Default::default());
        file.services = vec![RSService {
            name: "Greeter".to_string(),
            rpcs: vec![RSRpc::new("SayHello", RSDeclarationUrl::STRING, RSDeclarationUrl::STRING)],
            ..RSService::default()
        }];
        file.types = vec![RSMessage {
            name: "Request".to_string(),
            fields: vec![RSField::new(1, "name", RSDeclarationUrl::STRING)],
            nested_types: vec![RSEnum {
                name: "Mood".to_string(),
                constants: vec![RSEnumConstant { name: "HAPPY".to_string(), ..Default::default() }],
                ..RSEnum::default()
            }
            .into()],
            ..RSMessage::default()
        }
        .into()];
        file
    }

    #[test]
    fn test_empty_visitor_routes_to_handler_without_descending() {
        let file = sample_file();
        let mut visited = Vec::new();
        let mut visitor = EmptyVisitor::from_fn(|node: Node<'_>, _: ()| {
            visited.push(node.name().to_string());
            true
        });
        assert!(visitor.visit_file(&file, ()));
        drop(visitor);
        assert_eq!(visited, vec!["a.proto"]);
    }

    #[test]
    fn test_default_visitor_walks_depth_first() {
        let file = sample_file();
        let mut visited = Vec::new();
        let mut visitor = DefaultVisitor::from_fn(|node: Node<'_>, _: ()| {
            visited.push(node.name().to_string());
        });
        visitor.visit_file(&file, ());
        drop(visitor);
        assert_eq!(
            visited,
            vec!["SayHello", "Greeter", "name", "HAPPY", "Mood", "Request", "a.proto"]
        );
    }

    struct CountingHandler {
        fields: usize,
    }

    impl NodeHandler<(), ()> for CountingHandler {
        fn default_handler(&mut self, node: Node<'_>, _: ()) {
            if let Node::Field(_) = node {
                self.fields += 1;
            }
        }
    }

    #[test]
    fn test_struct_handler() {
        let mut visitor = DefaultVisitor::new(CountingHandler { fields: 0 });
        visitor.visit_file(&sample_file(), ());
        assert_eq!(visitor.into_inner().fields, 1);
    }
}
