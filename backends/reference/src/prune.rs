//! Processor removing declarations that must not reach code generators.

use async_trait::async_trait;
use plugins::{
    GenerationOptions, OptionDescriptor, OptionTypeKind, PluginService, ProcessorPluginService, RLogger,
};
use resolver::{DefaultVisitor, EmptyVisitor, Node, RSResolver, Visitor};
use schema::RSFile;

/// Drops source-only declarations and, with `drop_deprecated`, deprecated
/// rpcs. Options referring to removed extension fields are stripped.
#[derive(Debug, Default)]
pub struct PruneProcessor;

impl PruneProcessor {
    /// Option enabling removal of deprecated rpcs.
    pub const DROP_DEPRECATED: &'static str = "drop_deprecated";
}

/// Whether `node` survives pruning.
pub fn keep(node: Node<'_>, drop_deprecated: bool) -> bool {
    let Some(options) = node.options() else { return true };
    if options.is_source_only() {
        return false;
    }
    !(drop_deprecated && matches!(node, Node::Rpc(_)) && options.is_deprecated())
}

/// Number of nodes in `files`.
pub fn count_nodes(files: &[RSFile]) -> usize {
    let mut count = 0;
    let mut counter = DefaultVisitor::from_fn(|_: Node<'_>, ()| count += 1);
    for file in files {
        counter.visit_file(file, ());
    }
    count
}

impl PluginService for PruneProcessor {
    fn name(&self) -> &str { "prune" }

    fn description(&self) -> &str { "Removes source-only declarations before generation." }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new(Self::DROP_DEPRECATED, "Also remove deprecated rpcs.", OptionTypeKind::Boolean)]
    }
}

#[async_trait]
impl ProcessorPluginService for PruneProcessor {
    async fn process(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<Vec<RSFile>> {
        let drop_deprecated = options.get_bool(Self::DROP_DEPRECATED).unwrap_or(false);
        let resolver = RSResolver::new(files.to_vec());
        let mut visitor = EmptyVisitor::from_fn(|node: Node<'_>, ()| keep(node, drop_deprecated));
        let pruned = resolver.filter(&mut visitor).into_files();

        let removed = count_nodes(files).saturating_sub(count_nodes(&pruned));
        logger.lifecycle(&format!("Removed {} declaration(s)", removed)).await;
        Ok(pruned)
    }
}
