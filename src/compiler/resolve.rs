use super::builder::CompositeBuilder;
use super::naming::verify_unique_identifiers;
use crate::composite::CompositeNode;
use crate::error::{BuildError, BuildWarning};
use ahash::AHashMap;

impl<'g> CompositeBuilder<'g> {
    /// Second pass after the trigger walk.
    ///
    /// Queued merge continuations are spliced in first since building them can
    /// queue further reconnections. Nodes no walk reached come next, then every
    /// pending reconnection becomes a root-level `Reconnect`. Each queued item is
    /// removed as it is processed.
    pub(super) fn resolve_deferred(
        &mut self,
        forest: &mut Vec<CompositeNode>,
    ) -> Result<(), BuildError> {
        loop {
            while let Some(merge) = self.ctx.next_pending_merge() {
                let node = self.lookup(&merge, None)?;
                tracing::debug!(node = %merge, "splicing deferred merge at root level");
                self.ctx.enter(&node.name)?;
                let built = self.build_inlined_merge(node);
                self.ctx.exit();
                forest.push(built?);
            }

            if !self.build_next_unreached(forest)? {
                break;
            }
        }

        for reconnection in self.ctx.take_reconnections() {
            forest.push(CompositeNode::Reconnect {
                source: reconnection.producer,
                source_output: reconnection.producer_output,
                target: reconnection.consumer,
                target_input: reconnection.input_index,
            });
        }
        Ok(())
    }

    /// Builds the first node (in graph order) that no walk has reached.
    /// Returns false once every node is visited.
    ///
    /// Such nodes sit on a cycle without a trigger. Owned subnodes are left to
    /// their parent unless nothing else remains.
    fn build_next_unreached(&mut self, forest: &mut Vec<CompositeNode>) -> Result<bool, BuildError> {
        let graph = self.ctx.graph;
        let unreached = graph
            .nodes()
            .iter()
            .filter(|node| !self.ctx.is_visited(&node.name))
            .min_by_key(|node| graph.subnode_owner(&node.name).is_some());

        let Some(node) = unreached else {
            return Ok(false);
        };

        self.ctx.warn(BuildWarning::UnreachableNode {
            node: node.name.clone(),
        });
        if let Some(tree) = self.build_from(&node.name, None)? {
            forest.push(tree);
        }
        Ok(true)
    }

    /// Checks the finished forest: no dangling references, exactly one leaf
    /// per graph node, and one identifier per node.
    pub(super) fn validate(&self, forest: &[CompositeNode]) -> Result<(), BuildError> {
        let graph = self.ctx.graph;
        let mut declarations: AHashMap<&str, usize> = AHashMap::with_capacity(graph.len());
        for tree in forest {
            for leaf in tree.declared_leaves() {
                *declarations.entry(leaf).or_default() += 1;
            }
        }

        for tree in forest {
            for referenced in tree.referenced_nodes() {
                if !declarations.contains_key(referenced) {
                    return Err(BuildError::DanglingReference {
                        node: referenced.to_string(),
                        referenced_from: tree.declared_node().unwrap_or("root").to_string(),
                    });
                }
            }
        }

        for node in graph.nodes() {
            match declarations.get(node.name.as_str()) {
                None => {
                    return Err(BuildError::UndeclaredNode {
                        node: node.name.clone(),
                    });
                }
                Some(&count) if count > 1 => {
                    return Err(BuildError::DuplicateDeclaration {
                        node: node.name.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        verify_unique_identifiers(self.ctx.variables())
    }
}
