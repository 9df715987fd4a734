use super::classify::{self, output_index};
use super::context::BuildContext;
use crate::composite::{AttachedSubnode, CompositeNode};
use crate::error::BuildError;
use crate::graph::{ConstructKind, OutputSlot, SemanticNode};

/// How the current path arrived at the node being built.
#[derive(Debug, Clone, Copy)]
pub(super) struct Arrival<'a> {
    pub(super) source: &'a str,
    pub(super) source_output: usize,
    pub(super) input_index: usize,
}

/// Responsible for turning a `SemanticGraph` into a forest of composite trees.
pub(super) struct CompositeBuilder<'g> {
    pub(super) ctx: BuildContext<'g>,
}

impl<'g> CompositeBuilder<'g> {
    pub(super) fn new(ctx: BuildContext<'g>) -> Self {
        Self { ctx }
    }

    /// Rejects cycles that bypass every loop node, builds one tree per trigger
    /// node, then resolves deferred work and validates the result.
    pub(super) fn build_forest(&mut self) -> Result<Vec<CompositeNode>, BuildError> {
        self.reject_plain_cycles()?;

        let graph = self.ctx.graph;
        let mut forest = Vec::new();

        for root in graph.roots() {
            if self.ctx.is_visited(&root.name) {
                continue;
            }
            tracing::debug!(node = %root.name, "building from trigger");
            if let Some(tree) = self.build_from(&root.name, None)? {
                forest.push(tree);
            }
        }

        self.resolve_deferred(&mut forest)?;
        self.validate(&forest)?;
        Ok(forest)
    }

    /// Recursively builds the composite for `name` and everything downstream of it.
    ///
    /// Returns `None` when the path ends here without emitting anything: a loop
    /// body cycling back to its loop node, or a producer deferring to a merge.
    pub(super) fn build_from(
        &mut self,
        name: &str,
        arrival: Option<Arrival<'_>>,
    ) -> Result<Option<CompositeNode>, BuildError> {
        let node = self.lookup(name, arrival.map(|a| a.source))?;
        let kind = self.ctx.kinds.classify(&node.node_type);

        if self.ctx.is_on_path(name) {
            if kind == ConstructKind::Loop {
                tracing::debug!(node = %name, "loop body returned to its loop node");
                return Ok(None);
            }
            return Err(BuildError::Cycle {
                node: name.to_string(),
                via: arrival.map_or_else(|| name.to_string(), |a| a.source.to_string()),
            });
        }

        if kind != ConstructKind::Merge && self.ctx.is_visited(name) {
            tracing::debug!(node = %name, "converged with an already built path");
            return Ok(Some(self.ctx.reference(name)));
        }

        self.ctx.enter(name)?;
        let built = match kind {
            ConstructKind::Plain => self.build_plain(node).map(Some),
            ConstructKind::IfElse | ConstructKind::Switch => {
                self.build_branch(node, kind).map(Some)
            }
            ConstructKind::Merge => self.build_merge(node, arrival),
            ConstructKind::Loop => self.build_loop(node).map(Some),
            ConstructKind::Sticky => self.declare_leaf(node, kind).map(Some),
        };
        self.ctx.exit();
        built
    }

    /// Marks the node visited and declared, and builds its leaf together with
    /// its subnodes and error handler.
    pub(super) fn declare_leaf(
        &mut self,
        node: &'g SemanticNode,
        kind: ConstructKind,
    ) -> Result<CompositeNode, BuildError> {
        self.ctx.mark_visited(&node.name);
        self.ctx.declare(&node.name)?;
        tracing::debug!(node = %node.name, kind = ?kind, "declaring node");

        let subnodes = self.attach_subnodes(node)?;
        let error_handler = self.attach_error_handler(node, kind)?;

        Ok(CompositeNode::Leaf {
            node: node.name.clone(),
            subnodes,
            error_handler: error_handler.map(Box::new),
        })
    }

    fn build_plain(&mut self, node: &'g SemanticNode) -> Result<CompositeNode, BuildError> {
        let head = self.declare_leaf(node, ConstructKind::Plain)?;

        let main_slots = classify::connected_main_slots(node, ConstructKind::Plain);
        if main_slots.len() > 1 {
            return self.build_multi_output(node, head);
        }

        let tail = match main_slots.first().copied() {
            Some(slot) => {
                let index = output_index(node, ConstructKind::Plain, &slot.name);
                self.build_targets(node, slot, index)?
            }
            None => None,
        };

        Ok(match tail {
            Some(tail) => CompositeNode::Sequence {
                head: Box::new(head),
                tail: Box::new(tail),
            },
            None => head,
        })
    }

    /// Builds every target of one output slot. Several targets become a `FanOut`
    /// of independently built siblings.
    pub(super) fn build_targets(
        &mut self,
        source: &'g SemanticNode,
        slot: &'g OutputSlot,
        source_output: usize,
    ) -> Result<Option<CompositeNode>, BuildError> {
        let mut built = Vec::with_capacity(slot.connections.len());
        for connection in &slot.connections {
            let arrival = Arrival {
                source: &source.name,
                source_output,
                input_index: connection.target_input_index,
            };
            if let Some(target) = self.build_from(&connection.target, Some(arrival))? {
                built.push(target);
            }
        }

        Ok(match built.len() {
            0 => None,
            1 => built.pop(),
            _ => Some(CompositeNode::FanOut { targets: built }),
        })
    }

    fn attach_subnodes(
        &mut self,
        node: &'g SemanticNode,
    ) -> Result<Vec<AttachedSubnode>, BuildError> {
        let mut attached = Vec::with_capacity(node.subnodes.len());
        for attachment in &node.subnodes {
            let composite = if self.ctx.is_visited(&attachment.node) {
                self.ctx.reference(&attachment.node)
            } else {
                let subnode = self.lookup(&attachment.node, Some(&node.name))?;
                let kind = self.ctx.kinds.classify(&subnode.node_type);
                self.ctx.enter(&subnode.name)?;
                let leaf = self.declare_leaf(subnode, kind);
                self.ctx.exit();
                leaf?
            };
            attached.push(AttachedSubnode {
                connection_type: attachment.connection_type.clone(),
                node: composite,
            });
        }
        Ok(attached)
    }

    pub(super) fn lookup(
        &self,
        name: &str,
        source: Option<&str>,
    ) -> Result<&'g SemanticNode, BuildError> {
        let graph = self.ctx.graph;
        graph.get(name).ok_or_else(|| BuildError::NodeNotFound {
            missing_node: name.to_string(),
            source_node: source.unwrap_or("N/A").to_string(),
        })
    }
}
