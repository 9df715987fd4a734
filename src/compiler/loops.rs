use super::builder::CompositeBuilder;
use super::classify::{self, output_index};
use crate::composite::CompositeNode;
use crate::error::BuildError;
use crate::graph::{ConstructKind, SemanticNode};

impl<'g> CompositeBuilder<'g> {
    /// Builds a batch loop: the per-batch body first, then the continuation
    /// that runs once iteration is done.
    ///
    /// The body normally leads back to the loop node. That edge ends the body
    /// silently since the loop node is still on the active path.
    pub(super) fn build_loop(&mut self, node: &'g SemanticNode) -> Result<CompositeNode, BuildError> {
        let head = self.declare_leaf(node, ConstructKind::Loop)?;
        let (done_slot, body_slot) = classify::loop_slots(node);

        let body = match body_slot {
            Some(slot) => {
                let index = output_index(node, ConstructKind::Loop, &slot.name);
                self.build_targets(node, slot, index)?
            }
            None => None,
        };
        let after = match done_slot {
            Some(slot) => {
                let index = output_index(node, ConstructKind::Loop, &slot.name);
                self.build_targets(node, slot, index)?
            }
            None => None,
        };

        Ok(CompositeNode::Loop {
            head: Box::new(head),
            body: body.map(Box::new),
            after: after.map(Box::new),
        })
    }

    /// Builds the subtree hanging off a node's error output, if it has one.
    ///
    /// The error path shares the visited set with the main path and is built
    /// as a branch, before the node's regular continuation.
    pub(super) fn attach_error_handler(
        &mut self,
        node: &'g SemanticNode,
        kind: ConstructKind,
    ) -> Result<Option<CompositeNode>, BuildError> {
        let Some(slot) = classify::error_output_slot(node, kind) else {
            return Ok(None);
        };
        if slot.connections.is_empty() {
            return Ok(None);
        }

        tracing::debug!(node = %node.name, "attaching error handler");
        let index = output_index(node, kind, &slot.name);
        let previous = self.ctx.set_in_branch(true);
        let handler = self.build_targets(node, slot, index);
        self.ctx.set_in_branch(previous);
        handler
    }
}
