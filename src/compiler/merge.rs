use super::builder::{Arrival, CompositeBuilder};
use super::classify::{self, output_index};
use super::context::PendingReconnection;
use crate::composite::{CompositeNode, MergeInput};
use crate::error::{BuildError, BuildWarning};
use crate::graph::{ConstructKind, SemanticNode};
use itertools::Itertools;

impl<'g> CompositeBuilder<'g> {
    /// Resolves a producer arriving at a merge node.
    ///
    /// The first producer reached outside a branch inlines the merge and its
    /// continuation. Every other producer records a reconnection and stops.
    /// A merge first reached inside a branch is not inlined there: its
    /// continuation is queued and spliced in at root level once traversal ends.
    /// In that case no producer inlines it, so all n producers end in a
    /// `Reconnect` and the merge leaf is declared at root.
    pub(super) fn build_merge(
        &mut self,
        node: &'g SemanticNode,
        arrival: Option<Arrival<'_>>,
    ) -> Result<Option<CompositeNode>, BuildError> {
        if self.ctx.is_visited(&node.name) {
            self.defer_to_merge(node, arrival);
            return Ok(None);
        }

        if self.ctx.in_branch() {
            self.ctx.mark_visited(&node.name);
            self.defer_to_merge(node, arrival);
            return Ok(None);
        }

        self.build_inlined_merge(node).map(Some)
    }

    /// Declares the merge node and builds its continuation in place.
    pub(super) fn build_inlined_merge(
        &mut self,
        node: &'g SemanticNode,
    ) -> Result<CompositeNode, BuildError> {
        let head = self.declare_leaf(node, ConstructKind::Merge)?;
        let inputs = self.merge_inputs(node);

        let downstream = match classify::primary_output_slot(node, ConstructKind::Merge) {
            Some(slot) => {
                let index = output_index(node, ConstructKind::Merge, &slot.name);
                self.build_targets(node, slot, index)?
            }
            None => None,
        };

        Ok(CompositeNode::Merge {
            head: Box::new(head),
            inputs,
            downstream: downstream.map(Box::new),
        })
    }

    fn defer_to_merge(&mut self, node: &'g SemanticNode, arrival: Option<Arrival<'_>>) {
        if let Some(arrival) = arrival {
            tracing::debug!(
                node = %node.name,
                producer = arrival.source,
                input = arrival.input_index,
                "deferring merge input"
            );
            self.ctx.defer_reconnection(PendingReconnection {
                consumer: node.name.clone(),
                input_index: arrival.input_index,
                producer: arrival.source.to_string(),
                producer_output: arrival.source_output,
            });
        }

        // An inlined merge already owns its continuation.
        if self.ctx.mark_merge_deferred(&node.name) && !self.ctx.is_declared(&node.name) {
            self.ctx.defer_merge_downstream(&node.name);
        }
    }

    /// All producers statically wired into the merge, in input order.
    fn merge_inputs(&mut self, node: &'g SemanticNode) -> Vec<MergeInput> {
        let graph = self.ctx.graph;
        let inputs: Vec<MergeInput> = graph
            .incoming(&node.name)
            .iter()
            .sorted_by_key(|edge| (edge.target_input_index, graph.position(&edge.source)))
            .map(|edge| MergeInput {
                input_index: edge.target_input_index,
                source: edge.source.clone(),
            })
            .collect();

        let distinct_inputs = inputs.iter().map(|input| input.input_index).unique().count();
        if distinct_inputs < 2 {
            self.ctx.warn(BuildWarning::MergeWithTooFewInputs {
                node: node.name.clone(),
                distinct_inputs,
            });
        }
        inputs
    }
}
