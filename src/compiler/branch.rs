use super::builder::CompositeBuilder;
use super::classify::{self, ArmLayout};
use crate::composite::{BranchArm, BranchKind, CompositeNode};
use crate::error::BuildError;
use crate::graph::{ConstructKind, SemanticNode};

impl<'g> CompositeBuilder<'g> {
    /// Builds an if/else or switch node with one arm per output.
    ///
    /// Arms share the visited set, so an arm that reaches a node an earlier arm
    /// already built ends in a reference instead of a second declaration.
    pub(super) fn build_branch(
        &mut self,
        node: &'g SemanticNode,
        kind: ConstructKind,
    ) -> Result<CompositeNode, BuildError> {
        let head = self.declare_leaf(node, kind)?;
        let (branch_kind, layout) = match kind {
            ConstructKind::Switch => (BranchKind::Switch, classify::switch_layout(node)),
            _ => (BranchKind::IfElse, classify::if_else_layout(node)),
        };

        let arms = self.build_arms(node, layout)?;
        Ok(CompositeNode::Branch {
            head: Box::new(head),
            kind: branch_kind,
            arms,
        })
    }

    /// A plain node wired through more than one of its outputs is built like a
    /// branch, one arm per connected output.
    pub(super) fn build_multi_output(
        &mut self,
        node: &'g SemanticNode,
        head: CompositeNode,
    ) -> Result<CompositeNode, BuildError> {
        let layout = classify::multi_output_layout(node);
        let arms = self.build_arms(node, layout)?;
        Ok(CompositeNode::Branch {
            head: Box::new(head),
            kind: BranchKind::MultiOutput,
            arms,
        })
    }

    fn build_arms(
        &mut self,
        node: &'g SemanticNode,
        layout: Vec<ArmLayout<'g>>,
    ) -> Result<Vec<BranchArm>, BuildError> {
        let previous = self.ctx.set_in_branch(true);
        let arms = layout
            .into_iter()
            .map(|arm| {
                let body = match arm.slot {
                    Some(slot) => self.build_targets(node, slot, arm.output_index)?,
                    None => None,
                };
                Ok(BranchArm {
                    label: arm.label,
                    output_index: arm.output_index,
                    body: body.map(Box::new),
                })
            })
            .collect::<Result<Vec<_>, BuildError>>();
        self.ctx.set_in_branch(previous);
        arms
    }
}
