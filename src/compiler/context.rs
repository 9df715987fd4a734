use crate::composite::CompositeNode;
use crate::error::{BuildError, BuildWarning};
use crate::graph::{KindRegistry, SemanticGraph};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

use super::naming::to_variable_name;

/// An edge that could not be expressed inline and is emitted at root level
/// once traversal is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingReconnection {
    pub consumer: String,
    pub input_index: usize,
    pub producer: String,
    pub producer_output: usize,
}

/// Mutable traversal state for exactly one build.
///
/// Nothing in here outlives the build or is shared between builds.
pub(super) struct BuildContext<'g> {
    pub(super) graph: &'g SemanticGraph,
    pub(super) kinds: &'g KindRegistry,
    max_depth: usize,
    variables: AHashMap<String, String>,
    /// Append-only. A node is marked when its leaf is emitted or when a
    /// merge defers to it, whichever happens first.
    visited: AHashSet<String>,
    declared: AHashSet<String>,
    /// Nodes currently being built, outermost first. Used for cycle detection.
    path: Vec<String>,
    in_branch: bool,
    pending_reconnections: Vec<PendingReconnection>,
    recorded_reconnections: AHashSet<PendingReconnection>,
    pending_merge_downstream: VecDeque<String>,
    deferred_merges: AHashSet<String>,
    warnings: Vec<BuildWarning>,
}

impl<'g> BuildContext<'g> {
    pub(super) fn new(
        graph: &'g SemanticGraph,
        kinds: &'g KindRegistry,
        max_depth: usize,
        variables: AHashMap<String, String>,
    ) -> Self {
        Self {
            graph,
            kinds,
            max_depth,
            variables,
            visited: AHashSet::with_capacity(graph.len()),
            declared: AHashSet::with_capacity(graph.len()),
            path: Vec::new(),
            in_branch: false,
            pending_reconnections: Vec::new(),
            recorded_reconnections: AHashSet::new(),
            pending_merge_downstream: VecDeque::new(),
            deferred_merges: AHashSet::new(),
            warnings: Vec::new(),
        }
    }

    pub(super) fn is_visited(&self, node: &str) -> bool {
        self.visited.contains(node)
    }

    /// Returns false if the node was already marked.
    pub(super) fn mark_visited(&mut self, node: &str) -> bool {
        self.visited.insert(node.to_string())
    }

    pub(super) fn is_declared(&self, node: &str) -> bool {
        self.declared.contains(node)
    }

    pub(super) fn declare(&mut self, node: &str) -> Result<(), BuildError> {
        if !self.declared.insert(node.to_string()) {
            return Err(BuildError::DuplicateDeclaration {
                node: node.to_string(),
            });
        }
        Ok(())
    }

    pub(super) fn identifier(&self, node: &str) -> String {
        self.variables
            .get(node)
            .cloned()
            .unwrap_or_else(|| to_variable_name(node))
    }

    pub(super) fn variables(&self) -> &AHashMap<String, String> {
        &self.variables
    }

    pub(super) fn reference(&self, node: &str) -> CompositeNode {
        CompositeNode::VariableReference {
            var_name: self.identifier(node),
            node_name: node.to_string(),
        }
    }

    /// Pushes `node` onto the active path, enforcing the depth limit.
    pub(super) fn enter(&mut self, node: &str) -> Result<(), BuildError> {
        if self.path.len() >= self.max_depth {
            return Err(BuildError::RecursionLimit {
                node: node.to_string(),
                limit: self.max_depth,
            });
        }
        self.path.push(node.to_string());
        Ok(())
    }

    pub(super) fn exit(&mut self) {
        self.path.pop();
    }

    pub(super) fn is_on_path(&self, node: &str) -> bool {
        self.path.iter().any(|active| active == node)
    }

    pub(super) fn in_branch(&self) -> bool {
        self.in_branch
    }

    /// Sets the branch flag and returns the previous value for restoring.
    pub(super) fn set_in_branch(&mut self, in_branch: bool) -> bool {
        std::mem::replace(&mut self.in_branch, in_branch)
    }

    pub(super) fn defer_reconnection(&mut self, reconnection: PendingReconnection) {
        if self.recorded_reconnections.insert(reconnection.clone()) {
            self.pending_reconnections.push(reconnection);
        }
    }

    /// Returns true the first time a merge is deferred to.
    pub(super) fn mark_merge_deferred(&mut self, merge: &str) -> bool {
        self.deferred_merges.insert(merge.to_string())
    }

    pub(super) fn defer_merge_downstream(&mut self, merge: &str) {
        self.pending_merge_downstream.push_back(merge.to_string());
    }

    /// Removes and returns the next merge whose continuation must be spliced at root.
    pub(super) fn next_pending_merge(&mut self) -> Option<String> {
        self.pending_merge_downstream.pop_front()
    }

    pub(super) fn take_reconnections(&mut self) -> Vec<PendingReconnection> {
        std::mem::take(&mut self.pending_reconnections)
    }

    pub(super) fn warn(&mut self, warning: BuildWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub(super) fn into_parts(self) -> (AHashMap<String, String>, Vec<BuildWarning>) {
        (self.variables, self.warnings)
    }
}
