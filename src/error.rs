use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors that abort a build. No partial tree is ever returned alongside one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(
        "Node '{missing_node}' not found, which is required by a connection from node '{source_node}'"
    )]
    NodeNotFound {
        missing_node: String,
        source_node: String,
    },

    #[error(
        "Node '{node}' is part of a cycle (reached again from '{via}'), but only loop nodes may cycle"
    )]
    Cycle { node: String, via: String },

    #[error("Reference to node '{node}' from '{referenced_from}' has no matching declaration")]
    DanglingReference {
        node: String,
        referenced_from: String,
    },

    #[error("Node '{node}' was never declared in the composite tree")]
    UndeclaredNode { node: String },

    #[error("Node '{node}' was declared more than once in the composite tree")]
    DuplicateDeclaration { node: String },

    #[error("Nodes '{first}' and '{second}' both resolve to the identifier '{identifier}'")]
    NamingCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("Recursion depth limit of {limit} exceeded while building node '{node}'")]
    RecursionLimit { node: String, limit: usize },

    #[error("Build produced {count} warning(s) while warnings are denied; first: {first}")]
    WarningsDenied { count: usize, first: String },
}

/// Non-fatal diagnostics collected during a build and returned next to the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildWarning {
    #[error(
        "Merge node '{node}' has {distinct_inputs} distinct wired input(s); at least 2 are expected"
    )]
    MergeWithTooFewInputs { node: String, distinct_inputs: usize },

    #[error("Node '{node}' is only reachable through a cycle without a trigger")]
    UnreachableNode { node: String },
}

/// Errors raised while constructing or converting a `SemanticGraph`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(String),

    #[error("Node name '{0}' appears more than once in the graph")]
    DuplicateNode(String),

    #[error("Invalid graph definition: {0}")]
    InvalidDefinition(String),
}

/// Errors raised while persisting or loading build artifacts.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Artifact error: {0}")]
    Generic(String),
}
