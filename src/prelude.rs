//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kumitate crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let graph = SemanticGraph::new(vec![
//!     SemanticNode::new("Webhook", "n8n-nodes-base.webhook").connect("output0", "Respond", 0),
//!     SemanticNode::new("Respond", "n8n-nodes-base.respondToWebhook"),
//! ])?;
//!
//! let artifacts = Compiler::builder(graph).build().compile()?;
//! println!("{} root tree(s)", artifacts.roots.len());
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{BuildArtifacts, Compiler, CompilerBuilder, build};

// Input graph
pub use crate::graph::{
    Connection, ConnectionType, ConstructKind, IntoGraph, KindRegistry, OutputSlot,
    SemanticGraph, SemanticNode, SubnodeAttachment,
};

// Output tree
pub use crate::composite::{
    AttachedSubnode, BranchArm, BranchKind, CompositeNode, DisplayComposite, MergeInput,
};

// Naming
pub use crate::compiler::naming::{VariableNamer, to_variable_name};

// Error types
pub use crate::error::{ArtifactError, BuildError, BuildWarning, GraphError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
