//! # Kumitate - Control-Flow Reconstruction for Workflow Graphs
//!
//! **Kumitate** turns a workflow's node/connection graph into a nested tree of
//! structured-programming constructs: sequences, if/else, switch/case, merges,
//! batch loops and error handlers. It is the inverse of what a compiler does
//! when it lowers structured code into a control-flow graph, and it respects
//! the declaration-before-use ordering a textual output language needs.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Graph**: Parse your workflow format into your own structs.
//! 2.  **Convert to Kumitate's Model**: Implement `IntoGraph` to produce a `SemanticGraph`.
//! 3.  **Compile**: Use `Compiler::builder` to configure a compiler and call `compile`.
//! 4.  **Emit**: Render the returned `CompositeNode` trees with the identifiers in
//!     `BuildArtifacts::variables`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let graph = SemanticGraph::new(vec![
//!         SemanticNode::new("Schedule", "n8n-nodes-base.scheduleTrigger")
//!             .connect("output0", "Is Weekend", 0),
//!         SemanticNode::new("Is Weekend", "n8n-nodes-base.if")
//!             .connect("true", "Sleep In", 0)
//!             .connect("false", "Send Report", 0),
//!         SemanticNode::new("Sleep In", "n8n-nodes-base.noOp"),
//!         SemanticNode::new("Send Report", "n8n-nodes-base.emailSend"),
//!     ])?;
//!
//!     let artifacts = Compiler::builder(graph).build().compile()?;
//!
//!     for root in &artifacts.roots {
//!         let display = DisplayComposite {
//!             node: root,
//!             variables: &artifacts.variables,
//!         };
//!         println!("{}", display);
//!     }
//!     for warning in &artifacts.warnings {
//!         println!("warning: {}", warning);
//!     }
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod compiler;
pub mod composite;
pub mod error;
pub mod graph;
pub mod prelude;
