use super::definition::SemanticGraph;
use crate::error::GraphError;

/// A trait for parser output that can be handed to the compiler as a `SemanticGraph`.
///
/// Parsing workflow files is not the compiler's job. Implement this on whatever
/// structs your parser produces to translate them into the canonical graph.
///
/// # Example
///
/// ```rust,no_run
/// use kumitate::error::GraphError;
/// use kumitate::graph::{IntoGraph, SemanticGraph, SemanticNode};
///
/// struct MyStep { name: String, kind: String, next: Option<String> }
/// struct MyWorkflow { steps: Vec<MyStep> }
///
/// impl IntoGraph for MyWorkflow {
///     fn into_graph(self) -> Result<SemanticGraph, GraphError> {
///         let nodes = self
///             .steps
///             .into_iter()
///             .map(|step| {
///                 let node = SemanticNode::new(step.name, step.kind);
///                 match step.next {
///                     Some(next) => node.connect("output0", next, 0),
///                     None => node,
///                 }
///             })
///             .collect();
///         SemanticGraph::new(nodes)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph the compiler can walk.
    fn into_graph(self) -> Result<SemanticGraph, GraphError>;
}

impl IntoGraph for SemanticGraph {
    fn into_graph(self) -> Result<SemanticGraph, GraphError> {
        Ok(self)
    }
}
