use crate::composite::CompositeNode;
use crate::error::{BuildError, BuildWarning};
use crate::graph::{ConstructKind, KindRegistry, SemanticGraph};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

mod branch;
mod builder;
pub mod classify;
mod context;
mod cycles;
mod loops;
mod merge;
pub mod naming;
mod resolve;

use builder::CompositeBuilder;
use context::BuildContext;
use naming::VariableNamer;

/// Default recursion-depth limit. A well-formed graph never comes close to it,
/// since depth is bounded by node count.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// The result of one build: one tree per trigger plus root-level deferred
/// work, the identifier assigned to every variable candidate, and warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildArtifacts {
    pub roots: Vec<CompositeNode>,
    pub variables: AHashMap<String, String>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildArtifacts {
    pub fn identifier_for(&self, node_name: &str) -> Option<&str> {
        self.variables.get(node_name).map(String::as_str)
    }
}

pub struct Compiler {
    graph: SemanticGraph,
    kinds: KindRegistry,
    max_depth: usize,
    deny_warnings: bool,
}

pub struct CompilerBuilder {
    graph: SemanticGraph,
    kinds: KindRegistry,
    max_depth: usize,
    deny_warnings: bool,
}

impl CompilerBuilder {
    pub fn new(graph: SemanticGraph) -> Self {
        Self {
            graph,
            kinds: KindRegistry::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            deny_warnings: false,
        }
    }

    /// Treats nodes of `type_name` as the given construct.
    pub fn with_type_mapping(mut self, type_name: &str, kind: ConstructKind) -> Self {
        self.kinds.register(type_name, kind);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Turns any collected warning into a `BuildError::WarningsDenied`.
    pub fn deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            kinds: self.kinds,
            max_depth: self.max_depth,
            deny_warnings: self.deny_warnings,
        }
    }
}

impl Compiler {
    pub fn builder(graph: SemanticGraph) -> CompilerBuilder {
        CompilerBuilder::new(graph)
    }

    pub fn graph(&self) -> &SemanticGraph {
        &self.graph
    }

    /// Identifiers are handed out in graph order before traversal starts, so
    /// they never depend on the order the walk reaches nodes in.
    fn assign_variables(&self) -> AHashMap<String, String> {
        let mut namer = VariableNamer::new();
        for node in self.graph.nodes() {
            if classify::is_variable_candidate(node, &self.kinds) {
                namer.assign(&node.name);
            }
        }
        namer.into_map()
    }

    /// Transforms the graph into composite trees.
    ///
    /// Either the whole forest is returned, internally consistent, or a single
    /// fatal error.
    pub fn compile(self) -> Result<BuildArtifacts, BuildError> {
        let variables = self.assign_variables();
        let ctx = BuildContext::new(&self.graph, &self.kinds, self.max_depth, variables);
        let mut builder = CompositeBuilder::new(ctx);

        let roots = builder.build_forest()?;
        let (variables, warnings) = builder.ctx.into_parts();

        if self.deny_warnings {
            if let Some(first) = warnings.first() {
                return Err(BuildError::WarningsDenied {
                    count: warnings.len(),
                    first: first.to_string(),
                });
            }
        }

        tracing::debug!(
            nodes = self.graph.len(),
            roots = roots.len(),
            warnings = warnings.len(),
            "composite build complete"
        );

        Ok(BuildArtifacts {
            roots,
            variables,
            warnings,
        })
    }
}

/// Builds a graph with the default configuration.
pub fn build(graph: SemanticGraph) -> Result<BuildArtifacts, BuildError> {
    Compiler::builder(graph).build().compile()
}
