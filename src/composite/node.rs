use crate::graph::ConnectionType;
use serde::{Deserialize, Serialize};

/// Which branching construct a `CompositeNode::Branch` was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchKind {
    IfElse,
    Switch,
    /// A plain node with more than one wired non-error output.
    MultiOutput,
}

/// One outgoing path of a branch. `body` is `None` for an unwired output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchArm {
    pub label: String,
    pub output_index: usize,
    pub body: Option<Box<CompositeNode>>,
}

/// A statically wired producer of a merge input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeInput {
    pub input_index: usize,
    pub source: String,
}

/// An auxiliary node declared inside its parent's leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedSubnode {
    pub connection_type: ConnectionType,
    pub node: CompositeNode,
}

/// The structured output tree.
///
/// Every graph node is declared by exactly one `Leaf` across a build's forest.
/// `Branch`, `Merge` and `Loop` carry their construct node's leaf as `head`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeNode {
    Leaf {
        node: String,
        subnodes: Vec<AttachedSubnode>,
        error_handler: Option<Box<CompositeNode>>,
    },
    VariableReference {
        var_name: String,
        node_name: String,
    },
    Sequence {
        head: Box<CompositeNode>,
        tail: Box<CompositeNode>,
    },
    FanOut {
        targets: Vec<CompositeNode>,
    },
    Branch {
        head: Box<CompositeNode>,
        kind: BranchKind,
        arms: Vec<BranchArm>,
    },
    Merge {
        head: Box<CompositeNode>,
        inputs: Vec<MergeInput>,
        downstream: Option<Box<CompositeNode>>,
    },
    Loop {
        head: Box<CompositeNode>,
        body: Option<Box<CompositeNode>>,
        after: Option<Box<CompositeNode>>,
    },
    /// Root-level edge that could not be expressed inline, e.g. a second producer into a merge.
    Reconnect {
        source: String,
        source_output: usize,
        target: String,
        target_input: usize,
    },
}

impl CompositeNode {
    pub fn leaf(node: impl Into<String>) -> Self {
        CompositeNode::Leaf {
            node: node.into(),
            subnodes: Vec::new(),
            error_handler: None,
        }
    }

    /// The node this composite declares, looking through `head` for constructs.
    pub fn declared_node(&self) -> Option<&str> {
        match self {
            CompositeNode::Leaf { node, .. } => Some(node),
            CompositeNode::Branch { head, .. }
            | CompositeNode::Merge { head, .. }
            | CompositeNode::Loop { head, .. }
            | CompositeNode::Sequence { head, .. } => head.declared_node(),
            CompositeNode::VariableReference { .. }
            | CompositeNode::FanOut { .. }
            | CompositeNode::Reconnect { .. } => None,
        }
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<&CompositeNode> {
        match self {
            CompositeNode::Leaf {
                subnodes,
                error_handler,
                ..
            } => subnodes
                .iter()
                .map(|s| &s.node)
                .chain(error_handler.as_deref())
                .collect(),
            CompositeNode::Sequence { head, tail } => vec![&**head, &**tail],
            CompositeNode::FanOut { targets } => targets.iter().collect(),
            CompositeNode::Branch { head, arms, .. } => std::iter::once(&**head)
                .chain(arms.iter().filter_map(|arm| arm.body.as_deref()))
                .collect(),
            CompositeNode::Merge {
                head, downstream, ..
            } => std::iter::once(&**head)
                .chain(downstream.as_deref())
                .collect(),
            CompositeNode::Loop { head, body, after } => std::iter::once(&**head)
                .chain(body.as_deref())
                .chain(after.as_deref())
                .collect(),
            CompositeNode::VariableReference { .. } | CompositeNode::Reconnect { .. } => {
                Vec::new()
            }
        }
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CompositeNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Names of all nodes declared by a `Leaf` in this subtree.
    pub fn declared_leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.walk(&mut |composite| {
            if let CompositeNode::Leaf { node, .. } = composite {
                leaves.push(node.as_str());
            }
        });
        leaves
    }

    /// Names of all nodes this subtree refers to without declaring them.
    pub fn referenced_nodes(&self) -> Vec<&str> {
        let mut references = Vec::new();
        self.walk(&mut |composite| match composite {
            CompositeNode::VariableReference { node_name, .. } => {
                references.push(node_name.as_str());
            }
            CompositeNode::Reconnect { source, target, .. } => {
                references.push(source.as_str());
                references.push(target.as_str());
            }
            _ => {}
        });
        references
    }
}
