use crate::error::GraphError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A directed edge leaving an output slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub target: String,
    pub target_input_index: usize,
}

impl Connection {
    pub fn new(target: impl Into<String>, target_input_index: usize) -> Self {
        Self {
            target: target.into(),
            target_input_index,
        }
    }
}

/// A named output slot (`output0`, `true`, `case2`, `error`, `done`, ...) and its edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSlot {
    pub name: String,
    pub connections: Vec<Connection>,
}

/// The non-main connection type that wires an auxiliary node into its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    AiAgent,
    AiChain,
    AiDocument,
    AiEmbedding,
    AiLanguageModel,
    AiMemory,
    AiOutputParser,
    AiRetriever,
    AiTextSplitter,
    AiTool,
    AiVectorStore,
    Other(String),
}

impl ConnectionType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ai_agent" => ConnectionType::AiAgent,
            "ai_chain" => ConnectionType::AiChain,
            "ai_document" => ConnectionType::AiDocument,
            "ai_embedding" => ConnectionType::AiEmbedding,
            "ai_languageModel" => ConnectionType::AiLanguageModel,
            "ai_memory" => ConnectionType::AiMemory,
            "ai_outputParser" => ConnectionType::AiOutputParser,
            "ai_retriever" => ConnectionType::AiRetriever,
            "ai_textSplitter" => ConnectionType::AiTextSplitter,
            "ai_tool" => ConnectionType::AiTool,
            "ai_vectorStore" => ConnectionType::AiVectorStore,
            other => ConnectionType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConnectionType::AiAgent => "ai_agent",
            ConnectionType::AiChain => "ai_chain",
            ConnectionType::AiDocument => "ai_document",
            ConnectionType::AiEmbedding => "ai_embedding",
            ConnectionType::AiLanguageModel => "ai_languageModel",
            ConnectionType::AiMemory => "ai_memory",
            ConnectionType::AiOutputParser => "ai_outputParser",
            ConnectionType::AiRetriever => "ai_retriever",
            ConnectionType::AiTextSplitter => "ai_textSplitter",
            ConnectionType::AiTool => "ai_tool",
            ConnectionType::AiVectorStore => "ai_vectorStore",
            ConnectionType::Other(name) => name,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An auxiliary node attached to its parent through a non-main connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnodeAttachment {
    pub node: String,
    pub connection_type: ConnectionType,
}

/// One workflow node as handed over by the graph parser.
///
/// `json` is opaque apart from the few fields the compiler inspects
/// (`parameters`, `onError`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub name: String,
    pub node_type: String,
    pub json: Value,
    pub outputs: Vec<OutputSlot>,
    pub subnodes: Vec<SubnodeAttachment>,
}

impl SemanticNode {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            json: Value::Null,
            outputs: Vec::new(),
            subnodes: Vec::new(),
        }
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = json;
        self
    }

    /// Adds an edge from `slot` to `target`, creating the slot on first use.
    /// Slots keep the order in which they were first added.
    pub fn connect(mut self, slot: &str, target: impl Into<String>, input_index: usize) -> Self {
        self.slot_mut(slot)
            .connections
            .push(Connection::new(target, input_index));
        self
    }

    /// Declares a slot without connections (an unwired switch case, for example).
    pub fn with_empty_slot(mut self, slot: &str) -> Self {
        self.slot_mut(slot);
        self
    }

    pub fn with_subnode(mut self, node: impl Into<String>, connection_type: ConnectionType) -> Self {
        self.subnodes.push(SubnodeAttachment {
            node: node.into(),
            connection_type,
        });
        self
    }

    pub fn output(&self, slot: &str) -> Option<&OutputSlot> {
        self.outputs.iter().find(|s| s.name == slot)
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.json.get("parameters")
    }

    /// True when the node routes failed items to a dedicated error output.
    pub fn continues_on_error_output(&self) -> bool {
        self.json.get("onError").and_then(Value::as_str) == Some("continueErrorOutput")
    }

    fn slot_mut(&mut self, slot: &str) -> &mut OutputSlot {
        let position = match self.outputs.iter().position(|s| s.name == slot) {
            Some(position) => position,
            None => {
                self.outputs.push(OutputSlot {
                    name: slot.to_string(),
                    connections: Vec::new(),
                });
                self.outputs.len() - 1
            }
        };
        &mut self.outputs[position]
    }
}

/// A main-connection edge seen from its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEdge {
    pub source: String,
    pub source_slot: String,
    pub target_input_index: usize,
}

/// The read-only input of a build: nodes keyed by name, in parser order.
///
/// Parser order is the canonical iteration order and decides every tie during
/// traversal, so the same graph always yields the same tree.
#[derive(Debug, Clone, Default)]
pub struct SemanticGraph {
    nodes: Vec<SemanticNode>,
    index: AHashMap<String, usize>,
    incoming: AHashMap<String, Vec<IncomingEdge>>,
    subnode_owners: AHashMap<String, String>,
}

impl SemanticGraph {
    pub fn new(nodes: Vec<SemanticNode>) -> Result<Self, GraphError> {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), position).is_some() {
                return Err(GraphError::DuplicateNode(node.name.clone()));
            }
        }

        let mut incoming: AHashMap<String, Vec<IncomingEdge>> = AHashMap::new();
        let mut subnode_owners = AHashMap::new();
        for node in &nodes {
            for slot in &node.outputs {
                for connection in &slot.connections {
                    incoming
                        .entry(connection.target.clone())
                        .or_default()
                        .push(IncomingEdge {
                            source: node.name.clone(),
                            source_slot: slot.name.clone(),
                            target_input_index: connection.target_input_index,
                        });
                }
            }
            for attachment in &node.subnodes {
                subnode_owners
                    .entry(attachment.node.clone())
                    .or_insert_with(|| node.name.clone());
            }
        }

        Ok(Self {
            nodes,
            index,
            incoming,
            subnode_owners,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SemanticNode> {
        self.index.get(name).map(|&position| &self.nodes[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn nodes(&self) -> &[SemanticNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the node in parser order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn incoming(&self, name: &str) -> &[IncomingEdge] {
        self.incoming.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first node (in parser order) that attaches `name` as a subnode.
    pub fn subnode_owner(&self, name: &str) -> Option<&str> {
        self.subnode_owners.get(name).map(String::as_str)
    }

    /// Trigger nodes: no incoming main connection and not owned as a subnode.
    pub fn roots(&self) -> impl Iterator<Item = &SemanticNode> {
        self.nodes.iter().filter(|node| {
            self.incoming(&node.name).is_empty() && !self.subnode_owners.contains_key(&node.name)
        })
    }
}
