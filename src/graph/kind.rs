use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The structured-programming construct a node maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructKind {
    Plain,
    IfElse,
    Switch,
    Merge,
    Loop,
    /// Presentation-only annotation; never wired, never a variable.
    Sticky,
}

/// Built-in type names, both the fully qualified n8n base node types and short aliases.
const DEFAULT_KIND_MAPPINGS: &[(&str, ConstructKind)] = &[
    ("n8n-nodes-base.if", ConstructKind::IfElse),
    ("n8n-nodes-base.switch", ConstructKind::Switch),
    ("n8n-nodes-base.merge", ConstructKind::Merge),
    ("n8n-nodes-base.splitInBatches", ConstructKind::Loop),
    ("n8n-nodes-base.stickyNote", ConstructKind::Sticky),
    ("if", ConstructKind::IfElse),
    ("ifElse", ConstructKind::IfElse),
    ("switch", ConstructKind::Switch),
    ("merge", ConstructKind::Merge),
    ("loop", ConstructKind::Loop),
    ("splitInBatches", ConstructKind::Loop),
    ("sticky", ConstructKind::Sticky),
    ("stickyNote", ConstructKind::Sticky),
];

/// Maps node type strings onto construct kinds. Unregistered types are `Plain`.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    mappings: AHashMap<String, ConstructKind>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mappings = DEFAULT_KIND_MAPPINGS
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        Self { mappings }
    }
}

impl KindRegistry {
    pub fn register(&mut self, type_name: &str, kind: ConstructKind) {
        self.mappings.insert(type_name.to_string(), kind);
    }

    pub fn classify(&self, type_name: &str) -> ConstructKind {
        self.mappings
            .get(type_name)
            .copied()
            .unwrap_or(ConstructKind::Plain)
    }
}
