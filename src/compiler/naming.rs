use crate::error::BuildError;
use ahash::AHashMap;
use itertools::Itertools;

/// Appended to identifiers that would shadow a reserved name.
pub const RESERVED_SUFFIX: &str = "_node";

/// Fallback for node names without a single alphanumeric character.
const EMPTY_IDENTIFIER: &str = "unnamed";

/// Keywords of the output language, the builder functions emitted code calls,
/// and globals that must never be shadowed.
const RESERVED_WORDS: &[&str] = &[
    // Keywords and literals
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield", "NaN", "Infinity",
    // Builder functions
    "workflow", "node", "trigger", "sticky", "placeholder", "newCredential", "ifElse",
    "switchCase", "merge", "splitInBatches", "nextBatch", "languageModel", "memory", "tool",
    "outputParser", "embedding", "embeddings", "vectorStore", "retriever", "documentLoader",
    "textSplitter", "fromAi", "expr",
    // Dangerous globals
    "eval", "Function", "globalThis", "window", "document", "process", "require", "module",
    "exports", "constructor", "prototype", "__proto__", "Object", "Array", "String",
    "Number", "Boolean", "Symbol", "Promise", "JSON", "Math", "Date", "RegExp", "Error",
    "console", "setTimeout", "setInterval",
];

pub fn is_reserved(identifier: &str) -> bool {
    RESERVED_WORDS.contains(&identifier)
}

/// Normalizes a node name into an identifier.
///
/// Runs of non-alphanumeric characters become a single `_`, trailing
/// underscores are dropped, a leading capital is lower-cased, a leading digit
/// gets a `_` prefix and reserved names get [`RESERVED_SUFFIX`].
///
/// This is a pure function; uniqueness across a build is [`VariableNamer`]'s job.
pub fn to_variable_name(node_name: &str) -> String {
    let mut identifier = String::with_capacity(node_name.len());
    for c in node_name.chars() {
        if c.is_ascii_alphanumeric() {
            identifier.push(c);
        } else if !identifier.ends_with('_') {
            identifier.push('_');
        }
    }
    while identifier.ends_with('_') {
        identifier.pop();
    }

    let mut identifier = match identifier.chars().next() {
        None => EMPTY_IDENTIFIER.to_string(),
        Some(first) if first.is_ascii_uppercase() => {
            format!("{}{}", first.to_ascii_lowercase(), &identifier[1..])
        }
        Some(first) if first.is_ascii_digit() => format!("_{}", identifier),
        Some(_) => identifier,
    };

    if is_reserved(&identifier) {
        identifier.push_str(RESERVED_SUFFIX);
    }
    identifier
}

/// Assigns collision-free identifiers for one build.
///
/// Names are handed out first come, first served: the first node keeps the
/// normalized identifier, later nodes that normalize to the same text get
/// `_2`, `_3`, ... appended.
#[derive(Debug, Default, Clone)]
pub struct VariableNamer {
    assigned: AHashMap<String, String>,
    owners: AHashMap<String, String>,
}

impl VariableNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier for `node_name`, assigning one on first use.
    pub fn assign(&mut self, node_name: &str) -> String {
        if let Some(existing) = self.assigned.get(node_name) {
            return existing.clone();
        }

        let base = to_variable_name(node_name);
        let mut candidate = base.clone();
        let mut counter = 2;
        while self.owners.contains_key(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }

        self.owners.insert(candidate.clone(), node_name.to_string());
        self.assigned
            .insert(node_name.to_string(), candidate.clone());
        candidate
    }

    pub fn get(&self, node_name: &str) -> Option<&str> {
        self.assigned.get(node_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn into_map(self) -> AHashMap<String, String> {
        self.assigned
    }
}

/// Fails if two node names share one identifier in `variables`.
pub fn verify_unique_identifiers(variables: &AHashMap<String, String>) -> Result<(), BuildError> {
    let collision = variables
        .iter()
        .map(|(node, identifier)| (identifier, node))
        .into_group_map()
        .into_iter()
        .find(|(_, nodes)| nodes.len() > 1);

    match collision {
        Some((identifier, nodes)) => {
            let mut nodes = nodes.into_iter().sorted();
            Err(BuildError::NamingCollision {
                identifier: identifier.clone(),
                first: nodes.next().cloned().unwrap_or_default(),
                second: nodes.next().cloned().unwrap_or_default(),
            })
        }
        None => Ok(()),
    }
}
