use ahash::AHashMap;
use clap::{Parser, ValueEnum};
use kumitate::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the n8n workflow export format and are only used here for conversion.

#[derive(Deserialize)]
struct RawWorkflow {
    nodes: Vec<Value>,
    #[serde(default)]
    connections: AHashMap<String, AHashMap<String, Vec<Option<Vec<RawConnection>>>>>,
}

#[derive(Deserialize)]
struct RawConnection {
    node: String,
    #[serde(default)]
    index: usize,
}

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindCli {
    Plain,
    IfElse,
    Switch,
    Merge,
    Loop,
    Sticky,
}

impl From<KindCli> for ConstructKind {
    fn from(kind: KindCli) -> Self {
        match kind {
            KindCli::Plain => ConstructKind::Plain,
            KindCli::IfElse => ConstructKind::IfElse,
            KindCli::Switch => ConstructKind::Switch,
            KindCli::Merge => ConstructKind::Merge,
            KindCli::Loop => ConstructKind::Loop,
            KindCli::Sticky => ConstructKind::Sticky,
        }
    }
}

// --- Converter Implementation ---
// This implements the conversion from the raw export to Kumitate's canonical SemanticGraph.

impl IntoGraph for RawWorkflow {
    fn into_graph(self) -> std::result::Result<SemanticGraph, GraphError> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for raw in self.nodes {
            let name = raw
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| GraphError::InvalidDefinition("node without a name".to_string()))?
                .to_string();
            let node_type = raw
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    GraphError::InvalidDefinition(format!("node '{}' has no type", name))
                })?
                .to_string();
            nodes.push(SemanticNode::new(name, node_type).with_json(raw));
        }

        // Attachments are collected per parent, walking sources in node order
        // so the result never depends on map iteration order.
        let mut attachments: AHashMap<String, Vec<SubnodeAttachment>> = AHashMap::new();
        for node in nodes.iter_mut() {
            let Some(by_type) = self.connections.get(&node.name) else {
                continue;
            };
            let mut types: Vec<_> = by_type.keys().collect();
            types.sort();
            for connection_type in types {
                for (output, targets) in by_type[connection_type].iter().enumerate() {
                    for target in targets.iter().flatten() {
                        if connection_type == "main" {
                            let slot = format!("output{}", output);
                            match node.outputs.iter_mut().find(|s| s.name == slot) {
                                Some(existing) => existing
                                    .connections
                                    .push(Connection::new(target.node.clone(), target.index)),
                                None => node.outputs.push(OutputSlot {
                                    name: slot,
                                    connections: vec![Connection::new(
                                        target.node.clone(),
                                        target.index,
                                    )],
                                }),
                            }
                        } else {
                            attachments
                                .entry(target.node.clone())
                                .or_default()
                                .push(SubnodeAttachment {
                                    node: node.name.clone(),
                                    connection_type: ConnectionType::from_name(connection_type),
                                });
                        }
                    }
                }
            }
        }

        for node in nodes.iter_mut() {
            if let Some(attached) = attachments.remove(&node.name) {
                node.subnodes.extend(attached);
            }
        }

        SemanticGraph::new(nodes)
    }
}

/// Rebuilds a workflow graph as structured composite trees
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file
    workflow_path: String,

    /// Print the build artifacts as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Write the build artifacts to this path (bincode)
    #[arg(short, long)]
    save: Option<String>,

    /// Fail the build when any warning is produced
    #[arg(long)]
    strict: bool,

    /// Recursion depth limit
    #[arg(long)]
    max_depth: Option<usize>,

    /// Treat a node type as a construct, e.g. `--map acme.branch=if-else`
    #[arg(long = "map", value_parser = parse_type_mapping)]
    mappings: Vec<(String, KindCli)>,
}

fn parse_type_mapping(raw: &str) -> std::result::Result<(String, KindCli), String> {
    let (type_name, kind) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=KIND, got '{}'", raw))?;
    let kind = KindCli::from_str(kind, true)?;
    Ok((type_name.to_string(), kind))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Loading and Conversion ---
    let workflow_json = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });
    let raw: RawWorkflow = serde_json::from_str(&workflow_json).unwrap_or_else(|e| {
        exit_with_error(&GraphError::JsonParseError(e.to_string()).to_string())
    });
    let graph = raw
        .into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert workflow: {}", e)));
    let node_count = graph.len();

    // --- 2. Compilation ---
    let mut builder = Compiler::builder(graph).deny_warnings(cli.strict);
    if let Some(max_depth) = cli.max_depth {
        builder = builder.with_max_depth(max_depth);
    }
    for (type_name, kind) in &cli.mappings {
        builder = builder.with_type_mapping(type_name, (*kind).into());
    }

    let compile_start = Instant::now();
    let artifacts = builder
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Build failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    // --- 3. Output ---
    if let Some(path) = &cli.save {
        artifacts
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        eprintln!("Artifacts saved to '{}'", path);
    }

    if cli.json {
        let json = artifacts
            .to_json_pretty()
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        println!("{}", json);
        return;
    }

    for (position, root) in artifacts.roots.iter().enumerate() {
        println!("Tree {}:", position + 1);
        let display = DisplayComposite {
            node: root,
            variables: &artifacts.variables,
        };
        print!("{}", display);
    }

    println!("\n--- Variables ---");
    let mut variables: Vec<_> = artifacts.variables.iter().collect();
    variables.sort();
    for (node, identifier) in variables {
        println!("  {:<32} {}", identifier, node);
    }

    if !artifacts.warnings.is_empty() {
        println!("\n--- Warnings ---");
        for warning in &artifacts.warnings {
            println!("  - {}", warning);
        }
    }

    println!("\n--- Summary ---");
    println!("Nodes:        {}", node_count);
    println!("Trees:        {}", artifacts.roots.len());
    println!("Build:        {:?}", compile_duration);
    println!("Total:        {:?}", total_start.elapsed());
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
