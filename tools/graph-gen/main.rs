use clap::Parser;
use rand::{Rng, rngs::ThreadRng};
use serde_json::{Map, Value, json};
use std::fs;

/// A CLI tool to generate random n8n-style workflows for the Kumitate builder
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// The minimum number of segments chained after the trigger
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of segments chained after the trigger
    #[arg(long, default_value_t = 8)]
    max: usize,
}

/// Accumulates nodes and main connections in export format.
struct Workflow {
    nodes: Vec<Value>,
    connections: Map<String, Value>,
}

impl Workflow {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Map::new(),
        }
    }

    fn add_node(&mut self, node_type: &str, parameters: Value) -> String {
        let name = format!("Node {}", self.nodes.len() + 1);
        let column = self.nodes.len() as i64;
        self.nodes.push(json!({
            "name": name,
            "type": node_type,
            "typeVersion": 1,
            "position": [column * 220, 300],
            "parameters": parameters,
        }));
        name
    }

    fn add_plain(&mut self, rng: &mut ThreadRng) -> String {
        let node_type = PLAIN_TYPES[rng.random_range(0..PLAIN_TYPES.len())];
        self.add_node(node_type, json!({}))
    }

    /// Wires `source`'s output `output` to input `input` of `target`.
    fn connect(&mut self, source: &str, output: usize, target: &str, input: usize) {
        let outputs = self
            .connections
            .entry(source.to_string())
            .or_insert_with(|| json!({ "main": [] }));
        let Some(main) = outputs.get_mut("main").and_then(Value::as_array_mut) else {
            return;
        };
        while main.len() <= output {
            main.push(json!([]));
        }
        if let Some(targets) = main[output].as_array_mut() {
            targets.push(json!({ "node": target, "type": "main", "index": input }));
        }
    }

    fn into_json(self) -> Value {
        json!({
            "name": "Generated workflow",
            "nodes": self.nodes,
            "connections": self.connections,
        })
    }
}

const PLAIN_TYPES: [&str; 4] = [
    "n8n-nodes-base.set",
    "n8n-nodes-base.httpRequest",
    "n8n-nodes-base.code",
    "n8n-nodes-base.noOp",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let segments = rng.random_range(cli.min..=cli.max);
    println!("Generating a workflow with {} segment(s)...", segments);

    let mut workflow = Workflow::new();
    let mut tail = workflow.add_node("n8n-nodes-base.manualTrigger", json!({}));

    for _ in 0..segments {
        tail = match rng.random_range(0..4) {
            0 => generate_chain(&mut workflow, &mut rng, &tail),
            1 => generate_if_else(&mut workflow, &mut rng, &tail),
            2 => generate_switch(&mut workflow, &mut rng, &tail),
            _ => generate_loop(&mut workflow, &mut rng, &tail),
        };
    }

    let node_count = workflow.nodes.len();
    let json_output = serde_json::to_string_pretty(&workflow.into_json())?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} node(s) and saved the workflow to '{}'",
        node_count, cli.output
    );

    Ok(())
}

// --- Segment Generators ---
// Each takes the current tail, appends a construct and returns the new tail.

fn generate_chain(workflow: &mut Workflow, rng: &mut ThreadRng, tail: &str) -> String {
    let mut current = tail.to_string();
    for _ in 0..rng.random_range(1..=3) {
        let next = workflow.add_plain(rng);
        workflow.connect(&current, 0, &next, 0);
        current = next;
    }
    current
}

/// An if/else whose arms converge at a merge.
fn generate_if_else(workflow: &mut Workflow, rng: &mut ThreadRng, tail: &str) -> String {
    let condition = workflow.add_node("n8n-nodes-base.if", json!({ "conditions": {} }));
    workflow.connect(tail, 0, &condition, 0);

    let merge = workflow.add_node("n8n-nodes-base.merge", json!({ "mode": "append" }));
    for (output, input) in [(0, 0), (1, 1)] {
        let arm = workflow.add_plain(rng);
        workflow.connect(&condition, output, &arm, 0);
        workflow.connect(&arm, 0, &merge, input);
    }
    merge
}

/// A switch with a few cases, some of them left unwired, joined afterwards.
fn generate_switch(workflow: &mut Workflow, rng: &mut ThreadRng, tail: &str) -> String {
    let cases = rng.random_range(2..=4);
    let rules: Vec<Value> = (0..cases).map(|case| json!({ "outputKey": case })).collect();
    let switch = workflow.add_node(
        "n8n-nodes-base.switch",
        json!({ "rules": { "values": rules } }),
    );
    workflow.connect(tail, 0, &switch, 0);

    let join = workflow.add_plain(rng);
    let mut wired = 0;
    for case in 0..cases {
        if wired > 0 && rng.random_bool(0.25) {
            continue;
        }
        let arm = workflow.add_plain(rng);
        workflow.connect(&switch, case, &arm, 0);
        workflow.connect(&arm, 0, &join, 0);
        wired += 1;
    }
    join
}

/// A batch loop whose body returns to the loop node.
fn generate_loop(workflow: &mut Workflow, rng: &mut ThreadRng, tail: &str) -> String {
    let batches = workflow.add_node(
        "n8n-nodes-base.splitInBatches",
        json!({ "batchSize": rng.random_range(1..=50u32) }),
    );
    workflow.connect(tail, 0, &batches, 0);

    let mut current = batches.clone();
    let mut output = 1;
    for _ in 0..rng.random_range(1..=2) {
        let step = workflow.add_plain(rng);
        workflow.connect(&current, output, &step, 0);
        current = step;
        output = 0;
    }
    workflow.connect(&current, 0, &batches, 0);

    let done = workflow.add_plain(rng);
    workflow.connect(&batches, 0, &done, 0);
    done
}
