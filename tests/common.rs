//! Common test utilities for building workflow graphs.
use kumitate::prelude::*;
use serde_json::json;

#[allow(dead_code)]
pub const TRIGGER: &str = "n8n-nodes-base.manualTrigger";
#[allow(dead_code)]
pub const SET: &str = "n8n-nodes-base.set";
#[allow(dead_code)]
pub const IF: &str = "n8n-nodes-base.if";
#[allow(dead_code)]
pub const SWITCH: &str = "n8n-nodes-base.switch";
#[allow(dead_code)]
pub const MERGE: &str = "n8n-nodes-base.merge";
#[allow(dead_code)]
pub const LOOP: &str = "n8n-nodes-base.splitInBatches";

#[allow(dead_code)]
pub fn node(name: &str, node_type: &str) -> SemanticNode {
    SemanticNode::new(name, node_type)
}

#[allow(dead_code)]
pub fn graph(nodes: Vec<SemanticNode>) -> SemanticGraph {
    SemanticGraph::new(nodes).expect("test graph should be valid")
}

#[allow(dead_code)]
pub fn compile(graph: SemanticGraph) -> BuildArtifacts {
    build(graph).expect("build should succeed")
}

#[allow(dead_code)]
pub fn leaf(name: &str) -> CompositeNode {
    CompositeNode::leaf(name)
}

#[allow(dead_code)]
pub fn seq(head: CompositeNode, tail: CompositeNode) -> CompositeNode {
    CompositeNode::Sequence {
        head: Box::new(head),
        tail: Box::new(tail),
    }
}

#[allow(dead_code)]
pub fn reference(var_name: &str, node_name: &str) -> CompositeNode {
    CompositeNode::VariableReference {
        var_name: var_name.to_string(),
        node_name: node_name.to_string(),
    }
}

#[allow(dead_code)]
pub fn arm(label: &str, output_index: usize, body: Option<CompositeNode>) -> BranchArm {
    BranchArm {
        label: label.to_string(),
        output_index,
        body: body.map(Box::new),
    }
}

#[allow(dead_code)]
pub fn input(input_index: usize, source: &str) -> MergeInput {
    MergeInput {
        input_index,
        source: source.to_string(),
    }
}

#[allow(dead_code)]
pub fn reconnect(
    source: &str,
    source_output: usize,
    target: &str,
    target_input: usize,
) -> CompositeNode {
    CompositeNode::Reconnect {
        source: source.to_string(),
        source_output,
        target: target.to_string(),
        target_input,
    }
}

/// A switch node configured with `cases` routing rules.
#[allow(dead_code)]
pub fn switch_node(name: &str, cases: usize) -> SemanticNode {
    let rules: Vec<_> = (0..cases).map(|case| json!({ "outputKey": case })).collect();
    node(name, SWITCH).with_json(json!({ "parameters": { "rules": { "values": rules } } }))
}

/// Creates the canonical merge scenario.
///
/// Logic: `Trigger` fans out to `Left` and `Right`, both feed `Join`, which continues to `Store`.
#[allow(dead_code)]
pub fn create_fan_in_merge() -> SemanticGraph {
    graph(vec![
        node("Trigger", TRIGGER)
            .connect("output0", "Left", 0)
            .connect("output0", "Right", 0),
        node("Left", SET).connect("output0", "Join", 0),
        node("Right", SET).connect("output0", "Join", 1),
        node("Join", MERGE).connect("output0", "Store", 0),
        node("Store", SET),
    ])
}

/// An if/else whose two arms converge on a plain node.
#[allow(dead_code)]
pub fn create_if_else_convergence() -> SemanticGraph {
    graph(vec![
        node("Trigger", TRIGGER).connect("output0", "Check", 0),
        node("Check", IF)
            .connect("true", "Accept", 0)
            .connect("false", "Reject", 0),
        node("Accept", SET).connect("output0", "Notify", 0),
        node("Reject", SET).connect("output0", "Notify", 0),
        node("Notify", SET),
    ])
}

/// A batch loop: the body feeds back into the loop node, `Report` runs once done.
#[allow(dead_code)]
pub fn create_batch_loop() -> SemanticGraph {
    graph(vec![
        node("Trigger", TRIGGER).connect("output0", "Batches", 0),
        node("Batches", LOOP)
            .connect("done", "Report", 0)
            .connect("loop", "Process", 0),
        node("Process", SET).connect("output0", "Batches", 0),
        node("Report", SET),
    ])
}

// --- Generated graph family ---

/// A building block appended after the current tail of a generated graph.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Chain,
    IfToMerge,
    IfToJoin,
    Switch,
    FanOutMerge,
    BatchLoop,
}

#[allow(dead_code)]
pub const ALL_SEGMENTS: [Segment; 6] = [
    Segment::Chain,
    Segment::IfToMerge,
    Segment::IfToJoin,
    Segment::Switch,
    Segment::FanOutMerge,
    Segment::BatchLoop,
];

/// Assembles a graph by appending each segment after the previous tail.
#[allow(dead_code)]
pub struct GraphAssembler {
    nodes: Vec<SemanticNode>,
    tail: String,
}

#[allow(dead_code)]
impl GraphAssembler {
    pub fn new() -> Self {
        Self {
            nodes: vec![node("Start", TRIGGER)],
            tail: "Start".to_string(),
        }
    }

    fn add(&mut self, prefix: &str, node_type: &str) -> String {
        let name = format!("{} {}", prefix, self.nodes.len());
        self.nodes.push(node(&name, node_type));
        name
    }

    fn wire(&mut self, source: &str, slot: &str, target: &str, input: usize) {
        if let Some(position) = self.nodes.iter().position(|n| n.name == source) {
            let updated = self.nodes[position].clone().connect(slot, target, input);
            self.nodes[position] = updated;
        }
    }

    pub fn push(&mut self, segment: Segment) -> &mut Self {
        let tail = self.tail.clone();
        self.tail = match segment {
            Segment::Chain => {
                let a = self.add("Step", SET);
                let b = self.add("Step", SET);
                self.wire(&tail, "output0", &a, 0);
                self.wire(&a, "output0", &b, 0);
                b
            }
            Segment::IfToMerge => {
                let check = self.add("Check", IF);
                let yes = self.add("Yes", SET);
                let no = self.add("No", SET);
                let merge = self.add("Merge", MERGE);
                self.wire(&tail, "output0", &check, 0);
                self.wire(&check, "true", &yes, 0);
                self.wire(&check, "false", &no, 0);
                self.wire(&yes, "output0", &merge, 0);
                self.wire(&no, "output0", &merge, 1);
                merge
            }
            Segment::IfToJoin => {
                let check = self.add("Check", IF);
                let yes = self.add("Yes", SET);
                let no = self.add("No", SET);
                let join = self.add("Join", SET);
                self.wire(&tail, "output0", &check, 0);
                self.wire(&check, "true", &yes, 0);
                self.wire(&check, "false", &no, 0);
                self.wire(&yes, "output0", &join, 0);
                self.wire(&no, "output0", &join, 0);
                join
            }
            Segment::Switch => {
                let name = format!("Route {}", self.nodes.len());
                self.nodes.push(switch_node(&name, 3));
                let first = self.add("Case", SET);
                let third = self.add("Case", SET);
                let join = self.add("Join", SET);
                self.wire(&tail, "output0", &name, 0);
                self.wire(&name, "case0", &first, 0);
                self.wire(&name, "case2", &third, 0);
                self.wire(&first, "output0", &join, 0);
                self.wire(&third, "output0", &join, 0);
                join
            }
            Segment::FanOutMerge => {
                let left = self.add("Left", SET);
                let right = self.add("Right", SET);
                let merge = self.add("Merge", MERGE);
                self.wire(&tail, "output0", &left, 0);
                self.wire(&tail, "output0", &right, 0);
                self.wire(&left, "output0", &merge, 0);
                self.wire(&right, "output0", &merge, 1);
                merge
            }
            Segment::BatchLoop => {
                let batches = self.add("Batches", LOOP);
                let body = self.add("Body", SET);
                let done = self.add("Done", SET);
                self.wire(&tail, "output0", &batches, 0);
                self.wire(&batches, "loop", &body, 0);
                self.wire(&body, "output0", &batches, 0);
                self.wire(&batches, "done", &done, 0);
                done
            }
        };
        self
    }

    pub fn finish(&self) -> SemanticGraph {
        graph(self.nodes.clone())
    }
}

/// Counts how often each graph node is declared across a forest.
#[allow(dead_code)]
pub fn declaration_counts(roots: &[CompositeNode]) -> ahash::AHashMap<String, usize> {
    let mut counts = ahash::AHashMap::new();
    for root in roots {
        for leaf in root.declared_leaves() {
            *counts.entry(leaf.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
