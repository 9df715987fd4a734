use crate::graph::{ConstructKind, KindRegistry, OutputSlot, SemanticNode};
use serde_json::Value;

/// Slot name carrying failed items when a node routes errors to its own output.
pub const ERROR_SLOT: &str = "error";

/// Sticky notes are annotations without connections and never become variables.
pub fn is_variable_candidate(node: &SemanticNode, kinds: &KindRegistry) -> bool {
    kinds.classify(&node.node_type) != ConstructKind::Sticky
}

/// Parses the trailing integer of a slot name (`output3` -> 3, `case12` -> 12).
/// Defaults to 0 when there is none.
pub fn extract_slot_index(slot_name: &str) -> usize {
    let digits_start = slot_name
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(0, |(position, c)| position + c.len_utf8());
    slot_name[digits_start..].parse().unwrap_or(0)
}

/// The output index a slot occupies on its node, resolving the named slots
/// of if/else (`true`, `false`) and loop (`done`, `loop`) nodes.
pub fn output_index(node: &SemanticNode, kind: ConstructKind, slot_name: &str) -> usize {
    match (kind, slot_name) {
        (ConstructKind::IfElse, "true") | (ConstructKind::Loop, "done") => 0,
        (ConstructKind::IfElse, "false") | (ConstructKind::Loop, "loop") => 1,
        (ConstructKind::Switch, "fallback") => switch_case_count(node),
        (_, ERROR_SLOT) => main_output_count(node, kind).unwrap_or(1),
        _ => extract_slot_index(slot_name),
    }
}

/// Number of regular outputs a construct exposes, when it can be known
/// without looking at the wiring.
pub fn main_output_count(node: &SemanticNode, kind: ConstructKind) -> Option<usize> {
    match kind {
        ConstructKind::Plain | ConstructKind::Merge | ConstructKind::Sticky => Some(1),
        ConstructKind::IfElse | ConstructKind::Loop => Some(2),
        ConstructKind::Switch => switch_rule_count(node).map(|rules| {
            let extra_fallback = node
                .parameters()
                .and_then(|p| p.pointer("/options/fallbackOutput"))
                .and_then(Value::as_str)
                == Some("extra");
            rules + usize::from(extra_fallback)
        }),
    }
}

/// True for the slot that receives a node's failed items: a slot named
/// `error`, or, for nodes set to continue on their error output, the first
/// `outputN` slot past the regular outputs.
pub fn is_error_slot(node: &SemanticNode, kind: ConstructKind, slot_name: &str) -> bool {
    if slot_name == ERROR_SLOT {
        return true;
    }
    if !node.continues_on_error_output() || !slot_name.starts_with("output") {
        return false;
    }
    main_output_count(node, kind) == Some(extract_slot_index(slot_name))
}

pub fn error_output_slot(node: &SemanticNode, kind: ConstructKind) -> Option<&OutputSlot> {
    node.outputs
        .iter()
        .find(|slot| is_error_slot(node, kind, &slot.name))
}

/// Targets wired to the node's error slot, or empty.
pub fn error_output_targets(node: &SemanticNode, kind: ConstructKind) -> Vec<&str> {
    error_output_slot(node, kind)
        .map(slot_targets)
        .unwrap_or_default()
}

/// Non-error slots that have at least one connection, in slot order.
pub fn connected_main_slots(node: &SemanticNode, kind: ConstructKind) -> Vec<&OutputSlot> {
    node.outputs
        .iter()
        .filter(|slot| !slot.connections.is_empty() && !is_error_slot(node, kind, &slot.name))
        .collect()
}

/// The first non-error slot with connections: the node's main downstream path.
pub fn primary_output_slot(node: &SemanticNode, kind: ConstructKind) -> Option<&OutputSlot> {
    node.outputs
        .iter()
        .find(|slot| !slot.connections.is_empty() && !is_error_slot(node, kind, &slot.name))
}

pub fn primary_output_targets(node: &SemanticNode, kind: ConstructKind) -> Vec<&str> {
    primary_output_slot(node, kind)
        .map(slot_targets)
        .unwrap_or_default()
}

fn slot_targets(slot: &OutputSlot) -> Vec<&str> {
    slot.connections
        .iter()
        .map(|connection| connection.target.as_str())
        .collect()
}

/// One arm of a branching construct before it is built.
#[derive(Debug, Clone)]
pub struct ArmLayout<'a> {
    pub label: String,
    pub output_index: usize,
    pub slot: Option<&'a OutputSlot>,
}

/// The true/false arms of an if/else node. Slots may be named `true`/`false`
/// or `output0`/`output1`.
pub fn if_else_layout(node: &SemanticNode) -> Vec<ArmLayout<'_>> {
    [("true", "output0"), ("false", "output1")]
        .into_iter()
        .enumerate()
        .map(|(output_index, (label, positional))| ArmLayout {
            label: label.to_string(),
            output_index,
            slot: node.output(label).or_else(|| node.output(positional)),
        })
        .collect()
}

/// Number of rules configured on a switch node, if its parameters say so.
pub fn switch_rule_count(node: &SemanticNode) -> Option<usize> {
    node.parameters()
        .and_then(|p| p.pointer("/rules/values"))
        .and_then(Value::as_array)
        .map(Vec::len)
}

/// Number of case arms of a switch node: the larger of the configured rule
/// count and the highest wired or declared case slot.
///
/// A case slot only widens the layout up to the rule count plus the number
/// of slots the node has. Slots indexed past that bound get no arm.
pub fn switch_case_count(node: &SemanticNode) -> usize {
    let rules = switch_rule_count(node).unwrap_or(0);
    let limit = rules.saturating_add(node.outputs.len());
    let from_slots = node
        .outputs
        .iter()
        .filter(|slot| is_case_slot(&slot.name))
        .filter(|slot| !is_error_slot(node, ConstructKind::Switch, &slot.name))
        .filter_map(|slot| extract_slot_index(&slot.name).checked_add(1))
        .filter(|&count| count <= limit)
        .max()
        .unwrap_or(0);
    from_slots.max(rules)
}

fn is_case_slot(slot_name: &str) -> bool {
    slot_name.starts_with("case") || slot_name.starts_with("output")
}

/// One arm per case plus a trailing `fallback` arm when the node has that slot.
pub fn switch_layout(node: &SemanticNode) -> Vec<ArmLayout<'_>> {
    let case_count = switch_case_count(node);
    let mut arms: Vec<ArmLayout<'_>> = (0..case_count)
        .map(|index| ArmLayout {
            label: format!("case{}", index),
            output_index: index,
            slot: node
                .output(&format!("case{}", index))
                .or_else(|| node.output(&format!("output{}", index)))
                .filter(|slot| !is_error_slot(node, ConstructKind::Switch, &slot.name)),
        })
        .collect();

    if let Some(fallback) = node.output("fallback") {
        arms.push(ArmLayout {
            label: "fallback".to_string(),
            output_index: case_count,
            slot: Some(fallback),
        });
    }
    arms
}

/// Arms for a plain node that fans out through several distinct outputs.
pub fn multi_output_layout(node: &SemanticNode) -> Vec<ArmLayout<'_>> {
    connected_main_slots(node, ConstructKind::Plain)
        .into_iter()
        .map(|slot| ArmLayout {
            label: slot.name.clone(),
            output_index: extract_slot_index(&slot.name),
            slot: Some(slot),
        })
        .collect()
}

/// The `(done, loop body)` slots of a loop node, by name or by position
/// (`output0` is done, `output1` is the body).
pub fn loop_slots(node: &SemanticNode) -> (Option<&OutputSlot>, Option<&OutputSlot>) {
    let done = node.output("done").or_else(|| node.output("output0"));
    let body = node.output("loop").or_else(|| node.output("output1"));
    (done, body)
}
