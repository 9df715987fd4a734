use super::{BranchKind, CompositeNode};
use ahash::AHashMap;
use itertools::Itertools;
use std::fmt;

/// A wrapper to display a composite tree together with the identifiers assigned during the build.
pub struct DisplayComposite<'a> {
    pub node: &'a CompositeNode,
    pub variables: &'a AHashMap<String, String>,
}

impl<'a> fmt::Display for DisplayComposite<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.node, f, "", true)
    }
}

impl<'a> DisplayComposite<'a> {
    fn fmt_as_tree(
        &self,
        node: &CompositeNode,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match node {
            CompositeNode::Leaf {
                node,
                subnodes,
                error_handler,
            } => {
                writeln!(f, "Leaf: {}", self.describe(node))?;
                let mut remaining = subnodes.len() + usize::from(error_handler.is_some());
                for subnode in subnodes {
                    remaining -= 1;
                    self.fmt_labeled(
                        f,
                        &format!("[{}]", subnode.connection_type),
                        Some(&subnode.node),
                        &child_prefix,
                        remaining == 0,
                    )?;
                }
                if let Some(handler) = error_handler {
                    self.fmt_labeled(f, "[on error]", Some(handler), &child_prefix, true)?;
                }
            }
            CompositeNode::VariableReference { var_name, node_name } => {
                writeln!(f, "Ref: {} ({})", var_name, node_name)?;
            }
            CompositeNode::Sequence { head, tail } => {
                writeln!(f, "Sequence")?;
                self.fmt_as_tree(head, f, &child_prefix, false)?;
                self.fmt_as_tree(tail, f, &child_prefix, true)?;
            }
            CompositeNode::FanOut { targets } => {
                writeln!(f, "FanOut ({})", targets.len())?;
                for (position, target) in targets.iter().enumerate() {
                    self.fmt_as_tree(target, f, &child_prefix, position + 1 == targets.len())?;
                }
            }
            CompositeNode::Branch { head, kind, arms } => {
                let label = match kind {
                    BranchKind::IfElse => "IfElse",
                    BranchKind::Switch => "Switch",
                    BranchKind::MultiOutput => "MultiOutput",
                };
                writeln!(f, "{}", label)?;
                self.fmt_as_tree(head, f, &child_prefix, arms.is_empty())?;
                for (position, arm) in arms.iter().enumerate() {
                    self.fmt_labeled(
                        f,
                        &format!("[{}]", arm.label),
                        arm.body.as_deref(),
                        &child_prefix,
                        position + 1 == arms.len(),
                    )?;
                }
            }
            CompositeNode::Merge {
                head,
                inputs,
                downstream,
            } => {
                let wiring = inputs
                    .iter()
                    .map(|input| format!("{}<-{}", input.input_index, input.source))
                    .join(", ");
                writeln!(f, "Merge [{}]", wiring)?;
                self.fmt_as_tree(head, f, &child_prefix, downstream.is_none())?;
                if let Some(downstream) = downstream {
                    self.fmt_as_tree(downstream, f, &child_prefix, true)?;
                }
            }
            CompositeNode::Loop { head, body, after } => {
                writeln!(f, "Loop")?;
                self.fmt_as_tree(head, f, &child_prefix, false)?;
                self.fmt_labeled(f, "[each batch]", body.as_deref(), &child_prefix, false)?;
                self.fmt_labeled(f, "[done]", after.as_deref(), &child_prefix, true)?;
            }
            CompositeNode::Reconnect {
                source,
                source_output,
                target,
                target_input,
            } => {
                writeln!(
                    f,
                    "Connect: {}[{}] -> {}[{}]",
                    self.describe(source),
                    source_output,
                    self.describe(target),
                    target_input
                )?;
            }
        }
        Ok(())
    }

    fn fmt_labeled(
        &self,
        f: &mut fmt::Formatter<'_>,
        label: &str,
        node: Option<&CompositeNode>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        writeln!(f, "{}{}{}", prefix, node_marker, label)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        match node {
            Some(node) => self.fmt_as_tree(node, f, &child_prefix, true),
            None => writeln!(f, "{}└── <empty>", child_prefix),
        }
    }

    fn describe(&self, node: &str) -> String {
        match self.variables.get(node) {
            Some(identifier) => format!("{} ({})", identifier, node),
            None => node.to_string(),
        }
    }
}
