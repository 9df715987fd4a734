use super::builder::CompositeBuilder;
use crate::error::BuildError;
use crate::graph::ConstructKind;
use ahash::AHashMap;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

impl<'g> CompositeBuilder<'g> {
    /// Rejects any cycle over main connections that passes through no loop node.
    ///
    /// Loop nodes are left out of the search graph, so every remaining strongly
    /// connected component with more than one member, or with a self-edge, is a
    /// cycle the traversal could otherwise close behind a deferred merge or a
    /// converged path. Node indices follow graph order, which makes the reported
    /// node the component member declared first.
    pub(super) fn reject_plain_cycles(&self) -> Result<(), BuildError> {
        let graph = self.ctx.graph;
        let mut search: DiGraph<&'g str, ()> = DiGraph::with_capacity(graph.len(), 0);
        let mut indices: AHashMap<&'g str, NodeIndex> = AHashMap::with_capacity(graph.len());

        for node in graph.nodes() {
            if self.ctx.kinds.classify(&node.node_type) != ConstructKind::Loop {
                indices.insert(node.name.as_str(), search.add_node(node.name.as_str()));
            }
        }

        for node in graph.nodes() {
            let Some(&from) = indices.get(node.name.as_str()) else {
                continue;
            };
            // Unknown targets surface later as `NodeNotFound`.
            for connection in node.outputs.iter().flat_map(|slot| &slot.connections) {
                if let Some(&to) = indices.get(connection.target.as_str()) {
                    search.update_edge(from, to, ());
                }
            }
        }

        let offending = tarjan_scc(&search)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&member| search.contains_edge(member, member))
            })
            .filter_map(|component| {
                let node = component.iter().min().copied()?;
                let via = search
                    .neighbors_directed(node, Direction::Incoming)
                    .filter(|source| component.contains(source))
                    .min()
                    .unwrap_or(node);
                Some((node, via))
            })
            .min();

        let Some((node, via)) = offending else {
            return Ok(());
        };
        let (node, via) = (search[node], search[via]);
        tracing::debug!(node = %node, via = %via, "cycle without a loop node");
        Err(BuildError::Cycle {
            node: node.to_string(),
            via: via.to_string(),
        })
    }
}
