//! Parent/child structure derived from a flat edge list.

use crate::types::{Edge, Node, NodeId};
use std::collections::{HashMap, HashSet};

/// Child lists and incoming-edge counts keyed by node id.
///
/// Every node of the input has an entry in both maps. Edges that name unknown
/// nodes are still recorded, so lookups must tolerate ids outside the node list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    /// Targets of each node's outgoing edges, in edge order
    pub children: HashMap<NodeId, Vec<NodeId>>,
    /// Number of edges ending at each node
    pub incoming: HashMap<NodeId, usize>,
}

impl Hierarchy {
    /// Children of a node; empty for unknown ids.
    pub fn children_of(&self, id: &str) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming-edge count of a node; zero for unknown ids.
    pub fn incoming_count(&self, id: &str) -> usize {
        self.incoming.get(id).copied().unwrap_or(0)
    }

    /// Nodes without incoming edges, in node-list order.
    pub fn roots<'a>(&self, nodes: &'a [Node]) -> Vec<&'a NodeId> {
        let mut seen: HashSet<&'a NodeId> = HashSet::new();
        nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| self.incoming_count(id) == 0 && seen.insert(*id))
            .collect()
    }
}

/// Builds the hierarchy for a node list and edge list. Inputs are not modified.
pub fn build_hierarchy(nodes: &[Node], edges: &[Edge]) -> Hierarchy {
    let mut hierarchy = Hierarchy::default();
    for node in nodes {
        hierarchy.children.entry(node.id.clone()).or_default();
        hierarchy.incoming.entry(node.id.clone()).or_insert(0);
    }
    for edge in edges {
        hierarchy
            .children
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
        *hierarchy.incoming.entry(edge.target.clone()).or_insert(0) += 1;
    }
    hierarchy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeData, Position};

    fn node(id: &str) -> Node {
        Node::new(id, Position::default(), NodeData::with_label(id))
    }

    #[test]
    fn test_every_node_has_entries() {
        let nodes = vec![node("a"), node("b")];

        let hierarchy = build_hierarchy(&nodes, &[]);

        assert_eq!(hierarchy.children_of("a"), &[] as &[NodeId]);
        assert_eq!(hierarchy.incoming.get("b"), Some(&0));
        assert_eq!(hierarchy.children.len(), 2);
    }

    #[test]
    fn test_children_keep_edge_order() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![Edge::new("1", "a", "c"), Edge::new("2", "a", "b")];

        let hierarchy = build_hierarchy(&nodes, &edges);

        assert_eq!(hierarchy.children_of("a"), ["c".to_string(), "b".to_string()]);
        assert_eq!(hierarchy.incoming_count("b"), 1);
        assert_eq!(hierarchy.incoming_count("c"), 1);
    }

    #[test]
    fn test_unknown_endpoints_are_recorded() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::new("1", "a", "ghost"), Edge::new("2", "phantom", "a")];

        let hierarchy = build_hierarchy(&nodes, &edges);

        assert_eq!(hierarchy.incoming_count("ghost"), 1);
        assert_eq!(hierarchy.incoming_count("a"), 1);
        assert_eq!(hierarchy.children_of("phantom"), ["a".to_string()]);
    }

    #[test]
    fn test_roots_follow_node_order() {
        let nodes = vec![node("z"), node("child"), node("a")];
        let edges = vec![Edge::new("1", "z", "child")];

        let hierarchy = build_hierarchy(&nodes, &edges);

        assert_eq!(hierarchy.roots(&nodes), vec!["z", "a"]);
    }
}
