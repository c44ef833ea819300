//! Selection state for nodes and edges.
//!
//! Nodes and edges are never selected at the same time. Clicking appends to the
//! current set; only a background click (or a delete) empties it.

use crate::types::{Diagram, EdgeId, NodeId};

/// The currently selected node ids and edge ids, in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected node ids.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Selected edge ids.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Returns true if the node is selected.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    /// Returns true if the edge is selected.
    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e == id)
    }

    /// Adds a node to the selection and drops any selected edges.
    ///
    /// Returns `true` if the node was not already selected.
    pub fn select_node(&mut self, id: &str) -> bool {
        self.edges.clear();
        if self.contains_node(id) {
            return false;
        }
        self.nodes.push(id.to_string());
        true
    }

    /// Adds an edge to the selection and drops any selected nodes.
    ///
    /// Returns `true` if the edge was not already selected.
    pub fn select_edge(&mut self, id: &str) -> bool {
        self.nodes.clear();
        if self.contains_edge(id) {
            return false;
        }
        self.edges.push(id.to_string());
        true
    }

    /// Empties both sets.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Empties the node set.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    /// Empties the edge set.
    pub fn clear_edges(&mut self) {
        self.edges.clear();
    }

    /// Forgets ids that no longer exist in the diagram, e.g. after an undo.
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        self.nodes.retain(|id| diagram.contains_node(id));
        self.edges.retain(|id| diagram.contains_edge(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn test_selecting_node_clears_edges() {
        let mut selection = Selection::new();
        selection.select_edge("e1");

        selection.select_node("1");

        assert!(selection.edges().is_empty());
        assert_eq!(selection.nodes(), ["1".to_string()]);
    }

    #[test]
    fn test_selecting_edge_clears_nodes() {
        let mut selection = Selection::new();
        selection.select_node("1");
        selection.select_node("2");

        selection.select_edge("e1");

        assert!(selection.nodes().is_empty());
        assert!(selection.contains_edge("e1"));
    }

    #[test]
    fn test_repeat_click_is_idempotent() {
        let mut selection = Selection::new();

        assert!(selection.select_node("1"));
        assert!(!selection.select_node("1"));
        assert!(selection.select_node("2"));

        assert_eq!(selection.nodes().len(), 2);
    }

    #[test]
    fn test_clear_empties_both_sets() {
        let mut selection = Selection::new();
        selection.select_node("1");

        selection.clear();

        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_existing_drops_stale_ids() {
        let mut diagram = Diagram::new();
        diagram.add_node("1", Position::default());
        let mut selection = Selection::new();
        selection.select_node("1");
        selection.select_node("gone");

        selection.retain_existing(&diagram);

        assert_eq!(selection.nodes(), ["1".to_string()]);
    }
}
