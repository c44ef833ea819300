//! The editor state machine.
//!
//! [`Editor`] owns the diagram, the selection, the undo history and the id counter.
//! The presentation layer reads state through the accessors and forwards every user
//! gesture as an [`Intent`]; it never mutates the diagram directly.

use crate::history::History;
use crate::layout::{assign_positions, LayoutConfig};
use crate::selection::Selection;
use crate::serialization::{export_json, import_json, SerializationError};
use crate::types::{Diagram, EdgeId, NodeData, NodeId, Position, StyleProperty};
use log::{debug, info, warn};
use uuid::Uuid;

/// A discrete user request dispatched to [`Editor::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Add a default node at a canvas position
    AddNode {
        /// Where the node was dropped or clicked
        position: Position,
    },
    /// Copy every selected node
    DuplicateSelected,
    /// Remove selected nodes and their edges
    DeleteSelectedNodes,
    /// Remove selected edges
    DeleteSelectedEdges,
    /// Set one style field on every selected node
    SetNodeStyle {
        /// Field to change
        property: StyleProperty,
        /// New value
        value: String,
    },
    /// Set the label of every selected edge
    SetEdgeLabel(String),
    /// Toggle animation on every selected edge
    SetEdgeAnimated(bool),
    /// Move nodes by a delta (dragging)
    MoveNodes {
        /// Nodes to move
        ids: Vec<NodeId>,
        /// Horizontal delta
        dx: f32,
        /// Vertical delta
        dy: f32,
    },
    /// Node clicked
    SelectNode(NodeId),
    /// Edge clicked
    SelectEdge(EdgeId),
    /// Background clicked
    ClearSelection,
    /// Connection gesture finished on a node
    Connect {
        /// Node the gesture started on
        source: NodeId,
        /// Node the gesture ended on
        target: NodeId,
    },
    /// Start grouping changes into one undo step
    BeginEdit,
    /// Finish the current group of changes
    CommitEdit,
    /// Step back in history
    Undo,
    /// Step forward in history
    Redo,
    /// Re-run the hierarchy layout over the whole diagram
    AutoLayout,
}

/// Owns `{diagram, selection, history}` and exposes every editing operation.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    diagram: Diagram,
    selection: Selection,
    history: History,
    layout: LayoutConfig,
    /// Highest numeric node id handed out so far
    node_counter: u64,
    /// Bumped on every change to the diagram
    revision: u64,
}

impl Editor {
    /// Creates an editor with an empty diagram.
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Creates an editor for an initial diagram, laying it out first.
    pub fn with_diagram(diagram: Diagram, layout: LayoutConfig) -> Self {
        let mut editor = Self::new(layout);
        editor.load(diagram);
        editor
    }

    /// Current diagram.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Undo/redo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns true if there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Layout parameters used for imports and auto layout.
    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Replaces the layout parameters. Existing positions are left alone.
    pub fn set_layout_config(&mut self, layout: LayoutConfig) {
        self.layout = layout;
    }

    /// Counter that changes whenever the diagram changes, including undo/redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The data the style toolbar should display: the first selected node's data,
    /// or the defaults when no node is selected.
    pub fn style_config(&self) -> NodeData {
        self.selection
            .nodes()
            .iter()
            .find_map(|id| self.diagram.node(id))
            .map(|n| n.data.clone())
            .unwrap_or_default()
    }

    /// Applies `change` and records the prior state in history if anything changed.
    fn mutate<R>(&mut self, change: impl FnOnce(&mut Diagram) -> R) -> R {
        let before = self.diagram.clone();
        let result = change(&mut self.diagram);
        if self.diagram != before {
            self.history.record(before);
            self.revision += 1;
        }
        result
    }

    /// Hands out the next numeric id not already used by a node.
    ///
    /// Once the counter is exhausted, for example after importing a node whose id is
    /// `u64::MAX`, ids fall back to random non-numeric ones.
    fn allocate_node_id(&mut self) -> NodeId {
        loop {
            let Some(next) = self.node_counter.checked_add(1) else {
                warn!("Numeric node ids exhausted, using a random id");
                return format!("node-{}", Uuid::new_v4().simple());
            };
            self.node_counter = next;
            let candidate = next.to_string();
            if !self.diagram.contains_node(&candidate) {
                return candidate;
            }
            debug!("Skipping node id {candidate}, already in use");
        }
    }

    /// Moves the counter past every numeric id in the current diagram.
    fn sync_node_counter(&mut self) {
        let highest = self
            .diagram
            .nodes
            .iter()
            .filter_map(|n| n.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.node_counter = self.node_counter.max(highest);
    }

    /// Replaces the diagram without recording history, re-running the layout.
    fn load(&mut self, diagram: Diagram) {
        let nodes = assign_positions(&diagram.nodes, &diagram.edges, &self.layout);
        self.diagram = Diagram {
            nodes,
            edges: diagram.edges,
        };
        self.selection.clear();
        self.history.clear();
        self.sync_node_counter();
        self.revision += 1;
    }

    /// Adds a default node at `position`.
    ///
    /// # Returns
    ///
    /// The ID of the new node.
    pub fn add_node(&mut self, position: Position) -> NodeId {
        let id = self.allocate_node_id();
        self.mutate(|d| d.add_node(id, position))
    }

    /// Duplicates every selected node. The copies are not selected.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        let ids = self.selection.nodes().to_vec();
        self.mutate(|d| d.duplicate_nodes(&ids))
    }

    /// Deletes the selected nodes and their edges, then clears the node selection.
    pub fn delete_selected_nodes(&mut self) -> usize {
        let ids = self.selection.nodes().to_vec();
        let removed = self.mutate(|d| d.delete_nodes(&ids));
        self.selection.clear_nodes();
        self.selection.retain_existing(&self.diagram);
        removed
    }

    /// Deletes the selected edges, then clears the edge selection.
    pub fn delete_selected_edges(&mut self) -> usize {
        let ids = self.selection.edges().to_vec();
        let removed = self.mutate(|d| d.delete_edges(&ids));
        self.selection.clear_edges();
        removed
    }

    /// Sets a style field on every selected node.
    pub fn set_node_style(&mut self, property: StyleProperty, value: &str) -> usize {
        let ids = self.selection.nodes().to_vec();
        self.mutate(|d| d.set_node_style(&ids, property, value))
    }

    /// Sets the label of every selected edge.
    pub fn set_edge_label(&mut self, label: &str) -> usize {
        let ids = self.selection.edges().to_vec();
        self.mutate(|d| d.set_edge_label(&ids, label))
    }

    /// Sets the animated flag of every selected edge.
    pub fn set_edge_animated(&mut self, animated: bool) -> usize {
        let ids = self.selection.edges().to_vec();
        self.mutate(|d| d.set_edge_animated(&ids, animated))
    }

    /// Moves the listed nodes by a delta.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) -> usize {
        self.mutate(|d| d.move_nodes(ids, dx, dy))
    }

    /// Adds a node to the selection, dropping any edge selection.
    pub fn select_node(&mut self, id: &str) {
        if self.diagram.contains_node(id) {
            self.selection.select_node(id);
        }
    }

    /// Adds an edge to the selection, dropping any node selection.
    pub fn select_edge(&mut self, id: &str) {
        if self.diagram.contains_edge(id) {
            self.selection.select_edge(id);
        }
    }

    /// Empties the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Connects two existing nodes with an unlabelled edge.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<EdgeId> {
        self.mutate(|d| d.connect(source, target))
    }

    /// Opens an edit session so the following changes undo as one step.
    pub fn begin_edit(&mut self) {
        self.history.begin_edit(&self.diagram);
    }

    /// Closes the current edit session.
    pub fn commit_edit(&mut self) {
        self.history.commit_edit();
    }

    /// Returns true while an edit session is open.
    pub fn is_editing(&self) -> bool {
        self.history.is_editing()
    }

    /// Restores the state before the last change.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.diagram);
        if undone {
            debug!("Undo, {} step(s) left", self.history.undo_len());
            self.after_history_move();
        }
        undone
    }

    /// Re-applies the last undone change.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.diagram);
        if redone {
            debug!("Redo, {} step(s) left", self.history.redo_len());
            self.after_history_move();
        }
        redone
    }

    fn after_history_move(&mut self) {
        self.selection.retain_existing(&self.diagram);
        self.revision += 1;
    }

    /// Re-runs the hierarchy layout as an undoable change.
    pub fn auto_layout(&mut self) {
        let layout = self.layout;
        self.mutate(|d| d.nodes = assign_positions(&d.nodes, &d.edges, &layout));
    }

    /// Exports the diagram in the exchange format.
    pub fn export_json(&self) -> Result<String, SerializationError> {
        export_json(&self.diagram)
    }

    /// Replaces the diagram with an imported one.
    ///
    /// Import is a fresh load: it is not undoable and it clears the history. On error
    /// the current diagram is left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<(), SerializationError> {
        let diagram = import_json(json, &self.layout)?;
        info!(
            "Imported diagram with {} node(s) and {} edge(s)",
            diagram.nodes.len(),
            diagram.edges.len()
        );
        self.load(diagram);
        Ok(())
    }

    /// Discards the diagram and history.
    pub fn reset(&mut self) {
        *self = Self::new(self.layout);
    }

    /// Dispatches an intent.
    ///
    /// # Returns
    ///
    /// `true` if the diagram changed.
    pub fn apply(&mut self, intent: Intent) -> bool {
        let revision = self.revision;
        match intent {
            Intent::AddNode { position } => {
                self.add_node(position);
            }
            Intent::DuplicateSelected => {
                self.duplicate_selected();
            }
            Intent::DeleteSelectedNodes => {
                self.delete_selected_nodes();
            }
            Intent::DeleteSelectedEdges => {
                self.delete_selected_edges();
            }
            Intent::SetNodeStyle { property, value } => {
                self.set_node_style(property, &value);
            }
            Intent::SetEdgeLabel(label) => {
                self.set_edge_label(&label);
            }
            Intent::SetEdgeAnimated(animated) => {
                self.set_edge_animated(animated);
            }
            Intent::MoveNodes { ids, dx, dy } => {
                self.move_nodes(&ids, dx, dy);
            }
            Intent::SelectNode(id) => self.select_node(&id),
            Intent::SelectEdge(id) => self.select_edge(&id),
            Intent::ClearSelection => self.clear_selection(),
            Intent::Connect { source, target } => {
                self.connect(&source, &target);
            }
            Intent::BeginEdit => self.begin_edit(),
            Intent::CommitEdit => self.commit_edit(),
            Intent::Undo => {
                self.undo();
            }
            Intent::Redo => {
                self.redo();
            }
            Intent::AutoLayout => self.auto_layout(),
        }
        self.revision != revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_chain() -> Editor {
        let mut editor = Editor::default();
        let a = editor.add_node(Position::new(0.0, 0.0));
        let b = editor.add_node(Position::new(0.0, 100.0));
        editor.connect(&a, &b);
        editor
    }

    #[test]
    fn test_add_node_after_importing_largest_numeric_id() {
        let mut editor = Editor::default();
        editor
            .import_json(r#"{"nodes":[{"id":"18446744073709551615","data":{"label":"Big"}}]}"#)
            .unwrap();

        let first = editor.add_node(Position::default());
        let second = editor.add_node(Position::default());

        assert_ne!(first, "0");
        assert_ne!(first, "18446744073709551615");
        assert_ne!(first, second);
        assert!(editor.diagram().contains_node(&first));
        assert!(editor.diagram().contains_node(&second));
        assert_eq!(editor.diagram().nodes.len(), 3);
    }

    #[test]
    fn test_node_ids_never_reuse_after_delete() {
        let mut editor = Editor::default();
        editor.add_node(Position::default());
        let second = editor.add_node(Position::default());
        editor.select_node("1");
        editor.delete_selected_nodes();

        let third = editor.add_node(Position::default());

        assert_eq!(second, "2");
        assert_eq!(third, "3");
        assert_eq!(editor.diagram().node("3").unwrap().data.label, "Node 3");
    }

    #[test]
    fn test_every_mutation_is_undoable() {
        let mut editor = Editor::default();
        let steps: Vec<Intent> = vec![
            Intent::AddNode { position: Position::new(10.0, 10.0) },
            Intent::AddNode { position: Position::new(20.0, 20.0) },
            Intent::Connect { source: "1".into(), target: "2".into() },
            Intent::SelectNode("1".into()),
            Intent::SetNodeStyle { property: StyleProperty::BgColor, value: "#000000".into() },
            Intent::DuplicateSelected,
        ];
        let mut states = vec![editor.diagram().clone()];
        for step in steps {
            if editor.apply(step) {
                states.push(editor.diagram().clone());
            }
        }
        assert_eq!(states.len(), 6);

        for expected in states.iter().rev().skip(1) {
            assert!(editor.undo());
            assert_eq!(editor.diagram(), expected);
        }
        assert!(!editor.undo());

        for expected in states.iter().skip(1) {
            assert!(editor.redo());
            assert_eq!(editor.diagram(), expected);
        }
        assert!(!editor.redo());
    }

    #[test]
    fn test_mutation_after_undo_clears_redo() {
        let mut editor = editor_with_chain();
        editor.undo();
        assert!(editor.can_redo());

        editor.add_node(Position::default());

        assert!(!editor.can_redo());
        assert!(!editor.redo());
    }

    #[test]
    fn test_noop_operations_do_not_snapshot() {
        let mut editor = editor_with_chain();
        let steps = editor.history().undo_len();

        editor.delete_selected_nodes();
        editor.set_node_style(StyleProperty::Label, "x");
        editor.duplicate_selected();
        editor.connect("1", "missing");

        assert_eq!(editor.history().undo_len(), steps);
    }

    #[test]
    fn test_delete_selected_node_cascades_and_clears_selection() {
        let mut editor = editor_with_chain();
        editor.select_node("1");

        assert_eq!(editor.delete_selected_nodes(), 1);

        assert!(editor.diagram().edges.is_empty());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_label_edit_session_is_one_undo_step() {
        let mut editor = editor_with_chain();
        editor.select_node("2");
        let before = editor.diagram().clone();

        editor.begin_edit();
        for partial in ["S", "St", "Sto", "Stop"] {
            editor.set_node_style(StyleProperty::Label, partial);
        }
        editor.commit_edit();

        assert_eq!(editor.diagram().node("2").unwrap().data.label, "Stop");
        editor.undo();
        assert_eq!(editor.diagram(), &before);
    }

    #[test]
    fn test_drag_session_is_one_undo_step() {
        let mut editor = editor_with_chain();
        let ids = vec!["1".to_string()];
        let before = editor.diagram().clone();

        editor.apply(Intent::BeginEdit);
        for _ in 0..5 {
            editor.apply(Intent::MoveNodes { ids: ids.clone(), dx: 2.0, dy: 1.0 });
        }
        editor.apply(Intent::CommitEdit);

        assert_eq!(editor.diagram().node("1").unwrap().position, Position::new(10.0, 5.0));
        assert!(editor.undo());
        assert_eq!(editor.diagram(), &before);
    }

    #[test]
    fn test_edge_selection_and_label() {
        let mut editor = editor_with_chain();
        editor.select_node("1");
        let edge_id = editor.diagram().edges[0].id.clone();

        editor.select_edge(&edge_id);
        editor.set_edge_label("yes");
        editor.set_edge_animated(true);

        assert!(editor.selection().nodes().is_empty());
        assert_eq!(editor.diagram().edges[0].label.as_deref(), Some("yes"));
        assert!(editor.diagram().edges[0].animated);

        editor.delete_selected_edges();
        assert!(editor.diagram().edges.is_empty());
        assert_eq!(editor.diagram().nodes.len(), 2);
    }

    #[test]
    fn test_import_replaces_state_and_resets_history() {
        let mut editor = editor_with_chain();
        editor.select_node("1");
        let json = r#"{"nodes":[{"id":"7","data":{"label":"Seven"}},{"id":"8","data":{"label":"Eight"}}],
                       "edges":[{"source":"7","target":"8","id":"e7-8"}]}"#;

        editor.import_json(json).unwrap();

        assert!(editor.selection().is_empty());
        assert!(!editor.can_undo());
        assert_eq!(editor.diagram().node("8").unwrap().position, Position::new(0.0, 200.0));
        assert_eq!(editor.add_node(Position::default()), "9");
    }

    #[test]
    fn test_failed_import_leaves_state_untouched() {
        let mut editor = editor_with_chain();
        let before = editor.diagram().clone();

        assert!(editor.import_json("[1, 2").is_err());

        assert_eq!(editor.diagram(), &before);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_style_config_reflects_first_selected_node() {
        let mut editor = editor_with_chain();
        assert_eq!(editor.style_config(), NodeData::default());

        editor.select_node("2");
        editor.set_node_style(StyleProperty::FontSize, "20px");

        assert_eq!(editor.style_config().font_size, "20px");
        assert_eq!(editor.style_config().label, "Node 2");
    }

    #[test]
    fn test_undo_prunes_stale_selection() {
        let mut editor = Editor::default();
        let id = editor.add_node(Position::default());
        editor.select_node(&id);

        editor.undo();

        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_auto_layout_is_undoable() {
        let mut editor = editor_with_chain();

        editor.auto_layout();

        assert_eq!(editor.diagram().node("1").unwrap().position, Position::new(0.0, 100.0));
        assert_eq!(editor.diagram().node("2").unwrap().position, Position::new(0.0, 200.0));
        editor.undo();
        assert_eq!(editor.diagram().node("2").unwrap().position, Position::new(0.0, 100.0));
    }

    #[test]
    fn test_with_diagram_lays_out_initial_state() {
        let mut diagram = Diagram::new();
        diagram.add_node("5", Position::new(-40.0, -40.0));

        let mut editor = Editor::with_diagram(diagram, LayoutConfig::default());

        assert_eq!(editor.diagram().nodes[0].position, Position::new(0.0, 100.0));
        assert_eq!(editor.add_node(Position::default()), "6");
    }
}
