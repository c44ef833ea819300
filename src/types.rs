//! Core data types and structures for the flowchart editor.
//!
//! This module defines the diagram model (nodes, edges and their style data) together
//! with the store operations that every user action is built from. All operations
//! silently ignore ids that do not exist in the diagram.

use crate::constants::{
    DEFAULT_BG_COLOR, DEFAULT_FONT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
    DEFAULT_FONT_STYLE, DEFAULT_FONT_WEIGHT, DUPLICATE_OFFSET,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for diagram nodes.
pub type NodeId = String;

/// Unique identifier for diagram edges.
pub type EdgeId = String;

/// A point on the canvas in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by the given amounts.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// The render kind of a node. Every node produced by the editor is `custom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Box with a styled label and top/bottom connection handles
    #[default]
    Custom,
}

/// Display data carried by a node: its label and text/fill styling.
///
/// Style values are kept as the CSS-like strings the style toolbar emits
/// (`"12px"`, `"italic"`, `"#D3D3D3"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeData {
    /// Text shown inside the node
    pub label: String,
    /// Fill color
    pub bg_color: String,
    /// Label font size
    pub font_size: String,
    /// Label font weight
    pub font_weight: String,
    /// Label font style (`normal` or `italic`)
    pub font_style: String,
    /// Label font family
    pub font_family: String,
    /// Label color
    pub font_color: String,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            label: String::new(),
            bg_color: DEFAULT_BG_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            font_weight: DEFAULT_FONT_WEIGHT.to_string(),
            font_style: DEFAULT_FONT_STYLE.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_color: DEFAULT_FONT_COLOR.to_string(),
        }
    }
}

impl NodeData {
    /// Creates default-styled data with the given label.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Returns the current value of a style property.
    pub fn get(&self, property: StyleProperty) -> &str {
        match property {
            StyleProperty::Label => &self.label,
            StyleProperty::BgColor => &self.bg_color,
            StyleProperty::FontSize => &self.font_size,
            StyleProperty::FontWeight => &self.font_weight,
            StyleProperty::FontStyle => &self.font_style,
            StyleProperty::FontFamily => &self.font_family,
            StyleProperty::FontColor => &self.font_color,
        }
    }

    /// Overwrites a style property.
    pub fn set(&mut self, property: StyleProperty, value: impl Into<String>) {
        let slot = match property {
            StyleProperty::Label => &mut self.label,
            StyleProperty::BgColor => &mut self.bg_color,
            StyleProperty::FontSize => &mut self.font_size,
            StyleProperty::FontWeight => &mut self.font_weight,
            StyleProperty::FontStyle => &mut self.font_style,
            StyleProperty::FontFamily => &mut self.font_family,
            StyleProperty::FontColor => &mut self.font_color,
        };
        *slot = value.into();
    }
}

/// A single editable field of [`NodeData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    /// The node label
    Label,
    /// Fill color
    BgColor,
    /// Label font size
    FontSize,
    /// Label font weight
    FontWeight,
    /// Label font style
    FontStyle,
    /// Label font family
    FontFamily,
    /// Label color
    FontColor,
}

impl StyleProperty {
    /// Every property, in toolbar order.
    pub const ALL: [StyleProperty; 7] = [
        StyleProperty::Label,
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::FontWeight,
        StyleProperty::FontStyle,
        StyleProperty::FontColor,
        StyleProperty::BgColor,
    ];

    /// The camelCase key used for this property in node data.
    pub fn as_str(self) -> &'static str {
        match self {
            StyleProperty::Label => "label",
            StyleProperty::BgColor => "bgColor",
            StyleProperty::FontSize => "fontSize",
            StyleProperty::FontWeight => "fontWeight",
            StyleProperty::FontStyle => "fontStyle",
            StyleProperty::FontFamily => "fontFamily",
            StyleProperty::FontColor => "fontColor",
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`StyleProperty`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style property `{0}`")]
pub struct UnknownStyleProperty(pub String);

impl FromStr for StyleProperty {
    type Err = UnknownStyleProperty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleProperty::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownStyleProperty(s.to_string()))
    }
}

/// Represents a single node in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Top-left corner of the node on the canvas
    pub position: Position,
    /// Label and styling
    pub data: NodeData,
    /// Render kind, always `custom`
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
}

impl Node {
    /// Creates a new node.
    pub fn new(id: impl Into<NodeId>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
            kind: NodeKind::Custom,
        }
    }
}

/// Represents a directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// ID of the source node
    pub source: NodeId,
    /// ID of the target node
    pub target: NodeId,
    /// Optional text drawn at the middle of the edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether the edge is drawn with a moving dash
    #[serde(default)]
    pub animated: bool,
}

impl Edge {
    /// Creates an unlabelled, static edge.
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            animated: false,
        }
    }

    /// Returns true if either endpoint is the given node.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// The authoritative node and edge collections of a diagram.
///
/// Cloning a `Diagram` produces an independent snapshot; the history stacks rely on this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// All nodes, in insertion order
    pub nodes: Vec<Node>,
    /// All edges, in insertion order
    pub edges: Vec<Edge>,
}

impl Diagram {
    /// Creates a new empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Returns true if a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Returns true if an edge with this id exists.
    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge(id).is_some()
    }

    /// Appends a node with the default style and a `Node <id>` label.
    ///
    /// # Returns
    ///
    /// The ID of the newly added node.
    pub fn add_node(&mut self, id: impl Into<NodeId>, position: Position) -> NodeId {
        let id = id.into();
        let data = NodeData::with_label(format!("Node {id}"));
        self.nodes.push(Node::new(id.clone(), position, data));
        id
    }

    /// Clones each listed node with fresh ids, offset down and to the right.
    ///
    /// Edges are not duplicated; the copies start disconnected.
    ///
    /// # Returns
    ///
    /// The ids of the copies, in the order of `ids`.
    pub fn duplicate_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let copies: Vec<Node> = ids
            .iter()
            .filter_map(|id| self.node(id))
            .map(|original| Node {
                id: format!("{}-copy-{}", original.id, Uuid::new_v4().simple()),
                position: original.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET),
                data: original.data.clone(),
                kind: original.kind,
            })
            .collect();
        let new_ids = copies.iter().map(|n| n.id.clone()).collect();
        self.nodes.extend(copies);
        new_ids
    }

    /// Removes the listed nodes and every edge attached to them.
    ///
    /// # Returns
    ///
    /// The number of nodes removed.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> usize {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.nodes.len();
        self.nodes.retain(|n| !doomed.contains(n.id.as_str()));
        self.edges
            .retain(|e| !doomed.contains(e.source.as_str()) && !doomed.contains(e.target.as_str()));
        before - self.nodes.len()
    }

    /// Removes the listed edges. Nodes are never touched.
    ///
    /// # Returns
    ///
    /// The number of edges removed.
    pub fn delete_edges(&mut self, ids: &[EdgeId]) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !ids.contains(&e.id));
        before - self.edges.len()
    }

    /// Sets `property` to `value` on every listed node.
    ///
    /// # Returns
    ///
    /// The number of nodes whose data actually changed.
    pub fn set_node_style(&mut self, ids: &[NodeId], property: StyleProperty, value: &str) -> usize {
        let mut changed = 0;
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            if node.data.get(property) != value {
                node.data.set(property, value);
                changed += 1;
            }
        }
        changed
    }

    /// Sets the label of every listed edge.
    pub fn set_edge_label(&mut self, ids: &[EdgeId], label: &str) -> usize {
        let mut changed = 0;
        for edge in self.edges.iter_mut().filter(|e| ids.contains(&e.id)) {
            if edge.label.as_deref() != Some(label) {
                edge.label = Some(label.to_string());
                changed += 1;
            }
        }
        changed
    }

    /// Sets the animated flag of every listed edge.
    pub fn set_edge_animated(&mut self, ids: &[EdgeId], animated: bool) -> usize {
        let mut changed = 0;
        for edge in self.edges.iter_mut().filter(|e| ids.contains(&e.id)) {
            if edge.animated != animated {
                edge.animated = animated;
                changed += 1;
            }
        }
        changed
    }

    /// Shifts every listed node by the given amounts.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) -> usize {
        if dx == 0.0 && dy == 0.0 {
            return 0;
        }
        let mut moved = 0;
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            node.position = node.position.offset(dx, dy);
            moved += 1;
        }
        moved
    }

    /// Places a node at an absolute position.
    ///
    /// # Returns
    ///
    /// `true` if the node exists and its position changed.
    pub fn set_node_position(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) if node.position != position => {
                node.position = position;
                true
            }
            _ => false,
        }
    }

    /// Appends an edge with an empty label between two existing nodes.
    ///
    /// Self-loops and repeated pairs are allowed; repeated pairs receive a numbered id.
    ///
    /// # Returns
    ///
    /// The new edge id, or `None` if either endpoint does not exist.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<EdgeId> {
        if !self.contains_node(source) || !self.contains_node(target) {
            return None;
        }
        let id = self.unique_edge_id(&format!("reactflow__edge-{source}-{target}"));
        let mut edge = Edge::new(id.clone(), source, target);
        edge.label = Some(String::new());
        self.edges.push(edge);
        Some(id)
    }

    fn unique_edge_id(&self, base: &str) -> EdgeId {
        if !self.contains_edge(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.contains_edge(candidate))
            .unwrap_or_else(|| format!("{base}-{}", Uuid::new_v4().simple()))
    }
}
