//! Top-down hierarchy layout.
//!
//! Roots (nodes without incoming edges) are spread along a row; every node's
//! children are centered on the row below it. The result depends only on the
//! node order and the edge list, never on previous positions, so running the
//! layout twice gives the same answer.

use crate::hierarchy::build_hierarchy;
use crate::types::{Edge, Node, NodeKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Spacing parameters for [`assign_positions`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between siblings; roots are twice as far apart
    pub x_spacing: f32,
    /// Vertical distance between a parent and its children
    pub y_spacing: f32,
    /// Row on which roots are placed
    pub root_y: f32,
    /// Position given to nodes no root can reach (e.g. members of a cycle)
    pub fallback: Position,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_spacing: 200.0,
            y_spacing: 100.0,
            root_y: 100.0,
            fallback: Position::new(100.0, 100.0),
        }
    }
}

/// Computes positions for every node and returns the re-positioned copies.
///
/// Each root is walked depth-first with its own visited set, so within one walk a
/// node is placed by the first path that reaches it. When several roots reach the
/// same node, the walk of the later root decides its final position.
pub fn assign_positions(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    let hierarchy = build_hierarchy(nodes, edges);
    let mut placed: HashMap<&str, Position> = HashMap::new();

    for (index, root) in hierarchy.roots(nodes).into_iter().enumerate() {
        let origin = Position::new(index as f32 * config.x_spacing * 2.0, config.root_y);
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, Position)> = vec![(root.as_str(), origin)];

        while let Some((id, position)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            placed.insert(id, position);

            let children = hierarchy.children_of(id);
            let start_x = position.x - (children.len() as f32 - 1.0) * config.x_spacing / 2.0;
            // Reverse push keeps the same visiting order as a recursive walk.
            for (j, child) in children.iter().enumerate().rev() {
                let child_position =
                    Position::new(start_x + j as f32 * config.x_spacing, position.y + config.y_spacing);
                stack.push((child.as_str(), child_position));
            }
        }
    }

    nodes
        .iter()
        .map(|node| Node {
            position: placed.get(node.id.as_str()).copied().unwrap_or(config.fallback),
            kind: NodeKind::Custom,
            ..node.clone()
        })
        .collect()
}
