//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging, connection drawing,
//! and coordinate transformations between screen and world space. Every change to
//! the diagram is forwarded to the editor as an [`Intent`].

use super::state::FlowchartApp;
use crate::constants::{CLICK_THRESHOLD, NODE_HEIGHT, NODE_WIDTH};
use crate::editor::Intent;
use crate::types::*;
use eframe::egui;

impl FlowchartApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    ///
    /// # Arguments
    ///
    /// * `screen_pos` - Position in screen space (pixels)
    ///
    /// # Returns
    ///
    /// The corresponding position in world space
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    ///
    /// # Arguments
    ///
    /// * `world_pos` - Position in world space
    ///
    /// # Returns
    ///
    /// The corresponding position in screen space (pixels)
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning functionality.
    ///
    /// Uses Cmd on macOS and Ctrl on other platforms for modifier-based panning.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        // modifiers.command automatically uses Cmd on macOS and Ctrl elsewhere
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan && (response.contains_pointer() || self.interaction.is_panning) {
            self.interaction.is_panning = true;
            let delta = ui.input(|i| i.pointer.delta());
            self.canvas.offset += delta;
        } else {
            self.interaction.is_panning = false;
        }
    }

    /// Handles scroll wheel zooming functionality.
    ///
    /// Zooms in/out while keeping the mouse cursor position fixed in world space.
    /// Zoom range is clamped between 0.25x and 5.0x.
    /// Only zooms if the cursor is over the canvas.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let Some(mouse_pos) = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos())
        else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_pos_before_zoom = self.screen_to_world(mouse_pos);

        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (self.canvas.zoom_factor + zoom_delta).clamp(0.25, 5.0);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            // Keep the world position under the cursor fixed
            let world_pos_after_zoom = self.world_to_screen(world_pos_before_zoom);
            self.canvas.offset += mouse_pos - world_pos_after_zoom;
        }
    }

    /// Handles left-button presses, drags and releases on the canvas.
    ///
    /// A press on a node selects it and starts a drag of the whole node selection;
    /// with Shift held it starts drawing a connection instead. A press on an edge
    /// selects the edge and a press on empty canvas clears the selection. The drag
    /// runs inside an edit session so it undoes as a single step.
    pub fn handle_pointer(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.interaction.is_panning {
            return;
        }

        let (pressed, down, released, shift, command, delta) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.modifiers.shift,
                i.modifiers.command,
                i.pointer.delta(),
            )
        });

        if pressed && !command && response.contains_pointer() {
            if let Some(screen_pos) = ui.input(|i| i.pointer.interact_pos()) {
                self.handle_press(screen_pos, shift);
            }
        } else if down {
            if let Some(dragging_id) = self.interaction.dragging_node.clone() {
                self.drag_selected_nodes(&dragging_id, delta);
            } else if self.interaction.drawing_connection_from.is_some() {
                self.interaction.connection_draw_pos = response.interact_pointer_pos();
            }
        }

        if released {
            if self.interaction.drawing_connection_from.is_some() {
                if let Some(current_pos) = ui.input(|i| i.pointer.interact_pos()) {
                    let world_pos = self.screen_to_world(current_pos);
                    self.finalize_connection(world_pos);
                }
            }
            if self.interaction.dragging_node.take().is_some() {
                self.editor.apply(Intent::CommitEdit);
            }
            self.interaction.drawing_connection_from = None;
            self.interaction.connection_draw_pos = None;
        }
    }

    /// Handles a secondary click: adds a node centred on the pointer.
    pub fn handle_context_click(&mut self, response: &egui::Response) {
        if !response.secondary_clicked() {
            return;
        }
        if let Some(screen_pos) = response.interact_pointer_pos() {
            let world = self.screen_to_world(screen_pos);
            let position = Position::new(world.x - NODE_WIDTH / 2.0, world.y - NODE_HEIGHT / 2.0);
            self.editor.apply(Intent::AddNode { position });
        }
    }

    fn handle_press(&mut self, screen_pos: egui::Pos2, shift: bool) {
        let world_pos = self.screen_to_world(screen_pos);
        // Close a session a focused label field still holds open
        self.editor.apply(Intent::CommitEdit);

        if let Some(node_id) = self.find_node_at_position(world_pos) {
            if shift {
                self.interaction.drawing_connection_from = Some(node_id);
                self.interaction.connection_draw_pos = Some(screen_pos);
            } else {
                self.editor.apply(Intent::SelectNode(node_id.clone()));
                self.editor.apply(Intent::BeginEdit);
                self.interaction.dragging_node = Some(node_id);
            }
            self.stop_label_editing();
        } else if let Some(edge_id) = self.find_edge_at_position(world_pos) {
            self.editor.apply(Intent::SelectEdge(edge_id));
            self.stop_label_editing();
        } else {
            self.editor.apply(Intent::ClearSelection);
            self.stop_label_editing();
        }
    }

    /// Moves every selected node with the pointer.
    ///
    /// # Arguments
    ///
    /// * `dragging_id` - Node the drag started on
    /// * `screen_delta` - Pointer movement this frame in screen space
    fn drag_selected_nodes(&mut self, dragging_id: &str, screen_delta: egui::Vec2) {
        if screen_delta == egui::Vec2::ZERO {
            return;
        }
        let mut ids = self.editor.selection().nodes().to_vec();
        if !ids.iter().any(|id| id == dragging_id) {
            ids.push(dragging_id.to_string());
        }
        let world_delta = screen_delta / self.canvas.zoom_factor;
        self.editor.apply(Intent::MoveNodes {
            ids,
            dx: world_delta.x,
            dy: world_delta.y,
        });
    }

    /// Finalizes connection creation when mouse is released.
    ///
    /// Self-loops and parallel edges are allowed; releasing over empty canvas
    /// creates nothing.
    fn finalize_connection(&mut self, world_pos: egui::Pos2) {
        let Some(source) = self.interaction.drawing_connection_from.take() else {
            return;
        };
        if let Some(target) = self.find_node_at_position(world_pos) {
            self.editor.apply(Intent::Connect { source, target });
        }
    }

    /// Drops any half-typed label so the properties panel reloads from the new selection.
    fn stop_label_editing(&mut self) {
        self.interaction.editing_node_label = false;
        self.interaction.editing_edge_label = false;
    }

    /// Finds the topmost node at the given canvas position, if any.
    ///
    /// Nodes are drawn in list order, so the last matching node is the one on top.
    ///
    /// # Arguments
    ///
    /// * `pos` - Position in world space to check
    pub fn find_node_at_position(&self, pos: egui::Pos2) -> Option<NodeId> {
        self.editor
            .diagram()
            .nodes
            .iter()
            .rev()
            .find(|node| node_rect(node).contains(pos))
            .map(|node| node.id.clone())
    }

    /// Finds the edge at the given world position, if any.
    ///
    /// Uses distance-to-line-segment calculation with a threshold for hit detection.
    pub fn find_edge_at_position(&self, pos: egui::Pos2) -> Option<EdgeId> {
        let diagram = self.editor.diagram();
        diagram
            .edges
            .iter()
            .rev()
            .find(|edge| {
                match (diagram.node(&edge.source), diagram.node(&edge.target)) {
                    (Some(from), Some(to)) => {
                        let (start, end) = edge_endpoints(from, to);
                        point_to_line_distance(pos, start, end) < CLICK_THRESHOLD
                    }
                    _ => false,
                }
            })
            .map(|edge| edge.id.clone())
    }
}

/// World-space rectangle of a node. Positions are the top-left corner.
pub(super) fn node_rect(node: &Node) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(node.position.x, node.position.y),
        egui::vec2(NODE_WIDTH, NODE_HEIGHT),
    )
}

/// World-space endpoints of an edge: bottom handle of the source, top handle of the target.
pub(super) fn edge_endpoints(source: &Node, target: &Node) -> (egui::Pos2, egui::Pos2) {
    (node_rect(source).center_bottom(), node_rect(target).center_top())
}

/// Calculates the distance from a point to a line segment.
///
/// Uses vector projection to find the closest point on the line segment.
pub(super) fn point_to_line_distance(
    point: egui::Pos2,
    line_start: egui::Pos2,
    line_end: egui::Pos2,
) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;
    let line_len_sq = line_vec.length_sq();

    if line_len_sq < 0.0001 {
        // Line segment is essentially a point
        return point_vec.length();
    }

    // Project point onto line segment (clamped to segment endpoints)
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;

    (point - projection).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_line_distance() {
        let start = egui::pos2(0.0, 0.0);
        let end = egui::pos2(10.0, 0.0);
        assert_eq!(point_to_line_distance(egui::pos2(5.0, 3.0), start, end), 3.0);
        // Beyond the end the distance is to the endpoint
        assert_eq!(point_to_line_distance(egui::pos2(14.0, 3.0), start, end), 5.0);
        // Degenerate segment
        assert_eq!(point_to_line_distance(egui::pos2(3.0, 4.0), start, start), 5.0);
    }

    #[test]
    fn test_edge_endpoints_use_handles() {
        let mut diagram = Diagram::default();
        diagram.add_node("1", Position::new(0.0, 0.0));
        diagram.add_node("2", Position::new(0.0, 200.0));
        let (start, end) = edge_endpoints(&diagram.nodes[0], &diagram.nodes[1]);
        assert_eq!(start, egui::pos2(NODE_WIDTH / 2.0, NODE_HEIGHT));
        assert_eq!(end, egui::pos2(NODE_WIDTH / 2.0, 200.0));
    }
}
