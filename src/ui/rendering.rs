//! Canvas rendering functionality for nodes, edges, and grid.
//!
//! This module handles all drawing operations including the dotted grid background,
//! edge lines with arrows and labels, and styled node boxes.

use super::canvas::{edge_endpoints, node_rect};
use super::state::FlowchartApp;
use crate::constants::{DEFAULT_FONT_SIZE, DOT_RADIUS, GRID_SIZE, NODE_CORNER_RADIUS};
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);

impl FlowchartApp {
    /// Renders all flowchart elements (grid, edges, and nodes) on the canvas.
    ///
    /// Elements are drawn in layers: grid first (background), then edges,
    /// then nodes (foreground), ensuring proper visual hierarchy.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    pub fn render_flowchart_elements(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        let diagram = self.editor.diagram();
        for edge in &diagram.edges {
            if let (Some(source), Some(target)) =
                (diagram.node(&edge.source), diagram.node(&edge.target))
            {
                self.draw_edge(painter, edge, source, target);
            }
        }

        if let (Some(from_id), Some(to_pos)) = (
            &self.interaction.drawing_connection_from,
            self.interaction.connection_draw_pos,
        ) {
            self.draw_connection_preview(painter, from_id, to_pos);
        }

        for node in &diagram.nodes {
            self.draw_node(painter, node);
        }
    }

    /// Draws a dot at every grid intersection visible in `canvas_rect`.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        // Skip when the dots would merge into noise
        let screen_grid_size = GRID_SIZE * self.canvas.zoom_factor;
        if screen_grid_size < 4.0 {
            return;
        }

        let dot_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 80);
        let top_left_world = self.screen_to_world(canvas_rect.min);
        let bottom_right_world = self.screen_to_world(canvas_rect.max);

        let start_x = (top_left_world.x / GRID_SIZE).floor() * GRID_SIZE;
        let start_y = (top_left_world.y / GRID_SIZE).floor() * GRID_SIZE;

        let mut x = start_x;
        while x <= bottom_right_world.x {
            let mut y = start_y;
            while y <= bottom_right_world.y {
                let screen = self.world_to_screen(egui::pos2(x, y));
                if canvas_rect.contains(screen) {
                    painter.circle_filled(screen, DOT_RADIUS, dot_color);
                }
                y += GRID_SIZE;
            }
            x += GRID_SIZE;
        }
    }

    /// Renders an edge from the bottom of its source to the top of its target.
    ///
    /// Animated edges are dashed. Selected edges use the selection color. The label,
    /// if any, is drawn on a small plate at the midpoint.
    pub fn draw_edge(&self, painter: &egui::Painter, edge: &Edge, source: &Node, target: &Node) {
        let (start_world, end_world) = edge_endpoints(source, target);
        let start = self.world_to_screen(start_world);
        let end = self.world_to_screen(end_world);

        let selected = self.editor.selection().contains_edge(&edge.id);
        let color = if selected {
            SELECTION_COLOR
        } else if self.dark_mode {
            egui::Color32::from_gray(180)
        } else {
            egui::Color32::from_gray(90)
        };
        let width = if selected { 2.5 } else { 1.5 };
        let stroke = egui::Stroke::new(width * self.canvas.zoom_factor.max(0.5), color);

        if edge.animated {
            let dash = 6.0 * self.canvas.zoom_factor;
            painter.extend(egui::Shape::dashed_line(&[start, end], stroke, dash, dash));
        } else {
            painter.line_segment([start, end], stroke);
        }

        self.draw_arrow_head(painter, start, end, color);

        if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
            let center = start + (end - start) * 0.5;
            let font_id = egui::FontId::proportional((11.0 * self.canvas.zoom_factor).clamp(8.0, 36.0));
            let galley = painter.layout_no_wrap(label.to_string(), font_id, color);
            let plate = egui::Rect::from_center_size(center, galley.size() + egui::vec2(6.0, 2.0));
            painter.rect_filled(plate, 3.0, painter.ctx().style().visuals.extreme_bg_color);
            painter.galley(plate.center() - galley.size() * 0.5, galley, color);
        }
    }

    /// Draws a directional arrow head at the target end of an edge.
    ///
    /// The arrow is rendered as a filled triangle whose tip touches the target.
    fn draw_arrow_head(
        &self,
        painter: &egui::Painter,
        start: egui::Pos2,
        end: egui::Pos2,
        color: egui::Color32,
    ) {
        let delta = end - start;
        if delta.length_sq() < f32::EPSILON {
            return;
        }
        let direction = delta.normalized();

        // Arrow size scales with zoom
        let arrow_size = 8.0 * self.canvas.zoom_factor;
        let arrow_width = 5.0 * self.canvas.zoom_factor;

        let perpendicular = egui::vec2(-direction.y, direction.x);
        let base = end - direction * arrow_size;
        let arrow_left = base + perpendicular * arrow_width;
        let arrow_right = base - perpendicular * arrow_width;

        painter.add(egui::Shape::convex_polygon(
            vec![end, arrow_left, arrow_right],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Renders a preview line while the user is drawing a connection.
    ///
    /// Shows a line from the source node's bottom handle to the pointer. The end
    /// marker is filled when the pointer is over a node that would become the target.
    pub fn draw_connection_preview(
        &self,
        painter: &egui::Painter,
        from_node_id: &str,
        to_screen_pos: egui::Pos2,
    ) {
        let Some(from_node) = self.editor.diagram().node(from_node_id) else {
            return;
        };
        let from_screen = self.world_to_screen(node_rect(from_node).center_bottom());
        let stroke = egui::Stroke::new(2.0, SELECTION_COLOR);
        painter.line_segment([from_screen, to_screen_pos], stroke);

        let over_target = self
            .find_node_at_position(self.screen_to_world(to_screen_pos))
            .is_some();
        if over_target {
            painter.circle_filled(to_screen_pos, 4.0, SELECTION_COLOR);
        } else {
            painter.circle_stroke(to_screen_pos, 4.0, stroke);
        }
    }

    /// Renders a single node with its fill color and styled, wrapped label.
    ///
    /// Selected nodes get a highlighted border.
    pub fn draw_node(&self, painter: &egui::Painter, node: &Node) {
        let world_rect = node_rect(node);
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(world_rect.min),
            self.world_to_screen(world_rect.max),
        );
        let radius = NODE_CORNER_RADIUS * self.canvas.zoom_factor;

        let fill = parse_hex_color(&node.data.bg_color).unwrap_or(egui::Color32::LIGHT_GRAY);
        painter.rect_filled(rect, radius, fill);

        let (stroke_color, stroke_width) = if self.editor.selection().contains_node(&node.id) {
            (SELECTION_COLOR, 3.0)
        } else {
            (egui::Color32::from_gray(60), 1.0)
        };
        painter.rect_stroke(
            rect,
            radius,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        self.draw_node_label(painter, &node.data, rect);
    }

    /// Lays out the node label with its font settings, wrapped to the node width
    /// and centered.
    fn draw_node_label(&self, painter: &egui::Painter, data: &NodeData, rect: egui::Rect) {
        let font_size = (parse_font_size(&data.font_size) * self.canvas.zoom_factor).clamp(4.0, 96.0);
        let color = parse_hex_color(&data.font_color).unwrap_or(egui::Color32::BLACK);

        let mut job = egui::text::LayoutJob::single_section(
            data.label.clone(),
            egui::TextFormat {
                font_id: egui::FontId::new(font_size, font_family(&data.font_family)),
                color,
                italics: data.font_style == "italic",
                ..Default::default()
            },
        );
        job.wrap.max_width = (rect.width() - 8.0 * self.canvas.zoom_factor).max(1.0);
        job.halign = egui::Align::Center;

        let galley = painter.layout_job(job);
        let pos = egui::pos2(rect.center().x, rect.center().y - galley.size().y / 2.0);
        // The bundled fonts have no bold face, so heavy weights are overstruck
        if is_bold_weight(&data.font_weight) {
            let offset = egui::vec2((0.06 * font_size).max(0.5), 0.0);
            painter.galley(pos + offset, galley.clone(), color);
        }
        painter.galley(pos, galley, color);
    }
}

/// Whether a CSS font weight (`"bold"`, `"700"`, ...) should render heavier than normal.
fn is_bold_weight(weight: &str) -> bool {
    let weight = weight.trim();
    weight.eq_ignore_ascii_case("bold")
        || weight.eq_ignore_ascii_case("bolder")
        || weight.parse::<u32>().is_ok_and(|w| w >= 600)
}

/// Maps a CSS font family onto the closest egui font family.
fn font_family(name: &str) -> egui::FontFamily {
    if name.eq_ignore_ascii_case("Courier New") || name.eq_ignore_ascii_case("monospace") {
        egui::FontFamily::Monospace
    } else {
        egui::FontFamily::Proportional
    }
}

/// Parses a CSS pixel size such as `"16px"`, falling back to the default size.
pub(super) fn parse_font_size(size: &str) -> f32 {
    size.trim()
        .trim_end_matches("px")
        .parse::<f32>()
        .ok()
        .filter(|s| *s > 0.0)
        .or_else(|| DEFAULT_FONT_SIZE.trim_end_matches("px").parse().ok())
        .unwrap_or(12.0)
}

/// Parses `#RGB` or `#RRGGBB` (with optional alpha) into a color.
pub(super) fn parse_hex_color(hex: &str) -> Option<egui::Color32> {
    egui::Color32::from_hex(hex.trim()).ok()
}

/// Formats a color as `#RRGGBB`, the form the style fields store.
pub(super) fn format_hex_color(color: egui::Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#D3D3D3"),
            Some(egui::Color32::from_rgb(211, 211, 211))
        );
        assert_eq!(
            parse_hex_color("#242424"),
            Some(egui::Color32::from_rgb(36, 36, 36))
        );
        assert_eq!(parse_hex_color("lightgray"), None);
    }

    #[test]
    fn test_format_hex_color() {
        assert_eq!(format_hex_color(egui::Color32::from_rgb(211, 211, 211)), "#D3D3D3");
        let parsed = parse_hex_color("#1a2b3c").unwrap();
        assert_eq!(format_hex_color(parsed), "#1A2B3C");
    }

    #[test]
    fn test_parse_font_size() {
        assert_eq!(parse_font_size("16px"), 16.0);
        assert_eq!(parse_font_size("24"), 24.0);
        assert_eq!(parse_font_size("large"), 12.0);
        assert_eq!(parse_font_size("-3px"), 12.0);
    }

    #[test]
    fn test_bold_weights() {
        assert!(is_bold_weight("bold"));
        assert!(is_bold_weight("700"));
        assert!(is_bold_weight("600"));
        assert!(!is_bold_weight("normal"));
        assert!(!is_bold_weight("400"));
        assert!(!is_bold_weight("lighter"));
    }

    #[test]
    fn test_font_family_mapping() {
        assert_eq!(font_family("Courier New"), egui::FontFamily::Monospace);
        assert_eq!(font_family("Arial"), egui::FontFamily::Proportional);
    }
}
