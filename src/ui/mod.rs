//! User interface components and rendering logic for the flowchart editor.
//!
//! This module contains the egui shell around the [`Editor`](crate::editor::Editor):
//! the toolbar, the properties panel, the canvas and keyboard handling. The shell
//! only reads editor state and dispatches [`Intent`]s.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main FlowchartApp
//! - `file_ops` - JSON export/import for native and WASM
//! - `canvas` - Canvas navigation, zooming, panning, and interaction
//! - `rendering` - Drawing nodes, edges and the grid

mod canvas;
mod file_ops;
mod rendering;
mod state;

pub use state::FlowchartApp;

use self::rendering::{format_hex_color, parse_hex_color};
use crate::constants::{
    APP_STATE_KEY, FONT_FAMILIES, FONT_SIZES, FONT_STYLES, FONT_WEIGHTS, NODE_HEIGHT, NODE_WIDTH,
};
use crate::editor::Intent;
use crate::types::*;
use eframe::egui;

impl eframe::App for FlowchartApp {
    /// Persist UI preferences and the layout configuration between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.layout_config = *self.editor.layout_config();
        match self.to_json() {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => log::error!("Failed to serialize app state: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// This method handles the overall UI layout, including the properties panel,
    /// toolbar, and main canvas area.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_undo_redo_keys(ctx);
        self.handle_delete_key(ctx);
        self.handle_duplicate_key(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let viewport_width = ctx.input(|i| i.screen_rect().width());
        let max_allowed = (viewport_width * 0.9).max(180.0);
        let clamped_width = self.properties_panel_width.clamp(180.0, max_allowed);

        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(clamped_width)
            .show(ctx, |ui| {
                self.properties_panel_width = ui.available_width().clamp(180.0, max_allowed);
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.close_finished_edit_session(ctx);
    }
}

impl FlowchartApp {
    /// Handles Ctrl/Cmd+Z for undo and Ctrl/Cmd+Shift+Z or Ctrl/Cmd+Y for redo.
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        // Text fields have their own undo
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.perform_undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Handles Delete/Backspace: removes selected nodes, or selected edges when no
    /// node is selected.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if !ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            return;
        }

        if !self.editor.selection().nodes().is_empty() {
            self.editor.apply(Intent::DeleteSelectedNodes);
        } else if !self.editor.selection().edges().is_empty() {
            self.editor.apply(Intent::DeleteSelectedEdges);
        }
    }

    /// Handles Ctrl/Cmd+D to duplicate the selected nodes.
    fn handle_duplicate_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::D) && i.modifiers.command) {
            self.editor.apply(Intent::DuplicateSelected);
        }
    }

    /// Closes an edit session once no drag, label edit or pointer press keeps it open.
    ///
    /// Color pickers report a change on every frame of a drag, so their session
    /// stays open until the pointer is released.
    fn close_finished_edit_session(&mut self, ctx: &egui::Context) {
        if !self.editor.is_editing() {
            return;
        }
        let busy = self.interaction.dragging_node.is_some()
            || self.interaction.editing_node_label
            || self.interaction.editing_edge_label
            || ctx.input(|i| i.pointer.any_down());
        if !busy {
            self.editor.apply(Intent::CommitEdit);
        }
    }

    fn perform_undo(&mut self) {
        if self.editor.apply(Intent::Undo) {
            self.clear_temp_editing_values();
        }
    }

    fn perform_redo(&mut self) {
        if self.editor.apply(Intent::Redo) {
            self.clear_temp_editing_values();
        }
    }

    /// Makes the properties panel reload its text fields from the diagram.
    fn clear_temp_editing_values(&mut self) {
        self.interaction.editing_node_label = false;
        self.interaction.editing_edge_label = false;
        self.interaction.temp_node_label.clear();
        self.interaction.temp_edge_label.clear();
    }

    /// Adds a node in the middle of the visible canvas.
    fn add_node_at_view_center(&mut self, canvas_rect: egui::Rect) {
        let center = self.screen_to_world(canvas_rect.center());
        let position = Position::new(center.x - NODE_WIDTH / 2.0, center.y - NODE_HEIGHT / 2.0);
        self.editor.apply(Intent::AddNode { position });
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_flowchart();
            }
            if ui.button("Import").clicked() {
                self.import_flowchart();
            }
            if ui.button("Export").clicked() {
                self.export_flowchart();
            }

            ui.separator();

            if ui.button("Add Node").clicked() {
                let rect = ui.ctx().screen_rect();
                self.add_node_at_view_center(rect);
            }
            if ui.button("Auto Layout").clicked() {
                self.editor.apply(Intent::AutoLayout);
            }

            ui.separator();

            ui.add_enabled_ui(self.editor.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.perform_undo();
                }
            });
            ui.add_enabled_ui(self.editor.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.perform_redo();
                }
            });

            ui.separator();

            ui.checkbox(&mut self.canvas.show_grid, "Show Grid");
            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let title = if self.has_unsaved_changes() {
                    "Untitled*"
                } else {
                    "Untitled"
                };
                ui.label(title);
                ui.label(format!("Zoom: {:.0}%", self.canvas.zoom_factor * 100.0));
                if let Some(message) = &self.file.status_message {
                    ui.label(message);
                }
            });
        });
    }

    /// Renders the properties panel for the current selection.
    ///
    /// Node selections get the label and style controls, edge selections get the
    /// label and animation controls.
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Properties");
            ui.separator();

            let node_count = self.editor.selection().nodes().len();
            let edge_count = self.editor.selection().edges().len();

            if node_count > 0 {
                self.draw_node_properties(ui, node_count);
            } else if edge_count > 0 {
                self.draw_edge_properties(ui, edge_count);
            } else {
                self.draw_no_selection_info(ui);
            }
        });
    }

    fn draw_node_properties(&mut self, ui: &mut egui::Ui, count: usize) {
        let style = self.editor.style_config();

        if count == 1 {
            ui.label("1 node selected");
        } else {
            ui.label(format!("{count} nodes selected"));
        }
        ui.add_space(4.0);

        // Label
        if !self.interaction.editing_node_label {
            self.interaction.temp_node_label = style.label.clone();
        }
        ui.label("Label:");
        let response = ui.text_edit_singleline(&mut self.interaction.temp_node_label);
        if response.gained_focus() {
            self.interaction.editing_node_label = true;
            self.editor.apply(Intent::BeginEdit);
        }
        if response.changed() {
            self.editor.apply(Intent::SetNodeStyle {
                property: StyleProperty::Label,
                value: self.interaction.temp_node_label.clone(),
            });
        }
        if response.lost_focus() {
            self.interaction.editing_node_label = false;
            self.editor.apply(Intent::CommitEdit);
        }

        ui.add_space(8.0);
        egui::Grid::new("node_style_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                self.style_combo(ui, "Font", StyleProperty::FontFamily, &style, &FONT_FAMILIES);
                self.style_combo(ui, "Size", StyleProperty::FontSize, &style, &FONT_SIZES);
                self.style_combo(ui, "Weight", StyleProperty::FontWeight, &style, &FONT_WEIGHTS);
                self.style_combo(ui, "Style", StyleProperty::FontStyle, &style, &FONT_STYLES);
                self.style_color(ui, "Text color", StyleProperty::FontColor, &style);
                self.style_color(ui, "Fill", StyleProperty::BgColor, &style);
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Duplicate").clicked() {
                self.editor.apply(Intent::DuplicateSelected);
            }
            if ui.button("Delete").clicked() {
                self.editor.apply(Intent::DeleteSelectedNodes);
            }
        });
    }

    /// One grid row with a combo box offering the toolbar choices for `property`.
    fn style_combo(
        &mut self,
        ui: &mut egui::Ui,
        label: &str,
        property: StyleProperty,
        style: &NodeData,
        options: &[&str],
    ) {
        let current = style.get(property).to_string();
        ui.label(label);
        egui::ComboBox::from_id_salt(property.as_str())
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for option in options {
                    if ui.selectable_label(current == *option, *option).clicked() {
                        self.editor.apply(Intent::SetNodeStyle {
                            property,
                            value: option.to_string(),
                        });
                    }
                }
            });
        ui.end_row();
    }

    /// One grid row with a color button for a color `property`.
    fn style_color(
        &mut self,
        ui: &mut egui::Ui,
        label: &str,
        property: StyleProperty,
        style: &NodeData,
    ) {
        let color = parse_hex_color(style.get(property)).unwrap_or(egui::Color32::GRAY);
        let mut rgb = [color.r(), color.g(), color.b()];
        ui.label(label);
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            self.editor.apply(Intent::BeginEdit);
            self.editor.apply(Intent::SetNodeStyle {
                property,
                value: format_hex_color(egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])),
            });
        }
        ui.end_row();
    }

    fn draw_edge_properties(&mut self, ui: &mut egui::Ui, count: usize) {
        let first = self
            .editor
            .selection()
            .edges()
            .iter()
            .find_map(|id| self.editor.diagram().edge(id))
            .cloned();
        let Some(first) = first else {
            return;
        };

        if count == 1 {
            ui.label(format!("Edge {} → {}", first.source, first.target));
        } else {
            ui.label(format!("{count} edges selected"));
        }
        ui.add_space(4.0);

        if !self.interaction.editing_edge_label {
            self.interaction.temp_edge_label = first.label.clone().unwrap_or_default();
        }
        ui.label("Label:");
        let response = ui.text_edit_singleline(&mut self.interaction.temp_edge_label);
        if response.gained_focus() {
            self.interaction.editing_edge_label = true;
            self.editor.apply(Intent::BeginEdit);
        }
        if response.changed() {
            self.editor
                .apply(Intent::SetEdgeLabel(self.interaction.temp_edge_label.clone()));
        }
        if response.lost_focus() {
            self.interaction.editing_edge_label = false;
            self.editor.apply(Intent::CommitEdit);
        }

        let mut animated = first.animated;
        if ui.checkbox(&mut animated, "Animated").changed() {
            self.editor.apply(Intent::SetEdgeAnimated(animated));
        }

        ui.add_space(8.0);
        if ui.button("Delete").clicked() {
            self.editor.apply(Intent::DeleteSelectedEdges);
        }
    }

    fn draw_no_selection_info(&self, ui: &mut egui::Ui) {
        ui.label("Nothing selected.");
        ui.add_space(4.0);
        ui.label("Right-click the canvas to add a node.");
        ui.label("Shift-drag from one node to another to connect them.");
        ui.label(format!(
            "{} node(s), {} edge(s)",
            self.editor.diagram().nodes.len(),
            self.editor.diagram().edges.len()
        ));
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        if !self.canvas.initialized {
            self.canvas.offset = response.rect.min.to_vec2();
            self.canvas.initialized = true;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_pointer(ui, &response);
        self.handle_context_click(&response);

        self.render_flowchart_elements(&painter, response.rect);
    }
}
