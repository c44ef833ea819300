//! Application state management structures.
//!
//! This module contains the state structures that track the application's current
//! UI state: canvas navigation, in-progress gestures, text being edited and file
//! operations. The diagram itself lives in the [`Editor`].

use crate::constants::APP_STATE_KEY;
use crate::editor::Editor;
use crate::layout::LayoutConfig;
use crate::types::NodeId;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// State related to canvas navigation and display.
///
/// Tracks the current pan offset, zoom level, and display options for the canvas.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Whether the dot grid should be displayed on the canvas
    pub show_grid: bool,
    /// Whether the offset has been centered on the canvas yet
    #[serde(skip)]
    pub initialized: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
            initialized: false,
        }
    }
}

/// State of in-progress pointer gestures and text edits.
#[derive(Default)]
pub struct InteractionState {
    /// Node under the pointer when the current drag started
    pub dragging_node: Option<NodeId>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Node from which a connection is being drawn (shift-drag)
    pub drawing_connection_from: Option<NodeId>,
    /// Current pointer position while drawing a connection (screen space)
    pub connection_draw_pos: Option<egui::Pos2>,
    /// Whether the node label field currently has focus
    pub editing_node_label: bool,
    /// Text in the node label field
    pub temp_node_label: String,
    /// Whether the edge label field currently has focus
    pub editing_edge_label: bool,
    /// Text in the edge label field
    pub temp_edge_label: String,
}

/// State related to file operations.
///
/// Manages unsaved-changes tracking and async import/export operations.
pub struct FileState {
    /// Editor revision at the last successful import or export
    pub saved_revision: u64,
    /// Pending export for the next frame
    pub pending_export: bool,
    /// Pending import for the next frame
    pub pending_import: bool,
    /// Channel for receiving file operation results from async contexts
    pub file_operation_sender: Sender<FileOperationResult>,
    /// Receiving end drained once per frame
    pub file_operation_receiver: Receiver<FileOperationResult>,
    /// Last message shown in the toolbar status area
    pub status_message: Option<String>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            saved_revision: 0,
            pending_export: false,
            pending_import: false,
            file_operation_sender: sender,
            file_operation_receiver: receiver,
            status_message: None,
        }
    }
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Export completed successfully with the given path or file name
    ExportCompleted(String),
    /// A file was read; carries its name and content
    ImportCompleted(String, String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// The main application structure containing UI state and the editor.
///
/// This struct implements the `eframe::App` trait. Only view preferences and the
/// layout configuration are persisted between sessions; the diagram is not.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FlowchartApp {
    /// Diagram state machine
    #[serde(skip)]
    pub editor: Editor,
    /// Layout parameters handed to the editor on startup
    pub layout_config: LayoutConfig,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// User interaction state
    #[serde(skip)]
    pub interaction: InteractionState,
    /// File operations state
    #[serde(skip)]
    pub file: FileState,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the properties panel across sessions
    pub properties_panel_width: f32,
}

impl Default for FlowchartApp {
    fn default() -> Self {
        Self {
            editor: Editor::default(),
            layout_config: LayoutConfig::default(),
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            dark_mode: true,
            properties_panel_width: 260.0,
        }
    }
}

impl FlowchartApp {
    /// Creates the app, restoring preferences saved by a previous session.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let restored = cc
            .storage
            .and_then(|storage| storage.get_string(APP_STATE_KEY))
            .and_then(|json| match Self::from_json(&json) {
                Ok(app) => Some(app),
                Err(err) => {
                    log::warn!("Ignoring unreadable saved app state: {err}");
                    None
                }
            });
        let mut app = restored.unwrap_or_default();
        app.editor = Editor::new(app.layout_config);
        app.file.saved_revision = app.editor.revision();
        app
    }

    /// Serializes the persisted part of the application state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes application state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns true if the diagram changed since the last import or export.
    pub fn has_unsaved_changes(&self) -> bool {
        self.editor.revision() != self.file.saved_revision
    }
}
