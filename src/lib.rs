//! # Flowchart Editor
//!
//! An interactive flowchart editor: place nodes, connect them with directed edges,
//! style their labels and exchange diagrams as JSON.
//!
//! ## Features
//! - Node creation, duplication, deletion (edges are removed with their nodes)
//! - Multi-selection of nodes or edges
//! - Per-node label, font and color styling
//! - Linear undo/redo with edit sessions, so a typed label or a drag is one step
//! - Top-down hierarchy auto-layout
//! - Lossy JSON export/import (ids, labels and edges only)
//!
//! The diagram logic lives in [`Editor`] and is independent of the egui front end.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod editor;
mod hierarchy;
mod history;
mod layout;
mod selection;
mod serialization;
mod types;
mod ui;

// Re-export public types and functions
pub use constants::EXPORT_FILE_NAME;
pub use editor::{Editor, Intent};
pub use hierarchy::{build_hierarchy, Hierarchy};
pub use history::History;
pub use layout::{assign_positions, LayoutConfig};
pub use selection::Selection;
pub use serialization::{export_json, import_json, SerializationError};
pub use types::*;

/// Runs the flowchart editor with default settings.
///
/// This function initializes the egui application window and starts the main event loop.
/// UI preferences saved by a previous session are restored.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use flowchart_editor::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Flowchart Editor",
        options,
        Box::new(|cc| Ok(Box::new(ui::FlowchartApp::new(cc)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_default() {
        let editor = Editor::default();
        assert!(editor.diagram().nodes.is_empty());
        assert!(editor.diagram().edges.is_empty());
        assert!(!editor.can_undo());
        assert_eq!(editor.layout_config(), &LayoutConfig::default());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(EXPORT_FILE_NAME, "newFlowchart.json");
    }
}
