//! Shared application-wide constants.
//! Centralizes tweakable values used across the diagram model, UI rendering and interactions.

// Node dimensions
/// Default node width in world units.
pub const NODE_WIDTH: f32 = 100.0;
/// Default node height in world units.
pub const NODE_HEIGHT: f32 = 50.0;
/// Corner radius for node rectangles (in screen pixels after transform).
pub const NODE_CORNER_RADIUS: f32 = 6.0;

// Node style defaults
/// Fill color given to new nodes.
pub const DEFAULT_BG_COLOR: &str = "#D3D3D3";
/// Label color given to new nodes.
pub const DEFAULT_FONT_COLOR: &str = "#242424";
/// Label size given to new nodes.
pub const DEFAULT_FONT_SIZE: &str = "12px";
/// Label weight given to new nodes.
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
/// Label style given to new nodes.
pub const DEFAULT_FONT_STYLE: &str = "normal";
/// Label font family given to new nodes.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

// Style toolbar choices
/// Font families offered in the style toolbar.
pub const FONT_FAMILIES: [&str; 4] = ["Arial", "Verdana", "Times New Roman", "Courier New"];
/// Font sizes offered in the style toolbar.
pub const FONT_SIZES: [&str; 6] = ["12px", "14px", "16px", "18px", "20px", "24px"];
/// Font weights offered in the style toolbar.
pub const FONT_WEIGHTS: [&str; 9] = ["100", "200", "300", "400", "500", "600", "700", "800", "900"];
/// Font styles offered in the style toolbar.
pub const FONT_STYLES: [&str; 2] = ["normal", "italic"];

// Editing
/// Offset applied to both axes of a duplicated node.
pub const DUPLICATE_OFFSET: f32 = 50.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Radius of background grid dots (in screen pixels).
pub const DOT_RADIUS: f32 = 1.0;

// Canvas interactions
/// Click threshold in world units used for hit-testing edges.
pub const CLICK_THRESHOLD: f32 = 8.0;

// Files
/// File name offered when exporting a diagram.
pub const EXPORT_FILE_NAME: &str = "newFlowchart.json";
/// Storage key under which UI preferences are persisted.
pub const APP_STATE_KEY: &str = "app_state";
