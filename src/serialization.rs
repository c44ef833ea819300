//! JSON export and import of diagrams.
//!
//! The exchange format is deliberately small: node ids with their labels, and edge
//! endpoints with their ids. Positions and styling are not exported; an imported
//! diagram is always re-laid out.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "1", "data": { "label": "Start" } }],
//!   "edges": [{ "source": "1", "target": "2", "id": "e1-2" }]
//! }
//! ```

use crate::layout::{assign_positions, LayoutConfig};
use crate::types::{Diagram, Edge, Node, NodeData, NodeId, Position};
use serde::{Deserialize, Serialize};

/// Errors produced while exporting or importing a diagram.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The input was not valid JSON or did not match the exchange format
    #[error("invalid flowchart file: {0}")]
    InvalidDocument(#[source] serde_json::Error),
    /// The diagram could not be encoded
    #[error("failed to encode flowchart: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    nodes: Vec<ExportNode<'a>>,
    edges: Vec<ExportEdge<'a>>,
}

#[derive(Serialize)]
struct ExportNode<'a> {
    id: &'a str,
    data: ExportNodeData<'a>,
}

#[derive(Serialize)]
struct ExportNodeData<'a> {
    label: &'a str,
}

#[derive(Serialize)]
struct ExportEdge<'a> {
    source: &'a str,
    target: &'a str,
    id: &'a str,
}

#[derive(Deserialize)]
struct ImportDocument {
    nodes: Vec<ImportNode>,
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct ImportNode {
    id: NodeId,
    #[serde(default)]
    data: NodeData,
}

/// Serializes the diagram to the pretty-printed exchange format.
pub fn export_json(diagram: &Diagram) -> Result<String, SerializationError> {
    let document = ExportDocument {
        nodes: diagram
            .nodes
            .iter()
            .map(|n| ExportNode {
                id: &n.id,
                data: ExportNodeData {
                    label: &n.data.label,
                },
            })
            .collect(),
        edges: diagram
            .edges
            .iter()
            .map(|e| ExportEdge {
                source: &e.source,
                target: &e.target,
                id: &e.id,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document).map_err(SerializationError::Encode)
}

/// Parses the exchange format and lays the nodes out with `config`.
///
/// A missing `edges` array is read as empty. Style fields present in node data are
/// kept; absent ones take their defaults.
pub fn import_json(json: &str, config: &LayoutConfig) -> Result<Diagram, SerializationError> {
    let document: ImportDocument =
        serde_json::from_str(json).map_err(SerializationError::InvalidDocument)?;
    let nodes: Vec<Node> = document
        .nodes
        .into_iter()
        .map(|n| Node::new(n.id, Position::default(), n.data))
        .collect();
    Ok(Diagram {
        nodes: assign_positions(&nodes, &document.edges, config),
        edges: document.edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.add_node("1", Position::new(300.0, 40.0));
        diagram.add_node("2", Position::new(12.0, 500.0));
        diagram.nodes[0].data.label = "Start".to_string();
        diagram.nodes[0].data.bg_color = "#ff0000".to_string();
        diagram.connect("1", "2");
        diagram.edges[0].label = Some("next".to_string());
        diagram.edges[0].animated = true;
        diagram
    }

    #[test]
    fn test_export_keeps_only_ids_labels_and_endpoints() {
        let exported = export_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();

        assert_eq!(
            value,
            json!({
                "nodes": [
                    { "id": "1", "data": { "label": "Start" } },
                    { "id": "2", "data": { "label": "Node 2" } }
                ],
                "edges": [
                    { "source": "1", "target": "2", "id": "reactflow__edge-1-2" }
                ]
            })
        );
    }

    #[test]
    fn test_round_trip_preserves_ids_and_labels_not_positions() {
        let original = sample();

        let imported = import_json(&export_json(&original).unwrap(), &LayoutConfig::default()).unwrap();

        let labels: Vec<(&str, &str)> = imported
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.data.label.as_str()))
            .collect();
        assert_eq!(labels, vec![("1", "Start"), ("2", "Node 2")]);
        assert_eq!(imported.nodes[0].position, Position::new(0.0, 100.0));
        assert_eq!(imported.nodes[1].position, Position::new(0.0, 200.0));
        assert_eq!(imported.nodes[0].data.bg_color, "#D3D3D3");
        assert_eq!(imported.edges[0].label, None);
        assert!(!imported.edges[0].animated);
    }

    #[test]
    fn test_import_without_edges() {
        let text = json!({ "nodes": [{ "id": "a", "data": { "label": "A" } }] }).to_string();

        let imported = import_json(&text, &LayoutConfig::default()).unwrap();

        assert_eq!(imported.nodes.len(), 1);
        assert!(imported.edges.is_empty());
    }

    #[test]
    fn test_import_keeps_style_and_edge_extras_when_present() {
        let text = json!({
            "nodes": [
                { "id": "a", "data": { "label": "A", "fontColor": "#00ff00" } },
                { "id": "b" }
            ],
            "edges": [{ "id": "ab", "source": "a", "target": "b", "label": "go" }]
        })
        .to_string();

        let imported = import_json(&text, &LayoutConfig::default()).unwrap();

        assert_eq!(imported.nodes[0].data.font_color, "#00ff00");
        assert_eq!(imported.nodes[1].data.label, "");
        assert_eq!(imported.edges[0].label.as_deref(), Some("go"));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let err = import_json("{ not json", &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SerializationError::InvalidDocument(_)));
        assert!(err.to_string().starts_with("invalid flowchart file"));

        let missing_nodes = import_json(r#"{ "edges": [] }"#, &LayoutConfig::default());
        assert!(missing_nodes.is_err());
    }
}
