//! Wire-format graph data served by the backend.

use serde::Deserialize;

/// A song node as returned by `GET /graph/data/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique identifier within the graph. Links reference this.
	pub id: String,
	/// Song title, used as the node label and tooltip headline.
	pub name: String,
	/// Performing artist, shown in the tooltip payload.
	#[serde(default)]
	pub artist: String,
	/// Marker diameter in pixels.
	#[serde(default = "default_symbol_size")]
	pub symbol_size: f64,
	/// Horizontal seed position, synthesized client-side after fetch.
	#[serde(default)]
	pub x: f64,
	/// Vertical seed position, synthesized client-side after fetch.
	#[serde(default)]
	pub y: f64,
}

fn default_symbol_size() -> f64 {
	20.0
}

/// A directed, weighted relation between two songs.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relation strength; drives the rendered stroke width.
	pub value: f64,
}

/// Complete payload for one graph: nodes plus the links between them.
///
/// Link endpoints that reference unknown nodes are the server's
/// data-quality concern and are passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// All songs in the graph.
	pub nodes: Vec<GraphNode>,
	/// All relations between songs.
	pub links: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_node_defaults() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "name": "Song A"}"#).unwrap();
		assert_eq!(node.symbol_size, 20.0);
		assert_eq!(node.artist, "");
		assert_eq!((node.x, node.y), (0.0, 0.0));
	}

	#[test]
	fn test_payload_parses_wire_names() {
		let json = r#"{
			"nodes": [{"id": "a", "name": "Song A", "artist": "Artist A", "symbolSize": 32}],
			"links": [{"source": "a", "target": "b", "value": 3.5}]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes.len(), 1);
		assert_eq!(data.nodes[0].symbol_size, 32.0);
		assert_eq!(data.links[0].value, 3.5);
	}
}
