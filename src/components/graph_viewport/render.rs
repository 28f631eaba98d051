//! Translation of graph data into engine options, and ownership of the
//! live engine handle.
//!
//! Option building is pure so the exact document handed to the engine can
//! be asserted on. [`ViewportBinding`] wraps the handle itself: created at
//! most once per mount, reused across data refreshes, released exactly
//! once on teardown.

use serde::Serialize;

use super::engine::GraphEngine;
use super::types::{GraphEdge, GraphNode};

/// Widest stroke an edge may render with; heavier weights are capped so
/// the densest relations do not dominate the picture.
const EDGE_WIDTH_CAP: f64 = 5.0;
/// Fixed connector curvature, separating near-parallel edges.
const EDGE_CURVENESS: f64 = 0.2;

const NODE_COLOR: &str = "#66ccff";
const NODE_BORDER_COLOR: &str = "#4dabf7";
const NODE_GLOW: &str = "rgba(102, 204, 255, 0.5)";

/// Complete option document handed to the engine.
///
/// Built fresh for every render and applied with full-replace semantics,
/// so nothing from a previous graph survives a switch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOption {
	/// Canvas background fill.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub background_color: Option<String>,
	/// Hover tooltip configuration.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tooltip: Option<Tooltip>,
	/// The graph series; always exactly one for this viewport.
	pub series: Vec<GraphSeries>,
}

/// Hover tooltip configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
	/// What anchors the tooltip ("item" shows it per node/edge).
	pub trigger: String,
	/// Tooltip background fill.
	pub background_color: String,
	/// Tooltip border color.
	pub border_color: String,
	/// Tooltip text styling.
	pub text_style: TextStyle,
	/// Template over the descriptor: `{b}` is the name, `{c}` the value.
	pub formatter: String,
}

/// Tooltip text styling.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextStyle {
	/// Text color.
	pub color: String,
}

/// One graph series. Every field is optional so the same shape covers the
/// full render and the zoom-only partial update.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeries {
	/// Series kind; "graph" for the full render.
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Layout algorithm; "force" for the full render.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub layout: Option<String>,
	/// Animate layout relaxation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub layout_animation: Option<bool>,
	/// Camera zoom factor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub zoom: Option<f64>,
	/// Enable the engine's native pan/zoom gestures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub roam: Option<bool>,
	/// Node label placement and styling.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<SeriesLabel>,
	/// Node descriptors.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<Vec<SeriesNode>>,
	/// Edge descriptors.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub links: Option<Vec<SeriesLink>>,
	/// Glyphs at the two ends of each edge.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub edge_symbol: Option<Vec<String>>,
	/// Sizes of the end glyphs.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub edge_symbol_size: Option<Vec<f64>>,
	/// Physics parameters for the force layout.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub force: Option<ForceLayout>,
}

/// Node label placement and styling.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesLabel {
	/// Render labels at all.
	pub show: bool,
	/// Where the label sits relative to the marker.
	pub position: String,
	/// Label color.
	pub color: String,
	/// Label font size in pixels.
	pub font_size: u32,
}

/// Label-plus-marker descriptor for one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesNode {
	/// Node id, referenced by links.
	pub id: String,
	/// Song title; the label and tooltip headline.
	pub name: String,
	/// Marker diameter in pixels.
	pub symbol_size: f64,
	/// The artist doubles as the descriptor value so the tooltip template
	/// can reach it.
	pub value: String,
	/// Performing artist.
	pub artist: String,
	/// Seed position, horizontal.
	pub x: f64,
	/// Seed position, vertical.
	pub y: f64,
	/// Marker styling.
	pub item_style: ItemStyle,
}

/// Marker styling for one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
	/// Marker fill.
	pub color: String,
	/// Marker border color.
	pub border_color: String,
	/// Marker border width in pixels.
	pub border_width: f64,
	/// Glow radius in pixels.
	pub shadow_blur: f64,
	/// Glow color.
	pub shadow_color: String,
}

/// Directed, weighted connector descriptor for one edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesLink {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relation strength.
	pub value: f64,
	/// Stroke styling.
	pub line_style: LineStyle,
}

/// Stroke styling for one edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
	/// Stroke width in pixels, already capped.
	pub width: f64,
	/// Connector curvature.
	pub curveness: f64,
	/// Stroke color.
	pub color: String,
	/// Stroke opacity.
	pub opacity: f64,
}

/// Physics parameters for the engine's force layout.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceLayout {
	/// Node repulsion strength.
	pub repulsion: f64,
	/// Allowed edge length range.
	pub edge_length: Vec<f64>,
	/// Pull towards the canvas center.
	pub gravity: f64,
}

/// Build the full-replace render option for the given data at `zoom`.
pub fn graph_option(nodes: &[GraphNode], edges: &[GraphEdge], zoom: f64) -> EngineOption {
	EngineOption {
		background_color: Some("transparent".into()),
		tooltip: Some(Tooltip {
			trigger: "item".into(),
			background_color: "#ffffff".into(),
			border_color: "#e5e7eb".into(),
			text_style: TextStyle {
				color: "#374151".into(),
			},
			formatter: "<b>{b}</b><br/>{c}".into(),
		}),
		series: vec![GraphSeries {
			kind: Some("graph".into()),
			layout: Some("force".into()),
			layout_animation: Some(true),
			zoom: Some(zoom),
			roam: Some(true),
			label: Some(SeriesLabel {
				show: true,
				position: "right".into(),
				color: NODE_COLOR.into(),
				font_size: 12,
			}),
			data: Some(nodes.iter().map(node_descriptor).collect()),
			links: Some(edges.iter().map(link_descriptor).collect()),
			edge_symbol: Some(vec!["none".into(), "arrow".into()]),
			edge_symbol_size: Some(vec![4.0, 10.0]),
			force: Some(ForceLayout {
				repulsion: 400.0,
				edge_length: vec![50.0, 200.0],
				gravity: 0.1,
			}),
		}],
	}
}

/// Build the zoom-only partial update pushed after an accepted discrete
/// zoom command.
pub fn zoom_patch(zoom: f64) -> EngineOption {
	EngineOption {
		series: vec![GraphSeries {
			zoom: Some(zoom),
			..GraphSeries::default()
		}],
		..EngineOption::default()
	}
}

fn node_descriptor(node: &GraphNode) -> SeriesNode {
	SeriesNode {
		id: node.id.clone(),
		name: node.name.clone(),
		symbol_size: node.symbol_size,
		value: node.artist.clone(),
		artist: node.artist.clone(),
		x: node.x,
		y: node.y,
		item_style: ItemStyle {
			color: NODE_COLOR.into(),
			border_color: NODE_BORDER_COLOR.into(),
			border_width: 1.0,
			shadow_blur: 10.0,
			shadow_color: NODE_GLOW.into(),
		},
	}
}

fn link_descriptor(edge: &GraphEdge) -> SeriesLink {
	SeriesLink {
		source: edge.source.clone(),
		target: edge.target.clone(),
		value: edge.value,
		line_style: LineStyle {
			width: edge.value.min(EDGE_WIDTH_CAP),
			curveness: EDGE_CURVENESS,
			color: NODE_COLOR.into(),
			opacity: 0.3,
		},
	}
}

/// Exclusive owner of the engine handle for one mounted viewport.
///
/// The handle is created at most once per mount, on the first render that
/// finds the drawing surface attached, and reused by every later render.
/// Disposal takes the handle out, so calls arriving after teardown fall
/// through without touching a stale instance.
pub struct ViewportBinding<E: GraphEngine> {
	engine: Option<E>,
}

impl<E: GraphEngine> Default for ViewportBinding<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: GraphEngine> ViewportBinding<E> {
	/// A binding with no live engine yet.
	pub fn new() -> Self {
		Self { engine: None }
	}

	/// True while a live engine handle is owned.
	pub fn is_live(&self) -> bool {
		self.engine.is_some()
	}

	/// Apply a full-replace render of `nodes`/`edges` at `zoom`.
	///
	/// `create` runs only when no handle exists yet; it returns `None`
	/// while the drawing surface is not attached, which makes the whole
	/// call a no-op (an expected ordering race, not an error). Attaching
	/// engine listeners is the factory's business, so they are attached
	/// exactly once per handle and never again on later renders.
	pub fn render(
		&mut self,
		create: impl FnOnce() -> Option<E>,
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		zoom: f64,
	) -> bool {
		if self.engine.is_none() {
			match create() {
				Some(engine) => self.engine = Some(engine),
				None => return false,
			}
		}
		if let Some(engine) = &self.engine {
			engine.set_option(&graph_option(nodes, edges, zoom), true);
		}
		true
	}

	/// Push an accepted discrete zoom to the engine as a partial update.
	pub fn push_zoom(&self, zoom: f64) {
		if let Some(engine) = &self.engine {
			engine.set_option(&zoom_patch(zoom), false);
		}
	}

	/// Ask the engine to re-measure its canvas against the container.
	pub fn resize(&self) {
		if let Some(engine) = &self.engine {
			engine.resize();
		}
	}

	/// Release the engine handle. Safe to call any number of times; after
	/// the first, no instance is left to receive stale calls.
	pub fn dispose(&mut self) {
		if let Some(engine) = self.engine.take() {
			engine.dispose();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	fn node(id: &str, name: &str, artist: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: name.into(),
			artist: artist.into(),
			symbol_size: 20.0,
			x: 100.0,
			y: 200.0,
		}
	}

	fn edge(source: &str, target: &str, value: f64) -> GraphEdge {
		GraphEdge {
			source: source.into(),
			target: target.into(),
			value,
		}
	}

	#[derive(Default)]
	struct EngineLog {
		options: Vec<(EngineOption, bool)>,
		resizes: usize,
		disposes: usize,
	}

	#[derive(Clone, Default)]
	struct MockEngine {
		log: Rc<RefCell<EngineLog>>,
	}

	impl GraphEngine for MockEngine {
		fn set_option(&self, option: &EngineOption, full_replace: bool) {
			self.log.borrow_mut().options.push((option.clone(), full_replace));
		}

		fn on_node_click(&self, _handler: Box<dyn Fn(String)>) {}

		fn on_roam_zoom(&self, _handler: Box<dyn Fn(f64)>) {}

		fn resize(&self) {
			self.log.borrow_mut().resizes += 1;
		}

		fn dispose(&self) {
			self.log.borrow_mut().disposes += 1;
		}
	}

	#[test]
	fn test_single_node_option_shape() {
		let nodes = vec![node("a", "Song A", "Artist A")];
		let option = graph_option(&nodes, &[], 0.3);
		let series = &option.series[0];
		assert_eq!(series.data.as_ref().unwrap().len(), 1);
		assert_eq!(series.links.as_ref().unwrap().len(), 0);
		assert_eq!(series.zoom, Some(0.3));
	}

	#[test]
	fn test_node_descriptor_carries_tooltip_payload() {
		let nodes = vec![node("a", "Song A", "Artist A")];
		let option = graph_option(&nodes, &[], 1.0);
		let descriptor = &option.series[0].data.as_ref().unwrap()[0];
		assert_eq!(descriptor.name, "Song A");
		assert_eq!(descriptor.value, "Artist A");
		assert_eq!((descriptor.x, descriptor.y), (100.0, 200.0));
	}

	#[test]
	fn test_edge_width_capped() {
		let nodes = vec![node("a", "A", ""), node("b", "B", "")];
		let edges = vec![edge("a", "b", 9.0), edge("b", "a", 2.0)];
		let option = graph_option(&nodes, &edges, 1.0);
		let links = option.series[0].links.as_ref().unwrap();
		assert_eq!(links[0].line_style.width, 5.0);
		assert_eq!(links[1].line_style.width, 2.0);
		assert!(links.iter().all(|l| l.line_style.curveness == 0.2));
	}

	#[test]
	fn test_option_building_is_idempotent() {
		let nodes = vec![node("a", "Song A", "Artist A")];
		let edges = vec![edge("a", "a", 1.0)];
		assert_eq!(graph_option(&nodes, &edges, 0.5), graph_option(&nodes, &edges, 0.5));
	}

	#[test]
	fn test_zoom_patch_is_partial() {
		let patch = zoom_patch(0.6);
		assert_eq!(patch.background_color, None);
		assert_eq!(patch.tooltip, None);
		assert_eq!(patch.series.len(), 1);
		assert_eq!(patch.series[0].zoom, Some(0.6));
		assert_eq!(patch.series[0].data, None);
		assert_eq!(patch.series[0].kind, None);
	}

	#[test]
	fn test_render_creates_handle_once() {
		let mut binding = ViewportBinding::new();
		let engine = MockEngine::default();
		let created = Rc::new(RefCell::new(0));
		let nodes = vec![node("a", "A", "")];

		for _ in 0..3 {
			let engine = engine.clone();
			let created = created.clone();
			let applied = binding.render(
				move || {
					*created.borrow_mut() += 1;
					Some(engine)
				},
				&nodes,
				&[],
				0.3,
			);
			assert!(applied);
		}

		assert_eq!(*created.borrow(), 1);
		assert_eq!(engine.log.borrow().options.len(), 3);
	}

	#[test]
	fn test_render_without_surface_is_noop() {
		let mut binding = ViewportBinding::<MockEngine>::new();
		let applied = binding.render(|| None, &[], &[], 0.3);
		assert!(!applied);
		assert!(!binding.is_live());
	}

	#[test]
	fn test_renders_are_full_replace() {
		let mut binding = ViewportBinding::new();
		let engine = MockEngine::default();
		let first = vec![node("a", "A", ""), node("b", "B", "")];
		let second = vec![node("c", "C", "")];

		binding.render({ let engine = engine.clone(); move || Some(engine) }, &first, &[], 0.3);
		binding.render(|| None, &second, &[], 0.3);

		let log = engine.log.borrow();
		assert!(log.options.iter().all(|(_, full_replace)| *full_replace));
		let last = log.options.last().unwrap().0.series[0].data.as_ref().unwrap().clone();
		assert_eq!(last.len(), 1);
		assert!(last.iter().all(|n| n.id != "a" && n.id != "b"));
	}

	#[test]
	fn test_push_zoom_is_partial_update() {
		let mut binding = ViewportBinding::new();
		let engine = MockEngine::default();
		binding.render({ let engine = engine.clone(); move || Some(engine) }, &[], &[], 0.3);
		binding.push_zoom(0.36);

		let log = engine.log.borrow();
		let (option, full_replace) = log.options.last().unwrap();
		assert!(!full_replace);
		assert_eq!(option.series[0].zoom, Some(0.36));
	}

	#[test]
	fn test_dispose_is_idempotent() {
		let mut binding = ViewportBinding::new();
		let engine = MockEngine::default();
		binding.render({ let engine = engine.clone(); move || Some(engine) }, &[], &[], 0.3);
		binding.dispose();
		binding.dispose();
		assert_eq!(engine.log.borrow().disposes, 1);
		assert!(!binding.is_live());
	}

	#[test]
	fn test_render_after_dispose_recreates_fresh_handle() {
		let mut binding = ViewportBinding::new();
		let first = MockEngine::default();
		let second = MockEngine::default();

		binding.render({ let first = first.clone(); move || Some(first) }, &[], &[], 0.3);
		binding.dispose();

		// calls between dispose and the next render go nowhere
		binding.push_zoom(0.6);
		binding.resize();
		assert_eq!(first.log.borrow().resizes, 0);

		binding.render({ let second = second.clone(); move || Some(second) }, &[], &[], 0.3);
		binding.resize();

		assert_eq!(first.log.borrow().options.len(), 1);
		assert_eq!(second.log.borrow().options.len(), 1);
		assert_eq!(second.log.borrow().resizes, 1);
	}
}
