//! Fetching graph payloads and seeding initial node positions.

use crate::api::{self, ApiError};

use super::types::{GraphData, GraphNode};

/// Extent of the synthetic canvas nodes are scattered over before the
/// force layout relaxes them. Seed bounds, not viewport pixels.
pub const SEED_EXTENT: (f64, f64) = (800.0, 600.0);

/// Fetch the graph payload for `id` and scatter seed positions over
/// [`SEED_EXTENT`].
pub async fn load_graph(id: i64) -> Result<GraphData, ApiError> {
	let mut data: GraphData = api::get_json(&format!("/graph/data/{id}")).await?;
	scatter(&mut data.nodes, || js_sys::Math::random());
	log::info!(
		"loaded graph {id}: {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}

/// Assign each node a uniform-random position within the seed extent.
///
/// The randomness source is injected so the scatter stays testable.
pub fn scatter(nodes: &mut [GraphNode], mut rand: impl FnMut() -> f64) {
	let (width, height) = SEED_EXTENT;
	for node in nodes {
		node.x = rand() * width;
		node.y = rand() * height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes(n: usize) -> Vec<GraphNode> {
		(0..n)
			.map(|i| GraphNode {
				id: i.to_string(),
				name: format!("Song {i}"),
				..GraphNode::default()
			})
			.collect()
	}

	#[test]
	fn test_scatter_stays_within_extent() {
		let mut nodes = nodes(50);
		// wobbly but deterministic sequence over [0, 1)
		let mut seed = 0.137_f64;
		scatter(&mut nodes, move || {
			seed = (seed * 9301.0 + 0.49297).fract();
			seed
		});
		for node in &nodes {
			assert!((0.0..SEED_EXTENT.0).contains(&node.x));
			assert!((0.0..SEED_EXTENT.1).contains(&node.y));
		}
	}

	#[test]
	fn test_scatter_maps_rng_onto_extent() {
		let mut nodes = nodes(1);
		scatter(&mut nodes, || 0.5);
		assert_eq!(nodes[0].x, 400.0);
		assert_eq!(nodes[0].y, 300.0);
	}
}
