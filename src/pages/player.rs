//! Graph player screen hosting the interactive viewport.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::graph_viewport::GraphViewport;
use crate::components::navbar::Navbar;

/// Wraps [`GraphViewport`] for the `/player/:id` route.
///
/// The viewport is re-created whenever the id parameter changes, so a
/// different graph gets fresh mount-and-teardown semantics instead of an
/// in-place update.
#[component]
pub fn Player() -> impl IntoView {
	let params = use_params_map();

	let viewport = move || {
		params
			.read()
			.get("id")
			.and_then(|id| id.parse::<i64>().ok())
			.map(|id| view! { <GraphViewport graph_id=id /> })
	};

	view! {
		<div class="page">
			<Navbar />
			{viewport}
		</div>
	}
}
