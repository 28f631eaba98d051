//! Graph library screen: list, create, and delete graphs.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use serde::Deserialize;

use crate::api;
use crate::components::navbar::Navbar;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphSummary {
	id: i64,
	name: String,
	#[serde(default)]
	updated_at: Option<String>,
	#[serde(default)]
	cover_color: Option<String>,
}

async fn fetch_graphs(graphs: RwSignal<Vec<GraphSummary>>) {
	match api::get_json::<Vec<GraphSummary>>("/graph/list").await {
		Ok(list) => graphs.set(list),
		Err(err) => log::error!("failed to load graph list: {err}"),
	}
}

/// The signed-in landing page listing the user's graphs.
#[component]
pub fn Home() -> impl IntoView {
	let session = Session::expect();
	let navigate = use_navigate();

	let graphs = RwSignal::new(Vec::<GraphSummary>::new());
	let show_create = RwSignal::new(false);
	let new_name = RwSignal::new(String::new());

	{
		let navigate = navigate.clone();
		Effect::new(move |_| {
			if !session.has_any_credential() {
				navigate("/login", Default::default());
				return;
			}
			spawn_local(fetch_graphs(graphs));
		});
	}

	let create_graph = {
		let navigate = navigate.clone();
		move |kind: &'static str| {
			let navigate = navigate.clone();
			spawn_local(async move {
				let name = new_name.get_untracked().trim().to_owned();
				let mut query = vec![("type", kind)];
				if !name.is_empty() {
					query.push(("name", name.as_str()));
				}
				match api::post_json::<GraphSummary>("/graph/create", &query).await {
					Ok(graph) => {
						show_create.set(false);
						new_name.set(String::new());
						navigate(&format!("/player/{}", graph.id), Default::default());
					}
					Err(err) => log::error!("failed to create graph: {err}"),
				}
			});
		}
	};

	let delete_graph = move |id: i64| {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message("Delete this graph? Its entry will be removed.").ok())
			.unwrap_or(false);
		if !confirmed {
			return;
		}
		spawn_local(async move {
			match api::delete(&format!("/graph/delete/{id}")).await {
				Ok(()) => fetch_graphs(graphs).await,
				Err(err) => log::error!("failed to delete graph {id}: {err}"),
			}
		});
	};

	let graph_cards = {
		let navigate = navigate.clone();
		move || {
			let navigate = navigate.clone();
			graphs
				.get()
				.into_iter()
				.map(|graph| {
					let navigate = navigate.clone();
					let cover = graph.cover_color.clone().unwrap_or_else(|| "#1db954".into());
					let updated = graph.updated_at.clone().unwrap_or_else(|| "just now".into());
					let id = graph.id;
					view! {
						<div
							class="graph-card"
							on:click=move |_| navigate(&format!("/player/{id}"), Default::default())
						>
							<div class="graph-card-cover" style=format!("background: {cover};")></div>
							<div class="graph-card-body">
								<h3>{graph.name.clone()}</h3>
								<p>"Updated " {updated}</p>
								<button
									class="icon-button"
									on:click=move |ev| {
										ev.stop_propagation();
										delete_graph(id);
									}
								>
									"✕"
								</button>
							</div>
						</div>
					}
				})
				.collect_view()
		}
	};

	view! {
		<div class="page">
			<Navbar />

			<main class="library">
				<div class="library-actions">
					<div class="action-card" on:click=move |_| show_create.set(true)>
						<h3>"Create a music graph"</h3>
						<p>"Start from scratch or from the template"</p>
					</div>
				</div>

				<div class="library-header">
					<h2>"My graphs"</h2>
					<span>{move || format!("{} projects", graphs.get().len())}</span>
				</div>

				{move || {
					graphs.get().is_empty().then(|| {
						view! { <p class="library-empty">"Nothing here yet, go create one"</p> }
					})
				}}
				<div class="graph-grid">{graph_cards}</div>
			</main>

			{move || {
				show_create.get().then(|| {
					let create_empty = create_graph.clone();
					let create_template = create_graph.clone();
					view! {
						<div class="modal-backdrop" on:click=move |_| show_create.set(false)>
							<div class="modal" on:click=|ev| ev.stop_propagation()>
								<h2>"Create a new graph"</h2>
								<input
									type="text"
									placeholder="Name your graph"
									maxlength="20"
									prop:value=move || new_name.get()
									on:input=move |ev| new_name.set(event_target_value(&ev))
								/>
								<div class="modal-choices">
									<button on:click=move |_| create_empty("empty")>"Empty graph"</button>
									<button on:click=move |_| create_template("template")>"Starter template"</button>
								</div>
							</div>
						</div>
					}
				})
			}}
		</div>
	}
}
