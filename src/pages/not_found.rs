//! Router fallback for unknown paths.

use leptos::prelude::*;

/// 404 page.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="page page-centered">
			<h1>"Page not found"</h1>
			<a href="/">"Back to your graphs"</a>
		</div>
	}
}
