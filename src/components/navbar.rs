//! Top navigation bar with session controls.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::session::Session;

/// Brand header plus the signed-in user's welcome line and logout button.
#[component]
pub fn Navbar() -> impl IntoView {
	let session = Session::expect();
	let navigate = use_navigate();

	let logout = move |_: leptos::ev::MouseEvent| {
		session.logout();
		navigate("/login", Default::default());
	};

	view! {
		<nav class="navbar">
			<div class="navbar-brand">
				<h1>"MusicGraph"</h1>
				<span>"Explore the shape of your music"</span>
			</div>

			{move || {
				session.is_logged_in().then(|| {
					let logout = logout.clone();
					view! {
						<div class="navbar-user">
							<span>{format!("Welcome, {}", session.username())}</span>
							<button on:click=logout>"Log out"</button>
						</div>
					}
				})
			}}
		</nav>
	}
}
