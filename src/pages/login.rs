//! Sign-in and registration screen.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use serde::Deserialize;

use crate::api;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct LoginResponse {
	token: String,
	username: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AuthTab {
	Login,
	Register,
}

/// Combined login/register form. A successful login persists the session
/// and navigates to the graph library.
#[component]
pub fn Login() -> impl IntoView {
	let session = Session::expect();
	let navigate = use_navigate();

	let tab = RwSignal::new(AuthTab::Login);
	let username = RwSignal::new(String::new());
	let password = RwSignal::new(String::new());
	let notice = RwSignal::new(None::<String>);
	let busy = RwSignal::new(false);

	let submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let user = username.get_untracked().trim().to_owned();
		let pass = password.get_untracked().trim().to_owned();
		if user.is_empty() || pass.is_empty() {
			notice.set(Some("Username and password must not be empty".into()));
			return;
		}
		busy.set(true);
		notice.set(None);
		let navigate = navigate.clone();
		spawn_local(async move {
			let query = [("username", user.as_str()), ("password", pass.as_str())];
			match tab.get_untracked() {
				AuthTab::Login => match api::post_json::<LoginResponse>("/auth/login", &query).await {
					Ok(response) => {
						session.login(&response.username, &response.token);
						navigate("/", Default::default());
					}
					Err(err) => notice.set(Some(err.to_string())),
				},
				AuthTab::Register => match api::post_empty("/auth/register", &query).await {
					Ok(()) => {
						tab.set(AuthTab::Login);
						notice.set(Some("Account created, please sign in".into()));
					}
					Err(err) => notice.set(Some(err.to_string())),
				},
			}
			busy.set(false);
		});
	};

	view! {
		<div class="page page-centered">
			<div class="auth-card">
				<div class="auth-brand">
					<h1>"MusicGraph"</h1>
					<p>"Explore the shape of your music"</p>
				</div>

				<div class="auth-tabs">
					<button
						class:active=move || tab.get() == AuthTab::Login
						on:click=move |_| tab.set(AuthTab::Login)
					>
						"Sign in"
					</button>
					<button
						class:active=move || tab.get() == AuthTab::Register
						on:click=move |_| tab.set(AuthTab::Register)
					>
						"Register"
					</button>
				</div>

				<form on:submit=submit>
					<input
						type="text"
						placeholder="Username"
						prop:value=move || username.get()
						on:input=move |ev| username.set(event_target_value(&ev))
					/>
					<input
						type="password"
						placeholder="Password"
						prop:value=move || password.get()
						on:input=move |ev| password.set(event_target_value(&ev))
					/>

					{move || notice.get().map(|text| view! { <p class="auth-notice">{text}</p> })}

					<button type="submit" disabled=move || busy.get()>
						{move || {
							if busy.get() {
								"Working…"
							} else if tab.get() == AuthTab::Login {
								"Sign in"
							} else {
								"Create account"
							}
						}}
					</button>
				</form>
			</div>
		</div>
	}
}
