//! Client-side session state shared by every screen.
//!
//! The in-memory flag and the persisted marker/token can disagree briefly
//! (right after a reload, before any screen has refreshed the signals), so
//! auth gates consult all three sources through
//! [`Session::has_any_credential`] instead of trusting one of them.

use leptos::prelude::*;
use web_sys::Storage;

const TOKEN_KEY: &str = "token";
const USERNAME_KEY: &str = "username";
const LOGIN_FLAG_KEY: &str = "isLoggedIn";

/// Reactive session state provided once at the app root.
#[derive(Clone, Copy)]
pub struct Session {
	logged_in: RwSignal<bool>,
	username: RwSignal<String>,
}

impl Session {
	/// Install the session context, hydrated from local storage.
	pub fn provide() {
		provide_context(Session {
			logged_in: RwSignal::new(stored_login_flag()),
			username: RwSignal::new(stored_username().unwrap_or_default()),
		});
	}

	/// Fetch the session installed by [`Session::provide`].
	pub fn expect() -> Self {
		expect_context()
	}

	/// In-memory login state.
	pub fn is_logged_in(&self) -> bool {
		self.logged_in.get()
	}

	/// Display name of the signed-in user.
	pub fn username(&self) -> String {
		self.username.get()
	}

	/// Tri-source auth gate: in-memory flag, persisted token, persisted
	/// login marker. Only when all three are absent is the user treated as
	/// logged out.
	pub fn has_any_credential(&self) -> bool {
		self.logged_in.get() || stored_token().is_some() || stored_login_flag()
	}

	/// Record a successful login in memory and local storage.
	pub fn login(&self, username: &str, token: &str) {
		with_storage(|storage| {
			let _ = storage.set_item(TOKEN_KEY, token);
			let _ = storage.set_item(USERNAME_KEY, username);
			let _ = storage.set_item(LOGIN_FLAG_KEY, "true");
		});
		self.username.set(username.to_owned());
		self.logged_in.set(true);
	}

	/// Drop the session from memory and local storage.
	pub fn logout(&self) {
		clear_persisted();
		self.username.set(String::new());
		self.logged_in.set(false);
	}
}

/// Remove every persisted credential. Also used by the HTTP layer when
/// the server rejects the token.
pub fn clear_persisted() {
	with_storage(|storage| {
		let _ = storage.remove_item(TOKEN_KEY);
		let _ = storage.remove_item(USERNAME_KEY);
		let _ = storage.remove_item(LOGIN_FLAG_KEY);
	});
}

/// The persisted API token, if any.
pub fn stored_token() -> Option<String> {
	local_storage()?.get_item(TOKEN_KEY).ok()?
}

fn stored_username() -> Option<String> {
	local_storage()?.get_item(USERNAME_KEY).ok()?
}

fn stored_login_flag() -> bool {
	local_storage()
		.and_then(|storage| storage.get_item(LOGIN_FLAG_KEY).ok().flatten())
		.is_some_and(|value| value == "true")
}

fn local_storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok()?
}

fn with_storage(f: impl FnOnce(&Storage)) {
	if let Some(storage) = local_storage() {
		f(&storage);
	}
}
