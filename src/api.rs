//! HTTP plumbing for the MusicGraph backend.
//!
//! Every request is rooted at [`API_BASE`], carries the persisted token in
//! the `Authorization` header when one exists, and routes 401 responses
//! through a forced logout, mirroring the backend's session semantics.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::session;

/// Base path every request is rooted at; the host proxies this to the
/// backend.
pub const API_BASE: &str = "/api";

/// Failure of an API call, after the 401 handling has already run.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(#[from] gloo_net::Error),
	/// The server answered with a non-success status.
	#[error("server returned {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, if the server sent one.
		message: String,
	},
}

/// GET `path` and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
	let response = authorize(Request::get(&url(path))).send().await?;
	Ok(check(response).await?.json().await?)
}

/// POST `path` with `query` parameters and decode the JSON body.
pub async fn post_json<T: DeserializeOwned>(path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
	let request = authorize(Request::post(&url(path)).query(query.iter().copied()));
	let response = request.send().await?;
	Ok(check(response).await?.json().await?)
}

/// POST `path` with `query` parameters, ignoring the response body.
pub async fn post_empty(path: &str, query: &[(&str, &str)]) -> Result<(), ApiError> {
	let request = authorize(Request::post(&url(path)).query(query.iter().copied()));
	let response = request.send().await?;
	check(response).await?;
	Ok(())
}

/// DELETE `path`, ignoring the response body.
pub async fn delete(path: &str) -> Result<(), ApiError> {
	let response = authorize(Request::delete(&url(path))).send().await?;
	check(response).await?;
	Ok(())
}

fn url(path: &str) -> String {
	format!("{API_BASE}{path}")
}

fn authorize(request: RequestBuilder) -> RequestBuilder {
	match session::stored_token() {
		Some(token) => request.header("Authorization", &token),
		None => request,
	}
}

async fn check(response: Response) -> Result<Response, ApiError> {
	if response.ok() {
		return Ok(response);
	}
	let status = response.status();
	if status == 401 {
		// expired or invalid token: force a fresh login
		session::clear_persisted();
		redirect_to_login();
	}
	let message = response.text().await.unwrap_or_default();
	Err(ApiError::Status { status, message })
}

fn redirect_to_login() {
	if let Some(window) = web_sys::window() {
		let _ = window.location().set_href("/login");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_paths_root_at_api_base() {
		assert_eq!(url("/graph/data/7"), "/api/graph/data/7");
	}
}
