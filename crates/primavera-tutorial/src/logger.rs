//! Request-scoped logger carrying per-request identity

use parking_lot::Mutex;
use uuid::Uuid;

/// One logger per request window.
///
/// Every instance mints its own id at construction, so log lines from
/// concurrent requests stay distinguishable without any caller plumbing.
pub struct RequestLogger {
	id: Uuid,
	request_url: Mutex<Option<String>>,
}

impl RequestLogger {
	pub fn new() -> Self {
		Self {
			id: Uuid::new_v4(),
			request_url: Mutex::new(None),
		}
	}

	/// Id minted for the window this logger belongs to.
	pub fn id(&self) -> Uuid {
		self.id
	}

	/// Attaches the URL being served, included in subsequent log lines.
	pub fn set_request_url(&self, url: impl Into<String>) {
		*self.request_url.lock() = Some(url.into());
	}

	pub fn request_url(&self) -> Option<String> {
		self.request_url.lock().clone()
	}

	pub fn log(&self, message: &str) {
		let url = self.request_url.lock().clone();
		tracing::info!(
			request = %self.id,
			url = url.as_deref().unwrap_or("-"),
			"{message}"
		);
	}

	pub(crate) fn created(&self) {
		tracing::info!(request = %self.id, "request logger created");
	}

	pub(crate) fn closed(&self) {
		tracing::info!(request = %self.id, "request logger closed");
	}
}

impl Default for RequestLogger {
	fn default() -> Self {
		Self::new()
	}
}
