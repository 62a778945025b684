//! History backends.
//!
//! The router never touches the platform history directly. It commits
//! resolved routes through a [`HistoryAdapter`] and listens for pop events
//! (back, forward, `go`) reported by it.
//!
//! Every entry carries a JSON state object in the platform history:
//!
//! ```json
//! { "fullPath": "/billing?tab=invoices", "stateToken": "5f0c3b0e-..." }
//! ```
//!
//! Two backends are provided:
//!
//! - [`MemoryHistory`]: an in-memory stack for native hosts and tests
//! - `BrowserHistory`: the `window.history` API (wasm32 with the `browser` feature)

mod memory;

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
mod browser;

pub use memory::MemoryHistory;

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
pub use browser::BrowserHistory;

use crate::error::HistoryError;
use crate::pattern::normalize_path;
use crate::resolved::ResolvedRoute;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Opaque token identifying one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateToken(Uuid);

impl StateToken {
	/// Generates a fresh random token.
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	/// Returns the underlying UUID.
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for StateToken {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for StateToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

/// State stored with each platform history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
	/// Full path of the committed route, without the base path.
	pub full_path: String,
	/// Token identifying the entry.
	pub state_token: StateToken,
}

impl HistoryEntry {
	/// Creates an entry with a fresh token.
	pub fn new(full_path: impl Into<String>) -> Self {
		Self {
			full_path: full_path.into(),
			state_token: StateToken::new(),
		}
	}

	/// Encodes the entry into its JSON wire format.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::InvalidState`] if serialization fails.
	pub fn to_json(&self) -> Result<String, HistoryError> {
		serde_json::to_string(self).map_err(|e| HistoryError::InvalidState(e.to_string()))
	}

	/// Decodes an entry from its JSON wire format.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::InvalidState`] if the JSON is malformed.
	pub fn from_json(json: &str) -> Result<Self, HistoryError> {
		serde_json::from_str(json).map_err(|e| HistoryError::InvalidState(e.to_string()))
	}
}

/// How a committed route is written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitMode {
	/// Adds a new entry after the current one, dropping forward entries.
	Push,
	/// Overwrites the current entry.
	Replace,
}

/// Callback invoked when the history cursor moves outside the router's control.
pub type PopStateHandler = Rc<dyn Fn(HistoryEntry)>;

/// Identifier of a registered pop listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Platform history seen by the router.
pub trait HistoryAdapter {
	/// Returns the current location, base path stripped.
	fn location(&self) -> String;

	/// Writes a resolved route to history.
	///
	/// # Errors
	///
	/// Returns [`HistoryError`] if the platform rejects the update.
	fn commit(&self, route: &ResolvedRoute, mode: CommitMode) -> Result<HistoryEntry, HistoryError>;

	/// Moves the cursor by `delta` entries.
	///
	/// Returns the entry moved to when the move completes synchronously, or
	/// `None` when nothing moved yet. Backends that move asynchronously report
	/// the move later through their pop listeners.
	fn go(&self, delta: isize) -> Option<HistoryEntry>;

	/// Registers a pop listener.
	fn on_pop_state(&self, handler: PopStateHandler) -> ListenerId;

	/// Removes a pop listener.
	fn remove_listener(&self, id: ListenerId);
}

/// Prefix every committed URL carries, such as `/admin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
	/// Normalizes a base path. `"/"` and `""` mean no prefix.
	pub fn new(base: &str) -> Self {
		let normalized = normalize_path(base);
		Self(if normalized == "/" { String::new() } else { normalized })
	}

	/// Returns the normalized prefix, empty for the root.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Prepends the base to a router path.
	pub fn apply(&self, full_path: &str) -> String {
		if self.0.is_empty() {
			return full_path.to_string();
		}
		match full_path {
			"" | "/" => format!("{}/", self.0),
			path if path.starts_with('?') || path.starts_with('#') => format!("{}/{}", self.0, path),
			path => format!("{}{}", self.0, path),
		}
	}

	/// Strips the base from a platform URL.
	///
	/// URLs outside the base are returned unchanged.
	pub fn strip(&self, url: &str) -> String {
		if self.0.is_empty() {
			return url.to_string();
		}
		match url.strip_prefix(&self.0) {
			Some("") => "/".to_string(),
			Some(rest) if rest.starts_with('/') => rest.to_string(),
			Some(rest) if rest.starts_with('?') || rest.starts_with('#') => format!("/{}", rest),
			_ => {
				tracing::debug!(url, base = %self.0, "location outside of base path");
				url.to_string()
			}
		}
	}
}

impl Default for BasePath {
	fn default() -> Self {
		Self::new("/")
	}
}
