//! View identifiers and view readiness.
//!
//! The router never renders anything. Each route record carries an opaque
//! [`ViewId`] that the UI layer maps to its own components. Before the
//! resolve guards run, the router asks a [`ViewLoader`] to make the target's
//! views ready, which is where lazily loaded components are fetched.

use crate::resolved::ResolvedRoute;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque identifier of the UI payload rendered for a route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(Cow<'static, str>);

impl ViewId {
	/// Creates a view id from a static string.
	pub const fn new(id: &'static str) -> Self {
		Self(Cow::Borrowed(id))
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&'static str> for ViewId {
	fn from(id: &'static str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ViewId {
	fn from(id: String) -> Self {
		Self(Cow::Owned(id))
	}
}

impl fmt::Display for ViewId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Makes the views of a navigation target ready before it is committed.
#[async_trait(?Send)]
pub trait ViewLoader {
	/// Loads every view the resolved route needs.
	///
	/// # Errors
	///
	/// Returns a human-readable reason when a view cannot be loaded; the
	/// navigation is then aborted and the current route is kept.
	async fn load(&self, route: &ResolvedRoute) -> Result<(), String>;
}

/// A [`ViewLoader`] for views that are always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadyViews;

#[async_trait(?Send)]
impl ViewLoader for ReadyViews {
	async fn load(&self, _route: &ResolvedRoute) -> Result<(), String> {
		Ok(())
	}
}
