//! The result of resolving a location against the route table.

use crate::table::{RouteId, RouteRecord};
use crate::view::ViewId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A fully resolved navigation target.
///
/// Produced by the resolver after redirects have been followed. The record
/// chain is shared with the route table, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
	pub(crate) record: Arc<RouteRecord>,
	pub(crate) matched: Vec<Arc<RouteRecord>>,
	pub(crate) params: BTreeMap<String, String>,
	pub(crate) query: BTreeMap<String, String>,
	pub(crate) hash: Option<String>,
	pub(crate) path: String,
	pub(crate) full_path: String,
	pub(crate) redirected_from: Option<String>,
}

impl ResolvedRoute {
	/// Returns the matched leaf record.
	pub fn record(&self) -> &RouteRecord {
		&self.record
	}

	/// Returns the id of the matched leaf record.
	pub fn route_id(&self) -> RouteId {
		self.record.id()
	}

	/// Returns the matched records from the outermost ancestor to the leaf.
	pub fn matched(&self) -> impl Iterator<Item = &RouteRecord> {
		self.matched.iter().map(AsRef::as_ref)
	}

	/// Returns the route name of the leaf record.
	pub fn name(&self) -> Option<&str> {
		self.record.name()
	}

	/// Returns the view of the leaf record.
	pub fn view(&self) -> Option<&ViewId> {
		self.record.view()
	}

	/// Returns the views along the matched chain, outermost first.
	pub fn views(&self) -> impl Iterator<Item = &ViewId> {
		self.matched.iter().filter_map(|r| r.view())
	}

	/// Returns all bound path parameters.
	pub fn params(&self) -> &BTreeMap<String, String> {
		&self.params
	}

	/// Returns a single path parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns the query parameters.
	pub fn query(&self) -> &BTreeMap<String, String> {
		&self.query
	}

	/// Returns the hash fragment without the leading `#`.
	pub fn hash(&self) -> Option<&str> {
		self.hash.as_deref()
	}

	/// Returns the canonical path without query or hash.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the canonical path including query and hash.
	pub fn full_path(&self) -> &str {
		&self.full_path
	}

	/// Returns the location originally requested when redirects were followed.
	pub fn redirected_from(&self) -> Option<&str> {
		self.redirected_from.as_deref()
	}

	/// Returns whether `id` is one of the matched records.
	pub fn contains(&self, id: RouteId) -> bool {
		self.matched.iter().any(|r| r.id() == id)
	}
}

impl PartialEq for ResolvedRoute {
	fn eq(&self, other: &Self) -> bool {
		self.record.id() == other.record.id()
			&& self.params == other.params
			&& self.full_path == other.full_path
	}
}

impl Eq for ResolvedRoute {}
