//! Navigation targets.
//!
//! A [`RouteLocation`] is what callers hand to the router: either a raw path
//! (optionally carrying `?query` and `#hash`) or a reference to a named route
//! plus its parameters. Locations are ephemeral and built per navigation call.

use crate::pattern::canonical_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A navigation target.
///
/// In declarative route tables a redirect is written either as a plain string
/// or as a table with a `name` key:
///
/// ```toml
/// redirect = "/dashboard-default"
/// # or
/// redirect = { name = "Dashboard" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteLocation {
	/// A raw path, possibly with a query string and hash.
	Path(String),
	/// A named route with parameter values.
	Named {
		/// Route name.
		name: String,
		/// Parameter values by name.
		#[serde(default)]
		params: BTreeMap<String, String>,
		/// Query parameters.
		#[serde(default)]
		query: BTreeMap<String, String>,
		/// Hash fragment without the leading `#`.
		#[serde(default)]
		hash: Option<String>,
	},
}

impl RouteLocation {
	/// Creates a path location.
	pub fn path(path: impl Into<String>) -> Self {
		Self::Path(path.into())
	}

	/// Creates a named location with no parameters.
	pub fn named(name: impl Into<String>) -> Self {
		Self::Named {
			name: name.into(),
			params: BTreeMap::new(),
			query: BTreeMap::new(),
			hash: None,
		}
	}

	/// Adds a parameter to a named location. Path locations are returned unchanged.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		if let Self::Named { params, .. } = &mut self {
			params.insert(key.into(), value.into());
		}
		self
	}

	/// Adds a query parameter to a named location. Path locations are returned unchanged.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		if let Self::Named { query, .. } = &mut self {
			query.insert(key.into(), value.into());
		}
		self
	}

	/// Sets the hash of a named location. Path locations are returned unchanged.
	pub fn with_hash(mut self, value: impl Into<String>) -> Self {
		if let Self::Named { hash, .. } = &mut self {
			*hash = Some(value.into());
		}
		self
	}

	/// Returns whether the location carries its own query or hash.
	pub(crate) fn has_query_or_hash(&self) -> bool {
		match self {
			Self::Path(raw) => raw.contains('?') || raw.contains('#'),
			Self::Named { query, hash, .. } => !query.is_empty() || hash.is_some(),
		}
	}
}

impl From<&str> for RouteLocation {
	fn from(path: &str) -> Self {
		Self::Path(path.to_string())
	}
}

impl From<String> for RouteLocation {
	fn from(path: String) -> Self {
		Self::Path(path)
	}
}

impl From<&String> for RouteLocation {
	fn from(path: &String) -> Self {
		Self::Path(path.clone())
	}
}

impl fmt::Display for RouteLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path(path) => write!(f, "{}", path),
			Self::Named { name, params, .. } if params.is_empty() => write!(f, "<{}>", name),
			Self::Named { name, params, .. } => {
				let params: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
				write!(f, "<{} {}>", name, params.join(","))
			}
		}
	}
}

/// A path split into its normalized path, query and hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedPath {
	pub path: String,
	pub query: BTreeMap<String, String>,
	pub hash: Option<String>,
}

impl ParsedPath {
	/// Splits a raw location string.
	///
	/// The path part is canonicalized; a query that fails to parse is dropped.
	pub fn parse(raw: &str) -> Self {
		let (rest, hash) = match raw.split_once('#') {
			Some((rest, hash)) => (rest, Some(hash.to_string()).filter(|h| !h.is_empty())),
			None => (raw, None),
		};
		let (path, query) = match rest.split_once('?') {
			Some((path, query)) => (path, parse_query(query)),
			None => (rest, BTreeMap::new()),
		};

		Self {
			path: canonical_path(path),
			query,
			hash,
		}
	}

	/// Renders the canonical full path.
	pub fn full_path(&self) -> String {
		build_full_path(&self.path, &self.query, self.hash.as_deref())
	}
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
	match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
		Ok(pairs) => pairs.into_iter().collect(),
		Err(e) => {
			tracing::debug!(query, error = %e, "dropping unparsable query string");
			BTreeMap::new()
		}
	}
}

/// Joins a normalized path with its query and hash.
pub(crate) fn build_full_path(
	path: &str,
	query: &BTreeMap<String, String>,
	hash: Option<&str>,
) -> String {
	let mut full = path.to_string();
	if !query.is_empty() {
		if let Ok(encoded) = serde_urlencoded::to_string(query) {
			full.push('?');
			full.push_str(&encoded);
		}
	}
	if let Some(hash) = hash {
		full.push('#');
		full.push_str(hash);
	}
	full
}
