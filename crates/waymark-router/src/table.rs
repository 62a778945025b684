//! The route table.
//!
//! Route records live in an arena indexed by [`RouteId`]. Nesting is expressed
//! with id lists (`children`) and a `parent` id, so records never point at each
//! other directly. Records are registered from [`RouteDescriptor`]s, which is
//! also the shape used by declarative route files:
//!
//! ```toml
//! [[routes]]
//! path = "/"
//! name = "/"
//! redirect = "/dashboard-default"
//!
//! [[routes]]
//! path = "/dashboard-default"
//! name = "Dashboard"
//! view = "dashboard"
//! ```
//!
//! Matching walks root records in registration order and the first record that
//! matches wins.

use crate::error::{NavigationError, NavigationResult, RegistrationError, RegistrationResult};
use crate::location::RouteLocation;
use crate::pattern::{RoutePattern, decode_segments};
use crate::view::ViewId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Identifier of a record in the route table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(usize);

impl RouteId {
	/// Returns the arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for RouteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Declarative description of a route, as supplied by application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
	/// Path pattern, relative to the parent for nested routes.
	pub path: String,
	/// Optional unique route name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// View rendered for this route.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub view: Option<ViewId>,
	/// Redirect target; makes the record an alias when no view is set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect: Option<RouteLocation>,
	/// Nested routes matched against the remainder of the path.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
	/// Creates a descriptor for the given path pattern.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Sets the route name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the view.
	pub fn with_view(mut self, view: impl Into<ViewId>) -> Self {
		self.view = Some(view.into());
		self
	}

	/// Sets the redirect target.
	pub fn redirect_to(mut self, target: impl Into<RouteLocation>) -> Self {
		self.redirect = Some(target.into());
		self
	}

	/// Appends a nested route.
	pub fn with_child(mut self, child: RouteDescriptor) -> Self {
		self.children.push(child);
		self
	}

	fn label(&self) -> String {
		self.name.clone().unwrap_or_else(|| self.path.clone())
	}
}

/// A registered route record.
#[derive(Debug, Clone)]
pub struct RouteRecord {
	id: RouteId,
	pattern: RoutePattern,
	full_pattern: RoutePattern,
	name: Option<String>,
	view: Option<ViewId>,
	redirect: Option<RouteLocation>,
	parent: Option<RouteId>,
	children: Vec<RouteId>,
}

impl RouteRecord {
	/// Returns the record id.
	pub fn id(&self) -> RouteId {
		self.id
	}

	/// Returns the pattern relative to the parent record.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the absolute pattern including every ancestor.
	pub fn full_pattern(&self) -> &RoutePattern {
		&self.full_pattern
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the view.
	pub fn view(&self) -> Option<&ViewId> {
		self.view.as_ref()
	}

	/// Returns the redirect target.
	pub fn redirect(&self) -> Option<&RouteLocation> {
		self.redirect.as_ref()
	}

	/// Returns the parent record id.
	pub fn parent(&self) -> Option<RouteId> {
		self.parent
	}

	/// Returns the child record ids in registration order.
	pub fn children(&self) -> &[RouteId] {
		&self.children
	}

	/// Returns whether a navigation can end on this record.
	fn is_terminal(&self) -> bool {
		self.view.is_some() || self.redirect.is_some()
	}
}

impl PartialEq for RouteRecord {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && self.full_pattern == other.full_pattern
	}
}

impl Eq for RouteRecord {}

/// A record matched against a path, with its ancestors and bound parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
	/// The matched leaf record.
	pub record: Arc<RouteRecord>,
	/// Every matched record from the root to the leaf.
	pub matched: Vec<Arc<RouteRecord>>,
	/// Parameters bound along the chain.
	pub params: BTreeMap<String, String>,
}

/// Ordered collection of route records.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
	/// Arena of records; removed records leave a hole so ids stay stable.
	records: Vec<Option<Arc<RouteRecord>>>,
	/// Top-level records in registration order.
	roots: Vec<RouteId>,
	/// Named records for lookups.
	names: HashMap<String, RouteId>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a table from descriptors, registering them in order.
	pub fn from_descriptors(
		descriptors: impl IntoIterator<Item = RouteDescriptor>,
	) -> RegistrationResult<Self> {
		let mut table = Self::new();
		for descriptor in descriptors {
			table.register(descriptor)?;
		}
		Ok(table)
	}

	/// Registers a top-level route and its children.
	///
	/// Nothing is inserted unless the whole descriptor tree is valid.
	///
	/// # Errors
	///
	/// Returns [`RegistrationError::InvalidPattern`] for malformed patterns,
	/// [`RegistrationError::DuplicateName`] on a name collision and
	/// [`RegistrationError::EmptyRecord`] for records with nothing to route to.
	pub fn register(&mut self, descriptor: RouteDescriptor) -> RegistrationResult<RouteId> {
		self.validate(&descriptor, None)?;
		let id = self.insert(descriptor, None)?;
		self.roots.push(id);
		Ok(id)
	}

	/// Registers a route nested under the named parent.
	///
	/// # Errors
	///
	/// Returns [`RegistrationError::UnknownRoute`] if the parent is not
	/// registered, plus every error [`RouteTable::register`] can return.
	pub fn register_child(
		&mut self,
		parent: &str,
		descriptor: RouteDescriptor,
	) -> RegistrationResult<RouteId> {
		let parent_id = *self
			.names
			.get(parent)
			.ok_or_else(|| RegistrationError::UnknownRoute(parent.to_string()))?;
		let parent_pattern = self.record(parent_id)?.full_pattern.clone();

		self.validate(&descriptor, Some(&parent_pattern))?;
		let id = self.insert(descriptor, Some(parent_id))?;

		if let Some(Some(parent)) = self.records.get_mut(parent_id.0) {
			Arc::make_mut(parent).children.push(id);
		}
		Ok(id)
	}

	fn record(&self, id: RouteId) -> RegistrationResult<&Arc<RouteRecord>> {
		self.get(id)
			.ok_or_else(|| RegistrationError::UnknownRoute(id.to_string()))
	}

	fn validate(
		&self,
		descriptor: &RouteDescriptor,
		parent: Option<&RoutePattern>,
	) -> RegistrationResult<()> {
		let mut names = HashSet::new();
		self.validate_tree(descriptor, parent, &mut names)
	}

	fn validate_tree(
		&self,
		descriptor: &RouteDescriptor,
		parent: Option<&RoutePattern>,
		names: &mut HashSet<String>,
	) -> RegistrationResult<()> {
		let pattern = RoutePattern::compile(&descriptor.path)?;
		let full = match parent {
			Some(parent) => parent.join(&pattern)?,
			None => pattern,
		};

		if descriptor.view.is_none() && descriptor.redirect.is_none() && descriptor.children.is_empty() {
			return Err(RegistrationError::EmptyRecord(descriptor.label()));
		}

		if let Some(name) = &descriptor.name {
			if self.names.contains_key(name) || !names.insert(name.clone()) {
				return Err(RegistrationError::DuplicateName(name.clone()));
			}
		}

		for child in &descriptor.children {
			self.validate_tree(child, Some(&full), names)?;
		}
		Ok(())
	}

	/// Inserts a descriptor tree that has already passed validation.
	fn insert(
		&mut self,
		descriptor: RouteDescriptor,
		parent: Option<RouteId>,
	) -> RegistrationResult<RouteId> {
		let RouteDescriptor {
			path,
			name,
			view,
			redirect,
			children,
		} = descriptor;

		let id = RouteId(self.records.len());
		let pattern = RoutePattern::compile(&path)?;
		let full_pattern = match parent.and_then(|p| self.get(p)) {
			Some(parent) => parent.full_pattern.join(&pattern)?,
			None => pattern.clone(),
		};

		tracing::debug!(route = %id, name = ?name, pattern = %full_pattern, "registering route");
		if let Some(name) = &name {
			self.names.insert(name.clone(), id);
		}
		self.records.push(Some(Arc::new(RouteRecord {
			id,
			pattern,
			full_pattern,
			name,
			view,
			redirect,
			parent,
			children: Vec::new(),
		})));

		let mut child_ids = Vec::with_capacity(children.len());
		for child in children {
			child_ids.push(self.insert(child, Some(id))?);
		}
		if let Some(Some(record)) = self.records.get_mut(id.0) {
			Arc::make_mut(record).children = child_ids;
		}
		Ok(id)
	}

	/// Removes a named route and all of its descendants.
	///
	/// Returns whether a route was removed.
	pub fn remove_route(&mut self, name: &str) -> bool {
		let Some(id) = self.names.get(name).copied() else {
			return false;
		};

		let parent = self.get(id).and_then(|r| r.parent);
		match parent {
			Some(parent) => {
				if let Some(Some(record)) = self.records.get_mut(parent.0) {
					Arc::make_mut(record).children.retain(|c| *c != id);
				}
			}
			None => self.roots.retain(|r| *r != id),
		}

		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			if let Some(record) = self.records.get_mut(current.0).and_then(Option::take) {
				if let Some(name) = record.name() {
					self.names.remove(name);
				}
				stack.extend(record.children.iter().copied());
			}
		}
		true
	}

	/// Returns the record with the given id.
	pub fn get(&self, id: RouteId) -> Option<&Arc<RouteRecord>> {
		self.records.get(id.0).and_then(Option::as_ref)
	}

	/// Looks up a record by name.
	pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<RouteRecord>> {
		self.names.get(name).and_then(|id| self.get(*id))
	}

	/// Looks up a record by path. Alias of [`RouteTable::match_path`].
	pub fn lookup_by_path(&self, path: &str) -> Option<RouteMatch> {
		self.match_path(path)
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.names.contains_key(name)
	}

	/// Returns the number of registered records, nested ones included.
	pub fn len(&self) -> usize {
		self.records.iter().flatten().count()
	}

	/// Returns whether no records are registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterates over the records in arena order.
	pub fn records(&self) -> impl Iterator<Item = &Arc<RouteRecord>> {
		self.records.iter().flatten()
	}

	/// Matches a path against the table.
	///
	/// Any query string or hash is ignored, and the path is normalized first.
	/// Segments are percent-decoded before comparison, literals included, so
	/// `/bil%6Cing` matches a `/billing` record.
	pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
		let path = path.split(['?', '#']).next().unwrap_or_default();
		let segments = decode_segments(path);

		self.roots
			.iter()
			.find_map(|id| self.match_record(*id, &segments, Vec::new()))
	}

	fn match_record(
		&self,
		id: RouteId,
		remaining: &[String],
		mut params: Vec<(String, String)>,
	) -> Option<RouteMatch> {
		let record = self.get(id)?;
		let prefix = record.pattern.match_prefix(remaining)?;
		params.extend(prefix.params);
		let rest = &remaining[prefix.consumed..];

		for child in &record.children {
			if let Some(mut found) = self.match_record(*child, rest, params.clone()) {
				found.matched.insert(0, Arc::clone(record));
				return Some(found);
			}
		}

		(rest.is_empty() && record.is_terminal()).then(|| RouteMatch {
			record: Arc::clone(record),
			matched: vec![Arc::clone(record)],
			params: params.into_iter().collect(),
		})
	}

	/// Generates a path for a named route.
	///
	/// # Errors
	///
	/// Returns [`NavigationError::UnknownRouteName`] or
	/// [`NavigationError::MissingParameter`].
	pub fn reverse(&self, name: &str, params: &BTreeMap<String, String>) -> NavigationResult<String> {
		let record = self
			.lookup_by_name(name)
			.ok_or_else(|| NavigationError::UnknownRouteName(name.to_string()))?;

		record
			.full_pattern
			.reverse(params)
			.map_err(|param| NavigationError::MissingParameter {
				route: name.to_string(),
				param,
			})
	}
}
