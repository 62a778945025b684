//! In-memory history stack.

use super::{BasePath, CommitMode, HistoryAdapter, HistoryEntry, ListenerId, PopStateHandler};
use crate::error::HistoryError;
use crate::resolved::ResolvedRoute;
use std::cell::{Cell, RefCell};
use std::fmt;

/// History backend that keeps its entries in memory.
///
/// Used on native hosts and in tests. [`HistoryAdapter::go`] moves the cursor
/// synchronously and returns the new entry without notifying listeners;
/// [`MemoryHistory::traverse`] simulates a user pressing the back or forward
/// button and notifies them.
pub struct MemoryHistory {
	base: BasePath,
	entries: RefCell<Vec<HistoryEntry>>,
	cursor: Cell<usize>,
	listeners: RefCell<Vec<(ListenerId, PopStateHandler)>>,
	next_listener: Cell<u64>,
}

impl MemoryHistory {
	/// Creates a history with a single entry at `initial`.
	pub fn new(initial: &str) -> Self {
		Self::with_base("/", initial)
	}

	/// Creates a history whose URLs live under `base`.
	///
	/// `initial` is a router path without the base.
	pub fn with_base(base: &str, initial: &str) -> Self {
		Self {
			base: BasePath::new(base),
			entries: RefCell::new(vec![HistoryEntry::new(initial)]),
			cursor: Cell::new(0),
			listeners: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
		}
	}

	/// Returns a snapshot of every entry, oldest first.
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.entries.borrow().clone()
	}

	/// Returns the router paths of every entry, oldest first.
	pub fn paths(&self) -> Vec<String> {
		self.entries
			.borrow()
			.iter()
			.map(|e| e.full_path.clone())
			.collect()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns whether the stack is empty. A memory history always holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Returns the cursor position.
	pub fn index(&self) -> usize {
		self.cursor.get()
	}

	/// Returns the current entry.
	pub fn current(&self) -> Option<HistoryEntry> {
		self.entries.borrow().get(self.cursor.get()).cloned()
	}

	/// Returns the current platform URL, base path included.
	pub fn current_url(&self) -> String {
		self.base.apply(&self.location())
	}

	fn move_cursor(&self, delta: isize) -> Option<HistoryEntry> {
		let target = self.cursor.get().checked_add_signed(delta)?;
		let entry = self.entries.borrow().get(target).cloned()?;
		self.cursor.set(target);
		Some(entry)
	}

	/// Moves the cursor and notifies pop listeners, like a browser back or forward button.
	///
	/// Returns `None` without notifying anyone when `delta` leaves the stack.
	pub fn traverse(&self, delta: isize) -> Option<HistoryEntry> {
		let entry = self.move_cursor(delta)?;
		let listeners: Vec<PopStateHandler> =
			self.listeners.borrow().iter().map(|(_, h)| h.clone()).collect();
		for listener in listeners {
			listener(entry.clone());
		}
		Some(entry)
	}
}

impl HistoryAdapter for MemoryHistory {
	fn location(&self) -> String {
		self.current()
			.map(|e| e.full_path)
			.unwrap_or_else(|| "/".to_string())
	}

	fn commit(&self, route: &ResolvedRoute, mode: CommitMode) -> Result<HistoryEntry, HistoryError> {
		let entry = HistoryEntry::new(route.full_path());
		let mut entries = self.entries.borrow_mut();
		let cursor = self.cursor.get();

		match mode {
			CommitMode::Push => {
				entries.truncate(cursor + 1);
				entries.push(entry.clone());
				self.cursor.set(entries.len() - 1);
			}
			CommitMode::Replace => match entries.get_mut(cursor) {
				Some(current) => *current = entry.clone(),
				None => {
					return Err(HistoryError::InvalidState(format!(
						"cursor {} is outside of {} entries",
						cursor,
						entries.len()
					)));
				}
			},
		}

		tracing::trace!(url = %self.base.apply(&entry.full_path), ?mode, "history entry committed");
		Ok(entry)
	}

	fn go(&self, delta: isize) -> Option<HistoryEntry> {
		self.move_cursor(delta)
	}

	fn on_pop_state(&self, handler: PopStateHandler) -> ListenerId {
		let id = ListenerId(self.next_listener.get());
		self.next_listener.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, handler));
		id
	}

	fn remove_listener(&self, id: ListenerId) {
		self.listeners.borrow_mut().retain(|(l, _)| *l != id);
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("base", &self.base)
			.field("entries", &self.entries.borrow())
			.field("cursor", &self.cursor.get())
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resolver::Resolver;
	use crate::table::{RouteDescriptor, RouteTable};
	use crate::view::ViewId;
	use rstest::rstest;
	use std::rc::Rc;

	fn resolve(path: &str) -> ResolvedRoute {
		let table = RouteTable::from_descriptors([RouteDescriptor::new("/{page}").with_view(ViewId::new("page"))]).unwrap();
		Resolver::new(&table).resolve(&path.into()).unwrap()
	}

	#[rstest]
	fn test_push_truncates_forward_entries() {
		// Arrange
		let history = MemoryHistory::new("/a");
		history.commit(&resolve("/b"), CommitMode::Push).unwrap();
		history.commit(&resolve("/c"), CommitMode::Push).unwrap();
		assert_eq!(history.go(-2).map(|e| e.full_path), Some("/a".to_string()));

		// Act
		history.commit(&resolve("/d"), CommitMode::Push).unwrap();

		// Assert
		assert_eq!(history.paths(), vec!["/a", "/d"]);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_replace_overwrites_current_entry_with_new_token() {
		let history = MemoryHistory::new("/a");
		let before = history.current().unwrap();

		let entry = history.commit(&resolve("/b"), CommitMode::Replace).unwrap();

		assert_eq!(history.paths(), vec!["/b"]);
		assert_ne!(entry.state_token, before.state_token);
		assert_eq!(history.current(), Some(entry));
	}

	#[rstest]
	fn test_go_out_of_range_does_not_move() {
		let history = MemoryHistory::new("/a");
		assert!(history.go(-1).is_none());
		assert!(history.go(1).is_none());
		assert_eq!(history.index(), 0);
	}

	#[rstest]
	fn test_traverse_notifies_listeners_and_go_does_not() {
		let history = MemoryHistory::new("/a");
		history.commit(&resolve("/b"), CommitMode::Push).unwrap();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let id = history.on_pop_state(Rc::new(move |entry| sink.borrow_mut().push(entry.full_path)));

		history.go(-1);
		history.traverse(1);
		history.remove_listener(id);
		history.traverse(-1);

		assert_eq!(*seen.borrow(), vec!["/b".to_string()]);
	}

	#[rstest]
	fn test_base_path_is_applied_to_urls_only() {
		let history = MemoryHistory::with_base("/admin", "/");
		history.commit(&resolve("/billing"), CommitMode::Push).unwrap();

		assert_eq!(history.location(), "/billing");
		assert_eq!(history.current_url(), "/admin/billing");
	}
}
