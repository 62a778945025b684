//! Observable navigation state.
//!
//! The router publishes its state through a [`Signal`], a cheap-to-clone
//! handle sharing one value via `Rc<RefCell<T>>`. The view layer reads it
//! with [`Signal::get`] or [`Signal::with`] and re-renders from
//! [`Signal::subscribe`] callbacks.
//!
//! ```
//! use waymark_router::state::Signal;
//!
//! let count = Signal::new(0);
//! let seen = Signal::new(Vec::new());
//! let sink = seen.clone();
//! count.subscribe(move |n| sink.update(|v| v.push(*n)));
//!
//! count.set(1);
//! count.update(|n| *n += 1);
//! assert_eq!(seen.get(), vec![1, 2]);
//! ```

use crate::history::HistoryEntry;
use crate::resolved::ResolvedRoute;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Identifier of a signal subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A shared value that notifies subscribers when it changes.
///
/// `Signal<T>` implements `Clone`; all clones share the same value and the
/// same subscribers.
pub struct Signal<T: 'static> {
	value: Rc<RefCell<T>>,
	subscribers: Rc<RefCell<Vec<(SubscriptionId, Subscriber<T>)>>>,
	next_id: Rc<Cell<u64>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			value: Rc::clone(&self.value),
			subscribers: Rc::clone(&self.subscribers),
			next_id: Rc::clone(&self.next_id),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Creates a signal with the given initial value.
	pub fn new(value: T) -> Self {
		Self {
			value: Rc::new(RefCell::new(value)),
			subscribers: Rc::new(RefCell::new(Vec::new())),
			next_id: Rc::new(Cell::new(0)),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Reads the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}

	/// Replaces the value and notifies subscribers.
	///
	/// Subscribers receive a snapshot, so they may write to the signal again.
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.value.borrow_mut() = value;
		self.notify();
	}

	/// Mutates the value in place and notifies subscribers once.
	pub fn update<F>(&self, f: F)
	where
		T: Clone,
		F: FnOnce(&mut T),
	{
		f(&mut *self.value.borrow_mut());
		self.notify();
	}

	/// Registers a callback run after every change.
	pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		self.subscribers.borrow_mut().push((id, Rc::new(f)));
		id
	}

	/// Removes a subscription. Returns whether it existed.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(s, _)| *s != id);
		subscribers.len() != before
	}

	fn notify(&self)
	where
		T: Clone,
	{
		// No borrow is held while subscribers run.
		let subscribers: Vec<Subscriber<T>> =
			self.subscribers.borrow().iter().map(|(_, s)| Rc::clone(s)).collect();
		let value = self.get();
		for subscriber in subscribers {
			subscriber(&value);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &*self.value.borrow())
			.field("subscribers", &self.subscribers.borrow().len())
			.finish()
	}
}

/// Navigation state published by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
	/// The committed route, if any navigation has succeeded.
	pub current: Option<ResolvedRoute>,
	/// Sequence number of the navigation that produced `current`.
	pub sequence: u64,
	/// Set when the latest navigation matched no route; cleared on the next commit.
	pub unmatched: Option<String>,
	/// History entry of the committed route.
	pub entry: Option<HistoryEntry>,
}

impl NavigationState {
	/// Returns whether the latest navigation matched no route.
	pub fn is_unmatched(&self) -> bool {
		self.unmatched.is_some()
	}
}

/// Phase of the router's navigation state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouterPhase {
	/// No navigation in flight.
	#[default]
	Idle,
	/// The navigation with this sequence number is the latest one in flight.
	Navigating(u64),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_clones_share_value_and_subscribers() {
		// Arrange
		let signal = Signal::new(0);
		let clone = signal.clone();
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		signal.subscribe(move |_| counter.set(counter.get() + 1));

		// Act
		clone.set(5);

		// Assert
		assert_eq!(signal.get(), 5);
		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	fn test_subscriber_can_read_signal() {
		let signal = Signal::new(String::from("a"));
		let reader = signal.clone();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		signal.subscribe(move |value| sink.borrow_mut().push(format!("{}={}", value, reader.get())));

		signal.set("b".to_string());

		assert_eq!(*seen.borrow(), vec!["b=b".to_string()]);
	}

	#[rstest]
	fn test_subscriber_can_write_signal() {
		// Arrange
		let signal = Signal::new(0);
		let writer = signal.clone();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		signal.subscribe(move |value| {
			sink.borrow_mut().push(*value);
			if *value == 1 {
				writer.set(2);
			}
		});

		// Act
		signal.set(1);

		// Assert
		assert_eq!(signal.get(), 2);
		assert_eq!(*seen.borrow(), vec![1, 2]);
	}

	#[rstest]
	fn test_unsubscribe() {
		let signal = Signal::new(0);
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let id = signal.subscribe(move |_| counter.set(counter.get() + 1));

		assert!(signal.unsubscribe(id));
		assert!(!signal.unsubscribe(id));
		signal.update(|n| *n += 1);

		assert_eq!(calls.get(), 0);
		assert_eq!(signal.with(|n| *n), 1);
	}
}
