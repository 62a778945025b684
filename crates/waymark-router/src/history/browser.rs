//! `window.history` backend.

use super::{BasePath, CommitMode, HistoryAdapter, HistoryEntry, ListenerId, PopStateHandler};
use crate::error::HistoryError;
use crate::resolved::ResolvedRoute;
use std::cell::{Cell, RefCell};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, PopStateEvent};

type PopClosure = Closure<dyn FnMut(Event)>;

/// History backend driving the browser History API.
///
/// Each entry stores its [`HistoryEntry`] as a JSON string in the platform
/// state. Pop listeners are attached to `window` and detached again by
/// [`HistoryAdapter::remove_listener`].
pub struct BrowserHistory {
	base: BasePath,
	listeners: RefCell<Vec<(ListenerId, PopClosure)>>,
	next_listener: Cell<u64>,
}

impl BrowserHistory {
	/// Creates a backend whose URLs live under `base`.
	pub fn new(base: &str) -> Self {
		Self {
			base: BasePath::new(base),
			listeners: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
		}
	}

	fn window() -> Result<web_sys::Window, HistoryError> {
		web_sys::window().ok_or_else(|| HistoryError::Platform("no window object".to_string()))
	}

	fn history() -> Result<web_sys::History, HistoryError> {
		Self::window()?.history().map_err(js_error)
	}

	/// Reads the platform URL (path, search and hash).
	fn platform_url() -> Option<String> {
		let location = web_sys::window()?.location();
		let path = location.pathname().ok()?;
		let search = location.search().unwrap_or_default();
		let hash = location.hash().unwrap_or_default();
		Some(format!("{}{}{}", path, search, hash))
	}
}

fn js_error(value: JsValue) -> HistoryError {
	HistoryError::Platform(format!("{:?}", value))
}

/// Decodes the entry attached to a pop event, falling back to the URL for
/// entries the router did not create.
fn entry_from_event(event: &Event, base: &BasePath) -> HistoryEntry {
	let state = event
		.dyn_ref::<PopStateEvent>()
		.and_then(|e| e.state().as_string());

	match state.as_deref().map(HistoryEntry::from_json) {
		Some(Ok(entry)) => entry,
		Some(Err(e)) => {
			tracing::debug!(error = %e, "ignoring foreign history state");
			HistoryEntry::new(base.strip(&BrowserHistory::platform_url().unwrap_or_default()))
		}
		None => HistoryEntry::new(base.strip(&BrowserHistory::platform_url().unwrap_or_default())),
	}
}

impl HistoryAdapter for BrowserHistory {
	fn location(&self) -> String {
		Self::platform_url()
			.map(|url| self.base.strip(&url))
			.unwrap_or_else(|| "/".to_string())
	}

	fn commit(&self, route: &ResolvedRoute, mode: CommitMode) -> Result<HistoryEntry, HistoryError> {
		let entry = HistoryEntry::new(route.full_path());
		let state = JsValue::from_str(&entry.to_json()?);
		let url = self.base.apply(&entry.full_path);
		let history = Self::history()?;

		match mode {
			CommitMode::Push => history.push_state_with_url(&state, "", Some(&url)),
			CommitMode::Replace => history.replace_state_with_url(&state, "", Some(&url)),
		}
		.map_err(js_error)?;

		tracing::trace!(%url, ?mode, "history entry committed");
		Ok(entry)
	}

	fn go(&self, delta: isize) -> Option<HistoryEntry> {
		// The browser moves asynchronously and reports the result as a popstate event.
		let delta = i32::try_from(delta).ok()?;
		if let Err(e) = Self::history().and_then(|h| h.go_with_delta(delta).map_err(js_error)) {
			tracing::warn!(error = %e, delta, "history traversal failed");
		}
		None
	}

	fn on_pop_state(&self, handler: PopStateHandler) -> ListenerId {
		let id = ListenerId(self.next_listener.get());
		self.next_listener.set(id.0 + 1);

		let base = self.base.clone();
		let closure = Closure::wrap(Box::new(move |event: Event| {
			handler(entry_from_event(&event, &base));
		}) as Box<dyn FnMut(Event)>);

		match Self::window() {
			Ok(window) => {
				if let Err(e) = window
					.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
				{
					tracing::warn!(error = %js_error(e), "failed to attach popstate listener");
				}
			}
			Err(e) => tracing::warn!(error = %e, "failed to attach popstate listener"),
		}

		self.listeners.borrow_mut().push((id, closure));
		id
	}

	fn remove_listener(&self, id: ListenerId) {
		let mut listeners = self.listeners.borrow_mut();
		let Some(position) = listeners.iter().position(|(l, _)| *l == id) else {
			return;
		};
		let (_, closure) = listeners.remove(position);
		if let Ok(window) = Self::window() {
			let _ = window
				.remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
		}
	}
}

impl Drop for BrowserHistory {
	fn drop(&mut self) {
		let ids: Vec<ListenerId> = self.listeners.borrow().iter().map(|(id, _)| *id).collect();
		for id in ids {
			self.remove_listener(id);
		}
	}
}
