//! Client-side router core.
//!
//! This crate matches locations against a declarative route table, follows
//! redirects, runs a guard pipeline and keeps an in-memory navigation state in
//! sync with the platform history.
//!
//! ## Modules
//!
//! - [`pattern`]: route pattern compilation and segment matching
//! - [`table`]: the route table arena
//! - [`resolver`]: location resolution with bounded redirects
//! - [`guard`]: navigation guards and post-navigation hooks
//! - [`history`]: history backends (`MemoryHistory`, `BrowserHistory`)
//! - [`router`]: the [`Router`] façade
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use waymark_router::prelude::*;
//!
//! let table = RouteTable::from_descriptors([
//! 	RouteDescriptor::new("/users/{id}").with_name("User").with_view("user"),
//! ])
//! .unwrap();
//! let router = Router::new(table, Rc::new(MemoryHistory::new("/users/42")));
//!
//! // Register guards here, then run the initial navigation.
//! futures::executor::block_on(router.start()).unwrap();
//!
//! let current = router.current_route().unwrap();
//! assert_eq!(current.param("id"), Some("42"));
//! ```
//!
//! ## Features
//!
//! - `browser`: the `web-sys` History API backend and `Router::listen`
//!   (wasm32 only)

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod guard;
pub mod history;
pub mod location;
pub mod pattern;
pub mod resolved;
pub mod resolver;
pub mod router;
pub mod settings;
pub mod state;
pub mod table;
pub mod view;

pub use error::{
	HistoryError, HookError, NavigationError, NavigationResult, RegistrationError, RegistrationResult,
	SettingsError,
};
pub use guard::{
	Guard, GuardDecision, GuardHandle, NavigationContext, NavigationGuard, NavigationKind, async_guard_fn,
	guard_fn,
};
pub use history::{CommitMode, HistoryAdapter, HistoryEntry, MemoryHistory, StateToken};
pub use location::RouteLocation;
pub use pattern::RoutePattern;
pub use resolved::ResolvedRoute;
pub use resolver::Resolver;
pub use router::{NavigationOutcome, Router};
pub use settings::RouterSettings;
pub use state::{NavigationState, RouterPhase, Signal};
pub use table::{RouteDescriptor, RouteId, RouteRecord, RouteTable};
pub use view::{ReadyViews, ViewId, ViewLoader};

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
#[cfg_attr(docsrs, doc(cfg(feature = "browser")))]
pub use history::BrowserHistory;

/// Commonly used types.
pub mod prelude {
	pub use crate::error::{NavigationError, RegistrationError};
	pub use crate::guard::{GuardDecision, NavigationContext, NavigationGuard, async_guard_fn, guard_fn};
	pub use crate::history::{HistoryAdapter, MemoryHistory};
	pub use crate::location::RouteLocation;
	pub use crate::resolved::ResolvedRoute;
	pub use crate::router::{NavigationOutcome, Router};
	pub use crate::settings::RouterSettings;
	pub use crate::table::{RouteDescriptor, RouteTable};
	pub use crate::view::ViewId;

	#[cfg(all(target_arch = "wasm32", feature = "browser"))]
	pub use crate::history::BrowserHistory;
}
