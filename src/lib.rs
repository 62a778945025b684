//! # Waymark
//!
//! A client-side router core for single-page dashboards.
//!
//! Waymark maps URL paths to named routes, runs navigation guards, and keeps
//! the browser history in sync with the current route. It renders nothing:
//! each route carries an opaque view id that the UI layer maps to its own
//! components.
//!
//! ## Feature Flags
//!
//! - `router` (default) - Route table, resolution, guards and history sync
//! - `admin` - Admin dashboard route table built on the router
//! - `browser` - `window.history` backend (wasm32 only)
//! - `full` - All of the above except `browser`
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use waymark::prelude::*;
//!
//! let table = RouteTable::from_descriptors([
//!     RouteDescriptor::new("/").redirect_to("/home"),
//!     RouteDescriptor::new("/home").with_name("Home").with_view("home"),
//!     RouteDescriptor::new("/users/{id}").with_name("User").with_view("user"),
//! ])?;
//!
//! let router = Rc::new(Router::new(table, Rc::new(MemoryHistory::new("/"))));
//!
//! let signed_in = false;
//! router.add_global_guard(guard_fn(move |ctx| {
//!     if signed_in || !ctx.to.path().starts_with("/users") {
//!         GuardDecision::Proceed
//!     } else {
//!         GuardDecision::redirect("/home")
//!     }
//! }));
//!
//! router.start().await?;
//! assert_eq!(router.current_route().unwrap().name(), Some("Home"));
//!
//! router.push("/users/42").await?;
//! ```

#[cfg(feature = "admin")]
pub mod admin;
#[cfg(feature = "router")]
pub mod router;

#[cfg(feature = "router")]
pub use waymark_router::{
	NavigationError, NavigationOutcome, RegistrationError, RouteDescriptor, RouteLocation,
	RouteTable, Router, RouterSettings,
};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "router")]
	pub use waymark_router::prelude::*;

	#[cfg(feature = "admin")]
	pub use waymark_admin::{DashboardView, dashboard_router, nav_links};
}
