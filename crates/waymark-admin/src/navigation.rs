//! Dashboard router and sidebar links.

use crate::error::AdminResult;
use crate::routes::dashboard_table;
use crate::views::DashboardView;
use std::rc::Rc;
use waymark_router::{HistoryAdapter, RouteLocation, Router, RouterSettings};

/// Class carried by the sidebar entry of the current page.
pub const ACTIVE_CLASS: &str = "active";

/// Settings used by the dashboard router.
pub fn dashboard_settings(base: &str) -> RouterSettings {
	RouterSettings::default()
		.with_base(base)
		.with_link_active_class(ACTIVE_CLASS)
		.with_link_exact_active_class("exact-active")
}

/// Builds the dashboard router on top of `history`, mounted at `base`.
///
/// Register guards on the returned router, then call [`Router::start`] to run
/// the initial navigation through them; `/` lands on the dashboard page.
///
/// # Errors
///
/// Returns [`AdminError`](crate::AdminError) if the route table or the
/// settings are invalid.
pub fn dashboard_router(history: Rc<dyn HistoryAdapter>, base: &str) -> AdminResult<Router> {
	let router = Router::with_settings(dashboard_table()?, history, dashboard_settings(base))?;
	tracing::info!(base, "dashboard router ready");
	Ok(router)
}

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
	/// Page the link leads to.
	pub view: DashboardView,
	/// Label shown in the sidebar.
	pub label: &'static str,
	/// Platform URL, base path included.
	pub href: String,
	/// CSS classes for the link; empty when inactive.
	pub class: String,
}

impl NavLink {
	/// Returns whether the link points at the current page.
	pub fn is_active(&self) -> bool {
		self.class.split(' ').any(|c| c == ACTIVE_CLASS)
	}
}

/// Returns the sidebar links for every dashboard page, in sidebar order.
///
/// Pages whose route has been removed from `router` are left out.
pub fn nav_links(router: &Router) -> Vec<NavLink> {
	DashboardView::ALL
		.into_iter()
		.filter_map(|view| {
			let target = RouteLocation::named(view.route_name());
			match router.href(target.clone()) {
				Ok(href) => Some(NavLink {
					view,
					label: view.route_name(),
					href,
					class: router.link_class(target),
				}),
				Err(e) => {
					tracing::debug!(error = %e, page = view.route_name(), "skipping sidebar link");
					None
				}
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use waymark_router::MemoryHistory;

	async fn router_at(path: &str) -> (Router, Rc<MemoryHistory>) {
		let history = Rc::new(MemoryHistory::new(path));
		let router = dashboard_router(history.clone(), "/").unwrap();
		router.start().await.unwrap();
		(router, history)
	}

	#[rstest]
	#[tokio::test]
	async fn test_root_lands_on_dashboard() {
		// Arrange & Act
		let (router, history) = router_at("/").await;

		// Assert
		let current = router.current_route().unwrap();
		assert_eq!(current.name(), Some("Dashboard"));
		assert_eq!(current.redirected_from(), Some("/"));
		assert_eq!(history.paths(), vec!["/dashboard-default".to_string()]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_sidebar_follows_navigation() {
		// Arrange
		let (router, history) = router_at("/").await;

		// Act
		let outcome = router.push(RouteLocation::named("Billing")).await.unwrap();
		let links = nav_links(&router);

		// Assert
		assert!(outcome.is_committed());
		assert_eq!(history.paths(), vec!["/dashboard-default", "/billing"]);
		assert_eq!(links.len(), 8);
		let active: Vec<_> = links.iter().filter(|l| l.is_active()).map(|l| l.view).collect();
		assert_eq!(active, vec![DashboardView::Billing]);
		let billing = links.iter().find(|l| l.view == DashboardView::Billing).unwrap();
		assert_eq!(billing.class, "active exact-active");
		assert_eq!(billing.href, "/billing");
	}

	#[rstest]
	#[tokio::test]
	async fn test_links_carry_base() {
		// Arrange
		let history = Rc::new(MemoryHistory::with_base("/admin", "/profile"));

		// Act
		let router = dashboard_router(history.clone(), "/admin").unwrap();
		router.start().await.unwrap();
		let links = nav_links(&router);

		// Assert
		let profile = links.iter().find(|l| l.view == DashboardView::Profile).unwrap();
		assert_eq!(profile.href, "/admin/profile");
		assert!(profile.is_active());
		assert_eq!(history.current_url(), "/admin/profile");
	}

	#[rstest]
	#[tokio::test]
	async fn test_removed_page_leaves_sidebar() {
		// Arrange
		let (router, _history) = router_at("/signin").await;

		// Act
		assert!(router.remove_route("Signup"));
		let links = nav_links(&router);

		// Assert
		assert_eq!(links.len(), 7);
		assert!(links.iter().all(|l| l.view != DashboardView::Signup));
	}

	#[rstest]
	fn test_invalid_base_is_rejected() {
		let history = Rc::new(MemoryHistory::new("/"));
		let result = dashboard_router(history, "admin");
		assert!(matches!(result, Err(crate::AdminError::Settings(_))));
	}
}
