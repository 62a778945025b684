//! The dashboard route table.

use crate::error::AdminResult;
use crate::views::DashboardView;
use serde::Deserialize;
use waymark_router::{RouteDescriptor, RouteTable};

/// The dashboard route table as a TOML document.
pub const ROUTES_TOML: &str = include_str!("routes.toml");

#[derive(Debug, Deserialize)]
struct RouteFile {
	#[serde(default)]
	routes: Vec<RouteDescriptor>,
}

/// Returns the dashboard route descriptors in registration order.
pub fn dashboard_routes() -> Vec<RouteDescriptor> {
	let root = RouteDescriptor::new("/")
		.with_name("/")
		.redirect_to(DashboardView::Dashboard.path());

	std::iter::once(root)
		.chain(DashboardView::ALL.into_iter().map(|view| {
			RouteDescriptor::new(view.path())
				.with_name(view.route_name())
				.with_view(view)
		}))
		.collect()
}

/// Parses route descriptors from a TOML document with a `[[routes]]` array.
///
/// # Errors
///
/// Returns [`AdminError::RouteFile`](crate::AdminError::RouteFile) if the
/// document is malformed.
pub fn load_routes(source: &str) -> AdminResult<Vec<RouteDescriptor>> {
	let file: RouteFile = toml::from_str(source)?;
	tracing::debug!(routes = file.routes.len(), "loaded route file");
	Ok(file.routes)
}

/// Builds the dashboard route table.
///
/// # Errors
///
/// Returns [`AdminError::Registration`](crate::AdminError::Registration) if
/// the table is inconsistent.
pub fn dashboard_table() -> AdminResult<RouteTable> {
	Ok(RouteTable::from_descriptors(dashboard_routes())?)
}
