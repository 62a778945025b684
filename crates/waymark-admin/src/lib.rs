//! Admin dashboard routing.
//!
//! Route table and router setup for the admin dashboard:
//!
//! - `/` - redirects to the dashboard
//! - `/dashboard-default` - Dashboard
//! - `/tables-comic`, `/tables-user` - data tables
//! - `/billing`, `/virtual-reality`, `/profile` - account pages
//! - `/signin`, `/signup` - authentication pages
//!
//! The table is available both as code ([`dashboard_routes`]) and as a TOML
//! document ([`ROUTES_TOML`]); both describe the same routes.

pub mod error;
pub mod navigation;
pub mod routes;
pub mod views;

pub use error::{AdminError, AdminResult};
pub use navigation::{ACTIVE_CLASS, NavLink, dashboard_router, dashboard_settings, nav_links};
pub use routes::{ROUTES_TOML, dashboard_routes, dashboard_table, load_routes};
pub use views::DashboardView;
