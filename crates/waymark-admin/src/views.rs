//! Dashboard pages.

use waymark_router::ViewId;

/// A page of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardView {
	/// Dashboard overview
	Dashboard,
	/// Comic table
	TablesComic,
	/// User table
	TablesUser,
	/// Billing page
	Billing,
	/// Virtual reality page
	VirtualReality,
	/// Profile page
	Profile,
	/// Sign-in page
	Signin,
	/// Sign-up page
	Signup,
}

impl DashboardView {
	/// Every page, in sidebar order.
	pub const ALL: [Self; 8] = [
		Self::Dashboard,
		Self::TablesComic,
		Self::TablesUser,
		Self::Billing,
		Self::VirtualReality,
		Self::Profile,
		Self::Signin,
		Self::Signup,
	];

	/// Returns the view id carried by the route record.
	pub const fn view_id(self) -> ViewId {
		ViewId::new(match self {
			Self::Dashboard => "dashboard",
			Self::TablesComic => "tables-comic",
			Self::TablesUser => "tables-user",
			Self::Billing => "billing",
			Self::VirtualReality => "virtual-reality",
			Self::Profile => "profile",
			Self::Signin => "signin",
			Self::Signup => "signup",
		})
	}

	/// Returns the route name, which is also the page title.
	pub const fn route_name(self) -> &'static str {
		match self {
			Self::Dashboard => "Dashboard",
			Self::TablesComic => "Tables of Comic",
			Self::TablesUser => "Tables of User",
			Self::Billing => "Billing",
			Self::VirtualReality => "Virtual Reality",
			Self::Profile => "Profile",
			Self::Signin => "Signin",
			Self::Signup => "Signup",
		}
	}

	/// Returns the route path.
	pub const fn path(self) -> &'static str {
		match self {
			Self::Dashboard => "/dashboard-default",
			Self::TablesComic => "/tables-comic",
			Self::TablesUser => "/tables-user",
			Self::Billing => "/billing",
			Self::VirtualReality => "/virtual-reality",
			Self::Profile => "/profile",
			Self::Signin => "/signin",
			Self::Signup => "/signup",
		}
	}

	/// Looks up the page for a view id.
	pub fn from_view_id(id: &ViewId) -> Option<Self> {
		Self::ALL.into_iter().find(|view| view.view_id() == *id)
	}
}

impl From<DashboardView> for ViewId {
	fn from(view: DashboardView) -> Self {
		view.view_id()
	}
}
