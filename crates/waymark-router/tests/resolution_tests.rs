//! Route matching and resolution tests
//!
//! Exercises the route table and resolver through the public API.

use proptest::prelude::*;
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use waymark_router::prelude::*;
use waymark_router::{RegistrationError, Resolver};

fn routes() -> RouteTable {
	RouteTable::from_descriptors([
		RouteDescriptor::new("/").with_name("/").redirect_to("/dashboard-default"),
		RouteDescriptor::new("/dashboard-default")
			.with_name("Dashboard")
			.with_view("dashboard"),
		RouteDescriptor::new("/tables-comic").with_name("Tables of Comic").with_view("tables-comic"),
		RouteDescriptor::new("/tables-user").with_name("Tables of User").with_view("tables-user"),
		RouteDescriptor::new("/billing").with_name("Billing").with_view("billing"),
		RouteDescriptor::new("/users/{id}")
			.with_name("User")
			.with_view("user")
			.with_child(RouteDescriptor::new("").with_name("UserOverview").with_view("user-overview"))
			.with_child(RouteDescriptor::new("posts/{post}").with_name("UserPost").with_view("user-post")),
		RouteDescriptor::new("/a").redirect_to("/b"),
		RouteDescriptor::new("/b").redirect_to("/c"),
		RouteDescriptor::new("/c").with_name("C").with_view("c"),
		RouteDescriptor::new("/loop-a").redirect_to("/loop-b"),
		RouteDescriptor::new("/loop-b").redirect_to("/loop-a"),
		RouteDescriptor::new("/{rest:*}").with_name("NotFound").with_view("not-found"),
	])
	.unwrap()
}

#[fixture]
fn table() -> RouteTable {
	routes()
}

#[rstest]
#[case("/dashboard-default", "Dashboard")]
#[case("/tables-comic", "Tables of Comic")]
#[case("/tables-user", "Tables of User")]
#[case("/billing", "Billing")]
fn test_static_paths_resolve_to_their_registration(
	table: RouteTable,
	#[case] path: &str,
	#[case] name: &str,
) {
	// Arrange
	let resolver = Resolver::new(&table);

	// Act
	let first = resolver.resolve(&path.into()).unwrap();
	let second = resolver.resolve(&path.into()).unwrap();

	// Assert
	assert_eq!(first.name(), Some(name));
	assert_eq!(first.full_path(), path);
	assert!(first.params().is_empty());
	assert_eq!(first, second);
}

#[rstest]
fn test_index_child_wins_over_parent(table: RouteTable) {
	let route = Resolver::new(&table).resolve(&"/users/5".into()).unwrap();

	assert_eq!(route.name(), Some("UserOverview"));
	assert_eq!(
		route.matched().filter_map(|r| r.name()).collect::<Vec<_>>(),
		vec!["User", "UserOverview"]
	);
	assert_eq!(route.views().map(|v| v.as_str()).collect::<Vec<_>>(), vec!["user", "user-overview"]);
}

#[rstest]
fn test_nested_params_are_merged(table: RouteTable) {
	let route = Resolver::new(&table).resolve(&"/users/5/posts/hello%20world".into()).unwrap();

	assert_eq!(route.name(), Some("UserPost"));
	assert_eq!(route.param("id"), Some("5"));
	assert_eq!(route.param("post"), Some("hello world"));
}

#[rstest]
#[case("/users/jane doe")]
#[case("/users/jane%20doe")]
#[case("/users/jane%20doe/")]
fn test_spellings_of_one_path_share_full_path(table: RouteTable, #[case] raw: &str) {
	// Arrange
	let resolver = Resolver::new(&table);
	let named = RouteLocation::named("User").with_param("id", "jane doe");

	// Act
	let by_path = resolver.resolve(&raw.into()).unwrap();
	let by_name = resolver.resolve(&named).unwrap();

	// Assert
	assert_eq!(by_path.full_path(), "/users/jane%20doe");
	assert_eq!(by_path.param("id"), Some("jane doe"));
	assert_eq!(by_path, by_name);
}

#[rstest]
fn test_encoded_literal_resolves_to_canonical_literal(table: RouteTable) {
	let route = Resolver::new(&table).resolve(&"/bil%6Cing".into()).unwrap();

	assert_eq!(route.name(), Some("Billing"));
	assert_eq!(route.full_path(), "/billing");
}

#[rstest]
fn test_catch_all_registered_last_only_catches_leftovers(table: RouteTable) {
	let resolver = Resolver::new(&table);

	assert_eq!(resolver.resolve(&"/billing".into()).unwrap().name(), Some("Billing"));
	let missing = resolver.resolve(&"/no/such/page".into()).unwrap();
	assert_eq!(missing.name(), Some("NotFound"));
	assert_eq!(missing.param("rest"), Some("no/such/page"));
}

#[rstest]
fn test_redirect_chain_resolves_to_final_record(table: RouteTable) {
	let route = Resolver::new(&table).resolve(&"/a".into()).unwrap();

	assert_eq!(route.name(), Some("C"));
	assert_eq!(route.full_path(), "/c");
	assert_eq!(route.redirected_from(), Some("/a"));
}

#[rstest]
fn test_redirect_cycle_is_detected(table: RouteTable) {
	let result = Resolver::new(&table).resolve(&"/loop-a".into());
	assert!(matches!(result, Err(NavigationError::RedirectLoop { .. })));
}

#[rstest]
fn test_named_location_round_trips_through_reverse(table: RouteTable) {
	// Arrange
	let params = BTreeMap::from([
		("id".to_string(), "9".to_string()),
		("post".to_string(), "intro".to_string()),
	]);

	// Act
	let path = table.reverse("UserPost", &params).unwrap();
	let route = Resolver::new(&table).resolve(&path.as_str().into()).unwrap();

	// Assert
	assert_eq!(path, "/users/9/posts/intro");
	assert_eq!(route.params(), &params);
}

#[rstest]
fn test_failed_registration_leaves_table_untouched(mut table: RouteTable) {
	let before = table.len();

	let result = table.register(
		RouteDescriptor::new("/reports")
			.with_name("Reports")
			.with_view("reports")
			.with_child(RouteDescriptor::new("{id}/{id}").with_view("report")),
	);

	assert!(matches!(result, Err(RegistrationError::InvalidPattern { .. })));
	assert_eq!(table.len(), before);
	assert!(!table.has_route("Reports"));
}

proptest! {
	/// Trailing and repeated slashes never change what a path resolves to.
	#[test]
	fn prop_trailing_slash_variants_resolve_identically(
		segments in prop::collection::vec("[a-z0-9-]{1,12}", 0..5),
		trailing in 1usize..4,
	) {
		let table = routes();
		let resolver = Resolver::new(&table);
		let path = format!("/{}", segments.join("/"));
		let variant = format!("{}{}", path, "/".repeat(trailing));

		let plain = resolver.resolve(&path.as_str().into());
		let slashed = resolver.resolve(&variant.as_str().into());

		match (plain, slashed) {
			(Ok(a), Ok(b)) => {
				prop_assert_eq!(a.name(), b.name());
				prop_assert_eq!(a.params(), b.params());
				prop_assert_eq!(a.full_path(), b.full_path());
			}
			(Err(a), Err(b)) => prop_assert_eq!(a, b),
			(a, b) => prop_assert!(false, "diverging results: {:?} vs {:?}", a, b),
		}
	}

	/// Parameters survive percent-encoding on the way in.
	#[test]
	fn prop_params_are_decoded(id in "[a-zA-Z0-9 _.~-]{1,16}") {
		let table = routes();
		let path = format!("/users/{}/posts/x", urlencoding::encode(&id));

		let route = Resolver::new(&table).resolve(&path.as_str().into()).unwrap();

		prop_assert_eq!(route.param("id"), Some(id.as_str()));
	}
}
