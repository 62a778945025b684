//! Location resolution.
//!
//! The resolver turns a [`RouteLocation`] into a [`ResolvedRoute`]: named
//! locations are expanded through the table, the path is matched, and redirect
//! records are followed until a record with a view is reached. Resolution is
//! pure, so it is safe to call speculatively.

use crate::error::{NavigationError, NavigationResult};
use crate::location::{ParsedPath, RouteLocation, build_full_path};
use crate::pattern::split_segments;
use crate::resolved::ResolvedRoute;
use crate::table::RouteTable;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Default bound on redirect hops per navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

static PARAM_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(:\*)?\}").expect("PARAM_REF_REGEX: invalid regex pattern")
});

/// Resolves locations against a borrowed route table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
	table: &'a RouteTable,
	max_redirects: usize,
}

impl<'a> Resolver<'a> {
	/// Creates a resolver with the default redirect bound.
	pub fn new(table: &'a RouteTable) -> Self {
		Self {
			table,
			max_redirects: DEFAULT_MAX_REDIRECTS,
		}
	}

	/// Sets the redirect bound.
	pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
		self.max_redirects = max_redirects;
		self
	}

	/// Resolves a location, following redirect records.
	///
	/// # Errors
	///
	/// - [`NavigationError::NoMatch`] when no record matches
	/// - [`NavigationError::RedirectLoop`] when more than the configured number
	///   of redirects are followed
	/// - [`NavigationError::UnknownRouteName`] and
	///   [`NavigationError::MissingParameter`] for bad named locations
	pub fn resolve(&self, location: &RouteLocation) -> NavigationResult<ResolvedRoute> {
		self.resolve_counted(location, 0, None).map(|(route, _)| route)
	}

	/// Resolves a location starting from `hops` already spent.
	///
	/// Returns the route and the total number of hops spent, so redirects
	/// issued by guards can share the budget with table redirects.
	pub(crate) fn resolve_counted(
		&self,
		location: &RouteLocation,
		mut hops: usize,
		mut redirected_from: Option<String>,
	) -> NavigationResult<(ResolvedRoute, usize)> {
		let mut current = self.canonicalize(location)?;

		loop {
			let found = self
				.table
				.match_path(&current.path)
				.ok_or_else(|| NavigationError::NoMatch(current.path.clone()))?;

			let Some(target) = found.record.redirect() else {
				tracing::debug!(path = %current.path, route = %found.record.id(), "resolved location");
				let full_path = current.full_path();
				return Ok((
					ResolvedRoute {
						record: found.record,
						matched: found.matched,
						params: found.params,
						query: current.query,
						hash: current.hash,
						path: current.path,
						full_path,
						redirected_from,
					},
					hops,
				));
			};

			hops += 1;
			if hops > self.max_redirects {
				tracing::warn!(hops, path = %current.path, "redirect bound exceeded");
				return Err(NavigationError::RedirectLoop {
					hops: self.max_redirects,
					path: current.full_path(),
				});
			}

			redirected_from.get_or_insert_with(|| {
				build_full_path(&current.path, &current.query, current.hash.as_deref())
			});

			let target = substitute_params(target, &found.params);
			let mut next = self.canonicalize(&target)?;
			if !target.has_query_or_hash() {
				next.query = std::mem::take(&mut current.query);
				next.hash = current.hash.take();
			}
			tracing::debug!(from = %current.path, to = %next.path, hops, "following redirect");
			current = next;
		}
	}

	/// Expands a location into a normalized path with its query and hash.
	fn canonicalize(&self, location: &RouteLocation) -> NavigationResult<ParsedPath> {
		match location {
			RouteLocation::Path(raw) => Ok(ParsedPath::parse(raw)),
			RouteLocation::Named {
				name,
				params,
				query,
				hash,
			} => Ok(ParsedPath {
				path: self.table.reverse(name, params)?,
				query: query.clone(),
				hash: hash.clone(),
			}),
		}
	}
}

/// Substitutes `{param}` and `{param:*}` back-references in a redirect target.
///
/// Named targets also inherit captured parameters they do not set themselves.
fn substitute_params(target: &RouteLocation, captured: &BTreeMap<String, String>) -> RouteLocation {
	match target {
		RouteLocation::Path(raw) => RouteLocation::Path(substitute_path(raw, captured)),
		RouteLocation::Named {
			name,
			params,
			query,
			hash,
		} => {
			let mut merged = captured.clone();
			for (key, value) in params {
				merged.insert(key.clone(), substitute_value(value, captured));
			}
			RouteLocation::Named {
				name: name.clone(),
				params: merged,
				query: query.clone(),
				hash: hash.clone(),
			}
		}
	}
}

fn substitute_path(raw: &str, captured: &BTreeMap<String, String>) -> String {
	PARAM_REF_REGEX
		.replace_all(raw, |caps: &regex::Captures<'_>| {
			let value = captured.get(&caps[1]).map(String::as_str).unwrap_or_default();
			if caps.get(2).is_some() {
				split_segments(value)
					.into_iter()
					.map(|s| urlencoding::encode(s).into_owned())
					.collect::<Vec<_>>()
					.join("/")
			} else {
				urlencoding::encode(value).into_owned()
			}
		})
		.into_owned()
}

fn substitute_value(raw: &str, captured: &BTreeMap<String, String>) -> String {
	PARAM_REF_REGEX
		.replace_all(raw, |caps: &regex::Captures<'_>| {
			captured.get(&caps[1]).cloned().unwrap_or_default()
		})
		.into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::table::RouteDescriptor;
	use crate::view::ViewId;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> RouteTable {
		RouteTable::from_descriptors([
			RouteDescriptor::new("/").with_name("/").redirect_to("/dashboard-default"),
			RouteDescriptor::new("/dashboard-default")
				.with_name("Dashboard")
				.with_view(ViewId::new("dashboard")),
			RouteDescriptor::new("/users/{id}")
				.with_name("User")
				.with_view(ViewId::new("user")),
			RouteDescriptor::new("/members/{id}").redirect_to("/users/{id}"),
			RouteDescriptor::new("/people/{id}")
				.redirect_to(RouteLocation::named("User").with_param("id", "p-{id}")),
			RouteDescriptor::new("/archive/{rest:*}").redirect_to("/files/{rest:*}"),
			RouteDescriptor::new("/files/{rest:*}")
				.with_name("Files")
				.with_view(ViewId::new("files")),
			RouteDescriptor::new("/a").redirect_to("/b"),
			RouteDescriptor::new("/b").redirect_to("/c"),
			RouteDescriptor::new("/c").with_name("C").with_view(ViewId::new("c")),
			RouteDescriptor::new("/loop-a").redirect_to("/loop-b"),
			RouteDescriptor::new("/loop-b").redirect_to("/loop-a"),
		])
		.unwrap()
	}

	#[rstest]
	fn test_static_path_resolves(table: RouteTable) {
		// Act
		let first = Resolver::new(&table).resolve(&"/dashboard-default".into()).unwrap();
		let second = Resolver::new(&table).resolve(&"/dashboard-default/".into()).unwrap();

		// Assert
		assert_eq!(first.name(), Some("Dashboard"));
		assert_eq!(first.full_path(), "/dashboard-default");
		assert_eq!(first, second);
		assert!(first.redirected_from().is_none());
	}

	#[rstest]
	fn test_root_redirects_to_dashboard(table: RouteTable) {
		let route = Resolver::new(&table).resolve(&"/".into()).unwrap();
		assert_eq!(route.name(), Some("Dashboard"));
		assert_eq!(route.redirected_from(), Some("/"));
	}

	#[rstest]
	fn test_redirect_chain(table: RouteTable) {
		let (route, hops) = Resolver::new(&table)
			.resolve_counted(&"/a".into(), 0, None)
			.unwrap();
		assert_eq!(route.name(), Some("C"));
		assert_eq!(hops, 2);
		assert_eq!(route.redirected_from(), Some("/a"));
	}

	#[rstest]
	fn test_redirect_loop(table: RouteTable) {
		let result = Resolver::new(&table).resolve(&"/loop-a".into());
		assert!(matches!(
			result,
			Err(NavigationError::RedirectLoop { hops: DEFAULT_MAX_REDIRECTS, .. })
		));
	}

	#[rstest]
	fn test_redirect_bound_is_configurable(table: RouteTable) {
		let resolver = Resolver::new(&table).with_max_redirects(1);
		assert!(resolver.resolve(&"/b".into()).is_ok());
		assert!(matches!(
			resolver.resolve(&"/a".into()),
			Err(NavigationError::RedirectLoop { hops: 1, .. })
		));
	}

	#[rstest]
	fn test_redirect_substitutes_params(table: RouteTable) {
		let resolver = Resolver::new(&table);

		let member = resolver.resolve(&"/members/jane%20doe".into()).unwrap();
		assert_eq!(member.name(), Some("User"));
		assert_eq!(member.param("id"), Some("jane doe"));
		assert_eq!(member.path(), "/users/jane%20doe");

		let person = resolver.resolve(&"/people/7".into()).unwrap();
		assert_eq!(person.param("id"), Some("p-7"));

		let archived = resolver.resolve(&"/archive/2024/report.pdf".into()).unwrap();
		assert_eq!(archived.name(), Some("Files"));
		assert_eq!(archived.param("rest"), Some("2024/report.pdf"));
	}

	#[rstest]
	fn test_redirect_carries_query_and_hash(table: RouteTable) {
		let route = Resolver::new(&table).resolve(&"/?tab=stats#top".into()).unwrap();
		assert_eq!(route.full_path(), "/dashboard-default?tab=stats#top");
		assert_eq!(route.redirected_from(), Some("/?tab=stats#top"));
	}

	#[rstest]
	fn test_named_location(table: RouteTable) {
		let location = RouteLocation::named("User")
			.with_param("id", "42")
			.with_query("tab", "posts");

		let route = Resolver::new(&table).resolve(&location).unwrap();

		assert_eq!(route.full_path(), "/users/42?tab=posts");
		assert_eq!(route.param("id"), Some("42"));
	}

	#[rstest]
	#[case(RouteLocation::path("/nowhere"), NavigationError::NoMatch("/nowhere".to_string()))]
	#[case(RouteLocation::named("Ghost"), NavigationError::UnknownRouteName("Ghost".to_string()))]
	#[case(
		RouteLocation::named("User"),
		NavigationError::MissingParameter { route: "User".to_string(), param: "id".to_string() }
	)]
	fn test_resolution_errors(
		table: RouteTable,
		#[case] location: RouteLocation,
		#[case] expected: NavigationError,
	) {
		assert_eq!(Resolver::new(&table).resolve(&location), Err(expected));
	}
}
