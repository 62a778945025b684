//! Path pattern compilation and segment matching.
//!
//! Patterns are written segment by segment:
//!
//! - `/billing` - literal segments, matched exactly (case-sensitive)
//! - `/users/{id}` - a named parameter capturing one non-empty segment
//! - `/files/{rest:*}` - a catch-all capturing zero or more remaining segments
//!
//! A catch-all may appear at most once and only as the final segment.
//! Trailing and repeated slashes carry no meaning: `/users/{id}/` and
//! `/users/{id}` compile to the same pattern, and `/users/42/` matches both.

use crate::error::{RegistrationError, RegistrationResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

static PARAM_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("PARAM_NAME_REGEX: invalid regex pattern")
});

/// One compiled segment of a [`RoutePattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Matches exactly this text.
	Literal(String),
	/// Captures one path segment under the given name.
	Param(String),
	/// Captures every remaining segment, joined with `/`.
	CatchAll(String),
}

impl Segment {
	/// Returns the parameter name for `Param` and `CatchAll` segments.
	pub fn param_name(&self) -> Option<&str> {
		match self {
			Self::Literal(_) => None,
			Self::Param(name) | Self::CatchAll(name) => Some(name.as_str()),
		}
	}
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled segments in order.
	segments: Vec<Segment>,
}

/// Result of matching a pattern against the front of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrefixMatch {
	/// Number of path segments the pattern consumed.
	pub consumed: usize,
	/// Parameters bound by the pattern, in pattern order.
	pub params: Vec<(String, String)>,
}

impl RoutePattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`RegistrationError::InvalidPattern`] if:
	/// - the pattern exceeds 1024 bytes or 32 segments
	/// - a brace is unbalanced or a parameter does not span a whole segment
	/// - a parameter name is not an identifier, or appears twice
	/// - more than one catch-all is present, or a catch-all is not final
	pub fn compile(pattern: &str) -> RegistrationResult<Self> {
		let invalid = |reason: String| RegistrationError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let raw_segments = split_segments(pattern);
		if raw_segments.len() > MAX_PATTERN_SEGMENTS {
			return Err(invalid(format!(
				"{} segments exceed the maximum of {}",
				raw_segments.len(),
				MAX_PATTERN_SEGMENTS
			)));
		}

		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut seen = Vec::new();

		for raw in raw_segments {
			let segment = Self::compile_segment(raw).map_err(invalid)?;
			if let Some(name) = segment.param_name() {
				if seen.iter().any(|existing| existing == name) {
					return Err(invalid(format!("parameter '{}' appears more than once", name)));
				}
				seen.push(name.to_string());
			}
			if matches!(segments.last(), Some(Segment::CatchAll(_))) {
				return Err(invalid(
					"catch-all must be the final segment and may appear only once".to_string(),
				));
			}
			segments.push(segment);
		}

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
		})
	}

	fn compile_segment(raw: &str) -> Result<Segment, String> {
		let Some(inner) = raw.strip_prefix('{') else {
			if raw.contains('{') || raw.contains('}') {
				return Err(format!("parameter in '{}' must span the whole segment", raw));
			}
			return Ok(Segment::Literal(raw.to_string()));
		};

		let inner = inner
			.strip_suffix('}')
			.ok_or_else(|| format!("unbalanced braces in segment '{}'", raw))?;

		let (name, catch_all) = match inner.strip_suffix(":*") {
			Some(name) => (name, true),
			None => (inner, false),
		};

		if !PARAM_NAME_REGEX.is_match(name) {
			return Err(format!("'{}' is not a valid parameter name", name));
		}

		Ok(if catch_all {
			Segment::CatchAll(name.to_string())
		} else {
			Segment::Param(name.to_string())
		})
	}

	/// Returns the original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the parameter names in pattern order.
	pub fn param_names(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(Segment::param_name)
	}

	/// Returns whether the pattern has no parameters.
	pub fn is_exact(&self) -> bool {
		self.segments
			.iter()
			.all(|s| matches!(s, Segment::Literal(_)))
	}

	/// Returns whether the pattern ends in a catch-all.
	pub fn has_catch_all(&self) -> bool {
		matches!(self.segments.last(), Some(Segment::CatchAll(_)))
	}

	/// Returns whether the pattern has no segments (`""` or `/`).
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Concatenates a child pattern onto this one.
	///
	/// The result is recompiled so the catch-all and duplicate-name rules hold
	/// across the combined pattern.
	pub fn join(&self, child: &RoutePattern) -> RegistrationResult<Self> {
		let parent = self.pattern.trim_end_matches('/');
		let child = child.pattern.trim_start_matches('/');
		Self::compile(&format!("{}/{}", parent, child))
	}

	/// Matches the pattern against the front of `path`.
	///
	/// Path segments are expected to be percent-decoded already.
	pub(crate) fn match_prefix(&self, path: &[String]) -> Option<PrefixMatch> {
		let mut params = Vec::new();
		let mut consumed = 0;

		for segment in &self.segments {
			match segment {
				Segment::Literal(literal) => {
					if path.get(consumed)? != literal {
						return None;
					}
					consumed += 1;
				}
				Segment::Param(name) => {
					let value = path.get(consumed)?;
					params.push((name.clone(), value.clone()));
					consumed += 1;
				}
				Segment::CatchAll(name) => {
					params.push((name.clone(), path[consumed..].join("/")));
					consumed = path.len();
				}
			}
		}

		Some(PrefixMatch { consumed, params })
	}

	/// Matches the whole of `path` against this pattern.
	pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
		let segments = decode_segments(path);
		let prefix = self.match_prefix(&segments)?;
		(prefix.consumed == segments.len()).then(|| prefix.params.into_iter().collect())
	}

	/// Checks if this pattern matches the whole of `path`.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}

	/// Builds a canonical path from this pattern.
	///
	/// Parameter values are percent-encoded; catch-all values keep their `/`
	/// separators. Returns the name of the first missing parameter on failure.
	pub fn reverse(&self, params: &BTreeMap<String, String>) -> Result<String, String> {
		let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());

		for segment in &self.segments {
			match segment {
				Segment::Literal(literal) => parts.push(urlencoding::encode(literal).into_owned()),
				Segment::Param(name) => {
					let value = params.get(name).filter(|v| !v.is_empty()).ok_or(name)?;
					parts.push(urlencoding::encode(value).into_owned());
				}
				Segment::CatchAll(name) => {
					let value = params.get(name).ok_or(name)?;
					parts.extend(
						split_segments(value)
							.into_iter()
							.map(|s| urlencoding::encode(s).into_owned()),
					);
				}
			}
		}

		Ok(format!("/{}", parts.join("/")))
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.segments == other.segments
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// Splits a path into its non-empty segments.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
	path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Splits a path into percent-decoded, non-empty segments.
///
/// Segments that do not decode to UTF-8 are kept verbatim.
pub(crate) fn decode_segments(path: &str) -> Vec<String> {
	split_segments(path)
		.into_iter()
		.map(|s| {
			urlencoding::decode(s)
				.map(|d| d.into_owned())
				.unwrap_or_else(|_| s.to_string())
		})
		.collect()
}

/// Normalizes a path: one leading slash, no trailing or repeated slashes.
pub fn normalize_path(path: &str) -> String {
	format!("/{}", split_segments(path).join("/"))
}

/// Normalizes a path and re-encodes every segment.
///
/// Each segment is percent-decoded and then percent-encoded again, so
/// `/users/jane doe` and `/users/jane%20doe` share one spelling. Literal
/// segments are compared decoded as well, which makes `/bil%6Cing` the same
/// path as `/billing`. Segments that do not decode to UTF-8 are kept verbatim.
pub fn canonical_path(path: &str) -> String {
	let segments: Vec<String> = split_segments(path)
		.into_iter()
		.map(|s| match urlencoding::decode(s) {
			Ok(decoded) => urlencoding::encode(&decoded).into_owned(),
			Err(_) => s.to_string(),
		})
		.collect();
	format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_exact_pattern() {
		let pattern = RoutePattern::compile("/users/").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/users"));
		assert!(pattern.is_match("/users/"));
		assert!(!pattern.is_match("/users/123/"));
	}

	#[rstest]
	fn test_single_param() {
		let pattern = RoutePattern::compile("/users/{id}/").unwrap();
		assert!(!pattern.is_exact());
		assert!(pattern.is_match("/users/42"));
		assert!(!pattern.is_match("/users/"));

		let params = pattern.matches("/users/42/").unwrap();
		assert_eq!(params.get("id"), Some(&"42".to_string()));
	}

	#[rstest]
	fn test_multiple_params_keep_order() {
		let pattern = RoutePattern::compile("/a/{x}/b/{y}/c/{z}").unwrap();
		assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
	}

	#[rstest]
	fn test_literals_are_case_sensitive() {
		let pattern = RoutePattern::compile("/Billing").unwrap();
		assert!(pattern.is_match("/Billing"));
		assert!(!pattern.is_match("/billing"));
	}

	#[rstest]
	fn test_param_is_percent_decoded() {
		let pattern = RoutePattern::compile("/users/{name}").unwrap();
		let params = pattern.matches("/users/jane%20doe").unwrap();
		assert_eq!(params.get("name"), Some(&"jane doe".to_string()));
	}

	#[rstest]
	#[case("/files/a/b/c.txt", "a/b/c.txt")]
	#[case("/files/one", "one")]
	#[case("/files", "")]
	#[case("/files/", "")]
	fn test_catch_all_captures_remainder(#[case] path: &str, #[case] expected: &str) {
		let pattern = RoutePattern::compile("/files/{rest:*}").unwrap();
		let params = pattern.matches(path).unwrap();
		assert_eq!(params.get("rest").map(String::as_str), Some(expected));
	}

	#[rstest]
	#[case("/a/{x:*}/{y:*}")]
	#[case("/a/{rest:*}/b")]
	#[case("/a/{id}/{id}")]
	#[case("/a/{1bad}")]
	#[case("/a/{open")]
	#[case("/a/pre{id}")]
	#[case("/a/{}")]
	fn test_invalid_patterns_are_rejected(#[case] raw: &str) {
		// Act
		let result = RoutePattern::compile(raw);

		// Assert
		assert!(
			matches!(result, Err(RegistrationError::InvalidPattern { .. })),
			"expected {} to be rejected",
			raw
		);
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = RoutePattern::compile(&long_pattern);

		// Assert
		let err = result.unwrap_err().to_string();
		assert!(err.contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}/", segments.join("/"));

		// Act
		let result = RoutePattern::compile(&pattern);

		// Assert
		assert!(result.unwrap_err().to_string().contains("exceed the maximum"));
	}

	#[rstest]
	fn test_reverse_encodes_params() {
		let pattern = RoutePattern::compile("/users/{name}/files/{rest:*}").unwrap();
		let params = BTreeMap::from([
			("name".to_string(), "jane doe".to_string()),
			("rest".to_string(), "docs/a b.txt".to_string()),
		]);

		assert_eq!(
			pattern.reverse(&params),
			Ok("/users/jane%20doe/files/docs/a%20b.txt".to_string())
		);
	}

	#[rstest]
	fn test_reverse_missing_param() {
		let pattern = RoutePattern::compile("/users/{id}").unwrap();
		assert_eq!(pattern.reverse(&BTreeMap::new()), Err("id".to_string()));
	}

	#[rstest]
	fn test_join_validates_combined_pattern() {
		let parent = RoutePattern::compile("/users/{id}").unwrap();
		let child = RoutePattern::compile("posts/{post}").unwrap();
		let joined = parent.join(&child).unwrap();
		assert_eq!(joined.as_str(), "/users/{id}/posts/{post}");

		let clash = RoutePattern::compile("{id}").unwrap();
		assert!(parent.join(&clash).is_err());

		let tail = RoutePattern::compile("/files/{rest:*}").unwrap();
		assert!(tail.join(&child).is_err());
	}

	#[rstest]
	#[case("/", "/")]
	#[case("", "/")]
	#[case("/billing/", "/billing")]
	#[case("//tables-user//", "/tables-user")]
	fn test_normalize_path(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(normalize_path(raw), expected);
	}

	#[rstest]
	#[case("/users/jane doe", "/users/jane%20doe")]
	#[case("/users/jane%20doe/", "/users/jane%20doe")]
	#[case("//bil%6Cing", "/billing")]
	#[case("/files/%FF", "/files/%FF")]
	#[case("", "/")]
	fn test_canonical_path(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(canonical_path(raw), expected);
	}

	#[rstest]
	fn test_pattern_equality_ignores_trailing_slash() {
		let p1 = RoutePattern::compile("/users/{id}/").unwrap();
		let p2 = RoutePattern::compile("/users/{id}").unwrap();
		let p3 = RoutePattern::compile("/users/{user_id}").unwrap();

		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
		assert_eq!(format!("{}", p1), "/users/{id}/");
	}
}
