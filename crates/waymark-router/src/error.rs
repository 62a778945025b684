//! Error types for route registration and navigation.
//!
//! Registration errors are raised while the route table is being built and are
//! fatal at startup. Navigation errors are recoverable: they are returned as part
//! of a navigation result and never leave the router state and the visible
//! history out of sync.

use thiserror::Error;

/// Result type for route table registration.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Result type for navigation and resolution.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Errors raised while compiling patterns or registering route records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistrationError {
	/// The route pattern could not be compiled.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern string.
		pattern: String,
		/// Why compilation failed.
		reason: String,
	},

	/// A route with the same name is already registered.
	#[error("duplicate route name: {0}")]
	DuplicateName(String),

	/// The record has neither a view, a redirect, nor children.
	#[error("route '{0}' has no view, redirect or children")]
	EmptyRecord(String),

	/// A child route or a route guard referenced a route name that does not exist.
	#[error("unknown route: {0}")]
	UnknownRoute(String),
}

/// Errors returned from resolution and navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NavigationError {
	/// No route record matches the requested path.
	#[error("no route matches path: {0}")]
	NoMatch(String),

	/// Following redirects (table or guard) exceeded the hop bound.
	#[error("redirect loop detected after {hops} hops while resolving {path}")]
	RedirectLoop {
		/// Number of hops followed before giving up.
		hops: usize,
		/// The location being resolved when the bound was hit.
		path: String,
	},

	/// A named location referenced a route that is not registered.
	#[error("unknown route name: {0}")]
	UnknownRouteName(String),

	/// A named location is missing a parameter its pattern requires.
	#[error("missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route name being reversed.
		route: String,
		/// Name of the missing parameter.
		param: String,
	},

	/// The target view could not be made ready.
	#[error("failed to load view for {path}: {reason}")]
	ViewLoad {
		/// Path of the navigation target.
		path: String,
		/// Loader-supplied reason.
		reason: String,
	},

	/// The history backend failed to commit an entry.
	#[error("history error: {0}")]
	History(#[from] HistoryError),
}

/// Errors raised by a history backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HistoryError {
	/// The platform refused the state update.
	#[error("failed to update history: {0}")]
	Platform(String),

	/// The history state could not be encoded or decoded.
	#[error("invalid history state: {0}")]
	InvalidState(String),
}

/// Error reported by a post-navigation hook. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
	/// Creates a hook error from any message.
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// Errors raised while loading router settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
	/// The TOML document could not be parsed.
	#[error("failed to parse router settings: {0}")]
	Parse(#[from] toml::de::Error),

	/// A setting has a value the router cannot use.
	#[error("invalid router setting '{key}': {reason}")]
	Invalid {
		/// Setting key.
		key: &'static str,
		/// Why the value is rejected.
		reason: String,
	},
}
