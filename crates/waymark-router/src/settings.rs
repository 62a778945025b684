//! Router settings.
//!
//! Settings are usually embedded in an application's TOML configuration:
//!
//! ```toml
//! base = "/admin/"
//! max_redirects = 10
//! link_active_class = "active"
//! ```
//!
//! Every key is optional.

use crate::error::SettingsError;
use crate::resolver::DEFAULT_MAX_REDIRECTS;
use serde::{Deserialize, Serialize};

/// Configuration of a [`Router`](crate::router::Router).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Prefix of every URL the router commits.
	pub base: String,
	/// Bound on redirect hops per navigation, table and guard redirects combined.
	pub max_redirects: usize,
	/// Class reported for links whose target is part of the current route.
	pub link_active_class: String,
	/// Class reported for links whose target is exactly the current route.
	pub link_exact_active_class: String,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			base: "/".to_string(),
			max_redirects: DEFAULT_MAX_REDIRECTS,
			link_active_class: "router-link-active".to_string(),
			link_exact_active_class: "router-link-exact-active".to_string(),
		}
	}
}

impl RouterSettings {
	/// Parses and validates settings from a TOML document.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Parse`] for malformed TOML and
	/// [`SettingsError::Invalid`] for unusable values.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Sets the base path.
	pub fn with_base(mut self, base: impl Into<String>) -> Self {
		self.base = base.into();
		self
	}

	/// Sets the redirect bound.
	pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
		self.max_redirects = max_redirects;
		self
	}

	/// Sets the active link class.
	pub fn with_link_active_class(mut self, class: impl Into<String>) -> Self {
		self.link_active_class = class.into();
		self
	}

	/// Sets the exact-active link class.
	pub fn with_link_exact_active_class(mut self, class: impl Into<String>) -> Self {
		self.link_exact_active_class = class.into();
		self
	}

	/// Checks that every value is usable.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Invalid`] naming the first offending key.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !self.base.starts_with('/') {
			return Err(SettingsError::Invalid {
				key: "base",
				reason: format!("'{}' must start with '/'", self.base),
			});
		}
		if self.base.contains(['?', '#']) {
			return Err(SettingsError::Invalid {
				key: "base",
				reason: format!("'{}' must not contain a query or hash", self.base),
			});
		}
		if self.max_redirects == 0 {
			return Err(SettingsError::Invalid {
				key: "max_redirects",
				reason: "must be at least 1".to_string(),
			});
		}
		Ok(())
	}
}
