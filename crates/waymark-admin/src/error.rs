//! Error types for dashboard setup.

use thiserror::Error;
use waymark_router::{RegistrationError, SettingsError};

/// Result type for dashboard setup.
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors raised while building the dashboard router.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
	/// A route file could not be parsed.
	#[error("failed to parse route file: {0}")]
	RouteFile(#[from] toml::de::Error),

	/// A route could not be registered.
	#[error(transparent)]
	Registration(#[from] RegistrationError),

	/// The router settings are unusable.
	#[error(transparent)]
	Settings(#[from] SettingsError),
}
