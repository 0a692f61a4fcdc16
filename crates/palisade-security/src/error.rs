//! Error types for the permission system.

use palisade_di::DiError;

use crate::config::ConfigError;

/// Result alias used across the permission system.
pub type SecurityResult<T> = Result<T, SecurityError>;

#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
	/// Unknown or duplicate role.
	#[error("{0}")]
	Role(String),

	/// Unknown rule in an association, or no association matches a permission.
	#[error("{0}")]
	Permission(String),

	/// Invalid rule registration or lookup.
	#[error("{0}")]
	Rule(String),

	/// A rule failed while evaluating, tagged with the rule identity.
	#[error("[{rule}] {source}")]
	RuleFailed {
		/// Identity of the failing rule
		rule: String,
		/// Underlying failure
		#[source]
		source: DiError,
	},

	/// Guard used without an actor.
	#[error("{0}")]
	Guard(String),

	/// Ambient container access needed but unavailable.
	#[error("{0}")]
	Scope(String),

	#[error(transparent)]
	Container(#[from] DiError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}
