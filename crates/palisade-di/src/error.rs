//! Error types raised while resolving bindings and constructing instances.

use crate::cycle_detection::CycleError;

/// Result alias used across the container.
pub type DiResult<T> = Result<T, DiError>;

/// Failures produced by the container, the argument resolver and the ambient scope.
///
/// [`DiError::NotFound`] and [`DiError::Argument`] form the "cannot autowire" category
/// (see [`DiError::is_autowire_failure`]). The argument resolver converts exactly this
/// category into a null argument when the failing parameter is optional.
#[derive(Debug, thiserror::Error)]
pub enum DiError {
	/// Alias has no binding and no type definition to autowire from.
	#[error("Undefined class or binding '{0}'")]
	NotFound(String),

	/// A parameter could not be supplied a valid value.
	#[error("Unable to resolve '{parameter}' argument in '{callable}'")]
	Argument {
		/// Name of the offending parameter
		parameter: String,
		/// Identity of the enclosing callable
		callable: String,
	},

	/// An injector was required but misbehaved.
	#[error("Injection error: {0}")]
	Injection(String),

	/// Malformed binding, invalid injector registration or non-instantiable type.
	#[error("Container error: {0}")]
	Container(String),

	/// Alias cycle or resolution depth limit.
	#[error("{0}")]
	CircularDependency(String),

	/// Ambient container access was required but none is installed.
	#[error("Scope error: {0}")]
	Scope(String),

	/// A constructor, closure or method failed with a foreign error.
	#[error("Invocation of '{callable}' failed: {source}")]
	Invocation {
		/// Identity of the failing callable
		callable: String,
		/// Underlying failure
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

impl DiError {
	/// Builds an argument failure for `parameter` of `callable`.
	pub fn argument(parameter: impl Into<String>, callable: impl Into<String>) -> Self {
		Self::Argument {
			parameter: parameter.into(),
			callable: callable.into(),
		}
	}

	/// Wraps a foreign error raised by user code registered under `callable`.
	pub fn invocation(
		callable: impl Into<String>,
		source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
	) -> Self {
		Self::Invocation {
			callable: callable.into(),
			source: source.into(),
		}
	}

	/// Returns `true` for the "cannot autowire" category.
	pub fn is_autowire_failure(&self) -> bool {
		matches!(self, Self::NotFound(_) | Self::Argument { .. })
	}
}

impl From<CycleError> for DiError {
	fn from(error: CycleError) -> Self {
		Self::CircularDependency(error.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(DiError::NotFound("Cache".into()), true)]
	#[case(DiError::argument("name", "Cache::new"), true)]
	#[case(DiError::Injection("bad".into()), false)]
	#[case(DiError::Container("bad".into()), false)]
	#[case(DiError::CircularDependency("a -> a".into()), false)]
	#[case(DiError::Scope("none".into()), false)]
	fn test_autowire_failure_category(#[case] error: DiError, #[case] expected: bool) {
		// Act
		let result = error.is_autowire_failure();

		// Assert
		assert_eq!(result, expected);
	}

	#[rstest]
	fn test_argument_message_names_parameter_and_callable() {
		// Arrange
		let error = DiError::argument("ttl", "Cache::new");

		// Act
		let message = error.to_string();

		// Assert
		assert_eq!(message, "Unable to resolve 'ttl' argument in 'Cache::new'");
	}

	#[rstest]
	fn test_invocation_keeps_source() {
		// Arrange
		let io = std::io::Error::other("disk gone");

		// Act
		let error = DiError::invocation("Storage::new", io);

		// Assert
		assert!(std::error::Error::source(&error).is_some());
		assert!(error.to_string().contains("Storage::new"));
	}
}
