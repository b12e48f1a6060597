//! Container error taxonomy

use crate::definition::{BeanError, Scope};

/// Convenience alias for fallible container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors raised by registration, resolution, and scope management.
///
/// Every error is scoped to the single operation that raised it; the
/// container keeps no global error state and never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
	/// A definition with this name is already registered
	#[error("a bean named '{name}' is already registered")]
	DuplicateName {
		/// Name of the conflicting definition
		name: String,
	},

	/// No registered definition matches the requested name or capability
	#[error("no registered bean matches '{name}'")]
	NoSuchBean {
		/// The name or capability tag that failed to match
		name: String,
	},

	/// A capability lookup matched more than one definition
	#[error("capability '{capability}' is ambiguous: matches {candidates:?}")]
	Ambiguous {
		/// The capability tag that was looked up
		capability: String,
		/// Conflicting definition names, sorted
		candidates: Vec<String>,
	},

	/// The dependency graph contains a cycle
	#[error("circular dependency detected: {}", path.join(" -> "))]
	CyclicDependency {
		/// The cycle, starting and ending at the same definition
		path: Vec<String>,
	},

	/// A request-scoped bean was resolved with no request window active
	/// on the calling thread
	#[error("no request window is active for request-scoped bean '{name}'")]
	ScopeNotActive {
		/// Name of the request-scoped definition
		name: String,
	},

	/// The container has been closed
	#[error("container is closed")]
	ContainerClosed,

	/// A longer-lived bean declared a direct dependency on a shorter-lived one
	#[error(
		"scope mismatch: '{dependent}' ({dependent_scope}) cannot hold '{dependency}' ({dependency_scope}) directly; declare the edge deferred and take a provider"
	)]
	ScopeMismatch {
		/// Name of the bean declaring the edge
		dependent: String,
		/// Scope of the bean declaring the edge
		dependent_scope: Scope,
		/// Name of the bean the edge points at
		dependency: String,
		/// Scope of the bean the edge points at
		dependency_scope: Scope,
	},

	/// A bean factory returned an error
	#[error("factory for bean '{definition}' failed")]
	FactoryFailure {
		/// Name of the definition whose factory failed
		definition: String,
		#[source]
		source: BeanError,
	},

	/// A post-construct hook returned an error
	#[error("post-construct hook for bean '{definition}' failed")]
	PostConstructFailure {
		/// Name of the definition whose hook failed
		definition: String,
		#[source]
		source: BeanError,
	},

	/// The resolved instance is not of the requested type
	#[error("bean '{name}' is not of the requested type {expected}")]
	TypeMismatch {
		/// Name of the resolved definition
		name: String,
		/// The type the caller asked for
		expected: &'static str,
	},

	/// Resolution recursed deeper than the supported maximum
	#[error("resolution depth exceeded the maximum of {limit}")]
	ResolutionDepthExceeded {
		/// The depth limit that was hit
		limit: usize,
	},

	/// A definition failed validation while being built
	#[error("invalid definition '{name}': {reason}")]
	InvalidDefinition {
		/// Name the definition was being built under
		name: String,
		/// What was wrong with it
		reason: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cycle_path_renders_with_arrows() {
		// Arrange
		let error = ContainerError::CyclicDependency {
			path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
		};

		// Act
		let message = error.to_string();

		// Assert
		assert_eq!(message, "circular dependency detected: a -> b -> a");
	}

	#[test]
	fn factory_failure_preserves_source() {
		// Arrange
		let source: BeanError = "disk is on fire".into();
		let error = ContainerError::FactoryFailure {
			definition: "repository".to_string(),
			source,
		};

		// Act
		let chained = std::error::Error::source(&error).map(|s| s.to_string());

		// Assert
		assert_eq!(error.to_string(), "factory for bean 'repository' failed");
		assert_eq!(chained.as_deref(), Some("disk is on fire"));
	}
}
