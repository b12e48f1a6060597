//! Bean definition registry

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::definition::{BeanDefinition, Scope};
use crate::error::{ContainerError, ContainerResult};

#[derive(Default)]
struct RegistryState {
	definitions: HashMap<String, Arc<BeanDefinition>>,
	by_capability: HashMap<String, BTreeSet<String>>,
}

/// Thread-safe table of registered bean definitions.
///
/// Names are unique; capability tags may be shared by several definitions,
/// and a capability lookup that matches more than one definition without a
/// qualifying name is an error.
pub struct BeanRegistry {
	state: RwLock<RegistryState>,
}

impl BeanRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			state: RwLock::new(RegistryState::default()),
		}
	}

	/// Registers a definition, rejecting duplicate names.
	pub fn register(&self, definition: BeanDefinition) -> ContainerResult<()> {
		let mut state = self.state.write();
		if state.definitions.contains_key(definition.name()) {
			return Err(ContainerError::DuplicateName {
				name: definition.name().to_string(),
			});
		}
		if definition.scope() == Scope::Prototype && definition.has_pre_destroy() {
			tracing::warn!(
				bean = %definition.name(),
				"prototype bean declares a pre-destroy hook; prototypes are never tracked and the hook will not run"
			);
		}
		let name = definition.name().to_string();
		for tag in definition.capabilities() {
			state
				.by_capability
				.entry(tag.to_string())
				.or_default()
				.insert(name.clone());
		}
		state.definitions.insert(name.clone(), Arc::new(definition));
		tracing::debug!(bean = %name, "registered bean definition");
		Ok(())
	}

	/// Looks up a definition by name.
	pub fn resolve_by_name(&self, name: &str) -> ContainerResult<Arc<BeanDefinition>> {
		self.state
			.read()
			.definitions
			.get(name)
			.cloned()
			.ok_or_else(|| ContainerError::NoSuchBean {
				name: name.to_string(),
			})
	}

	/// Looks up the single definition carrying `tag`.
	///
	/// A `qualifier` narrows the lookup to that definition name first; the
	/// named definition must itself carry the tag. Zero matches fail with
	/// `NoSuchBean`; more than one match without a qualifier fails with
	/// `Ambiguous`, carrying the conflicting names.
	pub fn resolve_by_capability(
		&self,
		tag: &str,
		qualifier: Option<&str>,
	) -> ContainerResult<Arc<BeanDefinition>> {
		let state = self.state.read();
		let Some(names) = state.by_capability.get(tag) else {
			return Err(ContainerError::NoSuchBean {
				name: tag.to_string(),
			});
		};
		if let Some(qualifier) = qualifier {
			if !names.contains(qualifier) {
				return Err(ContainerError::NoSuchBean {
					name: qualifier.to_string(),
				});
			}
			return state
				.definitions
				.get(qualifier)
				.cloned()
				.ok_or_else(|| ContainerError::NoSuchBean {
					name: qualifier.to_string(),
				});
		}
		let mut matches = names.iter();
		match (matches.next(), matches.next()) {
			(Some(name), None) => state.definitions.get(name).cloned().ok_or_else(|| {
				ContainerError::NoSuchBean {
					name: name.to_string(),
				}
			}),
			(Some(_), Some(_)) => Err(ContainerError::Ambiguous {
				capability: tag.to_string(),
				candidates: names.iter().cloned().collect(),
			}),
			(None, _) => Err(ContainerError::NoSuchBean {
				name: tag.to_string(),
			}),
		}
	}

	/// All definitions carrying `tag`, sorted by name. May be empty.
	pub fn all_by_capability(&self, tag: &str) -> Vec<Arc<BeanDefinition>> {
		let state = self.state.read();
		let Some(names) = state.by_capability.get(tag) else {
			return Vec::new();
		};
		names
			.iter()
			.filter_map(|name| state.definitions.get(name).cloned())
			.collect()
	}

	/// Registered definition names, sorted.
	pub fn definition_names(&self) -> Vec<String> {
		let state = self.state.read();
		let mut names: Vec<String> = state.definitions.keys().cloned().collect();
		names.sort();
		names
	}

	/// Whether a definition named `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.state.read().definitions.contains_key(name)
	}

	/// Number of registered definitions.
	pub fn len(&self) -> usize {
		self.state.read().definitions.len()
	}

	/// Whether the registry holds no definitions.
	pub fn is_empty(&self) -> bool {
		self.state.read().definitions.is_empty()
	}
}

impl Default for BeanRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn definition(name: &str, capabilities: &[&str]) -> BeanDefinition {
		let mut builder = BeanDefinition::builder(name).factory(|_| Ok(()));
		for tag in capabilities {
			builder = builder.capability(*tag);
		}
		builder.build().unwrap()
	}

	#[rstest]
	fn register_then_resolve_by_name() {
		// Arrange
		let registry = BeanRegistry::new();
		registry.register(definition("repository", &[])).unwrap();

		// Act
		let resolved = registry.resolve_by_name("repository").unwrap();

		// Assert
		assert_eq!(resolved.name(), "repository");
		assert!(registry.contains("repository"));
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn duplicate_name_is_rejected() {
		// Arrange
		let registry = BeanRegistry::new();
		registry.register(definition("repository", &[])).unwrap();

		// Act
		let result = registry.register(definition("repository", &[]));

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::DuplicateName { name }) if name == "repository"
		));
	}

	#[rstest]
	fn missing_name_fails() {
		// Arrange
		let registry = BeanRegistry::new();

		// Act
		let result = registry.resolve_by_name("ghost");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::NoSuchBean { name }) if name == "ghost"
		));
	}

	#[rstest]
	fn capability_with_single_match_resolves() {
		// Arrange
		let registry = BeanRegistry::new();
		registry
			.register(definition("rate-policy", &["policy"]))
			.unwrap();

		// Act
		let resolved = registry.resolve_by_capability("policy", None).unwrap();

		// Assert
		assert_eq!(resolved.name(), "rate-policy");
	}

	#[rstest]
	fn capability_with_two_matches_is_ambiguous() {
		// Arrange
		let registry = BeanRegistry::new();
		registry
			.register(definition("rate-policy", &["policy"]))
			.unwrap();
		registry
			.register(definition("fix-policy", &["policy"]))
			.unwrap();

		// Act
		let result = registry.resolve_by_capability("policy", None);

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::Ambiguous { capability, candidates })
				if capability == "policy"
					&& candidates == vec!["fix-policy".to_string(), "rate-policy".to_string()]
		));
	}

	#[rstest]
	fn qualifier_disambiguates() {
		// Arrange
		let registry = BeanRegistry::new();
		registry
			.register(definition("rate-policy", &["policy"]))
			.unwrap();
		registry
			.register(definition("fix-policy", &["policy"]))
			.unwrap();

		// Act
		let resolved = registry
			.resolve_by_capability("policy", Some("fix-policy"))
			.unwrap();

		// Assert
		assert_eq!(resolved.name(), "fix-policy");
	}

	#[rstest]
	fn qualifier_must_carry_the_tag() {
		// Arrange
		let registry = BeanRegistry::new();
		registry
			.register(definition("rate-policy", &["policy"]))
			.unwrap();
		registry.register(definition("repository", &[])).unwrap();

		// Act: "repository" exists but does not satisfy "policy"
		let result = registry.resolve_by_capability("policy", Some("repository"));

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::NoSuchBean { name }) if name == "repository"
		));
	}

	#[rstest]
	fn unknown_capability_fails() {
		// Arrange
		let registry = BeanRegistry::new();

		// Act
		let result = registry.resolve_by_capability("policy", None);

		// Assert
		assert!(matches!(result, Err(ContainerError::NoSuchBean { .. })));
	}

	#[rstest]
	fn all_by_capability_returns_every_match_sorted() {
		// Arrange
		let registry = BeanRegistry::new();
		registry
			.register(definition("rate-policy", &["policy"]))
			.unwrap();
		registry
			.register(definition("fix-policy", &["policy"]))
			.unwrap();
		registry.register(definition("repository", &[])).unwrap();

		// Act
		let matches = registry.all_by_capability("policy");
		let names: Vec<&str> = matches.iter().map(|d| d.name()).collect();

		// Assert
		assert_eq!(names, vec!["fix-policy", "rate-policy"]);
		assert!(registry.all_by_capability("unknown").is_empty());
	}

	#[rstest]
	fn definition_names_are_sorted() {
		// Arrange
		let registry = BeanRegistry::new();
		registry.register(definition("zeta", &[])).unwrap();
		registry.register(definition("alpha", &[])).unwrap();

		// Act
		let names = registry.definition_names();

		// Assert
		assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
	}
}
