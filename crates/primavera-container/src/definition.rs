//! Bean definitions and the builder that assembles them

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::container::ResolvedDeps;
use crate::error::{ContainerError, ContainerResult};
use crate::lifecycle::LifecycleHook;

/// Type-erased bean instance shared across the container.
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// Opaque error type returned by factories and lifecycle hooks.
pub type BeanError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased factory invoked with the bean's resolved dependencies.
pub type BeanFactory = Arc<dyn Fn(&ResolvedDeps) -> Result<BeanInstance, BeanError> + Send + Sync>;

/// Lifetime and sharing policy of a bean instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
	/// One shared instance per container, torn down at close
	Singleton,
	/// A fresh instance per resolution, owned by the caller afterwards
	Prototype,
	/// One instance per request window, torn down when the window ends
	Request,
}

impl Scope {
	/// Relative lifetime rank used by the direct-dependency check.
	///
	/// Request and prototype rank equally: a prototype handed to a
	/// request-scoped bean is owned by it and lives exactly as long.
	fn lifetime_rank(self) -> u8 {
		match self {
			Scope::Singleton => 2,
			Scope::Request | Scope::Prototype => 1,
		}
	}

	/// Whether a bean of this scope may hold a `dependency` instance
	/// directly, rather than through a deferred provider.
	pub(crate) fn may_hold(self, dependency: Scope) -> bool {
		self.lifetime_rank() <= dependency.lifetime_rank()
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Singleton => f.write_str("singleton"),
			Scope::Prototype => f.write_str("prototype"),
			Scope::Request => f.write_str("request"),
		}
	}
}

/// A declared dependency edge of a definition.
///
/// Edges are ordered: the factory receives its dependencies at the same
/// indices they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
	/// Materialize the named definition before the dependent's factory runs
	Name(String),
	/// Materialize the single definition carrying `tag`, optionally narrowed
	/// to one name when several definitions share the tag
	Capability {
		tag: String,
		qualifier: Option<String>,
	},
	/// Hand the factory a deferred provider for the named definition instead
	/// of a materialized instance
	Deferred(String),
}

/// Immutable description of one constructible unit.
///
/// A definition carries everything the container needs to build and manage
/// instances of a bean: its unique name, the capability tags it satisfies,
/// its scope, its ordered dependency edges, the factory, and optional
/// lifecycle hooks. Definitions are assembled through [`BeanDefinition::builder`]
/// and never change once registered.
pub struct BeanDefinition {
	name: String,
	capabilities: BTreeSet<String>,
	scope: Scope,
	dependencies: Vec<DependencyRef>,
	factory: BeanFactory,
	post_construct: Option<LifecycleHook>,
	pre_destroy: Option<LifecycleHook>,
}

impl BeanDefinition {
	/// Starts building a definition under the given unique name.
	///
	/// The scope defaults to [`Scope::Singleton`].
	///
	/// # Examples
	///
	/// ```
	/// use primavera_container::BeanDefinition;
	///
	/// let definition = BeanDefinition::builder("greeting")
	/// 	.factory(|_| Ok(String::from("hello")))
	/// 	.build()
	/// 	.unwrap();
	///
	/// assert_eq!(definition.name(), "greeting");
	/// ```
	pub fn builder(name: impl Into<String>) -> BeanDefinitionBuilder {
		BeanDefinitionBuilder {
			name: name.into(),
			capabilities: BTreeSet::new(),
			scope: Scope::Singleton,
			dependencies: Vec::new(),
			factory: None,
			post_construct: None,
			pre_destroy: None,
		}
	}

	/// Unique name of this definition within its registry.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Scope governing instance lifetime and sharing.
	pub fn scope(&self) -> Scope {
		self.scope
	}

	/// Capability tags this definition satisfies, in sorted order.
	pub fn capabilities(&self) -> impl Iterator<Item = &str> {
		self.capabilities.iter().map(String::as_str)
	}

	/// Whether this definition satisfies `tag`.
	pub fn has_capability(&self, tag: &str) -> bool {
		self.capabilities.contains(tag)
	}

	/// Declared dependency edges, in the order the factory receives them.
	pub fn dependencies(&self) -> &[DependencyRef] {
		&self.dependencies
	}

	pub(crate) fn factory(&self) -> &BeanFactory {
		&self.factory
	}

	pub(crate) fn post_construct(&self) -> Option<&LifecycleHook> {
		self.post_construct.as_ref()
	}

	pub(crate) fn pre_destroy(&self) -> Option<&LifecycleHook> {
		self.pre_destroy.as_ref()
	}

	pub(crate) fn has_pre_destroy(&self) -> bool {
		self.pre_destroy.is_some()
	}
}

impl fmt::Debug for BeanDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BeanDefinition")
			.field("name", &self.name)
			.field("scope", &self.scope)
			.field("capabilities", &self.capabilities)
			.field("dependencies", &self.dependencies)
			.finish_non_exhaustive()
	}
}

/// Assembles a [`BeanDefinition`] step by step.
///
/// The factory receives a [`ResolvedDeps`] view of its materialized
/// dependencies and must be a pure function of them: calling back into the
/// container from inside a factory is unsupported.
///
/// # Examples
///
/// ```
/// use primavera_container::{BeanDefinition, Scope};
///
/// let definition = BeanDefinition::builder("counter")
/// 	.prototype()
/// 	.capability("counting")
/// 	.factory(|_| Ok(0u64))
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(definition.scope(), Scope::Prototype);
/// assert!(definition.has_capability("counting"));
/// ```
pub struct BeanDefinitionBuilder {
	name: String,
	capabilities: BTreeSet<String>,
	scope: Scope,
	dependencies: Vec<DependencyRef>,
	factory: Option<BeanFactory>,
	post_construct: Option<LifecycleHook>,
	pre_destroy: Option<LifecycleHook>,
}

impl BeanDefinitionBuilder {
	/// Sets the scope explicitly.
	pub fn scope(mut self, scope: Scope) -> Self {
		self.scope = scope;
		self
	}

	/// Marks the bean singleton-scoped (the default).
	pub fn singleton(self) -> Self {
		self.scope(Scope::Singleton)
	}

	/// Marks the bean prototype-scoped.
	pub fn prototype(self) -> Self {
		self.scope(Scope::Prototype)
	}

	/// Marks the bean request-scoped.
	pub fn request_scoped(self) -> Self {
		self.scope(Scope::Request)
	}

	/// Adds a capability tag this bean satisfies.
	pub fn capability(mut self, tag: impl Into<String>) -> Self {
		self.capabilities.insert(tag.into());
		self
	}

	/// Declares a dependency on the named bean.
	pub fn depends_on(mut self, name: impl Into<String>) -> Self {
		self.dependencies.push(DependencyRef::Name(name.into()));
		self
	}

	/// Declares a dependency on the single bean carrying `tag`.
	pub fn depends_on_capability(mut self, tag: impl Into<String>) -> Self {
		self.dependencies.push(DependencyRef::Capability {
			tag: tag.into(),
			qualifier: None,
		});
		self
	}

	/// Declares a dependency on the bean named `name` among those carrying
	/// `tag`, disambiguating when several definitions share the tag.
	pub fn depends_on_qualified(mut self, tag: impl Into<String>, name: impl Into<String>) -> Self {
		self.dependencies.push(DependencyRef::Capability {
			tag: tag.into(),
			qualifier: Some(name.into()),
		});
		self
	}

	/// Declares a deferred dependency on the named bean.
	///
	/// The factory receives a provider for the target instead of an
	/// instance, taken with [`ResolvedDeps::provider`]. Deferred edges are
	/// how a longer-lived bean reaches a shorter-lived one.
	pub fn depends_on_deferred(mut self, name: impl Into<String>) -> Self {
		self.dependencies.push(DependencyRef::Deferred(name.into()));
		self
	}

	/// Sets the factory producing instances of this bean.
	pub fn factory<T, F>(mut self, factory: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&ResolvedDeps) -> Result<T, BeanError> + Send + Sync + 'static,
	{
		self.factory = Some(Arc::new(move |deps: &ResolvedDeps| {
			factory(deps).map(|value| Arc::new(value) as BeanInstance)
		}));
		self
	}

	/// Sets a hook run exactly once per instance, after the factory returns
	/// and every dependency is fully constructed, before the instance
	/// reaches any consumer. A failing hook fails the construction.
	pub fn on_post_construct<T, F>(mut self, hook: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&T) -> Result<(), BeanError> + Send + Sync + 'static,
	{
		self.post_construct = Some(typed_hook(hook));
		self
	}

	/// Sets a hook run exactly once per owned instance at its scope's
	/// teardown point. Failures are logged and never abort teardown.
	///
	/// Prototype instances are never tracked, so a pre-destroy hook on a
	/// prototype bean is accepted but will not be invoked.
	pub fn on_pre_destroy<T, F>(mut self, hook: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&T) -> Result<(), BeanError> + Send + Sync + 'static,
	{
		self.pre_destroy = Some(typed_hook(hook));
		self
	}

	/// Finishes the definition.
	pub fn build(self) -> ContainerResult<BeanDefinition> {
		if self.name.is_empty() {
			return Err(ContainerError::InvalidDefinition {
				name: self.name,
				reason: "name must not be empty".to_string(),
			});
		}
		let Some(factory) = self.factory else {
			return Err(ContainerError::InvalidDefinition {
				name: self.name,
				reason: "a factory is required".to_string(),
			});
		};
		Ok(BeanDefinition {
			name: self.name,
			capabilities: self.capabilities,
			scope: self.scope,
			dependencies: self.dependencies,
			factory,
			post_construct: self.post_construct,
			pre_destroy: self.pre_destroy,
		})
	}
}

/// Wraps a typed hook into the erased form stored on the definition.
fn typed_hook<T, F>(hook: F) -> LifecycleHook
where
	T: Any + Send + Sync,
	F: Fn(&T) -> Result<(), BeanError> + Send + Sync + 'static,
{
	Arc::new(move |instance: &BeanInstance| {
		let typed = instance.downcast_ref::<T>().ok_or_else(|| -> BeanError {
			format!(
				"lifecycle hook expected an instance of {}",
				std::any::type_name::<T>()
			)
			.into()
		})?;
		hook(typed)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn builder_defaults_to_singleton() {
		// Arrange & Act
		let definition = BeanDefinition::builder("plain")
			.factory(|_| Ok(1u8))
			.build()
			.unwrap();

		// Assert
		assert_eq!(definition.scope(), Scope::Singleton);
		assert!(definition.dependencies().is_empty());
	}

	#[rstest]
	fn builder_records_dependency_order() {
		// Arrange & Act
		let definition = BeanDefinition::builder("service")
			.depends_on("repository")
			.depends_on_capability("policy")
			.depends_on_deferred("logger")
			.factory(|_| Ok(()))
			.build()
			.unwrap();

		// Assert
		assert_eq!(
			definition.dependencies(),
			&[
				DependencyRef::Name("repository".to_string()),
				DependencyRef::Capability {
					tag: "policy".to_string(),
					qualifier: None,
				},
				DependencyRef::Deferred("logger".to_string()),
			]
		);
	}

	#[rstest]
	fn build_without_factory_is_rejected() {
		// Arrange & Act
		let result = BeanDefinition::builder("hollow").build();

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::InvalidDefinition { name, .. }) if name == "hollow"
		));
	}

	#[rstest]
	fn build_with_empty_name_is_rejected() {
		// Arrange & Act
		let result = BeanDefinition::builder("").factory(|_| Ok(())).build();

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::InvalidDefinition { .. })
		));
	}

	#[rstest]
	#[case(Scope::Singleton, Scope::Singleton, true)]
	#[case(Scope::Singleton, Scope::Request, false)]
	#[case(Scope::Singleton, Scope::Prototype, false)]
	#[case(Scope::Request, Scope::Singleton, true)]
	#[case(Scope::Request, Scope::Request, true)]
	#[case(Scope::Request, Scope::Prototype, true)]
	#[case(Scope::Prototype, Scope::Singleton, true)]
	#[case(Scope::Prototype, Scope::Request, true)]
	#[case(Scope::Prototype, Scope::Prototype, true)]
	fn direct_holding_rules(#[case] dependent: Scope, #[case] dependency: Scope, #[case] allowed: bool) {
		// Act & Assert
		assert_eq!(dependent.may_hold(dependency), allowed);
	}

	#[rstest]
	fn capabilities_iterate_sorted() {
		// Arrange
		let definition = BeanDefinition::builder("tagged")
			.capability("zeta")
			.capability("alpha")
			.factory(|_| Ok(()))
			.build()
			.unwrap();

		// Act
		let tags: Vec<&str> = definition.capabilities().collect();

		// Assert
		assert_eq!(tags, vec!["alpha", "zeta"]);
	}
}
