//! Dependency graph planning and cycle detection
//!
//! Planning is purely structural: it orders definitions so that every eager
//! dependency is materialized before its dependent, and rejects graphs no
//! order can satisfy. Whether a planned definition is constructed or reused
//! is the scope stores' decision at materialization time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::definition::{BeanDefinition, DependencyRef};
use crate::error::{ContainerError, ContainerResult};
use crate::registry::BeanRegistry;

/// Maximum resolution depth (prevents pathological chains)
pub(crate) const MAX_RESOLUTION_DEPTH: usize = 100;

/// One definition in a resolution plan, with its planned edges.
pub(crate) struct PlannedBean {
	pub(crate) definition: Arc<BeanDefinition>,
	pub(crate) deps: Vec<PlannedDep>,
}

/// A planned dependency edge.
pub(crate) enum PlannedDep {
	/// Materialize the node at this index before the dependent's factory runs
	Eager(usize),
	/// Hand the factory a provider for this definition; the target is
	/// re-resolved at call time, not during this plan
	Deferred(Arc<BeanDefinition>),
}

/// Dependency-ordered plan for one root definition.
///
/// Nodes are stored dependencies-first and deduplicated by name: every eager
/// edge points at a smaller index, so a definition reached twice in one
/// traversal is planned (and later acquired) once.
pub struct ResolutionPlan {
	nodes: Vec<PlannedBean>,
	root: usize,
}

impl ResolutionPlan {
	pub(crate) fn nodes(&self) -> &[PlannedBean] {
		&self.nodes
	}

	pub(crate) fn root_index(&self) -> usize {
		self.root
	}

	/// Name of the plan's root definition.
	pub fn root_name(&self) -> &str {
		self.nodes[self.root].definition.name()
	}

	/// Definition names in instantiation order, dependencies first.
	pub fn instantiation_order(&self) -> Vec<&str> {
		self.nodes
			.iter()
			.map(|node| node.definition.name())
			.collect()
	}

	/// Number of distinct definitions in the plan.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the plan holds no definitions. A successfully built plan
	/// always contains at least its root.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Plans instantiation order by depth-first traversal of declared edges.
///
/// A definition already on the in-progress path signals a cycle, reported
/// with the full path from the cycle's first participant back to itself.
pub struct GraphResolver<'a> {
	registry: &'a BeanRegistry,
}

impl<'a> GraphResolver<'a> {
	pub fn new(registry: &'a BeanRegistry) -> Self {
		Self { registry }
	}

	/// Plans resolution of the named root definition.
	pub fn plan(&self, root: &str) -> ContainerResult<ResolutionPlan> {
		let definition = self.registry.resolve_by_name(root)?;
		self.plan_definition(definition)
	}

	/// Plans resolution starting from an already-resolved definition.
	pub fn plan_definition(&self, root: Arc<BeanDefinition>) -> ContainerResult<ResolutionPlan> {
		let mut walk = Walk {
			registry: self.registry,
			nodes: Vec::new(),
			planned: HashMap::new(),
			visiting: HashSet::new(),
			path: Vec::new(),
		};
		let root_index = walk.visit(root)?;
		Ok(ResolutionPlan {
			nodes: walk.nodes,
			root: root_index,
		})
	}
}

struct Walk<'a> {
	registry: &'a BeanRegistry,
	nodes: Vec<PlannedBean>,
	planned: HashMap<String, usize>,
	visiting: HashSet<String>,
	path: Vec<String>,
}

impl Walk<'_> {
	fn visit(&mut self, definition: Arc<BeanDefinition>) -> ContainerResult<usize> {
		let name = definition.name().to_string();
		if let Some(&index) = self.planned.get(&name) {
			return Ok(index);
		}
		if self.visiting.contains(&name) {
			return Err(ContainerError::CyclicDependency {
				path: self.cycle_path(&name),
			});
		}
		if self.path.len() >= MAX_RESOLUTION_DEPTH {
			return Err(ContainerError::ResolutionDepthExceeded {
				limit: MAX_RESOLUTION_DEPTH,
			});
		}

		self.visiting.insert(name.clone());
		self.path.push(name.clone());
		let visited = self.visit_dependencies(&definition);
		self.path.pop();
		self.visiting.remove(&name);

		let deps = visited?;
		let index = self.nodes.len();
		self.nodes.push(PlannedBean { definition, deps });
		self.planned.insert(name, index);
		Ok(index)
	}

	fn visit_dependencies(
		&mut self,
		definition: &BeanDefinition,
	) -> ContainerResult<Vec<PlannedDep>> {
		let mut deps = Vec::with_capacity(definition.dependencies().len());
		for reference in definition.dependencies() {
			let planned = match reference {
				DependencyRef::Name(name) => {
					let target = self.registry.resolve_by_name(name)?;
					self.eager(definition, target)?
				}
				DependencyRef::Capability { tag, qualifier } => {
					let target = self
						.registry
						.resolve_by_capability(tag, qualifier.as_deref())?;
					self.eager(definition, target)?
				}
				DependencyRef::Deferred(name) => {
					// Only existence is checked here; the provider re-resolves
					// the target against the context active at call time.
					PlannedDep::Deferred(self.registry.resolve_by_name(name)?)
				}
			};
			deps.push(planned);
		}
		Ok(deps)
	}

	fn eager(
		&mut self,
		dependent: &BeanDefinition,
		target: Arc<BeanDefinition>,
	) -> ContainerResult<PlannedDep> {
		if !dependent.scope().may_hold(target.scope()) {
			return Err(ContainerError::ScopeMismatch {
				dependent: dependent.name().to_string(),
				dependent_scope: dependent.scope(),
				dependency: target.name().to_string(),
				dependency_scope: target.scope(),
			});
		}
		Ok(PlannedDep::Eager(self.visit(target)?))
	}

	fn cycle_path(&self, offender: &str) -> Vec<String> {
		match self.path.iter().position(|name| name == offender) {
			Some(start) => {
				let mut cycle = self.path[start..].to_vec();
				cycle.push(offender.to_string());
				cycle
			}
			None => vec![offender.to_string()],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::Scope;
	use rstest::rstest;

	fn registry_with(definitions: Vec<BeanDefinition>) -> BeanRegistry {
		let registry = BeanRegistry::new();
		for definition in definitions {
			registry.register(definition).unwrap();
		}
		registry
	}

	fn leaf(name: &str) -> BeanDefinition {
		BeanDefinition::builder(name).factory(|_| Ok(())).build().unwrap()
	}

	fn depending(name: &str, deps: &[&str]) -> BeanDefinition {
		let mut builder = BeanDefinition::builder(name);
		for dep in deps {
			builder = builder.depends_on(*dep);
		}
		builder.factory(|_| Ok(())).build().unwrap()
	}

	#[rstest]
	fn chain_plans_dependencies_first() {
		// Arrange: a -> b -> c
		let registry = registry_with(vec![
			depending("a", &["b"]),
			depending("b", &["c"]),
			leaf("c"),
		]);

		// Act
		let plan = GraphResolver::new(&registry).plan("a").unwrap();

		// Assert
		assert_eq!(plan.instantiation_order(), vec!["c", "b", "a"]);
		assert_eq!(plan.root_name(), "a");
	}

	#[rstest]
	fn diamond_plans_shared_dependency_once() {
		// Arrange: a -> (b, c), b -> d, c -> d
		let registry = registry_with(vec![
			depending("a", &["b", "c"]),
			depending("b", &["d"]),
			depending("c", &["d"]),
			leaf("d"),
		]);

		// Act
		let plan = GraphResolver::new(&registry).plan("a").unwrap();

		// Assert: d appears exactly once, before b and c
		assert_eq!(plan.instantiation_order(), vec!["d", "b", "c", "a"]);
		assert_eq!(plan.len(), 4);
	}

	#[rstest]
	fn mutual_dependency_reports_cycle_path() {
		// Arrange: a -> b -> a
		let registry = registry_with(vec![depending("a", &["b"]), depending("b", &["a"])]);

		// Act
		let result = GraphResolver::new(&registry).plan("a");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::CyclicDependency { path })
				if path == vec!["a".to_string(), "b".to_string(), "a".to_string()]
		));
	}

	#[rstest]
	fn self_dependency_is_a_cycle() {
		// Arrange
		let registry = registry_with(vec![depending("a", &["a"])]);

		// Act
		let result = GraphResolver::new(&registry).plan("a");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::CyclicDependency { path })
				if path == vec!["a".to_string(), "a".to_string()]
		));
	}

	#[rstest]
	fn cycle_deeper_in_the_graph_names_only_the_loop() {
		// Arrange: root -> a -> b -> c -> a
		let registry = registry_with(vec![
			depending("root", &["a"]),
			depending("a", &["b"]),
			depending("b", &["c"]),
			depending("c", &["a"]),
		]);

		// Act
		let result = GraphResolver::new(&registry).plan("root");

		// Assert: "root" is not part of the reported cycle
		assert!(matches!(
			result,
			Err(ContainerError::CyclicDependency { path })
				if path == ["a", "b", "c", "a"].map(String::from).to_vec()
		));
	}

	#[rstest]
	fn missing_dependency_fails_with_no_such_bean() {
		// Arrange
		let registry = registry_with(vec![depending("a", &["ghost"])]);

		// Act
		let result = GraphResolver::new(&registry).plan("a");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::NoSuchBean { name }) if name == "ghost"
		));
	}

	#[rstest]
	fn capability_edges_resolve_through_the_registry() {
		// Arrange
		let registry = registry_with(vec![
			BeanDefinition::builder("rate-policy")
				.capability("policy")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("service")
				.depends_on_capability("policy")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let plan = GraphResolver::new(&registry).plan("service").unwrap();

		// Assert
		assert_eq!(plan.instantiation_order(), vec!["rate-policy", "service"]);
	}

	#[rstest]
	fn ambiguous_capability_edge_propagates() {
		// Arrange
		let registry = registry_with(vec![
			BeanDefinition::builder("rate-policy")
				.capability("policy")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("fix-policy")
				.capability("policy")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("service")
				.depends_on_capability("policy")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let result = GraphResolver::new(&registry).plan("service");

		// Assert
		assert!(matches!(result, Err(ContainerError::Ambiguous { .. })));
	}

	#[rstest]
	fn singleton_holding_request_bean_directly_is_rejected() {
		// Arrange
		let registry = registry_with(vec![
			BeanDefinition::builder("logger")
				.request_scoped()
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("service")
				.depends_on("logger")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let result = GraphResolver::new(&registry).plan("service");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::ScopeMismatch {
				dependent,
				dependent_scope: Scope::Singleton,
				dependency,
				dependency_scope: Scope::Request,
			}) if dependent == "service" && dependency == "logger"
		));
	}

	#[rstest]
	fn singleton_holding_prototype_directly_is_rejected() {
		// Arrange
		let registry = registry_with(vec![
			BeanDefinition::builder("counter")
				.prototype()
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("service")
				.depends_on("counter")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let result = GraphResolver::new(&registry).plan("service");

		// Assert
		assert!(matches!(result, Err(ContainerError::ScopeMismatch { .. })));
	}

	#[rstest]
	fn deferred_edge_crosses_scopes_without_mismatch() {
		// Arrange: singleton -> (deferred) request bean
		let registry = registry_with(vec![
			BeanDefinition::builder("logger")
				.request_scoped()
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("service")
				.depends_on_deferred("logger")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let plan = GraphResolver::new(&registry).plan("service").unwrap();

		// Assert: the deferred target is not part of the instantiation order
		assert_eq!(plan.instantiation_order(), vec!["service"]);
	}

	#[rstest]
	fn deferred_edge_still_requires_the_target_to_exist() {
		// Arrange
		let registry = registry_with(vec![
			BeanDefinition::builder("service")
				.depends_on_deferred("ghost")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let result = GraphResolver::new(&registry).plan("service");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::NoSuchBean { name }) if name == "ghost"
		));
	}

	#[rstest]
	fn request_bean_may_hold_prototype_directly() {
		// Arrange: each window's bean owns its prototype for the window
		let registry = registry_with(vec![
			BeanDefinition::builder("scratch")
				.prototype()
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
			BeanDefinition::builder("handler")
				.request_scoped()
				.depends_on("scratch")
				.factory(|_| Ok(()))
				.build()
				.unwrap(),
		]);

		// Act
		let plan = GraphResolver::new(&registry).plan("handler").unwrap();

		// Assert
		assert_eq!(plan.instantiation_order(), vec!["scratch", "handler"]);
	}

	#[rstest]
	fn depth_limit_rejects_pathological_chains() {
		// Arrange: bean-0 -> bean-1 -> ... -> bean-149
		let registry = BeanRegistry::new();
		for index in 0..150 {
			let mut builder = BeanDefinition::builder(format!("bean-{index}"));
			if index < 149 {
				builder = builder.depends_on(format!("bean-{}", index + 1));
			}
			registry.register(builder.factory(|_| Ok(())).build().unwrap()).unwrap();
		}

		// Act
		let result = GraphResolver::new(&registry).plan("bean-0");

		// Assert
		assert!(matches!(
			result,
			Err(ContainerError::ResolutionDepthExceeded { limit: MAX_RESOLUTION_DEPTH })
		));
	}
}
