//! The thread-safe container facade

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::context::{self, RequestToken};
use crate::definition::{BeanDefinition, BeanError, BeanInstance, Scope};
use crate::error::{ContainerError, ContainerResult};
use crate::graph::{GraphResolver, PlannedBean, PlannedDep, ResolutionPlan};
use crate::lifecycle::LifecycleManager;
use crate::provider::{BeanProvider, ProviderCore};
use crate::registry::BeanRegistry;
use crate::scope::{PrototypeStore, RequestStore, RequestWindow, SingletonStore};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

enum ContainerState {
	Open,
	Closed,
}

pub(crate) struct ContainerInner {
	id: u64,
	registry: BeanRegistry,
	singletons: SingletonStore,
	prototypes: PrototypeStore,
	requests: RequestStore,
	lifecycle: LifecycleManager,
	state: RwLock<ContainerState>,
	next_request_id: AtomicU64,
}

impl ContainerInner {
	fn close_inner(&self) {
		let mut state = self.state.write();
		if matches!(*state, ContainerState::Closed) {
			return;
		}
		*state = ContainerState::Closed;
		// Teardown runs under the write gate: resolutions in flight held the
		// read side and have finished; new calls observe the closed state.
		self.requests.retire_all(&self.lifecycle);
		self.singletons.close_all(&self.lifecycle);
		tracing::info!(container_id = self.id, "container closed");
	}
}

impl Drop for ContainerInner {
	fn drop(&mut self) {
		self.close_inner();
	}
}

/// Thread-safe container of bean definitions and their instances.
///
/// The container owns every singleton it materializes and tears them down in
/// reverse creation order at [`close`](Container::close) (or on drop of the
/// last handle). Cloning the handle is cheap and every method takes `&self`,
/// so one container may serve many threads.
///
/// Bean factories and lifecycle hooks must not call back into the container;
/// a bean needing late access to another bean takes a deferred provider and
/// calls it after construction.
///
/// # Examples
///
/// ```
/// use primavera_container::{BeanDefinition, Container};
///
/// let container = Container::new();
/// container
/// 	.register(
/// 		BeanDefinition::builder("greeting")
/// 			.factory(|_| Ok(String::from("hello")))
/// 			.build()?,
/// 	)?;
///
/// let greeting = container.get_bean::<String>("greeting")?;
/// assert_eq!(greeting.as_str(), "hello");
/// # Ok::<(), primavera_container::ContainerError>(())
/// ```
#[derive(Clone)]
pub struct Container {
	inner: Arc<ContainerInner>,
}

impl Container {
	/// Creates an empty open container.
	pub fn new() -> Self {
		let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(container_id = id, "container created");
		Self {
			inner: Arc::new(ContainerInner {
				id,
				registry: BeanRegistry::new(),
				singletons: SingletonStore::default(),
				prototypes: PrototypeStore,
				requests: RequestStore::default(),
				lifecycle: LifecycleManager,
				state: RwLock::new(ContainerState::Open),
				next_request_id: AtomicU64::new(1),
			}),
		}
	}

	/// Starts a [`ContainerBuilder`] for declarative assembly.
	pub fn builder() -> ContainerBuilder {
		ContainerBuilder::new()
	}

	pub(crate) fn from_inner(inner: Arc<ContainerInner>) -> Self {
		Self { inner }
	}

	/// Read side of the open/closed gate. Held across a whole resolution
	/// pass so [`close`](Container::close) waits for it.
	fn open_gate(&self) -> ContainerResult<RwLockReadGuard<'_, ContainerState>> {
		let state = self.inner.state.read();
		match *state {
			ContainerState::Open => Ok(state),
			ContainerState::Closed => Err(ContainerError::ContainerClosed),
		}
	}

	/// Registers a definition under its unique name.
	pub fn register(&self, definition: BeanDefinition) -> ContainerResult<()> {
		let _gate = self.open_gate()?;
		self.inner.registry.register(definition)
	}

	/// Resolves the named bean, materializing it and its dependencies as the
	/// involved scopes require.
	pub fn get_bean<T>(&self, name: &str) -> ContainerResult<Arc<T>>
	where
		T: Any + Send + Sync,
	{
		let _gate = self.open_gate()?;
		let definition = self.inner.registry.resolve_by_name(name)?;
		let instance = self.resolve_instance(definition)?;
		downcast::<T>(name, instance)
	}

	/// Resolves the single bean carrying `tag`.
	///
	/// Fails with [`ContainerError::Ambiguous`] when several definitions
	/// carry the tag; disambiguate by name or with a qualified edge.
	pub fn get_bean_by_capability<T>(&self, tag: &str) -> ContainerResult<Arc<T>>
	where
		T: Any + Send + Sync,
	{
		let _gate = self.open_gate()?;
		let definition = self.inner.registry.resolve_by_capability(tag, None)?;
		let name = definition.name().to_string();
		let instance = self.resolve_instance(definition)?;
		downcast::<T>(&name, instance)
	}

	/// Resolves every bean carrying `tag`, keyed by name. An unknown tag
	/// yields an empty map.
	pub fn get_beans_by_capability(&self, tag: &str) -> ContainerResult<HashMap<String, BeanInstance>> {
		let _gate = self.open_gate()?;
		let mut beans = HashMap::new();
		for definition in self.inner.registry.all_by_capability(tag) {
			let name = definition.name().to_string();
			let instance = self.resolve_instance(definition)?;
			beans.insert(name, instance);
		}
		Ok(beans)
	}

	/// Returns a deferred provider for the named bean without materializing
	/// anything.
	pub fn provider<T>(&self, name: &str) -> ContainerResult<BeanProvider<T>>
	where
		T: Any + Send + Sync,
	{
		let _gate = self.open_gate()?;
		let definition = self.inner.registry.resolve_by_name(name)?;
		Ok(BeanProvider::new(ProviderCore {
			container: Arc::downgrade(&self.inner),
			definition,
		}))
	}

	/// Plans every registered definition without constructing anything,
	/// surfacing wiring mistakes (missing targets, ambiguity, cycles, scope
	/// mismatches) before first use.
	pub fn validate(&self) -> ContainerResult<()> {
		let _gate = self.open_gate()?;
		let resolver = GraphResolver::new(&self.inner.registry);
		for name in self.inner.registry.definition_names() {
			resolver.plan(&name)?;
		}
		Ok(())
	}

	/// Names of all registered definitions, sorted.
	pub fn definition_names(&self) -> Vec<String> {
		self.inner.registry.definition_names()
	}

	/// Whether a definition is registered under `name`.
	pub fn contains_bean(&self, name: &str) -> bool {
		self.inner.registry.contains(name)
	}

	/// Opens a request window and associates it with the current thread.
	///
	/// Windows nest: request-scoped resolution binds to the innermost window
	/// begun on the resolving thread.
	pub fn begin_request(&self) -> ContainerResult<RequestToken> {
		let _gate = self.open_gate()?;
		let request = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
		self.inner.requests.begin(request);
		context::push_window(self.inner.id, request);
		tracing::debug!(
			container_id = self.inner.id,
			request_id = request,
			"request window opened"
		);
		Ok(RequestToken::new(self.inner.id, request))
	}

	/// Ends a request window, tearing down its instances in reverse creation
	/// order. Ending a window twice, or after close, is a no-op.
	pub fn end_request(&self, token: &RequestToken) {
		if token.container_id() != self.inner.id {
			tracing::warn!(
				container_id = self.inner.id,
				token_container = token.container_id(),
				"request token belongs to a different container; ignoring"
			);
			return;
		}
		self.inner.requests.end(token.request_id(), &self.inner.lifecycle);
		context::pop_window(self.inner.id, token.request_id());
		tracing::debug!(
			container_id = self.inner.id,
			request_id = token.request_id(),
			"request window closed"
		);
	}

	/// Runs `f` inside a fresh request window, ending it afterwards even if
	/// `f` panics.
	pub fn request_scope<R>(&self, f: impl FnOnce(&RequestToken) -> R) -> ContainerResult<R> {
		let token = self.begin_request()?;
		let guard = WindowGuard {
			container: self,
			token,
		};
		Ok(f(&guard.token))
	}

	/// Closes the container: waits for resolutions in flight, retires any
	/// request window still open, then destroys singletons in reverse
	/// creation order. Closing twice is a no-op.
	pub fn close(&self) {
		self.inner.close_inner();
	}

	fn resolve_instance(&self, definition: Arc<BeanDefinition>) -> ContainerResult<BeanInstance> {
		let plan = GraphResolver::new(&self.inner.registry).plan_definition(definition)?;
		self.realize(&plan, plan.root_index())
	}

	/// Materializes one planned node through its scope's store.
	///
	/// Dependencies are resolved lazily inside the store callbacks, so a
	/// cache hit never touches its subtree.
	fn realize(&self, plan: &ResolutionPlan, index: usize) -> ContainerResult<BeanInstance> {
		let node = &plan.nodes()[index];
		let definition = Arc::clone(&node.definition);
		match definition.scope() {
			Scope::Singleton => self.inner.singletons.acquire(&definition, || {
				let deps = self.resolve_deps(plan, node)?;
				self.inner.lifecycle.construct(&definition, &deps)
			}),
			Scope::Prototype => self.inner.prototypes.acquire(|| {
				let deps = self.resolve_deps(plan, node)?;
				self.inner.lifecycle.construct(&definition, &deps)
			}),
			Scope::Request => {
				let window = self.active_window(definition.name())?;
				self.inner
					.requests
					.acquire(&window, &definition, &self.inner.lifecycle, || {
						self.resolve_deps(plan, node)
					})
			}
		}
	}

	fn active_window(&self, name: &str) -> ContainerResult<Arc<RequestWindow>> {
		context::current_window(self.inner.id, |id| self.inner.requests.is_open(id))
			.and_then(|id| self.inner.requests.window(id))
			.ok_or_else(|| ContainerError::ScopeNotActive {
				name: name.to_string(),
			})
	}

	fn resolve_deps(&self, plan: &ResolutionPlan, node: &PlannedBean) -> ContainerResult<ResolvedDeps> {
		let mut entries = Vec::with_capacity(node.deps.len());
		for dep in &node.deps {
			let entry = match dep {
				PlannedDep::Eager(index) => ResolvedDep::Instance(self.realize(plan, *index)?),
				PlannedDep::Deferred(definition) => ResolvedDep::Provider(ProviderCore {
					container: Arc::downgrade(&self.inner),
					definition: Arc::clone(definition),
				}),
			};
			entries.push(entry);
		}
		Ok(ResolvedDeps {
			owner: node.definition.name().to_string(),
			entries,
		})
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

struct WindowGuard<'a> {
	container: &'a Container,
	token: RequestToken,
}

impl Drop for WindowGuard<'_> {
	fn drop(&mut self) {
		self.container.end_request(&self.token);
	}
}

fn downcast<T>(name: &str, instance: BeanInstance) -> ContainerResult<Arc<T>>
where
	T: Any + Send + Sync,
{
	instance
		.downcast::<T>()
		.map_err(|_| ContainerError::TypeMismatch {
			name: name.to_string(),
			expected: std::any::type_name::<T>(),
		})
}

/// Materialized dependencies handed to a bean factory.
///
/// Entries keep the order the definition declared them. Eager edges are
/// taken with [`get`](ResolvedDeps::get) or [`get_cloned`](ResolvedDeps::get_cloned),
/// deferred edges with [`provider`](ResolvedDeps::provider).
pub struct ResolvedDeps {
	owner: String,
	entries: Vec<ResolvedDep>,
}

pub(crate) enum ResolvedDep {
	Instance(BeanInstance),
	Provider(ProviderCore),
}

impl ResolvedDeps {
	/// Number of declared dependencies.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the bean declared no dependencies.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The eager dependency at `index`, shared.
	pub fn get<T>(&self, index: usize) -> Result<Arc<T>, BeanError>
	where
		T: Any + Send + Sync,
	{
		match self.entry(index)? {
			ResolvedDep::Instance(instance) => {
				instance.clone().downcast::<T>().map_err(|_| -> BeanError {
					format!(
						"dependency {index} of bean '{}' is not of type {}",
						self.owner,
						std::any::type_name::<T>()
					)
					.into()
				})
			}
			ResolvedDep::Provider(_) => Err(format!(
				"dependency {index} of bean '{}' is deferred; take it with provider()",
				self.owner
			)
			.into()),
		}
	}

	/// The eager dependency at `index`, cloned out of its `Arc`. Handy for
	/// cheaply clonable handles such as `Arc<dyn Trait>` values.
	pub fn get_cloned<T>(&self, index: usize) -> Result<T, BeanError>
	where
		T: Any + Send + Sync + Clone,
	{
		Ok(self.get::<T>(index)?.as_ref().clone())
	}

	/// The deferred dependency at `index`, as a provider.
	pub fn provider<T>(&self, index: usize) -> Result<BeanProvider<T>, BeanError>
	where
		T: Any + Send + Sync,
	{
		match self.entry(index)? {
			ResolvedDep::Provider(core) => Ok(BeanProvider::new(core.clone())),
			ResolvedDep::Instance(_) => Err(format!(
				"dependency {index} of bean '{}' is eager; take it with get()",
				self.owner
			)
			.into()),
		}
	}

	fn entry(&self, index: usize) -> Result<&ResolvedDep, BeanError> {
		self.entries.get(index).ok_or_else(|| -> BeanError {
			format!(
				"bean '{}' declared {} dependencies; index {index} is out of range",
				self.owner,
				self.entries.len()
			)
			.into()
		})
	}
}

/// Assembles a [`Container`] from a list of definitions.
///
/// # Examples
///
/// ```
/// use primavera_container::{BeanDefinition, Container};
///
/// let container = Container::builder()
/// 	.bean(
/// 		BeanDefinition::builder("answer")
/// 			.factory(|_| Ok(42u32))
/// 			.build()?,
/// 	)
/// 	.build()?;
///
/// assert_eq!(*container.get_bean::<u32>("answer")?, 42);
/// # Ok::<(), primavera_container::ContainerError>(())
/// ```
pub struct ContainerBuilder {
	definitions: Vec<BeanDefinition>,
}

impl ContainerBuilder {
	pub fn new() -> Self {
		Self {
			definitions: Vec::new(),
		}
	}

	/// Adds a definition to register at build time.
	pub fn bean(mut self, definition: BeanDefinition) -> Self {
		self.definitions.push(definition);
		self
	}

	/// Creates the container and registers every definition in order.
	pub fn build(self) -> ContainerResult<Container> {
		let container = Container::new();
		for definition in self.definitions {
			container.register(definition)?;
		}
		Ok(container)
	}
}

impl Default for ContainerBuilder {
	fn default() -> Self {
		Self::new()
	}
}
