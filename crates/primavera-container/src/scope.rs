//! Scope stores: where materialized instances live, and for how long

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::container::ResolvedDeps;
use crate::definition::{BeanDefinition, BeanInstance};
use crate::error::{ContainerError, ContainerResult};
use crate::lifecycle::LifecycleManager;

/// A retained instance plus what is needed to tear it down later.
struct InstanceRecord {
	definition: Arc<BeanDefinition>,
	instance: BeanInstance,
	created_at: Instant,
}

/// Container-wide cache of singleton instances.
///
/// Each name owns a [`OnceCell`]: concurrent acquirers of an uninitialized
/// singleton block on the cell, exactly one runs the factory, and everyone
/// receives the same instance. A failed construction leaves the cell empty
/// so a later acquire may retry.
#[derive(Default)]
pub(crate) struct SingletonStore {
	cells: RwLock<HashMap<String, Arc<OnceCell<BeanInstance>>>>,
	order: Mutex<Vec<InstanceRecord>>,
}

impl SingletonStore {
	pub(crate) fn acquire(
		&self,
		definition: &Arc<BeanDefinition>,
		construct: impl FnOnce() -> ContainerResult<BeanInstance>,
	) -> ContainerResult<BeanInstance> {
		let cell = self.cell_for(definition.name());
		let instance = cell.get_or_try_init(|| {
			let instance = construct()?;
			self.order.lock().push(InstanceRecord {
				definition: Arc::clone(definition),
				instance: instance.clone(),
				created_at: Instant::now(),
			});
			Ok(instance)
		})?;
		Ok(instance.clone())
	}

	fn cell_for(&self, name: &str) -> Arc<OnceCell<BeanInstance>> {
		if let Some(cell) = self.cells.read().get(name) {
			return Arc::clone(cell);
		}
		let mut cells = self.cells.write();
		Arc::clone(cells.entry(name.to_string()).or_default())
	}

	/// Tears down every retained singleton in reverse creation order.
	pub(crate) fn close_all(&self, lifecycle: &LifecycleManager) {
		let records = std::mem::take(&mut *self.order.lock());
		for record in records.iter().rev() {
			tracing::debug!(
				bean = %record.definition.name(),
				age_ms = record.created_at.elapsed().as_millis() as u64,
				"destroying singleton"
			);
			lifecycle.before_destroy(&record.definition, &record.instance);
		}
		self.cells.write().clear();
	}
}

/// Pass-through store for prototype beans.
///
/// Nothing is retained: every acquire constructs, and the caller owns the
/// result. Pre-destroy hooks are never invoked for prototypes.
#[derive(Default)]
pub(crate) struct PrototypeStore;

impl PrototypeStore {
	pub(crate) fn acquire(
		&self,
		construct: impl FnOnce() -> ContainerResult<BeanInstance>,
	) -> ContainerResult<BeanInstance> {
		construct()
	}
}

/// Per-window cache of request-scoped instances.
struct WindowState {
	retired: bool,
	entries: HashMap<String, BeanInstance>,
	order: Vec<InstanceRecord>,
}

pub(crate) struct RequestWindow {
	id: u64,
	state: Mutex<WindowState>,
}

/// All currently open request windows of one container.
#[derive(Default)]
pub(crate) struct RequestStore {
	windows: Mutex<HashMap<u64, Arc<RequestWindow>>>,
}

impl RequestStore {
	pub(crate) fn begin(&self, id: u64) {
		self.windows.lock().insert(
			id,
			Arc::new(RequestWindow {
				id,
				state: Mutex::new(WindowState {
					retired: false,
					entries: HashMap::new(),
					order: Vec::new(),
				}),
			}),
		);
	}

	pub(crate) fn is_open(&self, id: u64) -> bool {
		self.windows.lock().contains_key(&id)
	}

	pub(crate) fn window(&self, id: u64) -> Option<Arc<RequestWindow>> {
		self.windows.lock().get(&id).cloned()
	}

	/// Returns the window's cached instance for the definition, constructing
	/// it at most once per window.
	///
	/// Dependencies are resolved between the two locked phases, so a request
	/// bean depending on another request bean in the same window never
	/// re-enters the window lock. The recheck in the second phase keeps the
	/// per-window guarantee when two threads race the same name.
	pub(crate) fn acquire(
		&self,
		window: &Arc<RequestWindow>,
		definition: &Arc<BeanDefinition>,
		lifecycle: &LifecycleManager,
		resolve_deps: impl FnOnce() -> ContainerResult<ResolvedDeps>,
	) -> ContainerResult<BeanInstance> {
		let name = definition.name();
		{
			let state = window.state.lock();
			if state.retired {
				return Err(ContainerError::ScopeNotActive {
					name: name.to_string(),
				});
			}
			if let Some(instance) = state.entries.get(name) {
				return Ok(instance.clone());
			}
		}

		let deps = resolve_deps()?;

		let mut state = window.state.lock();
		if state.retired {
			return Err(ContainerError::ScopeNotActive {
				name: name.to_string(),
			});
		}
		if let Some(instance) = state.entries.get(name) {
			return Ok(instance.clone());
		}
		let instance = lifecycle.construct(definition, &deps)?;
		state.entries.insert(name.to_string(), instance.clone());
		state.order.push(InstanceRecord {
			definition: Arc::clone(definition),
			instance: instance.clone(),
			created_at: Instant::now(),
		});
		Ok(instance)
	}

	/// Ends a window, tearing down its instances in reverse creation order.
	/// Ending an already-ended window is a no-op.
	pub(crate) fn end(&self, id: u64, lifecycle: &LifecycleManager) {
		let window = self.windows.lock().remove(&id);
		if let Some(window) = window {
			Self::retire(&window, lifecycle);
		}
	}

	/// Retires every window still open. Called at container close; a window
	/// left open at that point is a caller bug worth surfacing.
	pub(crate) fn retire_all(&self, lifecycle: &LifecycleManager) {
		let windows = std::mem::take(&mut *self.windows.lock());
		for window in windows.into_values() {
			tracing::warn!(
				request_id = window.id,
				"request window still open at container close; retiring"
			);
			Self::retire(&window, lifecycle);
		}
	}

	fn retire(window: &Arc<RequestWindow>, lifecycle: &LifecycleManager) {
		let records = {
			let mut state = window.state.lock();
			if state.retired {
				return;
			}
			state.retired = true;
			state.entries.clear();
			std::mem::take(&mut state.order)
		};
		// Hooks run outside the state lock; a slow hook must not block
		// concurrent acquires from observing the retired flag.
		for record in records.iter().rev() {
			tracing::debug!(
				bean = %record.definition.name(),
				request_id = window.id,
				"destroying request-scoped bean"
			);
			lifecycle.before_destroy(&record.definition, &record.instance);
		}
	}
}
