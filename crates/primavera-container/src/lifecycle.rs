//! Construction and teardown hooks around bean instances

use std::sync::Arc;

use crate::container::ResolvedDeps;
use crate::definition::{BeanDefinition, BeanError, BeanInstance};
use crate::error::{ContainerError, ContainerResult};

/// Type-erased lifecycle hook attached to a definition.
pub type LifecycleHook = Arc<dyn Fn(&BeanInstance) -> Result<(), BeanError> + Send + Sync>;

/// Runs factories and lifecycle hooks with uniform error mapping.
#[derive(Default)]
pub(crate) struct LifecycleManager;

impl LifecycleManager {
	/// Builds one instance: the factory first, then the post-construct hook.
	///
	/// A failing hook fails the whole construction, so no consumer ever sees
	/// an instance whose post-construct did not complete.
	pub(crate) fn construct(
		&self,
		definition: &BeanDefinition,
		deps: &ResolvedDeps,
	) -> ContainerResult<BeanInstance> {
		let factory = definition.factory();
		let instance = factory(deps).map_err(|source| ContainerError::FactoryFailure {
			definition: definition.name().to_string(),
			source,
		})?;
		if let Some(hook) = definition.post_construct() {
			hook(&instance).map_err(|source| ContainerError::PostConstructFailure {
				definition: definition.name().to_string(),
				source,
			})?;
		}
		tracing::debug!(
			bean = %definition.name(),
			scope = %definition.scope(),
			"constructed bean"
		);
		Ok(instance)
	}

	/// Runs the pre-destroy hook, if any. Hook failures are logged and
	/// swallowed so teardown always reaches every remaining instance.
	pub(crate) fn before_destroy(&self, definition: &BeanDefinition, instance: &BeanInstance) {
		if let Some(hook) = definition.pre_destroy()
			&& let Err(error) = hook(instance)
		{
			tracing::warn!(
				bean = %definition.name(),
				error = %error,
				"pre-destroy hook failed; continuing teardown"
			);
		}
	}
}
