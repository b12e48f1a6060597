//! Deferred bean access for crossing scope boundaries

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use crate::container::{Container, ContainerInner};
use crate::definition::BeanDefinition;
use crate::error::{ContainerError, ContainerResult};

/// Type-erased core shared by every clone of a provider.
#[derive(Clone)]
pub(crate) struct ProviderCore {
	pub(crate) container: Weak<ContainerInner>,
	pub(crate) definition: Arc<BeanDefinition>,
}

/// Deferred accessor for one bean.
///
/// A provider holds no instance. Every [`get`](BeanProvider::get) runs a full
/// resolution against the context active at that moment, which is how a
/// singleton reaches a request-scoped bean: the provider is injected once,
/// and each call observes the caller's current request window.
///
/// Providers keep only a weak reference to their container, so holding one
/// never delays teardown; after close, [`get`](BeanProvider::get) fails with
/// [`ContainerError::ContainerClosed`].
///
/// Calling [`get`](BeanProvider::get) from inside a bean factory is
/// unsupported; take the provider in the factory and call it later.
pub struct BeanProvider<T> {
	core: ProviderCore,
	_marker: PhantomData<fn() -> T>,
}

impl<T> BeanProvider<T>
where
	T: Any + Send + Sync,
{
	pub(crate) fn new(core: ProviderCore) -> Self {
		Self {
			core,
			_marker: PhantomData,
		}
	}

	/// Name of the bean this provider resolves.
	pub fn bean_name(&self) -> &str {
		self.core.definition.name()
	}

	/// Resolves the target bean against the caller's active context.
	pub fn get(&self) -> ContainerResult<Arc<T>> {
		let inner = self
			.core
			.container
			.upgrade()
			.ok_or(ContainerError::ContainerClosed)?;
		Container::from_inner(inner).get_bean(self.core.definition.name())
	}
}

impl<T> Clone for BeanProvider<T> {
	fn clone(&self) -> Self {
		Self {
			core: self.core.clone(),
			_marker: PhantomData,
		}
	}
}

impl<T> fmt::Debug for BeanProvider<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BeanProvider")
			.field("bean", &self.core.definition.name())
			.field("target_type", &std::any::type_name::<T>())
			.finish()
	}
}
