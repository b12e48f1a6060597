//! # Primavera Container
//!
//! Bean registry, dependency-graph resolution, scope stores, and the
//! thread-safe container facade.
//!
//! ## Features
//!
//! - **Declarative wiring**: beans are registered as [`BeanDefinition`]s
//!   naming their dependencies; the container orders construction so every
//!   dependency exists before its dependent's factory runs
//! - **Capability lookup**: beans advertise capability tags and consumers
//!   resolve by tag, with ambiguity surfaced as an error rather than an
//!   arbitrary pick
//! - **Three scopes**: container-wide singletons, caller-owned prototypes,
//!   and request-scoped instances living exactly one request window
//! - **Deferred providers**: a longer-lived bean reaches a shorter-lived one
//!   through [`BeanProvider`], re-resolved on every call
//! - **Deterministic teardown**: lifecycle hooks run exactly once, in
//!   reverse creation order, at each scope's teardown point
//!
//! ## Example
//!
//! ```rust,ignore
//! use primavera_container::{BeanDefinition, Container};
//!
//! let container = Container::builder()
//! 	.bean(
//! 		BeanDefinition::builder("repository")
//! 			.factory(|_| Ok(Repository::new()))
//! 			.build()?,
//! 	)
//! 	.bean(
//! 		BeanDefinition::builder("service")
//! 			.depends_on("repository")
//! 			.factory(|deps| Ok(Service::new(deps.get::<Repository>(0)?)))
//! 			.build()?,
//! 	)
//! 	.build()?;
//!
//! let service = container.get_bean::<Service>("service")?;
//! ```

pub mod container;
pub mod context;
pub mod definition;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod provider;
pub mod registry;
mod scope;

pub use container::{Container, ContainerBuilder, ResolvedDeps};
pub use context::RequestToken;
pub use definition::{
	BeanDefinition, BeanDefinitionBuilder, BeanError, BeanFactory, BeanInstance, DependencyRef,
	Scope,
};
pub use error::{ContainerError, ContainerResult};
pub use graph::{GraphResolver, ResolutionPlan};
pub use lifecycle::LifecycleHook;
pub use provider::BeanProvider;
pub use registry::BeanRegistry;
