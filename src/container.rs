//! Inversion-of-control container module.
//!
//! This module provides the bean registry, graph resolution, scope stores,
//! lifecycle hooks, and the thread-safe container facade.
//!
//! # Examples
//!
//! ```rust,ignore
//! use primavera::container::{BeanDefinition, Container};
//!
//! let container = Container::new();
//! container.register(
//! 	BeanDefinition::builder("clock")
//! 		.singleton()
//! 		.factory(|_| Ok(std::time::Instant::now()))
//! 		.build()?,
//! )?;
//! ```

pub use primavera_container::*;
