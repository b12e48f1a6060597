//! # Primavera
//!
//! A minimal, explicit inversion-of-control container for Rust, inspired by
//! the Spring core container.
//!
//! Primavera wires object graphs from programmatic bean definitions: no
//! component scanning, no proxies, no configuration files. Every definition
//! is registered explicitly, every dependency edge is declared, and every
//! scope boundary is visible in the types that cross it.
//!
//! ## Core Principles
//!
//! - **Explicit over implicit**: the registration table is built in code and
//!   is enumerable at runtime
//! - **Scopes are owned**: singletons live for the container, request beans
//!   for one window, prototypes belong to the caller
//! - **Mismatches fail fast**: a longer-lived bean cannot capture a
//!   shorter-lived one directly; crossing lifetimes takes an explicit
//!   [`BeanProvider`](container::BeanProvider)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use primavera::prelude::*;
//!
//! let container = Container::builder()
//! 	.bean(
//! 		BeanDefinition::builder("greeting")
//! 			.singleton()
//! 			.factory(|_| Ok(String::from("hello")))
//! 			.build()?,
//! 	)
//! 	.build()?;
//!
//! let greeting = container.get_bean::<String>("greeting")?;
//! assert_eq!(greeting.as_str(), "hello");
//! container.close();
//! ```
//!
//! The `tutorial` feature (on by default) ships the membership/order/discount
//! example domain that exercises every container feature end to end.

pub mod container;
#[cfg(feature = "tutorial")]
pub mod tutorial;

// Re-export the facade surface at the crate root
pub use primavera_container::{
	BeanDefinition, BeanDefinitionBuilder, BeanInstance, BeanProvider, Container,
	ContainerBuilder, ContainerError, ContainerResult, DependencyRef, RequestToken, Scope,
};

/// Commonly used types, importable in one line.
pub mod prelude {
	pub use primavera_container::{
		BeanDefinition, BeanDefinitionBuilder, BeanInstance, BeanProvider, Container,
		ContainerBuilder, ContainerError, ContainerResult, RequestToken, Scope,
	};

	#[cfg(feature = "tutorial")]
	pub use primavera_tutorial::{
		DiscountPolicy, Grade, Member, MemberRepository, MemberService, Order, OrderService,
	};
}
