//! Example consumers exercising the container.
//!
//! Membership, orders, and discount policies wired entirely through bean
//! definitions, plus a request-scoped logger resolved through a provider.
//!
//! # Examples
//!
//! ```rust,ignore
//! use primavera::tutorial::{self, OrderService};
//!
//! let container = tutorial::tutorial_container()?;
//! let orders = container.get_bean::<OrderService>("order-service")?;
//! ```

pub use primavera_tutorial::*;
