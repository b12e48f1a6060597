//! # Primavera Tutorial
//!
//! Example services showing container wiring end to end: membership, order
//! processing with a pluggable discount policy, and request-scoped logging
//! reached from a singleton through a deferred provider.
//!
//! [`tutorial_container`] assembles the default table; the definition
//! functions in [`config`] are public so alternative tables (say, the fixed
//! discount policy instead of the rate one) are a few lines of wiring.

pub mod audit;
pub mod config;
pub mod discount;
pub mod logger;
pub mod member;
pub mod order;

pub use audit::AuditService;
pub use config::{tutorial_container, DISCOUNT_POLICY_CAPABILITY};
pub use discount::{DiscountPolicy, FixDiscountPolicy, RateDiscountPolicy};
pub use logger::RequestLogger;
pub use member::{Grade, Member, MemberRepository, MemberService, MemoryMemberRepository};
pub use order::{Order, OrderService};
