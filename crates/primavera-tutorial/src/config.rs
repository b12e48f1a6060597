//! Container wiring for the tutorial services
//!
//! Wiring lives here and nowhere else: the services in the sibling modules
//! know nothing about the container or each other's concrete types.

use std::sync::Arc;

use primavera_container::{BeanDefinition, Container, ContainerResult};

use crate::audit::AuditService;
use crate::discount::{DiscountPolicy, FixDiscountPolicy, RateDiscountPolicy};
use crate::logger::RequestLogger;
use crate::member::{MemberRepository, MemberService, MemoryMemberRepository};
use crate::order::OrderService;

/// Capability tag shared by every discount policy definition.
pub const DISCOUNT_POLICY_CAPABILITY: &str = "discount-policy";

pub fn member_repository() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("member-repository")
		.factory(|_| {
			let repository: Arc<dyn MemberRepository> = Arc::new(MemoryMemberRepository::new());
			Ok(repository)
		})
		.build()
}

pub fn member_service() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("member-service")
		.depends_on("member-repository")
		.factory(|deps| {
			Ok(MemberService::new(
				deps.get_cloned::<Arc<dyn MemberRepository>>(0)?,
			))
		})
		.build()
}

pub fn fix_discount_policy() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("fix-discount-policy")
		.capability(DISCOUNT_POLICY_CAPABILITY)
		.factory(|_| {
			let policy: Arc<dyn DiscountPolicy> = Arc::new(FixDiscountPolicy::new());
			Ok(policy)
		})
		.build()
}

pub fn rate_discount_policy() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("rate-discount-policy")
		.capability(DISCOUNT_POLICY_CAPABILITY)
		.factory(|_| {
			let policy: Arc<dyn DiscountPolicy> = Arc::new(RateDiscountPolicy::new());
			Ok(policy)
		})
		.build()
}

/// The order service names no policy: it takes whichever single definition
/// carries the discount capability.
pub fn order_service() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("order-service")
		.depends_on("member-repository")
		.depends_on_capability(DISCOUNT_POLICY_CAPABILITY)
		.factory(|deps| {
			Ok(OrderService::new(
				deps.get_cloned::<Arc<dyn MemberRepository>>(0)?,
				deps.get_cloned::<Arc<dyn DiscountPolicy>>(1)?,
			))
		})
		.build()
}

pub fn request_logger() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("request-logger")
		.request_scoped()
		.factory(|_| Ok(RequestLogger::new()))
		.on_post_construct(|logger: &RequestLogger| {
			logger.created();
			Ok(())
		})
		.on_pre_destroy(|logger: &RequestLogger| {
			logger.closed();
			Ok(())
		})
		.build()
}

pub fn audit_service() -> ContainerResult<BeanDefinition> {
	BeanDefinition::builder("audit-service")
		.depends_on_deferred("request-logger")
		.factory(|deps| Ok(AuditService::new(deps.provider::<RequestLogger>(0)?)))
		.build()
}

/// Assembles the default tutorial container: the rate policy, one in-memory
/// member store shared by both services, and request-scoped logging.
///
/// Exactly one discount policy is registered; registering both would leave
/// the order service's capability edge ambiguous.
pub fn tutorial_container() -> ContainerResult<Container> {
	Container::builder()
		.bean(member_repository()?)
		.bean(member_service()?)
		.bean(rate_discount_policy()?)
		.bean(order_service()?)
		.bean(request_logger()?)
		.bean(audit_service()?)
		.build()
}
