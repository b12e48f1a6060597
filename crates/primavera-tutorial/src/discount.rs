//! Pluggable discount policies

use crate::member::{Grade, Member};

/// Discount calculation strategy.
///
/// Implementations advertise the same capability tag in the container, so
/// the order service picks one up without naming it.
pub trait DiscountPolicy: Send + Sync {
	/// Discount amount in currency units for this member and price.
	fn discount(&self, member: &Member, price: u32) -> u32;
}

/// Flat discount for VIP members, regardless of price.
#[derive(Debug, Default)]
pub struct FixDiscountPolicy;

impl FixDiscountPolicy {
	pub const DISCOUNT_AMOUNT: u32 = 1_000;

	pub fn new() -> Self {
		Self
	}
}

impl DiscountPolicy for FixDiscountPolicy {
	fn discount(&self, member: &Member, _price: u32) -> u32 {
		match member.grade {
			Grade::Vip => Self::DISCOUNT_AMOUNT,
			Grade::Basic => 0,
		}
	}
}

/// Percentage discount for VIP members.
#[derive(Debug, Default)]
pub struct RateDiscountPolicy;

impl RateDiscountPolicy {
	pub const DISCOUNT_PERCENT: u32 = 10;

	pub fn new() -> Self {
		Self
	}
}

impl DiscountPolicy for RateDiscountPolicy {
	fn discount(&self, member: &Member, price: u32) -> u32 {
		match member.grade {
			// The quotient never exceeds `price`, so the narrowing is lossless.
			Grade::Vip => (u64::from(price) * u64::from(Self::DISCOUNT_PERCENT) / 100) as u32,
			Grade::Basic => 0,
		}
	}
}
