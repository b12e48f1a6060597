//! Orders and the order service

use std::sync::Arc;

use crate::discount::DiscountPolicy;
use crate::member::MemberRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
	pub member_id: u64,
	pub item_name: String,
	pub item_price: u32,
	pub discount_price: u32,
}

impl Order {
	pub fn new(
		member_id: u64,
		item_name: impl Into<String>,
		item_price: u32,
		discount_price: u32,
	) -> Self {
		Self {
			member_id,
			item_name: item_name.into(),
			item_price,
			discount_price,
		}
	}

	/// Final price after discount. A discount larger than the item price
	/// clamps to zero rather than underflowing.
	pub fn calculate_price(&self) -> u32 {
		self.item_price.saturating_sub(self.discount_price)
	}
}

/// Creates orders, delegating the discount decision to the configured policy.
pub struct OrderService {
	repository: Arc<dyn MemberRepository>,
	policy: Arc<dyn DiscountPolicy>,
}

impl OrderService {
	pub fn new(repository: Arc<dyn MemberRepository>, policy: Arc<dyn DiscountPolicy>) -> Self {
		Self { repository, policy }
	}

	/// Builds an order for the member, or `None` when the member is unknown.
	pub fn create_order(
		&self,
		member_id: u64,
		item_name: impl Into<String>,
		item_price: u32,
	) -> Option<Order> {
		let member = self.repository.find_by_id(member_id)?;
		let discount_price = self.policy.discount(&member, item_price);
		Some(Order::new(member_id, item_name, item_price, discount_price))
	}
}
