//! Smoke tests over the re-exported facade surface

use primavera::prelude::*;
use rstest::rstest;

#[rstest]
fn prelude_carries_everything_a_basic_setup_needs() {
	// Arrange & Act: written against prelude names only
	let container = Container::builder()
		.bean(
			BeanDefinition::builder("greeting")
				.scope(Scope::Singleton)
				.factory(|_| Ok(String::from("hello")))
				.build()
				.unwrap(),
		)
		.build()
		.unwrap();
	let greeting = container.get_bean::<String>("greeting").unwrap();

	// Assert
	assert_eq!(greeting.as_str(), "hello");
	container.close();
	assert!(matches!(
		container.get_bean::<String>("greeting"),
		Err(ContainerError::ContainerClosed)
	));
}

#[cfg(feature = "tutorial")]
#[rstest]
fn tutorial_feature_ships_the_assembled_demo() {
	use primavera::tutorial;

	// Arrange
	let container = tutorial::tutorial_container().unwrap();
	let members = container
		.get_bean::<MemberService>("member-service")
		.unwrap();
	let orders = container.get_bean::<OrderService>("order-service").unwrap();

	// Act
	members.join(Member::new(1, "memberA", Grade::Vip));
	let order = orders.create_order(1, "itemA", 10_000).unwrap();

	// Assert
	assert_eq!(order.calculate_price(), 9_000);
}
