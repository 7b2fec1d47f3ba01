//! Subscriber tests

// Imports
use {
	core::cell::RefCell,
	propel_reactive::{Context, Subscriber},
	std::rc::Rc,
};

/// Returns a subscriber recording every value it's called with
fn recorder<T: Clone + 'static>() -> (Subscriber<T>, Rc<RefCell<Vec<Option<T>>>>) {
	let calls = Rc::new(RefCell::new(vec![]));
	let subscriber = Subscriber::new({
		let calls = Rc::clone(&calls);
		move |value: Option<&T>| calls.borrow_mut().push(value.cloned())
	});

	(subscriber, calls)
}

/// Ensures subscribers are notified with the new value
#[test]
fn notified_on_change() {
	propel_logger::init();

	let ctx = Context::new();
	let prop = ctx.property().with_value(0_i32);
	let (subscriber, calls) = recorder();
	prop.subscribe(&subscriber);
	assert!(calls.borrow().is_empty(), "Subscriber was called on subscribe");

	prop.set(1);
	assert_eq!(*calls.borrow(), [Some(1)], "Subscriber wasn't notified of the change");

	prop.unset();
	assert_eq!(*calls.borrow(), [Some(1), None], "Subscriber wasn't notified of the unset");
}

/// Ensures setting the same value twice only notifies once
#[test]
fn idempotent_set() {
	let ctx = Context::new();
	let prop = ctx.property::<&str>();
	let (subscriber, calls) = recorder();
	prop.subscribe(subscriber);

	prop.set("value");
	prop.set("value");
	assert_eq!(*calls.borrow(), [Some("value")], "Subscriber was notified when setting the same value");
}

/// Ensures touching notifies even if the value didn't change
#[test]
fn touch_always_notifies() {
	let ctx = Context::new();
	let prop = ctx.property().with_value(1_i32);
	let (subscriber, calls) = recorder();
	prop.subscribe(subscriber);

	prop.touch();
	prop.touch();
	assert_eq!(*calls.borrow(), [Some(1), Some(1)], "Touching didn't notify the subscriber every time");
}

/// Ensures unsubscribed subscribers aren't notified
#[test]
fn unsubscribe() {
	let ctx = Context::new();
	let prop = ctx.property().with_value(1_i32);
	let (subscriber, calls) = recorder();
	prop.subscribe(&subscriber);
	assert_eq!(prop.subscriber_count(), 1, "Subscriber wasn't added");

	prop.unsubscribe(&subscriber);
	assert_eq!(prop.subscriber_count(), 0, "Subscriber wasn't removed");

	prop.set(2);
	prop.touch();
	assert!(calls.borrow().is_empty(), "Unsubscribed subscriber was notified");

	// Unsubscribing again does nothing
	prop.unsubscribe(&subscriber);
}

/// Ensures subscribing twice only notifies once
#[test]
fn duplicate_subscribe_ignored() {
	let ctx = Context::new();
	let prop = ctx.property().with_value(1_i32);
	let (subscriber, calls) = recorder();
	prop.subscribe(&subscriber).subscribe(subscriber.clone());
	assert_eq!(prop.subscriber_count(), 1, "Duplicate subscriber was added");

	prop.set(2);
	assert_eq!(*calls.borrow(), [Some(2)], "Subscriber was notified more than once");
}

/// Ensures subscribers are notified in the order they subscribed
#[test]
fn insertion_order() {
	let ctx = Context::new();
	let prop = ctx.property().with_value(0_i32);

	let order = Rc::new(RefCell::new(vec![]));
	for idx in 0..3 {
		let order = Rc::clone(&order);
		prop.subscribe(Subscriber::new(move |_: Option<&i32>| order.borrow_mut().push(idx)));
	}

	prop.set(1);
	assert_eq!(*order.borrow(), [0, 1, 2], "Subscribers weren't notified in insertion order");
}

/// Ensures subscribers of computed properties are notified when a dependency changes
#[test]
fn computed_notifies_on_cascade() {
	let ctx = Context::new();
	let root = ctx.property().with_name("root").with_value(1_i32);
	let plus_one = ctx.property().with_name("plusOne").computed({
		let root = root.clone();
		move || root.get().unwrap_or(0) + 1
	});
	let (subscriber, calls) = recorder();
	plus_one.subscribe(subscriber);

	root.set(10);
	assert_eq!(*calls.borrow(), [Some(11)], "Subscriber wasn't notified synchronously");

	// Same value, no notification
	root.set(10);
	assert_eq!(*calls.borrow(), [Some(11)], "Setting the same value notified the subscriber");
}

/// Ensures subscribers may write other properties
#[test]
fn subscriber_may_write() {
	let ctx = Context::new();
	let celsius = ctx.property().with_name("celsius").with_value(0_i32);
	let fahrenheit = ctx.property().with_name("fahrenheit").with_value(32_i32);
	celsius.subscribe(Subscriber::new({
		let fahrenheit = fahrenheit.clone();
		move |value: Option<&i32>| {
			if let Some(value) = value {
				fahrenheit.set(value * 9 / 5 + 32);
			}
		}
	}));

	celsius.set(100);
	assert_eq!(fahrenheit.get(), Some(212), "Subscriber write wasn't applied");
	assert!(!ctx.is_propagating(), "Propagation wasn't finished");
}
