//! Computed property tests

// Imports
use {
	core::cell::Cell,
	propel_reactive::{Context, Property},
	std::rc::Rc,
};

/// Test graph.
///
/// `plus_one` is computed from `root`, counting it's evaluations.
struct Graph {
	ctx:         Context,
	root:        Property<i32>,
	plus_one:    Property<i32>,
	evaluations: Rc<Cell<usize>>,
}

impl Graph {
	fn new() -> Self {
		propel_logger::init();

		let ctx = Context::new();
		let root = ctx.property().with_name("root").with_value(1);
		let evaluations = Rc::new(Cell::new(0));
		let plus_one = ctx.property().with_name("plusOne").computed({
			let root = root.clone();
			let evaluations = Rc::clone(&evaluations);
			move || {
				evaluations.set(evaluations.get() + 1);
				root.get().unwrap_or(0) + 1
			}
		});

		Self {
			ctx,
			root,
			plus_one,
			evaluations,
		}
	}

	/// Creates `plusOneOne`, computed from `plusOne`
	fn plus_one_one(&self) -> Property<i32> {
		self.ctx.property().with_name("plusOneOne").computed({
			let plus_one = self.plus_one.clone();
			move || plus_one.get().unwrap_or(0) + 1
		})
	}
}

/// Ensures computed properties are evaluated from their dependencies
#[test]
fn evaluated_from_dependencies() {
	let graph = Graph::new();
	assert_eq!(graph.plus_one.get(), Some(2), "Computed property had the wrong initial value");
}

/// Ensures computed properties are updated when a dependency changes
#[test]
fn updated_with_dependency() {
	let graph = Graph::new();
	graph.root.set(1000);
	assert_eq!(graph.plus_one.get(), Some(1001), "Computed property didn't react to it's dependency");
}

/// Ensures computed properties aren't re-evaluated when a dependency is set to the same value
#[test]
fn not_updated_on_same_value() {
	let graph = Graph::new();
	let evaluations = graph.evaluations.get();

	graph.root.set(graph.root.get().expect("Root should have a value"));
	assert_eq!(
		graph.evaluations.get(),
		evaluations,
		"Computed property was re-evaluated when it's dependency was set to the same value"
	);
}

/// Ensures disposed properties keep their last value
#[test]
fn not_updated_after_dispose() {
	let graph = Graph::new();
	graph.plus_one.dispose();
	graph.root.set(1000);
	assert_eq!(graph.plus_one.get(), Some(2), "Disposed property was updated");
}

/// Ensures a value set on a computed property is kept until a dependency changes
#[test]
fn forced_value() {
	let graph = Graph::new();
	graph.plus_one.set(-1);
	assert_eq!(graph.plus_one.get(), Some(-1), "Forced value wasn't kept");

	graph.root.set(5);
	assert_eq!(graph.plus_one.get(), Some(6), "Forced value wasn't replaced after a dependency changed");
}

/// Ensures changes propagate through computed properties
#[test]
fn transitive() {
	let graph = Graph::new();
	graph.root.set(10);
	let plus_one_one = graph.plus_one_one();
	assert_eq!(plus_one_one.get(), Some(12), "Transitive property had the wrong initial value");

	graph.root.set(1000);
	assert_eq!(plus_one_one.get(), Some(1002), "Transitive dependency change wasn't propagated");
}

/// Ensures forcing the value of a computed property propagates to it's dependents
#[test]
fn direct_dependency_forced() {
	let graph = Graph::new();
	graph.root.set(10);
	let plus_one_one = graph.plus_one_one();

	graph.plus_one.set(0);
	assert_eq!(plus_one_one.get(), Some(1), "Direct dependency change wasn't propagated");
}

/// Ensures a chain of computed properties stays consistent through root and forced writes
#[test]
fn chain_scenario() {
	let graph = Graph::new();
	let plus_one_one = graph.plus_one_one();
	assert_eq!(plus_one_one.get(), Some(3), "Chain had the wrong initial value");

	graph.root.set(10);
	assert_eq!(plus_one_one.get(), Some(12), "Chain didn't react to the root");

	graph.plus_one.set(0);
	assert_eq!(plus_one_one.get(), Some(1), "Chain didn't react to the forced value");

	graph.root.set(1000);
	assert_eq!(
		plus_one_one.get(),
		Some(1002),
		"Forced value wasn't replaced after the root changed"
	);
}

/// Ensures a property depending on the same root twice is only updated once
#[test]
fn diamond_updates_once() {
	let graph = Graph::new();
	graph.root.set(10);

	let evaluations = Rc::new(Cell::new(0_usize));
	let product = graph.ctx.property().with_name("product").computed({
		let root = graph.root.clone();
		let plus_one = graph.plus_one.clone();
		let evaluations = Rc::clone(&evaluations);
		move || {
			evaluations.set(evaluations.get() + 1);
			root.get().unwrap_or(0) * plus_one.get().unwrap_or(0)
		}
	});
	assert_eq!(product.get(), Some(110), "Diamond descendant had the wrong initial value");

	let before = evaluations.get();
	graph.root.set(5);
	assert_eq!(evaluations.get(), before + 1, "Diamond descendant was updated more than once");
	assert_eq!(product.get(), Some(30), "Diamond descendant had the wrong value");
	assert_eq!(evaluations.get(), before + 1, "Reading a fresh property re-evaluated it");
}

/// Ensures reading a property within a cycle returns it's last value
#[test]
fn cycle_read_returns_last_value() {
	propel_logger::init();

	let ctx = Context::new();
	let flag = ctx.property().with_name("flag").with_value(false);
	let slot = Rc::new(core::cell::RefCell::new(None::<Property<i32>>));

	let a = ctx.property().with_name("a").computed({
		let flag = flag.clone();
		let slot = Rc::clone(&slot);
		move || match flag.get() {
			Some(true) => slot.borrow().as_ref().and_then(Property::get).unwrap_or(0) + 10,
			_ => 1,
		}
	});
	let b = ctx.property().with_name("b").computed({
		let a = a.clone();
		move || a.get().unwrap_or(0) * 2
	});
	*slot.borrow_mut() = Some(b.clone());
	assert_eq!(b.get(), Some(2), "Property had the wrong initial value");

	// `a` now reads `b`, which reads `a`'s last value instead of recursing.
	flag.set(true);
	assert_eq!(a.get(), Some(12), "Cyclic property didn't use the last value of it's dependency");
	assert_eq!(b.get(), Some(2), "Cyclic dependency changed");
}
