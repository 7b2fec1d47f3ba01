//! Context
//!
//! Every property graph lives inside a [`Context`], which owns the state
//! that must be shared by all properties of the graph:
//!
//! - The step clock, used to tell whether a property is up to date.
//! - The dependency tracker, used to discover which properties a
//!   computation reads while it runs.
//!
//! Properties of different contexts are fully independent.

// Modules
mod clock;
mod tracker;

// Exports
pub(crate) use self::tracker::Evaluation;

// Imports
use {
	self::{clock::Clock, tracker::Tracker},
	crate::{Property, PropertyId},
	core::{cell::Cell, fmt},
	std::rc::Rc,
};

/// Inner
struct Inner {
	/// Step clock
	clock: Clock,

	/// Dependency tracker
	tracker: Tracker,

	/// Next property id
	next_id: Cell<u64>,

	/// Number of notifications and recomputations currently in progress
	propagation_depth: Cell<usize>,
}

/// Context
#[derive(Clone)]
pub struct Context {
	/// Inner
	inner: Rc<Inner>,
}

impl Context {
	/// Creates a new, empty, context
	#[must_use]
	pub fn new() -> Self {
		let inner = Inner {
			clock:             Clock::new(),
			tracker:           Tracker::new(),
			next_id:           Cell::new(0),
			propagation_depth: Cell::new(0),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Creates a new, unset and unnamed, property within this context
	#[must_use]
	#[track_caller]
	pub fn property<T>(&self) -> Property<T>
	where
		T: Clone + PartialEq + 'static,
	{
		Property::new(self)
	}

	/// Returns the current step
	#[must_use]
	pub fn step(&self) -> u64 {
		self.inner.clock.get()
	}

	/// Returns whether a notification or recomputation is in progress
	#[must_use]
	pub fn is_propagating(&self) -> bool {
		self.inner.propagation_depth.get() != 0
	}

	/// Returns the clock
	pub(crate) fn clock(&self) -> &Clock {
		&self.inner.clock
	}

	/// Returns the dependency tracker
	pub(crate) fn tracker(&self) -> &Tracker {
		&self.inner.tracker
	}

	/// Allocates a new property id
	pub(crate) fn next_id(&self) -> PropertyId {
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);
		PropertyId::new(id)
	}

	/// Marks a propagation as in progress until the returned guard is dropped
	pub(crate) fn propagating(&self) -> PropagationGuard<'_> {
		let depth = &self.inner.propagation_depth;
		depth.set(depth.get() + 1);
		PropagationGuard { depth }
	}

	/// Returns the pointer of this context
	fn inner_ptr(&self) -> *const () {
		Rc::as_ptr(&self.inner).cast()
	}
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for Context {
	fn eq(&self, other: &Self) -> bool {
		self.inner_ptr() == other.inner_ptr()
	}
}

impl Eq for Context {}

impl fmt::Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("step", &self.step())
			.field("tracker_depth", &self.inner.tracker.depth())
			.field("propagation_depth", &self.inner.propagation_depth.get())
			.finish_non_exhaustive()
	}
}

/// Propagation guard.
///
/// While this type is alive, the context is considered to be propagating.
pub(crate) struct PropagationGuard<'a> {
	/// Depth we incremented
	depth: &'a Cell<usize>,
}

impl Drop for PropagationGuard<'_> {
	fn drop(&mut self) {
		self.depth.set(self.depth.get() - 1);
	}
}
