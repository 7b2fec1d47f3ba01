//! Computation

// Imports
use {
	crate::{
		Context,
		PropertyId,
		dep_graph::{Dependency, Recompute},
	},
	core::cell::RefCell,
	std::rc::Rc,
};

/// Computation function
pub(super) type ComputationFn<T> = Rc<dyn Fn() -> T>;

/// Computation of a computed property
pub(super) struct Computation<T> {
	/// Function
	f: ComputationFn<T>,

	/// Dependencies observed on the last evaluation.
	///
	/// `None` once disposed.
	observed: RefCell<Option<Vec<Rc<dyn Dependency>>>>,

	/// Recompute callback, subscribed to every observed dependency
	recompute: Recompute,
}

impl<T> Computation<T> {
	/// Creates a new computation, subscribing to `observed`
	pub(super) fn new(f: ComputationFn<T>, observed: Option<Vec<Rc<dyn Dependency>>>, recompute: Recompute) -> Self {
		for dep in observed.iter().flatten() {
			dep.add_dependent(&recompute);
		}

		Self {
			f,
			observed: RefCell::new(observed),
			recompute,
		}
	}

	/// Returns the function
	pub(super) fn f(&self) -> ComputationFn<T> {
		Rc::clone(&self.f)
	}

	/// Returns whether this computation is still attached to it's dependencies
	pub(super) fn is_attached(&self) -> bool {
		self.observed.borrow().is_some()
	}

	/// Returns the observed dependencies, if attached
	pub(super) fn observed(&self) -> Option<Vec<Rc<dyn Dependency>>> {
		self.observed.borrow().clone()
	}

	/// Re-evaluates the function, rebuilding the observed dependencies.
	///
	/// If the function panics, the previous dependencies stay recorded,
	/// but unsubscribed, until the next recomputation.
	pub(super) fn recompute(&self, ctx: &Context, target: PropertyId) -> T {
		for dep in self.observed.borrow().iter().flatten() {
			dep.remove_dependent(&self.recompute);
		}

		let (value, observed) = {
			let _propagating = ctx.propagating();
			ctx.tracker().gather(target, || (*self.f)())
		};

		// Note: The computation might have disposed us, in which case we
		//       shouldn't re-attach.
		let mut cur_observed = self.observed.borrow_mut();
		if let Some(cur_observed) = &mut *cur_observed {
			for dep in &observed {
				dep.add_dependent(&self.recompute);
			}
			*cur_observed = observed;
		}

		value
	}

	/// Detaches from all dependencies
	pub(super) fn detach(&self) {
		let observed = self.observed.take();
		for dep in observed.iter().flatten() {
			dep.remove_dependent(&self.recompute);
		}
	}
}

impl<T> Drop for Computation<T> {
	fn drop(&mut self) {
		self.detach();
	}
}
