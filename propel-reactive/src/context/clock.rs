//! Step clock

// Imports
use core::cell::Cell;

/// Step clock.
///
/// Starts at `1`, so that properties, which start at step `0`,
/// are always stale before their first update.
#[derive(Debug)]
pub(crate) struct Clock {
	/// Current step
	step: Cell<u64>,
}

impl Clock {
	/// Creates a new clock
	pub(crate) const fn new() -> Self {
		Self { step: Cell::new(1) }
	}

	/// Returns the current step
	pub(crate) fn get(&self) -> u64 {
		self.step.get()
	}

	/// Advances the clock, returning the new step
	pub(crate) fn advance(&self) -> u64 {
		let step = self.step.get() + 1;
		self.step.set(step);
		step
	}
}
