//! Dependency tracker

// Imports
use {
	crate::{PropertyId, dep_graph::Dependency},
	core::{cell::RefCell, mem},
	std::rc::Rc,
};

/// Frame of an evaluation
struct Frame {
	/// Property being evaluated
	target: PropertyId,

	/// Properties read so far
	observed: Vec<Rc<dyn Dependency>>,
}

/// Whether a property is being evaluated
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Evaluation {
	/// Not being evaluated
	Idle,

	/// Being evaluated by the innermost frame
	Innermost,

	/// Being evaluated by an outer frame
	Outer,
}

/// Dependency tracker.
///
/// Keeps a stack of evaluations, so that a computation reading
/// another computed property which is itself recomputed only
/// records the dependencies in the correct frame.
pub(crate) struct Tracker {
	/// Frames
	frames: RefCell<Vec<Frame>>,
}

impl Tracker {
	/// Creates a new, empty, tracker
	pub(crate) const fn new() -> Self {
		Self {
			frames: RefCell::new(vec![]),
		}
	}

	/// Records that `dep` was read.
	///
	/// Does nothing if no evaluation is in progress, if `dep` is
	/// the property being evaluated, or if it was already recorded.
	pub(crate) fn push(&self, dep: &Rc<dyn Dependency>) {
		let mut frames = self.frames.borrow_mut();
		let Some(frame) = frames.last_mut() else {
			return;
		};

		let id = dep.id();
		if frame.target == id || frame.observed.iter().any(|observed| observed.id() == id) {
			return;
		}

		frame.observed.push(Rc::clone(dep));
	}

	/// Runs `f` within a new frame for `target`, returning its
	/// output along with every property read during it.
	pub(crate) fn gather<O>(&self, target: PropertyId, f: impl FnOnce() -> O) -> (O, Vec<Rc<dyn Dependency>>) {
		self.frames.borrow_mut().push(Frame {
			target,
			observed: vec![],
		});
		let frame = FrameGuard { tracker: self };

		let output = f();
		let observed = frame.take_observed();

		(output, observed)
	}

	/// Returns whether `id` is being evaluated
	pub(crate) fn evaluation(&self, id: PropertyId) -> Evaluation {
		let frames = self.frames.borrow();
		let mut targets = frames.iter().rev().map(|frame| frame.target);
		match targets.next() {
			Some(target) if target == id => Evaluation::Innermost,
			Some(_) if targets.any(|target| target == id) => Evaluation::Outer,
			_ => Evaluation::Idle,
		}
	}

	/// Returns the number of evaluations in progress
	pub(crate) fn depth(&self) -> usize {
		self.frames.borrow().len()
	}
}

/// Frame guard.
///
/// Pops the frame pushed by [`Tracker::gather`], even if the evaluation panicked.
struct FrameGuard<'a> {
	/// Tracker
	tracker: &'a Tracker,
}

impl FrameGuard<'_> {
	/// Takes all observed properties out of the frame
	fn take_observed(&self) -> Vec<Rc<dyn Dependency>> {
		let mut frames = self.tracker.frames.borrow_mut();
		let frame = frames.last_mut().expect("Missing pushed frame");
		mem::take(&mut frame.observed)
	}
}

impl Drop for FrameGuard<'_> {
	fn drop(&mut self) {
		self.tracker.frames.borrow_mut().pop().expect("Missing pushed frame");
	}
}
