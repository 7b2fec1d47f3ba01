//! Property
//!
//! A [`Property`] is a named, observable, cell holding an optional value.
//!
//! Properties are either *roots*, whose value only changes when it's
//! explicitly [set](Property::set), or *computed*, whose value is derived
//! from a function reading other properties.
//!
//! # Staleness
//! Each property remembers the step of the context in which it was
//! last updated. Whenever a root is set, the context's clock advances,
//! which makes every computed property stale. A stale computed property
//! is recomputed before it's value is returned, and at most once per step.
//!
//! Dependents are also subscribed to each of their dependencies, so
//! that setting a root immediately recomputes everything depending on it,
//! and their own subscribers are notified synchronously.
//!
//! # Configuration
//! The `with_*` and `computed*` methods don't modify the property they're
//! called on, and instead return a new property with it's own state.
//! Cloning a property on the other hand, returns a handle to the same property.

// Modules
mod computation;
mod subscriber;

// Exports
pub use self::subscriber::{IntoSubscriber, Subscriber};

// Imports
use {
	self::{
		computation::{Computation, ComputationFn},
		subscriber::Registry,
	},
	crate::{
		Context,
		ReadError,
		context::Evaluation,
		dep_graph::{self, Dependency, Recompute},
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
		hash::{Hash, Hasher},
		panic::Location,
	},
	itertools::Itertools,
	std::rc::{Rc, Weak},
};

/// Name of properties without one
pub const UNNAMED: &str = "<unnamed>";

/// Property id.
///
/// Unique within the context that created the property.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
#[display("#{_0}")]
pub struct PropertyId(u64);

impl PropertyId {
	/// Creates a new id
	pub(crate) const fn new(id: u64) -> Self {
		Self(id)
	}
}

/// Origin of a write
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Origin {
	/// Written by the user
	External,

	/// Written by a recomputation
	Commit,
}

/// State copied into a newly configured property
struct Seed<T> {
	name:         Option<String>,
	value:        Option<T>,
	debug:        bool,
	step_version: u64,
	computation:  Option<(ComputationFn<T>, Option<Vec<Rc<dyn Dependency>>>)>,
}

impl<T> Seed<T> {
	/// Seed of an unconfigured property
	const fn empty() -> Self {
		Self {
			name:         None,
			value:        None,
			debug:        false,
			step_version: 0,
			computation:  None,
		}
	}
}

/// Inner
struct Inner<T> {
	/// Id
	id: PropertyId,

	/// Context
	ctx: Context,

	/// Where this property was defined
	defined_loc: &'static Location<'static>,

	/// Name
	name: RefCell<Option<String>>,

	/// Value
	value: RefCell<Option<T>>,

	/// Step of the last update
	step_version: Cell<u64>,

	/// Subscribers
	subscribers: Registry<T>,

	/// Computation, if computed
	computation: Option<Computation<T>>,

	/// Whether debug messages are emitted
	debug: Cell<bool>,
}

impl<T> Inner<T> {
	/// Returns the name of this property
	fn name(&self) -> String {
		self.name.borrow().as_deref().unwrap_or(UNNAMED).to_owned()
	}

	/// Emits a debug message, if enabled.
	///
	/// `message` is only called when enabled.
	fn log(&self, message: impl FnOnce() -> String) {
		if !self.debug.get() {
			return;
		}

		tracing::debug!(property = %self.name(), id = %self.id, "{}", message());
	}
}

impl<T> Inner<T>
where
	T: Clone + PartialEq + 'static,
{
	/// Returns the state to copy into a newly configured property
	fn seed(&self) -> Seed<T> {
		Seed {
			name:         self.name.borrow().clone(),
			value:        self.value.borrow().clone(),
			debug:        self.debug.get(),
			step_version: self.step_version.get(),
			computation:  self
				.computation
				.as_ref()
				.map(|computation| (computation.f(), computation.observed())),
		}
	}

	/// Writes a value, notifying all subscribers if it changed
	fn write(&self, value: Option<T>, origin: Origin) {
		let previous = self.value.replace(value);

		// Note: Commits never advance the clock. User writes always start a new
		//       step, unless we're propagating and already were written this step.
		let is_external = origin == Origin::External;
		if is_external && (!self.ctx.is_propagating() || self.step_version.get() == self.ctx.step()) {
			let step = self.ctx.clock().advance();
			self.log(|| format!("{} is raising step version to {step}", self.name()));
		}
		self.step_version.set(self.ctx.step());

		let changed = *self.value.borrow() != previous;
		if changed {
			self.log(|| format!("changed {}", self.name()));
			self.touch();
		}
	}

	/// Notifies all subscribers with the current value
	fn touch(&self) {
		if self.subscribers.is_empty() {
			return;
		}

		let value = self.value.borrow().clone();
		let _propagating = self.ctx.propagating();
		self.subscribers.notify(value.as_ref());
	}

	/// Ensures this property is up to date, logging any errors
	#[track_caller]
	fn update(&self) {
		if let Err(err) = self.ensure_updated() {
			tracing::warn!(%err, location = %Location::caller(), "Unable to update property");
		}
	}
}

impl<T> Dependency for Inner<T>
where
	T: Clone + PartialEq + 'static,
{
	fn id(&self) -> PropertyId {
		self.id
	}

	fn name(&self) -> String {
		Inner::name(self)
	}

	fn defined_loc(&self) -> &'static Location<'static> {
		self.defined_loc
	}

	fn ensure_updated(&self) -> Result<(), ReadError> {
		self.log(|| format!("ensuring that {} is fully updated", self.name()));
		if self.step_version.get() >= self.ctx.step() {
			self.log(|| format!("{} is already fully updated", self.name()));
			return Ok(());
		}

		match &self.computation {
			Some(computation) if computation.is_attached() => {
				match self.ctx.tracker().evaluation(self.id) {
					Evaluation::Idle => (),
					// Note: Reading ourselves during our own computation just yields the current value
					Evaluation::Innermost => return Ok(()),
					Evaluation::Outer =>
						return Err(ReadError::Cycle {
							name: self.name(),
							id:   self.id,
						}),
				}

				self.log(|| format!("{} needs recomputation", self.name()));
				let value = computation.recompute(&self.ctx, self.id);
				self.log(|| {
					let deps = computation.observed().unwrap_or_default();
					format!(
						"{} now depends on [{}]",
						self.name(),
						deps.iter().map(|dep| dep.name()).join(", ")
					)
				});

				self.write(Some(value), Origin::Commit);
			},

			// Note: Roots, and disposed computed properties, only change when set.
			_ => self.step_version.set(self.ctx.step()),
		}

		self.log(|| format!("{} reached step version {}", self.name(), self.step_version.get()));
		Ok(())
	}

	fn add_dependent(&self, recompute: &Recompute) {
		self.subscribers.add_dependent(recompute);
	}

	fn remove_dependent(&self, recompute: &Recompute) {
		self.subscribers.remove_dependent(recompute);
	}

	fn dependencies(&self) -> Vec<Rc<dyn Dependency>> {
		self.computation
			.as_ref()
			.and_then(Computation::observed)
			.unwrap_or_default()
	}
}

/// Property
pub struct Property<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T> Property<T> {
	/// Returns the id of this property
	#[must_use]
	pub fn id(&self) -> PropertyId {
		self.inner.id
	}

	/// Returns the context of this property
	#[must_use]
	pub fn context(&self) -> &Context {
		&self.inner.ctx
	}

	/// Returns where this property was defined
	#[must_use]
	pub fn defined_loc(&self) -> &'static Location<'static> {
		self.inner.defined_loc
	}

	/// Returns the name of this property, or [`UNNAMED`] if it has none
	#[must_use]
	pub fn name(&self) -> String {
		self.inner.name()
	}

	/// Renames this property
	pub fn set_name(&self, name: impl Into<String>) -> &Self {
		*self.inner.name.borrow_mut() = Some(name.into());
		self
	}

	/// Enables debug messages for this property.
	///
	/// Properties configured from this one will also have them enabled.
	pub fn debug(&self) -> &Self {
		self.inner.debug.set(true);
		self
	}

	/// Returns the step this property was last updated in
	#[must_use]
	pub fn step_version(&self) -> u64 {
		self.inner.step_version.get()
	}

	/// Returns whether this property is computed
	#[must_use]
	pub fn is_computed(&self) -> bool {
		self.inner.computation.is_some()
	}

	/// Returns whether this property is computed, but was disposed
	#[must_use]
	pub fn is_disposed(&self) -> bool {
		self.inner
			.computation
			.as_ref()
			.is_some_and(|computation| !computation.is_attached())
	}

	/// Returns the number of subscribers
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.subscriber_count()
	}

	/// Returns the number of computed properties depending on this one
	#[must_use]
	pub fn dependent_count(&self) -> usize {
		self.inner.subscribers.dependent_count()
	}

	/// Subscribes to changes of this property.
	///
	/// Subscribing the same subscriber more than once has no effect.
	pub fn subscribe(&self, subscriber: impl IntoSubscriber<T>) -> &Self {
		self.inner.subscribers.add_subscriber(subscriber.into_subscriber());
		self
	}

	/// Unsubscribes from changes of this property.
	///
	/// Does nothing if not subscribed.
	pub fn unsubscribe(&self, subscriber: &Subscriber<T>) -> &Self {
		self.inner.subscribers.remove_subscriber(subscriber);
		self
	}
}

impl<T> Property<T>
where
	T: Clone + PartialEq + 'static,
{
	/// Creates a new, unset and unnamed, property
	#[must_use]
	#[track_caller]
	pub fn new(ctx: &Context) -> Self {
		Self::from_seed(ctx.clone(), Seed::empty(), Location::caller())
	}

	/// Creates a property from a seed
	fn from_seed(ctx: Context, seed: Seed<T>, defined_loc: &'static Location<'static>) -> Self {
		let inner = Rc::new_cyclic(|weak: &Weak<Inner<T>>| {
			let computation = seed.computation.map(|(f, observed)| {
				let weak = Weak::clone(weak);
				let recompute: Recompute = Rc::new(move || {
					if let Some(inner) = weak.upgrade() {
						inner.update();
					}
				});
				Computation::new(f, observed, recompute)
			});

			Inner {
				id: ctx.next_id(),
				ctx,
				defined_loc,
				name: RefCell::new(seed.name),
				value: RefCell::new(seed.value),
				step_version: Cell::new(seed.step_version),
				subscribers: Registry::new(),
				computation,
				debug: Cell::new(seed.debug),
			}
		});

		Self { inner }
	}

	/// Returns a new property with this property's state and `name`
	#[must_use]
	#[track_caller]
	pub fn with_name(&self, name: impl Into<String>) -> Self {
		let seed = Seed {
			name: Some(name.into()),
			..self.inner.seed()
		};
		Self::from_seed(self.inner.ctx.clone(), seed, Location::caller())
	}

	/// Returns a new property with this property's state and `value`.
	///
	/// If this property is computed, `value` is kept until the next step,
	/// which happens at the latest when any of it's dependencies change.
	#[must_use]
	#[track_caller]
	pub fn with_value(&self, value: T) -> Self {
		let seed = self.seed_with_value(Some(value));
		Self::from_seed(self.inner.ctx.clone(), seed, Location::caller())
	}

	/// Returns a new property with this property's state, but unset
	#[must_use]
	#[track_caller]
	pub fn without_value(&self) -> Self {
		let seed = self.seed_with_value(None);
		Self::from_seed(self.inner.ctx.clone(), seed, Location::caller())
	}

	/// Returns this property's state, with `value`.
	///
	/// Computed properties are stamped with the current step, so that
	/// `value` isn't immediately replaced by a recomputation.
	fn seed_with_value(&self, value: Option<T>) -> Seed<T> {
		let seed = self.inner.seed();
		let step_version = if seed.computation.is_some() {
			self.inner.ctx.step()
		} else {
			seed.step_version
		};

		Seed {
			value,
			step_version,
			..seed
		}
	}

	/// Returns a new property computed by `f`, with this property's name.
	///
	/// `f` is evaluated immediately, and afterwards whenever any
	/// properties it read change.
	#[must_use]
	#[track_caller]
	pub fn computed<F>(&self, f: F) -> Self
	where
		F: Fn() -> T + 'static,
	{
		let value = self.inner.value.borrow().clone();
		self.computed_inner(value, Rc::new(f), Location::caller())
	}

	/// Returns a new property computed by `f`, with this property's name,
	/// holding `initial_value` before `f` is first evaluated.
	#[must_use]
	#[track_caller]
	pub fn computed_with<F>(&self, initial_value: T, f: F) -> Self
	where
		F: Fn() -> T + 'static,
	{
		self.computed_inner(Some(initial_value), Rc::new(f), Location::caller())
	}

	/// Inner function for [`Self::computed`] and [`Self::computed_with`]
	fn computed_inner(
		&self,
		value: Option<T>,
		f: ComputationFn<T>,
		defined_loc: &'static Location<'static>,
	) -> Self {
		let seed = Seed {
			value,
			step_version: 0,
			computation: Some((f, Some(vec![]))),
			..self.inner.seed()
		};
		let property = Self::from_seed(self.inner.ctx.clone(), seed, defined_loc);

		property
			.inner
			.log(|| format!("evaluating {} for the first time", property.name()));
		property.inner.update();

		property
	}

	/// Gets the value of this property.
	///
	/// If called during a computation, this property becomes a dependency of it.
	///
	/// If this property is stale, it is recomputed first. If it can't be, due to
	/// a dependency cycle, the last value is returned instead and a warning is emitted.
	#[must_use]
	#[track_caller]
	pub fn get(&self) -> Option<T> {
		match self.try_get() {
			Ok(value) => value,
			Err(err) => {
				tracing::warn!(%err, location = %Location::caller(), "Returning last value of property");
				self.inner.value.borrow().clone()
			},
		}
	}

	/// Gets the value of this property.
	///
	/// Like [`Self::get`], but returns an error on dependency cycles.
	pub fn try_get(&self) -> Result<Option<T>, ReadError> {
		self.inner.log(|| format!("getting value of {}", self.name()));
		self.inner.ctx.tracker().push(&self.as_dependency());
		self.inner.ensure_updated()?;

		Ok(self.inner.value.borrow().clone())
	}

	/// Sets the value of this property.
	///
	/// Subscribers are only notified if the value changed.
	pub fn set(&self, value: T) -> &Self {
		self.inner.log(|| format!("setting {}", self.name()));
		self.inner.write(Some(value), Origin::External);
		self
	}

	/// Removes the value of this property.
	///
	/// Subscribers are only notified if the property had a value.
	pub fn unset(&self) -> &Self {
		self.inner.log(|| format!("unsetting {}", self.name()));
		self.inner.write(None, Origin::External);
		self
	}

	/// Notifies all subscribers with the current value, even if it didn't change
	pub fn touch(&self) -> &Self {
		self.inner.touch();
		self
	}

	/// Disposes of this property.
	///
	/// The property stops reacting to it's dependencies, but keeps
	/// it's last value, and may still be read and set.
	pub fn dispose(&self) -> &Self {
		self.inner.log(|| format!("disposing {}", self.name()));
		if let Some(computation) = &self.inner.computation {
			computation.detach();
		}
		self.inner.log(|| format!("disposed {}", self.name()));

		self
	}

	/// Returns the ids of the properties read on the last evaluation
	#[must_use]
	pub fn dependencies(&self) -> Vec<PropertyId> {
		self.inner.dependencies().iter().map(|dep| dep.id()).collect()
	}

	/// Exports this property and all of it's transitive dependencies as a dot graph
	#[must_use]
	pub fn export_dot(&self) -> String {
		dep_graph::export_dot(self.as_dependency())
	}

	/// Returns this property as a dependency
	pub(crate) fn as_dependency(&self) -> Rc<dyn Dependency> {
		Rc::<Inner<T>>::clone(&self.inner)
	}
}

impl<T> Clone for Property<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T> PartialEq for Property<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Property");
		s.field("id", &self.inner.id)
			.field("name", &self.inner.name())
			.field("step_version", &self.inner.step_version.get())
			.field("is_computed", &self.inner.computation.is_some());

		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value).finish(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}
