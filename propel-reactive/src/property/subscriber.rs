//! Subscribers
//!
//! Each property keeps a registry of everything that must be told when its
//! value changes. This includes both user [`Subscriber`]s and the recompute
//! callbacks of the computed properties that depend on it.

// Imports
use {
	crate::dep_graph::Recompute,
	core::{
		cell::RefCell,
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Rc,
};

/// Subscriber function
type SubscriberFn<T> = dyn Fn(Option<&T>);

/// Subscriber.
///
/// Subscribers are compared by identity, so clones of the same
/// subscriber may be used to unsubscribe.
pub struct Subscriber<T> {
	/// Inner
	inner: Rc<SubscriberFn<T>>,
}

impl<T> Subscriber<T> {
	/// Creates a new subscriber
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Option<&T>) + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Returns a unique identifier to this subscriber.
	///
	/// Cloning the subscriber will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner).cast::<()>().addr()
	}

	/// Calls this subscriber
	pub fn call(&self, value: Option<&T>) {
		(*self.inner)(value);
	}
}

impl<T> PartialEq for Subscriber<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T> Eq for Subscriber<T> {}

impl<T> Clone for Subscriber<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T> Hash for Subscriber<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl<T> fmt::Debug for Subscriber<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscriber").field("id", &self.id()).finish()
	}
}

/// Types that may be converted into a subscriber
pub trait IntoSubscriber<T> {
	fn into_subscriber(self) -> Subscriber<T>;
}

#[duplicate::duplicate_item(
	Ty body;
	[ Subscriber<T> ] [ self ];
	[ &'_ Subscriber<T> ] [ Subscriber::clone(self) ];
)]
impl<T> IntoSubscriber<T> for Ty {
	fn into_subscriber(self) -> Subscriber<T> {
		body
	}
}

/// Registry entry
enum Entry<T> {
	/// User subscriber
	Subscriber(Subscriber<T>),

	/// Dependent property
	Dependent(Recompute),
}

impl<T> Entry<T> {
	/// Notifies this entry
	fn notify(&self, value: Option<&T>) {
		match self {
			Self::Subscriber(subscriber) => subscriber.call(value),
			Self::Dependent(recompute) => (**recompute)(),
		}
	}
}

impl<T> Clone for Entry<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Subscriber(subscriber) => Self::Subscriber(subscriber.clone()),
			Self::Dependent(recompute) => Self::Dependent(Rc::clone(recompute)),
		}
	}
}

/// Subscriber registry.
///
/// Entries are kept in insertion order, without duplicates.
pub(super) struct Registry<T> {
	/// Entries
	entries: RefCell<Vec<Entry<T>>>,
}

impl<T> Registry<T> {
	/// Creates a new, empty, registry
	pub(super) const fn new() -> Self {
		Self {
			entries: RefCell::new(vec![]),
		}
	}

	/// Adds a subscriber, if not yet added
	pub(super) fn add_subscriber(&self, subscriber: Subscriber<T>) {
		let mut entries = self.entries.borrow_mut();
		let exists = entries
			.iter()
			.any(|entry| matches!(entry, Entry::Subscriber(other) if *other == subscriber));
		if !exists {
			entries.push(Entry::Subscriber(subscriber));
		}
	}

	/// Removes a subscriber, if it exists
	pub(super) fn remove_subscriber(&self, subscriber: &Subscriber<T>) {
		self.entries
			.borrow_mut()
			.retain(|entry| !matches!(entry, Entry::Subscriber(other) if other == subscriber));
	}

	/// Adds a dependent, if not yet added
	pub(super) fn add_dependent(&self, recompute: &Recompute) {
		let mut entries = self.entries.borrow_mut();
		let exists = entries
			.iter()
			.any(|entry| matches!(entry, Entry::Dependent(other) if Rc::ptr_eq(other, recompute)));
		if !exists {
			entries.push(Entry::Dependent(Rc::clone(recompute)));
		}
	}

	/// Removes a dependent, if it exists
	pub(super) fn remove_dependent(&self, recompute: &Recompute) {
		self.entries
			.borrow_mut()
			.retain(|entry| !matches!(entry, Entry::Dependent(other) if Rc::ptr_eq(other, recompute)));
	}

	/// Notifies every entry with `value`.
	///
	/// Entries added or removed while notifying only take effect
	/// on the next notification.
	pub(super) fn notify(&self, value: Option<&T>) {
		let entries = self.entries.borrow().clone();
		for entry in &entries {
			entry.notify(value);
		}
	}

	/// Returns if there are no entries
	pub(super) fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Returns the number of user subscribers
	pub(super) fn subscriber_count(&self) -> usize {
		self.entries
			.borrow()
			.iter()
			.filter(|entry| matches!(entry, Entry::Subscriber(_)))
			.count()
	}

	/// Returns the number of dependents
	pub(super) fn dependent_count(&self) -> usize {
		self.entries
			.borrow()
			.iter()
			.filter(|entry| matches!(entry, Entry::Dependent(_)))
			.count()
	}
}
