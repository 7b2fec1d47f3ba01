//! Reactive properties
//!
//! A [`Property`] holds a value, optionally derived from other properties
//! through a computation. Dependencies are discovered while the computation
//! runs, and the property is kept up to date whenever any of them change.
//!
//! All properties belong to a [`Context`], which owns the step clock and the
//! dependency tracking stack for that graph of properties.
//!
//! ```rust
//! use propel_reactive::Context;
//!
//! let ctx = Context::new();
//! let root = ctx.property().with_name("root").with_value(1);
//! let plus_one = ctx.property().computed({
//! 	let root = root.clone();
//! 	move || root.get().unwrap_or(0) + 1
//! });
//!
//! assert_eq!(plus_one.get(), Some(2));
//! root.set(1000);
//! assert_eq!(plus_one.get(), Some(1001));
//! ```

// Modules
pub mod context;
pub mod dep_graph;
pub mod error;
pub mod property;

// Exports
pub use self::{
	context::Context,
	error::ReadError,
	property::{IntoSubscriber, Property, PropertyId, Subscriber},
};
