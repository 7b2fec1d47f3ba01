//! Errors

// Imports
use crate::PropertyId;

/// Error reading a property
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum ReadError {
	/// The property's computation is already running further up the stack.
	///
	/// Reading it would require recomputing it from within itself.
	#[error("Dependency cycle: property {name} ({id}) was read while it was being recomputed")]
	Cycle {
		/// Name of the property
		name: String,

		/// Id of the property
		id: PropertyId,
	},
}
