//! Dependency graph
//!
//! Properties of any value type may depend on each other, so
//! the graph is walked through the type-erased [`Dependency`] trait.

// Imports
use {
	crate::{PropertyId, ReadError},
	core::panic::Location,
	petgraph::{
		dot::{Config, Dot},
		graph::{DiGraph, NodeIndex},
	},
	std::{
		collections::{HashMap, VecDeque, hash_map},
		rc::Rc,
	},
};

/// Callback run on a dependent whenever one of its dependencies changes
pub(crate) type Recompute = Rc<dyn Fn()>;

/// A property, as seen by the properties depending on it
pub(crate) trait Dependency {
	/// Returns the id of this property
	fn id(&self) -> PropertyId;

	/// Returns the name of this property
	fn name(&self) -> String;

	/// Returns where this property was defined
	fn defined_loc(&self) -> &'static Location<'static>;

	/// Ensures this property is up to date, recomputing it if stale
	fn ensure_updated(&self) -> Result<(), ReadError>;

	/// Registers a dependent's recompute callback
	fn add_dependent(&self, recompute: &Recompute);

	/// Unregisters a dependent's recompute callback
	fn remove_dependent(&self, recompute: &Recompute);

	/// Returns the dependencies observed on the last evaluation
	fn dependencies(&self) -> Vec<Rc<dyn Dependency>>;
}

/// Exports `root` and all of it's transitive dependencies as a dot graph.
///
/// Edges point from each dependency to it's dependent.
pub(crate) fn export_dot(root: Rc<dyn Dependency>) -> String {
	let mut graph = DiGraph::<String, &str>::new();
	let mut nodes = HashMap::<PropertyId, NodeIndex>::new();

	let root_idx = graph.add_node(self::node_label(&*root));
	nodes.insert(root.id(), root_idx);

	let mut queue = VecDeque::from([(root, root_idx)]);
	while let Some((dependent, dependent_idx)) = queue.pop_front() {
		for dep in dependent.dependencies() {
			let dep_idx = match nodes.entry(dep.id()) {
				hash_map::Entry::Occupied(entry) => *entry.get(),
				hash_map::Entry::Vacant(entry) => {
					let dep_idx = *entry.insert(graph.add_node(self::node_label(&*dep)));
					queue.push_back((dep, dep_idx));
					dep_idx
				},
			};

			graph.add_edge(dep_idx, dependent_idx, "");
		}
	}

	Dot::with_config(&graph, &[Config::EdgeNoLabel]).to_string()
}

/// Returns the label of a node
fn node_label(dep: &dyn Dependency) -> String {
	format!("{} {} ({})", dep.name(), dep.id(), dep.defined_loc())
}
