pub mod cluster;
pub mod error;
pub mod sample;
pub mod traverse;

use std::fmt;
use std::ops::Index;

use cluster::ClusterStats;
use error::GraphError;
use sample::Sample;

/// Handle to a node stored in a `Graph`.
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// Position of the node in its graph's arena.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// What a node is, along with whatever it carries for being that.
#[derive(Clone, Debug)]
pub enum NodeKind<T> {
	/// The root; its children are the top-level clusters.
	Support,
	/// A color group hanging directly off the support node.
	Cluster(ClusterStats),
	/// One input color (an "ant").
	Sample(Sample<T>),
}

/// Node in the ant tree.
///
/// Ownership (`parent`/`children`) and position (`terrain`) are tracked
/// separately: a sample can stand on a node without being one of its
/// children, which is how it "visits" a spot in the tree before joining.
#[derive(Clone, Debug)]
pub struct Node<T> {
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	terrain: Option<NodeId>,
	has_disconnected: bool,
	kind: NodeKind<T>,
}

impl<T> Node<T> {
	fn new(kind: NodeKind<T>) -> Self {
		Node {
			parent: None,
			children: Vec::new(),
			terrain: None,
			has_disconnected: false,
			kind,
		}
	}

	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Children in the order they were added.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	pub fn child_count(&self) -> usize {
		self.children.len()
	}

	/// The node this one is currently standing on, if any.
	pub fn terrain(&self) -> Option<NodeId> {
		self.terrain
	}

	/// Whether this node has ever been removed from a parent since the
	/// last iteration reset.
	pub fn has_disconnected(&self) -> bool {
		self.has_disconnected
	}

	/// A node is moving while it is not committed into the tree,
	/// regardless of where it stands.
	pub fn is_moving(&self) -> bool {
		self.parent.is_none()
	}

	pub fn kind(&self) -> &NodeKind<T> {
		&self.kind
	}

	pub fn is_support(&self) -> bool {
		matches!(self.kind, NodeKind::Support)
	}

	pub fn is_cluster(&self) -> bool {
		matches!(self.kind, NodeKind::Cluster(_))
	}

	pub fn is_sample(&self) -> bool {
		matches!(self.kind, NodeKind::Sample(_))
	}

	pub fn as_cluster(&self) -> Option<&ClusterStats> {
		match &self.kind {
			NodeKind::Cluster(c) => Some(c),
			_ => None,
		}
	}

	pub fn as_sample(&self) -> Option<&Sample<T>> {
		match &self.kind {
			NodeKind::Sample(s) => Some(s),
			_ => None,
		}
	}

	/// The sample's own color, or a cluster's running mean.
	///
	/// The support node has no color.
	pub fn color(&self) -> Option<&[f64]> {
		match &self.kind {
			NodeKind::Support => None,
			NodeKind::Cluster(c) => Some(c.color()),
			NodeKind::Sample(s) => Some(s.color()),
		}
	}
}

/// Arena holding every node of one ant tree.
///
/// The support node is created with the graph and always lives at the
/// first slot.
#[derive(Clone, Debug)]
pub struct Graph<T> {
	nodes: Vec<Node<T>>,
}

impl<T> Default for Graph<T> {
	fn default() -> Self {
		Graph { nodes: vec![Node::new(NodeKind::Support)] }
	}
}

impl<T> Graph<T> {
	pub fn new() -> Self {
		Default::default()
	}

	/// The root of the tree.
	pub fn support(&self) -> NodeId {
		NodeId(0)
	}

	/// Number of nodes in the arena, the support node included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
		self.nodes.get(id.0)
	}

	/// Iterates over every node in the arena, in creation order.
	pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> {
		self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
	}

	/// Adds a free-floating sample node with no terrain.
	pub fn insert_sample(&mut self, sample: Sample<T>) -> NodeId {
		self.insert(NodeKind::Sample(sample))
	}

	/// Adds a free-floating cluster node with no terrain.
	pub fn insert_cluster(&mut self, stats: ClusterStats) -> NodeId {
		self.insert(NodeKind::Cluster(stats))
	}

	fn insert(&mut self, kind: NodeKind<T>) -> NodeId {
		self.nodes.push(Node::new(kind));
		NodeId(self.nodes.len() - 1)
	}

	/// Folds `sample`'s color into `cluster`'s running statistics.
	///
	/// This doesn't make the sample a child of the cluster.
	pub fn contribute(&mut self, cluster: NodeId, sample: NodeId, distance: f64) -> Result<(), GraphError> {
		if cluster == sample {
			return Err(GraphError::NotACluster(cluster));
		}
		let (c, s) = self.pair_mut(cluster, sample);
		let color = s.color().ok_or(GraphError::Colorless(sample))?;
		match &mut c.kind {
			NodeKind::Cluster(stats) => {
				stats.contribute(color, distance);
				Ok(())
			},
			_ => Err(GraphError::NotACluster(cluster)),
		}
	}

	/// Two distinct nodes, both mutable.
	fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<T>, &mut Node<T>) {
		if a.0 < b.0 {
			let (lo, hi) = self.nodes.split_at_mut(b.0);
			(&mut lo[a.0], &mut hi[0])
		} else {
			let (lo, hi) = self.nodes.split_at_mut(a.0);
			(&mut hi[0], &mut lo[b.0])
		}
	}

	/// Consumes the graph, keeping only the sample payloads in creation order.
	pub(crate) fn into_samples(self) -> Vec<Sample<T>> {
		self.nodes.into_iter().filter_map(|n| match n.kind {
			NodeKind::Sample(s) => Some(s),
			_ => None,
		}).collect()
	}

	/// Like `Node::color`, but an error for the support node.
	pub fn color(&self, id: NodeId) -> Result<&[f64], GraphError> {
		self[id].color().ok_or(GraphError::Colorless(id))
	}

	/// Moves a node onto `terrain` without changing who owns it.
	///
	/// Only nodes without a parent may move.
	pub fn place(&mut self, id: NodeId, terrain: NodeId) -> Result<(), GraphError> {
		let node = &mut self.nodes[id.0];
		if node.parent.is_some() {
			return Err(GraphError::PlaceCommitted(id));
		}
		node.terrain = Some(terrain);
		Ok(())
	}

	/// Takes a node off whatever it is standing on.
	pub fn lift(&mut self, id: NodeId) -> Result<(), GraphError> {
		let node = &mut self.nodes[id.0];
		if node.parent.is_some() {
			return Err(GraphError::LiftCommitted(id));
		}
		node.terrain = None;
		Ok(())
	}

	/// Makes `child` owned by `parent`.
	///
	/// `child` may not already own `parent`, directly or further up.
	pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
		if self.nodes[child.0].parent.is_some() {
			return Err(GraphError::AlreadyAdded(child));
		}
		let mut owner = Some(parent);
		while let Some(id) = owner {
			if id == child {
				return Err(GraphError::Cycle { parent, child });
			}
			owner = self.nodes[id.0].parent;
		}
		self.nodes[parent.0].children.push(child);
		self.nodes[child.0].parent = Some(parent);
		Ok(())
	}

	/// Releases `child` from `parent`, marking it as having disconnected.
	///
	/// Does nothing if `child` isn't one of `parent`'s children.
	pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
		let pos = match self.nodes[parent.0].children.iter().position(|c| *c == child) {
			Some(p) => p,
			None => return Ok(()),
		};
		if self.nodes[child.0].parent != Some(parent) {
			return Err(GraphError::ParentMismatch { parent, child });
		}
		self.nodes[parent.0].children.remove(pos);
		let node = &mut self.nodes[child.0];
		node.parent = None;
		node.has_disconnected = true;
		Ok(())
	}

	/// Detaches a node from its parent, if it has one.
	pub fn disconnect(&mut self, id: NodeId) -> Result<(), GraphError> {
		match self.nodes[id.0].parent {
			Some(parent) => self.remove(parent, id),
			None => Ok(()),
		}
	}

	/// Forgets that a node has ever disconnected; used between iterations.
	pub(crate) fn clear_disconnected(&mut self, id: NodeId) {
		self.nodes[id.0].has_disconnected = false;
	}
}

impl<T> Index<NodeId> for Graph<T> {
	type Output = Node<T>;

	fn index(&self, id: NodeId) -> &Node<T> {
		&self.nodes[id.0]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample(graph: &mut Graph<()>, color: &[f64]) -> NodeId {
		graph.insert_sample(Sample::new(color.to_vec()))
	}

	#[test]
	fn place_and_lift_only_when_free() {
		let mut graph = Graph::new();
		let root = graph.support();
		let a = sample(&mut graph, &[1., 2., 3.]);
		let b = sample(&mut graph, &[4., 5., 6.]);

		graph.place(a, root).unwrap();
		assert_eq!(graph[a].terrain(), Some(root));
		assert!(graph[a].is_moving());

		graph.add(b, a).unwrap();
		assert_eq!(graph.place(a, b), Err(GraphError::PlaceCommitted(a)));
		assert_eq!(graph.lift(a), Err(GraphError::LiftCommitted(a)));

		graph.disconnect(a).unwrap();
		graph.lift(a).unwrap();
		assert_eq!(graph[a].terrain(), None);
	}

	#[test]
	fn add_rejects_owned_child() {
		let mut graph = Graph::new();
		let root = graph.support();
		let cluster = graph.insert_cluster(ClusterStats::new(0.25, 3));
		let a = sample(&mut graph, &[0.; 3]);
		graph.add(root, cluster).unwrap();
		graph.add(cluster, a).unwrap();
		assert_eq!(graph.add(root, a), Err(GraphError::AlreadyAdded(a)));
		assert_eq!(graph[cluster].children(), &[a]);
		assert_eq!(graph[a].parent(), Some(cluster));
		assert!(!graph[a].is_moving());
	}

	#[test]
	fn add_rejects_cycles() {
		let mut graph = Graph::new();
		let root = graph.support();
		let a = sample(&mut graph, &[0.; 3]);
		let b = sample(&mut graph, &[1.; 3]);
		let c = sample(&mut graph, &[2.; 3]);
		assert_eq!(graph.add(a, a), Err(GraphError::Cycle { parent: a, child: a }));

		graph.add(a, b).unwrap();
		graph.add(b, c).unwrap();
		// `a` owns `c` through `b`
		assert_eq!(graph.add(c, a), Err(GraphError::Cycle { parent: c, child: a }));
		assert!(graph[a].is_moving());
		assert!(graph[c].children().is_empty());

		graph.add(root, a).unwrap();
		assert_eq!(crate::node::traverse::depth_first(&graph, root), vec![root, a, b, c]);
	}

	#[test]
	fn remove_marks_disconnected_and_ignores_strangers() {
		let mut graph = Graph::new();
		let root = graph.support();
		let a = sample(&mut graph, &[0.; 3]);
		let b = sample(&mut graph, &[0.; 3]);
		graph.add(root, a).unwrap();

		// `b` was never added, so this is a no-op
		graph.remove(root, b).unwrap();
		assert!(!graph[b].has_disconnected());

		graph.remove(root, a).unwrap();
		assert!(graph[a].has_disconnected());
		assert!(graph[a].is_moving());
		assert_eq!(graph[root].child_count(), 0);

		// Sticky until cleared explicitly
		graph.add(root, a).unwrap();
		assert!(graph[a].has_disconnected());
		graph.clear_disconnected(a);
		assert!(!graph[a].has_disconnected());
	}

	#[test]
	fn disconnect_without_parent_is_noop() {
		let mut graph: Graph<()> = Graph::new();
		let a = sample(&mut graph, &[0.; 3]);
		graph.disconnect(a).unwrap();
		assert!(!graph[a].has_disconnected());
	}

	#[test]
	fn children_keep_insertion_order() {
		let mut graph = Graph::new();
		let root = graph.support();
		let ids = (0..4).map(|i| sample(&mut graph, &[i as f64; 3])).collect::<Vec<_>>();
		for id in &ids {
			graph.add(root, *id).unwrap();
		}
		graph.disconnect(ids[1]).unwrap();
		graph.add(root, ids[1]).unwrap();
		assert_eq!(graph[root].children(), &[ids[0], ids[2], ids[3], ids[1]]);
	}

	#[test]
	fn contribute_needs_a_cluster() {
		let mut graph = Graph::new();
		let root = graph.support();
		let cluster = graph.insert_cluster(ClusterStats::new(0.5, 3));
		let a = sample(&mut graph, &[2., 4., 6.]);
		let b = sample(&mut graph, &[4., 8., 12.]);
		graph.contribute(cluster, a, 0.).unwrap();
		graph.contribute(cluster, b, 8.).unwrap();
		let stats = graph[cluster].as_cluster().unwrap();
		assert_eq!(stats.size(), 2);
		assert_eq!(stats.color(), &[3., 6., 9.]);
		assert_eq!(stats.relative_error(), 2.);
		// Contributing doesn't adopt
		assert!(graph[a].is_moving());

		assert_eq!(graph.contribute(a, b, 0.), Err(GraphError::NotACluster(a)));
		assert_eq!(graph.contribute(cluster, root, 0.), Err(GraphError::Colorless(root)));
		assert_eq!(graph.contribute(cluster, cluster, 0.), Err(GraphError::NotACluster(cluster)));
	}

	#[test]
	fn support_has_no_color() {
		let graph: Graph<()> = Graph::new();
		let root = graph.support();
		assert!(graph[root].is_support());
		assert_eq!(graph.color(root), Err(GraphError::Colorless(root)));
	}
}
