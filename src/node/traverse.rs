use std::collections::VecDeque;

use super::error::GraphError;
use super::{Graph, Node, NodeId};

/// Visits `root` and everything it owns, parents before children, each
/// subtree finished before its next sibling.
///
/// Returning `false` from `visit` stops the walk.
pub fn traverse_depth_first<T, F>(graph: &Graph<T>, root: NodeId, mut visit: F)
where
	F: FnMut(NodeId, &Node<T>) -> bool,
{
	let mut stack = vec![root];
	while let Some(id) = stack.pop() {
		let node = &graph[id];
		if !visit(id, node) {
			return;
		}
		stack.extend(node.children().iter().rev());
	}
}

/// Visits `root` and everything it owns, level by level.
///
/// Returning `false` from `visit` stops the walk.
pub fn traverse_breadth_first<T, F>(graph: &Graph<T>, root: NodeId, mut visit: F)
where
	F: FnMut(NodeId, &Node<T>) -> bool,
{
	let mut queue = VecDeque::new();
	queue.push_back(root);
	while let Some(id) = queue.pop_front() {
		let node = &graph[id];
		if !visit(id, node) {
			return;
		}
		queue.extend(node.children());
	}
}

/// The subtree under `root` (inclusive) in depth-first order.
pub fn depth_first<T>(graph: &Graph<T>, root: NodeId) -> Vec<NodeId> {
	let mut out = Vec::new();
	traverse_depth_first(graph, root, |id, _| {
		out.push(id);
		true
	});
	out
}

/// The subtree under `root` (inclusive) in breadth-first order.
pub fn breadth_first<T>(graph: &Graph<T>, root: NodeId) -> Vec<NodeId> {
	let mut out = Vec::new();
	traverse_breadth_first(graph, root, |id, _| {
		out.push(id);
		true
	});
	out
}

/// Breaks up the subtree under `root` (inclusive): every node is
/// disconnected from its parent and lifted off its terrain.
///
/// Freed samples are then placed onto `new_terrain`, if one is given, so
/// they can be picked up from there.
pub fn detach_tree<T>(
	graph: &mut Graph<T>,
	root: NodeId,
	new_terrain: Option<NodeId>
) -> Result<(), GraphError> {
	for id in depth_first(graph, root) {
		graph.disconnect(id)?;
		graph.lift(id)?;
		if let Some(terrain) = new_terrain {
			if graph[id].is_sample() {
				graph.place(id, terrain)?;
			}
		}
	}
	Ok(())
}

/// Walks up from `node` along terrain links until a cluster is found.
///
/// `Ok(None)` means the walk ran off the tree: the node is on (or is) the
/// support node, or it stands on something that was itself detached.
pub fn find_cluster<T>(graph: &Graph<T>, node: NodeId) -> Result<Option<NodeId>, GraphError> {
	let mut current = node;
	loop {
		let n = &graph[current];
		if n.is_cluster() {
			return Ok(Some(current));
		}
		match n.terrain() {
			Some(t) if t == current => return Err(GraphError::TerrainSelfReference(current)),
			Some(t) => current = t,
			None => return Ok(None),
		}
	}
}

/// The top-level cluster whose mean is closest to `node`'s color, and how
/// far it is.
///
/// `None` if there are no clusters, or none at a distance that compares
/// below infinity.
pub fn most_similar_cluster<T, D>(
	graph: &Graph<T>,
	node: NodeId,
	distance: D
) -> Result<Option<(NodeId, f64)>, GraphError>
where
	D: Fn(&[f64], &[f64]) -> f64,
{
	let color = graph.color(node)?;
	let mut best = None;
	let mut min_dist = f64::INFINITY;
	for &cluster in graph[graph.support()].children() {
		if cluster == node {
			continue;
		}
		let dist = distance(color, graph.color(cluster)?);
		if dist < min_dist {
			min_dist = dist;
			best = Some(cluster);
		}
	}
	Ok(best.map(|c| (c, min_dist)))
}
