use std::cmp::Ordering;
use std::collections::HashSet;

use bitvec::order::Msb0;
use bitvec::vec::BitVec;

use crate::node::error::ConfigError;

/// Marks which items are already part of the tree being grown.
type ConnectedSet = BitVec<u8, Msb0>;

/// Edge of a spanning tree, by index into the item slice it was built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	/// The item that was already connected.
	pub from: usize,
	/// The item the edge brought in.
	pub to: usize,
	pub distance: f64,
}

/// Grows a minimum spanning tree from the first item, one nearest item at
/// a time.
///
/// Edges come out in the order they were found. Growth stops early after
/// `max_steps` rounds, or once no remaining item is at a finite distance,
/// in which case the result only spans part of `items`.
pub fn minimum_spanning_tree<I, D>(items: &[I], distance: D, max_steps: Option<usize>) -> Vec<Edge>
where
	D: Fn(&I, &I) -> f64,
{
	if items.len() <= 1 {
		return Vec::new();
	}
	let mut connected_set: ConnectedSet = BitVec::repeat(false, items.len());
	connected_set.set(0, true);
	let mut connected = vec![0];
	let mut seen = HashSet::new();
	let mut edges = Vec::new();
	let mut steps = 0;
	while connected.len() < items.len() && max_steps.map_or(true, |m| steps < m) {
		steps += 1;
		let mut nearest = None;
		let mut min_dist = f64::INFINITY;
		for &a in &connected {
			for b in (0..items.len()).filter(|b| !connected_set[*b]) {
				let d = distance(&items[a], &items[b]);
				if d < min_dist {
					min_dist = d;
					nearest = Some((a, b));
				}
			}
		}
		let (from, to) = match nearest {
			Some(pair) if min_dist.is_finite() => pair,
			_ => break,
		};
		if seen.insert((from.min(to), from.max(to))) {
			edges.push(Edge { from, to, distance: min_dist });
			connected_set.set(to, true);
			connected.push(to);
		}
	}
	edges
}

/// Splits `items` into at most `k` groups by cutting the longest edges of
/// their minimum spanning tree.
///
/// Edges at or beyond `max_distance` are never used to join items, so more
/// than `k` groups may come back when it is set. Groups are ordered by
/// their smallest index, and list their members in ascending order.
pub fn disjoint_subsets<I, D>(
	items: &[I],
	distance: D,
	k: usize,
	max_distance: Option<f64>
) -> Result<Vec<Vec<usize>>, ConfigError>
where
	D: Fn(&I, &I) -> f64,
{
	if k < 1 {
		return Err(ConfigError::InvalidTarget);
	}
	if items.is_empty() {
		return Ok(Vec::new());
	}
	if k == 1 {
		return Ok(vec![(0..items.len()).collect()]);
	}
	let mut edges = minimum_spanning_tree(items, distance, None);
	if let Some(max) = max_distance {
		edges.retain(|e| e.distance < max);
	}
	edges.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
	loop {
		let groups = components(items.len(), &edges);
		if groups.len() >= k || edges.is_empty() {
			return Ok(groups);
		}
		edges.pop();
	}
}

/// Connected components of `n` items joined by `edges`, via union-find.
fn components(n: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
	let mut parent = (0..n).collect::<Vec<_>>();
	fn root(parent: &mut [usize], mut i: usize) -> usize {
		while parent[i] != i {
			parent[i] = parent[parent[i]];
			i = parent[i];
		}
		i
	}
	for e in edges {
		let (a, b) = (root(&mut parent, e.from), root(&mut parent, e.to));
		if a != b {
			parent[a.max(b)] = a.min(b);
		}
	}
	let mut groups: Vec<Vec<usize>> = Vec::new();
	let mut slot = vec![usize::MAX; n];
	for i in 0..n {
		let r = root(&mut parent, i);
		if slot[r] == usize::MAX {
			slot[r] = groups.len();
			groups.push(Vec::new());
		}
		groups[slot[r]].push(i);
	}
	groups
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dist(a: &f64, b: &f64) -> f64 {
		(a - b).abs()
	}

	#[test]
	fn spans_points_on_a_line() {
		let items = [0., 10., 1., 12., 5.];
		let edges = minimum_spanning_tree(&items, dist, None);
		assert_eq!(edges, vec![
			Edge { from: 0, to: 2, distance: 1. },
			Edge { from: 2, to: 4, distance: 4. },
			Edge { from: 4, to: 1, distance: 5. },
			Edge { from: 1, to: 3, distance: 2. },
		]);
	}

	#[test]
	fn trivial_inputs() {
		assert!(minimum_spanning_tree::<f64, _>(&[], dist, None).is_empty());
		assert!(minimum_spanning_tree(&[3.], dist, None).is_empty());
	}

	#[test]
	fn step_limit_and_unreachable_items() {
		let items = [0., 10., 1., 12., 5.];
		assert_eq!(minimum_spanning_tree(&items, dist, Some(2)).len(), 2);
		let far = |a: &f64, b: &f64| if *a > 100. || *b > 100. { f64::INFINITY } else { dist(a, b) };
		let edges = minimum_spanning_tree(&[0., 1., 1000.], far, None);
		assert_eq!(edges, vec![Edge { from: 0, to: 1, distance: 1. }]);
	}

	#[test]
	fn subsets_cut_longest_edges() {
		let items = [0., 10., 1., 12., 5.];
		assert_eq!(disjoint_subsets(&items, dist, 1, None), Ok(vec![vec![0, 1, 2, 3, 4]]));
		assert_eq!(disjoint_subsets(&items, dist, 2, None), Ok(vec![vec![0, 2, 4], vec![1, 3]]));
		assert_eq!(
			disjoint_subsets(&items, dist, 3, None),
			Ok(vec![vec![0, 2], vec![1, 3], vec![4]])
		);
		assert_eq!(disjoint_subsets(&items, dist, 9, None).map(|g| g.len()), Ok(5));
		assert_eq!(disjoint_subsets(&items, dist, 0, None), Err(ConfigError::InvalidTarget));
		assert_eq!(disjoint_subsets::<f64, _>(&[], dist, 2, None), Ok(vec![]));
	}

	#[test]
	fn subsets_respect_max_distance() {
		let items = [0., 10., 1., 12., 5.];
		assert_eq!(
			disjoint_subsets(&items, dist, 2, Some(3.)),
			Ok(vec![vec![0, 2], vec![1, 3], vec![4]])
		);
	}
}
