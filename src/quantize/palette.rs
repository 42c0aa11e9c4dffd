use std::cmp::Ordering;

use log::warn;

use crate::node::cluster::ClusterStats;
use crate::node::error::ConfigError;
use crate::node::NodeId;

use super::mst::{disjoint_subsets, minimum_spanning_tree};
use super::Atcq;

/// One palette entry along with the share of samples behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedColor {
	pub color: Vec<f64>,
	/// Cluster size over the summed size of every reported cluster.
	pub weight: f64,
}

/// Limits for `Atcq::disparate_clusters_with`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReduceOptions {
	/// Number of spanning trees to build at most; unbounded by default.
	pub max_iterations: Option<usize>,
	/// Growth rounds per spanning tree; unbounded by default.
	pub max_steps: Option<usize>,
}

impl<T> Atcq<T> {
	fn cluster_stats(&self) -> Vec<(NodeId, &ClusterStats)> {
		self.clusters().into_iter()
			.filter_map(|id| self.graph[id].as_cluster().map(|c| (id, c)))
			.collect()
	}

	/// Picks `target` clusters that stand out from each other, favoring
	/// larger ones.
	///
	/// The closest pairs along the clusters' minimum spanning tree are
	/// visited first and the smaller cluster of each pair is dropped from
	/// the list. Nothing is merged: the kept clusters report their own
	/// statistics, and the tree is left as it is.
	pub fn disparate_clusters(&self, target: usize) -> Result<Vec<NodeId>, ConfigError> {
		self.disparate_clusters_with(target, Default::default())
	}

	pub fn disparate_clusters_with(
		&self,
		target: usize,
		opts: ReduceOptions
	) -> Result<Vec<NodeId>, ConfigError> {
		if target == 0 {
			return Err(ConfigError::InvalidTarget);
		}
		let mut clusters = self.cluster_stats();
		let mut iterations = 0;
		while clusters.len() > target && opts.max_iterations.map_or(true, |m| iterations < m) {
			iterations += 1;
			let snapshot = clusters.clone();
			let mut links = minimum_spanning_tree(
				&snapshot,
				|a, b| (self.distance)(a.1.color(), b.1.color()),
				opts.max_steps,
			);
			// Longest first, so popping yields the closest pair
			links.sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal));

			let before = clusters.len();
			while clusters.len() > target {
				let link = match links.pop() {
					Some(l) => l,
					None => break,
				};
				let (a, b) = (snapshot[link.from], snapshot[link.to]);
				let doomed = if a.1.size() < b.1.size() { a.0 } else { b.0 };
				if let Some(idx) = clusters.iter().position(|c| c.0 == doomed) {
					clusters.remove(idx);
				}
			}
			if clusters.len() == before {
				warn!("could not reduce {} clusters toward {}", before, target);
				break;
			}
		}
		Ok(clusters.into_iter().map(|c| c.0).collect())
	}

	/// Groups the live clusters into at most `k` sets of mutually close
	/// colors. See `mst::disjoint_subsets`.
	pub fn cluster_groups(&self, k: usize, max_distance: Option<f64>) -> Result<Vec<Vec<NodeId>>, ConfigError> {
		let clusters = self.cluster_stats();
		let groups = disjoint_subsets(
			&clusters,
			|a, b| (self.distance)(a.1.color(), b.1.color()),
			k,
			max_distance,
		)?;
		Ok(groups.into_iter()
			.map(|g| g.into_iter().map(|i| clusters[i].0).collect())
			.collect())
	}

	/// The clusters' colors with their weights, heaviest first.
	///
	/// With `Some(n)` (n > 0) the palette is first narrowed down to `n`
	/// disparate clusters.
	pub fn weighted_palette(&self, n: Option<usize>) -> Vec<WeightedColor> {
		let ids = match n {
			Some(n) if n > 0 => self.disparate_clusters(n).unwrap_or_else(|_| self.clusters()),
			_ => self.clusters(),
		};
		let clusters = ids.iter()
			.filter_map(|id| self.graph[*id].as_cluster())
			.collect::<Vec<_>>();
		let total = clusters.iter().map(|c| c.size()).sum::<usize>() as f64;
		let mut palette = clusters.into_iter()
			.map(|c| WeightedColor {
				color: c.color().to_vec(),
				weight: c.size() as f64 / total,
			})
			.collect::<Vec<_>>();
		palette.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
		palette
	}

	/// Like `weighted_palette`, colors only.
	pub fn palette(&self, n: Option<usize>) -> Vec<Vec<f64>> {
		self.weighted_palette(n).into_iter().map(|w| w.color).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quantize::options::Options;

	/// An engine whose clusters are laid out by hand: one per color, with
	/// the given number of contributions.
	fn with_clusters(layout: &[(f64, usize)]) -> Atcq {
		let mut atcq = Atcq::new(Options::new()).unwrap();
		let root = atcq.graph.support();
		for (value, size) in layout {
			let mut stats = ClusterStats::new(0.25, 3);
			for _ in 0..*size {
				stats.contribute(&[*value; 3], 0.);
			}
			let id = atcq.graph.insert_cluster(stats);
			atcq.graph.add(root, id).unwrap();
		}
		atcq
	}

	#[test]
	fn large_target_keeps_everything() {
		let atcq = with_clusters(&[(0., 3), (10., 1), (100., 2)]);
		assert_eq!(atcq.disparate_clusters(3), Ok(atcq.clusters()));
		assert_eq!(atcq.disparate_clusters(10), Ok(atcq.clusters()));
		assert_eq!(atcq.disparate_clusters(0), Err(ConfigError::InvalidTarget));
	}

	#[test]
	fn drops_the_smaller_of_the_closest_pair() {
		let atcq = with_clusters(&[(0., 3), (10., 1), (100., 2), (105., 5)]);
		let ids = atcq.clusters();
		assert_eq!(atcq.disparate_clusters(3), Ok(vec![ids[0], ids[1], ids[3]]));
		assert_eq!(atcq.disparate_clusters(2), Ok(vec![ids[0], ids[3]]));
		assert_eq!(atcq.disparate_clusters(1), Ok(vec![ids[3]]));
	}

	#[test]
	fn reduction_leaves_statistics_alone() {
		let atcq = with_clusters(&[(0., 3), (10., 1)]);
		let before = atcq.cluster(atcq.clusters()[0]).unwrap().clone();
		let kept = atcq.disparate_clusters(1).unwrap();
		assert_eq!(kept, vec![atcq.clusters()[0]]);
		// The dropped cluster is not folded into the survivor
		assert_eq!(atcq.cluster(kept[0]), Some(&before));
		assert_eq!(atcq.clusters().len(), 2);
	}

	#[test]
	fn iteration_cap() {
		let atcq = with_clusters(&[(0., 1), (1., 2), (2., 3), (3., 4)]);
		let opts = ReduceOptions { max_iterations: Some(1), max_steps: Some(1) };
		// One tree with one edge can only drop one cluster
		assert_eq!(atcq.disparate_clusters_with(1, opts).map(|c| c.len()), Ok(3));
		assert_eq!(atcq.disparate_clusters(1).map(|c| c.len()), Ok(1));
	}

	#[test]
	fn weighted_palette_sorted_by_weight() {
		let atcq = with_clusters(&[(0., 1), (50., 3), (200., 4)]);
		let p = atcq.weighted_palette(None);
		assert_eq!(p, vec![
			WeightedColor { color: vec![200.; 3], weight: 0.5 },
			WeightedColor { color: vec![50.; 3], weight: 0.375 },
			WeightedColor { color: vec![0.; 3], weight: 0.125 },
		]);
		assert_eq!(atcq.weighted_palette(Some(0)), p);
		assert_eq!(atcq.palette(None), vec![vec![200.; 3], vec![50.; 3], vec![0.; 3]]);

		// Weights are renormalised over what is left
		let reduced = atcq.weighted_palette(Some(2));
		assert_eq!(reduced.len(), 2);
		assert_eq!(reduced[0], WeightedColor { color: vec![200.; 3], weight: 4. / 7. });
		assert_eq!(reduced[1].color, vec![50.; 3]);
	}

	#[test]
	fn groups() {
		let atcq = with_clusters(&[(0., 1), (200., 1), (2., 1), (210., 1)]);
		let ids = atcq.clusters();
		assert_eq!(
			atcq.cluster_groups(2, None),
			Ok(vec![vec![ids[0], ids[2]], vec![ids[1], ids[3]]])
		);
	}

	#[test]
	fn empty_palette() {
		let atcq = with_clusters(&[]);
		assert!(atcq.weighted_palette(None).is_empty());
		assert!(atcq.palette(Some(3)).is_empty());
	}
}
