pub mod ingest;
pub mod mst;
pub mod options;
pub mod palette;

use std::time::Duration;

use log::{debug, trace};

use crate::node::cluster::ClusterStats;
use crate::node::error::{ConfigError, GraphError};
use crate::node::sample::Sample;
use crate::node::traverse::{detach_tree, find_cluster, most_similar_cluster};
use crate::node::{Graph, NodeId};
use options::{DistanceFn, Options, ProcessedHook, ProgressHook, RandomFn, StepHook};

/// Ant-tree color quantizer.
///
/// Samples ("ants") start out standing on the support node. Every call to
/// `step` walks a window of them and moves each free one a little further
/// into the tree: founding or joining a cluster when it is at the root, and
/// growing the tree under that cluster otherwise. Once no sample is free a
/// pass is over; after `max_iterations` passes the run is finished and the
/// clusters hanging off the support node form the palette.
///
/// Cluster statistics carry over from pass to pass, so later passes weigh
/// in on top of earlier ones.
pub struct Atcq<T = ()> {
	graph: Graph<T>,
	samples: Vec<NodeId>,

	max_colors: usize,
	node_child_limit: usize,
	distance: DistanceFn,
	disconnects: bool,
	alpha: f64,
	min_distance: f64,
	random: RandomFn,
	max_iterations: usize,
	dimensions: usize,
	progress_interval: f64,
	window_size: Option<usize>,

	on_processed: Option<ProcessedHook<T>>,
	on_progress: Option<ProgressHook>,
	on_step: Option<StepHook>,

	started: bool,
	finished: bool,
	last_progress: f64,
	cursor: usize,
	iterations: usize,
}

impl<T> Atcq<T> {
	/// Checks `options` and sets up an empty tree.
	pub fn new(options: Options<T>) -> Result<Self, ConfigError> {
		options.validate()?;
		let node_child_limit = options.effective_child_limit();
		Ok(Atcq {
			graph: Graph::new(),
			samples: Vec::new(),
			max_colors: options.max_colors,
			node_child_limit,
			distance: options.distance,
			disconnects: options.disconnects,
			alpha: options.alpha,
			min_distance: options.min_distance,
			random: options.random,
			max_iterations: options.max_iterations,
			dimensions: options.dimensions,
			progress_interval: options.progress_interval,
			window_size: options.window_size,
			on_processed: options.on_processed,
			on_progress: options.on_progress,
			on_step: options.on_step,
			started: false,
			finished: false,
			last_progress: 0.,
			cursor: 0,
			iterations: 0,
		})
	}

	/// The live tree.
	pub fn graph(&self) -> &Graph<T> {
		&self.graph
	}

	/// Every sample node, in the order the samples were added.
	pub fn samples(&self) -> &[NodeId] {
		&self.samples
	}

	/// The current top-level clusters, oldest first.
	pub fn clusters(&self) -> Vec<NodeId> {
		self.graph[self.graph.support()].children().to_vec()
	}

	pub fn cluster(&self, id: NodeId) -> Option<&ClusterStats> {
		self.graph.get(id).and_then(|n| n.as_cluster())
	}

	pub fn max_colors(&self) -> usize {
		self.max_colors
	}

	pub fn max_iterations(&self) -> usize {
		self.max_iterations
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	/// Number of completed passes.
	pub fn iterations(&self) -> usize {
		self.iterations
	}

	pub fn started(&self) -> bool {
		self.started
	}

	pub fn finished(&self) -> bool {
		self.finished
	}

	/// Stops the run; further steps do nothing.
	pub fn finish(&mut self) {
		self.finished = true;
	}

	/// Number of samples not yet committed into the tree.
	pub fn count_moving(&self) -> usize {
		self.samples.iter().filter(|id| self.graph[**id].is_moving()).count()
	}

	/// How far along the whole run is, from 0 to 1.
	pub fn progress(&self) -> f64 {
		self.compute_progress(self.count_moving())
	}

	fn compute_progress(&self, moving: usize) -> f64 {
		let placed = if self.samples.is_empty() {
			1.
		} else {
			1. - moving as f64 / self.samples.len() as f64
		};
		placed * (1. / self.max_iterations as f64) + self.iterations as f64 / self.max_iterations as f64
	}

	/// Rewinds the run while keeping the samples: every cluster is dropped,
	/// every sample is put back on the support node, and the iteration
	/// counter starts over.
	///
	/// Node ids handed out before the restart are no longer valid.
	pub fn restart(&mut self) {
		self.cursor = 0;
		self.last_progress = 0.;
		self.iterations = 0;
		self.started = false;
		self.finished = false;
		let old = std::mem::take(&mut self.graph);
		self.samples.clear();
		for sample in old.into_samples() {
			self.push_sample(sample);
		}
	}

	/// Rewinds the run and forgets every sample.
	pub fn clear(&mut self) {
		self.restart();
		self.graph = Graph::new();
		self.samples.clear();
	}

	/// Replaces the random source, e.g. to replay a run after `restart`.
	pub fn set_random<F>(&mut self, f: F)
	where
		F: FnMut() -> f64 + 'static,
	{
		self.random = Box::new(f);
	}

	/// New samples always start out standing on the support node.
	pub(crate) fn push_sample(&mut self, sample: Sample<T>) -> NodeId {
		let root = self.graph.support();
		let id = self.graph.insert_sample(sample);
		self.samples.push(id);
		// A fresh node has no parent, so placing can't fail
		let _ = self.graph.place(id, root);
		id
	}

	/// Advances the run by one window of samples.
	///
	/// Does nothing once the run has finished.
	pub fn step(&mut self) -> Result<(), GraphError> {
		if self.finished {
			return Ok(());
		}
		self.started = true;

		let root = self.graph.support();
		let total = self.samples.len();
		let per_step = self.window_size.map_or(total, |w| w.min(total));
		for c in 0..per_step {
			let id = self.samples[(c + self.cursor) % total];
			if self.graph[id].is_moving() {
				match self.graph[id].terrain() {
					None => self.support_case(id)?,
					Some(t) if t == root => self.support_case(id)?,
					Some(t) => {
						if self.disconnects {
							self.not_support_case(id)?;
						} else {
							self.graph.place(id, t)?;
							self.graph.add(t, id)?;
						}
					},
				}
			}
			if let Some(hook) = self.on_processed.as_mut() {
				hook(id, &self.graph[id]);
			}
		}
		if total > 0 {
			self.cursor = (self.cursor + per_step) % total;
		}

		if let Some(hook) = self.on_step.as_mut() {
			hook();
		}

		let remaining = self.count_moving();
		let progress = self.compute_progress(remaining);
		let mut report = true;
		if remaining == 0 {
			self.iterations += 1;
			if self.iterations < self.max_iterations {
				debug!(
					"pass {} of {} done with {} clusters",
					self.iterations,
					self.max_iterations,
					self.graph[root].child_count()
				);
				self.next_iteration()?;
			} else {
				debug!("finished with {} clusters", self.graph[root].child_count());
				report = false;
				self.finish();
				self.report_progress(1.);
			}
		}
		if report && (progress - self.last_progress).abs() >= self.progress_interval {
			self.last_progress = progress;
			self.report_progress(progress);
		}
		Ok(())
	}

	fn report_progress(&mut self, progress: f64) {
		if let Some(hook) = self.on_progress.as_mut() {
			hook(progress);
		}
	}

	/// Sets every sample free again for another pass. Clusters keep their
	/// statistics.
	fn next_iteration(&mut self) -> Result<(), GraphError> {
		for &id in &self.samples {
			self.graph.disconnect(id)?;
			self.graph.lift(id)?;
			self.graph.clear_disconnected(id);
		}
		Ok(())
	}

	/// A free sample at the root either founds a new cluster or is sent
	/// toward the closest existing one.
	fn support_case(&mut self, id: NodeId) -> Result<(), GraphError> {
		let root = self.graph.support();
		let cluster_count = self.graph[root].child_count();
		if cluster_count == 0 {
			return self.create_cluster(id);
		}

		let (cluster, dist) = most_similar_cluster(&self.graph, id, &self.distance)?
			.ok_or(GraphError::NoCandidateCluster(id))?;
		let radius = self.graph[cluster].as_cluster()
			.map(ClusterStats::relative_error)
			.ok_or(GraphError::NotACluster(cluster))?;
		if dist > self.min_distance && dist < radius && cluster_count < self.max_colors {
			self.create_cluster(id)
		} else {
			// Head for the cluster without joining it yet
			self.graph.place(id, cluster)?;
			self.graph.contribute(cluster, id, dist)
		}
	}

	fn create_cluster(&mut self, id: NodeId) -> Result<(), GraphError> {
		let root = self.graph.support();
		let cluster = self.graph.insert_cluster(ClusterStats::new(self.alpha, self.dimensions));
		self.graph.add(root, cluster)?;
		self.graph.place(id, cluster)?;
		self.graph.add(cluster, id)?;
		self.graph.contribute(cluster, id, 0.)?;
		debug!("sample {} founded cluster {}", id, cluster);
		Ok(())
	}

	/// A free sample standing somewhere below the root tries to attach
	/// there, evicts an unproven branch, or moves one level deeper.
	fn not_support_case(&mut self, id: NodeId) -> Result<(), GraphError> {
		let other = self.graph[id].terrain().ok_or(GraphError::MissingTerrain(id))?;
		let count = self.graph[other].child_count();
		if count == 0 {
			self.graph.place(id, other)?;
			return self.graph.add(other, id);
		}

		if count == 2 {
			let second = self.graph[other].children()[1];
			if !self.graph[second].has_disconnected() {
				trace!("sample {} evicts branch {} from {}", id, second, other);
				detach_tree(&mut self.graph, second, None)?;
				self.graph.place(id, other)?;
				return self.graph.add(other, id);
			}
		}

		let cluster = match find_cluster(&self.graph, id)? {
			Some(c) => c,
			None => {
				// The branch this sample was following got evicted
				trace!("sample {} lost its cluster, back to the root", id);
				return detach_tree(&mut self.graph, id, None);
			},
		};

		let pick = ((self.random)() * count as f64).floor() as usize;
		let probe = self.graph[other].children()[pick.min(count - 1)];
		let radius = self.graph[cluster].as_cluster()
			.map(ClusterStats::relative_error)
			.ok_or(GraphError::NotACluster(cluster))?;
		let dist = (self.distance)(self.graph.color(id)?, self.graph.color(probe)?);

		// Ties are accepted so that uniform inputs (where every distance is
		// the radius) can still grow.
		if dist <= radius && count < self.node_child_limit {
			self.graph.place(id, other)?;
			self.graph.add(other, id)
		} else {
			self.graph.place(id, probe)
		}
	}

	/// Steps until the run is finished.
	pub fn quantize_sync(&mut self) -> Result<(), GraphError> {
		while !self.finished {
			self.step()?;
		}
		Ok(())
	}

	/// Steps once every `interval` until the run is finished, yielding to
	/// the runtime in between.
	///
	/// Dropping the returned future stops the run between steps; a step is
	/// never cut short.
	pub async fn quantize_async(&mut self, interval: Duration) -> Result<(), GraphError> {
		if self.finished {
			return Ok(());
		}
		let mut ticker = tokio::time::interval(std::cmp::max(interval, Duration::from_nanos(1)));
		while !self.finished {
			ticker.tick().await;
			self.step()?;
		}
		Ok(())
	}
}
