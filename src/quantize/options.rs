use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::node::error::ConfigError;
use crate::node::{Node, NodeId};

/// Measures how different two colors are; must be non-negative.
pub type DistanceFn = Box<dyn Fn(&[f64], &[f64]) -> f64>;
/// Produces uniform numbers in `[0, 1)`.
pub type RandomFn = Box<dyn FnMut() -> f64>;
/// Called for every sample a step visits, moving or not.
pub type ProcessedHook<T> = Box<dyn FnMut(NodeId, &Node<T>)>;
/// Called with the run's progress in `[0, 1]`.
pub type ProgressHook = Box<dyn FnMut(f64)>;
/// Called once at the end of every step.
pub type StepHook = Box<dyn FnMut()>;

/// Squared Euclidean distance over every component.
pub fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
	a.iter().zip(b).map(|(x, y)| {
		let d = y - x;
		d * d
	}).sum()
}

/// Euclidean distance over every component.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
	distance_squared(a, b).sqrt()
}

/// Settings for an `Atcq` run.
///
/// Built up with chained calls and checked by `Atcq::new`:
///
/// ```
/// let opts = atcq::Options::<()>::new()
/// 	.max_colors(8)
/// 	.alpha(0.95)
/// 	.max_iterations(5)
/// 	.seed(42);
/// let engine = atcq::Atcq::new(opts).unwrap();
/// assert_eq!(engine.max_colors(), 8);
/// ```
pub struct Options<T> {
	pub(crate) max_colors: usize,
	pub(crate) node_child_limit: Option<usize>,
	pub(crate) distance: DistanceFn,
	pub(crate) disconnects: bool,
	pub(crate) alpha: f64,
	pub(crate) min_distance: f64,
	pub(crate) random: RandomFn,
	pub(crate) max_iterations: usize,
	pub(crate) dimensions: usize,
	pub(crate) progress_interval: f64,
	pub(crate) window_size: Option<usize>,
	pub(crate) on_processed: Option<ProcessedHook<T>>,
	pub(crate) on_progress: Option<ProgressHook>,
	pub(crate) on_step: Option<StepHook>,
}

impl<T> Default for Options<T> {
	fn default() -> Self {
		Options {
			max_colors: 32,
			node_child_limit: None,
			distance: Box::new(distance_squared),
			disconnects: false,
			alpha: 0.25,
			min_distance: f64::NEG_INFINITY,
			random: Box::new(|| rand::thread_rng().gen::<f64>()),
			max_iterations: 1,
			dimensions: 3,
			progress_interval: 0.2,
			window_size: None,
			on_processed: None,
			on_progress: None,
			on_step: None,
		}
	}
}

impl<T> Options<T> {
	pub fn new() -> Self {
		Default::default()
	}

	/// Upper bound on the number of clusters.
	pub fn max_colors(mut self, n: usize) -> Self {
		self.max_colors = n;
		self
	}

	/// Upper bound on children per node during breadth growth. Defaults to
	/// `max(2, max_colors)`.
	pub fn node_child_limit(mut self, n: usize) -> Self {
		self.node_child_limit = Some(n);
		self
	}

	pub fn distance<F>(mut self, f: F) -> Self
	where
		F: Fn(&[f64], &[f64]) -> f64 + 'static,
	{
		self.distance = Box::new(f);
		self
	}

	/// Enables eviction of unproven branches and probe-based growth.
	/// When off, samples simply join whatever they stand on.
	pub fn disconnects(mut self, enabled: bool) -> Self {
		self.disconnects = enabled;
		self
	}

	/// How strongly accumulated error widens a cluster's similarity radius.
	pub fn alpha(mut self, alpha: f64) -> Self {
		self.alpha = alpha;
		self
	}

	/// Samples at or below this distance from their closest cluster never
	/// found a new cluster. A non-finite value disables the check.
	pub fn min_distance(mut self, d: f64) -> Self {
		self.min_distance = if d.is_finite() { d } else { f64::NEG_INFINITY };
		self
	}

	/// Source of uniform numbers in `[0, 1)` for probe selection.
	pub fn random<F>(mut self, f: F) -> Self
	where
		F: FnMut() -> f64 + 'static,
	{
		self.random = Box::new(f);
		self
	}

	/// Uses a `StdRng` seeded with `seed` for probe selection, making runs
	/// reproducible.
	pub fn seed(self, seed: u64) -> Self {
		let mut rng = StdRng::seed_from_u64(seed);
		self.random(move || rng.gen::<f64>())
	}

	/// Number of full passes over the samples before the run finishes.
	pub fn max_iterations(mut self, n: usize) -> Self {
		self.max_iterations = n;
		self
	}

	/// Number of components in each color.
	pub fn dimensions(mut self, n: usize) -> Self {
		self.dimensions = n;
		self
	}

	/// Minimum change in progress before the progress hook fires again.
	pub fn progress_interval(mut self, interval: f64) -> Self {
		self.progress_interval = interval;
		self
	}

	/// Number of samples visited per step. Defaults to all of them.
	pub fn window_size(mut self, n: usize) -> Self {
		self.window_size = Some(n);
		self
	}

	pub fn on_processed<F>(mut self, f: F) -> Self
	where
		F: FnMut(NodeId, &Node<T>) + 'static,
	{
		self.on_processed = Some(Box::new(f));
		self
	}

	pub fn on_progress<F>(mut self, f: F) -> Self
	where
		F: FnMut(f64) + 'static,
	{
		self.on_progress = Some(Box::new(f));
		self
	}

	pub fn on_step<F>(mut self, f: F) -> Self
	where
		F: FnMut() + 'static,
	{
		self.on_step = Some(Box::new(f));
		self
	}

	/// The child limit actually in effect.
	pub fn effective_child_limit(&self) -> usize {
		self.node_child_limit.unwrap_or_else(|| std::cmp::max(2, self.max_colors))
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_iterations < 1 {
			return Err(ConfigError::InvalidMaxIterations(self.max_iterations));
		}
		let limit = self.effective_child_limit();
		if limit < 2 {
			return Err(ConfigError::InvalidChildLimit(limit));
		}
		if self.max_colors < 1 {
			return Err(ConfigError::InvalidMaxColors(self.max_colors));
		}
		if self.dimensions < 1 {
			return Err(ConfigError::InvalidDimensions(self.dimensions));
		}
		if self.window_size == Some(0) {
			return Err(ConfigError::InvalidWindowSize);
		}
		if !self.alpha.is_finite() {
			return Err(ConfigError::InvalidAlpha(self.alpha));
		}
		// Written this way round so NaN is rejected too
		if !(self.progress_interval >= 0.) {
			return Err(ConfigError::InvalidProgressInterval(self.progress_interval));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let o = Options::<()>::new();
		assert_eq!(o.max_colors, 32);
		assert_eq!(o.effective_child_limit(), 32);
		assert_eq!(o.alpha, 0.25);
		assert_eq!(o.min_distance, f64::NEG_INFINITY);
		assert_eq!(o.max_iterations, 1);
		assert_eq!(o.dimensions, 3);
		assert_eq!(o.progress_interval, 0.2);
		assert!(!o.disconnects);
		assert!(o.window_size.is_none());
		assert!(o.validate().is_ok());
	}

	#[test]
	fn child_limit_floor() {
		assert_eq!(Options::<()>::new().max_colors(1).effective_child_limit(), 2);
		assert_eq!(Options::<()>::new().max_colors(1).node_child_limit(7).effective_child_limit(), 7);
	}

	#[test]
	fn rejects_bad_values() {
		let check = |o: Options<()>| o.validate().unwrap_err();
		assert_eq!(check(Options::new().max_colors(0)), ConfigError::InvalidMaxColors(0));
		assert_eq!(check(Options::new().node_child_limit(1)), ConfigError::InvalidChildLimit(1));
		assert_eq!(check(Options::new().max_iterations(0)), ConfigError::InvalidMaxIterations(0));
		assert_eq!(check(Options::new().dimensions(0)), ConfigError::InvalidDimensions(0));
		assert_eq!(check(Options::new().window_size(0)), ConfigError::InvalidWindowSize);
		assert!(matches!(check(Options::new().alpha(f64::NAN)), ConfigError::InvalidAlpha(_)));
		assert!(matches!(
			check(Options::new().progress_interval(f64::NAN)),
			ConfigError::InvalidProgressInterval(_)
		));
		assert_eq!(
			check(Options::new().progress_interval(-0.5)),
			ConfigError::InvalidProgressInterval(-0.5)
		);
	}

	#[test]
	fn non_finite_min_distance_disables_check() {
		assert_eq!(Options::<()>::new().min_distance(f64::INFINITY).min_distance, f64::NEG_INFINITY);
		assert_eq!(Options::<()>::new().min_distance(3.).min_distance, 3.);
	}

	#[test]
	fn seeded_sources_agree() {
		let mut a = Options::<()>::new().seed(9).random;
		let mut b = Options::<()>::new().seed(9).random;
		for _ in 0..16 {
			let (x, y) = (a(), b());
			assert_eq!(x, y);
			assert!((0. ..1.).contains(&x));
		}
	}

	#[test]
	fn distances() {
		assert_eq!(distance_squared(&[0., 0., 0.], &[1., 2., 2.]), 9.);
		assert_eq!(distance(&[0., 0., 0.], &[1., 2., 2.]), 3.);
		assert_eq!(distance_squared(&[1., 1., 1., 1., 1.], &[2., 2., 2., 2., 2.]), 5.);
	}
}
