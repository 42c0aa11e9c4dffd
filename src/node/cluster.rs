/// Running statistics of a cluster node.
///
/// `error` is the sum of the distances between each contributed color and
/// the cluster's mean at the time it was contributed. Scaled by `alpha` and
/// averaged over `size`, it becomes the similarity radius that decides
/// whether nearby samples may found a cluster of their own or grow the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStats {
	alpha: f64,
	size: usize,
	color_sum: Vec<f64>,
	color: Vec<f64>,
	error: f64,
}

impl ClusterStats {
	/// An empty cluster over colors with `dimensions` components.
	pub fn new(alpha: f64, dimensions: usize) -> Self {
		ClusterStats {
			alpha,
			size: 0,
			color_sum: vec![0.; dimensions],
			color: vec![0.; dimensions],
			error: 0.,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Number of contributions made to this cluster.
	pub fn size(&self) -> usize {
		self.size
	}

	pub fn color_sum(&self) -> &[f64] {
		&self.color_sum
	}

	/// Mean of every contributed color.
	pub fn color(&self) -> &[f64] {
		&self.color
	}

	pub fn error(&self) -> f64 {
		self.error
	}

	/// `alpha * error / size`; NaN for a cluster nobody has contributed to.
	pub fn relative_error(&self) -> f64 {
		(self.error / self.size as f64) * self.alpha
	}

	/// Folds one more color into the running mean.
	///
	/// `distance` is how far the color was from the cluster when it was
	/// assigned; the first color of a new cluster contributes 0.
	pub fn contribute(&mut self, color: &[f64], distance: f64) {
		self.size += 1;
		self.error += distance;
		self.fold(color);
	}

	/// Folds another cluster's mean color in as a single contribution.
	///
	/// The other cluster's size and error are not carried over.
	pub fn consume_color(&mut self, other: &ClusterStats) {
		self.size += 1;
		self.fold(&other.color);
	}

	fn fold(&mut self, color: &[f64]) {
		let size = self.size as f64;
		for ((sum, mean), c) in self.color_sum.iter_mut().zip(self.color.iter_mut()).zip(color) {
			*sum += c;
			*mean = *sum / size;
		}
	}
}
