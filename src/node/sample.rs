/// The payload of a sample node: one input color, and optionally
/// whatever the caller wants to carry along with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<T> {
	color: Vec<f64>,
	data: Option<T>,
}

impl<T> Sample<T> {
	pub fn new(color: Vec<f64>) -> Self {
		Sample { color, data: None }
	}

	/// A sample that remembers `data`, e.g. the source pixel or a label.
	pub fn with_data(color: Vec<f64>, data: T) -> Self {
		Sample { color, data: Some(data) }
	}

	pub fn color(&self) -> &[f64] {
		&self.color
	}

	pub fn data(&self) -> Option<&T> {
		self.data.as_ref()
	}
}
