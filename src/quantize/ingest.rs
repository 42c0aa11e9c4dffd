use crate::node::error::IngestError;
use crate::node::sample::Sample;
use crate::node::NodeId;

use super::Atcq;

/// Stride of the flat buffers browsers and decoders hand out: RGBA.
pub const DEFAULT_STRIDE: usize = 4;
/// Channels read from each stride by default: RGB, alpha is ignored.
pub const DEFAULT_CHANNELS: usize = 3;

/// The shapes of color data `Atcq::add_data` accepts.
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
	/// One vector per sample.
	Pixels(&'a [Vec<f64>]),
	/// Samples packed back to back, `stride` values apart, of which the
	/// first `channels` are the color.
	Flat {
		data: &'a [f64],
		stride: usize,
		channels: usize,
	},
	/// Raw bytes, read as RGBA with the alpha dropped.
	Bytes(&'a [u8]),
	/// A decoded image; its raw buffer is read like `Bytes`.
	Image(&'a image::RgbaImage),
}

impl<T> Atcq<T> {
	/// Adds samples from any of the supported input shapes.
	///
	/// Either every sample in `input` is added, or (on error) none are.
	pub fn add_data(&mut self, input: Input<'_>) -> Result<(), IngestError> {
		match input {
			Input::Pixels(pixels) => self.add_samples(pixels),
			Input::Flat { data, stride, channels } => self.add_flat(data, stride, channels),
			Input::Bytes(bytes) => self.add_bytes(bytes),
			Input::Image(img) => self.add_image(img),
		}
	}

	/// Adds a single sample, standing on the support node.
	pub fn add_sample(&mut self, color: Vec<f64>) -> Result<NodeId, IngestError> {
		self.check_color(&color)?;
		Ok(self.push_sample(Sample::new(color)))
	}

	/// Adds a single sample carrying `data` along with its color.
	pub fn add_sample_with(&mut self, color: Vec<f64>, data: T) -> Result<NodeId, IngestError> {
		self.check_color(&color)?;
		Ok(self.push_sample(Sample::with_data(color, data)))
	}

	/// Adds one sample per item.
	pub fn add_samples<I, C>(&mut self, samples: I) -> Result<(), IngestError>
	where
		I: IntoIterator<Item = C>,
		C: AsRef<[f64]>,
	{
		let colors = samples.into_iter()
			.map(|c| {
				let c = c.as_ref();
				self.check_color(c).map(|_| c.to_vec())
			})
			.collect::<Result<Vec<_>, _>>()?;
		for color in colors {
			self.push_sample(Sample::new(color));
		}
		Ok(())
	}

	/// Adds samples packed into a flat array: every `stride` values make
	/// one sample, whose color is the first `channels` of them.
	pub fn add_flat<N>(&mut self, data: &[N], stride: usize, channels: usize) -> Result<(), IngestError>
	where
		N: Copy + Into<f64>,
	{
		if stride == 0 {
			return Err(IngestError::ZeroStride);
		}
		if data.len() % stride != 0 {
			return Err(IngestError::StrideMismatch { len: data.len(), stride });
		}
		if channels > stride {
			return Err(IngestError::ChannelsExceedStride { channels, stride });
		}
		self.add_samples(data.chunks(stride)
			.map(|px| px[..channels].iter().map(|v| (*v).into()).collect::<Vec<f64>>())
			.collect::<Vec<_>>())
	}

	/// Adds samples from an RGBA byte buffer.
	pub fn add_bytes(&mut self, data: &[u8]) -> Result<(), IngestError> {
		self.add_flat(data, DEFAULT_STRIDE, DEFAULT_CHANNELS)
	}

	/// Adds one sample per pixel of `img`, ignoring alpha.
	pub fn add_image(&mut self, img: &image::RgbaImage) -> Result<(), IngestError> {
		self.add_bytes(img.as_raw())
	}

	fn check_color(&self, color: &[f64]) -> Result<(), IngestError> {
		if color.len() != self.dimensions {
			return Err(IngestError::DimensionMismatch {
				expected: self.dimensions,
				found: color.len(),
			});
		}
		match color.iter().find(|c| !c.is_finite()) {
			Some(c) => Err(IngestError::NonFinite(*c)),
			None => Ok(()),
		}
	}
}
