//! Color quantization by ant-tree clustering.
//!
//! Each input color becomes an "ant" that wanders into a tree rooted at a
//! support node. Ants found or join clusters directly under the support
//! node and grow subtrees beneath them, guided by a similarity radius each
//! cluster derives from the error it has accumulated. The clusters' mean
//! colors make up the palette.
//!
//! ```
//! let pixels = (0..16)
//! 	.map(|i| vec![if i % 2 == 0 { 0. } else { 255. }; 3])
//! 	.collect::<Vec<_>>();
//! let palette = atcq::quantize_sync(
//! 	atcq::Input::Pixels(&pixels),
//! 	atcq::Options::new().max_colors(1),
//! ).unwrap();
//! assert_eq!(palette, vec![vec![127.5; 3]]);
//! ```

pub mod node;
pub mod quantize;

use std::time::Duration;

pub use node::error::{ConfigError, Error, GraphError, IngestError};
pub use node::traverse::{
	breadth_first, depth_first, detach_tree, find_cluster, traverse_breadth_first,
	traverse_depth_first,
};
pub use node::{Graph, Node, NodeId, NodeKind};
pub use quantize::ingest::Input;
pub use quantize::options::{distance, distance_squared, Options};
pub use quantize::palette::{ReduceOptions, WeightedColor};
pub use quantize::Atcq;

/// Quantizes `input` in one go and returns the palette, heaviest color first.
pub fn quantize_sync(input: Input<'_>, options: Options<()>) -> Result<Vec<Vec<f64>>, Error> {
	let mut atcq = Atcq::new(options)?;
	atcq.add_data(input)?;
	atcq.quantize_sync()?;
	Ok(atcq.palette(None))
}

/// Like `quantize_sync`, stepping once per `interval` so other tasks on the
/// runtime get a turn in between.
pub async fn quantize_async(
	input: Input<'_>,
	options: Options<()>,
	interval: Duration
) -> Result<Vec<Vec<f64>>, Error> {
	let mut atcq = Atcq::new(options)?;
	atcq.add_data(input)?;
	atcq.quantize_async(interval).await?;
	Ok(atcq.palette(None))
}
