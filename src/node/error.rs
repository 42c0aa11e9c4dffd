use super::NodeId;

/// Reason why a tree operation broke one of the graph's invariants.
///
/// None of these should occur while the engine drives the tree; if one
/// does, there is a bug in the engine (or in a collaborator mutating the
/// tree by hand) and continuing would corrupt cluster statistics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
	/// A node was placed onto a terrain while it still had a parent.
	#[error("node {0} can only be placed while it has no parent")]
	PlaceCommitted(NodeId),
	/// A node was lifted from its terrain while it still had a parent.
	#[error("node {0} can only be lifted after it has been disconnected")]
	LiftCommitted(NodeId),
	/// The child passed to `add` is already owned by some node.
	#[error("node {0} is already added to the graph")]
	AlreadyAdded(NodeId),
	/// The child passed to `add` is the parent itself, or one of its owners.
	#[error("adding node {child} under {parent} would make it its own ancestor")]
	Cycle {
		parent: NodeId,
		child: NodeId,
	},
	/// The child passed to `remove` is listed under a parent it doesn't point to.
	#[error("node {child} is listed under {parent} but its parent does not match")]
	ParentMismatch {
		parent: NodeId,
		child: NodeId,
	},
	/// A terrain walk reached a node standing on itself.
	#[error("node {0} has a terrain that references itself")]
	TerrainSelfReference(NodeId),
	/// A moving sample off the support node had no terrain to grow on.
	#[error("sample {0} has no terrain")]
	MissingTerrain(NodeId),
	/// Cluster statistics were needed from a node that isn't a cluster.
	#[error("node {0} is not a cluster")]
	NotACluster(NodeId),
	/// A color was needed from a node that doesn't carry one (the support node).
	#[error("node {0} has no color")]
	Colorless(NodeId),
	/// The distance function gave no finite distance to any cluster.
	#[error("no cluster is within a finite distance of sample {0}")]
	NoCandidateCluster(NodeId),
}

/// Reason why a set of options couldn't be turned into an engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
	/// `max_colors` must be at least 1.
	#[error("invalid max colors {0}: must be > 0")]
	InvalidMaxColors(usize),
	/// `node_child_limit` must be at least 2.
	#[error("invalid child limit {0}: must be >= 2")]
	InvalidChildLimit(usize),
	/// `max_iterations` must be at least 1.
	#[error("invalid max iterations {0}: must be > 0")]
	InvalidMaxIterations(usize),
	/// `dimensions` must be at least 1.
	#[error("invalid dimensions {0}: must be > 0")]
	InvalidDimensions(usize),
	/// A window of zero samples would never make progress.
	#[error("window size must be > 0")]
	InvalidWindowSize,
	/// `alpha` must be a finite number.
	#[error("invalid alpha {0}: must be finite")]
	InvalidAlpha(f64),
	/// `progress_interval` must be a non-negative number.
	#[error("invalid progress interval {0}: must be >= 0")]
	InvalidProgressInterval(f64),
	/// A palette can't be reduced to zero colors.
	#[error("target color count must be > 0")]
	InvalidTarget,
}

/// Reason why input data couldn't be turned into samples.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
	/// A flat array was given with a stride of zero.
	#[error("stride must be > 0")]
	ZeroStride,
	/// The stride does not divide the length of a flat array evenly.
	#[error("flat array of length {len} is not divisible by stride {stride}")]
	StrideMismatch {
		len: usize,
		stride: usize,
	},
	/// More channels were requested per sample than the stride holds.
	#[error("{channels} channels do not fit in a stride of {stride}")]
	ChannelsExceedStride {
		channels: usize,
		stride: usize,
	},
	/// A sample's length differs from the configured dimensions.
	#[error("sample has {found} components, expected {expected}")]
	DimensionMismatch {
		expected: usize,
		found: usize,
	},
	/// A sample component is NaN or infinite.
	#[error("sample component {0} is not finite")]
	NonFinite(f64),
}

/// Any failure from the one-shot quantization helpers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Ingest(#[from] IngestError),
	#[error(transparent)]
	Graph(#[from] GraphError),
}
