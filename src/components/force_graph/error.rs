//! Structured failures surfaced to the host when a dataset cannot be laid out.

use thiserror::Error;

/// Which end of a link failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEnd {
	Source,
	Target,
}

impl std::fmt::Display for LinkEnd {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			LinkEnd::Source => f.write_str("source"),
			LinkEnd::Target => f.write_str("target"),
		}
	}
}

/// Input validation errors. Any of these refuses the dataset as a whole.
#[derive(Error, Debug)]
pub enum GraphError {
	/// The dataset JSON could not be decoded.
	#[error("could not parse graph data: {0}")]
	Parse(#[from] serde_json::Error),

	/// Two nodes share the same identity.
	#[error("duplicate node id {id:?}")]
	DuplicateNode { id: String },

	/// A link references a node id that is not in the node set.
	#[error("link {index} {end} {id:?} does not match any node")]
	UnresolvedLink { index: usize, end: LinkEnd, id: String },

	/// A node lacks a numeric value for the active metric.
	#[error("node {node:?} has no numeric value for metric {metric:?}")]
	MissingMetric { node: String, metric: String },
}

/// Result alias for dataset loading and engine lifecycle operations.
pub type GraphResult<T> = Result<T, GraphError>;
