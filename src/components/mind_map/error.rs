//! Error types for mind-map commands and configuration.

/// Failures surfaced by structural edits and configuration loading.
///
/// Graph transformation never fails; it degrades to an empty or partial graph
/// and logs instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The root cannot be deleted without breaking the rooted-tree invariant.
	#[error("the root node `{id}` cannot be deleted")]
	RootDeletion { id: String },
	#[error("no node with id `{id}`")]
	UnknownNode { id: String },
	#[error("invalid mind-map configuration: {0}")]
	Config(#[from] serde_json::Error),
	#[error("zoom extent [{min}, {max}] must be positive and ordered")]
	InvalidZoomExtent { min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
