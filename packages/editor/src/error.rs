use tangram_model::{ModelError, NodeId};
use thiserror::Error;

/// Errors raised by the editing flows.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("{0} is deleted")]
    NodeDeleted(NodeId),

    #[error("{0} and {1} belong to the same tree")]
    SameTree(NodeId, NodeId),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
