use crate::id::{ConnectorDefId, DerivationId, NodeDefId, NodeId};
use thiserror::Error;

/// Errors raised while loading or validating a template registry.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("node definition {node} references unknown connector definition {connector}")]
    UnknownConnector {
        node: NodeDefId,
        connector: ConnectorDefId,
    },

    #[error("connector definition {connector} names unknown default node definition {node}")]
    UnknownDefaultNode {
        connector: ConnectorDefId,
        node: NodeDefId,
    },

    #[error("node definition {node} maps derivation {derivation} to unknown definition {target}")]
    UnknownDerivative {
        node: NodeDefId,
        derivation: DerivationId,
        target: NodeDefId,
    },

    #[error("default nodes of {start} form a cycle")]
    DefaultCycle { start: NodeDefId },

    #[error("composite definition {node} declares no connectors")]
    EmptyComposite { node: NodeDefId },

    #[error("failed to parse template registry: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by structural operations on a project.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown node definition {0}")]
    UnknownNodeDef(NodeDefId),

    #[error("{node} declares no derivative for derivation {derivation}")]
    NoDerivation {
        node: NodeId,
        derivation: DerivationId,
    },
}
