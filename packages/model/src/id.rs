use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime identity of a node instance. Allocated by the owning
/// [`Project`](crate::project::Project) and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        NodeId(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Runtime identity of a connector instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorId(u64);

impl ConnectorId {
    pub(crate) fn new(raw: u64) -> Self {
        ConnectorId(raw)
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connector-{}", self.0)
    }
}

/// Runtime identity of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(u64);

impl WorkspaceId {
    pub(crate) fn new(raw: u64) -> Self {
        WorkspaceId(raw)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workspace-{}", self.0)
    }
}

/// Identifier of a node definition in the template registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeDefId(String);

impl NodeDefId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeDefId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeDefId {
    fn from(id: &str) -> Self {
        NodeDefId(id.to_string())
    }
}

impl fmt::Display for NodeDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a connector definition in the template registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorDefId(String);

impl ConnectorDefId {
    pub fn new(id: impl Into<String>) -> Self {
        ConnectorDefId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectorDefId {
    fn from(id: &str) -> Self {
        ConnectorDefId(id.to_string())
    }
}

impl fmt::Display for ConnectorDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names a derivation relation. A connector carrying a derivation id marks the
/// subtree below it as a contributor to derivative trees, and a node definition
/// maps derivation ids to the definitions of the derivatives it can spawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DerivationId(String);

impl DerivationId {
    pub fn new(id: impl Into<String>) -> Self {
        DerivationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DerivationId {
    fn from(id: &str) -> Self {
        DerivationId(id.to_string())
    }
}

impl fmt::Display for DerivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positional label that pairs connectors between an original tree and its
/// derivative trees. Two connectors with the same joint id occupy the same
/// logical slot in both trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointId(String);

impl JointId {
    pub fn new(id: impl Into<String>) -> Self {
        JointId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JointId {
    fn from(id: &str) -> Self {
        JointId(id.to_string())
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_ids_order_by_allocation() {
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a, NodeId::new(1));
    }

    #[test]
    fn definition_ids_display_their_raw_text() {
        assert_eq!(NodeDefId::from("int-lit").to_string(), "int-lit");
        assert_eq!(DerivationId::from("name-link").as_str(), "name-link");
        assert_eq!(JointId::new("j-name"), JointId::from("j-name"));
    }

    #[test]
    fn runtime_ids_display_with_kind_prefix() {
        assert_eq!(NodeId::new(7).to_string(), "node-7");
        assert_eq!(ConnectorId::new(3).to_string(), "connector-3");
        assert_eq!(WorkspaceId::new(0).to_string(), "workspace-0");
    }
}
