//! Tree walks over the id graph.
//!
//! Nodes only hold ids, so every walk goes through the project. All of these
//! are read only and allocation is kept to the result vectors.

use crate::id::{ConnectorId, NodeId};
use crate::project::Project;

impl Project {
    /// Connectors directly under `node`, in section order. Empty for leaves.
    pub fn connectors_of(&self, node: NodeId) -> Vec<ConnectorId> {
        self.node(node)
            .sections()
            .iter()
            .flat_map(|section| section.connectors().iter().copied())
            .collect()
    }

    /// Occupants of the connectors directly under `node`.
    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.connectors_of(node)
            .into_iter()
            .map(|connector| self.connector(connector).connected())
            .collect()
    }

    /// The composite node owning the connector `node` hangs from, if any.
    pub fn parent_node_of(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)
            .parent_connector()
            .map(|connector| self.connector(connector).parent_node())
    }

    /// Topmost node of the tree containing `node`. Returns `node` itself when
    /// it has no parent.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent_node_of(current) {
            current = parent;
        }
        current
    }

    /// `node` and everything below it, parents before children.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.child_nodes(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Whether `node` sits in the subtree of `ancestor`. A node is its own
    /// descendant.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == ancestor {
                return true;
            }
            match self.parent_node_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}
