use crate::event::{ConnectionEvent, ConnectorCallbacks};
use crate::history::{SubOp, UserOperation};
use crate::id::{ConnectorDefId, ConnectorId, DerivationId, JointId, NodeDefId, NodeId};
use crate::project::Project;
use crate::template::ConnectorDef;
use std::fmt;

/// A slot under a composite node that always holds exactly one occupant.
pub struct Connector {
    id: ConnectorId,
    def_id: ConnectorDefId,
    name: String,
    parent: NodeId,
    fixed: bool,
    default_def: NodeDefId,
    restore_last_default: bool,
    derivation: Option<DerivationId>,
    joint: Option<JointId>,
    pub(crate) connected: NodeId,
    pub(crate) last_default_snapshot: Option<NodeId>,
    pub(crate) callbacks: ConnectorCallbacks,
}

impl Connector {
    pub(crate) fn new(id: ConnectorId, def: &ConnectorDef, parent: NodeId, connected: NodeId) -> Self {
        Connector {
            id,
            def_id: def.id.clone(),
            name: def.name.clone(),
            parent,
            fixed: def.fixed,
            default_def: def.default_node.clone(),
            restore_last_default: def.restore_last_default,
            derivation: def.derivation.clone(),
            joint: def.joint.clone(),
            connected,
            last_default_snapshot: None,
            callbacks: ConnectorCallbacks::default(),
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.id
    }

    pub fn def_id(&self) -> &ConnectorDefId {
        &self.def_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The composite node this connector belongs to.
    pub fn parent_node(&self) -> NodeId {
        self.parent
    }

    /// A fixed connector never lets go of its occupant.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn default_def(&self) -> &NodeDefId {
        &self.default_def
    }

    pub fn restores_last_default(&self) -> bool {
        self.restore_last_default
    }

    pub fn derivation_id(&self) -> Option<&DerivationId> {
        self.derivation.as_ref()
    }

    pub fn joint_id(&self) -> Option<&JointId> {
        self.joint.as_ref()
    }

    /// The current occupant. A connector is never empty.
    pub fn connected(&self) -> NodeId {
        self.connected
    }

    /// Detached copy of the default occupant that most recently sat here, if
    /// a non-default node has taken its place since.
    pub fn last_default_snapshot(&self) -> Option<NodeId> {
        self.last_default_snapshot
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id)
            .field("def_id", &self.def_id)
            .field("parent", &self.parent)
            .field("connected", &self.connected)
            .field("fixed", &self.fixed)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Puts `node` into `connector`, displacing the current occupant.
    ///
    /// The occupant loses its parent reference but keeps its workspace, so it
    /// surfaces as a workspace root. `node` and its subtree are adopted into
    /// that workspace. The contract is connector update first, workspace
    /// registration second, event dispatch last.
    pub fn connect(&mut self, connector: ConnectorId, node: NodeId, op: &mut UserOperation) {
        let snapshot = self.compute_next_default_snapshot(connector, node);
        self.connect_impl(connector, node, snapshot, op);
    }

    pub(crate) fn connect_impl(
        &mut self,
        connector: ConnectorId,
        node: NodeId,
        snapshot: Option<NodeId>,
        op: &mut UserOperation,
    ) {
        let old = self.connector(connector).connected;
        self.node_mut(old).parent_connector = None;
        self.connector_mut(connector).connected = node;
        self.node_mut(node).parent_connector = Some(connector);
        if let Some(ws) = self.node(old).workspace() {
            self.add_node_tree(ws, node, op);
        }
        let old_snapshot = self.connector(connector).last_default_snapshot;
        self.connector_mut(connector).last_default_snapshot = snapshot;
        op.push(SubOp::Connect {
            connector,
            node: old,
            snapshot: old_snapshot,
        });
        self.dispatch_connection(
            ConnectionEvent {
                connector,
                disconnected: old,
                connected: node,
            },
            op,
        );
    }

    /// Snapshot value the connector will carry once `incoming` is connected.
    /// A default occupant about to leave gets captured; an incoming default
    /// node clears the snapshot; anything else keeps it.
    fn compute_next_default_snapshot(&mut self, connector: ConnectorId, incoming: NodeId) -> Option<NodeId> {
        if self.node(incoming).is_default() {
            return None;
        }
        let occupant = self.connector(connector).connected;
        if self.node(occupant).is_default() {
            // snapshots live outside undo, so the copy bookkeeping goes to a
            // throwaway operation
            let mut scratch = UserOperation::new();
            let copy = self.copy_tree_unfiltered(occupant, &mut scratch);
            self.strip_derivative_links(copy, &mut scratch);
            return Some(copy);
        }
        self.connector(connector).last_default_snapshot
    }

    /// Definition used to refill `connector` when its occupant is removed.
    /// Precedence: the occupant itself while it is a default node, then the
    /// last default snapshot, then the definition from the template.
    pub fn default_def_id(&self, connector: ConnectorId) -> NodeDefId {
        let entry = self.connector(connector);
        let occupant = self.node(entry.connected);
        if occupant.is_default() {
            return occupant.def_id().clone();
        }
        if let Some(snapshot) = entry.last_default_snapshot {
            return self.node(snapshot).def_id().clone();
        }
        entry.default_def.clone()
    }

    /// Builds a fresh default node for `connector` without connecting it.
    /// With `restore_last_default` set, the current default occupant or the
    /// last default snapshot is copied contents and all; otherwise the
    /// resolved definition is instantiated from scratch.
    pub fn create_default_node(&mut self, connector: ConnectorId, op: &mut UserOperation) -> NodeId {
        let node = if !self.connector(connector).restore_last_default {
            let def = self.default_def_id(connector);
            self.instantiate_registered(&def)
        } else {
            let occupant = self.connector(connector).connected;
            let snapshot = self.connector(connector).last_default_snapshot;
            if self.node(occupant).is_default() {
                let copy = self.copy_tree_unfiltered(occupant, op);
                self.strip_derivative_links(copy, op);
                copy
            } else if let Some(snapshot) = snapshot {
                let copy = self.copy_tree_unfiltered(snapshot, op);
                self.strip_derivative_links(copy, op);
                copy
            } else {
                let def = self.connector(connector).default_def.clone();
                self.instantiate_registered(&def)
            }
        };
        self.node_mut(node).is_default = true;
        node
    }

    /// Nearest derivation id on the connectors from `node` up to the root.
    pub fn find_derivation_id_up(&self, node: NodeId) -> Option<DerivationId> {
        let connector = self.node(node).parent_connector()?;
        if let Some(derivation) = self.connector(connector).derivation_id() {
            return Some(derivation.clone());
        }
        self.find_derivation_id_up(self.connector(connector).parent_node())
    }

    /// Whether `node` may be connected into `connector`. Fixed connectors
    /// refuse everything; beyond that the hooks decide.
    pub fn can_connect(&self, connector: ConnectorId, node: NodeId) -> bool {
        if self.connector(connector).is_fixed() {
            return false;
        }
        self.hooks_handle().can_connect(self, connector, node)
    }
}
