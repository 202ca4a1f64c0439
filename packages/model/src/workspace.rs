use crate::event::{
    NameChangeEvent, NodeAddedEvent, NodeRemovedEvent, RootAddedEvent, RootRemovedEvent,
    WorkspaceCallbacks, WorkspaceChangeEvent,
};
use crate::history::{SubOp, UserOperation};
use crate::id::{NodeId, WorkspaceId};
use crate::project::Project;
use std::collections::BTreeSet;
use std::fmt;
use std::mem;

/// A plane nodes live on. Tracks membership, the roots, and the selection.
pub struct Workspace {
    id: WorkspaceId,
    pub(crate) name: String,
    /// Parentless member nodes, in the order they surfaced.
    pub(crate) roots: Vec<NodeId>,
    nodes: BTreeSet<NodeId>,
    /// Selected member nodes, in selection order.
    pub(crate) selected: Vec<NodeId>,
    pub(crate) callbacks: WorkspaceCallbacks,
}

impl Workspace {
    pub(crate) fn new(id: WorkspaceId, name: impl Into<String>) -> Self {
        Workspace {
            id,
            name: name.into(),
            roots: Vec::new(),
            nodes: BTreeSet::new(),
            selected: Vec::new(),
            callbacks: WorkspaceCallbacks::default(),
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn insert_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub(crate) fn take_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Makes `workspace` hold the whole tree under `root`.
    ///
    /// Already-member trees are left alone; a tree sitting on another
    /// workspace leaves it first, so the move shows up as leave plus join.
    /// Membership events fire per node once the walk is done, and a parentless
    /// root is announced last.
    pub fn add_node_tree(&mut self, workspace: WorkspaceId, root: NodeId, op: &mut UserOperation) {
        match self.node(root).workspace() {
            Some(current) if current == workspace => return,
            Some(other) => self.remove_node_tree(other, root, op),
            None => {}
        }
        let nodes = self.subtree(root);
        for &node in &nodes {
            self.workspace_mut(workspace).insert_node(node);
            self.set_workspace_raw(node, Some(workspace), op);
        }
        op.push(SubOp::RemoveNodeTree { workspace, root });
        for &node in &nodes {
            self.dispatch_node_added(NodeAddedEvent { workspace, node }, op);
        }
        if self.node(root).parent_connector().is_none() {
            self.workspace_mut(workspace).roots.push(root);
            self.dispatch_root_added(RootAddedEvent { workspace, node: root }, op);
        }
    }

    /// Takes the whole tree under `root` off `workspace`. The nodes end up
    /// deleted unless something re-adds them. Does nothing when the tree is
    /// not a member.
    pub fn remove_node_tree(&mut self, workspace: WorkspaceId, root: NodeId, op: &mut UserOperation) {
        if self.node(root).workspace() != Some(workspace) {
            return;
        }
        if self.workspace(workspace).roots.contains(&root) {
            self.workspace_mut(workspace).roots.retain(|n| *n != root);
            self.dispatch_root_removed(RootRemovedEvent { workspace, node: root }, op);
        }
        let nodes = self.subtree(root);
        for &node in &nodes {
            self.deselect(node, op);
            self.workspace_mut(workspace).take_node(node);
            self.set_workspace_raw(node, None, op);
        }
        op.push(SubOp::AddNodeTree { workspace, root });
        for &node in &nodes {
            self.dispatch_node_removed(NodeRemovedEvent { workspace, node }, op);
        }
    }

    /// Rewrites the workspace reference of one node. Membership lists are the
    /// caller's business; this only flips the field, records the undo command,
    /// and announces the transition.
    pub(crate) fn set_workspace_raw(
        &mut self,
        node: NodeId,
        workspace: Option<WorkspaceId>,
        op: &mut UserOperation,
    ) {
        let old = self.node(node).workspace();
        if old == workspace {
            return;
        }
        self.node_mut(node).workspace = workspace;
        op.push(SubOp::SetWorkspace { node, workspace: old });
        self.dispatch_workspace_change(
            WorkspaceChangeEvent {
                node,
                old_workspace: old,
                new_workspace: workspace,
            },
            op,
        );
    }

    /// Renames `workspace`.
    pub fn set_workspace_name(
        &mut self,
        workspace: WorkspaceId,
        name: impl Into<String>,
        op: &mut UserOperation,
    ) {
        let name = name.into();
        if self.workspace(workspace).name() == name {
            return;
        }
        let old = mem::replace(&mut self.workspace_mut(workspace).name, name.clone());
        op.push(SubOp::SetName {
            workspace,
            name: old.clone(),
        });
        self.dispatch_name_change(
            NameChangeEvent {
                workspace,
                old_name: old,
                new_name: name,
            },
            op,
        );
    }
}
