//! Undo bookkeeping.
//!
//! Every mutator takes a [`UserOperation`] and pushes the command that undoes
//! what it just did. Undoing replays those commands newest first through the
//! same public mutators, which record their own inverses into a fresh
//! operation; that operation is the redo. Mutators guard against no-op
//! assignments, so the deliberately redundant commands recorded by compound
//! edits collapse during replay instead of piling up.

use crate::clipboard::ClipboardKind;
use crate::id::{ConnectorId, NodeId, WorkspaceId};
use crate::node::Point;
use crate::project::Project;

/// One recorded command. Executing it reverses one field-level mutation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SubOp {
    Connect {
        connector: ConnectorId,
        node: NodeId,
        snapshot: Option<NodeId>,
    },
    Select {
        node: NodeId,
    },
    Deselect {
        node: NodeId,
    },
    SetBreakpoint {
        node: NodeId,
        value: bool,
    },
    SetText {
        node: NodeId,
        text: String,
    },
    MoveNode {
        node: NodeId,
        position: Point,
    },
    SetLastReplaced {
        node: NodeId,
        target: Option<NodeId>,
    },
    SetWorkspace {
        node: NodeId,
        workspace: Option<WorkspaceId>,
    },
    AddNodeTree {
        workspace: WorkspaceId,
        root: NodeId,
    },
    RemoveNodeTree {
        workspace: WorkspaceId,
        root: NodeId,
    },
    SetName {
        workspace: WorkspaceId,
        name: String,
    },
    AddDerivative {
        original: NodeId,
        derivative: NodeId,
    },
    RemoveDerivative {
        original: NodeId,
        derivative: NodeId,
    },
    AddWorkspace {
        workspace: WorkspaceId,
    },
    RemoveWorkspace {
        workspace: WorkspaceId,
    },
    AddToClipboard {
        kind: ClipboardKind,
        node: NodeId,
    },
    RemoveFromClipboard {
        kind: ClipboardKind,
        node: NodeId,
    },
}

impl SubOp {
    fn execute(self, project: &mut Project, redo: &mut UserOperation) {
        match self {
            SubOp::Connect {
                connector,
                node,
                snapshot,
            } => project.connect_impl(connector, node, snapshot, redo),
            SubOp::Select { node } => project.select(node, redo),
            SubOp::Deselect { node } => project.deselect(node, redo),
            SubOp::SetBreakpoint { node, value } => project.set_breakpoint(node, value, redo),
            SubOp::SetText { node, text } => project.set_text(node, text, redo),
            SubOp::MoveNode { node, position } => project.move_node(node, position, redo),
            SubOp::SetLastReplaced { node, target } => project.set_last_replaced(node, target, redo),
            SubOp::SetWorkspace { node, workspace } => project.set_workspace_raw(node, workspace, redo),
            SubOp::AddNodeTree { workspace, root } => project.add_node_tree(workspace, root, redo),
            SubOp::RemoveNodeTree { workspace, root } => project.remove_node_tree(workspace, root, redo),
            SubOp::SetName { workspace, name } => project.set_workspace_name(workspace, name, redo),
            SubOp::AddDerivative { original, derivative } => {
                project.add_derivative(original, derivative, redo)
            }
            SubOp::RemoveDerivative { original, derivative } => {
                project.remove_derivative(original, derivative, redo)
            }
            SubOp::AddWorkspace { workspace } => project.list_workspace(workspace, redo),
            SubOp::RemoveWorkspace { workspace } => project.remove_workspace(workspace, redo),
            SubOp::AddToClipboard { kind, node } => match kind {
                ClipboardKind::Copy => project.add_to_copy_list(node, redo),
                ClipboardKind::Cut => project.add_to_cut_list(node, redo),
            },
            SubOp::RemoveFromClipboard { kind, node } => match kind {
                ClipboardKind::Copy => project.remove_from_copy_list(node, redo),
                ClipboardKind::Cut => project.remove_from_cut_list(node, redo),
            },
        }
    }
}

/// Commands accumulated over one user-visible edit.
///
/// Pass one operation through every mutator belonging to the same gesture,
/// then hand it to the undo stack as a unit.
#[derive(Default)]
pub struct UserOperation {
    sub_ops: Vec<SubOp>,
}

impl UserOperation {
    pub fn new() -> Self {
        UserOperation::default()
    }

    pub(crate) fn push(&mut self, sub_op: SubOp) {
        self.sub_ops.push(sub_op);
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.sub_ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_ops.is_empty()
    }

    /// Undoes the recorded edit and returns the operation that redoes it.
    pub fn invert_and_replay(mut self, project: &mut Project) -> UserOperation {
        let mut redo = UserOperation::new();
        while let Some(sub_op) = self.sub_ops.pop() {
            sub_op.execute(project, &mut redo);
        }
        redo
    }
}
