//! Event payloads and listener registries.
//!
//! Every structural mutation fires exactly one event from the object that
//! changed. Workspaces re-publish a subset of the events of their nodes and
//! the project re-publishes a subset of the events of its workspaces, so a
//! listener can observe one node, one workspace, or the whole project with
//! the same callback shape. Listeners run synchronously, in registration
//! order, after the mutation they describe has fully landed; they receive
//! the project read only plus the operation currently being recorded.

use crate::clipboard::ClipboardKind;
use crate::history::UserOperation;
use crate::id::{ConnectorId, NodeId, WorkspaceId};
use crate::project::Project;
use std::mem;

/// Callback signature shared by every registry.
pub type Handler<E> = Box<dyn FnMut(&Project, &mut UserOperation, &E)>;

/// A node was selected or deselected.
#[derive(Debug, Clone, Copy)]
pub struct SelectionEvent {
    pub node: NodeId,
    pub selected: bool,
}

/// A connector exchanged its occupant.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionEvent {
    pub connector: ConnectorId,
    pub disconnected: NodeId,
    pub connected: NodeId,
}

/// A node moved between workspaces, or in or out of one.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceChangeEvent {
    pub node: NodeId,
    pub old_workspace: Option<WorkspaceId>,
    pub new_workspace: Option<WorkspaceId>,
}

/// The text payload of a leaf node changed.
#[derive(Debug, Clone)]
pub struct TextChangeEvent {
    pub node: NodeId,
    pub old_text: String,
    pub new_text: String,
}

/// The compile error messages of a node were recomputed.
#[derive(Debug, Clone, Copy)]
pub struct CompileErrorEvent {
    pub node: NodeId,
    pub has_error: bool,
}

/// A breakpoint was set on or cleared from a node.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointEvent {
    pub node: NodeId,
    pub set: bool,
}

/// A node was marked corrupted. The mark never comes off.
#[derive(Debug, Clone, Copy)]
pub struct CorruptionEvent {
    pub node: NodeId,
}

/// A node gained or lost its original node.
#[derive(Debug, Clone, Copy)]
pub struct OriginalChangeEvent {
    pub node: NodeId,
    pub old_original: Option<NodeId>,
    pub new_original: Option<NodeId>,
}

/// A node entered a workspace.
#[derive(Debug, Clone, Copy)]
pub struct NodeAddedEvent {
    pub workspace: WorkspaceId,
    pub node: NodeId,
}

/// A node left a workspace.
#[derive(Debug, Clone, Copy)]
pub struct NodeRemovedEvent {
    pub workspace: WorkspaceId,
    pub node: NodeId,
}

/// A node became a root of a workspace.
#[derive(Debug, Clone, Copy)]
pub struct RootAddedEvent {
    pub workspace: WorkspaceId,
    pub node: NodeId,
}

/// A node stopped being a root of a workspace.
#[derive(Debug, Clone, Copy)]
pub struct RootRemovedEvent {
    pub workspace: WorkspaceId,
    pub node: NodeId,
}

/// A workspace was renamed.
#[derive(Debug, Clone)]
pub struct NameChangeEvent {
    pub workspace: WorkspaceId,
    pub old_name: String,
    pub new_name: String,
}

/// A workspace joined the project.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceAddedEvent {
    pub workspace: WorkspaceId,
}

/// A workspace left the project.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceRemovedEvent {
    pub workspace: WorkspaceId,
}

/// The workspace under edit changed.
#[derive(Debug, Clone, Copy)]
pub struct CurrentWorkspaceEvent {
    pub old: Option<WorkspaceId>,
    pub new: Option<WorkspaceId>,
}

/// A node entered the copy or cut list.
#[derive(Debug, Clone, Copy)]
pub struct ClipboardAddedEvent {
    pub kind: ClipboardKind,
    pub node: NodeId,
}

/// A node left the copy or cut list.
#[derive(Debug, Clone, Copy)]
pub struct ClipboardRemovedEvent {
    pub kind: ClipboardKind,
    pub node: NodeId,
}

/// Listeners attached to one node.
#[derive(Default)]
pub struct NodeCallbacks {
    pub(crate) selection: Vec<Handler<SelectionEvent>>,
    pub(crate) connection: Vec<Handler<ConnectionEvent>>,
    pub(crate) workspace_change: Vec<Handler<WorkspaceChangeEvent>>,
    pub(crate) text_change: Vec<Handler<TextChangeEvent>>,
    pub(crate) compile_error: Vec<Handler<CompileErrorEvent>>,
    pub(crate) breakpoint: Vec<Handler<BreakpointEvent>>,
    pub(crate) corruption: Vec<Handler<CorruptionEvent>>,
    pub(crate) original_change: Vec<Handler<OriginalChangeEvent>>,
}

impl NodeCallbacks {
    pub fn on_selection(&mut self, f: impl FnMut(&Project, &mut UserOperation, &SelectionEvent) + 'static) {
        self.selection.push(Box::new(f));
    }

    pub fn on_connection(&mut self, f: impl FnMut(&Project, &mut UserOperation, &ConnectionEvent) + 'static) {
        self.connection.push(Box::new(f));
    }

    pub fn on_workspace_change(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &WorkspaceChangeEvent) + 'static,
    ) {
        self.workspace_change.push(Box::new(f));
    }

    pub fn on_text_change(&mut self, f: impl FnMut(&Project, &mut UserOperation, &TextChangeEvent) + 'static) {
        self.text_change.push(Box::new(f));
    }

    pub fn on_compile_error(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &CompileErrorEvent) + 'static,
    ) {
        self.compile_error.push(Box::new(f));
    }

    pub fn on_breakpoint(&mut self, f: impl FnMut(&Project, &mut UserOperation, &BreakpointEvent) + 'static) {
        self.breakpoint.push(Box::new(f));
    }

    pub fn on_corruption(&mut self, f: impl FnMut(&Project, &mut UserOperation, &CorruptionEvent) + 'static) {
        self.corruption.push(Box::new(f));
    }

    pub fn on_original_change(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &OriginalChangeEvent) + 'static,
    ) {
        self.original_change.push(Box::new(f));
    }
}

/// Listeners attached to one connector.
#[derive(Default)]
pub struct ConnectorCallbacks {
    pub(crate) node_replaced: Vec<Handler<ConnectionEvent>>,
}

impl ConnectorCallbacks {
    pub fn on_node_replaced(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &ConnectionEvent) + 'static,
    ) {
        self.node_replaced.push(Box::new(f));
    }
}

/// Listeners attached to one workspace. The node scoped entries fire for
/// every node currently inside the workspace.
#[derive(Default)]
pub struct WorkspaceCallbacks {
    pub(crate) node_added: Vec<Handler<NodeAddedEvent>>,
    pub(crate) node_removed: Vec<Handler<NodeRemovedEvent>>,
    pub(crate) root_added: Vec<Handler<RootAddedEvent>>,
    pub(crate) root_removed: Vec<Handler<RootRemovedEvent>>,
    pub(crate) name_change: Vec<Handler<NameChangeEvent>>,
    pub(crate) selection: Vec<Handler<SelectionEvent>>,
    pub(crate) compile_error: Vec<Handler<CompileErrorEvent>>,
    pub(crate) breakpoint: Vec<Handler<BreakpointEvent>>,
    pub(crate) original_change: Vec<Handler<OriginalChangeEvent>>,
}

impl WorkspaceCallbacks {
    pub fn on_node_added(&mut self, f: impl FnMut(&Project, &mut UserOperation, &NodeAddedEvent) + 'static) {
        self.node_added.push(Box::new(f));
    }

    pub fn on_node_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &NodeRemovedEvent) + 'static,
    ) {
        self.node_removed.push(Box::new(f));
    }

    pub fn on_root_added(&mut self, f: impl FnMut(&Project, &mut UserOperation, &RootAddedEvent) + 'static) {
        self.root_added.push(Box::new(f));
    }

    pub fn on_root_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &RootRemovedEvent) + 'static,
    ) {
        self.root_removed.push(Box::new(f));
    }

    pub fn on_name_change(&mut self, f: impl FnMut(&Project, &mut UserOperation, &NameChangeEvent) + 'static) {
        self.name_change.push(Box::new(f));
    }

    pub fn on_selection(&mut self, f: impl FnMut(&Project, &mut UserOperation, &SelectionEvent) + 'static) {
        self.selection.push(Box::new(f));
    }

    pub fn on_compile_error(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &CompileErrorEvent) + 'static,
    ) {
        self.compile_error.push(Box::new(f));
    }

    pub fn on_breakpoint(&mut self, f: impl FnMut(&Project, &mut UserOperation, &BreakpointEvent) + 'static) {
        self.breakpoint.push(Box::new(f));
    }

    pub fn on_original_change(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &OriginalChangeEvent) + 'static,
    ) {
        self.original_change.push(Box::new(f));
    }
}

/// Listeners attached to the project as a whole. The workspace scoped
/// entries fire for every workspace currently listed in the project.
#[derive(Default)]
pub struct ProjectCallbacks {
    pub(crate) workspace_added: Vec<Handler<WorkspaceAddedEvent>>,
    pub(crate) workspace_removed: Vec<Handler<WorkspaceRemovedEvent>>,
    pub(crate) current_change: Vec<Handler<CurrentWorkspaceEvent>>,
    pub(crate) node_added: Vec<Handler<NodeAddedEvent>>,
    pub(crate) node_removed: Vec<Handler<NodeRemovedEvent>>,
    pub(crate) root_added: Vec<Handler<RootAddedEvent>>,
    pub(crate) root_removed: Vec<Handler<RootRemovedEvent>>,
    pub(crate) name_change: Vec<Handler<NameChangeEvent>>,
    pub(crate) selection: Vec<Handler<SelectionEvent>>,
    pub(crate) compile_error: Vec<Handler<CompileErrorEvent>>,
    pub(crate) breakpoint: Vec<Handler<BreakpointEvent>>,
    pub(crate) original_change: Vec<Handler<OriginalChangeEvent>>,
    pub(crate) copy_added: Vec<Handler<ClipboardAddedEvent>>,
    pub(crate) copy_removed: Vec<Handler<ClipboardRemovedEvent>>,
    pub(crate) cut_added: Vec<Handler<ClipboardAddedEvent>>,
    pub(crate) cut_removed: Vec<Handler<ClipboardRemovedEvent>>,
}

impl ProjectCallbacks {
    pub fn on_workspace_added(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &WorkspaceAddedEvent) + 'static,
    ) {
        self.workspace_added.push(Box::new(f));
    }

    pub fn on_workspace_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &WorkspaceRemovedEvent) + 'static,
    ) {
        self.workspace_removed.push(Box::new(f));
    }

    pub fn on_current_workspace_change(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &CurrentWorkspaceEvent) + 'static,
    ) {
        self.current_change.push(Box::new(f));
    }

    pub fn on_node_added(&mut self, f: impl FnMut(&Project, &mut UserOperation, &NodeAddedEvent) + 'static) {
        self.node_added.push(Box::new(f));
    }

    pub fn on_node_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &NodeRemovedEvent) + 'static,
    ) {
        self.node_removed.push(Box::new(f));
    }

    pub fn on_root_added(&mut self, f: impl FnMut(&Project, &mut UserOperation, &RootAddedEvent) + 'static) {
        self.root_added.push(Box::new(f));
    }

    pub fn on_root_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &RootRemovedEvent) + 'static,
    ) {
        self.root_removed.push(Box::new(f));
    }

    pub fn on_name_change(&mut self, f: impl FnMut(&Project, &mut UserOperation, &NameChangeEvent) + 'static) {
        self.name_change.push(Box::new(f));
    }

    pub fn on_selection(&mut self, f: impl FnMut(&Project, &mut UserOperation, &SelectionEvent) + 'static) {
        self.selection.push(Box::new(f));
    }

    pub fn on_compile_error(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &CompileErrorEvent) + 'static,
    ) {
        self.compile_error.push(Box::new(f));
    }

    pub fn on_breakpoint(&mut self, f: impl FnMut(&Project, &mut UserOperation, &BreakpointEvent) + 'static) {
        self.breakpoint.push(Box::new(f));
    }

    pub fn on_original_change(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &OriginalChangeEvent) + 'static,
    ) {
        self.original_change.push(Box::new(f));
    }

    pub fn on_copy_list_added(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &ClipboardAddedEvent) + 'static,
    ) {
        self.copy_added.push(Box::new(f));
    }

    pub fn on_copy_list_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &ClipboardRemovedEvent) + 'static,
    ) {
        self.copy_removed.push(Box::new(f));
    }

    pub fn on_cut_list_added(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &ClipboardAddedEvent) + 'static,
    ) {
        self.cut_added.push(Box::new(f));
    }

    pub fn on_cut_list_removed(
        &mut self,
        f: impl FnMut(&Project, &mut UserOperation, &ClipboardRemovedEvent) + 'static,
    ) {
        self.cut_removed.push(Box::new(f));
    }
}

// Dispatch runs in three stages. First the project reconciles its own
// indexes (workspace selection list, root list, clipboard membership) so no
// listener can observe them out of step with the node flags. Then the
// listeners of the changed object run, then the workspace and project
// re-publishers. Handler vectors are moved out of their slot while they
// run, which is also what makes structural re-entry impossible: handlers
// only ever see `&Project`.
impl Project {
    pub(crate) fn dispatch_selection(&mut self, event: SelectionEvent, op: &mut UserOperation) {
        self.set_dirty();
        if let Some(ws) = self.node(event.node).workspace() {
            let selected = &mut self.workspace_mut(ws).selected;
            if event.selected {
                if !selected.contains(&event.node) {
                    selected.push(event.node);
                }
            } else {
                selected.retain(|n| *n != event.node);
            }
        }
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.selection);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.selection = handlers;
        if let Some(ws) = self.node(event.node).workspace() {
            let mut handlers = mem::take(&mut self.workspace_mut(ws).callbacks.selection);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.workspace_mut(ws).callbacks.selection = handlers;
            if self.is_listed(ws) {
                let mut handlers = mem::take(&mut self.callbacks.selection);
                for f in handlers.iter_mut() {
                    f(&*self, op, &event);
                }
                self.callbacks.selection = handlers;
            }
        }
    }

    pub(crate) fn dispatch_connection(&mut self, event: ConnectionEvent, op: &mut UserOperation) {
        self.set_dirty();
        // The disconnected node turns into a root of its workspace; the
        // connected node stops being one.
        let old = event.disconnected;
        if let Some(ws) = self.node(old).workspace() {
            if self.node(old).parent_connector().is_none() && !self.workspace(ws).roots.contains(&old) {
                self.workspace_mut(ws).roots.push(old);
                self.dispatch_root_added(RootAddedEvent { workspace: ws, node: old }, op);
            }
        }
        let new = event.connected;
        if let Some(ws) = self.node(new).workspace() {
            if self.workspace(ws).roots.contains(&new) {
                self.workspace_mut(ws).roots.retain(|n| *n != new);
                self.dispatch_root_removed(RootRemovedEvent { workspace: ws, node: new }, op);
            }
        }
        let mut handlers = mem::take(&mut self.node_mut(event.connected).callbacks.connection);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.connected).callbacks.connection = handlers;
        let mut handlers = mem::take(&mut self.connector_mut(event.connector).callbacks.node_replaced);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.connector_mut(event.connector).callbacks.node_replaced = handlers;
    }

    pub(crate) fn dispatch_workspace_change(&mut self, event: WorkspaceChangeEvent, op: &mut UserOperation) {
        self.set_dirty();
        // Leaving the workspace it was captured in drops a node from the
        // clipboard lists.
        if event.old_workspace != event.new_workspace {
            if self.copy_list().contains(&event.node) {
                self.remove_from_copy_list(event.node, op);
            }
            if self.cut_list().contains(&event.node) {
                self.remove_from_cut_list(event.node, op);
            }
        }
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.workspace_change);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.workspace_change = handlers;
    }

    pub(crate) fn dispatch_text_change(&mut self, event: TextChangeEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.text_change);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.text_change = handlers;
    }

    pub(crate) fn dispatch_compile_error(&mut self, event: CompileErrorEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.compile_error);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.compile_error = handlers;
        if let Some(ws) = self.node(event.node).workspace() {
            let mut handlers = mem::take(&mut self.workspace_mut(ws).callbacks.compile_error);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.workspace_mut(ws).callbacks.compile_error = handlers;
            if self.is_listed(ws) {
                let mut handlers = mem::take(&mut self.callbacks.compile_error);
                for f in handlers.iter_mut() {
                    f(&*self, op, &event);
                }
                self.callbacks.compile_error = handlers;
            }
        }
    }

    pub(crate) fn dispatch_breakpoint(&mut self, event: BreakpointEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.breakpoint);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.breakpoint = handlers;
        if let Some(ws) = self.node(event.node).workspace() {
            let mut handlers = mem::take(&mut self.workspace_mut(ws).callbacks.breakpoint);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.workspace_mut(ws).callbacks.breakpoint = handlers;
            if self.is_listed(ws) {
                let mut handlers = mem::take(&mut self.callbacks.breakpoint);
                for f in handlers.iter_mut() {
                    f(&*self, op, &event);
                }
                self.callbacks.breakpoint = handlers;
            }
        }
    }

    pub(crate) fn dispatch_corruption(&mut self, event: CorruptionEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.corruption);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.corruption = handlers;
    }

    pub(crate) fn dispatch_original_change(&mut self, event: OriginalChangeEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.node_mut(event.node).callbacks.original_change);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.node_mut(event.node).callbacks.original_change = handlers;
        if let Some(ws) = self.node(event.node).workspace() {
            let mut handlers = mem::take(&mut self.workspace_mut(ws).callbacks.original_change);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.workspace_mut(ws).callbacks.original_change = handlers;
            if self.is_listed(ws) {
                let mut handlers = mem::take(&mut self.callbacks.original_change);
                for f in handlers.iter_mut() {
                    f(&*self, op, &event);
                }
                self.callbacks.original_change = handlers;
            }
        }
    }

    pub(crate) fn dispatch_node_added(&mut self, event: NodeAddedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.workspace_mut(event.workspace).callbacks.node_added);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.workspace_mut(event.workspace).callbacks.node_added = handlers;
        if self.is_listed(event.workspace) {
            let mut handlers = mem::take(&mut self.callbacks.node_added);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.callbacks.node_added = handlers;
        }
    }

    pub(crate) fn dispatch_node_removed(&mut self, event: NodeRemovedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.workspace_mut(event.workspace).callbacks.node_removed);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.workspace_mut(event.workspace).callbacks.node_removed = handlers;
        if self.is_listed(event.workspace) {
            let mut handlers = mem::take(&mut self.callbacks.node_removed);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.callbacks.node_removed = handlers;
        }
    }

    pub(crate) fn dispatch_root_added(&mut self, event: RootAddedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.workspace_mut(event.workspace).callbacks.root_added);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.workspace_mut(event.workspace).callbacks.root_added = handlers;
        if self.is_listed(event.workspace) {
            let mut handlers = mem::take(&mut self.callbacks.root_added);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.callbacks.root_added = handlers;
        }
    }

    pub(crate) fn dispatch_root_removed(&mut self, event: RootRemovedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.workspace_mut(event.workspace).callbacks.root_removed);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.workspace_mut(event.workspace).callbacks.root_removed = handlers;
        if self.is_listed(event.workspace) {
            let mut handlers = mem::take(&mut self.callbacks.root_removed);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.callbacks.root_removed = handlers;
        }
    }

    pub(crate) fn dispatch_name_change(&mut self, event: NameChangeEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.workspace_mut(event.workspace).callbacks.name_change);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.workspace_mut(event.workspace).callbacks.name_change = handlers;
        if self.is_listed(event.workspace) {
            let mut handlers = mem::take(&mut self.callbacks.name_change);
            for f in handlers.iter_mut() {
                f(&*self, op, &event);
            }
            self.callbacks.name_change = handlers;
        }
    }

    pub(crate) fn dispatch_workspace_added(&mut self, event: WorkspaceAddedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.callbacks.workspace_added);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.callbacks.workspace_added = handlers;
    }

    pub(crate) fn dispatch_workspace_removed(&mut self, event: WorkspaceRemovedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.callbacks.workspace_removed);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.callbacks.workspace_removed = handlers;
    }

    pub(crate) fn dispatch_current_change(&mut self, event: CurrentWorkspaceEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = mem::take(&mut self.callbacks.current_change);
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        self.callbacks.current_change = handlers;
    }

    pub(crate) fn dispatch_clipboard_added(&mut self, event: ClipboardAddedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = match event.kind {
            ClipboardKind::Copy => mem::take(&mut self.callbacks.copy_added),
            ClipboardKind::Cut => mem::take(&mut self.callbacks.cut_added),
        };
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        match event.kind {
            ClipboardKind::Copy => self.callbacks.copy_added = handlers,
            ClipboardKind::Cut => self.callbacks.cut_added = handlers,
        }
    }

    pub(crate) fn dispatch_clipboard_removed(&mut self, event: ClipboardRemovedEvent, op: &mut UserOperation) {
        self.set_dirty();
        let mut handlers = match event.kind {
            ClipboardKind::Copy => mem::take(&mut self.callbacks.copy_removed),
            ClipboardKind::Cut => mem::take(&mut self.callbacks.cut_removed),
        };
        for f in handlers.iter_mut() {
            f(&*self, op, &event);
        }
        match event.kind {
            ClipboardKind::Copy => self.callbacks.copy_removed = handlers,
            ClipboardKind::Cut => self.callbacks.cut_removed = handlers,
        }
    }
}
