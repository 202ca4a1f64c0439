//! The workspace-set facet of the project: the list of live workspaces, the
//! current-workspace pointer, and workspace addition and removal.

use crate::event::{CurrentWorkspaceEvent, WorkspaceAddedEvent, WorkspaceRemovedEvent};
use crate::history::{SubOp, UserOperation};
use crate::hooks::DeletionCause;
use crate::id::{NodeId, WorkspaceId};
use crate::project::Project;
use crate::workspace::Workspace;
use tracing::debug;

impl Project {
    /// Creates a workspace, lists it, and returns its id.
    pub fn add_workspace(&mut self, name: impl Into<String>, op: &mut UserOperation) -> WorkspaceId {
        let id = self.alloc_workspace_id();
        self.insert_workspace(Workspace::new(id, name));
        self.workspace_order.push(id);
        op.push(SubOp::RemoveWorkspace { workspace: id });
        self.dispatch_workspace_added(WorkspaceAddedEvent { workspace: id }, op);
        id
    }

    /// Puts an existing workspace back on the list. Undo of a removal lands
    /// here; the content trees are restored by the commands recorded after
    /// this one.
    pub(crate) fn list_workspace(&mut self, workspace: WorkspaceId, op: &mut UserOperation) {
        if self.is_listed(workspace) {
            return;
        }
        self.workspace_order.push(workspace);
        op.push(SubOp::RemoveWorkspace { workspace });
        self.dispatch_workspace_added(WorkspaceAddedEvent { workspace }, op);
    }

    /// Takes `workspace` out of the project.
    ///
    /// Every root tree still on it goes through the deletion hook with the
    /// workspace removal cause; survivors are deleted with the usual
    /// replacement ceremony, vetoed trees stay put on the unlisted workspace.
    /// The workspace struct itself stays in the table so undo can re-list it.
    pub fn remove_workspace(&mut self, workspace: WorkspaceId, op: &mut UserOperation) {
        if !self.is_listed(workspace) {
            return;
        }
        debug!(%workspace, "removing workspace");
        let roots: Vec<NodeId> = self.workspace(workspace).roots().to_vec();
        let hooks = self.hooks_handle();
        let targets: Vec<NodeId> = roots
            .iter()
            .copied()
            .filter(|&root| {
                hooks.on_deletion_requested(
                    self,
                    root,
                    &roots,
                    DeletionCause::WorkspaceDeletion,
                    op,
                )
            })
            .collect();
        for &root in &targets {
            let swapped = self.delete_node_tree(root, op);
            for pair in swapped {
                if let Some(connector) = self.node(pair.new).parent_connector() {
                    let parent = self.connector(connector).parent_node();
                    hooks.on_child_replaced(self, parent, pair.old, pair.new, connector, op);
                }
            }
        }
        self.workspace_order.retain(|w| *w != workspace);
        op.push(SubOp::AddWorkspace { workspace });
        self.dispatch_workspace_removed(WorkspaceRemovedEvent { workspace }, op);
    }

    /// The workspace edits currently target, if any. May name an unlisted
    /// workspace after a removal until the application repoints it.
    pub fn current_workspace(&self) -> Option<WorkspaceId> {
        self.current_workspace
    }

    /// Points edits at `workspace`. The pointer follows the user around
    /// rather than the edit history, so this is not recorded for undo.
    pub fn set_current_workspace(&mut self, workspace: Option<WorkspaceId>, op: &mut UserOperation) {
        if self.current_workspace == workspace {
            return;
        }
        if let Some(ws) = workspace {
            // id must exist even if unlisted
            let _ = self.workspace(ws);
        }
        let old = self.current_workspace;
        self.current_workspace = workspace;
        self.dispatch_current_change(CurrentWorkspaceEvent { old, new: workspace }, op);
    }

    /// Listed workspaces in insertion order.
    pub fn workspace_ids(&self) -> &[WorkspaceId] {
        &self.workspace_order
    }

    pub fn is_listed(&self, workspace: WorkspaceId) -> bool {
        self.workspace_order.contains(&workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use crate::hooks::NodeHooks;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn added_workspaces_are_listed_in_order() {
        let mut project = fixture::demo_project();
        let mut op = UserOperation::new();
        let a = project.add_workspace("a", &mut op);
        let b = project.add_workspace("b", &mut op);
        assert_eq!(project.workspace_ids(), &[a, b]);
        assert!(project.is_listed(a));
        assert_eq!(project.workspace(b).name(), "b");
    }

    #[test]
    fn workspace_removal_round_trips_with_its_content() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut setup = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut setup);

        let mut op = UserOperation::new();
        project.remove_workspace(ws, &mut op);
        assert!(!project.is_listed(ws));
        assert!(project.node(print).is_deleted());
        assert!(project.workspace(ws).roots().is_empty());

        let redo = op.invert_and_replay(&mut project);
        assert!(project.is_listed(ws));
        assert_eq!(project.node(print).workspace(), Some(ws));
        assert_eq!(project.workspace(ws).roots(), &[print]);

        redo.invert_and_replay(&mut project);
        assert!(!project.is_listed(ws));
        assert!(project.node(print).is_deleted());
    }

    #[test]
    fn vetoed_trees_survive_workspace_removal() {
        struct KeepEverything;
        impl NodeHooks for KeepEverything {
            fn on_deletion_requested(
                &self,
                _project: &Project,
                _node: NodeId,
                _targets: &[NodeId],
                _cause: DeletionCause,
                _op: &mut UserOperation,
            ) -> bool {
                false
            }
        }
        let (mut project, ws) =
            fixture::project_with_workspace_and_hooks(Rc::new(KeepEverything));
        let mut op = UserOperation::new();
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, lit, &mut op);

        project.remove_workspace(ws, &mut op);
        assert!(!project.is_listed(ws));
        // the vetoed tree stays on the unlisted workspace
        assert_eq!(project.node(lit).workspace(), Some(ws));
        assert!(project.workspace(ws).roots().contains(&lit));
    }

    #[test]
    fn the_current_pointer_changes_fire_once_and_record_nothing() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();

        let log = Rc::new(RefCell::new(Vec::new()));
        let changes = Rc::clone(&log);
        project.callbacks_mut().on_current_workspace_change(move |_, _, e| {
            changes.borrow_mut().push((e.old, e.new));
        });

        project.set_current_workspace(Some(ws), &mut op);
        project.set_current_workspace(Some(ws), &mut op);
        assert_eq!(project.current_workspace(), Some(ws));
        assert_eq!(*log.borrow(), vec![(None, Some(ws))]);
        assert!(op.is_empty());
    }

    #[test]
    fn removal_leaves_the_current_pointer_to_the_application() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        project.set_current_workspace(Some(ws), &mut op);
        project.remove_workspace(ws, &mut op);
        assert_eq!(project.current_workspace(), Some(ws));
        assert!(!project.is_listed(ws));
    }
}
