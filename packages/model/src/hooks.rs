use crate::history::UserOperation;
use crate::id::{ConnectorId, NodeId, WorkspaceId};
use crate::project::Project;

/// Outcome of the text formatting hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// When true, `text` replaces the whole payload instead of being
    /// appended to it.
    pub whole: bool,
    pub text: String,
}

/// Why a node is about to be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionCause {
    /// Dropped on the trash area.
    TrashBox,
    /// Removed because it can never compile.
    CompileError,
    /// Part of an explicit multi selection delete.
    SelectedForDeletion,
    /// Its workspace is going away.
    WorkspaceDeletion,
}

/// Behavior attached to nodes from outside the structural model.
///
/// The model consults these hooks at fixed points and never caches their
/// answers. Implementations must not mutate the project; they receive it
/// read only together with the operation that is currently being recorded.
/// Every method has a permissive default so embedders only override the
/// decisions they care about.
pub trait NodeHooks {
    /// Asked once per deletion target. Returning false keeps `node` alive.
    /// `targets` lists every node in the same deletion request.
    fn on_deletion_requested(
        &self,
        project: &Project,
        node: NodeId,
        targets: &[NodeId],
        cause: DeletionCause,
        op: &mut UserOperation,
    ) -> bool {
        let _ = (project, node, targets, cause, op);
        true
    }

    /// Asked once per cut target. Returning false keeps `node` out of the
    /// paste.
    fn on_cut_requested(
        &self,
        project: &Project,
        node: NodeId,
        targets: &[NodeId],
        op: &mut UserOperation,
    ) -> bool {
        let _ = (project, node, targets, op);
        true
    }

    /// Decides whether `candidate`, a node in the tree below `target`, is
    /// carried along when `target` is copied. A rejected candidate is
    /// replaced by a default node in the copy. Rejecting `target` itself
    /// cancels the whole copy.
    fn copy_filter(
        &self,
        project: &Project,
        target: NodeId,
        to_copy: &[NodeId],
        candidate: NodeId,
        op: &mut UserOperation,
    ) -> bool {
        let _ = (project, target, to_copy, candidate, op);
        true
    }

    /// Extra connectability rule evaluated after the structural checks.
    fn can_connect(&self, project: &Project, connector: ConnectorId, node: NodeId) -> bool {
        let _ = (project, connector, node);
        true
    }

    /// Decides whether `text` may be stored in the leaf node `node`.
    fn text_acceptable(&self, project: &Project, node: NodeId, text: &str) -> bool {
        let _ = (project, node, text);
        true
    }

    /// Rewrites text on its way into a leaf node. `text` is the current
    /// payload and `added` the part being appended. The default keeps the
    /// addition as typed.
    fn format_text(&self, project: &Project, node: NodeId, text: &str, added: &str) -> FormatResult {
        let _ = (project, node, text);
        FormatResult {
            whole: false,
            text: added.to_string(),
        }
    }

    /// Recomputes the compile error messages of `node`.
    fn compile_errors(&self, project: &Project, node: NodeId) -> Vec<String> {
        let _ = (project, node);
        Vec::new()
    }

    /// Called after `old` was swapped for `new` below `parent`.
    fn on_child_replaced(
        &self,
        project: &Project,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
        connector: ConnectorId,
        op: &mut UserOperation,
    ) {
        let _ = (project, parent, old, new, connector, op);
    }

    /// Called after `moved` left its parent and became a workspace root.
    /// `replacement` now occupies its former slot.
    fn on_moved_from_child_to_workspace(
        &self,
        project: &Project,
        old_parent: NodeId,
        old_root: NodeId,
        replacement: NodeId,
        moved: NodeId,
        op: &mut UserOperation,
    ) {
        let _ = (project, old_parent, old_root, replacement, moved, op);
    }

    /// Called after `moved` left the workspace `old_workspace` and became a
    /// child of `new_parent`.
    fn on_moved_from_workspace_to_child(
        &self,
        project: &Project,
        old_workspace: Option<WorkspaceId>,
        new_parent: NodeId,
        moved: NodeId,
        op: &mut UserOperation,
    ) {
        let _ = (project, old_workspace, new_parent, moved, op);
    }

    /// Called after a node was instantiated to serve as a palette template.
    fn on_created_as_template(&self, project: &Project, node: NodeId, op: &mut UserOperation) {
        let _ = (project, node, op);
    }
}

/// Hook set that accepts everything and does nothing.
#[derive(Debug, Default)]
pub struct NullHooks;

impl NodeHooks for NullHooks {}
