//! # Edit Session
//!
//! One open project together with the undo history of its edits.
//!
//! A session hands out the project for reading and funnels every mutation
//! through [`EditSession::edit`], which wraps the closure's work into one
//! [`UserOperation`] and commits it as a single undo level.

use crate::error::EditError;
use crate::placer;
use crate::undo::UndoRedoAgent;
use std::fmt;
use std::path::Path;
use tangram_common::{load_templates, CommonResult, FileSystem};
use tangram_model::{
    DeletionCause, NodeDefId, NodeId, Point, Project, Swapped, UserOperation, WorkspaceId,
};

/// Editing state for one open project.
pub struct EditSession {
    project: Project,
    history: UndoRedoAgent,
}

impl EditSession {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            history: UndoRedoAgent::new(),
        }
    }

    pub fn with_undo_depth(project: Project, depth: usize) -> Self {
        Self {
            project,
            history: UndoRedoAgent::with_depth(depth),
        }
    }

    /// Loads the template registry at `path` and opens a session over an
    /// empty project built from it.
    pub fn from_template_file<F: FileSystem>(fs: &F, path: &Path) -> CommonResult<EditSession> {
        let templates = load_templates(fs, path)?;
        let project = Project::new(templates)?;
        Ok(EditSession::new(project))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Direct mutable access bypasses the undo history; use
    /// [`EditSession::edit`] for anything that should be undoable.
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn history(&self) -> &UndoRedoAgent {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoRedoAgent {
        &mut self.history
    }

    /// Runs one edit against the project and commits everything it recorded
    /// as a single undo level.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Project, &mut UserOperation) -> T) -> T {
        let mut op = UserOperation::new();
        let out = f(&mut self.project, &mut op);
        self.history.commit(&mut self.project, op);
        out
    }

    /// Like [`EditSession::edit`] for fallible edits. The operation commits
    /// on error too, so partial work stays undoable.
    pub fn try_edit<T, E>(
        &mut self,
        f: impl FnOnce(&mut Project, &mut UserOperation) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut op = UserOperation::new();
        let out = f(&mut self.project, &mut op);
        self.history.commit(&mut self.project, op);
        out
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.project)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.project)
    }

    /// Instantiates `def` and drops the fresh tree onto `workspace` at
    /// `position`.
    pub fn place_new_node(
        &mut self,
        def: &NodeDefId,
        workspace: WorkspaceId,
        position: Point,
    ) -> Result<NodeId, EditError> {
        self.try_edit(|project, op| {
            let node = project.instantiate(def)?;
            placer::move_to_workspace(project, workspace, node, position, op);
            Ok(node)
        })
    }

    /// Deletes the nodes selected on the current workspace as one undo
    /// level. The deletion hook can veto individual nodes.
    pub fn delete_selected(&mut self, cause: DeletionCause) -> Vec<Swapped> {
        self.edit(|project, op| {
            let Some(ws) = project.current_workspace() else {
                return Vec::new();
            };
            let targets = project.workspace(ws).selected_nodes().to_vec();
            placer::delete_nodes(project, &targets, cause, op)
        })
    }

    /// Whether the project changed since the last [`EditSession::mark_saved`].
    pub fn is_dirty(&self) -> bool {
        self.project.is_dirty()
    }

    pub fn mark_saved(&mut self) {
        self.project.clear_dirty();
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("nodes", &self.project.node_count())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
