//! Structural model of a block program: trees of nodes wired through
//! connectors, grouped into workspaces, all owned by a [`Project`].
//!
//! Every mutation goes through `&mut Project` together with a
//! [`UserOperation`] that records inverse sub-operations, so undo and redo
//! replay through the same code paths as the original edit. Change
//! notification runs through per-object callback registries that re-publish
//! node events at the workspace and project levels. Application policy stays
//! out of the model; it is injected once through [`NodeHooks`].

pub mod clipboard;
pub mod connector;
pub mod derivative;
pub mod error;
pub mod event;
pub mod history;
pub mod hooks;
pub mod id;
pub mod node;
pub mod project;
pub mod section;
pub mod template;
pub mod traverse;
pub mod workspace;
pub mod workspace_set;

#[cfg(test)]
pub(crate) mod fixture;

pub use clipboard::{ClipboardKind, REPLACED_NODE_SHIFT};
pub use connector::Connector;
pub use error::{ModelError, TemplateError};
pub use event::*;
pub use history::UserOperation;
pub use hooks::{DeletionCause, FormatResult, NodeHooks, NullHooks};
pub use id::{
    ConnectorDefId, ConnectorId, DerivationId, JointId, NodeDefId, NodeId, WorkspaceId,
};
pub use node::{Node, NodeKind, NodeState, Point, Swapped};
pub use project::Project;
pub use section::Section;
pub use template::{
    BreakpointPolicy, ConnectorDef, NodeDef, NodeDefBody, SectionDef, TemplateSet,
};
pub use workspace::Workspace;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn the_public_surface_assembles_a_program() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, lit, &mut op);
        project.set_text(lit, "7", &mut op);

        assert_eq!(project.node(lit).text(), Some("7"));
        assert_eq!(project.node(lit).state(), NodeState::Child);
        assert_eq!(project.workspace(ws).roots().len(), 2);
    }
}
