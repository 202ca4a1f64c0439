//! Structural editing flows composed from the model primitives.
//!
//! The model keeps a replace or delete locally consistent; the flows here
//! finish the job the way an editor gesture expects it: displaced derivative
//! occupants are deleted instead of piling up as roots, holes left by an
//! exchange are cleaned away, and every former parent is rechecked for
//! compile errors. Each flow records into one [`UserOperation`], so a
//! gesture reverts as a single undo level.

use crate::error::EditError;
use tangram_model::{
    DeletionCause, NodeId, Point, Project, Swapped, UserOperation, WorkspaceId,
    REPLACED_NODE_SHIFT,
};
use tracing::debug;

/// Deletes the whole tree under `node` together with its derivatives and
/// rechecks the nodes that filled the holes. Already deleted nodes are
/// skipped.
pub fn delete_node(project: &mut Project, node: NodeId, op: &mut UserOperation) -> Vec<Swapped> {
    if project.node(node).is_deleted() {
        return Vec::new();
    }
    let swapped = project.delete_node_tree(node, op);
    for pair in &swapped {
        project.check_compile_error(pair.new, op);
    }
    notify_child_replaced(project, &swapped, op);
    swapped
}

/// Runs the deletion hook over `targets` and deletes the approved ones.
/// Returns every swap the deletions produced.
pub fn delete_nodes(
    project: &mut Project,
    targets: &[NodeId],
    cause: DeletionCause,
    op: &mut UserOperation,
) -> Vec<Swapped> {
    let hooks = project.hooks_handle();
    let approved: Vec<NodeId> = targets
        .iter()
        .copied()
        .filter(|&node| hooks.on_deletion_requested(project, node, targets, cause, op))
        .collect();
    let mut all = Vec::new();
    for node in approved {
        all.extend(delete_node(project, node, op));
    }
    all
}

// Tells every parent that gained a new occupant about the swap.
fn notify_child_replaced(project: &Project, pairs: &[Swapped], op: &mut UserOperation) {
    let hooks = project.hooks_handle();
    for pair in pairs {
        if let Some(connector) = project.node(pair.new).parent_connector() {
            let parent = project.connector(connector).parent_node();
            hooks.on_child_replaced(project, parent, pair.old, pair.new, connector, op);
        }
    }
}

// Only children have anything to detach from; the slot is filled with a
// fresh default.
fn detach(project: &mut Project, node: NodeId, op: &mut UserOperation) -> Vec<Swapped> {
    if project.node(node).is_child() {
        project.remove(node, op)
    } else {
        Vec::new()
    }
}

/// Moves the tree under `node` onto `workspace` at `position`, detaching it
/// from its parent first when it sits in a slot.
pub fn move_to_workspace(
    project: &mut Project,
    workspace: WorkspaceId,
    node: NodeId,
    position: Point,
    op: &mut UserOperation,
) -> Vec<Swapped> {
    let old_parent = project.parent_node_of(node);
    let old_root = project.root_of(node);
    let swapped = detach(project, node, op);
    project.add_node_tree(workspace, node, op);
    project.move_node(node, position, op);
    for pair in &swapped {
        project.check_compile_error(pair.new, op);
    }
    project.check_compile_error(node, op);
    notify_child_replaced(project, &swapped, op);
    if let (Some(parent), Some(filler)) = (old_parent, project.node(node).last_replaced()) {
        let hooks = project.hooks_handle();
        hooks.on_moved_from_child_to_workspace(project, parent, old_root, filler, node, op);
    }
    swapped
}

/// Puts `new` into the slot currently holding `old` and completes the swap.
///
/// The displaced occupant stays on its workspace as a root, nudged aside by
/// [`REPLACED_NODE_SHIFT`] so the two trees do not overlap. Displaced
/// derivative occupants are deleted outright; their replacements already
/// took the joint slots.
pub fn replace_child(
    project: &mut Project,
    old: NodeId,
    new: NodeId,
    op: &mut UserOperation,
) -> Vec<Swapped> {
    if !project.node(old).is_child() {
        return Vec::new();
    }
    let old_parent = project.parent_node_of(old);
    let old_root = project.root_of(old);
    let old_workspace = project.node(new).workspace();
    let swapped = project.replace(old, new, op);
    if swapped.is_empty() {
        return Vec::new();
    }
    let mut all = swapped.clone();
    // every pair past the first is a displaced derivative occupant, now
    // sitting rooted on its workspace
    for pair in swapped.iter().skip(1) {
        all.extend(delete_node(project, pair.old, op));
    }
    if project.node(old).is_root() {
        let at = project.node(old).position();
        let shifted = Point::new(at.x + REPLACED_NODE_SHIFT, at.y + REPLACED_NODE_SHIFT);
        project.move_node(old, shifted, op);
    }
    project.check_compile_error(old, op);
    project.check_compile_error(new, op);
    let hooks = project.hooks_handle();
    if let Some(parent) = project.parent_node_of(new) {
        hooks.on_moved_from_workspace_to_child(project, old_workspace, parent, new, op);
    }
    if let Some(parent) = old_parent {
        hooks.on_moved_from_child_to_workspace(project, parent, old_root, new, old, op);
    }
    notify_child_replaced(project, &swapped, op);
    all
}

/// Swaps the places of two trees: slots when they are children, workspace
/// positions when they are roots.
///
/// Neither node may be deleted, and the trees must be distinct.
pub fn exchange(
    project: &mut Project,
    a: NodeId,
    b: NodeId,
    op: &mut UserOperation,
) -> Result<(), EditError> {
    if project.node(a).is_deleted() {
        return Err(EditError::NodeDeleted(a));
    }
    if project.node(b).is_deleted() {
        return Err(EditError::NodeDeleted(b));
    }
    if project.is_descendant_of(a, b) || project.is_descendant_of(b, a) {
        return Err(EditError::SameTree(a, b));
    }
    debug!(%a, %b, "exchanging nodes");
    // normalize so a (child, root) pairing always leads with the child
    let (a, b) = if project.node(a).is_root() && project.node(b).is_child() {
        (b, a)
    } else {
        (a, b)
    };
    let pos_a = project.node(a).position();
    let pos_b = project.node(b).position();
    let ws_a = project.node(a).workspace();
    let ws_b = project.node(b).workspace();

    if project.node(a).is_child() && project.node(b).is_child() {
        let hole_a = project.remove(a, op)[0].new;
        let hole_b = project.remove(b, op)[0].new;
        replace_child(project, hole_a, b, op);
        replace_child(project, hole_b, a, op);
        delete_node(project, hole_a, op);
        delete_node(project, hole_b, op);
    } else if project.node(a).is_child() {
        replace_child(project, a, b, op);
        if let Some(ws) = ws_b {
            move_to_workspace(project, ws, a, pos_b, op);
        }
    } else if let (Some(to_a), Some(to_b)) = (ws_a, ws_b) {
        move_to_workspace(project, to_a, b, pos_a, op);
        move_to_workspace(project, to_b, a, pos_b, op);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tangram_model::{NodeDefId, NodeHooks, TemplateSet};

    const GRAMMAR: &str = r#"{
        "nodes": [
            {"id": "void-expr", "name": "void", "body": {"type": "leaf"}},
            {"id": "void-stmt", "name": "void", "body": {"type": "leaf"}},
            {"id": "int-lit", "name": "int", "body": {"type": "leaf", "text": "0"}},
            {
                "id": "name-lit",
                "name": "name",
                "body": {"type": "leaf", "text": "name"},
                "derivatives": {"name-link": "name-ref"}
            },
            {"id": "name-ref", "name": "name", "body": {"type": "leaf", "text": "name"}},
            {
                "id": "print-stmt",
                "name": "print",
                "body": {
                    "type": "composite",
                    "sections": [{"name": "body", "connectors": ["c-arg", "c-next"]}]
                }
            },
            {
                "id": "proc-decl",
                "name": "proc",
                "body": {
                    "type": "composite",
                    "sections": [{"name": "header", "connectors": ["c-name", "c-body"]}]
                },
                "derivatives": {"proc-link": "proc-call"}
            },
            {
                "id": "proc-call",
                "name": "call",
                "body": {
                    "type": "composite",
                    "sections": [{"name": "call", "connectors": ["cc-name", "cc-next"]}]
                }
            }
        ],
        "connectors": [
            {"id": "c-arg", "name": "arg", "default_node": "void-expr"},
            {"id": "c-next", "name": "next", "default_node": "void-stmt"},
            {
                "id": "c-name",
                "name": "name",
                "default_node": "name-lit",
                "derivation": "name-link",
                "joint": "j-name"
            },
            {"id": "c-body", "name": "body", "default_node": "void-stmt"},
            {"id": "cc-name", "name": "name", "default_node": "name-ref", "joint": "j-name"},
            {"id": "cc-next", "name": "next", "default_node": "void-stmt"}
        ]
    }"#;

    fn templates() -> TemplateSet {
        TemplateSet::from_json(GRAMMAR).unwrap()
    }

    fn project_with_workspace() -> (Project, WorkspaceId) {
        let mut project = Project::new(templates()).unwrap();
        let mut op = UserOperation::new();
        let ws = project.add_workspace("main", &mut op);
        (project, ws)
    }

    #[test]
    fn deleting_a_child_fills_the_slot_with_a_default() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, lit, &mut op);

        let swapped = delete_node(&mut project, lit, &mut op);
        assert!(project.node(lit).is_deleted());
        let filler = project.child_nodes(print)[0];
        assert!(project.node(filler).is_default());
        assert_eq!(swapped[0], Swapped { old: lit, new: filler });

        // a second delete finds nothing left to do
        assert!(delete_node(&mut project, lit, &mut op).is_empty());
    }

    struct KeepDef(NodeDefId);

    impl NodeHooks for KeepDef {
        fn on_deletion_requested(
            &self,
            project: &Project,
            node: NodeId,
            _targets: &[NodeId],
            _cause: DeletionCause,
            _op: &mut UserOperation,
        ) -> bool {
            project.node(node).def_id() != &self.0
        }
    }

    #[test]
    fn the_deletion_hook_filters_the_batch() {
        let mut project =
            Project::with_hooks(templates(), Rc::new(KeepDef("int-lit".into()))).unwrap();
        let mut op = UserOperation::new();
        let ws = project.add_workspace("main", &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, lit, &mut op);
        project.add_node_tree(ws, print, &mut op);

        delete_nodes(
            &mut project,
            &[lit, print],
            DeletionCause::SelectedForDeletion,
            &mut op,
        );
        assert!(project.node(lit).is_root());
        assert!(project.node(print).is_deleted());
        assert_eq!(project.workspace(ws).roots(), &[lit]);
    }

    #[test]
    fn moving_a_child_out_leaves_a_default_behind() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, lit, &mut op);

        move_to_workspace(&mut project, ws, lit, Point::new(7.0, 9.0), &mut op);
        assert!(project.node(lit).is_root());
        assert_eq!(project.node(lit).position(), Point::new(7.0, 9.0));
        assert!(project.node(project.child_nodes(print)[0]).is_default());
    }

    #[test]
    fn replacing_a_child_deletes_displaced_derivative_occupants() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let proc = project.instantiate(&"proc-decl".into()).unwrap();
        project.add_node_tree(ws, proc, &mut op);
        let call = project
            .build_derivative(proc, &"proc-link".into(), &mut op)
            .unwrap();
        project.add_node_tree(ws, call, &mut op);
        let name = project.child_nodes(proc)[0];
        let old_ref = project.child_nodes(call)[0];

        let new_name = project.instantiate(&"name-lit".into()).unwrap();
        replace_child(&mut project, name, new_name, &mut op);

        let new_ref = project.child_nodes(call)[0];
        assert_eq!(project.node(new_ref).original(), Some(new_name));
        assert!(project.node(old_ref).is_deleted());
        // the displaced original stays put as a root
        assert!(project.node(name).is_root());
    }

    #[derive(Default)]
    struct MoveLog {
        to_child: RefCell<Vec<(Option<WorkspaceId>, NodeId, NodeId)>>,
        to_workspace: RefCell<Vec<(NodeId, NodeId, NodeId, NodeId)>>,
    }

    impl NodeHooks for MoveLog {
        fn on_moved_from_workspace_to_child(
            &self,
            _project: &Project,
            old_workspace: Option<WorkspaceId>,
            new_parent: NodeId,
            moved: NodeId,
            _op: &mut UserOperation,
        ) {
            self.to_child.borrow_mut().push((old_workspace, new_parent, moved));
        }

        fn on_moved_from_child_to_workspace(
            &self,
            _project: &Project,
            old_parent: NodeId,
            old_root: NodeId,
            replacement: NodeId,
            moved: NodeId,
            _op: &mut UserOperation,
        ) {
            self.to_workspace
                .borrow_mut()
                .push((old_parent, old_root, replacement, moved));
        }
    }

    #[test]
    fn dropping_a_root_onto_a_child_reports_both_moves() {
        let log = Rc::new(MoveLog::default());
        let mut project = Project::with_hooks(templates(), log.clone()).unwrap();
        let mut op = UserOperation::new();
        let ws = project.add_workspace("main", &mut op);
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, lit, &mut op);
        let slot = project.child_nodes(print)[0];

        replace_child(&mut project, slot, lit, &mut op);
        assert_eq!(*log.to_child.borrow(), [(Some(ws), print, lit)]);
        assert_eq!(*log.to_workspace.borrow(), [(print, print, lit, slot)]);
        // the displaced default is nudged off the drop point
        assert!(project.node(slot).is_root());
        assert_eq!(
            project.node(slot).position(),
            Point::new(REPLACED_NODE_SHIFT, REPLACED_NODE_SHIFT)
        );
    }

    #[test]
    fn dragging_a_child_to_the_workspace_reports_the_move() {
        let log = Rc::new(MoveLog::default());
        let mut project = Project::with_hooks(templates(), log.clone()).unwrap();
        let mut op = UserOperation::new();
        let ws = project.add_workspace("main", &mut op);
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, lit, &mut op);

        move_to_workspace(&mut project, ws, lit, Point::new(4.0, 8.0), &mut op);
        let filler = project.child_nodes(print)[0];
        assert_eq!(*log.to_workspace.borrow(), [(print, print, filler, lit)]);
        assert!(log.to_child.borrow().is_empty());

        // a root dragged around its workspace reports nothing
        log.to_workspace.borrow_mut().clear();
        move_to_workspace(&mut project, ws, lit, Point::new(6.0, 2.0), &mut op);
        assert!(log.to_workspace.borrow().is_empty());
    }

    #[test]
    fn exchanging_two_roots_swaps_workspaces_and_positions() {
        let (mut project, here) = project_with_workspace();
        let mut op = UserOperation::new();
        let there = project.add_workspace("scratch", &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(here, lit, &mut op);
        project.move_node(lit, Point::new(1.0, 2.0), &mut op);
        project.add_node_tree(there, print, &mut op);
        project.move_node(print, Point::new(3.0, 4.0), &mut op);

        exchange(&mut project, lit, print, &mut op).unwrap();
        assert_eq!(project.node(lit).workspace(), Some(there));
        assert_eq!(project.node(lit).position(), Point::new(3.0, 4.0));
        assert_eq!(project.node(print).workspace(), Some(here));
        assert_eq!(project.node(print).position(), Point::new(1.0, 2.0));
    }

    #[test]
    fn exchanging_a_child_with_a_root_moves_the_root_into_the_slot() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let inner = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, inner, &mut op);
        let outer = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, outer, &mut op);
        project.move_node(outer, Point::new(50.0, 60.0), &mut op);

        // argument order must not matter
        exchange(&mut project, outer, inner, &mut op).unwrap();
        assert_eq!(project.child_nodes(print)[0], outer);
        assert!(project.node(inner).is_root());
        assert_eq!(project.node(inner).position(), Point::new(50.0, 60.0));
    }

    #[test]
    fn exchanging_two_children_swaps_their_slots() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let first = project.instantiate(&"print-stmt".into()).unwrap();
        let second = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, first, &mut op);
        project.add_node_tree(ws, second, &mut op);
        let lit_a = project.instantiate(&"int-lit".into()).unwrap();
        let lit_b = project.instantiate(&"int-lit".into()).unwrap();
        project.replace(project.child_nodes(first)[0], lit_a, &mut op);
        project.replace(project.child_nodes(second)[0], lit_b, &mut op);

        exchange(&mut project, lit_a, lit_b, &mut op).unwrap();
        assert_eq!(project.child_nodes(first)[0], lit_b);
        assert_eq!(project.child_nodes(second)[0], lit_a);
        // the temporary hole fillers are gone again
        assert_eq!(project.workspace(ws).roots(), &[first, second]);
    }

    #[test]
    fn exchange_rejects_kin_and_deleted_nodes() {
        let (mut project, ws) = project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let slot = project.child_nodes(print)[0];

        let err = exchange(&mut project, print, slot, &mut op).unwrap_err();
        assert!(matches!(err, EditError::SameTree(_, _)));

        let unplaced = project.instantiate(&"int-lit".into()).unwrap();
        let err = exchange(&mut project, unplaced, print, &mut op).unwrap_err();
        assert!(matches!(err, EditError::NodeDeleted(n) if n == unplaced));
    }
}
