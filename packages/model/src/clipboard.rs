//! Copy and cut lists with the shared paste placement counter.
//!
//! Both lists hold live nodes by id; a member leaving its workspace is
//! dropped automatically during workspace-change dispatch. Pasting composes
//! the public mutators, so undo support falls out of the recorded
//! sub-operations.

use crate::connector::Connector;
use crate::event::{ClipboardAddedEvent, ClipboardRemovedEvent};
use crate::history::{SubOp, UserOperation};
use crate::id::{ConnectorId, NodeId, WorkspaceId};
use crate::node::{Node, NodeKind, Point, Swapped};
use crate::project::Project;
use crate::section::Section;
use tracing::debug;

/// Grid unit for shifting displaced and pasted trees apart.
pub const REPLACED_NODE_SHIFT: f64 = 20.0;

/// Which clipboard a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardKind {
    Copy,
    Cut,
}

/// Decides which nodes of a tree make it into a copy.
enum CopyFilter<'a> {
    Everything,
    Hook { target: NodeId, to_copy: &'a [NodeId] },
}

impl CopyFilter<'_> {
    fn accepts(&self, project: &Project, node: NodeId, op: &mut UserOperation) -> bool {
        match self {
            CopyFilter::Everything => true,
            CopyFilter::Hook { target, to_copy } => {
                let hooks = project.hooks_handle();
                hooks.copy_filter(project, *target, to_copy, node, op)
            }
        }
    }
}

impl Project {
    pub fn copy_list(&self) -> &[NodeId] {
        &self.copy_list
    }

    pub fn cut_list(&self) -> &[NodeId] {
        &self.cut_list
    }

    /// Marks `node` for copying. Deleted nodes and nodes already on the list
    /// are ignored.
    pub fn add_to_copy_list(&mut self, node: NodeId, op: &mut UserOperation) {
        if self.copy_list.contains(&node) || self.node(node).is_deleted() {
            return;
        }
        self.copy_list.push(node);
        op.push(SubOp::RemoveFromClipboard {
            kind: ClipboardKind::Copy,
            node,
        });
        self.dispatch_clipboard_added(
            ClipboardAddedEvent {
                kind: ClipboardKind::Copy,
                node,
            },
            op,
        );
    }

    pub fn remove_from_copy_list(&mut self, node: NodeId, op: &mut UserOperation) {
        let Some(index) = self.copy_list.iter().position(|n| *n == node) else {
            return;
        };
        self.copy_list.remove(index);
        op.push(SubOp::AddToClipboard {
            kind: ClipboardKind::Copy,
            node,
        });
        self.dispatch_clipboard_removed(
            ClipboardRemovedEvent {
                kind: ClipboardKind::Copy,
                node,
            },
            op,
        );
    }

    /// Marks `node` for cutting. Deleted nodes and nodes already on the list
    /// are ignored.
    pub fn add_to_cut_list(&mut self, node: NodeId, op: &mut UserOperation) {
        if self.cut_list.contains(&node) || self.node(node).is_deleted() {
            return;
        }
        self.cut_list.push(node);
        op.push(SubOp::RemoveFromClipboard {
            kind: ClipboardKind::Cut,
            node,
        });
        self.dispatch_clipboard_added(
            ClipboardAddedEvent {
                kind: ClipboardKind::Cut,
                node,
            },
            op,
        );
    }

    pub fn remove_from_cut_list(&mut self, node: NodeId, op: &mut UserOperation) {
        let Some(index) = self.cut_list.iter().position(|n| *n == node) else {
            return;
        };
        self.cut_list.remove(index);
        op.push(SubOp::AddToClipboard {
            kind: ClipboardKind::Cut,
            node,
        });
        self.dispatch_clipboard_removed(
            ClipboardRemovedEvent {
                kind: ClipboardKind::Cut,
                node,
            },
            op,
        );
    }

    pub fn clear_copy_list(&mut self, op: &mut UserOperation) {
        while let Some(&node) = self.copy_list.first() {
            self.remove_from_copy_list(node, op);
        }
    }

    pub fn clear_cut_list(&mut self, op: &mut UserOperation) {
        while let Some(&node) = self.cut_list.first() {
            self.remove_from_cut_list(node, op);
        }
    }

    /// Deep-copies the tree under `target`, asking the copy hook about every
    /// node on the way down. A rejected child is stood in for by a fresh
    /// default; a rejected `target` yields no copy at all.
    pub fn copy_node(
        &mut self,
        target: NodeId,
        to_copy: &[NodeId],
        op: &mut UserOperation,
    ) -> Option<NodeId> {
        let filter = CopyFilter::Hook { target, to_copy };
        self.copy_tree_with(target, &filter, op)
    }

    /// Deep copy without hook involvement, for snapshots and default
    /// restoration.
    pub(crate) fn copy_tree_unfiltered(&mut self, root: NodeId, op: &mut UserOperation) -> NodeId {
        self.copy_accepted(root, &CopyFilter::Everything, op)
    }

    fn copy_tree_with(
        &mut self,
        source: NodeId,
        filter: &CopyFilter<'_>,
        op: &mut UserOperation,
    ) -> Option<NodeId> {
        if !filter.accepts(self, source, op) {
            return None;
        }
        Some(self.copy_accepted(source, filter, op))
    }

    fn copy_accepted(
        &mut self,
        source: NodeId,
        filter: &CopyFilter<'_>,
        op: &mut UserOperation,
    ) -> NodeId {
        let def_id = self.node(source).def_id().clone();
        let def = self
            .templates()
            .node(&def_id)
            .unwrap_or_else(|| panic!("node definition {def_id} is not registered"))
            .clone();
        let id = self.alloc_node_id();
        let source_sections: Option<Vec<(String, Vec<ConnectorId>)>> =
            match &self.node(source).kind {
                NodeKind::Leaf { .. } => None,
                NodeKind::Composite { sections } => Some(
                    sections
                        .iter()
                        .map(|s| (s.name().to_string(), s.connectors().to_vec()))
                        .collect(),
                ),
            };
        let kind = match source_sections {
            None => NodeKind::Leaf {
                text: self.node(source).text().unwrap_or_default().to_string(),
            },
            Some(sections) => {
                let mut built = Vec::with_capacity(sections.len());
                for (name, connectors) in sections {
                    let mut copied = Vec::with_capacity(connectors.len());
                    for source_connector in connectors {
                        let occupant = self.connector(source_connector).connected();
                        let child = match self.copy_tree_with(occupant, filter, op) {
                            Some(copy) => copy,
                            None => self.create_default_node(source_connector, op),
                        };
                        let connector_def_id = self.connector(source_connector).def_id().clone();
                        let connector_def = self
                            .templates()
                            .connector(&connector_def_id)
                            .unwrap_or_else(|| {
                                panic!("connector definition {connector_def_id} is not registered")
                            })
                            .clone();
                        let connector_id = self.alloc_connector_id();
                        self.register_connector(Connector::new(
                            connector_id,
                            &connector_def,
                            id,
                            child,
                        ));
                        self.node_mut(child).parent_connector = Some(connector_id);
                        copied.push(connector_id);
                    }
                    built.push(Section::new(name, copied));
                }
                NodeKind::Composite { sections: built }
            }
        };
        let mut copy = Node::new(id, &def, kind);
        copy.is_default = self.node(source).is_default();
        self.register_node(copy);
        // a copied derivative shadows the same original as its source
        if let Some(original) = self.node(source).original() {
            self.add_derivative(original, id, op);
        }
        id
    }

    /// Clones every qualifying copy-list member into `workspace` around
    /// `base`. The list itself survives the paste.
    pub fn paste_copy(&mut self, workspace: WorkspaceId, base: Point, op: &mut UserOperation) {
        if self.copy_list.is_empty() {
            return;
        }
        debug!(%workspace, count = self.copy_list.len(), "pasting copied nodes");
        let candidates: Vec<NodeId> = self
            .copy_list
            .iter()
            .copied()
            .filter(|&n| self.pasteable(n))
            .collect();
        let mut copies = Vec::new();
        for &target in &candidates {
            if let Some(copy) = self.copy_node(target, &candidates, op) {
                copies.push(copy);
            }
        }
        let mut at = base;
        at.y += f64::from(self.paste_counter) * REPLACED_NODE_SHIFT * 2.0;
        for copy in copies {
            self.add_node_tree(workspace, copy, op);
            self.move_node(copy, at, op);
            at.x += REPLACED_NODE_SHIFT * 2.0;
        }
        self.advance_paste_counter();
    }

    /// Moves every qualifying cut-list member into `workspace` around `base`,
    /// detaching children from their parents on the way. The list is cleared
    /// afterwards.
    pub fn paste_cut(&mut self, workspace: WorkspaceId, base: Point, op: &mut UserOperation) {
        if self.cut_list.is_empty() {
            return;
        }
        debug!(%workspace, count = self.cut_list.len(), "pasting cut nodes");
        let candidates: Vec<NodeId> = self
            .cut_list
            .iter()
            .copied()
            .filter(|&n| self.pasteable(n))
            .collect();
        let hooks = self.hooks_handle();
        let mut to_paste = Vec::new();
        for &node in &candidates {
            if hooks.on_cut_requested(self, node, &candidates, op) {
                to_paste.push(node);
            }
        }
        let mut at = base;
        at.y += f64::from(self.paste_counter) * REPLACED_NODE_SHIFT * 2.0;
        for node in to_paste {
            let swapped = if self.node(node).is_child() {
                self.remove(node, op)
            } else {
                Vec::new()
            };
            self.add_node_tree(workspace, node, op);
            self.move_node(node, at, op);
            at.x += REPLACED_NODE_SHIFT * 2.0;
            self.notify_cut_paste(node, &swapped, op);
        }
        self.advance_paste_counter();
        self.clear_cut_list(op);
    }

    fn notify_cut_paste(&mut self, moved: NodeId, swapped: &[Swapped], op: &mut UserOperation) {
        let hooks = self.hooks_handle();
        if let Some(first) = swapped.first() {
            if let Some(connector) = self.node(first.new).parent_connector() {
                let parent = self.connector(connector).parent_node();
                let root = self.root_of(first.new);
                hooks.on_moved_from_child_to_workspace(self, parent, root, first.new, moved, op);
            }
        }
        for pair in swapped {
            if let Some(connector) = self.node(pair.new).parent_connector() {
                let parent = self.connector(connector).parent_node();
                hooks.on_child_replaced(self, parent, moved, pair.new, connector, op);
            }
        }
    }

    /// List members qualify for pasting while they sit on a rooted tree.
    fn pasteable(&self, node: NodeId) -> bool {
        let entry = self.node(node);
        entry.is_root() || (entry.is_child() && self.node(self.root_of(node)).is_root())
    }

    fn advance_paste_counter(&mut self) {
        if self.paste_counter > 2 {
            self.paste_counter = -2;
        } else {
            self.paste_counter += 1;
        }
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
    fn detached_nodes_stay_off_the_lists() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let listed = project.instantiate(&"int-lit".into()).unwrap();
        let detached = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, listed, &mut op);

        project.add_to_copy_list(listed, &mut op);
        project.add_to_copy_list(listed, &mut op);
        project.add_to_copy_list(detached, &mut op);
        assert_eq!(project.copy_list(), &[listed]);

        project.add_to_cut_list(detached, &mut op);
        assert!(project.cut_list().is_empty());
    }

    #[test]
    fn list_membership_round_trips_through_undo() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut setup = UserOperation::new();
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, lit, &mut setup);

        let mut op = UserOperation::new();
        project.add_to_copy_list(lit, &mut op);
        let redo = op.invert_and_replay(&mut project);
        assert!(project.copy_list().is_empty());
        redo.invert_and_replay(&mut project);
        assert_eq!(project.copy_list(), &[lit]);
    }

    #[test]
    fn leaving_the_workspace_drops_a_node_from_the_lists() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, lit, &mut op);
        project.add_to_copy_list(lit, &mut op);
        project.add_to_cut_list(lit, &mut op);

        project.remove_node_tree(ws, lit, &mut op);
        assert!(project.copy_list().is_empty());
        assert!(project.cut_list().is_empty());
    }

    #[test]
    fn copies_carry_text_and_share_no_identity() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let arg = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, arg, &mut op);
        project.set_text(arg, "42", &mut op);

        let copy = project.copy_node(print, &[print], &mut op).unwrap();
        let originals: Vec<_> = project.subtree(print);
        for n in project.subtree(copy) {
            assert!(!originals.contains(&n));
        }
        assert!(project.node(copy).is_deleted());
        let copied_arg = project.child_nodes(copy)[0];
        assert_eq!(project.node(copied_arg).def_id(), &"int-lit".into());
        assert_eq!(project.node(copied_arg).text(), Some("42"));
    }

    struct RejectDef(crate::id::NodeDefId);

    impl NodeHooks for RejectDef {
        fn copy_filter(
            &self,
            project: &Project,
            _target: NodeId,
            _to_copy: &[NodeId],
            candidate: NodeId,
            _op: &mut UserOperation,
        ) -> bool {
            project.node(candidate).def_id() != &self.0
        }
    }

    #[test]
    fn rejected_children_become_fresh_defaults_in_the_copy() {
        let (mut project, ws) =
            fixture::project_with_workspace_and_hooks(Rc::new(RejectDef("int-lit".into())));
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let arg = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, arg, &mut op);

        let copy = project.copy_node(print, &[print], &mut op).unwrap();
        let copied_arg = project.child_nodes(copy)[0];
        assert_eq!(project.node(copied_arg).def_id(), &"void-expr".into());
        assert!(project.node(copied_arg).is_default());
    }

    #[test]
    fn pasting_copies_leaves_the_list_and_the_originals_alone() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        project.add_to_copy_list(print, &mut op);

        project.paste_copy(ws, Point::new(5.0, 5.0), &mut op);
        assert_eq!(project.copy_list(), &[print]);
        let roots = project.workspace(ws).roots();
        assert_eq!(roots.len(), 2);
        let copy = roots[1];
        assert_ne!(copy, print);
        assert_eq!(project.subtree(copy).len(), 3);
        assert_eq!(project.node(copy).position(), Point::new(5.0, 5.0));

        // the second paste lands one shift unit lower
        project.paste_copy(ws, Point::new(5.0, 5.0), &mut op);
        let second = project.workspace(ws).roots()[2];
        assert_eq!(
            project.node(second).position(),
            Point::new(5.0, 5.0 + 2.0 * REPLACED_NODE_SHIFT)
        );
    }

    #[test]
    fn pasting_cut_roots_moves_them_and_clears_the_list() {
        let (mut project, ws) = fixture::project_with_workspace();
        let mut op = UserOperation::new();
        let other = project.add_workspace("scratch", &mut op);
        let lit = project.instantiate(&"int-lit".into()).unwrap();
        project.add_node_tree(ws, lit, &mut op);
        project.add_to_cut_list(lit, &mut op);

        project.paste_cut(other, Point::new(1.0, 2.0), &mut op);
        assert_eq!(project.node(lit).workspace(), Some(other));
        assert!(project.workspace(ws).roots().is_empty());
        assert_eq!(project.workspace(other).roots(), &[lit]);
        assert_eq!(project.node(lit).position(), Point::new(1.0, 2.0));
        assert!(project.cut_list().is_empty());
    }

    #[derive(Default)]
    struct ReplacementLog(RefCell<Vec<(NodeId, NodeId)>>);

    impl NodeHooks for ReplacementLog {
        fn on_child_replaced(
            &self,
            _project: &Project,
            _parent: NodeId,
            old: NodeId,
            new: NodeId,
            _connector: crate::id::ConnectorId,
            _op: &mut UserOperation,
        ) {
            self.0.borrow_mut().push((old, new));
        }
    }

    #[test]
    fn pasting_a_cut_child_detaches_it_and_reports_the_swap() {
        let log = Rc::new(ReplacementLog::default());
        let (mut project, ws) = fixture::project_with_workspace_and_hooks(log.clone());
        let mut op = UserOperation::new();
        let print = project.instantiate(&"print-stmt".into()).unwrap();
        project.add_node_tree(ws, print, &mut op);
        let arg = project.instantiate(&"int-lit".into()).unwrap();
        let slot = project.child_nodes(print)[0];
        project.replace(slot, arg, &mut op);
        project.add_to_cut_list(arg, &mut op);

        project.paste_cut(ws, Point::new(0.0, 0.0), &mut op);
        assert!(project.node(arg).is_root());
        let filler = project.child_nodes(print)[0];
        assert!(project.node(filler).is_default());
        let swaps = log.0.borrow();
        assert!(swaps.iter().any(|&(old, new)| old == arg && new == filler));
    }
}
