use crate::event::{
    BreakpointEvent, CompileErrorEvent, CorruptionEvent, NodeCallbacks, SelectionEvent,
    TextChangeEvent,
};
use crate::history::{SubOp, UserOperation};
use crate::id::{ConnectorId, DerivationId, NodeDefId, NodeId, WorkspaceId};
use crate::project::Project;
use crate::section::Section;
use crate::template::{BreakpointPolicy, NodeDef};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use tracing::{debug, warn};

/// Position of a root node on its workspace plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Where a node currently sits. Always derived from the parent connector and
/// workspace references, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// On a workspace with no parent.
    Root,
    /// On a workspace below a parent connector.
    Child,
    /// On no workspace.
    Deleted,
}

/// Structural shape of a node.
pub enum NodeKind {
    /// Inner node. Children hang off the connectors of its sections.
    Composite { sections: Vec<Section> },
    /// Terminal node carrying a text payload.
    Leaf { text: String },
}

/// A pair of nodes that exchanged places during a structural operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swapped {
    pub old: NodeId,
    pub new: NodeId,
}

/// One node instance. All structure is expressed through ids resolved against
/// the owning [`Project`]; a node never holds a direct reference to another
/// node.
pub struct Node {
    id: NodeId,
    def_id: NodeDefId,
    name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent_connector: Option<ConnectorId>,
    pub(crate) workspace: Option<WorkspaceId>,
    pub(crate) selected: bool,
    pub(crate) is_default: bool,
    pub(crate) breakpoint: bool,
    pub(crate) corrupted: bool,
    pub(crate) compile_errors: Vec<String>,
    pub(crate) position: Point,
    derivation_to_def: HashMap<DerivationId, NodeDefId>,
    breakpoint_policy: BreakpointPolicy,
    pub(crate) derivatives: Vec<NodeId>,
    pub(crate) original: Option<NodeId>,
    pub(crate) last_original: Option<NodeId>,
    pub(crate) last_replaced: Option<NodeId>,
    pub(crate) view: Option<Box<dyn Any>>,
    pub(crate) callbacks: NodeCallbacks,
}

impl Node {
    pub(crate) fn new(id: NodeId, def: &NodeDef, kind: NodeKind) -> Self {
        Node {
            id,
            def_id: def.id.clone(),
            name: def.name.clone(),
            kind,
            parent_connector: None,
            workspace: None,
            selected: false,
            is_default: false,
            breakpoint: false,
            corrupted: false,
            compile_errors: Vec::new(),
            position: Point::default(),
            derivation_to_def: def.derivatives.clone(),
            breakpoint_policy: def.breakpoint,
            derivatives: Vec::new(),
            original: None,
            last_original: None,
            last_replaced: None,
            view: None,
            callbacks: NodeCallbacks::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn def_id(&self) -> &NodeDefId {
        &self.def_id
    }

    /// Symbol name taken from the definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, NodeKind::Composite { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Text payload of a leaf node. `None` for composites.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { text } => Some(text),
            NodeKind::Composite { .. } => None,
        }
    }

    /// Sections of a composite node. Empty for leaves.
    pub fn sections(&self) -> &[Section] {
        match &self.kind {
            NodeKind::Composite { sections } => sections,
            NodeKind::Leaf { .. } => &[],
        }
    }

    pub fn parent_connector(&self) -> Option<ConnectorId> {
        self.parent_connector
    }

    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    pub fn state(&self) -> NodeState {
        if self.workspace.is_none() {
            NodeState::Deleted
        } else if self.parent_connector.is_none() {
            NodeState::Root
        } else {
            NodeState::Child
        }
    }

    pub fn is_root(&self) -> bool {
        self.state() == NodeState::Root
    }

    pub fn is_child(&self) -> bool {
        self.state() == NodeState::Child
    }

    pub fn is_deleted(&self) -> bool {
        self.state() == NodeState::Deleted
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this node fills a connector slot as its default occupant.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_breakpoint_set(&self) -> bool {
        self.breakpoint
    }

    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    pub fn compile_errors(&self) -> &[String] {
        &self.compile_errors
    }

    pub fn has_compile_error(&self) -> bool {
        !self.compile_errors.is_empty()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn breakpoint_policy(&self) -> BreakpointPolicy {
        self.breakpoint_policy
    }

    /// Derivatives spawned from this node, in registration order.
    pub fn derivatives(&self) -> &[NodeId] {
        &self.derivatives
    }

    pub fn original(&self) -> Option<NodeId> {
        self.original
    }

    pub fn is_derivative(&self) -> bool {
        self.original.is_some()
    }

    /// The node that most recently served as this node's original.
    pub fn last_original(&self) -> Option<NodeId> {
        self.last_original
    }

    /// The node that most recently took this node's place.
    pub fn last_replaced(&self) -> Option<NodeId> {
        self.last_replaced
    }

    pub fn derivative_def_of(&self, derivation: &DerivationId) -> Option<&NodeDefId> {
        self.derivation_to_def.get(derivation)
    }

    pub fn has_derivative_of(&self, derivation: &DerivationId) -> bool {
        self.derivation_to_def.contains_key(derivation)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("def_id", &self.def_id)
            .field("state", &self.state())
            .field("parent_connector", &self.parent_connector)
            .field("workspace", &self.workspace)
            .field("selected", &self.selected)
            .field("default", &self.is_default)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Marks `node` selected. Does nothing when it already is, so the event
    /// fires at most once per transition.
    pub fn select(&mut self, node: NodeId, op: &mut UserOperation) {
        if self.node(node).selected {
            return;
        }
        self.node_mut(node).selected = true;
        op.push(SubOp::Deselect { node });
        self.dispatch_selection(SelectionEvent { node, selected: true }, op);
    }

    /// Clears the selection mark of `node`.
    pub fn deselect(&mut self, node: NodeId, op: &mut UserOperation) {
        if !self.node(node).selected {
            return;
        }
        self.node_mut(node).selected = false;
        op.push(SubOp::Select { node });
        self.dispatch_selection(SelectionEvent { node, selected: false }, op);
    }

    /// Sets or clears the breakpoint mark of `node`.
    pub fn set_breakpoint(&mut self, node: NodeId, value: bool, op: &mut UserOperation) {
        if self.node(node).breakpoint == value {
            return;
        }
        self.node_mut(node).breakpoint = value;
        op.push(SubOp::SetBreakpoint { node, value: !value });
        self.dispatch_breakpoint(BreakpointEvent { node, set: value }, op);
    }

    /// Walks from `node` towards the root and returns the node leading its
    /// breakpoint group, if the policies along the way name one.
    pub fn breakpoint_group_leader(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.node(id).breakpoint_policy() {
                BreakpointPolicy::Set => return Some(id),
                BreakpointPolicy::Ignore => return None,
                BreakpointPolicy::SpecifyParent => current = self.parent_node_of(id),
            }
        }
        None
    }

    pub fn is_breakpoint_group_leader(&self, node: NodeId) -> bool {
        self.node(node).breakpoint_policy() == BreakpointPolicy::Set
    }

    /// Recomputes the compile error messages of `node` through the hooks and
    /// returns whether it has any afterwards. Deleted nodes always come out
    /// clean. The event fires when the node had errors before or has errors
    /// now; the error state is derived, so it is not recorded for undo.
    pub fn check_compile_error(&mut self, node: NodeId, op: &mut UserOperation) -> bool {
        let had = self.node(node).has_compile_error();
        let messages = if self.node(node).is_deleted() {
            Vec::new()
        } else {
            self.hooks_handle().compile_errors(self, node)
        };
        self.node_mut(node).compile_errors = messages;
        let has = self.node(node).has_compile_error();
        if had || has {
            self.dispatch_compile_error(CompileErrorEvent { node, has_error: has }, op);
        }
        has
    }

    /// Marks `node` corrupted. The mark is diagnostic and permanent; it is
    /// neither undone nor cleared.
    pub fn mark_corrupted(&mut self, node: NodeId, op: &mut UserOperation) {
        if self.node(node).corrupted {
            return;
        }
        warn!(node = %node, def = %self.node(node).def_id(), "marking node corrupted");
        self.node_mut(node).corrupted = true;
        self.dispatch_corruption(CorruptionEvent { node }, op);
    }

    /// Stores `text` in the leaf node `node`. Assigning the current text is a
    /// no-op; assigning to a composite is ignored.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>, op: &mut UserOperation) {
        let text = text.into();
        let old = {
            let entry = self.node_mut(node);
            match &mut entry.kind {
                NodeKind::Leaf { text: current } => {
                    if *current == text {
                        return;
                    }
                    mem::replace(current, text.clone())
                }
                NodeKind::Composite { .. } => {
                    warn!(node = %node, "ignoring text assignment to a composite node");
                    return;
                }
            }
        };
        op.push(SubOp::SetText {
            node,
            text: old.clone(),
        });
        self.dispatch_text_change(
            TextChangeEvent {
                node,
                old_text: old,
                new_text: text,
            },
            op,
        );
    }

    /// Asks the hooks whether `text` may be stored in `node`.
    pub fn is_text_acceptable(&self, node: NodeId, text: &str) -> bool {
        self.hooks_handle().text_acceptable(self, node, text)
    }

    /// Runs `added` through the formatting hook and merges it with `current`.
    /// The hook may rewrite the addition or take over the whole payload.
    pub fn format_text(&self, node: NodeId, current: &str, added: &str) -> String {
        let result = self.hooks_handle().format_text(self, node, current, added);
        if result.whole {
            result.text
        } else {
            format!("{current}{}", result.text)
        }
    }

    /// Attaches an opaque presentation object to `node`. The model stores it
    /// untouched.
    pub fn set_view(&mut self, node: NodeId, view: Box<dyn Any>) {
        self.node_mut(node).view = Some(view);
    }

    pub fn view(&self, node: NodeId) -> Option<&dyn Any> {
        self.node(node).view.as_deref()
    }

    pub fn take_view(&mut self, node: NodeId) -> Option<Box<dyn Any>> {
        self.node_mut(node).view.take()
    }

    /// Moves `node` to `position` on its workspace plane.
    pub fn move_node(&mut self, node: NodeId, position: Point, op: &mut UserOperation) {
        let old = self.node(node).position;
        if old == position {
            return;
        }
        self.node_mut(node).position = position;
        op.push(SubOp::MoveNode { node, position: old });
    }

    pub(crate) fn set_last_replaced(&mut self, node: NodeId, target: Option<NodeId>, op: &mut UserOperation) {
        let old = self.node(node).last_replaced;
        self.node_mut(node).last_replaced = target;
        op.push(SubOp::SetLastReplaced { node, target: old });
    }

    /// A node can be pulled off its parent when it is neither fixed in place
    /// nor a default occupant. Roots are never removable.
    pub fn is_removable(&self, node: NodeId) -> bool {
        let entry = self.node(node);
        match entry.parent_connector {
            None => false,
            Some(connector) => !entry.is_default() && !self.connector(connector).is_fixed(),
        }
    }

    /// Removable, or a root that can travel as a whole.
    pub fn is_movable(&self, node: NodeId) -> bool {
        self.is_removable(node) || self.node(node).is_root()
    }

    /// Whether `replacement` may take the place of `node`.
    pub fn can_be_replaced_with(&self, node: NodeId, replacement: NodeId) -> bool {
        let Some(connector) = self.node(node).parent_connector else {
            return false;
        };
        if !self.node(node).is_child() {
            return false;
        }
        if !self.node(self.root_of(node)).is_root() {
            return false;
        }
        // nodes of one tree cannot swap with each other
        if self.is_descendant_of(replacement, node) || self.is_descendant_of(node, replacement) {
            return false;
        }
        self.can_connect(connector, replacement)
    }

    /// Puts `new` where `old` sits and lets the derivative trees follow.
    ///
    /// The first returned pair is `old` and `new` themselves; the remaining
    /// pairs are derivative exchanges triggered by the swap. Replacing a root
    /// or a node with itself does nothing and returns no pairs.
    pub fn replace(&mut self, old: NodeId, new: NodeId, op: &mut UserOperation) -> Vec<Swapped> {
        let Some(connector) = self.node(old).parent_connector else {
            return Vec::new();
        };
        if old == new {
            return Vec::new();
        }
        debug!(%old, %new, "replacing node");
        let mut swapped = vec![Swapped { old, new }];
        if self.node(new).is_child() {
            // detaching new from its own slot swaps a default in over there;
            // that pair is new's own business and stays out of the result
            let mut chain = self.remove(new, op);
            if !chain.is_empty() {
                chain.remove(0);
            }
            swapped.extend(chain);
        }
        self.set_last_replaced(old, Some(new), op);
        self.connect(connector, new, op);
        swapped.extend(self.displace_derivatives(new, old, op));
        swapped
    }

    /// Detaches `node` from its parent and fills the slot with a default
    /// node built by [`Project::create_default_node`]. Does nothing for roots
    /// and detached nodes.
    pub fn remove(&mut self, node: NodeId, op: &mut UserOperation) -> Vec<Swapped> {
        let Some(connector) = self.node(node).parent_connector else {
            return Vec::new();
        };
        let substitute = self.create_default_node(connector, op);
        self.replace(node, substitute, op)
    }

    /// Deletes the tree below `node` together with every derivative spawned
    /// from it. Returns the swap pairs produced along the way; for a child
    /// node the first pair is the node and the default that took its slot.
    pub fn delete_node_tree(&mut self, node: NodeId, op: &mut UserOperation) -> Vec<Swapped> {
        if self.node(node).is_deleted() {
            return Vec::new();
        }
        debug!(%node, "deleting node tree");
        let mut derivatives = Vec::new();
        for n in self.subtree(node) {
            derivatives.extend(self.node(n).derivatives().iter().copied());
        }
        let mut swapped = if self.node(node).is_child() {
            self.remove(node, op)
        } else {
            Vec::new()
        };
        self.strip_derivative_links(node, op);
        if let Some(ws) = self.node(node).workspace() {
            self.remove_node_tree(ws, node, op);
        }
        for derivative in derivatives {
            swapped.extend(self.delete_node_tree(derivative, op));
        }
        swapped
    }
}
