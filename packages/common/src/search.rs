use tangram_model::{NodeDefId, NodeId, Project, WorkspaceId};

/// Visitor pattern for traversing node trees immutably
///
/// This trait provides default implementations that walk an entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait NodeVisitor: Sized {
    fn visit_node(&mut self, project: &Project, node: NodeId) {
        walk_node(self, project, node);
    }

    fn visit_composite(&mut self, project: &Project, node: NodeId) {
        walk_children(self, project, node);
    }

    fn visit_leaf(&mut self, _project: &Project, _node: NodeId) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations

pub fn walk_node<V: NodeVisitor>(visitor: &mut V, project: &Project, node: NodeId) {
    if project.node(node).is_leaf() {
        visitor.visit_leaf(project, node);
    } else {
        visitor.visit_composite(project, node);
    }
}

pub fn walk_children<V: NodeVisitor>(visitor: &mut V, project: &Project, node: NodeId) {
    for child in project.child_nodes(node) {
        visitor.visit_node(project, child);
    }
}

/// Walks every root tree of `workspace`.
pub fn walk_workspace<V: NodeVisitor>(
    visitor: &mut V,
    project: &Project,
    workspace: WorkspaceId,
) {
    for &root in project.workspace(workspace).roots() {
        visitor.visit_node(project, root);
    }
}

/// Walks every root tree of every listed workspace.
pub fn walk_project<V: NodeVisitor>(visitor: &mut V, project: &Project) {
    for &workspace in project.workspace_ids() {
        walk_workspace(visitor, project, workspace);
    }
}

struct DefFinder<'a> {
    def: &'a NodeDefId,
    found: Vec<NodeId>,
}

impl NodeVisitor for DefFinder<'_> {
    fn visit_node(&mut self, project: &Project, node: NodeId) {
        if project.node(node).def_id() == self.def {
            self.found.push(node);
        }
        walk_node(self, project, node);
    }
}

/// Collects the nodes at or below `root` built from `def`, in tree order.
pub fn find_by_def(project: &Project, root: NodeId, def: &NodeDefId) -> Vec<NodeId> {
    let mut finder = DefFinder {
        def,
        found: Vec::new(),
    };
    finder.visit_node(project, root);
    finder.found
}

struct TextFinder<'a> {
    text: &'a str,
    found: Option<NodeId>,
}

impl NodeVisitor for TextFinder<'_> {
    fn visit_leaf(&mut self, project: &Project, node: NodeId) {
        if self.found.is_none() && project.node(node).text() == Some(self.text) {
            self.found = Some(node);
        }
    }
}

/// First leaf at or below `root` whose text equals `text`, in tree order.
pub fn find_by_text(project: &Project, root: NodeId, text: &str) -> Option<NodeId> {
    let mut finder = TextFinder { text, found: None };
    finder.visit_node(project, root);
    finder.found
}
