//! Central store owning every node, connector, and workspace.
//!
//! All structure is id based. Objects refer to each other through ids and the
//! project resolves them, so there are no reference cycles to manage and any
//! object can be reached from anywhere. Ids are never reused and entries are
//! never evicted while the project lives; a deleted node simply has no
//! workspace and is unreachable from the live trees, which keeps undo free to
//! resurrect it.

use crate::connector::Connector;
use crate::error::{ModelError, TemplateError};
use crate::event::{ConnectorCallbacks, NodeCallbacks, ProjectCallbacks, WorkspaceCallbacks};
use crate::history::UserOperation;
use crate::hooks::{NodeHooks, NullHooks};
use crate::id::{ConnectorId, NodeDefId, NodeId, WorkspaceId};
use crate::node::{Node, NodeKind};
use crate::section::Section;
use crate::template::{NodeDefBody, TemplateSet};
use crate::workspace::Workspace;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

pub struct Project {
    templates: TemplateSet,
    hooks: Rc<dyn NodeHooks>,
    nodes: HashMap<NodeId, Node>,
    connectors: HashMap<ConnectorId, Connector>,
    workspaces: HashMap<WorkspaceId, Workspace>,
    /// Workspaces currently part of the project, in insertion order.
    pub(crate) workspace_order: Vec<WorkspaceId>,
    pub(crate) current_workspace: Option<WorkspaceId>,
    pub(crate) copy_list: Vec<NodeId>,
    pub(crate) cut_list: Vec<NodeId>,
    pub(crate) paste_counter: i32,
    pub(crate) callbacks: ProjectCallbacks,
    next_node: u64,
    next_connector: u64,
    next_workspace: u64,
    dirty: bool,
}

impl Project {
    /// Builds a project over `templates`. The registry is validated up front
    /// so instantiation never meets a dangling definition id.
    pub fn new(templates: TemplateSet) -> Result<Self, TemplateError> {
        Project::with_hooks(templates, Rc::new(NullHooks))
    }

    /// Like [`Project::new`] with application behavior injected through
    /// `hooks`.
    pub fn with_hooks(
        templates: TemplateSet,
        hooks: Rc<dyn NodeHooks>,
    ) -> Result<Self, TemplateError> {
        if let Err(err) = templates.validate() {
            warn!(%err, "rejecting template registry");
            return Err(err);
        }
        Ok(Project {
            templates,
            hooks,
            nodes: HashMap::new(),
            connectors: HashMap::new(),
            workspaces: HashMap::new(),
            workspace_order: Vec::new(),
            current_workspace: None,
            copy_list: Vec::new(),
            cut_list: Vec::new(),
            paste_counter: 0,
            callbacks: ProjectCallbacks::default(),
            next_node: 0,
            next_connector: 0,
            next_workspace: 0,
            dirty: false,
        })
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// A shared handle on the injected behavior hooks.
    pub fn hooks_handle(&self) -> Rc<dyn NodeHooks> {
        Rc::clone(&self.hooks)
    }

    /// The node with the given id.
    ///
    /// # Panics
    ///
    /// Panics when the id was not issued by this project. Ids are never
    /// evicted, so that is a caller bug rather than a race to tolerate.
    #[track_caller]
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("{id} does not belong to this project"),
        }
    }

    pub fn try_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[track_caller]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("{id} does not belong to this project"),
        }
    }

    #[track_caller]
    pub fn connector(&self, id: ConnectorId) -> &Connector {
        match self.connectors.get(&id) {
            Some(connector) => connector,
            None => panic!("{id} does not belong to this project"),
        }
    }

    pub fn try_connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    #[track_caller]
    pub(crate) fn connector_mut(&mut self, id: ConnectorId) -> &mut Connector {
        match self.connectors.get_mut(&id) {
            Some(connector) => connector,
            None => panic!("{id} does not belong to this project"),
        }
    }

    #[track_caller]
    pub fn workspace(&self, id: WorkspaceId) -> &Workspace {
        match self.workspaces.get(&id) {
            Some(workspace) => workspace,
            None => panic!("{id} does not belong to this project"),
        }
    }

    pub fn try_workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    #[track_caller]
    pub(crate) fn workspace_mut(&mut self, id: WorkspaceId) -> &mut Workspace {
        match self.workspaces.get_mut(&id) {
            Some(workspace) => workspace,
            None => panic!("{id} does not belong to this project"),
        }
    }

    pub(crate) fn insert_workspace(&mut self, workspace: Workspace) {
        self.workspaces.insert(workspace.id(), workspace);
    }

    pub(crate) fn register_node(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    pub(crate) fn register_connector(&mut self, connector: Connector) {
        self.connectors.insert(connector.id(), connector);
    }

    /// Every node id ever issued, live or deleted.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_callbacks_mut(&mut self, id: NodeId) -> &mut NodeCallbacks {
        &mut self.node_mut(id).callbacks
    }

    pub fn connector_callbacks_mut(&mut self, id: ConnectorId) -> &mut ConnectorCallbacks {
        &mut self.connector_mut(id).callbacks
    }

    pub fn workspace_callbacks_mut(&mut self, id: WorkspaceId) -> &mut WorkspaceCallbacks {
        &mut self.workspace_mut(id).callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut ProjectCallbacks {
        &mut self.callbacks
    }

    /// Builds a fresh tree from `def`, connectors filled with their default
    /// occupants all the way down. The tree belongs to no workspace yet.
    pub fn instantiate(&mut self, def: &NodeDefId) -> Result<NodeId, ModelError> {
        if self.templates.node(def).is_none() {
            return Err(ModelError::UnknownNodeDef(def.clone()));
        }
        let id = self.build_node(def);
        debug!(node = %id, %def, "instantiated node tree");
        Ok(id)
    }

    /// [`Project::instantiate`] for definition ids that validation already
    /// vouched for.
    #[track_caller]
    pub(crate) fn instantiate_registered(&mut self, def: &NodeDefId) -> NodeId {
        self.build_node(def)
    }

    /// Builds a tree from `def` and runs the template creation hook over it,
    /// for nodes handed out by a palette.
    pub fn instantiate_as_template(
        &mut self,
        def: &NodeDefId,
        op: &mut UserOperation,
    ) -> Result<NodeId, ModelError> {
        let id = self.instantiate(def)?;
        self.hooks_handle().on_created_as_template(self, id, op);
        Ok(id)
    }

    #[track_caller]
    fn build_node(&mut self, def_id: &NodeDefId) -> NodeId {
        let def = self
            .templates
            .node(def_id)
            .unwrap_or_else(|| panic!("node definition {def_id} is not registered"))
            .clone();
        let id = self.alloc_node_id();
        let kind = match &def.body {
            NodeDefBody::Leaf { text } => NodeKind::Leaf { text: text.clone() },
            NodeDefBody::Composite { sections } => {
                let mut built = Vec::with_capacity(sections.len());
                for section in sections {
                    let mut connectors = Vec::with_capacity(section.connectors.len());
                    for connector_def_id in &section.connectors {
                        let connector_def = self
                            .templates
                            .connector(connector_def_id)
                            .unwrap_or_else(|| {
                                panic!("connector definition {connector_def_id} is not registered")
                            })
                            .clone();
                        let child = self.build_node(&connector_def.default_node);
                        let connector_id = self.alloc_connector_id();
                        self.connectors.insert(
                            connector_id,
                            Connector::new(connector_id, &connector_def, id, child),
                        );
                        let entry = self.node_mut(child);
                        entry.parent_connector = Some(connector_id);
                        entry.is_default = true;
                        connectors.push(connector_id);
                    }
                    built.push(Section::new(section.name.clone(), connectors));
                }
                NodeKind::Composite { sections: built }
            }
        };
        self.nodes.insert(id, Node::new(id, &def, kind));
        id
    }

    pub(crate) fn alloc_node_id(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId::new(self.next_node)
    }

    pub(crate) fn alloc_connector_id(&mut self) -> ConnectorId {
        self.next_connector += 1;
        ConnectorId::new(self.next_connector)
    }

    pub(crate) fn alloc_workspace_id(&mut self) -> WorkspaceId {
        self.next_workspace += 1;
        WorkspaceId::new(self.next_workspace)
    }

    /// Whether the project changed since the flag was last cleared. Every
    /// event dispatch raises it.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Raises the change flag. Dispatch does this on every event; the undo
    /// agent does it when an operation is committed.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the change flag, typically right after a save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("nodes", &self.nodes.len())
            .field("connectors", &self.connectors.len())
            .field("workspaces", &self.workspace_order.len())
            .field("current_workspace", &self.current_workspace)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
