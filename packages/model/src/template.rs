use crate::error::TemplateError;
use crate::id::{ConnectorDefId, DerivationId, JointId, NodeDefId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// How a node participates in breakpoint grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakpointPolicy {
    /// The node leads its own breakpoint group.
    Set,
    /// The node belongs to no breakpoint group.
    Ignore,
    /// The node belongs to the group of its parent node.
    SpecifyParent,
}

impl Default for BreakpointPolicy {
    fn default() -> Self {
        BreakpointPolicy::SpecifyParent
    }
}

/// Template for the connectors grouped under one named section of a composite
/// node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDef {
    pub name: String,
    pub connectors: Vec<ConnectorDefId>,
}

/// Shape of a node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeDefBody {
    /// An inner node whose children hang off the connectors of its sections.
    Composite { sections: Vec<SectionDef> },
    /// A terminal node holding a text payload.
    Leaf {
        #[serde(default)]
        text: String,
    },
}

/// Template from which node instances are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: NodeDefId,
    pub name: String,
    pub body: NodeDefBody,
    /// Definitions of the derivatives this node can spawn, keyed by
    /// derivation id.
    #[serde(default)]
    pub derivatives: HashMap<DerivationId, NodeDefId>,
    #[serde(default)]
    pub breakpoint: BreakpointPolicy,
}

/// Template from which connector instances are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDef {
    pub id: ConnectorDefId,
    pub name: String,
    /// Definition instantiated to fill the connector when nothing else is
    /// connected.
    pub default_node: NodeDefId,
    #[serde(default)]
    pub fixed: bool,
    /// When true, removing the occupant restores the most recent non-default
    /// occupant instead of a fresh default node.
    #[serde(default)]
    pub restore_last_default: bool,
    #[serde(default)]
    pub derivation: Option<DerivationId>,
    #[serde(default)]
    pub joint: Option<JointId>,
}

/// Registry of node and connector definitions.
///
/// A registry is assembled once, validated, and then handed to a
/// [`Project`](crate::project::Project). Validation checks every cross
/// reference so instantiation never has to cope with dangling definition ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSet {
    nodes: HashMap<NodeDefId, NodeDef>,
    connectors: HashMap<ConnectorDefId, ConnectorDef>,
}

impl TemplateSet {
    pub fn new() -> Self {
        TemplateSet::default()
    }

    /// Parses a registry from its JSON form and validates it.
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            nodes: Vec<NodeDef>,
            #[serde(default)]
            connectors: Vec<ConnectorDef>,
        }
        let raw: Raw = serde_json::from_str(text)?;
        let mut set = TemplateSet::new();
        for def in raw.nodes {
            set.add_node(def);
        }
        for def in raw.connectors {
            set.add_connector(def);
        }
        if let Err(err) = set.validate() {
            warn!(%err, "rejecting template registry");
            return Err(err);
        }
        Ok(set)
    }

    /// Registers a node definition. A later definition with the same id wins.
    pub fn add_node(&mut self, def: NodeDef) {
        self.nodes.insert(def.id.clone(), def);
    }

    /// Registers a connector definition. A later definition with the same id
    /// wins.
    pub fn add_connector(&mut self, def: ConnectorDef) {
        self.connectors.insert(def.id.clone(), def);
    }

    pub fn node(&self, id: &NodeDefId) -> Option<&NodeDef> {
        self.nodes.get(id)
    }

    pub fn connector(&self, id: &ConnectorDefId) -> Option<&ConnectorDef> {
        self.connectors.get(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeDefId> {
        self.nodes.keys()
    }

    /// Checks every cross reference between definitions and rejects default
    /// node chains that would recurse forever during instantiation.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for def in self.nodes.values() {
            if let NodeDefBody::Composite { sections } = &def.body {
                let count: usize = sections.iter().map(|s| s.connectors.len()).sum();
                if count == 0 {
                    return Err(TemplateError::EmptyComposite {
                        node: def.id.clone(),
                    });
                }
                for section in sections {
                    for cid in &section.connectors {
                        if !self.connectors.contains_key(cid) {
                            return Err(TemplateError::UnknownConnector {
                                node: def.id.clone(),
                                connector: cid.clone(),
                            });
                        }
                    }
                }
            }
            for (derivation, target) in &def.derivatives {
                if !self.nodes.contains_key(target) {
                    return Err(TemplateError::UnknownDerivative {
                        node: def.id.clone(),
                        derivation: derivation.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        for def in self.connectors.values() {
            if !self.nodes.contains_key(&def.default_node) {
                return Err(TemplateError::UnknownDefaultNode {
                    connector: def.id.clone(),
                    node: def.default_node.clone(),
                });
            }
        }
        for id in self.nodes.keys() {
            self.check_default_cycle(id)?;
        }
        Ok(())
    }

    /// Walks the default node graph below `start` and fails when `start` is
    /// reachable from itself.
    fn check_default_cycle(&self, start: &NodeDefId) -> Result<(), TemplateError> {
        let mut visited = HashSet::new();
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let def = &self.nodes[&id];
            if let NodeDefBody::Composite { sections } = &def.body {
                for section in sections {
                    for cid in &section.connectors {
                        let next = &self.connectors[cid].default_node;
                        if next == start {
                            return Err(TemplateError::DefaultCycle {
                                start: start.clone(),
                            });
                        }
                        stack.push(next.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> NodeDef {
        NodeDef {
            id: NodeDefId::from(id),
            name: id.to_string(),
            body: NodeDefBody::Leaf {
                text: String::new(),
            },
            derivatives: HashMap::new(),
            breakpoint: BreakpointPolicy::default(),
        }
    }

    fn composite(id: &str, connectors: &[&str]) -> NodeDef {
        NodeDef {
            id: NodeDefId::from(id),
            name: id.to_string(),
            body: NodeDefBody::Composite {
                sections: vec![SectionDef {
                    name: "base".to_string(),
                    connectors: connectors.iter().map(|c| ConnectorDefId::from(*c)).collect(),
                }],
            },
            derivatives: HashMap::new(),
            breakpoint: BreakpointPolicy::default(),
        }
    }

    fn connector(id: &str, default_node: &str) -> ConnectorDef {
        ConnectorDef {
            id: ConnectorDefId::from(id),
            name: id.to_string(),
            default_node: NodeDefId::from(default_node),
            fixed: false,
            restore_last_default: false,
            derivation: None,
            joint: None,
        }
    }

    #[test]
    fn valid_registry_passes_validation() {
        let mut set = TemplateSet::new();
        set.add_node(leaf("void-expr"));
        set.add_node(composite("add-expr", &["c-left", "c-right"]));
        set.add_connector(connector("c-left", "void-expr"));
        set.add_connector(connector("c-right", "void-expr"));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn missing_connector_definition_is_rejected() {
        let mut set = TemplateSet::new();
        set.add_node(composite("add-expr", &["c-left"]));
        let err = set.validate().unwrap_err();
        assert!(matches!(err, TemplateError::UnknownConnector { .. }));
    }

    #[test]
    fn missing_default_node_is_rejected() {
        let mut set = TemplateSet::new();
        set.add_node(composite("add-expr", &["c-left"]));
        set.add_connector(connector("c-left", "void-expr"));
        let err = set.validate().unwrap_err();
        assert!(matches!(err, TemplateError::UnknownDefaultNode { .. }));
    }

    #[test]
    fn default_node_cycle_is_rejected() {
        let mut set = TemplateSet::new();
        set.add_node(composite("list", &["c-next"]));
        set.add_connector(connector("c-next", "list"));
        let err = set.validate().unwrap_err();
        assert!(matches!(err, TemplateError::DefaultCycle { .. }));
    }

    #[test]
    fn unknown_derivative_target_is_rejected() {
        let mut def = leaf("name-lit");
        def.derivatives
            .insert(DerivationId::from("name-link"), NodeDefId::from("name-ref"));
        let mut set = TemplateSet::new();
        set.add_node(def);
        let err = set.validate().unwrap_err();
        assert!(matches!(err, TemplateError::UnknownDerivative { .. }));
    }

    #[test]
    fn composite_without_connectors_is_rejected() {
        let mut set = TemplateSet::new();
        set.add_node(composite("empty", &[]));
        let err = set.validate().unwrap_err();
        assert!(matches!(err, TemplateError::EmptyComposite { .. }));
    }

    #[test]
    fn registry_round_trips_through_json() -> anyhow::Result<()> {
        let text = r#"{
            "nodes": [
                {"id": "void-expr", "name": "void", "body": {"type": "leaf"}},
                {
                    "id": "add-expr",
                    "name": "add",
                    "body": {
                        "type": "composite",
                        "sections": [{"name": "operands", "connectors": ["c-left"]}]
                    },
                    "breakpoint": "set"
                }
            ],
            "connectors": [
                {"id": "c-left", "name": "left", "default_node": "void-expr"}
            ]
        }"#;
        let set = TemplateSet::from_json(text)?;
        let add = set.node(&NodeDefId::from("add-expr")).unwrap();
        assert_eq!(add.breakpoint, BreakpointPolicy::Set);
        let left = set.connector(&ConnectorDefId::from("c-left")).unwrap();
        assert!(!left.fixed);
        assert_eq!(left.default_node, NodeDefId::from("void-expr"));
        Ok(())
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = TemplateSet::from_json("{").unwrap_err();
        assert!(matches!(err, TemplateError::Json(_)));
    }
}
