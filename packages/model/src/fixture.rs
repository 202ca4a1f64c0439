//! Shared template registry and project builders for the unit tests.
//!
//! The grammar is a miniature statement/expression language: literals and
//! void placeholders, an addition with a restoring left slot, a print
//! statement, a procedure declaration that spawns call derivatives, and a
//! guard with a fixed slot.

use crate::history::UserOperation;
use crate::hooks::NodeHooks;
use crate::id::WorkspaceId;
use crate::project::Project;
use crate::template::{
    BreakpointPolicy, ConnectorDef, NodeDef, NodeDefBody, SectionDef, TemplateSet,
};
use std::rc::Rc;

fn leaf(id: &str, text: &str) -> NodeDef {
    NodeDef {
        id: id.into(),
        name: id.into(),
        body: NodeDefBody::Leaf {
            text: text.to_string(),
        },
        derivatives: Default::default(),
        breakpoint: BreakpointPolicy::default(),
    }
}

fn composite(id: &str, section: &str, connectors: &[&str]) -> NodeDef {
    NodeDef {
        id: id.into(),
        name: id.into(),
        body: NodeDefBody::Composite {
            sections: vec![SectionDef {
                name: section.to_string(),
                connectors: connectors.iter().map(|c| (*c).into()).collect(),
            }],
        },
        derivatives: Default::default(),
        breakpoint: BreakpointPolicy::default(),
    }
}

fn connector(id: &str, default_node: &str) -> ConnectorDef {
    ConnectorDef {
        id: id.into(),
        name: id.into(),
        default_node: default_node.into(),
        fixed: false,
        restore_last_default: false,
        derivation: None,
        joint: None,
    }
}

pub(crate) fn demo_templates() -> TemplateSet {
    let mut set = TemplateSet::new();
    set.add_node(leaf("void-expr", ""));
    set.add_node(leaf("void-stmt", ""));
    set.add_node(leaf("int-lit", "0"));
    set.add_node(NodeDef {
        derivatives: [("name-link".into(), "name-ref".into())]
            .into_iter()
            .collect(),
        ..leaf("name-lit", "name")
    });
    set.add_node(leaf("name-ref", "name"));
    set.add_node(composite("add-expr", "operands", &["c-left", "c-right"]));
    set.add_node(composite("print-stmt", "body", &["c-arg", "c-next"]));
    set.add_node(NodeDef {
        derivatives: [("proc-link".into(), "proc-call".into())]
            .into_iter()
            .collect(),
        breakpoint: BreakpointPolicy::Set,
        ..composite("proc-decl", "header", &["c-name", "c-body"])
    });
    set.add_node(composite("proc-call", "call", &["cc-name", "cc-next"]));
    set.add_node(composite("guard-expr", "guard", &["c-fixed"]));

    set.add_connector(ConnectorDef {
        restore_last_default: true,
        ..connector("c-left", "void-expr")
    });
    set.add_connector(connector("c-right", "void-expr"));
    set.add_connector(connector("c-arg", "void-expr"));
    set.add_connector(connector("c-next", "void-stmt"));
    set.add_connector(ConnectorDef {
        derivation: Some("name-link".into()),
        joint: Some("j-name".into()),
        ..connector("c-name", "name-lit")
    });
    set.add_connector(ConnectorDef {
        joint: Some("j-body".into()),
        ..connector("c-body", "void-stmt")
    });
    set.add_connector(ConnectorDef {
        joint: Some("j-name".into()),
        ..connector("cc-name", "name-ref")
    });
    set.add_connector(connector("cc-next", "void-stmt"));
    set.add_connector(ConnectorDef {
        fixed: true,
        ..connector("c-fixed", "void-expr")
    });
    set
}

pub(crate) fn demo_project() -> Project {
    Project::new(demo_templates()).expect("demo templates validate")
}

pub(crate) fn project_with_workspace() -> (Project, WorkspaceId) {
    let mut project = demo_project();
    let mut op = UserOperation::new();
    let ws = project.add_workspace("main", &mut op);
    (project, ws)
}

pub(crate) fn project_with_workspace_and_hooks(hooks: Rc<dyn NodeHooks>) -> (Project, WorkspaceId) {
    let mut project =
        Project::with_hooks(demo_templates(), hooks).expect("demo templates validate");
    let mut op = UserOperation::new();
    let ws = project.add_workspace("main", &mut op);
    (project, ws)
}
