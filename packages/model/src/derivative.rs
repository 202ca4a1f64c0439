//! Derivative nodes: linked clones that shadow an original node.
//!
//! An original carries the list of its derivatives; each derivative points
//! back through `original`. Both sides live in the project tables, so the
//! links survive deletion and undo. Building walks the original tree and
//! wires joint-matched slots; displacement keeps the derivative trees in step
//! when an original is replaced.

use crate::error::ModelError;
use crate::event::OriginalChangeEvent;
use crate::history::{SubOp, UserOperation};
use crate::id::{ConnectorId, DerivationId, JointId, NodeId};
use crate::node::Swapped;
use crate::project::Project;
use std::collections::HashSet;
use tracing::debug;

impl Project {
    /// Registers `derivative` as a derivative of `original` and points it
    /// back. Does nothing when the link already exists.
    pub fn add_derivative(&mut self, original: NodeId, derivative: NodeId, op: &mut UserOperation) {
        if self.node(original).derivatives.contains(&derivative) {
            return;
        }
        self.node_mut(original).derivatives.push(derivative);
        self.set_original(derivative, Some(original), op);
        op.push(SubOp::RemoveDerivative {
            original,
            derivative,
        });
    }

    /// Unlinks `derivative` from `original` on both sides. Does nothing when
    /// no such link exists.
    pub fn remove_derivative(&mut self, original: NodeId, derivative: NodeId, op: &mut UserOperation) {
        let list = &mut self.node_mut(original).derivatives;
        let Some(index) = list.iter().position(|d| *d == derivative) else {
            return;
        };
        list.remove(index);
        self.set_original(derivative, None, op);
        op.push(SubOp::AddDerivative {
            original,
            derivative,
        });
    }

    /// Rewrites the back pointer of a derivative. `last_original` keeps the
    /// most recent original as a breadcrumb and never goes back to `None`.
    pub(crate) fn set_original(&mut self, node: NodeId, original: Option<NodeId>, op: &mut UserOperation) {
        let old = self.node(node).original;
        if old == original {
            return;
        }
        let entry = self.node_mut(node);
        entry.original = original;
        if original.is_some() {
            entry.last_original = original;
        }
        self.dispatch_original_change(
            OriginalChangeEvent {
                node,
                old_original: old,
                new_original: original,
            },
            op,
        );
    }

    /// Instantiates the derivative `node` declares for `derivation` and links
    /// it. The caller places the result; it starts detached.
    ///
    /// A derivative template whose shape differs from the original is a
    /// template bug; the created node is marked corrupted and returned anyway.
    pub fn create_derivative(
        &mut self,
        node: NodeId,
        derivation: &DerivationId,
        op: &mut UserOperation,
    ) -> Result<NodeId, ModelError> {
        let Some(def) = self.node(node).derivative_def_of(derivation).cloned() else {
            return Err(ModelError::NoDerivation {
                node,
                derivation: derivation.clone(),
            });
        };
        let created = self.instantiate_registered(&def);
        if self.node(created).is_leaf() != self.node(node).is_leaf() {
            self.mark_corrupted(created, op);
        }
        self.add_derivative(node, created, op);
        Ok(created)
    }

    /// The connector directly under `parent` declaring `joint`.
    pub fn find_joint_connector(&self, parent: NodeId, joint: &JointId) -> Option<ConnectorId> {
        self.connectors_of(parent)
            .into_iter()
            .find(|&c| self.connector(c).joint_id() == Some(joint))
    }

    /// Builds the whole derivative tree of `original` for `derivation`.
    ///
    /// The root derivative is created first; then every descendant of the
    /// original that declares a derivative for its inherited derivation id is
    /// mirrored into the joint-matched slot of its parent's derivative,
    /// recursively. Descendants without a derivative stop the walk below
    /// them.
    pub fn build_derivative(
        &mut self,
        original: NodeId,
        derivation: &DerivationId,
        op: &mut UserOperation,
    ) -> Result<NodeId, ModelError> {
        let root = self.create_derivative(original, derivation, op)?;
        debug!(%original, derivative = %root, %derivation, "built derivative tree");
        self.attach_descendant_derivatives(original, root, op);
        Ok(root)
    }

    fn attach_descendant_derivatives(
        &mut self,
        original: NodeId,
        derivative_parent: NodeId,
        op: &mut UserOperation,
    ) {
        for child in self.child_nodes(original) {
            let Some(derivation) = self.find_derivation_id_up(child) else {
                continue;
            };
            if !self.node(child).has_derivative_of(&derivation) {
                continue;
            }
            let Some(connector) = self.node(child).parent_connector() else {
                continue;
            };
            let Some(joint) = self.connector(connector).joint_id().cloned() else {
                continue;
            };
            let Some(target) = self.find_joint_connector(derivative_parent, &joint) else {
                continue;
            };
            let occupant = self.connector(target).connected();
            let Ok(built) = self.create_derivative(child, &derivation, op) else {
                continue;
            };
            self.replace(occupant, built, op);
            self.attach_descendant_derivatives(child, built, op);
        }
    }

    /// Keeps derivative trees in step after `new` took `old`'s slot.
    ///
    /// Looks at the derivatives of `new`'s parent node. When `new` declares a
    /// derivative for its inherited derivation id, the joint-matched child of
    /// each parent derivative is replaced with a freshly built derivative of
    /// `new`; otherwise such children are removed when they derive from
    /// `old`.
    pub(crate) fn displace_derivatives(
        &mut self,
        new: NodeId,
        old: NodeId,
        op: &mut UserOperation,
    ) -> Vec<Swapped> {
        let Some(connector) = self.node(new).parent_connector() else {
            return Vec::new();
        };
        let Some(joint) = self.connector(connector).joint_id().cloned() else {
            return Vec::new();
        };
        let parent = self.connector(connector).parent_node();
        let parent_derivatives = self.node(parent).derivatives().to_vec();
        if parent_derivatives.is_empty() {
            return Vec::new();
        }
        let derivation = self.find_derivation_id_up(new);
        let mut swapped = Vec::new();
        match derivation {
            Some(derivation) if self.node(new).has_derivative_of(&derivation) => {
                for p in parent_derivatives {
                    let Some(target) = self.find_joint_connector(p, &joint) else {
                        continue;
                    };
                    let occupant = self.connector(target).connected();
                    if self.node(occupant).is_deleted() {
                        continue;
                    }
                    debug!(%new, displaced = %occupant, "displacing derivative");
                    let Ok(built) = self.build_derivative(new, &derivation, op) else {
                        continue;
                    };
                    swapped.extend(self.replace(occupant, built, op));
                }
            }
            _ => {
                for p in parent_derivatives {
                    let Some(target) = self.find_joint_connector(p, &joint) else {
                        continue;
                    };
                    let occupant = self.connector(target).connected();
                    if self.node(occupant).is_deleted() {
                        continue;
                    }
                    if self.node(occupant).original() == Some(old) {
                        swapped.extend(self.remove(occupant, op));
                    }
                }
            }
        }
        swapped
    }

    /// Copies the text of `node` into every transitive derivative.
    pub fn assign_contents_to_derivatives(&mut self, node: NodeId, op: &mut UserOperation) {
        let Some(text) = self.node(node).text().map(str::to_string) else {
            return;
        };
        let mut queue = self.node(node).derivatives().to_vec();
        let mut seen = HashSet::new();
        while let Some(derivative) = queue.pop() {
            if !seen.insert(derivative) {
                continue;
            }
            self.set_text(derivative, text.clone(), op);
            queue.extend(self.node(derivative).derivatives().iter().copied());
        }
    }

    /// Detaches every node in the tree under `root` from its original, for
    /// copies and snapshots that must not act as derivatives.
    pub(crate) fn strip_derivative_links(&mut self, root: NodeId, op: &mut UserOperation) {
        for n in self.subtree(root) {
            if let Some(original) = self.node(n).original() {
                self.remove_derivative(original, n, op);
            }
        }
    }
}
