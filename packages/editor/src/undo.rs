//! # Undo/Redo Agent
//!
//! Tracks committed operations and replays their inverses.
//!
//! ## Design
//!
//! - Every mutation records its inverse into the current [`UserOperation`]
//! - Committing pushes the whole operation as one undo level
//! - Undo replays the inverses through the ordinary mutators, which records
//!   the matching redo operation as a side effect
//! - New commits clear the redo stack

use std::fmt;
use tangram_model::{Project, UserOperation};

/// Sizes of both stacks after a change, for menu and toolbar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackChangedEvent {
    pub undo_count: usize,
    pub redo_count: usize,
}

/// Operation history of one project.
pub struct UndoRedoAgent {
    /// Committed operations, most recent last.
    undo_stack: Vec<UserOperation>,

    /// Undone operations, most recent last.
    redo_stack: Vec<UserOperation>,

    /// Maximum number of undo levels (0 = unlimited).
    max_depth: usize,

    listeners: Vec<Box<dyn FnMut(StackChangedEvent)>>,
}

impl UndoRedoAgent {
    /// Create an agent with the default depth (128 levels).
    pub fn new() -> Self {
        Self::with_depth(128)
    }

    /// Create an agent with a custom depth.
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            listeners: Vec::new(),
        }
    }

    /// Push a finished operation onto the undo stack and invalidate any redo
    /// history. Empty operations are dropped so no-op edits never occupy an
    /// undo level.
    pub fn commit(&mut self, project: &mut Project, op: UserOperation) {
        if op.is_empty() {
            return;
        }
        self.undo_stack.push(op);
        if self.max_depth > 0 && self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        project.set_dirty();
        self.notify();
    }

    /// Revert the most recent operation. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self, project: &mut Project) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        let redo = op.invert_and_replay(project);
        self.redo_stack.push(redo);
        self.notify();
        true
    }

    /// Reapply the most recently undone operation. Returns false when there
    /// is nothing to redo.
    pub fn redo(&mut self, project: &mut Project) -> bool {
        let Some(op) = self.redo_stack.pop() else {
            return false;
        };
        let undo = op.invert_and_replay(project);
        self.undo_stack.push(undo);
        self.notify();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history, for example after loading a project from disk.
    pub fn clear(&mut self) {
        if self.undo_stack.is_empty() && self.redo_stack.is_empty() {
            return;
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    /// Observe stack size changes.
    pub fn on_stack_changed(&mut self, f: impl FnMut(StackChangedEvent) + 'static) {
        self.listeners.push(Box::new(f));
    }

    fn notify(&mut self) {
        let event = StackChangedEvent {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
        };
        for f in self.listeners.iter_mut() {
            f(event);
        }
    }
}

impl Default for UndoRedoAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UndoRedoAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoAgent")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tangram_model::{Project, TemplateSet, UserOperation};

    const GRAMMAR: &str = r#"{
        "nodes": [{"id": "word", "name": "word", "body": {"type": "leaf"}}]
    }"#;

    fn project_with_word() -> (Project, tangram_model::NodeId) {
        let templates = TemplateSet::from_json(GRAMMAR).unwrap();
        let mut project = Project::new(templates).unwrap();
        let mut op = UserOperation::new();
        let ws = project.add_workspace("main", &mut op);
        let word = project.instantiate(&"word".into()).unwrap();
        project.add_node_tree(ws, word, &mut op);
        (project, word)
    }

    #[test]
    fn empty_operations_never_take_an_undo_level() {
        let (mut project, _) = project_with_word();
        let mut agent = UndoRedoAgent::new();
        project.clear_dirty();

        agent.commit(&mut project, UserOperation::new());
        assert!(!agent.can_undo());
        assert!(!project.is_dirty());
    }

    #[test]
    fn undo_moves_the_operation_to_the_redo_stack() {
        let (mut project, word) = project_with_word();
        let mut agent = UndoRedoAgent::new();

        let mut op = UserOperation::new();
        project.set_text(word, "hello", &mut op);
        agent.commit(&mut project, op);
        assert_eq!((agent.undo_count(), agent.redo_count()), (1, 0));

        assert!(agent.undo(&mut project));
        assert_eq!(project.node(word).text(), Some(""));
        assert_eq!((agent.undo_count(), agent.redo_count()), (0, 1));

        assert!(agent.redo(&mut project));
        assert_eq!(project.node(word).text(), Some("hello"));
        assert_eq!((agent.undo_count(), agent.redo_count()), (1, 0));

        assert!(!agent.redo(&mut project));
    }

    #[test]
    fn new_commits_clear_the_redo_stack() {
        let (mut project, word) = project_with_word();
        let mut agent = UndoRedoAgent::new();

        let mut op = UserOperation::new();
        project.set_text(word, "first", &mut op);
        agent.commit(&mut project, op);
        agent.undo(&mut project);
        assert!(agent.can_redo());

        let mut op = UserOperation::new();
        project.set_text(word, "second", &mut op);
        agent.commit(&mut project, op);
        assert!(!agent.can_redo());
    }

    #[test]
    fn depth_evicts_the_oldest_level() {
        let (mut project, word) = project_with_word();
        let mut agent = UndoRedoAgent::with_depth(2);

        for text in ["a", "b", "c"] {
            let mut op = UserOperation::new();
            project.set_text(word, text, &mut op);
            agent.commit(&mut project, op);
        }
        assert_eq!(agent.undo_count(), 2);

        assert!(agent.undo(&mut project));
        assert!(agent.undo(&mut project));
        assert!(!agent.undo(&mut project));
        // the oldest level was evicted, so the first edit sticks
        assert_eq!(project.node(word).text(), Some("a"));
    }

    #[test]
    fn listeners_hear_every_stack_change() {
        let (mut project, word) = project_with_word();
        let mut agent = UndoRedoAgent::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        agent.on_stack_changed(move |e| sink.borrow_mut().push((e.undo_count, e.redo_count)));

        let mut op = UserOperation::new();
        project.set_text(word, "x", &mut op);
        agent.commit(&mut project, op);
        agent.undo(&mut project);
        agent.redo(&mut project);
        agent.clear();
        assert_eq!(*log.borrow(), vec![(1, 0), (0, 1), (1, 0), (0, 0)]);

        // clearing an already empty agent stays silent
        agent.clear();
        assert_eq!(log.borrow().len(), 4);
    }
}
