//! # Tangram Editor
//!
//! Structural editing engine over the tangram model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: nodes, connectors, workspaces        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: editing flows + history             │
//! │  - Place, replace, exchange, delete trees   │
//! │  - Filter batch deletions through hooks     │
//! │  - Undo/redo over recorded operations       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The model owns structure**: flows compose `Project` mutators and
//!    never reach into node internals
//! 2. **One operation per gesture**: each flow records into a single
//!    `UserOperation`, so it reverts as one undo level
//! 3. **Inverses replay forward**: undo runs the same mutators as the
//!    original edit, keeping listeners and indexes consistent both ways
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tangram_editor::EditSession;
//! use tangram_model::{DeletionCause, Point};
//!
//! let mut session = EditSession::new(project);
//!
//! // Every edit closure commits as one undo level
//! let ws = session.edit(|p, op| p.add_workspace("main", op));
//! let node = session.place_new_node(&"print-stmt".into(), ws, Point::new(40.0, 40.0))?;
//!
//! session.undo();
//! session.redo();
//! ```

mod error;
pub mod placer;
mod session;
mod undo;

pub use error::EditError;
pub use session::EditSession;
pub use undo::{StackChangedEvent, UndoRedoAgent};

// Re-export the model types that appear in this crate's signatures
pub use tangram_model::{DeletionCause, Point, Project, Swapped, UserOperation};
