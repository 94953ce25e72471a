//! # Quarry Editor
//!
//! Undoable editing of a level map.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: scene graph, attributes, brushes     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: document + commands + history       │
//! │  - MapDocument wraps the map, validates     │
//! │    edits and fires notifications            │
//! │  - Commands hold a weak document reference  │
//! │  - CommandProcessor: undo/redo, collation,  │
//! │    groups, repeat                           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ issues: validation driven by notifications  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Commands are the only interactive writers**: everything they do can be undone
//! 2. **Failed commands change nothing**: validation happens before mutation
//! 3. **Commands never own the document**: they hold `Weak` references
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quarry_editor::{EditSession, EditorConfig, MapDocument, ResizeBrushesCommand};
//!
//! let config = EditorConfig::load(".")?;
//! let document = MapDocument::new(&config).into_handle();
//! let mut session = EditSession::new("local", document.clone(), &config);
//!
//! session.execute(ResizeBrushesCommand::resize_brushes(&document, faces, delta, true))?;
//! session.undo()?;
//! ```

mod command;
mod command_processor;
mod commands;
mod config;
mod document;
mod errors;
mod notifier;
mod session;

pub use command::{lock_document, Command, CommandKind};
pub use command_processor::{CommandBatch, CommandOutcome, CommandProcessor};
pub use commands::{
    AddRemoveNodesCommand, EntityAttributeCommand, MoveObjectsCommand, ResizeBrushesCommand,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::{
    AttributeChange, DocumentHandle, DocumentRef, MapDocument, Placement, Snapshot,
};
pub use errors::CommandError;
pub use notifier::{CommandNotification, DocumentNotifiers, NodeSet, Notifier, ObserverId};
pub use session::EditSession;
