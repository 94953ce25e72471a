//! Error types for the editor

use quarry_model::{ModelError, NodeId};
use thiserror::Error;

/// Recoverable command failures. The document is unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Document has been closed")]
    DocumentClosed,

    #[error("Document is already borrowed")]
    DocumentBusy,

    #[error("Node {0} would leave the world bounds")]
    OutOfWorldBounds(NodeId),

    #[error("Hierarchy violation: {0}")]
    Hierarchy(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Nothing to repeat")]
    NothingToRepeat,

    #[error("Command is not repeatable: {0}")]
    NotRepeatable(String),

    #[error("Command has not been executed: {0}")]
    NotExecuted(String),

    #[error("A command group is still open")]
    GroupOpen,

    #[error("No command group is open")]
    NoOpenGroup,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
