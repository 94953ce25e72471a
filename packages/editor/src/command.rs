//! # Commands
//!
//! A command is one undoable unit of work against a document.
//!
//! ## Design
//!
//! - Commands are a closed enum; [`CommandKind`] is the typed token collation compares
//! - Commands hold a [`DocumentRef`], never the document itself. A closed document turns
//!   every operation into [`CommandError::DocumentClosed`]
//! - `perform_do` validates before mutating, so a failed command changes nothing
//! - `perform_undo` restores captured state, so do followed by undo is exact

use crate::commands::{
    AddRemoveNodesCommand, EntityAttributeCommand, MoveObjectsCommand, ResizeBrushesCommand,
};
use crate::document::{DocumentHandle, DocumentRef, MapDocument};
use crate::errors::CommandError;
use crate::notifier::CommandNotification;
use quarry_model::NodeId;
use serde::{Deserialize, Serialize};
use std::rc::Weak;

/// Collation type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    ResizeBrushes,
    MoveObjects,
    EntityAttribute,
    AddRemoveNodes,
}

#[derive(Debug)]
pub enum Command {
    ResizeBrushes(ResizeBrushesCommand),
    MoveObjects(MoveObjectsCommand),
    EntityAttribute(EntityAttributeCommand),
    AddRemoveNodes(AddRemoveNodesCommand),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::ResizeBrushes(_) => CommandKind::ResizeBrushes,
            Command::MoveObjects(_) => CommandKind::MoveObjects,
            Command::EntityAttribute(_) => CommandKind::EntityAttribute,
            Command::AddRemoveNodes(_) => CommandKind::AddRemoveNodes,
        }
    }

    /// Human-readable name shown in undo/redo menus
    pub fn name(&self) -> &str {
        match self {
            Command::ResizeBrushes(command) => command.name(),
            Command::MoveObjects(command) => command.name(),
            Command::EntityAttribute(command) => command.name(),
            Command::AddRemoveNodes(command) => command.name(),
        }
    }

    pub fn document(&self) -> &DocumentRef {
        match self {
            Command::ResizeBrushes(command) => command.document(),
            Command::MoveObjects(command) => command.document(),
            Command::EntityAttribute(command) => command.document(),
            Command::AddRemoveNodes(command) => command.document(),
        }
    }

    pub fn perform_do(&mut self) -> Result<(), CommandError> {
        match self {
            Command::ResizeBrushes(command) => command.perform_do(),
            Command::MoveObjects(command) => command.perform_do(),
            Command::EntityAttribute(command) => command.perform_do(),
            Command::AddRemoveNodes(command) => command.perform_do(),
        }
    }

    pub fn perform_undo(&mut self) -> Result<(), CommandError> {
        match self {
            Command::ResizeBrushes(command) => command.perform_undo(),
            Command::MoveObjects(command) => command.perform_undo(),
            Command::EntityAttribute(command) => command.perform_undo(),
            Command::AddRemoveNodes(command) => command.perform_undo(),
        }
    }

    /// Try to absorb `other`, which has already been executed, into this command.
    ///
    /// Only commands of the same kind against the same document are considered; the
    /// concrete command decides whether the parameters are compatible.
    pub fn collate_with(&mut self, other: &Command) -> bool {
        if !Weak::ptr_eq(self.document(), other.document()) {
            return false;
        }
        match (self, other) {
            (Command::ResizeBrushes(this), Command::ResizeBrushes(other)) => {
                this.collate_with(other)
            }
            (Command::MoveObjects(this), Command::MoveObjects(other)) => this.collate_with(other),
            (Command::EntityAttribute(this), Command::EntityAttribute(other)) => {
                this.collate_with(other)
            }
            _ => false,
        }
    }

    pub fn is_repeatable(&self) -> bool {
        match self {
            Command::ResizeBrushes(_) => false,
            Command::MoveObjects(_) => true,
            Command::EntityAttribute(_) => true,
            Command::AddRemoveNodes(_) => false,
        }
    }

    /// A fresh command doing the same thing to `selection`.
    pub fn repeat(
        &self,
        document: &DocumentHandle,
        selection: &[NodeId],
    ) -> Result<Command, CommandError> {
        match self {
            Command::MoveObjects(command) => Ok(command.repeat(document, selection).into()),
            Command::EntityAttribute(command) => Ok(command.repeat(document, selection).into()),
            _ => Err(CommandError::NotRepeatable(self.name().to_string())),
        }
    }

    pub fn notification(&self) -> CommandNotification {
        CommandNotification {
            kind: self.kind(),
            name: self.name().to_string(),
        }
    }
}

impl From<ResizeBrushesCommand> for Command {
    fn from(command: ResizeBrushesCommand) -> Self {
        Command::ResizeBrushes(command)
    }
}

impl From<MoveObjectsCommand> for Command {
    fn from(command: MoveObjectsCommand) -> Self {
        Command::MoveObjects(command)
    }
}

impl From<EntityAttributeCommand> for Command {
    fn from(command: EntityAttributeCommand) -> Self {
        Command::EntityAttribute(command)
    }
}

impl From<AddRemoveNodesCommand> for Command {
    fn from(command: AddRemoveNodesCommand) -> Self {
        Command::AddRemoveNodes(command)
    }
}

/// Upgrade a command's document reference.
pub fn lock_document(document: &DocumentRef) -> Result<DocumentHandle, CommandError> {
    document.upgrade().ok_or(CommandError::DocumentClosed)
}

/// Run `f` with the document mutably borrowed.
pub(crate) fn with_document<R>(
    document: &DocumentRef,
    f: impl FnOnce(&mut MapDocument) -> Result<R, CommandError>,
) -> Result<R, CommandError> {
    let handle = lock_document(document)?;
    let mut document = handle
        .try_borrow_mut()
        .map_err(|_| CommandError::DocumentBusy)?;
    f(&mut *document)
}
