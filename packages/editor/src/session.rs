//! # Edit Session Management
//!
//! An EditSession owns one open document, its command history and the
//! current selection. Commands only hold weak references to the document,
//! so closing the session's document is enough to invalidate them.

use crate::command::Command;
use crate::command_processor::{CommandOutcome, CommandProcessor};
use crate::config::EditorConfig;
use crate::document::DocumentHandle;
use crate::errors::CommandError;
use quarry_model::NodeId;
use tracing::info;

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited (None once closed)
    document: Option<DocumentHandle>,

    /// Undo/redo history
    processor: CommandProcessor,

    /// Current selection
    selected_nodes: Vec<NodeId>,
}

impl EditSession {
    /// Create new edit session
    pub fn new(id: impl Into<String>, document: DocumentHandle, config: &EditorConfig) -> Self {
        Self {
            id: id.into(),
            document: Some(document),
            processor: CommandProcessor::with_config(config),
            selected_nodes: Vec::new(),
        }
    }

    /// The open document
    pub fn document(&self) -> Result<DocumentHandle, CommandError> {
        self.document.clone().ok_or(CommandError::DocumentClosed)
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn execute(&mut self, command: impl Into<Command>) -> Result<CommandOutcome, CommandError> {
        self.processor.execute(command)
    }

    pub fn undo(&mut self) -> Result<String, CommandError> {
        self.processor.undo()
    }

    pub fn redo(&mut self) -> Result<String, CommandError> {
        self.processor.redo()
    }

    /// Repeat the last command against the current selection
    pub fn repeat_last(&mut self) -> Result<CommandOutcome, CommandError> {
        let document = self.document()?;
        self.processor.repeat_last(&document, &self.selected_nodes)
    }

    /// Replace the selection. Ends any collation in progress.
    pub fn select(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        self.selected_nodes = nodes.into_iter().collect();
        self.processor.break_collation();
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selected_nodes
    }

    /// Drop the session's document.
    ///
    /// History is kept; undoing it afterwards fails with `DocumentClosed`.
    pub fn close(&mut self) {
        if self.document.take().is_some() {
            info!(session = %self.id, "Closed document");
        }
        self.selected_nodes.clear();
    }

    pub fn processor(&self) -> &CommandProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut CommandProcessor {
        &mut self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MoveObjectsCommand;
    use crate::document::MapDocument;
    use glam::DVec3;
    use std::rc::Rc;

    fn session() -> (EditSession, NodeId) {
        let config = EditorConfig::default();
        let handle = MapDocument::new(&config).into_handle();
        let group = {
            let mut doc = handle.borrow_mut();
            let map = doc.map_mut();
            let layer = map.default_layer();
            let group = map.create_group("g");
            map.add_child(layer, group);
            group
        };
        (EditSession::new("client-1", handle, &config), group)
    }

    #[test]
    fn test_new_session() {
        let (session, _) = session();
        assert_eq!(session.id, "client-1");
        assert!(session.is_open());
        assert!(session.selection().is_empty());
        assert!(!session.processor().can_undo());
    }

    #[test]
    fn test_select_breaks_collation() {
        let (mut session, group) = session();
        let handle = session.document().unwrap();

        session
            .execute(MoveObjectsCommand::move_objects(&handle, [group], DVec3::X, false))
            .unwrap();
        session.select([group]);
        let outcome = session
            .execute(MoveObjectsCommand::move_objects(&handle, [group], DVec3::X, false))
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Executed);
        assert_eq!(session.processor().undo_levels(), 2);
    }

    #[test]
    fn test_close_invalidates_history() {
        let (mut session, group) = session();
        let handle = session.document().unwrap();
        session
            .execute(MoveObjectsCommand::move_objects(&handle, [group], DVec3::X, false))
            .unwrap();
        drop(handle);

        session.close();
        assert!(!session.is_open());
        assert_eq!(session.document().err(), Some(CommandError::DocumentClosed));
        assert_eq!(session.undo(), Err(CommandError::DocumentClosed));
        assert_eq!(session.processor().undo_levels(), 1);
    }

    #[test]
    fn test_close_with_outstanding_handle_keeps_document_alive() {
        let (mut session, _) = session();
        let handle = session.document().unwrap();
        session.close();
        assert_eq!(Rc::strong_count(&handle), 1);
    }
}
