//! # Command Processor
//!
//! Executes commands and tracks their history for undo/redo.
//!
//! ## Design
//!
//! - Commands run immediately; only successful ones enter history
//! - A successful command is first offered to the newest history entry for collation,
//!   so a drag gesture becomes one undo step
//! - Undo reverts the newest entry and moves it to the redo stack
//! - Redo re-executes the entry and moves it back
//! - New commands clear the redo stack
//! - Groups make several commands one history entry
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut processor = CommandProcessor::new();
//!
//! let command = ResizeBrushesCommand::resize_brushes(&doc, faces, delta, true);
//! processor.execute(command)?;
//!
//! // Undo
//! processor.undo()?;
//!
//! // Redo
//! processor.redo()?;
//! ```

use crate::command::{with_document, Command};
use crate::config::EditorConfig;
use crate::document::DocumentHandle;
use crate::errors::CommandError;
use quarry_model::NodeId;
use tracing::{debug, info, warn};

/// What happened to a successfully executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command became a new history entry (or joined the open group)
    Executed,
    /// The command was merged into the newest history entry and discarded
    Collated,
}

/// Commands that are undone/redone together
#[derive(Debug)]
pub struct CommandBatch {
    /// Shown in undo/redo menus
    name: String,

    /// The commands in this batch (in execution order)
    commands: Vec<Command>,

    /// Built by `begin_group`/`end_group`; never collates with later commands
    is_group: bool,
}

impl CommandBatch {
    fn single(command: Command) -> Self {
        Self {
            name: command.name().to_string(),
            commands: vec![command],
            is_group: false,
        }
    }

    fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            is_group: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Undo in reverse order. On failure, commands already undone are redone.
    fn undo(&mut self) -> Result<(), CommandError> {
        for index in (0..self.commands.len()).rev() {
            if let Err(error) = self.commands[index].perform_undo() {
                for command in &mut self.commands[index + 1..] {
                    if let Err(redo_error) = command.perform_do() {
                        warn!(
                            command = command.name(),
                            error = %redo_error,
                            "Could not reapply command"
                        );
                    }
                }
                return Err(error);
            }
        }
        Ok(())
    }

    /// Redo in order. On failure, commands already redone are undone.
    fn redo(&mut self) -> Result<(), CommandError> {
        for index in 0..self.commands.len() {
            if let Err(error) = self.commands[index].perform_do() {
                for command in self.commands[..index].iter_mut().rev() {
                    if let Err(undo_error) = command.perform_undo() {
                        warn!(
                            command = command.name(),
                            error = %undo_error,
                            "Could not revert command"
                        );
                    }
                }
                return Err(error);
            }
        }
        Ok(())
    }
}

/// Undo/redo history for one editing session
#[derive(Debug)]
pub struct CommandProcessor {
    /// Executed batches (most recent last)
    undo_stack: Vec<CommandBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<CommandBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Whether compatible commands may merge
    collate: bool,

    /// Currently building a group
    current_group: Option<CommandBatch>,

    /// Nested `begin_group` calls inside the open group
    group_depth: usize,

    /// The next command starts a new entry regardless of compatibility
    collation_broken: bool,
}

impl CommandProcessor {
    /// Create a processor with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            collate: true,
            current_group: None,
            group_depth: 0,
            collation_broken: false,
        }
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            collate: config.collate_commands,
            ..Self::with_max_levels(config.max_undo_levels)
        }
    }

    /// Execute a command and record it for undo.
    ///
    /// A failed command leaves the document and the history untouched.
    pub fn execute(&mut self, command: impl Into<Command>) -> Result<CommandOutcome, CommandError> {
        let mut command = command.into();
        if let Err(error) = command.perform_do() {
            warn!(command = command.name(), %error, "Command rejected");
            return Err(error);
        }
        debug!(command = command.name(), kind = ?command.kind(), "Executed command");
        notify_done(&command);

        // New action invalidates the future
        self.redo_stack.clear();

        if self.try_collate(&command) {
            debug!(command = command.name(), "Collated with previous command");
            return Ok(CommandOutcome::Collated);
        }

        match &mut self.current_group {
            Some(group) => group.commands.push(command),
            None => self.push_batch(CommandBatch::single(command)),
        }
        Ok(CommandOutcome::Executed)
    }

    fn try_collate(&mut self, command: &Command) -> bool {
        if !self.collate || self.collation_broken {
            return false;
        }
        let target = match &mut self.current_group {
            Some(group) => group.commands.last_mut(),
            None => self
                .undo_stack
                .last_mut()
                .filter(|batch| !batch.is_group)
                .and_then(|batch| batch.commands.last_mut()),
        };
        target.is_some_and(|previous| previous.collate_with(command))
    }

    fn push_batch(&mut self, batch: CommandBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            let dropped = self.undo_stack.remove(0);
            debug!(command = dropped.name(), "Dropped oldest history entry");
        }

        self.collation_broken = false;
    }

    /// Undo the most recent batch, returning its name
    pub fn undo(&mut self) -> Result<String, CommandError> {
        if self.current_group.is_some() {
            return Err(CommandError::GroupOpen);
        }
        let mut batch = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;

        if let Err(error) = batch.undo() {
            warn!(command = batch.name(), %error, "Undo failed");
            self.undo_stack.push(batch);
            return Err(error);
        }
        for command in batch.commands.iter().rev() {
            notify_undone(command);
        }

        self.collation_broken = true;
        let name = batch.name.clone();
        info!(command = %name, "Undo");
        self.redo_stack.push(batch);
        Ok(name)
    }

    /// Redo the most recently undone batch, returning its name
    pub fn redo(&mut self) -> Result<String, CommandError> {
        if self.current_group.is_some() {
            return Err(CommandError::GroupOpen);
        }
        let mut batch = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;

        if let Err(error) = batch.redo() {
            warn!(command = batch.name(), %error, "Redo failed");
            self.redo_stack.push(batch);
            return Err(error);
        }
        for command in &batch.commands {
            notify_done(command);
        }

        self.collation_broken = true;
        let name = batch.name.clone();
        info!(command = %name, "Redo");
        self.undo_stack.push(batch);
        Ok(name)
    }

    /// Start a group of commands (will be undone/redone together).
    ///
    /// Nested calls join the outer group.
    pub fn begin_group(&mut self, name: impl Into<String>) {
        if self.current_group.is_some() {
            self.group_depth += 1;
            return;
        }
        let group = CommandBatch::group(name);
        debug!(group = group.name(), "Begin command group");
        self.current_group = Some(group);
    }

    /// End the current group and push it to the undo stack
    pub fn end_group(&mut self) -> Result<(), CommandError> {
        if self.current_group.is_none() {
            return Err(CommandError::NoOpenGroup);
        }
        if self.group_depth > 0 {
            self.group_depth -= 1;
            return Ok(());
        }
        if let Some(group) = self.current_group.take() {
            debug!(group = group.name(), commands = group.commands.len(), "End command group");
            if !group.commands.is_empty() {
                self.push_batch(group);
            }
        }
        self.collation_broken = true;
        Ok(())
    }

    /// Undo every command of the open group and discard it
    pub fn rollback_group(&mut self) -> Result<(), CommandError> {
        let mut group = self.current_group.take().ok_or(CommandError::NoOpenGroup)?;
        if let Err(error) = group.undo() {
            warn!(group = group.name(), %error, "Rollback failed");
            self.current_group = Some(group);
            return Err(error);
        }
        for command in group.commands.iter().rev() {
            notify_undone(command);
        }
        info!(group = group.name(), "Rolled back command group");
        self.group_depth = 0;
        self.collation_broken = true;
        Ok(())
    }

    /// The next command starts a new history entry (e.g. at the end of a drag)
    pub fn break_collation(&mut self) {
        self.collation_broken = true;
    }

    /// Execute the most recent command again against `selection`
    pub fn repeat_last(
        &mut self,
        document: &DocumentHandle,
        selection: &[NodeId],
    ) -> Result<CommandOutcome, CommandError> {
        let last = self
            .undo_stack
            .last()
            .and_then(|batch| batch.commands.last())
            .ok_or(CommandError::NothingToRepeat)?;
        if !last.is_repeatable() {
            return Err(CommandError::NotRepeatable(last.name().to_string()));
        }
        let repeated = last.repeat(document, selection)?;
        self.break_collation();
        self.execute(repeated)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current_group.is_none() && !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current_group.is_none() && !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_group_open(&self) -> bool {
        self.current_group.is_some()
    }

    /// Name of the next undo operation
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(CommandBatch::name)
    }

    /// Name of the next redo operation
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(CommandBatch::name)
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group = None;
        self.group_depth = 0;
        self.collation_broken = false;
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn notify_done(command: &Command) {
    let notification = command.notification();
    let delivered = with_document(command.document(), |doc| {
        doc.notify_command_done(&notification);
        Ok(())
    });
    if let Err(error) = delivered {
        debug!(command = command.name(), %error, "command_done not delivered");
    }
}

fn notify_undone(command: &Command) {
    let notification = command.notification();
    let delivered = with_document(command.document(), |doc| {
        doc.notify_command_undone(&notification);
        Ok(())
    });
    if let Err(error) = delivered {
        debug!(command = command.name(), %error, "command_undone not delivered");
    }
}
