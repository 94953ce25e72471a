use crate::issue::Issue;
use quarry_editor::{AddRemoveNodesCommand, Command, DocumentHandle};
use std::collections::BTreeSet;

/// A remedy offered for issues of one generator.
///
/// Fixes never touch the map; they build a command so the fix can be undone.
pub trait IssueQuickFix {
    /// Label shown to the user
    fn name(&self) -> &'static str;

    /// Build the command fixing `issues`, or None if there is nothing to do
    fn build(&self, document: &DocumentHandle, issues: &[Issue]) -> Option<Command>;
}

/// Removes every node an issue points at
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteObjectsQuickFix;

impl IssueQuickFix for DeleteObjectsQuickFix {
    fn name(&self) -> &'static str {
        "Delete objects"
    }

    fn build(&self, document: &DocumentHandle, issues: &[Issue]) -> Option<Command> {
        let nodes: BTreeSet<_> = issues.iter().map(|issue| issue.node).collect();
        if nodes.is_empty() {
            return None;
        }
        Some(AddRemoveNodesCommand::remove_nodes(document, nodes).into())
    }
}
