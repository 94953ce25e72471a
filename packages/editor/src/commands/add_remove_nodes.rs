use crate::command::with_document;
use crate::document::{DocumentHandle, DocumentRef, Placement};
use crate::errors::CommandError;
use quarry_model::NodeId;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
}

/// Attaches new nodes or detaches existing ones.
///
/// Detached nodes keep their identity so undo restores the exact tree. While the command
/// holds nodes outside the tree (an undone add, a done remove) it owns them, and destroys
/// them when dropped.
#[derive(Debug)]
pub struct AddRemoveNodesCommand {
    document: DocumentRef,
    name: String,
    action: Action,
    nodes: Vec<NodeId>,
    // Add: target positions. Remove: positions recorded by the last detach.
    placements: Vec<Placement>,
    owns_detached: bool,
}

impl AddRemoveNodesCommand {
    /// Attach detached `nodes` at the end of `parent`'s children.
    pub fn add_nodes(
        document: &DocumentHandle,
        parent: NodeId,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        let placements = nodes
            .iter()
            .map(|&node| Placement {
                parent,
                index: usize::MAX,
                node,
            })
            .collect();
        Self {
            document: Rc::downgrade(document),
            name: plural_name("Add", nodes.len()),
            action: Action::Add,
            nodes,
            placements,
            owns_detached: false,
        }
    }

    /// Detach `nodes` from wherever they are.
    pub fn remove_nodes(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        Self {
            document: Rc::downgrade(document),
            name: plural_name("Remove", nodes.len()),
            action: Action::Remove,
            nodes,
            placements: Vec::new(),
            owns_detached: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn perform_do(&mut self) -> Result<(), CommandError> {
        match self.action {
            Action::Add => self.attach(),
            Action::Remove => self.detach(),
        }
    }

    pub(crate) fn perform_undo(&mut self) -> Result<(), CommandError> {
        match self.action {
            Action::Add => self.detach(),
            Action::Remove => {
                if self.placements.is_empty() && !self.nodes.is_empty() {
                    return Err(CommandError::NotExecuted(self.name.clone()));
                }
                self.attach()
            }
        }
    }

    fn attach(&mut self) -> Result<(), CommandError> {
        let placements: Vec<Placement> = match self.action {
            Action::Add => self.placements.clone(),
            // Reverse detach order so every index refers to the sibling list it was taken from.
            Action::Remove => self.placements.iter().rev().copied().collect(),
        };
        with_document(&self.document, |doc| doc.attach_nodes(&placements))?;
        if self.action == Action::Remove {
            self.placements.clear();
        }
        self.owns_detached = false;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), CommandError> {
        let placements = with_document(&self.document, |doc| doc.detach_nodes(&self.nodes))?;
        if self.action == Action::Remove {
            self.placements = placements;
        }
        self.owns_detached = true;
        Ok(())
    }
}

fn plural_name(verb: &str, count: usize) -> String {
    if count == 1 {
        format!("{verb} Object")
    } else {
        format!("{verb} Objects")
    }
}

impl Drop for AddRemoveNodesCommand {
    fn drop(&mut self) {
        if !self.owns_detached {
            return;
        }
        // A closed document took its nodes with it.
        let Some(handle) = self.document.upgrade() else {
            return;
        };
        let Ok(mut doc) = handle.try_borrow_mut() else {
            warn!(command = %self.name, "Document busy, detached nodes leaked");
            return;
        };

        let map = doc.map_mut();
        let mut destroyed = 0;
        for &node in &self.nodes {
            if map.is_alive(node) && map.parent(node).is_none() {
                map.destroy(node);
                destroyed += 1;
            }
        }
        debug!(command = %self.name, destroyed, "Destroyed detached nodes");
    }
}
