//! # Notification Bus
//!
//! Per-document before/after channels consumed by renderers, validators and the UI.
//!
//! A mutation touching many nodes fires one notification carrying the whole affected set,
//! so observers can batch their invalidation.

use crate::command::CommandKind;
use quarry_model::{Map, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Handle returned by [`Notifier::add_observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer<E> = Box<dyn FnMut(&Map, &E)>;

/// Ordered list of observers for one kind of event.
///
/// Observers receive the map read-only. They must not borrow the document handle.
pub struct Notifier<E> {
    observers: Vec<(ObserverId, Observer<E>)>,
    next_id: u64,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add_observer<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Map, &E) + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the observer was not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Call every observer in registration order.
    pub fn notify(&mut self, map: &Map, event: &E) {
        for (_, observer) in &mut self.observers {
            observer(map, event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// The set of nodes affected by one logical change, deduplicated and ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSet {
    pub nodes: Vec<NodeId>,
}

impl NodeSet {
    pub fn new(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.binary_search(&node).is_ok()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Payload of `command_done` / `command_undone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNotification {
    pub kind: CommandKind,
    pub name: String,
}

/// All notification channels of one document
#[derive(Debug, Default)]
pub struct DocumentNotifiers {
    pub objects_will_change: Notifier<NodeSet>,
    pub objects_did_change: Notifier<NodeSet>,
    pub nodes_were_added: Notifier<NodeSet>,
    pub nodes_will_be_removed: Notifier<NodeSet>,
    pub nodes_were_removed: Notifier<NodeSet>,
    pub command_done: Notifier<CommandNotification>,
    pub command_undone: Notifier<CommandNotification>,
}
