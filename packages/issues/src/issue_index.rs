//! # Issue Index
//!
//! Keeps the issues of one document current.
//!
//! The index runs a full pass when attached, then listens to the document's
//! notifications and revalidates only the nodes each notification names.

use crate::generate::{generate_for_node, generate_issues};
use crate::generators::GeneratorRegistry;
use crate::issue::Issue;
use crate::quick_fix::IssueQuickFix;
use quarry_editor::{MapDocument, NodeSet, ObserverId};
use quarry_model::{Map, NodeId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug)]
struct IssueState {
    registry: GeneratorRegistry,
    issues: BTreeMap<NodeId, Vec<Issue>>,
}

impl IssueState {
    fn revalidate(&mut self, map: &Map, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            let issues = generate_for_node(map, node, &self.registry);
            if issues.is_empty() {
                self.issues.remove(&node);
            } else {
                self.issues.insert(node, issues);
            }
        }
    }

    fn forget(&mut self, map: &Map, roots: &NodeSet) {
        for &root in &roots.nodes {
            for node in map.subtree(root) {
                self.issues.remove(&node);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    changed: ObserverId,
    added: ObserverId,
    removed: ObserverId,
}

/// Issues of a document, kept in sync through its notifiers
#[derive(Debug)]
pub struct IssueIndex {
    state: Rc<RefCell<IssueState>>,
    subscriptions: Subscriptions,
}

impl IssueIndex {
    /// Validate the whole document and subscribe to its changes
    pub fn attach(document: &mut MapDocument, registry: GeneratorRegistry) -> Self {
        let mut issues: BTreeMap<NodeId, Vec<Issue>> = BTreeMap::new();
        for issue in generate_issues(document.map(), &registry) {
            issues.entry(issue.node).or_default().push(issue);
        }
        debug!(nodes = issues.len(), "Issue index built");
        let state = Rc::new(RefCell::new(IssueState { registry, issues }));

        let notifiers = document.notifiers_mut();
        let changed = {
            let state = state.clone();
            notifiers
                .objects_did_change
                .add_observer(move |map, nodes: &NodeSet| {
                    trace!(count = nodes.len(), "Revalidating changed objects");
                    state.borrow_mut().revalidate(map, nodes.nodes.iter().copied());
                })
        };
        let added = {
            let state = state.clone();
            notifiers
                .nodes_were_added
                .add_observer(move |map, roots: &NodeSet| {
                    let nodes: Vec<NodeId> = roots
                        .nodes
                        .iter()
                        .flat_map(|&root| map.subtree(root))
                        .collect();
                    trace!(count = nodes.len(), "Validating added nodes");
                    state.borrow_mut().revalidate(map, nodes);
                })
        };
        let removed = {
            let state = state.clone();
            notifiers
                .nodes_were_removed
                .add_observer(move |map, roots: &NodeSet| {
                    trace!(count = roots.len(), "Dropping issues of removed nodes");
                    state.borrow_mut().forget(map, roots);
                })
        };

        Self {
            state,
            subscriptions: Subscriptions {
                changed,
                added,
                removed,
            },
        }
    }

    /// Stop listening to `document`
    pub fn detach(self, document: &mut MapDocument) {
        let notifiers = document.notifiers_mut();
        notifiers.objects_did_change.remove_observer(self.subscriptions.changed);
        notifiers.nodes_were_added.remove_observer(self.subscriptions.added);
        notifiers.nodes_were_removed.remove_observer(self.subscriptions.removed);
    }

    /// All issues, ordered by node
    pub fn issues(&self) -> Vec<Issue> {
        self.state.borrow().issues.values().flatten().cloned().collect()
    }

    pub fn issues_for(&self, node: NodeId) -> Vec<Issue> {
        self.state
            .borrow()
            .issues
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().issues.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().issues.is_empty()
    }

    /// Quick fixes offered by the generator called `generator`
    pub fn quick_fixes(&self, generator: &str) -> Vec<Box<dyn IssueQuickFix>> {
        self.state
            .borrow()
            .registry
            .generator(generator)
            .map(|generator| generator.quick_fixes())
            .unwrap_or_default()
    }
}
