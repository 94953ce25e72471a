//! Attributable index: reverse lookup from attribute name/value to nodes.
//!
//! One index exists per [`World`](crate::World). Nodes never talk to it directly; the
//! [`Map`](crate::Map) forwards add/remove/query calls from any node up to the world
//! that owns the tree the node is attached to.

use crate::types::NodeId;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// How attribute names are matched by [`AttributableIndex::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameQuery<'a> {
    /// The name must equal the given string.
    Exact(&'a str),
    /// The name must be the prefix itself or the prefix followed only by ASCII digits,
    /// e.g. `target`, `target1`, `target12`.
    Numbered(&'a str),
}

impl NameQuery<'_> {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameQuery::Exact(expected) => name == *expected,
            NameQuery::Numbered(prefix) => name
                .strip_prefix(prefix)
                .is_some_and(|suffix| suffix.bytes().all(|b| b.is_ascii_digit())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttributableIndex {
    // name -> value -> nodes
    entries: BTreeMap<String, BTreeMap<String, BTreeSet<NodeId>>>,
    len: usize,
}

impl AttributableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` carries `name = value`. Returns false if already recorded.
    pub fn add_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let inserted = self
            .entries
            .entry(name.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(node);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Forget that `node` carries `name = value`. Returns false if it was not recorded.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(values) = self.entries.get_mut(name) else {
            return false;
        };
        let Some(nodes) = values.get_mut(value) else {
            return false;
        };
        let removed = nodes.remove(&node);
        if nodes.is_empty() {
            values.remove(value);
        }
        if values.is_empty() {
            self.entries.remove(name);
        }
        if removed {
            self.len -= 1;
        }
        removed
    }

    pub fn contains(&self, node: NodeId, name: &str, value: &str) -> bool {
        self.entries
            .get(name)
            .and_then(|values| values.get(value))
            .is_some_and(|nodes| nodes.contains(&node))
    }

    /// All nodes with an attribute matching `query` whose value equals `value`,
    /// deduplicated and ordered by id.
    pub fn find(&self, query: NameQuery<'_>, value: &str) -> Vec<NodeId> {
        let mut result = BTreeSet::new();
        match query {
            NameQuery::Exact(name) => {
                if let Some(nodes) = self.entries.get(name).and_then(|v| v.get(value)) {
                    result.extend(nodes.iter().copied());
                }
            }
            NameQuery::Numbered(prefix) => {
                let candidates = self
                    .entries
                    .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                    .take_while(|(name, _)| name.starts_with(prefix))
                    .filter(|(name, _)| query.matches(name));
                for (_, values) in candidates {
                    if let Some(nodes) = values.get(value) {
                        result.extend(nodes.iter().copied());
                    }
                }
            }
        }
        result.into_iter().collect()
    }

    /// Number of recorded (node, name, value) triples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NodeId {
        NodeId::new(n, 1)
    }

    #[test]
    fn test_exact_lookup() {
        let mut index = AttributableIndex::new();
        index.add_attribute(id(1), "targetname", "door");
        index.add_attribute(id(2), "targetname", "door");
        index.add_attribute(id(3), "targetname", "button");

        assert_eq!(index.find(NameQuery::Exact("targetname"), "door"), vec![id(1), id(2)]);
        assert_eq!(index.find(NameQuery::Exact("targetname"), "lift"), vec![]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_numbered_lookup() {
        let mut index = AttributableIndex::new();
        index.add_attribute(id(1), "target", "door");
        index.add_attribute(id(2), "target1", "door");
        index.add_attribute(id(3), "target22", "door");
        index.add_attribute(id(4), "targetname", "door");
        index.add_attribute(id(5), "target2", "lift");

        assert_eq!(
            index.find(NameQuery::Numbered("target"), "door"),
            vec![id(1), id(2), id(3)]
        );
    }

    #[test]
    fn test_remove_prunes_empty_buckets() {
        let mut index = AttributableIndex::new();
        index.add_attribute(id(1), "target", "door");
        assert!(index.remove_attribute(id(1), "target", "door"));
        assert!(!index.remove_attribute(id(1), "target", "door"));
        assert!(index.is_empty());
        assert!(index.entries.is_empty());
    }

    #[test]
    fn test_duplicate_add_is_counted_once() {
        let mut index = AttributableIndex::new();
        assert!(index.add_attribute(id(1), "target", "door"));
        assert!(!index.add_attribute(id(1), "target", "door"));
        assert_eq!(index.len(), 1);
        assert!(index.contains(id(1), "target", "door"));
    }

    #[test]
    fn test_numbered_query_matching() {
        let query = NameQuery::Numbered("target");
        assert!(query.matches("target"));
        assert!(query.matches("target7"));
        assert!(!query.matches("targetname"));
        assert!(!query.matches("target7a"));
        assert!(!query.matches("tar"));
    }
}
