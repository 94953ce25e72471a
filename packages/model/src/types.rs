//! Node identifiers and variant tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a node in a [`Map`](crate::Map).
///
/// A small, copyable handle made of a slot index and a generation counter. It is the
/// non-owning reference used for parent links, command parameters and index entries.
///
/// - On allocation a slot receives a fresh generation.
/// - On [`Map::destroy`](crate::Map::destroy) the slot is freed and every `NodeId` that
///   pointed to it becomes stale.
/// - A reused slot gets a higher generation, so stale ids never alias a live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this id was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

/// The closed set of node variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    World,
    Layer,
    Group,
    Entity,
    Brush,
}

impl NodeKind {
    /// Whether nodes of this kind carry key/value attributes.
    pub const fn is_attributable(self) -> bool {
        matches!(self, NodeKind::World | NodeKind::Entity)
    }

    /// Whether a parent of this kind accepts a child of kind `child`.
    pub const fn accepts(self, child: NodeKind) -> bool {
        match self {
            NodeKind::World => matches!(child, NodeKind::Layer),
            NodeKind::Layer | NodeKind::Group => {
                matches!(child, NodeKind::Group | NodeKind::Entity | NodeKind::Brush)
            }
            NodeKind::Entity => matches!(child, NodeKind::Brush),
            NodeKind::Brush => false,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::World => "world",
            NodeKind::Layer => "layer",
            NodeKind::Group => "group",
            NodeKind::Entity => "entity",
            NodeKind::Brush => "brush",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
