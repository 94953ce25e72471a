use crate::brush::Brush;
use crate::map::Map;
use crate::node::{Entity, Group, Layer, NodeData, World};
use crate::types::NodeId;

/// Read-only traversal over the closed set of node variants.
///
/// Default implementations walk the whole subtree. Override the `visit_*` methods you care
/// about and call [`walk_children`] to keep descending.
pub trait NodeVisitor: Sized {
    fn visit_world(&mut self, map: &Map, id: NodeId, _world: &World) {
        walk_children(self, map, id);
    }

    fn visit_layer(&mut self, map: &Map, id: NodeId, _layer: &Layer) {
        walk_children(self, map, id);
    }

    fn visit_group(&mut self, map: &Map, id: NodeId, _group: &Group) {
        walk_children(self, map, id);
    }

    fn visit_entity(&mut self, map: &Map, id: NodeId, _entity: &Entity) {
        walk_children(self, map, id);
    }

    fn visit_brush(&mut self, _map: &Map, _id: NodeId, _brush: &Brush) {
        // Leaf node
    }
}

pub fn walk_children<V: NodeVisitor>(visitor: &mut V, map: &Map, id: NodeId) {
    for &child in map.children(id) {
        map.accept(child, visitor);
    }
}

impl Map {
    /// Dispatch `visitor` on `id`. Stale ids are skipped.
    pub fn accept<V: NodeVisitor>(&self, id: NodeId, visitor: &mut V) {
        match self.node(id) {
            Some(NodeData::World(world)) => visitor.visit_world(self, id, world),
            Some(NodeData::Layer(layer)) => visitor.visit_layer(self, id, layer),
            Some(NodeData::Group(group)) => visitor.visit_group(self, id, group),
            Some(NodeData::Entity(entity)) => visitor.visit_entity(self, id, entity),
            Some(NodeData::Brush(brush)) => visitor.visit_brush(self, id, brush),
            None => {}
        }
    }
}
