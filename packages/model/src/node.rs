//! Per-variant node payloads.

use crate::attributes::Attributes;
use crate::brush::Brush;
use crate::index::AttributableIndex;
use crate::types::{NodeId, NodeKind};

/// Root of a document. Owns the attribute index for every node attached below it.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) attributes: Attributes,
    pub(crate) index: AttributableIndex,
    pub(crate) default_layer: NodeId,
}

impl World {
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn index(&self) -> &AttributableIndex {
        &self.index
    }

    pub fn default_layer(&self) -> NodeId {
        self.default_layer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    pub(crate) attributes: Attributes,
}

impl Entity {
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn classname(&self) -> Option<&str> {
        self.attributes.classname()
    }
}

/// Variant payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    World(World),
    Layer(Layer),
    Group(Group),
    Entity(Entity),
    Brush(Brush),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::World(_) => NodeKind::World,
            NodeData::Layer(_) => NodeKind::Layer,
            NodeData::Group(_) => NodeKind::Group,
            NodeData::Entity(_) => NodeKind::Entity,
            NodeData::Brush(_) => NodeKind::Brush,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            NodeData::World(world) => Some(&world.attributes),
            NodeData::Entity(entity) => Some(&entity.attributes),
            _ => None,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            NodeData::World(world) => Some(&mut world.attributes),
            NodeData::Entity(entity) => Some(&mut entity.attributes),
            _ => None,
        }
    }

    pub fn as_brush(&self) -> Option<&Brush> {
        match self {
            NodeData::Brush(brush) => Some(brush),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            NodeData::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Display name for layers and groups.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeData::Layer(layer) => Some(&layer.name),
            NodeData::Group(group) => Some(&group.name),
            _ => None,
        }
    }
}
