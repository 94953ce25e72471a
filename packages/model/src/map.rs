//! Node arena: structure, attachment, index forwarding and attribute mutation.

use crate::attributes::{is_world_attribute_mutable, names, Attributes, WORLDSPAWN};
use crate::bbox::BBox3;
use crate::brush::Brush;
use crate::error::ModelError;
use crate::index::{AttributableIndex, NameQuery};
use crate::node::{Entity, Group, Layer, NodeData, World};
use crate::types::{NodeId, NodeKind};
use glam::DVec3;
use tracing::{debug, trace};

pub const DEFAULT_LAYER_NAME: &str = "Default Layer";

/// Point entities (no brushes) occupy a cube of this half size around their origin.
pub const POINT_ENTITY_HALF_SIZE: f64 = 8.0;

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// All nodes of one document, attached or detached.
///
/// The map is created with its World and default Layer. Nodes are allocated detached and
/// become part of the document through [`Map::add_child`]. Detaching never frees a node;
/// only [`Map::destroy`] does.
pub struct Map {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    world: NodeId,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("nodes_total", &self.slots.len())
            .field("nodes_alive", &self.node_count())
            .field("free_list", &self.free_list.len())
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

impl Map {
    pub fn new() -> Self {
        Self::with_world(DEFAULT_LAYER_NAME, Attributes::new())
    }

    pub fn with_world_attributes(attributes: Attributes) -> Self {
        Self::with_world(DEFAULT_LAYER_NAME, attributes)
    }

    /// Bulk construction entry point: the only way to seed reserved world attributes.
    ///
    /// `classname` defaults to `worldspawn` when absent.
    pub fn with_world(default_layer_name: &str, mut attributes: Attributes) -> Self {
        if !attributes.contains(names::CLASSNAME) {
            attributes.set(names::CLASSNAME, WORLDSPAWN);
        }

        let mut map = Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            world: NodeId::new(0, 0),
        };

        let layer = map.create_layer(default_layer_name);
        let world = map.alloc(NodeData::World(World {
            attributes,
            index: AttributableIndex::new(),
            default_layer: layer,
        }));
        map.world = world;

        for (name, value) in map.attribute_pairs(world) {
            map.add_to_index(world, world, &name, &value);
        }
        map.add_child(world, layer);
        map
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let idx = match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(None);
                self.generations.push(0);
                self.slots.len() - 1
            }
        };
        let generation = self.generations[idx].wrapping_add(1);
        self.generations[idx] = generation;
        self.slots[idx] = Some(Slot {
            generation,
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId::new(idx as u32, generation)
    }

    pub fn create_layer(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Layer(Layer { name: name.into() }))
    }

    pub fn create_group(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Group(Group { name: name.into() }))
    }

    pub fn create_entity(&mut self, attributes: Attributes) -> NodeId {
        self.alloc(NodeData::Entity(Entity { attributes }))
    }

    pub fn create_brush(&mut self, brush: Brush) -> NodeId {
        self.alloc(NodeData::Brush(brush))
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|slot| slot.generation == id.generation())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|slot| slot.generation == id.generation())
    }

    fn expect_slot_mut(&mut self, id: NodeId) -> &mut Slot {
        self.slot_mut(id)
            .unwrap_or_else(|| panic!("stale or unknown node {id}"))
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn world(&self) -> NodeId {
        self.world
    }

    pub fn world_data(&self) -> &World {
        match self.slot(self.world).map(|slot| &slot.data) {
            Some(NodeData::World(world)) => world,
            _ => unreachable!("the root slot always holds the world"),
        }
    }

    pub fn default_layer(&self) -> NodeId {
        self.world_data().default_layer
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|slot| &slot.data)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(NodeData::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    /// Children in order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Topmost ancestor of `id`, or `id` itself when detached.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Whether `id` is reachable from the World.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.root_of(id) == Some(self.world)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// `id` and all its descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.is_alive(id) {
            return result;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// The entity a brush belongs to, if its parent is one.
    pub fn owning_entity(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        (self.kind(parent) == Some(NodeKind::Entity)).then_some(parent)
    }

    pub fn is_point_entity(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Entity) && !self.has_children(id)
    }

    /// Whether the variant of `parent` accepts the variant of `child`.
    pub fn can_add_child(&self, parent: NodeId, child: NodeId) -> bool {
        match (self.kind(parent), self.kind(child)) {
            (Some(parent_kind), Some(child_kind)) => parent_kind.accepts(child_kind),
            _ => false,
        }
    }

    /// Whether `parent` lets go of `child`. The world keeps its default layer.
    pub fn can_remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        match self.kind(parent) {
            Some(NodeKind::World) => child != self.default_layer(),
            Some(_) => true,
            None => false,
        }
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Attach `child` at `index` (clamped) among the children of `parent`.
    ///
    /// # Panics
    ///
    /// If either node is stale, `child` already has a parent, the attachment would create a
    /// cycle, or the variant of `parent` does not accept the variant of `child`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        assert!(self.is_alive(parent), "cannot attach to stale node {parent}");
        assert!(self.is_alive(child), "cannot attach stale node {child}");
        assert!(
            self.parent(child).is_none(),
            "node {child} already has a parent"
        );
        assert!(
            !self.children(parent).contains(&child),
            "node {child} is already a child of {parent}"
        );
        assert!(
            child != parent && !self.is_ancestor(child, parent),
            "attaching {child} under {parent} would create a cycle"
        );
        assert!(
            self.can_add_child(parent, child),
            "a {} cannot contain a {}",
            self.kind(parent).map_or("?", NodeKind::name),
            self.kind(child).map_or("?", NodeKind::name),
        );

        let children = &mut self.expect_slot_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.expect_slot_mut(child).parent = Some(parent);
        trace!(%parent, %child, index, "Attached node");

        self.ancestor_did_change(child);
    }

    /// Detach `child` from `parent` and return its former position.
    ///
    /// The child and its subtree stay alive; the caller now owns them.
    ///
    /// # Panics
    ///
    /// If `child` is not a child of `parent` or `parent` refuses to release it.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> usize {
        assert!(self.is_alive(parent), "cannot detach from stale node {parent}");
        assert!(self.is_alive(child), "cannot detach stale node {child}");
        assert_eq!(
            self.parent(child),
            Some(parent),
            "node {child} is not a child of {parent}"
        );
        assert!(
            self.can_remove_child(parent, child),
            "{parent} refuses to release {child}"
        );

        self.ancestor_will_change(child);

        let children = &mut self.expect_slot_mut(parent).children;
        let position = children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("node {child} missing from the children of {parent}"));
        children.remove(position);
        self.expect_slot_mut(child).parent = None;
        trace!(%parent, %child, position, "Detached node");
        position
    }

    /// Free a detached subtree, children first.
    pub fn destroy(&mut self, id: NodeId) {
        assert!(self.is_alive(id), "cannot destroy stale node {id}");
        assert_ne!(id, self.world, "the world cannot be destroyed");
        assert!(
            self.parent(id).is_none(),
            "node {id} must be detached before it is destroyed"
        );
        let count = self.free_subtree(id);
        debug!(node = %id, count, "Destroyed subtree");
    }

    fn free_subtree(&mut self, id: NodeId) -> usize {
        let children = self
            .slot_mut(id)
            .map(|slot| std::mem::take(&mut slot.children))
            .unwrap_or_default();
        let count = children
            .into_iter()
            .map(|child| self.free_subtree(child))
            .sum::<usize>();
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
        count + 1
    }

    // Runs after `node` gained a new ancestor chain.
    fn ancestor_did_change(&mut self, node: NodeId) {
        for id in self.subtree(node) {
            for (name, value) in self.attribute_pairs(id) {
                self.add_to_index(id, id, &name, &value);
            }
        }
    }

    // Runs while `node` is still reachable through its old ancestors.
    fn ancestor_will_change(&mut self, node: NodeId) {
        for id in self.subtree(node) {
            for (name, value) in self.attribute_pairs(id) {
                self.remove_from_index(id, id, &name, &value);
            }
        }
    }

    fn attribute_pairs(&self, id: NodeId) -> Vec<(String, String)> {
        self.attributes(id)
            .map(|attributes| {
                attributes
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn owning_index(&self, from: NodeId) -> Option<&AttributableIndex> {
        match self.node(self.root_of(from)?)? {
            NodeData::World(world) => Some(&world.index),
            _ => None,
        }
    }

    fn owning_index_mut(&mut self, from: NodeId) -> Option<&mut AttributableIndex> {
        let root = self.root_of(from)?;
        match &mut self.slot_mut(root)?.data {
            NodeData::World(world) => Some(&mut world.index),
            _ => None,
        }
    }

    /// Forward an index insertion from `from` to the world owning its tree.
    /// Detached trees have no world, so nothing happens.
    pub(crate) fn add_to_index(
        &mut self,
        from: NodeId,
        attributable: NodeId,
        name: &str,
        value: &str,
    ) {
        if let Some(index) = self.owning_index_mut(from) {
            index.add_attribute(attributable, name, value);
            trace!(node = %attributable, name, value, "Indexed attribute");
        }
    }

    pub(crate) fn remove_from_index(
        &mut self,
        from: NodeId,
        attributable: NodeId,
        name: &str,
        value: &str,
    ) {
        if let Some(index) = self.owning_index_mut(from) {
            index.remove_attribute(attributable, name, value);
            trace!(node = %attributable, name, value, "Unindexed attribute");
        }
    }

    /// Attributables in the tree of `from` with `name = value`.
    pub fn find_attributables_with_attribute(
        &self,
        from: NodeId,
        name: &str,
        value: &str,
    ) -> Vec<NodeId> {
        self.owning_index(from)
            .map(|index| index.find(NameQuery::Exact(name), value))
            .unwrap_or_default()
    }

    /// Attributables in the tree of `from` with `prefix[digits] = value`.
    pub fn find_attributables_with_numbered_attribute(
        &self,
        from: NodeId,
        prefix: &str,
        value: &str,
    ) -> Vec<NodeId> {
        self.owning_index(from)
            .map(|index| index.find(NameQuery::Numbered(prefix), value))
            .unwrap_or_default()
    }

    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.node(id).and_then(NodeData::attributes)
    }

    fn checked_attributes(&self, id: NodeId) -> Result<&Attributes, ModelError> {
        let data = self.node(id).ok_or(ModelError::NodeNotFound(id))?;
        data.attributes()
            .ok_or(ModelError::NotAttributable(id, data.kind()))
    }

    fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Attributes, ModelError> {
        let slot = self.slot_mut(id).ok_or(ModelError::NodeNotFound(id))?;
        let kind = slot.data.kind();
        slot.data
            .attributes_mut()
            .ok_or(ModelError::NotAttributable(id, kind))
    }

    fn check_world_policy(&self, id: NodeId, name: &str) -> Result<(), ModelError> {
        if id == self.world && !is_world_attribute_mutable(name) {
            return Err(ModelError::ImmutableAttribute(name.to_string()));
        }
        Ok(())
    }

    pub fn can_add_or_update_attribute(&self, id: NodeId, name: &str) -> Result<(), ModelError> {
        self.checked_attributes(id)?;
        self.check_world_policy(id, name)
    }

    pub fn can_rename_attribute(
        &self,
        id: NodeId,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), ModelError> {
        let attributes = self.checked_attributes(id)?;
        if !attributes.contains(old_name) {
            return Err(ModelError::AttributeNotFound(old_name.to_string()));
        }
        if old_name != new_name && attributes.contains(new_name) {
            return Err(ModelError::AttributeExists(new_name.to_string()));
        }
        self.check_world_policy(id, old_name)?;
        self.check_world_policy(id, new_name)
    }

    pub fn can_remove_attribute(&self, id: NodeId, name: &str) -> Result<(), ModelError> {
        let attributes = self.checked_attributes(id)?;
        if !attributes.contains(name) {
            return Err(ModelError::AttributeNotFound(name.to_string()));
        }
        self.check_world_policy(id, name)
    }

    /// Set `name = value`, returning the previous value.
    pub fn add_or_update_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<Option<String>, ModelError> {
        self.can_add_or_update_attribute(id, name)?;

        let previous = self
            .attributes(id)
            .and_then(|attributes| attributes.get(name))
            .map(str::to_string);
        if let Some(old_value) = &previous {
            self.remove_from_index(id, id, name, old_value);
        }
        self.attributes_mut(id)?.set(name, value);
        self.add_to_index(id, id, name, value);
        Ok(previous)
    }

    pub fn rename_attribute(
        &mut self,
        id: NodeId,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), ModelError> {
        self.can_rename_attribute(id, old_name, new_name)?;
        if old_name == new_name {
            return Ok(());
        }

        let value = self
            .attributes(id)
            .and_then(|attributes| attributes.get(old_name))
            .map(str::to_string)
            .ok_or_else(|| ModelError::AttributeNotFound(old_name.to_string()))?;
        self.remove_from_index(id, id, old_name, &value);
        self.attributes_mut(id)?.rename(old_name, new_name);
        self.add_to_index(id, id, new_name, &value);
        Ok(())
    }

    /// Remove `name`, returning its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<String, ModelError> {
        self.can_remove_attribute(id, name)?;

        let value = self
            .attributes_mut(id)?
            .remove(name)
            .ok_or_else(|| ModelError::AttributeNotFound(name.to_string()))?;
        self.remove_from_index(id, id, name, &value);
        Ok(value)
    }

    /// Replace the whole attribute list, returning the old one.
    ///
    /// On the world, reserved attributes must be identical in both lists.
    pub fn set_attributes(
        &mut self,
        id: NodeId,
        attributes: Attributes,
    ) -> Result<Attributes, ModelError> {
        let current = self.checked_attributes(id)?;
        if id == self.world {
            let changed_reserved = current
                .iter()
                .chain(attributes.iter())
                .map(|a| a.name.as_str())
                .find(|name| {
                    !is_world_attribute_mutable(name) && current.get(name) != attributes.get(name)
                });
            if let Some(name) = changed_reserved {
                return Err(ModelError::ImmutableAttribute(name.to_string()));
            }
        }

        for (name, value) in self.attribute_pairs(id) {
            self.remove_from_index(id, id, &name, &value);
        }
        let previous = std::mem::replace(self.attributes_mut(id)?, attributes);
        for (name, value) in self.attribute_pairs(id) {
            self.add_to_index(id, id, &name, &value);
        }
        Ok(previous)
    }

    pub fn brush(&self, id: NodeId) -> Option<&Brush> {
        self.node(id).and_then(NodeData::as_brush)
    }

    /// Swap in new geometry for a brush node, returning the old geometry.
    pub fn replace_brush(&mut self, id: NodeId, brush: Brush) -> Result<Brush, ModelError> {
        match self.slot_mut(id).map(|slot| &mut slot.data) {
            Some(NodeData::Brush(existing)) => Ok(std::mem::replace(existing, brush)),
            Some(_) => Err(ModelError::NotABrush(id)),
            None => Err(ModelError::NodeNotFound(id)),
        }
    }

    /// Bounds of a node: brushes use their geometry, containers the union of their children,
    /// point entities a fixed cube around their origin. Empty containers have no bounds.
    pub fn bounds(&self, id: NodeId) -> Option<BBox3> {
        match self.node(id)? {
            NodeData::Brush(brush) => Some(brush.bounds()),
            NodeData::Entity(entity) => self.children_bounds(id).or_else(|| {
                let origin = entity.attributes.origin().unwrap_or(DVec3::ZERO);
                Some(BBox3::from_center_size(
                    origin,
                    DVec3::splat(POINT_ENTITY_HALF_SIZE * 2.0),
                ))
            }),
            NodeData::World(_) | NodeData::Layer(_) | NodeData::Group(_) => {
                self.children_bounds(id)
            }
        }
    }

    fn children_bounds(&self, id: NodeId) -> Option<BBox3> {
        self.children(id)
            .iter()
            .filter_map(|&child| self.bounds(child))
            .reduce(|a, b| a.merge(&b))
    }
}
