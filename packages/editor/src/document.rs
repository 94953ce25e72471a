//! # Map Document
//!
//! A document owns one [`Map`], the world bounds every object must stay inside, and the
//! notification channels observers subscribe to.
//!
//! ## Design
//!
//! - Read queries are open to everyone (tools validate gestures with them)
//! - Mutation primitives are meant for commands; each one validates every target before
//!   touching anything, so a failed primitive leaves the document unchanged
//! - Every primitive brackets its change with before/after notifications
//! - Brackets nest: only the outermost one notifies

use crate::config::EditorConfig;
use crate::errors::CommandError;
use crate::notifier::{CommandNotification, DocumentNotifiers, NodeSet};
use glam::DVec3;
use quarry_model::{
    format_vec3, names, Attributes, BBox3, Brush, BrushFaceHandle, FaceDirection, Map,
    ModelError, NodeId, NodeKind,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Shared owner of a document, held by the edit session
pub type DocumentHandle = Rc<RefCell<MapDocument>>;

/// Non-owning reference held by commands
pub type DocumentRef = Weak<RefCell<MapDocument>>;

/// Where a node sat under its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent: NodeId,
    pub index: usize,
    pub node: NodeId,
}

/// Geometry and attributes captured before a change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub brushes: Vec<(NodeId, Brush)>,
    pub attributes: Vec<(NodeId, Attributes)>,
}

impl Snapshot {
    fn nodes(&self) -> Vec<NodeId> {
        self.brushes
            .iter()
            .map(|(id, _)| *id)
            .chain(self.attributes.iter().map(|(id, _)| *id))
            .collect()
    }
}

/// One attribute edit applied to a set of attributable nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeChange {
    Set { name: String, value: String },
    Rename { old_name: String, new_name: String },
    Remove { name: String },
}

#[derive(Debug)]
pub struct MapDocument {
    map: Map,
    world_bounds: BBox3,
    notifiers: DocumentNotifiers,
    change_depth: usize,
    pending_changes: BTreeSet<NodeId>,
}

impl MapDocument {
    /// Create an empty document: a World and its default layer
    pub fn new(config: &EditorConfig) -> Self {
        Self::from_map(
            Map::with_world(&config.default_layer_name, Attributes::new()),
            config,
        )
    }

    /// Wrap a map built elsewhere (e.g. by a loader)
    pub fn from_map(map: Map, config: &EditorConfig) -> Self {
        Self::with_world_bounds(map, config.world_bounds())
    }

    pub fn with_world_bounds(map: Map, world_bounds: BBox3) -> Self {
        Self {
            map,
            world_bounds,
            notifiers: DocumentNotifiers::default(),
            change_depth: 0,
            pending_changes: BTreeSet::new(),
        }
    }

    pub fn into_handle(self) -> DocumentHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Direct map access for bulk construction (loading, fixtures).
    ///
    /// Interactive edits go through commands so they can be undone and observed.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn world_bounds(&self) -> BBox3 {
        self.world_bounds
    }

    pub fn notifiers(&self) -> &DocumentNotifiers {
        &self.notifiers
    }

    pub fn notifiers_mut(&mut self) -> &mut DocumentNotifiers {
        &mut self.notifiers
    }

    pub fn find_attributables_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.map
            .find_attributables_with_attribute(self.map.world(), name, value)
    }

    pub fn find_attributables_with_numbered_attribute(
        &self,
        prefix: &str,
        value: &str,
    ) -> Vec<NodeId> {
        self.map
            .find_attributables_with_numbered_attribute(self.map.world(), prefix, value)
    }

    /// Nodes without bounds (empty groups) are trivially inside.
    pub fn is_within_world_bounds(&self, node: NodeId) -> bool {
        self.map
            .bounds(node)
            .map_or(true, |bounds| self.world_bounds.contains(&bounds))
    }

    /// Run `change` between `objects_will_change` and `objects_did_change`.
    ///
    /// Brushes bring their owning entity into the affected set. Inside another bracket no
    /// notification fires; the nodes join the outer bracket's did-change set instead.
    pub fn change_objects<R>(
        &mut self,
        nodes: &[NodeId],
        change: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let affected = self.with_owning_entities(nodes);
        let outermost = self.change_depth == 0;
        if outermost {
            let will_change = NodeSet::new(affected.iter().copied());
            self.notifiers
                .objects_will_change
                .notify(&self.map, &will_change);
        }

        self.pending_changes.extend(affected);
        self.change_depth += 1;
        let result = change(self);
        self.change_depth -= 1;

        if outermost {
            let changed = NodeSet::new(std::mem::take(&mut self.pending_changes));
            trace!(count = changed.len(), "Objects changed");
            self.notifiers.objects_did_change.notify(&self.map, &changed);
        }
        result
    }

    fn with_owning_entities(&self, nodes: &[NodeId]) -> BTreeSet<NodeId> {
        let mut affected = BTreeSet::new();
        for &node in nodes {
            affected.insert(node);
            if let Some(entity) = self.map.owning_entity(node) {
                affected.insert(entity);
            }
        }
        affected
    }

    /// Containers whose children change, plus everything above them.
    fn with_ancestors(&self, parents: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut affected = BTreeSet::new();
        for parent in parents {
            affected.extend(self.map.ancestors(parent));
            affected.insert(parent);
        }
        affected.into_iter().collect()
    }

    fn brush_of(&self, id: NodeId) -> Result<&Brush, ModelError> {
        if !self.map.is_alive(id) {
            return Err(ModelError::NodeNotFound(id));
        }
        self.map.brush(id).ok_or(ModelError::NotABrush(id))
    }

    fn swap_brushes(
        &mut self,
        brushes: Vec<(NodeId, Brush)>,
    ) -> Result<Vec<(NodeId, Brush)>, CommandError> {
        brushes
            .into_iter()
            .map(|(id, brush)| Ok((id, self.map.replace_brush(id, brush)?)))
            .collect()
    }

    /// Move the boundaries of `faces` by `delta`, returning the previous geometry of every
    /// touched brush.
    ///
    /// A brush named by several faces is resized once with all of them. If any brush
    /// rejects the move, nothing changes.
    pub fn resize_brushes(
        &mut self,
        faces: &[BrushFaceHandle],
        delta: DVec3,
        lock_textures: bool,
    ) -> Result<Vec<(NodeId, Brush)>, CommandError> {
        let mut by_brush: BTreeMap<NodeId, BTreeSet<FaceDirection>> = BTreeMap::new();
        for handle in faces {
            by_brush.entry(handle.brush).or_default().insert(handle.face);
        }

        let mut resized = Vec::with_capacity(by_brush.len());
        for (&id, directions) in &by_brush {
            let mut brush = self.brush_of(id)?.clone();
            for &direction in directions {
                brush.move_boundary(&self.world_bounds, direction, delta, lock_textures)?;
            }
            resized.push((id, brush));
        }

        let ids: Vec<NodeId> = by_brush.keys().copied().collect();
        let previous = self.change_objects(&ids, |doc| doc.swap_brushes(resized))?;
        debug!(brushes = ids.len(), ?delta, lock_textures, "Resized brushes");
        Ok(previous)
    }

    /// Translate every brush and point entity below `nodes` by `delta`.
    ///
    /// Point entities move through their `origin` attribute. Fails without changes if any
    /// object would leave the world bounds.
    pub fn translate_nodes(
        &mut self,
        nodes: &[NodeId],
        delta: DVec3,
        lock_textures: bool,
    ) -> Result<Snapshot, CommandError> {
        let mut brushes = BTreeSet::new();
        let mut point_entities = BTreeSet::new();
        for &node in nodes {
            if !self.map.is_alive(node) {
                return Err(ModelError::NodeNotFound(node).into());
            }
            for id in self.map.subtree(node) {
                match self.map.kind(id) {
                    Some(NodeKind::Brush) => {
                        brushes.insert(id);
                    }
                    Some(NodeKind::Entity) if self.map.is_point_entity(id) => {
                        point_entities.insert(id);
                    }
                    _ => {}
                }
            }
        }

        for &id in &brushes {
            if !self.brush_of(id)?.can_translate(&self.world_bounds, delta) {
                return Err(CommandError::OutOfWorldBounds(id));
            }
        }
        for &id in &point_entities {
            let moved = self.map.bounds(id).map(|bounds| bounds.translate(delta));
            if !moved.map_or(true, |bounds| self.world_bounds.contains(&bounds)) {
                return Err(CommandError::OutOfWorldBounds(id));
            }
        }

        let snapshot = Snapshot {
            brushes: brushes
                .iter()
                .map(|&id| Ok((id, self.brush_of(id)?.clone())))
                .collect::<Result<_, ModelError>>()?,
            attributes: point_entities
                .iter()
                .map(|&id| (id, self.map.attributes(id).cloned().unwrap_or_default()))
                .collect(),
        };

        let changed = snapshot.nodes();
        self.change_objects(&changed, |doc| -> Result<(), CommandError> {
            for &id in &brushes {
                let mut brush = doc.brush_of(id)?.clone();
                brush.translate(delta, lock_textures);
                doc.map.replace_brush(id, brush)?;
            }
            for &id in &point_entities {
                let origin = doc
                    .map
                    .attributes(id)
                    .and_then(Attributes::origin)
                    .unwrap_or(DVec3::ZERO);
                doc.map
                    .add_or_update_attribute(id, names::ORIGIN, &format_vec3(origin + delta))?;
            }
            Ok(())
        })?;

        debug!(
            brushes = brushes.len(),
            point_entities = point_entities.len(),
            ?delta,
            "Translated nodes"
        );
        Ok(snapshot)
    }

    /// Put back brush geometry captured earlier.
    pub fn restore_brushes(&mut self, brushes: &[(NodeId, Brush)]) -> Result<(), CommandError> {
        for (id, _) in brushes {
            self.brush_of(*id)?;
        }
        let ids: Vec<NodeId> = brushes.iter().map(|(id, _)| *id).collect();
        self.change_objects(&ids, |doc| doc.swap_brushes(brushes.to_vec()))?;
        Ok(())
    }

    /// Put back whole attribute lists captured earlier.
    pub fn restore_entity_attributes(
        &mut self,
        attributes: &[(NodeId, Attributes)],
    ) -> Result<(), CommandError> {
        for (id, _) in attributes {
            let data = self.map.node(*id).ok_or(ModelError::NodeNotFound(*id))?;
            if data.attributes().is_none() {
                return Err(ModelError::NotAttributable(*id, data.kind()).into());
            }
        }
        let ids: Vec<NodeId> = attributes.iter().map(|(id, _)| *id).collect();
        self.change_objects(&ids, |doc| -> Result<(), CommandError> {
            for (id, restored) in attributes {
                doc.map.set_attributes(*id, restored.clone())?;
            }
            Ok(())
        })
    }

    /// Restore brushes and attributes under a single notification bracket.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), CommandError> {
        let ids = snapshot.nodes();
        self.change_objects(&ids, |doc| {
            doc.restore_brushes(&snapshot.brushes)?;
            doc.restore_entity_attributes(&snapshot.attributes)
        })
    }

    /// Apply `change` to every node, returning their previous attribute lists.
    pub fn update_attributes(
        &mut self,
        nodes: &[NodeId],
        change: &AttributeChange,
    ) -> Result<Vec<(NodeId, Attributes)>, CommandError> {
        // Each node is validated against its current state, so each may be edited only once.
        let nodes: Vec<NodeId> = nodes
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for &node in &nodes {
            match change {
                AttributeChange::Set { name, .. } => {
                    self.map.can_add_or_update_attribute(node, name)?
                }
                AttributeChange::Rename { old_name, new_name } => {
                    self.map.can_rename_attribute(node, old_name, new_name)?
                }
                AttributeChange::Remove { name } => self.map.can_remove_attribute(node, name)?,
            }
        }

        let previous: Vec<(NodeId, Attributes)> = nodes
            .iter()
            .map(|&node| (node, self.map.attributes(node).cloned().unwrap_or_default()))
            .collect();

        self.change_objects(&nodes, |doc| -> Result<(), CommandError> {
            for &node in &nodes {
                match change {
                    AttributeChange::Set { name, value } => {
                        doc.map.add_or_update_attribute(node, name, value)?;
                    }
                    AttributeChange::Rename { old_name, new_name } => {
                        doc.map.rename_attribute(node, old_name, new_name)?;
                    }
                    AttributeChange::Remove { name } => {
                        doc.map.remove_attribute(node, name)?;
                    }
                }
            }
            Ok(())
        })?;

        debug!(nodes = nodes.len(), ?change, "Updated attributes");
        Ok(previous)
    }

    /// Attach detached nodes at the given positions.
    ///
    /// The receiving parents and their ancestors are reported as changed objects, since
    /// their bounds follow their children.
    pub fn attach_nodes(&mut self, placements: &[Placement]) -> Result<(), CommandError> {
        let attaching: BTreeSet<NodeId> = placements.iter().map(|p| p.node).collect();
        if attaching.len() != placements.len() {
            return Err(CommandError::Hierarchy("a node is listed twice".to_string()));
        }

        for placement in placements {
            let Placement { parent, node, .. } = *placement;
            if !self.map.is_alive(parent) {
                return Err(ModelError::NodeNotFound(parent).into());
            }
            if !self.map.is_alive(node) {
                return Err(ModelError::NodeNotFound(node).into());
            }
            if self.map.parent(node).is_some() {
                return Err(CommandError::Hierarchy(format!("node {node} already has a parent")));
            }
            if attaching.contains(&parent) || self.map.is_ancestor(node, parent) {
                return Err(CommandError::Hierarchy(format!(
                    "attaching {node} under {parent} would create a cycle"
                )));
            }
            if !self.map.can_add_child(parent, node) {
                return Err(CommandError::Hierarchy(format!(
                    "a {} cannot contain a {}",
                    kind_name(&self.map, parent),
                    kind_name(&self.map, node),
                )));
            }
        }

        let parents = self.with_ancestors(placements.iter().map(|p| p.parent));
        let added = NodeSet::new(attaching);
        self.change_objects(&parents, |doc| {
            for placement in placements {
                doc.map
                    .insert_child(placement.parent, placement.index, placement.node);
            }
            debug!(count = added.len(), "Attached nodes");
            doc.notifiers.nodes_were_added.notify(&doc.map, &added);
        });
        Ok(())
    }

    /// Detach `nodes`, returning where each one sat, in detach order.
    ///
    /// Nodes whose ancestor is also listed go along with that ancestor. The former parents
    /// and their ancestors are reported as changed objects.
    pub fn detach_nodes(&mut self, nodes: &[NodeId]) -> Result<Vec<Placement>, CommandError> {
        let requested: BTreeSet<NodeId> = nodes.iter().copied().collect();
        let mut seen = BTreeSet::new();
        let mut roots = Vec::new();

        for &node in nodes {
            if !self.map.is_alive(node) {
                return Err(ModelError::NodeNotFound(node).into());
            }
            if !seen.insert(node) {
                continue;
            }
            if self
                .map
                .ancestors(node)
                .iter()
                .any(|ancestor| requested.contains(ancestor))
            {
                continue;
            }
            let parent = self
                .map
                .parent(node)
                .ok_or_else(|| CommandError::Hierarchy(format!("node {node} is not attached")))?;
            if !self.map.can_remove_child(parent, node) {
                return Err(CommandError::Hierarchy(format!(
                    "{} {parent} cannot release {node}",
                    kind_name(&self.map, parent)
                )));
            }
            roots.push((parent, node));
        }

        let parents = self.with_ancestors(roots.iter().map(|(parent, _)| *parent));
        let removing = NodeSet::new(roots.iter().map(|(_, node)| *node));
        let placements = self.change_objects(&parents, |doc| {
            doc.notifiers
                .nodes_will_be_removed
                .notify(&doc.map, &removing);

            let placements: Vec<Placement> = roots
                .into_iter()
                .map(|(parent, node)| Placement {
                    parent,
                    index: doc.map.remove_child(parent, node),
                    node,
                })
                .collect();

            debug!(count = placements.len(), "Detached nodes");
            doc.notifiers.nodes_were_removed.notify(&doc.map, &removing);
            placements
        });
        Ok(placements)
    }

    pub fn notify_command_done(&mut self, notification: &CommandNotification) {
        self.notifiers.command_done.notify(&self.map, notification);
    }

    pub fn notify_command_undone(&mut self, notification: &CommandNotification) {
        self.notifiers.command_undone.notify(&self.map, notification);
    }
}

fn kind_name(map: &Map, node: NodeId) -> &'static str {
    map.kind(node).map_or("stale node", NodeKind::name)
}
