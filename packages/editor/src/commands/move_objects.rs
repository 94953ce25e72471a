use crate::command::with_document;
use crate::document::{DocumentHandle, DocumentRef, Snapshot};
use crate::errors::CommandError;
use glam::DVec3;
use quarry_model::NodeId;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Translates nodes (and everything below them) by one delta.
#[derive(Debug)]
pub struct MoveObjectsCommand {
    document: DocumentRef,
    name: String,
    nodes: Vec<NodeId>,
    delta: DVec3,
    lock_textures: bool,
    snapshot: Option<Snapshot>,
}

impl MoveObjectsCommand {
    pub fn move_objects(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
        delta: DVec3,
        lock_textures: bool,
    ) -> Self {
        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        Self {
            document: Rc::downgrade(document),
            name: "Move Objects".to_string(),
            nodes: nodes.into_iter().collect(),
            delta,
            lock_textures,
            snapshot: None,
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

    pub fn delta(&self) -> DVec3 {
        self.delta
    }

    pub(crate) fn perform_do(&mut self) -> Result<(), CommandError> {
        let snapshot = with_document(&self.document, |doc| {
            doc.translate_nodes(&self.nodes, self.delta, self.lock_textures)
        })?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub(crate) fn perform_undo(&mut self) -> Result<(), CommandError> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| CommandError::NotExecuted(self.name.clone()))?;
        with_document(&self.document, |doc| doc.restore_snapshot(snapshot))?;
        self.snapshot = None;
        Ok(())
    }

    pub(crate) fn collate_with(&mut self, other: &MoveObjectsCommand) -> bool {
        if self.lock_textures != other.lock_textures || self.nodes != other.nodes {
            return false;
        }
        self.delta += other.delta;
        true
    }

    pub(crate) fn repeat(
        &self,
        document: &DocumentHandle,
        selection: &[NodeId],
    ) -> MoveObjectsCommand {
        MoveObjectsCommand::move_objects(
            document,
            selection.iter().copied(),
            self.delta,
            self.lock_textures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MapDocument;
    use quarry_model::{Attributes, BBox3, Brush, Map};

    #[test]
    fn test_move_group_and_undo() {
        let handle = MapDocument::with_world_bounds(Map::new(), BBox3::cube(512.0)).into_handle();
        let (group, brush, light) = {
            let mut doc = handle.borrow_mut();
            let map = doc.map_mut();
            let layer = map.default_layer();
            let group = map.create_group("room");
            let brush = map.create_brush(Brush::cuboid(
                BBox3::new(DVec3::ZERO, DVec3::splat(32.0)),
                "floor",
            ));
            let light = map.create_entity(Attributes::from_pairs([
                ("classname", "light"),
                ("origin", "8 8 40"),
            ]));
            map.add_child(group, brush);
            map.add_child(group, light);
            map.add_child(layer, group);
            (group, brush, light)
        };

        let mut command =
            MoveObjectsCommand::move_objects(&handle, [group], DVec3::new(0.0, 64.0, 0.0), false);
        command.perform_do().unwrap();
        {
            let doc = handle.borrow();
            assert_eq!(doc.map().bounds(brush).map(|b| b.min.y), Some(64.0));
            assert_eq!(doc.map().attributes(light).and_then(|a| a.get("origin")), Some("8 72 40"));
        }

        command.perform_undo().unwrap();
        let doc = handle.borrow();
        assert_eq!(doc.map().bounds(brush).map(|b| b.min.y), Some(0.0));
        assert_eq!(doc.map().attributes(light).and_then(|a| a.get("origin")), Some("8 8 40"));
    }

    #[test]
    fn test_repeat_targets_new_selection() {
        let handle = MapDocument::with_world_bounds(Map::new(), BBox3::cube(512.0)).into_handle();
        let (a, b) = {
            let mut doc = handle.borrow_mut();
            let map = doc.map_mut();
            (map.create_group("a"), map.create_group("b"))
        };
        let command = MoveObjectsCommand::move_objects(&handle, [a], DVec3::X, true);
        let repeated = command.repeat(&handle, &[b]);
        assert_eq!(repeated.nodes(), &[b]);
        assert_eq!(repeated.delta(), DVec3::X);
        assert!(repeated.lock_textures);
    }
}
