use crate::command::with_document;
use crate::document::{AttributeChange, DocumentHandle, DocumentRef};
use crate::errors::CommandError;
use quarry_model::{Attributes, NodeId};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Sets, renames or removes one attribute on a set of entities (or the world).
#[derive(Debug)]
pub struct EntityAttributeCommand {
    document: DocumentRef,
    name: String,
    nodes: Vec<NodeId>,
    change: AttributeChange,
    previous: Option<Vec<(NodeId, Attributes)>>,
}

impl EntityAttributeCommand {
    fn new(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
        change: AttributeChange,
    ) -> Self {
        let name = match &change {
            AttributeChange::Set { .. } => "Set Attribute",
            AttributeChange::Rename { .. } => "Rename Attribute",
            AttributeChange::Remove { .. } => "Remove Attribute",
        };
        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        Self {
            document: Rc::downgrade(document),
            name: name.to_string(),
            nodes: nodes.into_iter().collect(),
            change,
            previous: None,
        }
    }

    pub fn set_attribute(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            document,
            nodes,
            AttributeChange::Set {
                name: name.into(),
                value: value.into(),
            },
        )
    }

    pub fn rename_attribute(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::new(
            document,
            nodes,
            AttributeChange::Rename {
                old_name: old_name.into(),
                new_name: new_name.into(),
            },
        )
    }

    pub fn remove_attribute(
        document: &DocumentHandle,
        nodes: impl IntoIterator<Item = NodeId>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(document, nodes, AttributeChange::Remove { name: name.into() })
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

    pub fn change(&self) -> &AttributeChange {
        &self.change
    }

    pub(crate) fn perform_do(&mut self) -> Result<(), CommandError> {
        let previous = with_document(&self.document, |doc| {
            doc.update_attributes(&self.nodes, &self.change)
        })?;
        self.previous = Some(previous);
        Ok(())
    }

    pub(crate) fn perform_undo(&mut self) -> Result<(), CommandError> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| CommandError::NotExecuted(self.name.clone()))?;
        with_document(&self.document, |doc| doc.restore_entity_attributes(previous))?;
        self.previous = None;
        Ok(())
    }

    /// Successive sets of the same attribute on the same nodes: the last value wins.
    pub(crate) fn collate_with(&mut self, other: &EntityAttributeCommand) -> bool {
        if self.nodes != other.nodes {
            return false;
        }
        match (&mut self.change, &other.change) {
            (
                AttributeChange::Set { name, value },
                AttributeChange::Set {
                    name: other_name,
                    value: other_value,
                },
            ) if *name == *other_name => {
                value.clone_from(other_value);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn repeat(
        &self,
        document: &DocumentHandle,
        selection: &[NodeId],
    ) -> EntityAttributeCommand {
        EntityAttributeCommand::new(document, selection.iter().copied(), self.change.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MapDocument;
    use quarry_model::{BBox3, Map, ModelError};

    fn setup() -> (DocumentHandle, NodeId, NodeId) {
        let handle = MapDocument::with_world_bounds(Map::new(), BBox3::cube(1024.0)).into_handle();
        let (button, door) = {
            let mut doc = handle.borrow_mut();
            let map = doc.map_mut();
            let layer = map.default_layer();
            let button = map.create_entity(Attributes::from_pairs([
                ("classname", "func_button"),
                ("target", "d1"),
            ]));
            let door = map.create_entity(Attributes::from_pairs([
                ("classname", "func_door"),
                ("targetname", "d1"),
            ]));
            map.add_child(layer, button);
            map.add_child(layer, door);
            (button, door)
        };
        (handle, button, door)
    }

    #[test]
    fn test_rename_updates_index_and_undo_restores() {
        let (handle, button, _) = setup();
        let mut command =
            EntityAttributeCommand::rename_attribute(&handle, [button], "target", "killtarget");
        command.perform_do().unwrap();
        {
            let doc = handle.borrow();
            assert!(doc.find_attributables_with_attribute("target", "d1").is_empty());
            assert_eq!(doc.find_attributables_with_attribute("killtarget", "d1"), vec![button]);
        }

        command.perform_undo().unwrap();
        let doc = handle.borrow();
        assert_eq!(doc.find_attributables_with_attribute("target", "d1"), vec![button]);
        assert!(doc.find_attributables_with_attribute("killtarget", "d1").is_empty());
    }

    #[test]
    fn test_world_policy_rejects_whole_command() {
        let (handle, button, _) = setup();
        let world = handle.borrow().map().world();
        let mut command =
            EntityAttributeCommand::remove_attribute(&handle, [button, world], "classname");

        let result = command.perform_do();
        assert_eq!(
            result,
            Err(CommandError::Model(ModelError::ImmutableAttribute("classname".to_string())))
        );
        let doc = handle.borrow();
        assert_eq!(doc.map().attributes(button).and_then(|a| a.classname()), Some("func_button"));
    }

    #[test]
    fn test_set_collation() {
        let (handle, button, door) = setup();
        let mut first = EntityAttributeCommand::set_attribute(&handle, [button], "wait", "1");
        let second = EntityAttributeCommand::set_attribute(&handle, [button], "wait", "2");
        let other_name = EntityAttributeCommand::set_attribute(&handle, [button], "speed", "2");
        let other_nodes =
            EntityAttributeCommand::set_attribute(&handle, [button, door], "wait", "3");
        let rename = EntityAttributeCommand::rename_attribute(&handle, [button], "wait", "delay");

        assert!(first.collate_with(&second));
        assert_eq!(
            first.change(),
            &AttributeChange::Set {
                name: "wait".to_string(),
                value: "2".to_string()
            }
        );
        assert!(!first.collate_with(&other_name));
        assert!(!first.collate_with(&other_nodes));
        assert!(!first.collate_with(&rename));
    }
}
