//! Integration tests for the editor crate
//!
//! This tests:
//! - Resizing with undo/redo and notifications
//! - Rejected commands leave no trace in document or history
//! - Collation of successive compatible commands
//! - Closed documents
//! - Do followed by undo restores every command's state
//! - Groups, repeat and history limits through a session

mod common;

use common::{attribute, bounds, fixture, Fixture};
use glam::DVec3;
use quarry_editor::{
    AddRemoveNodesCommand, CommandError, CommandKind, CommandOutcome, CommandProcessor,
    EditSession, EditorConfig, EntityAttributeCommand, MoveObjectsCommand, NodeSet,
    ResizeBrushesCommand,
};
use quarry_model::{Attributes, BrushFaceHandle, FaceDirection, ModelError, NodeId};
use std::cell::RefCell;
use std::rc::Rc;

fn top_face(brush: NodeId) -> BrushFaceHandle {
    BrushFaceHandle::new(brush, FaceDirection::PosZ)
}

#[test]
fn test_resize_undo_redo() {
    let Fixture {
        document,
        entity,
        brush,
        ..
    } = fixture();

    let changed: Rc<RefCell<Vec<Vec<NodeId>>>> = Rc::default();
    {
        let log = changed.clone();
        document
            .borrow_mut()
            .notifiers_mut()
            .objects_did_change
            .add_observer(move |_, nodes: &NodeSet| {
                log.borrow_mut().push(nodes.nodes.clone())
            });
    }

    let mut processor = CommandProcessor::new();
    let command = ResizeBrushesCommand::resize_brushes(
        &document,
        [top_face(brush)],
        DVec3::new(0.0, 0.0, 8.0),
        true,
    );
    assert_eq!(processor.execute(command), Ok(CommandOutcome::Executed));
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(72.0));
    assert_eq!(processor.undo_name(), Some("Resize Brush"));

    // The owning entity is reported along with the brush.
    let mut expected = vec![entity, brush];
    expected.sort();
    assert_eq!(*changed.borrow(), vec![expected.clone()]);

    assert_eq!(processor.undo().unwrap(), "Resize Brush");
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(64.0));

    assert_eq!(processor.redo().unwrap(), "Resize Brush");
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(72.0));
    assert_eq!(changed.borrow().len(), 3);
}

#[test]
fn test_world_rejects_brush_child() {
    let Fixture { document, .. } = fixture();
    let (world, loose) = {
        let mut doc = document.borrow_mut();
        let map = doc.map_mut();
        let loose = map.create_brush(quarry_model::Brush::cuboid(
            quarry_model::BBox3::cube(8.0),
            "base/crate",
        ));
        (map.world(), loose)
    };

    let mut processor = CommandProcessor::new();
    let result = processor.execute(AddRemoveNodesCommand::add_nodes(&document, world, [loose]));

    assert!(matches!(result, Err(CommandError::Hierarchy(_))));
    assert!(!processor.can_undo());
    let doc = document.borrow();
    assert!(doc.map().is_alive(loose));
    assert_eq!(doc.map().parent(loose), None);
}

#[test]
fn test_out_of_bounds_leaves_no_history() {
    let Fixture {
        document,
        entity,
        brush,
        ..
    } = fixture();
    let before = document.borrow().map().brush(brush).cloned();
    let mut processor = CommandProcessor::new();

    let resize = ResizeBrushesCommand::resize_brushes(
        &document,
        [top_face(brush)],
        DVec3::new(0.0, 0.0, 2000.0),
        false,
    );
    assert!(matches!(
        processor.execute(resize),
        Err(CommandError::Model(ModelError::BoundaryRejected(_)))
    ));

    let moved =
        MoveObjectsCommand::move_objects(&document, [entity], DVec3::new(1000.0, 0.0, 0.0), false);
    assert_eq!(processor.execute(moved), Err(CommandError::OutOfWorldBounds(brush)));

    assert_eq!(processor.undo_levels(), 0);
    assert_eq!(document.borrow().map().brush(brush).cloned(), before);
}

#[test]
fn test_two_faces_out_of_bounds_leave_no_history() {
    let Fixture { document, brush, .. } = fixture();
    let before = document.borrow().map().brush(brush).cloned();
    let mut processor = CommandProcessor::new();

    let faces = [top_face(brush), BrushFaceHandle::new(brush, FaceDirection::PosX)];
    let delta = DVec3::new(1000.0, 0.0, 1000.0);
    let resize = ResizeBrushesCommand::resize_brushes(&document, faces, delta, true);
    assert!(matches!(
        processor.execute(resize),
        Err(CommandError::Model(ModelError::BoundaryRejected(_)))
    ));

    assert_eq!(processor.undo_levels(), 0);
    assert_eq!(document.borrow().map().brush(brush).cloned(), before);
}

#[test]
fn test_successive_resizes_collate() {
    let Fixture { document, brush, .. } = fixture();
    let mut processor = CommandProcessor::new();

    for dz in [8.0, 4.0] {
        processor
            .execute(ResizeBrushesCommand::resize_brushes(
                &document,
                [top_face(brush)],
                DVec3::new(0.0, 0.0, dz),
                true,
            ))
            .unwrap();
    }
    assert_eq!(processor.undo_levels(), 1);
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(76.0));

    processor.undo().unwrap();
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(64.0));

    processor.redo().unwrap();
    assert_eq!(bounds(&document, brush).map(|b| b.max.z), Some(76.0));
}

#[test]
fn test_different_lock_flag_does_not_collate() {
    let Fixture { document, brush, .. } = fixture();
    let mut processor = CommandProcessor::new();

    let nudge = |lock_textures| {
        ResizeBrushesCommand::resize_brushes(&document, [top_face(brush)], DVec3::Z, lock_textures)
    };
    processor.execute(nudge(true)).unwrap();
    let outcome = processor.execute(nudge(false)).unwrap();

    assert_eq!(outcome, CommandOutcome::Executed);
    assert_eq!(processor.undo_levels(), 2);
}

#[test]
fn test_closed_document() {
    let Fixture { document, brush, .. } = fixture();
    let mut processor = CommandProcessor::new();

    let nudge = || {
        ResizeBrushesCommand::resize_brushes(&document, [top_face(brush)], DVec3::Z, false)
    };
    processor.execute(nudge()).unwrap();
    let pending = nudge();
    drop(document);

    assert_eq!(processor.execute(pending), Err(CommandError::DocumentClosed));
    assert_eq!(processor.undo(), Err(CommandError::DocumentClosed));
    assert_eq!(processor.undo_levels(), 1);
}

#[test]
fn test_do_then_undo_restores_state() {
    let Fixture {
        document,
        layer,
        entity,
        brush,
    } = fixture();
    let snapshot = |document: &quarry_editor::DocumentHandle| {
        let doc = document.borrow();
        let map = doc.map();
        (
            map.brush(brush).cloned(),
            map.attributes(entity).cloned(),
            map.children(layer).to_vec(),
            doc.find_attributables_with_attribute("targetname", "door1"),
        )
    };
    let before = snapshot(&document);

    let commands: Vec<quarry_editor::Command> = vec![
        ResizeBrushesCommand::resize_brushes(
            &document,
            [top_face(brush)],
            DVec3::new(0.0, 0.0, -16.0),
            true,
        )
        .into(),
        MoveObjectsCommand::move_objects(&document, [entity], DVec3::new(32.0, 0.0, 0.0), true)
            .into(),
        EntityAttributeCommand::set_attribute(&document, [entity], "speed", "200").into(),
        EntityAttributeCommand::rename_attribute(&document, [entity], "targetname", "name").into(),
        EntityAttributeCommand::remove_attribute(&document, [entity], "targetname").into(),
        AddRemoveNodesCommand::remove_nodes(&document, [entity]).into(),
    ];

    for mut command in commands {
        command.perform_do().unwrap();
        assert_ne!(snapshot(&document), before, "{} changed nothing", command.name());
        command.perform_undo().unwrap();
        assert_eq!(snapshot(&document), before, "{} did not undo", command.name());
    }
}

#[test]
fn test_remove_and_undo_reindexes() {
    let Fixture {
        document, entity, ..
    } = fixture();
    let mut processor = CommandProcessor::new();

    processor
        .execute(AddRemoveNodesCommand::remove_nodes(&document, [entity]))
        .unwrap();
    assert!(document
        .borrow()
        .find_attributables_with_attribute("targetname", "door1")
        .is_empty());

    processor.undo().unwrap();
    assert_eq!(
        document
            .borrow()
            .find_attributables_with_attribute("targetname", "door1"),
        vec![entity]
    );

    // Redo then drop the history: the processor owned the detached subtree.
    processor.redo().unwrap();
    processor.clear();
    assert!(!document.borrow().map().is_alive(entity));
}

#[test]
fn test_command_notifications() {
    let Fixture { document, entity, .. } = fixture();
    let log: Rc<RefCell<Vec<(&'static str, CommandKind, String)>>> = Rc::default();
    {
        let mut doc = document.borrow_mut();
        let notifiers = doc.notifiers_mut();
        let done = log.clone();
        notifiers.command_done.add_observer(move |_, n| {
            done.borrow_mut().push(("done", n.kind, n.name.clone()));
        });
        let undone = log.clone();
        notifiers.command_undone.add_observer(move |_, n| {
            undone.borrow_mut().push(("undone", n.kind, n.name.clone()));
        });
    }

    let mut processor = CommandProcessor::new();
    processor
        .execute(EntityAttributeCommand::set_attribute(&document, [entity], "wait", "2"))
        .unwrap();
    processor.undo().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("done", CommandKind::EntityAttribute, "Set Attribute".to_string()),
            ("undone", CommandKind::EntityAttribute, "Set Attribute".to_string()),
        ]
    );
}

#[test]
fn test_session_group_repeat_and_limits() {
    let Fixture {
        document,
        layer,
        entity,
        ..
    } = fixture();
    let config = EditorConfig {
        max_undo_levels: 2,
        ..EditorConfig::default()
    };
    let light = {
        let mut doc = document.borrow_mut();
        let map = doc.map_mut();
        let light = map.create_entity(Attributes::from_pairs([
            ("classname", "light"),
            ("origin", "0 0 0"),
        ]));
        map.add_child(layer, light);
        light
    };
    let mut session = EditSession::new("local", document.clone(), &config);

    session.processor_mut().begin_group("Configure Door");
    session
        .execute(EntityAttributeCommand::set_attribute(&document, [entity], "speed", "100"))
        .unwrap();
    session
        .execute(EntityAttributeCommand::set_attribute(&document, [entity], "wait", "-1"))
        .unwrap();
    session.processor_mut().end_group().unwrap();
    assert_eq!(session.processor().undo_levels(), 1);

    let lift = DVec3::new(0.0, 16.0, 0.0);
    session
        .execute(MoveObjectsCommand::move_objects(&document, [entity], lift, false))
        .unwrap();
    session.select([light]);
    session.repeat_last().unwrap();
    assert_eq!(attribute(&document, light, "origin").as_deref(), Some("0 16 0"));

    // The group fell off the bottom of the history.
    assert_eq!(session.processor().undo_levels(), 2);
    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.undo(), Err(CommandError::NothingToUndo));
    assert_eq!(attribute(&document, entity, "speed").as_deref(), Some("100"));
    assert_eq!(attribute(&document, light, "origin").as_deref(), Some("0 0 0"));
}
