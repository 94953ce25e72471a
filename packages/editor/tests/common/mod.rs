//! Shared fixtures for editor integration tests

use glam::DVec3;
use quarry_editor::{DocumentHandle, MapDocument};
use quarry_model::{Attributes, BBox3, Brush, Map, NodeId};

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// World ─ L1 ─ E1 ─ B1, with B1 spanning 0..64 on every axis
pub struct Fixture {
    pub document: DocumentHandle,
    pub layer: NodeId,
    pub entity: NodeId,
    pub brush: NodeId,
}

pub fn fixture() -> Fixture {
    init_tracing();

    let mut map = Map::new();
    let layer = map.create_layer("L1");
    let entity = map.create_entity(Attributes::from_pairs([
        ("classname", "func_door"),
        ("targetname", "door1"),
    ]));
    let brush = map.create_brush(Brush::cuboid(
        BBox3::new(DVec3::ZERO, DVec3::splat(64.0)),
        "base/door",
    ));
    let world = map.world();
    map.add_child(world, layer);
    map.add_child(layer, entity);
    map.add_child(entity, brush);

    Fixture {
        document: MapDocument::with_world_bounds(map, BBox3::cube(1024.0)).into_handle(),
        layer,
        entity,
        brush,
    }
}

pub fn bounds(document: &DocumentHandle, node: NodeId) -> Option<BBox3> {
    document.borrow().map().bounds(node)
}

pub fn attribute(document: &DocumentHandle, node: NodeId, name: &str) -> Option<String> {
    document
        .borrow()
        .map()
        .attributes(node)
        .and_then(|attributes| attributes.get(name))
        .map(str::to_string)
}
