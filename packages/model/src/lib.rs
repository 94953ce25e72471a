//! # Quarry Model
//!
//! Scene graph for the Quarry level editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ World (root, owns the attribute index)      │
//! │  └─ Layer (default layer always present)    │
//! │      ├─ Group ─┬─ Group ...                 │
//! │      │         └─ Entity ─ Brush            │
//! │      ├─ Entity ─ Brush                      │
//! │      └─ Brush                               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single ownership**: every node lives in one [`Map`] arena and has at most one parent
//! 2. **Closed variants**: acceptance rules are an exhaustive match over [`NodeKind`]
//! 3. **Index follows attachment**: attributes are indexed while their node is reachable
//!    from the World, and only then
//! 4. **Handles, not pointers**: parent links are [`NodeId`]s and never own anything
//!
//! ## Usage
//!
//! ```rust
//! use quarry_model::{Attributes, BBox3, Brush, Map};
//! use glam::DVec3;
//!
//! let mut map = Map::new();
//! let layer = map.default_layer();
//! let entity = map.create_entity(Attributes::from_pairs([("classname", "func_door")]));
//! let brush = map.create_brush(Brush::cuboid(
//!     BBox3::new(DVec3::ZERO, DVec3::splat(64.0)),
//!     "base/wall",
//! ));
//!
//! map.add_child(layer, entity);
//! map.add_child(entity, brush);
//!
//! let doors = map.find_attributables_with_attribute(brush, "classname", "func_door");
//! assert_eq!(doors, vec![entity]);
//! ```

mod attributes;
mod bbox;
mod brush;
mod error;
mod index;
mod map;
mod node;
mod types;
mod visitor;

pub use attributes::{
    format_vec3, is_world_attribute_mutable, names, parse_vec3, Attribute, AttributeName,
    AttributeValue, Attributes, WORLDSPAWN,
};
pub use bbox::BBox3;
pub use brush::{
    Brush, BrushFace, BrushFaceHandle, FaceDirection, TextureAttributes, MIN_BRUSH_THICKNESS,
    NO_TEXTURE,
};
pub use error::ModelError;
pub use index::{AttributableIndex, NameQuery};
pub use map::{Map, DEFAULT_LAYER_NAME, POINT_ENTITY_HALF_SIZE};
pub use node::{Entity, Group, Layer, NodeData, World};
pub use types::{NodeId, NodeKind};
pub use visitor::{walk_children, NodeVisitor};
