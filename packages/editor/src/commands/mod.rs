mod add_remove_nodes;
mod entity_attribute;
mod move_objects;
mod resize_brushes;

pub use add_remove_nodes::AddRemoveNodesCommand;
pub use entity_attribute::EntityAttributeCommand;
pub use move_objects::MoveObjectsCommand;
pub use resize_brushes::ResizeBrushesCommand;
