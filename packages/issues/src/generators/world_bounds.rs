use crate::generators::IssueGenerator;
use crate::issue::Issue;
use crate::quick_fix::{DeleteObjectsQuickFix, IssueQuickFix};
use quarry_editor::EditorConfig;
use quarry_model::{BBox3, Map, NodeId};

/// Flags entities and brushes that stick out of the world bounds
#[derive(Debug, Clone)]
pub struct WorldBoundsIssueGenerator {
    bounds: BBox3,
}

impl WorldBoundsIssueGenerator {
    pub const NAME: &'static str = "world-bounds";

    pub fn new(bounds: BBox3) -> Self {
        Self { bounds }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.world_bounds())
    }

    fn check(&self, map: &Map, node: NodeId) -> Vec<Issue> {
        match map.bounds(node) {
            Some(bounds) if !self.bounds.contains(&bounds) => {
                vec![Issue::new(node, Self::NAME, "Object is out of world bounds")]
            }
            _ => Vec::new(),
        }
    }
}

impl IssueGenerator for WorldBoundsIssueGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Objects out of world bounds"
    }

    fn generate_for_entity(&self, map: &Map, entity: NodeId) -> Vec<Issue> {
        self.check(map, entity)
    }

    fn generate_for_brush(&self, map: &Map, brush: NodeId) -> Vec<Issue> {
        self.check(map, brush)
    }

    fn quick_fixes(&self) -> Vec<Box<dyn IssueQuickFix>> {
        vec![Box::new(DeleteObjectsQuickFix)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use quarry_model::{Attributes, Brush};

    #[test]
    fn test_flags_brush_outside_bounds() {
        let mut map = Map::new();
        let layer = map.default_layer();
        let inside = map.create_brush(Brush::cuboid(
            BBox3::new(DVec3::ZERO, DVec3::splat(32.0)),
            "a",
        ));
        let outside = map.create_brush(Brush::cuboid(
            BBox3::new(DVec3::splat(48.0), DVec3::splat(80.0)),
            "b",
        ));
        map.add_child(layer, inside);
        map.add_child(layer, outside);

        let generator = WorldBoundsIssueGenerator::new(BBox3::cube(64.0));
        assert!(generator.generate_for_brush(&map, inside).is_empty());

        let issues = generator.generate_for_brush(&map, outside);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node, outside);
        assert_eq!(issues[0].generator, "world-bounds");
        assert_eq!(issues[0].description, "Object is out of world bounds");
    }

    #[test]
    fn test_point_entity_uses_origin_box() {
        let mut map = Map::new();
        let layer = map.default_layer();
        let edge = map.create_entity(Attributes::from_pairs([
            ("classname", "light"),
            ("origin", "60 0 0"),
        ]));
        map.add_child(layer, edge);

        let generator = WorldBoundsIssueGenerator::new(BBox3::cube(64.0));
        assert_eq!(generator.generate_for_entity(&map, edge).len(), 1);
    }

    #[test]
    fn test_offers_delete_fix() {
        let generator = WorldBoundsIssueGenerator::from_config(&EditorConfig::default());
        let names: Vec<_> = generator.quick_fixes().iter().map(|fix| fix.name()).collect();
        assert_eq!(names, vec!["Delete objects"]);
    }
}
