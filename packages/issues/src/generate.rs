use crate::generators::GeneratorRegistry;
use crate::issue::Issue;
use quarry_model::{walk_children, Brush, Entity, Map, NodeId, NodeKind, NodeVisitor};

/// Run every generator over the whole tree below the World
pub fn generate_issues(map: &Map, registry: &GeneratorRegistry) -> Vec<Issue> {
    let mut collector = IssueCollector {
        registry,
        issues: Vec::new(),
    };
    map.accept(map.world(), &mut collector);
    collector.issues
}

/// Issues of a single node. Containers and detached nodes have none.
pub fn generate_for_node(map: &Map, node: NodeId, registry: &GeneratorRegistry) -> Vec<Issue> {
    if !map.is_attached(node) {
        return Vec::new();
    }
    match map.kind(node) {
        Some(NodeKind::Entity) => registry
            .generators()
            .iter()
            .flat_map(|generator| generator.generate_for_entity(map, node))
            .collect(),
        Some(NodeKind::Brush) => registry
            .generators()
            .iter()
            .flat_map(|generator| generator.generate_for_brush(map, node))
            .collect(),
        _ => Vec::new(),
    }
}

struct IssueCollector<'a> {
    registry: &'a GeneratorRegistry,
    issues: Vec<Issue>,
}

impl NodeVisitor for IssueCollector<'_> {
    fn visit_entity(&mut self, map: &Map, id: NodeId, _entity: &Entity) {
        for generator in self.registry.generators() {
            self.issues.extend(generator.generate_for_entity(map, id));
        }
        walk_children(self, map, id);
    }

    fn visit_brush(&mut self, map: &Map, id: NodeId, _brush: &Brush) {
        for generator in self.registry.generators() {
            self.issues.extend(generator.generate_for_brush(map, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use quarry_model::{Attributes, BBox3};

    fn far_brush() -> Brush {
        Brush::cuboid(BBox3::new(DVec3::splat(100.0), DVec3::splat(200.0)), "w")
    }

    #[test]
    fn test_generates_for_entities_and_brushes() {
        let mut map = Map::new();
        let layer = map.default_layer();
        let group = map.create_group("far");
        let entity = map.create_entity(Attributes::from_pairs([("classname", "func_wall")]));
        let brush = map.create_brush(far_brush());
        map.add_child(layer, group);
        map.add_child(group, entity);
        map.add_child(entity, brush);

        let registry = GeneratorRegistry::new(BBox3::cube(128.0));
        let nodes: Vec<NodeId> = generate_issues(&map, &registry)
            .into_iter()
            .map(|issue| issue.node)
            .collect();
        assert_eq!(nodes, vec![entity, brush]);
    }

    #[test]
    fn test_detached_node_has_no_issues() {
        let mut map = Map::new();
        let brush = map.create_brush(far_brush());
        let registry = GeneratorRegistry::new(BBox3::cube(128.0));
        assert!(generate_for_node(&map, brush, &registry).is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let map = Map::new();
        let registry = GeneratorRegistry::empty();
        assert!(generate_issues(&map, &registry).is_empty());
        assert_eq!(format!("{registry:?}"), "GeneratorRegistry { generators: \"0 generators\" }");
    }
}
