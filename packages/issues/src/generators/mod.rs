mod world_bounds;

pub use world_bounds::WorldBoundsIssueGenerator;

use crate::issue::Issue;
use crate::quick_fix::IssueQuickFix;
use quarry_model::{BBox3, Map, NodeId};

/// Trait for implementing issue generators
pub trait IssueGenerator {
    /// Unique identifier for this generator
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check an entity
    fn generate_for_entity(&self, _map: &Map, _entity: NodeId) -> Vec<Issue> {
        Vec::new()
    }

    /// Check a brush
    fn generate_for_brush(&self, _map: &Map, _brush: NodeId) -> Vec<Issue> {
        Vec::new()
    }

    /// Fixes offered for this generator's issues
    fn quick_fixes(&self) -> Vec<Box<dyn IssueQuickFix>> {
        Vec::new()
    }
}

/// Registry of active issue generators
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn IssueGenerator>>,
}

impl GeneratorRegistry {
    /// Create a registry with all built-in generators
    pub fn new(world_bounds: BBox3) -> Self {
        Self {
            generators: vec![Box::new(WorldBoundsIssueGenerator::new(world_bounds))],
        }
    }

    /// Get all registered generators
    pub fn generators(&self) -> &[Box<dyn IssueGenerator>] {
        &self.generators
    }

    pub fn generator(&self, name: &str) -> Option<&dyn IssueGenerator> {
        self.generators
            .iter()
            .find(|generator| generator.name() == name)
            .map(|generator| generator.as_ref())
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Add a custom generator to the registry
    pub fn add_generator(&mut self, generator: Box<dyn IssueGenerator>) {
        self.generators.push(generator);
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &format!("{} generators", self.generators.len()))
            .finish()
    }
}
