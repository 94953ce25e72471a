use quarry_model::NodeId;
use serde::{Deserialize, Serialize};

/// A problem found on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The offending entity or brush
    pub node: NodeId,

    /// Name of the generator that found it
    pub generator: String,

    /// Human-readable description
    pub description: String,
}

impl Issue {
    pub fn new(node: NodeId, generator: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            node,
            generator: generator.into(),
            description: description.into(),
        }
    }
}
