//! Error types for the scene graph

use crate::types::{NodeId, NodeKind};
use thiserror::Error;

/// Recoverable model failures.
///
/// Contract violations (double parenting, removing a non-child, type-incompatible children)
/// are not represented here; they panic at the call site.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} ({1}) does not carry attributes")]
    NotAttributable(NodeId, NodeKind),

    #[error("Node {0} is not a brush")]
    NotABrush(NodeId),

    #[error("Attribute '{0}' cannot be changed on the world")]
    ImmutableAttribute(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Attribute already exists: {0}")]
    AttributeExists(String),

    #[error("Invalid brush: {0}")]
    InvalidBrush(String),

    #[error("Boundary move rejected: {0}")]
    BoundaryRejected(String),
}
