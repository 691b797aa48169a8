//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent structural rule violations.
/// Every operation that returns one of these has left the tree untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("invalid parent: {0} is not part of the tree")]
    InvalidParent(NodeId),

    #[error("tree already has a root: {0}")]
    RootAlreadyExists(NodeId),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("cannot remove root node {0}, clear the tree instead")]
    RootRemovalForbidden(NodeId),

    #[error("malformed node records: {reason}")]
    MalformedRecords { reason: String },

    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
