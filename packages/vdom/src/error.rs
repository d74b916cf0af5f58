//! Error types for reconciliation

use crate::props::Key;
use sprig_dom::{DomError, NodeId};
use thiserror::Error;

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Misuse of the virtual tree detected by debug checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    #[error("Children keys are not unique: {keys:?}")]
    DuplicateKeys { keys: Vec<Key> },

    #[error("Cached virtual element bound to {node} was moved within the tree")]
    RelocatedElement { node: NodeId },

    #[error("Fragment can not be a child of a fast list")]
    FragmentInFastList,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralViolation),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Root node {0} is not in the document")]
    UnknownRoot(NodeId),
}
