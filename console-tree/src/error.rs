//! Error types for tree operations
//!
//! Most irregular input is tolerated (unresolved parents become roots,
//! duplicate ids resolve to the last record). Errors are reserved for
//! operations that name something that does not exist, or that would break
//! the acyclic structure of the tree.

use thiserror::Error;

/// Tree adapter error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No node with this key exists in the tree
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Reparenting `node` under `parent` would make it its own descendant
    #[error("Moving {node} under {parent} would create a cycle")]
    CycleDetected {
        /// Key of the node being moved
        node: String,
        /// Key of the rejected parent
        parent: String,
    },

    /// Drop position code outside -1, 0, 1
    #[error("Invalid drop position: {0}")]
    InvalidDropPosition(i8),

    /// Gesture not enabled by the view configuration
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    /// Check if this error was caused by the structure of the tree rather
    /// than by a stale or unknown key.
    pub fn is_structural(&self) -> bool {
        matches!(self, TreeError::CycleDetected { .. })
    }

    /// Get error code for API responses and UI messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            TreeError::NodeNotFound(_) => "NODE_NOT_FOUND",
            TreeError::CycleDetected { .. } => "CYCLE_DETECTED",
            TreeError::InvalidDropPosition(_) => "INVALID_DROP_POSITION",
            TreeError::FeatureDisabled(_) => "FEATURE_DISABLED",
        }
    }
}
