//! Node model
//!
//! This module defines the record contract consumed by the adapter
//! ([`BaseNode`]), a ready-made record type ([`NodeRecord`]) and the
//! adapter-owned wrapper stored in the arena ([`TreeNode`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal record shape required for tree conversion.
///
/// Implemented by every entity the adapter can arrange into a tree:
/// organization units, folders, permission grants and so on.
///
/// # Examples
///
/// ```
/// use console_tree::{BaseNode, NodeRecord};
///
/// let record = NodeRecord::child("2", "1", "Child");
/// assert_eq!(record.id(), "2");
/// assert_eq!(record.parent_id(), Some("1"));
/// ```
pub trait BaseNode: Clone {
    /// Unique identifier within the collection.
    fn id(&self) -> &str;

    /// Identifier of the parent record, `None` for a root.
    fn parent_id(&self) -> Option<&str>;

    /// Reassign the parent. Used by reparent operations.
    fn set_parent_id(&mut self, parent_id: Option<String>);

    /// Plain name of the record.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Localized or formatted name, preferred over [`BaseNode::name`].
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// A generic parent-referencing record.
///
/// Field names follow the camelCase shape used by the REST services so a
/// response body can be deserialized directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Unique identifier
    pub id: String,

    /// Parent identifier, `None` for a root
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Plain name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl NodeRecord {
    /// Create a root record.
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: Some(name.into()),
            display_name: None,
        }
    }

    /// Create a record under `parent_id`.
    pub fn child(id: impl Into<String>, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            name: Some(name.into()),
            display_name: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

impl BaseNode for NodeRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Index of a node within a [`Forest`](crate::Forest) arena.
///
/// Ids are only meaningful for the forest that issued them and are
/// invalidated by a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Get the inner index.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Adapter-owned wrapper around an entity.
///
/// Parent and children are arena indices, so the back-reference to the
/// parent does not form an ownership cycle.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// The wrapped record
    pub entity: T,
    /// Equal to `entity.id()`
    pub key: String,
    /// Resolved display name
    pub title: String,
    /// Children in collection order
    pub children: Vec<NodeId>,
    /// Parent wrapper, `None` at the root level
    pub parent: Option<NodeId>,
    /// Distance from the root level (roots are 0)
    pub depth: usize,
}

impl<T> TreeNode<T> {
    /// True iff the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True iff the node sits at the root level.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
