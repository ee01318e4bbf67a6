//! Drag-and-drop reparenting
//!
//! A renderer reports a finished drag gesture as a [`DropEvent`]; the
//! adapter resolves the new parent, rejects moves that would create a cycle,
//! reorders its records so the requested sibling position falls out of the
//! collection order, and rebuilds.

use serde::{Deserialize, Serialize};
use std::mem;

use crate::adapter::TreeAdapter;
use crate::error::{TreeError, TreeResult};
use crate::node::BaseNode;

/// Where a dragged node lands relative to the drop target.
///
/// Serialized as the renderer's integer code: `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum DropPosition {
    /// Sibling immediately preceding the target
    Before,
    /// Child of the target
    Inside,
    /// Sibling immediately following the target
    After,
}

impl TryFrom<i8> for DropPosition {
    type Error = TreeError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(DropPosition::Before),
            0 => Ok(DropPosition::Inside),
            1 => Ok(DropPosition::After),
            other => Err(TreeError::InvalidDropPosition(other)),
        }
    }
}

impl From<DropPosition> for i8 {
    fn from(position: DropPosition) -> Self {
        match position {
            DropPosition::Before => -1,
            DropPosition::Inside => 0,
            DropPosition::After => 1,
        }
    }
}

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    /// Key of the dragged node
    pub node: String,
    /// Key of the node it was dropped on, `None` for empty space at the
    /// root level
    pub target: Option<String>,
    /// Position relative to the target
    #[serde(alias = "pos")]
    pub position: DropPosition,
}

impl DropEvent {
    /// Drop `node` as the last child of `target`.
    pub fn inside(node: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            target: Some(target.into()),
            position: DropPosition::Inside,
        }
    }

    /// Drop `node` directly before `target`.
    pub fn before(node: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            target: Some(target.into()),
            position: DropPosition::Before,
        }
    }

    /// Drop `node` directly after `target`.
    pub fn after(node: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            target: Some(target.into()),
            position: DropPosition::After,
        }
    }

    /// Drop `node` as the last root.
    pub fn to_root(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            target: None,
            position: DropPosition::Inside,
        }
    }
}

/// Result of an applied drop, handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOutcome {
    /// Key of the moved node
    pub key: String,
    /// Parent before the move
    pub previous_parent: Option<String>,
    /// Parent after the move
    pub new_parent: Option<String>,
    /// Requested position
    pub position: DropPosition,
}

impl DropOutcome {
    /// True if the node changed parent (as opposed to a reorder among
    /// siblings).
    pub fn is_reparent(&self) -> bool {
        self.previous_parent != self.new_parent
    }
}

impl<T: BaseNode> TreeAdapter<T> {
    /// Apply a drop gesture.
    ///
    /// - `Inside` makes the target the new parent and appends the node as
    ///   its last child.
    /// - `Before`/`After` give the node the target's parent and place it
    ///   directly next to the target.
    /// - No target moves the node to the end of the root level.
    ///
    /// Moves that would make a node its own descendant are rejected with
    /// [`TreeError::CycleDetected`] and leave the adapter unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_tree::{DropEvent, NodeRecord, TreeAdapter};
    ///
    /// let mut adapter = TreeAdapter::new(vec![
    ///     NodeRecord::root("a", "A"),
    ///     NodeRecord::child("b", "a", "B"),
    ///     NodeRecord::root("c", "C"),
    /// ]);
    ///
    /// adapter.apply_drop(&DropEvent::inside("c", "b")).unwrap();
    /// assert_eq!(adapter.find_node("b").unwrap().children.len(), 1);
    ///
    /// assert!(adapter.apply_drop(&DropEvent::inside("a", "c")).is_err());
    /// ```
    pub fn apply_drop(&mut self, event: &DropEvent) -> TreeResult<DropOutcome> {
        let node = self
            .forest
            .id_of(&event.node)
            .ok_or_else(|| TreeError::NodeNotFound(event.node.clone()))?;
        let target = match event.target.as_deref() {
            Some(key) => Some(
                self.forest
                    .id_of(key)
                    .ok_or_else(|| TreeError::NodeNotFound(key.to_string()))?,
            ),
            None => None,
        };

        let new_parent = match (target, event.position) {
            (Some(target), DropPosition::Inside) => Some(target),
            (Some(target), _) => self.forest.parent(target),
            (None, _) => None,
        };
        let new_parent_key = new_parent
            .and_then(|p| self.forest.get(p))
            .map(|p| p.key.clone());
        let previous_parent = self
            .forest
            .get(node)
            .and_then(|n| n.entity.parent_id())
            .map(str::to_string);

        let outcome = DropOutcome {
            key: event.node.clone(),
            previous_parent,
            new_parent: new_parent_key.clone(),
            position: event.position,
        };

        // Dropping a node before or after itself is a no-op.
        if target == Some(node) && event.position != DropPosition::Inside {
            return Ok(outcome);
        }

        self.ensure_acyclic(&event.node, new_parent_key.as_deref())?;

        let mut records = mem::take(&mut self.forest).into_records();
        let Some(from) = records.iter().position(|r| r.id() == event.node) else {
            self.rebuild_from(records);
            return Err(TreeError::NodeNotFound(event.node.clone()));
        };
        let mut record = records.remove(from);
        record.set_parent_id(new_parent_key);

        let target_index = event
            .target
            .as_deref()
            .and_then(|key| records.iter().position(|r| r.id() == key));
        let insert_at = match (target_index, event.position) {
            (Some(i), DropPosition::Before) => i,
            (Some(i), DropPosition::After) => i + 1,
            _ => records.len(),
        };
        records.insert(insert_at, record);
        self.rebuild_from(records);

        tracing::debug!(
            key = %outcome.key,
            previous_parent = ?outcome.previous_parent,
            new_parent = ?outcome.new_parent,
            position = ?outcome.position,
            "Node dropped"
        );
        Ok(outcome)
    }
}
