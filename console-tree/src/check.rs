//! Checkbox cascade
//!
//! Checked state is presentation state owned by the caller, not by the
//! adapter. [`CheckedKeys`] holds it and knows how to update it against a
//! [`Forest`]:
//!
//! - **Cascade mode**: a node's check applies to its whole subtree, and each
//!   ancestor becomes checked (all children checked), indeterminate (some
//!   children checked or indeterminate) or unchecked.
//! - **Strict mode**: every node is independent.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{TreeError, TreeResult};
use crate::forest::Forest;
use crate::node::NodeId;

/// Tri-state check value rendered by a checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// Not checked
    Unchecked,
    /// Checked
    Checked,
    /// Some, but not all, descendants checked
    Indeterminate,
}

/// Caller-held checked and half-checked key sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedKeys {
    checked: HashSet<String>,
    half_checked: HashSet<String>,
}

impl CheckedKeys {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize an externally loaded key set against a forest.
    ///
    /// In cascade mode a checked node checks its subtree and ancestors are
    /// derived from their children, in a single pass over the forest.
    /// Unknown keys are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_tree::{CheckState, CheckedKeys, NodeRecord, TreeAdapter};
    ///
    /// let adapter = TreeAdapter::new(vec![
    ///     NodeRecord::root("r", "Root"),
    ///     NodeRecord::child("a", "r", "A"),
    ///     NodeRecord::child("b", "r", "B"),
    /// ]);
    ///
    /// let keys = CheckedKeys::conduct(adapter.get_tree(), ["a"], false);
    /// assert_eq!(keys.state("r"), CheckState::Indeterminate);
    /// ```
    pub fn conduct<T, I, S>(forest: &Forest<T>, keys: I, strict: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: HashSet<String> = keys
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .filter(|k| forest.contains(k))
            .collect();

        if strict {
            return Self {
                checked: requested,
                half_checked: HashSet::new(),
            };
        }

        let mut out = Self::new();
        let order: Vec<NodeId> = forest.pre_order().collect();

        // Top-down: a checked parent checks every child.
        for &id in &order {
            let Some(node) = forest.get(id) else { continue };
            let inherited = node
                .parent
                .and_then(|p| forest.get(p))
                .map(|p| out.checked.contains(&p.key))
                .unwrap_or(false);
            if inherited || requested.contains(&node.key) {
                out.checked.insert(node.key.clone());
            }
        }

        // Bottom-up: reverse pre-order visits children before parents.
        for &id in order.iter().rev() {
            let Some(node) = forest.get(id) else { continue };
            if node.is_leaf() || out.checked.contains(&node.key) {
                continue;
            }
            match out.derive(forest, id) {
                CheckState::Checked => {
                    out.checked.insert(node.key.clone());
                }
                CheckState::Indeterminate => {
                    out.half_checked.insert(node.key.clone());
                }
                CheckState::Unchecked => {}
            }
        }

        out
    }

    /// Check state of a key. Unknown keys are unchecked.
    pub fn state(&self, key: &str) -> CheckState {
        if self.checked.contains(key) {
            CheckState::Checked
        } else if self.half_checked.contains(key) {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// True if the key is fully checked.
    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.contains(key)
    }

    /// Fully checked keys.
    pub fn checked(&self) -> &HashSet<String> {
        &self.checked
    }

    /// Indeterminate keys. Always empty in strict mode.
    pub fn half_checked(&self) -> &HashSet<String> {
        &self.half_checked
    }

    /// Fully checked keys in tree order.
    pub fn checked_in_order<T>(&self, forest: &Forest<T>) -> Vec<String> {
        Self::in_order(forest, &self.checked)
    }

    /// Indeterminate keys in tree order.
    pub fn half_checked_in_order<T>(&self, forest: &Forest<T>) -> Vec<String> {
        Self::in_order(forest, &self.half_checked)
    }

    /// Set the checked state of one node.
    ///
    /// In cascade mode this touches the node's subtree and then walks up
    /// the ancestor chain, stopping at the first ancestor whose state does
    /// not change.
    pub fn set_checked<T>(
        &mut self,
        forest: &Forest<T>,
        key: &str,
        checked: bool,
        strict: bool,
    ) -> TreeResult<()> {
        let id = forest
            .id_of(key)
            .ok_or_else(|| TreeError::NodeNotFound(key.to_string()))?;

        if strict {
            self.half_checked.remove(key);
            if checked {
                self.checked.insert(key.to_string());
            } else {
                self.checked.remove(key);
            }
            return Ok(());
        }

        for d in forest.subtree(id) {
            let Some(node) = forest.get(d) else { continue };
            self.half_checked.remove(&node.key);
            if checked {
                self.checked.insert(node.key.clone());
            } else {
                self.checked.remove(&node.key);
            }
        }

        for ancestor in forest.ancestors(id) {
            let Some(node) = forest.get(ancestor) else { break };
            let previous = self.state(&node.key);
            let next = self.derive(forest, ancestor);
            if previous == next {
                break;
            }
            self.checked.remove(&node.key);
            self.half_checked.remove(&node.key);
            match next {
                CheckState::Checked => {
                    self.checked.insert(node.key.clone());
                }
                CheckState::Indeterminate => {
                    self.half_checked.insert(node.key.clone());
                }
                CheckState::Unchecked => {}
            }
        }

        Ok(())
    }

    /// Flip a node. An indeterminate node becomes checked.
    ///
    /// Returns the new checked value.
    pub fn toggle<T>(&mut self, forest: &Forest<T>, key: &str, strict: bool) -> TreeResult<bool> {
        let checked = !self.is_checked(key);
        self.set_checked(forest, key, checked, strict)?;
        Ok(checked)
    }

    /// Forget keys that are no longer in the forest and, in cascade mode,
    /// re-derive ancestor states after structural changes.
    pub fn prune<T>(&mut self, forest: &Forest<T>, strict: bool) {
        let checked: Vec<String> = self
            .checked
            .iter()
            .filter(|k| forest.contains(k))
            .cloned()
            .collect();
        *self = Self::conduct(forest, checked, strict);
    }

    fn derive<T>(&self, forest: &Forest<T>, id: NodeId) -> CheckState {
        let children = forest.children(id);
        let mut all = true;
        let mut any = false;
        for &child in children {
            let Some(node) = forest.get(child) else { continue };
            match self.state(&node.key) {
                CheckState::Checked => any = true,
                CheckState::Indeterminate => {
                    any = true;
                    all = false;
                }
                CheckState::Unchecked => all = false,
            }
        }
        if all && any {
            CheckState::Checked
        } else if any {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    fn in_order<T>(forest: &Forest<T>, keys: &HashSet<String>) -> Vec<String> {
        forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .filter(|node| keys.contains(&node.key))
            .map(|node| node.key.clone())
            .collect()
    }
}
