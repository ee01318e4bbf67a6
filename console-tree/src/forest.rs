//! Arena-backed forest
//!
//! The derived tree is stored as a single arena of [`TreeNode`] slots plus an
//! ordered list of roots and an id index. Parent and child links are arena
//! indices, never references.

use std::collections::HashMap;

use crate::node::{BaseNode, NodeId, TreeNode};

/// The derived tree: every root of the collection, stored in one arena.
///
/// Removed nodes leave an empty slot behind; slots are compacted by the
/// next full rebuild.
#[derive(Debug, Clone)]
pub struct Forest<T> {
    slots: Vec<Option<TreeNode<T>>>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
    /// Parent ids referenced by tolerant roots, with the number of roots
    /// waiting on each.
    dangling: HashMap<String, usize>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
            dangling: HashMap::new(),
        }
    }
}

impl<T> Forest<T> {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the forest holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Root node ids in collection order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root nodes in collection order.
    pub fn root_nodes(&self) -> impl Iterator<Item = &TreeNode<T>> + '_ {
        self.roots.iter().filter_map(move |&id| self.get(id))
    }

    /// Get a node by arena id.
    pub fn get(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Resolve a key to its arena id.
    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Look up a node by key.
    pub fn find(&self, key: &str) -> Option<&TreeNode<T>> {
        self.id_of(key).and_then(|id| self.get(id))
    }

    /// True if a node with this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Children of a node, empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of a node, `None` for roots and unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ancestors of a node, from its parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            forest: self,
            next: self.parent(id),
        }
    }

    /// Check if `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Walk the whole forest depth-first, parents before children.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder::new(self, &self.roots)
    }

    /// Walk the subtree rooted at `id` (inclusive) depth-first.
    pub fn subtree(&self, id: NodeId) -> PreOrder<'_, T> {
        if self.get(id).is_some() {
            PreOrder::new(self, &[id])
        } else {
            PreOrder::new(self, &[])
        }
    }

    /// Structural outline: `(key, parent key)` pairs in pre-order.
    ///
    /// Two forests with equal outlines have the same shape and sibling order.
    pub fn outline(&self) -> Vec<(String, Option<String>)> {
        self.pre_order()
            .filter_map(|id| self.get(id))
            .map(|node| {
                let parent = node.parent.and_then(|p| self.get(p)).map(|p| p.key.clone());
                (node.key.clone(), parent)
            })
            .collect()
    }

    /// Consume the forest into its records in pre-order.
    ///
    /// Rebuilding from this list reproduces the same shape and sibling
    /// order.
    pub(crate) fn into_records(mut self) -> Vec<T> {
        let order: Vec<NodeId> = self.pre_order().collect();
        order
            .into_iter()
            .filter_map(|id| self.slots.get_mut(id.0).and_then(Option::take))
            .map(|node| node.entity)
            .collect()
    }

    /// True if some tolerant root references `key` as its parent.
    pub(crate) fn has_orphans_of(&self, key: &str) -> bool {
        self.dangling.contains_key(key)
    }

    /// Replace the entity and title of an existing node in place.
    pub(crate) fn refresh(&mut self, id: NodeId, entity: T, title: String) {
        if let Some(node) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            node.entity = entity;
            node.title = title;
        }
    }

    fn insert(&mut self, key: String, entity: T, title: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        let depth = parent
            .and_then(|p| self.get(p))
            .map(|p| p.depth + 1)
            .unwrap_or(0);

        match parent.and_then(|p| self.slots.get_mut(p.0)).and_then(Option::as_mut) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }

        self.index.insert(key.clone(), id);
        self.slots.push(Some(TreeNode {
            entity,
            key,
            title,
            children: Vec::new(),
            parent,
            depth,
        }));
        id
    }
}

impl<T: BaseNode> Forest<T> {
    /// Build a forest from a flat collection.
    ///
    /// Records are grouped by parent id in one pass and then assembled
    /// depth-first, so the whole build is linear in the number of records.
    pub(crate) fn build<F>(records: Vec<T>, resolve: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        let mut last_index: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if last_index.insert(record.id().to_string(), i).is_some() {
                tracing::warn!(id = %record.id(), "Duplicate node id, last record wins");
            }
        }

        let mut forest = Forest {
            slots: Vec::with_capacity(last_index.len()),
            roots: Vec::new(),
            index: HashMap::with_capacity(last_index.len()),
            dangling: HashMap::new(),
        };

        let mut root_indices = Vec::new();
        let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            if last_index.get(record.id()) != Some(&i) {
                continue;
            }
            match record.parent_id() {
                Some(parent) if parent != record.id() && last_index.contains_key(parent) => {
                    children_of.entry(parent).or_default().push(i);
                }
                Some(parent) if parent != record.id() => {
                    *forest.dangling.entry(parent.to_string()).or_default() += 1;
                    root_indices.push(i);
                }
                Some(_) => {
                    tracing::warn!(id = %record.id(), "Node is its own parent, treating as root");
                    root_indices.push(i);
                }
                None => root_indices.push(i),
            }
        }

        // Child index lists borrow ids from `records`; resolve them to plain
        // indices before the records are moved into the arena.
        let children_of: HashMap<usize, Vec<usize>> = children_of
            .into_iter()
            .filter_map(|(parent, children)| last_index.get(parent).map(|&p| (p, children)))
            .collect();

        let total = records.len();
        let mut pending: Vec<Option<T>> = records.into_iter().map(Some).collect();
        let mut placed = vec![false; total];

        for &root in &root_indices {
            forest.place_subtree(root, None, &mut pending, &mut placed, &children_of, &resolve);
        }

        // Anything still pending (and not a shadowed duplicate) is part of a
        // parent loop with no path to a root.
        for i in 0..total {
            if placed[i] || pending[i].is_none() {
                continue;
            }
            let is_live = pending[i]
                .as_ref()
                .map(|r| last_index.get(r.id()) == Some(&i))
                .unwrap_or(false);
            if !is_live {
                continue;
            }
            if let Some(record) = pending[i].as_ref() {
                tracing::warn!(id = %record.id(), "Node is part of a parent cycle, promoting to root");
                // Counted like a tolerant root so detach and re-adding the
                // parent stay in step with a rebuild.
                if let Some(parent) = record.parent_id() {
                    *forest.dangling.entry(parent.to_string()).or_default() += 1;
                }
            }
            forest.place_subtree(i, None, &mut pending, &mut placed, &children_of, &resolve);
        }

        forest
    }

    fn place_subtree<F>(
        &mut self,
        start: usize,
        parent: Option<NodeId>,
        pending: &mut [Option<T>],
        placed: &mut [bool],
        children_of: &HashMap<usize, Vec<usize>>,
        resolve: &F,
    ) where
        F: Fn(&T) -> String,
    {
        let mut stack = vec![(start, parent)];
        while let Some((i, parent)) = stack.pop() {
            if placed[i] {
                continue;
            }
            let Some(record) = pending[i].take() else {
                continue;
            };
            placed[i] = true;

            let title = resolve(&record);
            let key = record.id().to_string();
            let id = self.insert(key, record, title, parent);

            if let Some(children) = children_of.get(&i) {
                for &child in children.iter().rev() {
                    stack.push((child, Some(id)));
                }
            }
        }
    }

    /// Attach a single record under its resolved parent, or as a root.
    pub(crate) fn attach(&mut self, entity: T, title: String) -> NodeId {
        let parent = entity.parent_id().and_then(|p| self.id_of(p));
        if parent.is_none() {
            if let Some(missing) = entity.parent_id() {
                *self.dangling.entry(missing.to_string()).or_default() += 1;
            }
        }
        let key = entity.id().to_string();
        self.insert(key, entity, title, parent)
    }

    /// Remove a node and all of its descendants.
    ///
    /// Returns the removed entities in pre-order (the node first).
    pub(crate) fn detach_subtree(&mut self, id: NodeId) -> Vec<T> {
        let ids: Vec<NodeId> = self.subtree(id).collect();
        if ids.is_empty() {
            return Vec::new();
        }

        match self.parent(id) {
            Some(parent) => {
                if let Some(parent_node) = self.slots.get_mut(parent.0).and_then(Option::as_mut) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            None => {
                self.roots.retain(|&r| r != id);
                let missing = self
                    .get(id)
                    .and_then(|n| n.entity.parent_id())
                    .map(str::to_string);
                if let Some(missing) = missing {
                    if let Some(count) = self.dangling.get_mut(&missing) {
                        *count -= 1;
                        if *count == 0 {
                            self.dangling.remove(&missing);
                        }
                    }
                }
            }
        }

        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) {
                self.index.remove(&node.key);
                removed.push(node.entity);
            }
        }
        removed
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a, T> {
    forest: &'a Forest<T>,
    next: Option<NodeId>,
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.forest.parent(current);
        Some(current)
    }
}

/// Depth-first pre-order iterator.
pub struct PreOrder<'a, T> {
    forest: &'a Forest<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> PreOrder<'a, T> {
    fn new(forest: &'a Forest<T>, starts: &[NodeId]) -> Self {
        Self {
            forest,
            stack: starts.iter().rev().copied().collect(),
        }
    }
}

impl<T> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.forest.children(id).iter().rev().copied());
        Some(id)
    }
}
