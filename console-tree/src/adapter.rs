//! Stateful tree adapter
//!
//! [`TreeAdapter`] wraps a flat collection of parent-referencing records and
//! keeps the derived [`Forest`] consistent as records are added, updated,
//! removed and moved. Add, update and remove are applied incrementally;
//! reparenting and [`TreeAdapter::rebuild`] rebuild the forest from its
//! canonical record order.

use std::fmt;
use std::mem;

use crate::convert::{resolve_display_name, tree_to_list};
use crate::error::{TreeError, TreeResult};
use crate::forest::Forest;
use crate::node::{BaseNode, TreeNode};

/// Stateful wrapper that maintains a tree view over a flat collection.
///
/// # Examples
///
/// ```
/// use console_tree::{NodeRecord, TreeAdapter};
///
/// let adapter = TreeAdapter::new(vec![
///     NodeRecord::root("1", "Root"),
///     NodeRecord::child("2", "1", "Child1"),
///     NodeRecord::child("3", "1", "Child2"),
/// ]);
///
/// let root = adapter.find_node("1").unwrap();
/// assert_eq!(root.children.len(), 2);
/// assert!(adapter.find_node("2").unwrap().is_leaf());
/// ```
#[derive(Clone)]
pub struct TreeAdapter<T> {
    pub(crate) forest: Forest<T>,
    resolver: fn(&T) -> String,
    revision: u64,
}

impl<T: fmt::Debug> fmt::Debug for TreeAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeAdapter")
            .field("forest", &self.forest)
            .field("revision", &self.revision)
            .finish()
    }
}

impl<T: BaseNode> From<Vec<T>> for TreeAdapter<T> {
    fn from(records: Vec<T>) -> Self {
        Self::new(records)
    }
}

impl<T: BaseNode> TreeAdapter<T> {
    /// Build an adapter from a snapshot of the collection.
    pub fn new(records: Vec<T>) -> Self {
        Self::with_resolver(records, resolve_display_name::<T>)
    }

    /// Build an adapter that titles nodes with a custom resolver.
    pub fn with_resolver(records: Vec<T>, resolver: fn(&T) -> String) -> Self {
        let forest = Forest::build(records, resolver);
        tracing::debug!(nodes = forest.len(), roots = forest.roots().len(), "Tree built");
        Self {
            forest,
            resolver,
            revision: 0,
        }
    }

    /// Current records, parents before children.
    pub fn get_list(&self) -> Vec<T> {
        tree_to_list(&self.forest)
    }

    /// The derived tree. Unchanged until the next mutating call.
    pub fn get_tree(&self) -> &Forest<T> {
        &self.forest
    }

    /// Counter bumped by every successful mutation.
    ///
    /// Presentation layers can compare revisions to skip re-rendering.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        self.forest.len()
    }

    /// True if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Look up a node by key.
    pub fn find_node(&self, key: &str) -> Option<&TreeNode<T>> {
        self.forest.find(key)
    }

    /// Ancestors of a node, nearest first. Empty for roots and unknown keys.
    pub fn ancestors(&self, key: &str) -> Vec<&TreeNode<T>> {
        match self.forest.id_of(key) {
            Some(id) => self
                .forest
                .ancestors(id)
                .filter_map(|a| self.forest.get(a))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Descendants of a node in pre-order, excluding the node itself.
    pub fn descendants(&self, key: &str) -> Vec<&TreeNode<T>> {
        match self.forest.id_of(key) {
            Some(id) => self
                .forest
                .subtree(id)
                .skip(1)
                .filter_map(|d| self.forest.get(d))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Titles from the root down to the node.
    pub fn path(&self, key: &str) -> Vec<String> {
        let mut titles: Vec<String> = self.ancestors(key).iter().map(|n| n.title.clone()).collect();
        titles.reverse();
        if let Some(node) = self.find_node(key) {
            titles.push(node.title.clone());
        }
        titles
    }

    /// Check if `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> bool {
        match (self.forest.id_of(ancestor), self.forest.id_of(descendant)) {
            (Some(a), Some(d)) => self.forest.is_ancestor_of(a, d),
            _ => false,
        }
    }

    /// Check whether `key` may be moved under `new_parent` (`None` for the
    /// root level) without creating a cycle.
    pub fn can_move(&self, key: &str, new_parent: Option<&str>) -> bool {
        self.ensure_acyclic(key, new_parent).is_ok()
    }

    /// Insert a record.
    ///
    /// The node is appended under its parent (or as a root) without
    /// rebuilding. If tolerant roots were waiting for this id, the tree is
    /// rebuilt so they move under it. A record whose id already exists
    /// replaces it, as in [`TreeAdapter::update_node`].
    pub fn add_node(&mut self, record: T) -> TreeResult<()> {
        if self.forest.contains(record.id()) {
            tracing::warn!(id = %record.id(), "Node already exists, updating instead");
            return self.update_node(record);
        }

        if self.forest.has_orphans_of(record.id()) {
            tracing::debug!(id = %record.id(), "Node adopts tolerant roots, rebuilding");
            let mut records = mem::take(&mut self.forest).into_records();
            records.push(record);
            self.rebuild_from(records);
            return Ok(());
        }

        let title = (self.resolver)(&record);
        let id = self.forest.attach(record, title);
        self.revision += 1;
        tracing::debug!(node = %id, "Node attached");
        Ok(())
    }

    /// Replace the record with the same id.
    ///
    /// A changed parent id is handled as a reparent and is rejected if it
    /// would create a cycle. Otherwise the entity and title are refreshed in
    /// place.
    pub fn update_node(&mut self, record: T) -> TreeResult<()> {
        let id = self
            .forest
            .id_of(record.id())
            .ok_or_else(|| TreeError::NodeNotFound(record.id().to_string()))?;

        let parent_changed = self
            .forest
            .get(id)
            .map(|node| node.entity.parent_id() != record.parent_id())
            .unwrap_or(false);
        if parent_changed {
            return self.handle_drop(record);
        }

        let title = (self.resolver)(&record);
        self.forest.refresh(id, record, title);
        self.revision += 1;
        Ok(())
    }

    /// Remove a node together with all of its descendants.
    ///
    /// Returns the removed records, the node first, so the caller can
    /// persist the deletion.
    pub fn handle_remove(&mut self, key: &str) -> TreeResult<Vec<T>> {
        let id = self
            .forest
            .id_of(key)
            .ok_or_else(|| TreeError::NodeNotFound(key.to_string()))?;

        let removed = self.forest.detach_subtree(id);
        self.revision += 1;
        tracing::debug!(key = %key, removed = removed.len(), "Subtree removed");
        Ok(removed)
    }

    /// Store a record whose parent id was reassigned by the caller and
    /// rebuild the tree around it.
    ///
    /// The move is rejected with [`TreeError::CycleDetected`] if the new
    /// parent is the node itself or one of its descendants; the adapter is
    /// left unchanged in that case.
    pub fn handle_drop(&mut self, record: T) -> TreeResult<()> {
        let key = record.id().to_string();
        if !self.forest.contains(&key) {
            return Err(TreeError::NodeNotFound(key));
        }
        self.ensure_acyclic(&key, record.parent_id())?;

        let mut records = mem::take(&mut self.forest).into_records();
        if let Some(slot) = records.iter_mut().find(|r| r.id() == key) {
            *slot = record;
        }
        self.rebuild_from(records);
        tracing::debug!(key = %key, "Node reparented");
        Ok(())
    }

    /// Rebuild the derived tree from scratch.
    ///
    /// Incremental updates never need this; it compacts the arena and serves
    /// as a consistency check.
    pub fn rebuild(&mut self) {
        let records = mem::take(&mut self.forest).into_records();
        self.rebuild_from(records);
    }

    pub(crate) fn rebuild_from(&mut self, records: Vec<T>) {
        self.forest = Forest::build(records, self.resolver);
        self.revision += 1;
        tracing::debug!(nodes = self.forest.len(), revision = self.revision, "Tree rebuilt");
    }

    /// Fail if `new_parent` is `key` itself or one of its descendants.
    ///
    /// A parent id that resolves to nothing is accepted; the node becomes a
    /// tolerant root.
    pub(crate) fn ensure_acyclic(&self, key: &str, new_parent: Option<&str>) -> TreeResult<()> {
        let node = self
            .forest
            .id_of(key)
            .ok_or_else(|| TreeError::NodeNotFound(key.to_string()))?;
        let Some(parent_key) = new_parent else {
            return Ok(());
        };
        let Some(parent) = self.forest.id_of(parent_key) else {
            return Ok(());
        };

        if parent == node || self.forest.is_ancestor_of(node, parent) {
            tracing::warn!(node = %key, parent = %parent_key, "Rejected move that would create a cycle");
            return Err(TreeError::CycleDetected {
                node: key.to_string(),
                parent: parent_key.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRecord;
    use pretty_assertions::assert_eq;

    fn chain() -> TreeAdapter<NodeRecord> {
        TreeAdapter::new(vec![
            NodeRecord::root("a", "A"),
            NodeRecord::child("b", "a", "B"),
            NodeRecord::child("c", "b", "C"),
        ])
    }

    fn list_ids(adapter: &TreeAdapter<NodeRecord>) -> Vec<String> {
        adapter.get_list().into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_add_node_incremental_matches_rebuild() {
        let mut adapter = chain();
        adapter.add_node(NodeRecord::child("d", "a", "D")).unwrap();
        adapter.add_node(NodeRecord::root("e", "E")).unwrap();

        let rebuilt = TreeAdapter::new(adapter.get_list());
        assert_eq!(adapter.get_tree().outline(), rebuilt.get_tree().outline());
        assert_eq!(list_ids(&adapter), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(adapter.find_node("d").unwrap().depth, 1);
    }

    #[test]
    fn test_add_node_adopts_orphans() {
        let mut adapter = TreeAdapter::new(vec![NodeRecord::child("x", "p", "Orphan")]);
        assert!(adapter.find_node("x").unwrap().is_root());

        adapter.add_node(NodeRecord::root("p", "Parent")).unwrap();
        let parent = adapter.find_node("p").unwrap();
        assert_eq!(parent.children.len(), 1);
        assert!(!adapter.find_node("x").unwrap().is_root());
        assert_eq!(adapter.get_tree().roots().len(), 1);
    }

    #[test]
    fn test_readd_cycle_partner_matches_rebuild() {
        let mut adapter = TreeAdapter::new(vec![
            NodeRecord::child("a", "b", "A"),
            NodeRecord::child("b", "a", "B"),
        ]);
        adapter.handle_remove("b").unwrap();
        adapter.add_node(NodeRecord::root("b", "B")).unwrap();

        let rebuilt = TreeAdapter::new(adapter.get_list());
        assert_eq!(adapter.get_tree().outline(), rebuilt.get_tree().outline());
        assert_eq!(
            adapter.get_tree().outline(),
            vec![
                ("b".to_string(), None),
                ("a".to_string(), Some("b".to_string())),
            ]
        );
    }

    #[test]
    fn test_add_existing_id_updates() {
        let mut adapter = chain();
        adapter.add_node(NodeRecord::child("c", "b", "Renamed")).unwrap();
        assert_eq!(adapter.len(), 3);
        assert_eq!(adapter.find_node("c").unwrap().title, "Renamed");
    }

    #[test]
    fn test_update_node_in_place() {
        let mut adapter = chain();
        let before = adapter.revision();
        adapter
            .update_node(NodeRecord::child("b", "a", "B").with_display_name("Bee"))
            .unwrap();
        assert_eq!(adapter.find_node("b").unwrap().title, "Bee");
        assert_eq!(adapter.find_node("b").unwrap().children.len(), 1);
        assert!(adapter.revision() > before);
    }

    #[test]
    fn test_update_node_reparents() {
        let mut adapter = chain();
        adapter.update_node(NodeRecord::child("c", "a", "C")).unwrap();
        assert_eq!(adapter.find_node("a").unwrap().children.len(), 2);
        assert!(adapter.find_node("b").unwrap().is_leaf());
    }

    #[test]
    fn test_update_unknown_node() {
        let mut adapter = chain();
        let err = adapter.update_node(NodeRecord::root("zzz", "Z")).unwrap_err();
        assert_eq!(err, TreeError::NodeNotFound("zzz".to_string()));
    }

    #[test]
    fn test_cycle_rejected_and_state_unchanged() {
        let mut adapter = chain();
        let outline = adapter.get_tree().outline();
        let revision = adapter.revision();

        let err = adapter.handle_drop(NodeRecord::child("a", "c", "A")).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
        assert_eq!(adapter.get_tree().outline(), outline);
        assert_eq!(adapter.revision(), revision);

        assert!(adapter.handle_drop(NodeRecord::child("a", "a", "A")).is_err());
        assert!(!adapter.can_move("a", Some("b")));
        assert!(adapter.can_move("c", None));
    }

    #[test]
    fn test_handle_remove_cascades() {
        let mut adapter = chain();
        adapter.add_node(NodeRecord::root("z", "Z")).unwrap();

        let removed = adapter.handle_remove("b").unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(adapter.get_list().len(), 2);
        assert!(adapter.find_node("b").is_none());
        assert!(adapter.find_node("c").is_none());
        assert!(adapter.find_node("a").unwrap().is_leaf());

        assert!(adapter.handle_remove("b").is_err());
    }

    #[test]
    fn test_navigation_helpers() {
        let adapter = chain();
        let ancestors: Vec<_> = adapter.ancestors("c").iter().map(|n| n.key.clone()).collect();
        assert_eq!(ancestors, vec!["b", "a"]);

        let descendants: Vec<_> = adapter.descendants("a").iter().map(|n| n.key.clone()).collect();
        assert_eq!(descendants, vec!["b", "c"]);

        assert_eq!(adapter.path("c"), vec!["A", "B", "C"]);
        assert!(adapter.path("missing").is_empty());
        assert!(adapter.is_ancestor_of("a", "c"));
        assert!(!adapter.is_ancestor_of("c", "a"));
    }

    #[test]
    fn test_rebuild_is_stable() {
        let mut adapter = chain();
        adapter.add_node(NodeRecord::child("d", "a", "D")).unwrap();
        adapter.handle_remove("d").unwrap();

        let outline = adapter.get_tree().outline();
        adapter.rebuild();
        assert_eq!(adapter.get_tree().outline(), outline);
    }
}
