//! Tree rendering contract
//!
//! [`TreeView`] is what a presentation layer binds to: it owns the adapter
//! plus the transient UI state (expanded keys, checked keys, selection,
//! disabled keys), accepts user gestures, and reports each one as a
//! [`TreeEvent`]. Painting is left to the renderer, which reads
//! [`TreeView::visible_rows`].

use std::collections::HashSet;

use crate::adapter::TreeAdapter;
use crate::check::{CheckState, CheckedKeys};
use crate::config::TreeConfig;
use crate::drop::{DropEvent, DropOutcome};
use crate::error::{TreeError, TreeResult};
use crate::event::{EventDispatcher, TreeEvent, TreeEventHandler};
use crate::node::{BaseNode, NodeId};

/// Per-node presentation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeFlags {
    /// Children are shown
    pub expanded: bool,
    /// Checkbox state (`Unchecked` when the view is not checkable)
    pub checked: CheckState,
    /// Node is the current selection
    pub selected: bool,
    /// Node ignores check, select and drag gestures
    pub disabled: bool,
    /// Node has no children
    pub is_leaf: bool,
}

/// A row the renderer paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    /// Arena id of the node
    pub id: NodeId,
    /// Node key
    pub key: String,
    /// Resolved title
    pub title: String,
    /// Indentation level
    pub depth: usize,
    /// Presentation flags
    pub flags: NodeFlags,
}

/// Interactive tree state bound to a renderer.
///
/// # Examples
///
/// ```
/// use console_tree::{NodeRecord, TreeAdapter, TreeConfig, TreeView};
///
/// let adapter = TreeAdapter::new(vec![
///     NodeRecord::root("1", "Root"),
///     NodeRecord::child("2", "1", "Child"),
/// ]);
/// let mut view = TreeView::new(adapter, TreeConfig::checkable());
///
/// assert_eq!(view.visible_rows().len(), 1);
/// view.toggle_expanded("1").unwrap();
/// assert_eq!(view.visible_rows().len(), 2);
/// ```
#[derive(Debug)]
pub struct TreeView<T> {
    adapter: TreeAdapter<T>,
    config: TreeConfig,
    expanded: HashSet<String>,
    checked: CheckedKeys,
    selected: Option<String>,
    disabled: HashSet<String>,
    dispatcher: EventDispatcher<T>,
}

impl<T: BaseNode> TreeView<T> {
    /// Bind a view to an adapter, expanding the configured number of levels.
    pub fn new(adapter: TreeAdapter<T>, config: TreeConfig) -> Self {
        let expanded = adapter
            .get_tree()
            .pre_order()
            .filter_map(|id| adapter.get_tree().get(id))
            .filter(|node| !node.is_leaf() && node.depth < config.default_expand_depth)
            .map(|node| node.key.clone())
            .collect();

        Self {
            adapter,
            config,
            expanded,
            checked: CheckedKeys::new(),
            selected: None,
            disabled: HashSet::new(),
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Seed the checked state from keys loaded elsewhere. Emits nothing.
    pub fn with_checked_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.checked = CheckedKeys::conduct(self.adapter.get_tree(), keys, self.config.check_strictly);
        self
    }

    /// Seed the disabled keys. Emits nothing.
    pub fn with_disabled_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Register an event handler.
    pub fn subscribe(&mut self, handler: impl TreeEventHandler<T> + 'static) {
        self.dispatcher.subscribe(handler);
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &TreeAdapter<T> {
        &self.adapter
    }

    /// The active configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Caller-visible checked state.
    pub fn checked_keys(&self) -> &CheckedKeys {
        &self.checked
    }

    /// Expanded keys in tree order.
    pub fn expanded_keys(&self) -> Vec<String> {
        self.ordered(&self.expanded)
    }

    /// The selected entity, if any.
    pub fn selected_node(&self) -> Option<&T> {
        self.selected
            .as_deref()
            .and_then(|key| self.adapter.find_node(key))
            .map(|node| &node.entity)
    }

    /// Presentation flags for a key.
    pub fn flags(&self, key: &str) -> Option<NodeFlags> {
        let node = self.adapter.find_node(key)?;
        Some(NodeFlags {
            expanded: self.expanded.contains(key),
            checked: if self.config.checkable {
                self.checked.state(key)
            } else {
                CheckState::Unchecked
            },
            selected: self.selected.as_deref() == Some(key),
            disabled: self.disabled.contains(key),
            is_leaf: node.is_leaf(),
        })
    }

    /// Rows to paint: roots, plus the children of every expanded node.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let forest = self.adapter.get_tree();
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = forest.roots().iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let Some(node) = forest.get(id) else { continue };
            let Some(flags) = self.flags(&node.key) else { continue };
            if flags.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
            rows.push(VisibleRow {
                id,
                key: node.key.clone(),
                title: node.title.clone(),
                depth: node.depth,
                flags,
            });
        }
        rows
    }

    /// Expand or collapse a node. Returns the new expanded value.
    pub fn toggle_expanded(&mut self, key: &str) -> TreeResult<bool> {
        self.require_node(key)?;
        let expanded = if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        };
        self.emit_expanded();
        Ok(expanded)
    }

    /// Replace the expanded keys. Unknown keys are ignored.
    pub fn set_expanded_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expanded = keys
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .filter(|k| self.adapter.get_tree().contains(k))
            .collect();
        self.emit_expanded();
    }

    /// Expand every ancestor of a node so it becomes visible.
    pub fn expand_to(&mut self, key: &str) -> TreeResult<()> {
        self.require_node(key)?;
        let ancestors: Vec<String> = self
            .adapter
            .ancestors(key)
            .iter()
            .map(|n| n.key.clone())
            .collect();
        self.expanded.extend(ancestors);
        self.emit_expanded();
        Ok(())
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) {
        let forest = self.adapter.get_tree();
        self.expanded = forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .filter(|node| !node.is_leaf())
            .map(|node| node.key.clone())
            .collect();
        self.emit_expanded();
    }

    /// Collapse everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.emit_expanded();
    }

    /// Check or uncheck a node, cascading unless the view is strict.
    pub fn set_checked(&mut self, key: &str, checked: bool) -> TreeResult<()> {
        if !self.config.checkable {
            return Err(TreeError::FeatureDisabled("checkable"));
        }
        self.require_enabled(key)?;
        self.checked
            .set_checked(self.adapter.get_tree(), key, checked, self.config.check_strictly)?;
        self.emit_checked();
        Ok(())
    }

    /// Flip a node's checkbox. Returns the new checked value.
    pub fn toggle_checked(&mut self, key: &str) -> TreeResult<bool> {
        let checked = !self.checked.is_checked(key);
        self.set_checked(key, checked)?;
        Ok(checked)
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, key: Option<&str>) -> TreeResult<()> {
        if let Some(key) = key {
            self.require_enabled(key)?;
        }
        self.selected = key.map(str::to_string);
        let entity = self.selected_node().cloned();
        self.dispatcher.emit(TreeEvent::SelectedNodeChanged(entity));
        Ok(())
    }

    /// Apply a drag-and-drop gesture.
    pub fn drop_node(&mut self, event: DropEvent) -> TreeResult<DropOutcome> {
        if !self.config.draggable {
            return Err(TreeError::FeatureDisabled("draggable"));
        }
        self.require_enabled(&event.node)?;

        let outcome = self.adapter.apply_drop(&event)?;
        if let Some(parent) = &outcome.new_parent {
            self.expanded.insert(parent.clone());
        }
        self.resync_checked();
        self.dispatcher.emit(TreeEvent::NodeDropped(outcome.clone()));
        Ok(outcome)
    }

    /// Insert a record.
    pub fn add_node(&mut self, record: T) -> TreeResult<()> {
        self.adapter.add_node(record.clone())?;
        self.resync_checked();
        self.dispatcher.emit(TreeEvent::NodeAdded(record));
        Ok(())
    }

    /// Replace a record.
    ///
    /// Checked state is only re-derived when the parent changed.
    pub fn update_node(&mut self, record: T) -> TreeResult<()> {
        let reparented = self
            .adapter
            .find_node(record.id())
            .map(|node| node.entity.parent_id() != record.parent_id())
            .unwrap_or(false);
        self.adapter.update_node(record.clone())?;
        if reparented {
            self.resync_checked();
        }
        self.dispatcher.emit(TreeEvent::NodeUpdated(record));
        Ok(())
    }

    /// Remove a node and its descendants.
    ///
    /// Removed keys are dropped from the expanded, checked and selected
    /// state; the [`TreeEvent::NodesRemoved`] event covers that change.
    pub fn remove_node(&mut self, key: &str) -> TreeResult<Vec<T>> {
        let removed = self.adapter.handle_remove(key)?;

        for record in &removed {
            self.expanded.remove(record.id());
            self.disabled.remove(record.id());
            if self.selected.as_deref() == Some(record.id()) {
                self.selected = None;
            }
        }
        self.resync_checked();
        self.dispatcher.emit(TreeEvent::NodesRemoved(removed.clone()));
        Ok(removed)
    }

    fn require_node(&self, key: &str) -> TreeResult<()> {
        if self.adapter.get_tree().contains(key) {
            Ok(())
        } else {
            Err(TreeError::NodeNotFound(key.to_string()))
        }
    }

    fn require_enabled(&self, key: &str) -> TreeResult<()> {
        self.require_node(key)?;
        if self.disabled.contains(key) {
            return Err(TreeError::FeatureDisabled("disabled node"));
        }
        Ok(())
    }

    fn resync_checked(&mut self) {
        if self.config.checkable {
            self.checked.prune(self.adapter.get_tree(), self.config.check_strictly);
        }
    }

    fn ordered(&self, keys: &HashSet<String>) -> Vec<String> {
        let forest = self.adapter.get_tree();
        forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .filter(|node| keys.contains(&node.key))
            .map(|node| node.key.clone())
            .collect()
    }

    fn emit_expanded(&mut self) {
        let keys = self.expanded_keys();
        self.dispatcher.emit(TreeEvent::ExpandedKeysChanged(keys));
    }

    fn emit_checked(&mut self) {
        let forest = self.adapter.get_tree();
        let checked = self.checked.checked_in_order(forest);
        let half_checked = self.checked.half_checked_in_order(forest);
        self.dispatcher
            .emit(TreeEvent::CheckedKeysChanged { checked, half_checked });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXPAND_ALL;
    use crate::node::NodeRecord;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<TreeEvent<NodeRecord>>>>;

    fn records() -> Vec<NodeRecord> {
        vec![
            NodeRecord::root("r", "Root"),
            NodeRecord::child("a", "r", "A"),
            NodeRecord::child("a1", "a", "A1"),
            NodeRecord::child("b", "r", "B"),
        ]
    }

    fn view(config: TreeConfig) -> (TreeView<NodeRecord>, Log) {
        let mut view = TreeView::new(TreeAdapter::new(records()), config);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        view.subscribe(move |e: &TreeEvent<NodeRecord>| sink.borrow_mut().push(e.clone()));
        (view, log)
    }

    fn row_keys(view: &TreeView<NodeRecord>) -> Vec<String> {
        view.visible_rows().into_iter().map(|r| r.key).collect()
    }

    #[test]
    fn test_default_expand_depth() {
        let (collapsed, _) = view(TreeConfig::default());
        assert_eq!(row_keys(&collapsed), vec!["r"]);

        let (one_level, _) = view(TreeConfig::default().with_expand_depth(1));
        assert_eq!(row_keys(&one_level), vec!["r", "a", "b"]);

        let (all, _) = view(TreeConfig::default().with_expand_depth(EXPAND_ALL));
        assert_eq!(row_keys(&all), vec!["r", "a", "a1", "b"]);
        assert_eq!(all.visible_rows()[2].depth, 2);
    }

    #[test]
    fn test_expand_gestures_emit_once() {
        let (mut view, log) = view(TreeConfig::default());
        assert!(view.toggle_expanded("r").unwrap());
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(
            log.borrow()[0],
            TreeEvent::ExpandedKeysChanged(vec!["r".to_string()])
        );

        view.expand_to("a1").unwrap();
        assert_eq!(view.expanded_keys(), vec!["r", "a"]);

        view.collapse_all();
        assert!(view.expanded_keys().is_empty());
        view.expand_all();
        assert_eq!(view.expanded_keys(), vec!["r", "a"]);

        view.set_expanded_keys(["a", "ghost"]);
        assert_eq!(view.expanded_keys(), vec!["a"]);
        assert_eq!(log.borrow().len(), 5);

        assert!(view.toggle_expanded("ghost").is_err());
        assert_eq!(log.borrow().len(), 5);
    }

    #[test]
    fn test_check_cascade_through_view() {
        let (mut view, log) = view(TreeConfig::checkable());
        view.set_checked("a1", true).unwrap();

        assert_eq!(view.flags("a").unwrap().checked, CheckState::Checked);
        assert_eq!(view.flags("r").unwrap().checked, CheckState::Indeterminate);
        assert_eq!(
            log.borrow().last().cloned(),
            Some(TreeEvent::CheckedKeysChanged {
                checked: vec!["a".to_string(), "a1".to_string()],
                half_checked: vec!["r".to_string()],
            })
        );

        assert!(!view.toggle_checked("a").unwrap());
        assert_eq!(view.flags("a1").unwrap().checked, CheckState::Unchecked);
    }

    #[test]
    fn test_check_requires_checkable() {
        let (mut view, log) = view(TreeConfig::default());
        assert_eq!(
            view.set_checked("a", true).unwrap_err(),
            TreeError::FeatureDisabled("checkable")
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_seeded_checked_keys() {
        let view = TreeView::new(TreeAdapter::new(records()), TreeConfig::checkable())
            .with_checked_keys(["b"]);
        assert_eq!(view.flags("r").unwrap().checked, CheckState::Indeterminate);
        assert_eq!(view.checked_keys().checked_in_order(view.adapter().get_tree()), vec!["b"]);
    }

    #[test]
    fn test_select_and_disabled() {
        let (mut view, log) = view(TreeConfig::checkable());
        view.select(Some("a")).unwrap();
        assert_eq!(view.selected_node().map(|r| r.id.as_str()), Some("a"));
        assert!(view.flags("a").unwrap().selected);
        assert_eq!(
            log.borrow().last().cloned(),
            Some(TreeEvent::SelectedNodeChanged(Some(NodeRecord::child("a", "r", "A"))))
        );

        view.select(None).unwrap();
        assert!(view.selected_node().is_none());

        let mut view = view.with_disabled_keys(["b"]);
        assert!(view.flags("b").unwrap().disabled);
        assert!(view.select(Some("b")).is_err());
        assert!(view.set_checked("b", true).is_err());
    }

    #[test]
    fn test_drop_through_view() {
        let (mut view, log) = view(TreeConfig::checkable().with_draggable(true));
        view.set_checked("a1", true).unwrap();

        let outcome = view.drop_node(DropEvent::inside("a1", "b")).unwrap();
        assert_eq!(outcome.new_parent.as_deref(), Some("b"));
        assert_eq!(view.expanded_keys(), vec!["b"]);
        assert_eq!(view.flags("b").unwrap().checked, CheckState::Checked);
        assert!(view.flags("a").unwrap().is_leaf);
        assert!(matches!(log.borrow().last(), Some(TreeEvent::NodeDropped(_))));

        let err = view.drop_node(DropEvent::inside("r", "a1")).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_drop_requires_draggable() {
        let (mut view, _) = view(TreeConfig::default());
        assert_eq!(
            view.drop_node(DropEvent::to_root("a")).unwrap_err(),
            TreeError::FeatureDisabled("draggable")
        );
    }

    #[test]
    fn test_remove_prunes_state() {
        let (mut view, log) = view(TreeConfig::checkable().with_expand_depth(EXPAND_ALL));
        view.set_checked("a1", true).unwrap();
        view.select(Some("a1")).unwrap();

        let removed = view.remove_node("a").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(view.selected_node().is_none());
        assert_eq!(view.expanded_keys(), vec!["r"]);
        assert!(view.checked_keys().checked().is_empty());
        assert_eq!(view.flags("r").unwrap().checked, CheckState::Unchecked);
        assert!(matches!(log.borrow().last(), Some(TreeEvent::NodesRemoved(r)) if r.len() == 2));
    }

    #[test]
    fn test_update_resyncs_only_on_reparent() {
        let (mut view, _) = view(TreeConfig::checkable());
        view.set_checked("a1", true).unwrap();
        let before = view.checked_keys().clone();

        view.update_node(NodeRecord::child("a1", "a", "Renamed")).unwrap();
        assert_eq!(view.checked_keys(), &before);
        assert_eq!(view.adapter().find_node("a1").unwrap().title, "Renamed");

        view.update_node(NodeRecord::child("a1", "b", "Renamed")).unwrap();
        assert_eq!(view.flags("b").unwrap().checked, CheckState::Checked);
        assert_eq!(view.flags("r").unwrap().checked, CheckState::Checked);
        assert!(view.flags("a").unwrap().is_leaf);
    }

    #[test]
    fn test_add_and_update_emit() {
        let (mut view, log) = view(TreeConfig::default());
        view.add_node(NodeRecord::child("c", "r", "C")).unwrap();
        view.update_node(NodeRecord::child("c", "r", "See")).unwrap();

        assert_eq!(view.adapter().find_node("c").unwrap().title, "See");
        let types: Vec<_> = log.borrow().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["tree.node.added", "tree.node.updated"]);
    }
}
