//! Conversion between flat collections and trees
//!
//! Pure functions: no state, no side effects beyond diagnostics logging.

use std::collections::HashMap;

use crate::forest::Forest;
use crate::node::BaseNode;

/// Resolve the title shown for a record.
///
/// Prefers a non-empty `display_name`, then a non-empty `name`, then the
/// empty string.
///
/// # Examples
///
/// ```
/// use console_tree::{resolve_display_name, NodeRecord};
///
/// let record = NodeRecord::root("1", "Just Name");
/// assert_eq!(resolve_display_name(&record), "Just Name");
///
/// let record = NodeRecord::root("2", "n").with_display_name("Display");
/// assert_eq!(resolve_display_name(&record), "Display");
/// ```
pub fn resolve_display_name<T: BaseNode>(record: &T) -> String {
    record
        .display_name()
        .filter(|s| !s.is_empty())
        .or_else(|| record.name().filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// Build a tree from a flat collection, titling nodes with
/// [`resolve_display_name`].
///
/// Roots are records without a parent, or whose parent id matches no record
/// in the input. Siblings keep their input order.
pub fn list_to_tree<T: BaseNode>(records: Vec<T>) -> Forest<T> {
    list_to_tree_with(records, resolve_display_name)
}

/// Build a tree from a flat collection with a custom title resolver.
pub fn list_to_tree_with<T, F>(records: Vec<T>, resolver: F) -> Forest<T>
where
    T: BaseNode,
    F: Fn(&T) -> String,
{
    Forest::build(records, resolver)
}

/// Flatten a tree back into records, parents before children.
///
/// Each sibling group keeps its relative order. The global order only
/// matches the original collection when the input already listed every
/// parent before its children and kept each subtree contiguous.
pub fn tree_to_list<T: BaseNode>(forest: &Forest<T>) -> Vec<T> {
    forest
        .pre_order()
        .filter_map(|id| forest.get(id))
        .map(|node| node.entity.clone())
        .collect()
}

/// Index records by id. On duplicate ids the last record wins.
pub fn list_to_map<T: BaseNode>(records: &[T]) -> HashMap<String, T> {
    records
        .iter()
        .map(|record| (record.id().to_string(), record.clone()))
        .collect()
}
