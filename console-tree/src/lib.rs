//! # Console Tree
//!
//! This crate provides the hierarchical list/tree adapter behind the admin
//! console's tree pickers (organization units, folders, permission trees).
//!
//! ## Overview
//!
//! The console-tree crate handles:
//! - **Conversion**: Flat parent-referencing records to a tree and back
//! - **Adapter**: A flat collection and its derived tree, kept consistent
//!   under add, update, remove and reparent
//! - **Drag and drop**: Before / inside / after drops with cycle rejection
//! - **Checkboxes**: Cascading or strict tri-state check propagation
//! - **View**: Expanded/checked/selected state and gesture events for a
//!   renderer
//!
//! ## Architecture
//!
//! ```text
//! Vec<T: BaseNode>
//!   └─ TreeAdapter
//!        └─ Forest (arena of TreeNode, roots, id index)
//!             └─ TreeView (expanded, CheckedKeys, selection)
//!                  └─ TreeEvent → caller persists
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use console_tree::{DropEvent, NodeRecord, TreeAdapter};
//!
//! let mut adapter = TreeAdapter::new(vec![
//!     NodeRecord::root("1", "Root"),
//!     NodeRecord::child("2", "1", "Child1"),
//!     NodeRecord::child("3", "1", "Child2"),
//! ]);
//!
//! // Move Child2 in front of Child1
//! adapter.apply_drop(&DropEvent::before("3", "2")).unwrap();
//! let order: Vec<_> = adapter.get_list().into_iter().map(|r| r.id).collect();
//! assert_eq!(order, vec!["1", "3", "2"]);
//! ```
//!
//! ## Tolerance
//!
//! Records whose parent id resolves to nothing become roots, duplicate ids
//! resolve to the last record, and lookups of unknown keys return `None`.
//! Only moves that would create a cycle are rejected.

pub mod adapter;
pub mod check;
pub mod config;
pub mod convert;
pub mod drop;
pub mod error;
pub mod event;
pub mod forest;
pub mod node;
pub mod view;

// Re-export main types for convenience
pub use adapter::TreeAdapter;
pub use check::{CheckState, CheckedKeys};
pub use config::{ConfigError, TreeConfig, EXPAND_ALL};
pub use convert::{list_to_map, list_to_tree, list_to_tree_with, resolve_display_name, tree_to_list};
pub use drop::{DropEvent, DropOutcome, DropPosition};
pub use error::{TreeError, TreeResult};
pub use event::{EventDispatcher, TreeEvent, TreeEventHandler};
pub use forest::{Ancestors, Forest, PreOrder};
pub use node::{BaseNode, NodeId, NodeRecord, TreeNode};
pub use view::{NodeFlags, TreeView, VisibleRow};
