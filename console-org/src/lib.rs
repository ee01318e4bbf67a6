//! # Console Organization Trees
//!
//! This crate provides the tree-shaped records of the admin console and
//! wires them into [`console_tree`].
//!
//! ## Overview
//!
//! The console-org crate handles:
//! - **Organization units**: Department trees with dotted hierarchical codes
//! - **Permission grants**: Permission trees edited through checkboxes
//!
//! ## Architecture
//!
//! ```text
//! OrganizationUnit ─┐
//!                   ├─ BaseNode ─→ TreeAdapter
//! PermissionGrant ──┘                 ├─ recompute_codes (after a move)
//!                                     └─ PermissionTreeEditor (CheckedKeys, diff)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use console_org::{next_child_code, recompute_codes, OrganizationUnit};
//! use console_tree::{DropEvent, TreeAdapter};
//!
//! let head = OrganizationUnit::new("Head Office", "00001");
//! let sales = head.create_child("Sales", "00001.00001");
//! let branch = OrganizationUnit::new("Branch", "00002");
//! let mut adapter = TreeAdapter::new(vec![head.clone(), sales.clone(), branch.clone()]);
//!
//! assert_eq!(next_child_code(&adapter, Some(&head.id)).unwrap(), "00001.00002");
//!
//! adapter.apply_drop(&DropEvent::inside(sales.id.clone(), branch.id.clone())).unwrap();
//! let changed = recompute_codes(&adapter);
//! assert_eq!(changed[0].code, "00002.00001");
//! ```

pub mod permission;
pub mod unit;

// Re-export main types for convenience
pub use permission::{PermissionChange, PermissionGrant, PermissionTreeEditor};
pub use unit::{next_child_code, recompute_codes, OrganizationUnit, CODE_UNIT_LENGTH};
