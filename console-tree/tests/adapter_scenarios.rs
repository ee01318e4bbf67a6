//! Scenario tests for the tree adapter.
//!
//! These tests drive the public API the way a tree-picker screen does:
//! build from a REST payload, mutate, and check that the flat list and the
//! tree stay in step.

use console_tree::{
    list_to_tree, resolve_display_name, tree_to_list, BaseNode, CheckState, CheckedKeys,
    DropEvent, NodeRecord, TreeAdapter, TreeError,
};
use pretty_assertions::assert_eq;

fn ids(records: &[NodeRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_basic_adapter_build() {
    let adapter = TreeAdapter::new(vec![
        NodeRecord::root("1", "Root"),
        NodeRecord::child("2", "1", "Child1"),
        NodeRecord::child("3", "1", "Child2"),
    ]);

    let roots: Vec<_> = adapter.get_tree().root_nodes().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].children.len(), 2);
    assert!(!roots[0].is_leaf());
    assert!(adapter.find_node("2").unwrap().is_leaf());
    assert!(adapter.find_node("3").unwrap().is_leaf());
}

#[test]
fn test_build_from_json_payload() {
    let payload = r#"[
        {"id":"1","parentId":null,"name":"Root"},
        {"id":"2","parentId":"1","name":"Child1","displayName":"First child"},
        {"id":"3","parentId":"1","name":"Child2"}
    ]"#;
    let records: Vec<NodeRecord> = serde_json::from_str(payload).unwrap();
    let adapter = TreeAdapter::new(records);

    assert_eq!(adapter.find_node("2").unwrap().title, "First child");
    assert_eq!(adapter.path("3"), vec!["Root", "Child2"]);
}

#[test]
fn test_tolerant_root() {
    let adapter = TreeAdapter::new(vec![NodeRecord::child("x", "missing", "Orphan")]);
    let roots: Vec<_> = adapter.get_tree().root_nodes().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].key, "x");
    assert_eq!(roots[0].entity.parent_id(), Some("missing"));
}

#[test]
fn test_drop_into_via_handle_drop() {
    let mut adapter = TreeAdapter::new(vec![
        NodeRecord::root("a", "A"),
        NodeRecord::child("b", "a", "B"),
        NodeRecord::root("c", "C"),
    ]);

    let mut c = adapter.find_node("c").unwrap().entity.clone();
    c.set_parent_id(Some("b".to_string()));
    adapter.handle_drop(c).unwrap();

    let a = adapter.find_node("a").unwrap();
    assert_eq!(a.children.len(), 1);
    let b = adapter.find_node("b").unwrap();
    assert_eq!(b.children.len(), 1);
    assert_eq!(adapter.get_tree().get(b.children[0]).unwrap().key, "c");
    assert_eq!(adapter.get_tree().roots().len(), 1);
}

#[test]
fn test_cycle_rejection_keeps_structure() {
    let mut adapter = TreeAdapter::new(vec![
        NodeRecord::root("A", "A"),
        NodeRecord::child("B", "A", "B"),
        NodeRecord::child("C", "B", "C"),
    ]);
    let outline = adapter.get_tree().outline();
    let list = adapter.get_list();

    let err = adapter.apply_drop(&DropEvent::inside("A", "C")).unwrap_err();
    assert_eq!(
        err,
        TreeError::CycleDetected {
            node: "A".to_string(),
            parent: "C".to_string(),
        }
    );

    let mut a = adapter.find_node("A").unwrap().entity.clone();
    a.set_parent_id(Some("C".to_string()));
    assert!(adapter.handle_drop(a.clone()).is_err());
    assert!(adapter.update_node(a).is_err());

    assert_eq!(adapter.get_tree().outline(), outline);
    assert_eq!(adapter.get_list(), list);
}

#[test]
fn test_cascade_delete_counts() {
    let mut adapter = TreeAdapter::new(vec![
        NodeRecord::root("r", "Root"),
        NodeRecord::child("a", "r", "A"),
        NodeRecord::child("a1", "a", "A1"),
        NodeRecord::child("a2", "a", "A2"),
        NodeRecord::child("a21", "a2", "A21"),
        NodeRecord::child("b", "r", "B"),
    ]);
    let before = adapter.get_list().len();
    let descendants = adapter.descendants("a").len();
    assert_eq!(descendants, 3);

    let removed = adapter.handle_remove("a").unwrap();
    assert_eq!(removed.len(), descendants + 1);
    assert_eq!(adapter.get_list().len(), before - (descendants + 1));
    for record in &removed {
        assert!(adapter.find_node(&record.id).is_none());
    }
    assert_eq!(ids(&adapter.get_list()), vec!["r", "b"]);
}

#[test]
fn test_list_reflects_reparent() {
    let mut adapter = TreeAdapter::new(vec![
        NodeRecord::root("a", "A"),
        NodeRecord::root("b", "B"),
        NodeRecord::child("a1", "a", "A1"),
    ]);
    adapter.apply_drop(&DropEvent::inside("b", "a1")).unwrap();
    assert_eq!(ids(&adapter.get_list()), vec!["a", "a1", "b"]);
    assert_eq!(adapter.find_node("b").unwrap().depth, 2);
}

#[test]
fn test_round_trip_interleaved_siblings() {
    let records = vec![
        NodeRecord::root("p", "P"),
        NodeRecord::root("q", "Q"),
        NodeRecord::child("q1", "q", "Q1"),
        NodeRecord::child("p1", "p", "P1"),
        NodeRecord::child("q2", "q", "Q2"),
        NodeRecord::child("p2", "p", "P2"),
    ];
    let list = tree_to_list(&list_to_tree(records));
    assert_eq!(ids(&list), vec!["p", "p1", "p2", "q", "q1", "q2"]);
}

#[test]
fn test_display_name_scenarios() {
    assert_eq!(resolve_display_name(&NodeRecord::root("1", "Just Name")), "Just Name");
    assert_eq!(
        resolve_display_name(&NodeRecord::root("2", "n").with_display_name("Display")),
        "Display"
    );
}

#[test]
fn test_checked_keys_survive_rebuild() {
    let mut adapter = TreeAdapter::new(vec![
        NodeRecord::root("r", "Root"),
        NodeRecord::child("a", "r", "A"),
        NodeRecord::child("b", "r", "B"),
    ]);
    let mut keys = CheckedKeys::new();
    keys.set_checked(adapter.get_tree(), "a", true, false).unwrap();

    adapter.add_node(NodeRecord::child("c", "r", "C")).unwrap();
    keys.prune(adapter.get_tree(), false);
    assert_eq!(keys.state("r"), CheckState::Indeterminate);
    assert_eq!(keys.state("a"), CheckState::Checked);
}
