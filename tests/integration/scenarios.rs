use crate::support::{file, node_at};
use snapshot_vfs::{CaseSensitivity, MetadataSnapshot, NodeKind, SnapshotHierarchy};
use std::sync::Arc;

fn empty() -> SnapshotHierarchy {
    SnapshotHierarchy::empty(CaseSensitivity::Sensitive)
}

fn labels(tree: &SnapshotHierarchy) -> Vec<String> {
    tree.root()
        .children()
        .iter()
        .map(|c| c.path_to_parent().to_string())
        .collect()
}

#[test]
fn compression_keeps_unbranched_chain_in_one_node() {
    let tree = empty().update(file("/a/b/c.txt"));
    assert_eq!(labels(&tree), vec!["a/b/c.txt"]);
    let leaf = &tree.root().children()[0];
    assert!(leaf.children().is_empty());
    assert_eq!(leaf.own_snapshot(), Some(&file("/a/b/c.txt")));
}

#[test]
fn branching_splits_chain_at_shared_prefix() {
    let tree = empty()
        .update(file("/a/b/c.txt"))
        .update(file("/a/b/d.txt"));
    assert_eq!(labels(&tree), vec!["a/b"]);
    let split = &tree.root().children()[0];
    assert_eq!(split.kind(), NodeKind::Partial);
    let names: Vec<&str> = split.children().iter().map(|c| c.path_to_parent()).collect();
    assert_eq!(names, vec!["c.txt", "d.txt"]);
    assert_eq!(tree.snapshot_at("/a/b/c.txt"), Some(file("/a/b/c.txt")));
    assert_eq!(tree.snapshot_at("/a/b/d.txt"), Some(file("/a/b/d.txt")));
    assert_eq!(tree.snapshot_at("/a/b"), None);
}

#[test]
fn invalidating_leaf_preserves_sibling() {
    let before = empty()
        .update(file("/a/b/c.txt"))
        .update(file("/a/b/d.txt"));
    let sibling = node_at(&before, "/a/b/d.txt").unwrap();

    let after = before.invalidate("/a/b/c.txt");
    assert_eq!(after.snapshot_at("/a/b/c.txt"), None);
    assert_eq!(after.snapshot_at("/a/b/d.txt"), Some(file("/a/b/d.txt")));
    assert!(Arc::ptr_eq(&node_at(&after, "/a/b/d.txt").unwrap(), &sibling));
    assert_eq!(before.snapshot_at("/a/b/c.txt"), Some(file("/a/b/c.txt")));
}

#[test]
fn invalidating_unknown_child_coarsens_complete_directory() {
    let tree = empty()
        .update(MetadataSnapshot::directory("/d", true))
        .update(file("/d/one"))
        .update(file("/d/two"));
    assert_eq!(tree.snapshot_at("/d/three"), Some(MetadataSnapshot::missing("/d/three")));

    let after = tree.invalidate("/d/three");
    assert_eq!(after.snapshot_at("/d"), Some(MetadataSnapshot::directory("/d", false)));
    assert_eq!(after.snapshot_at("/d/three"), None);
    assert_eq!(after.snapshot_at("/d/one"), Some(file("/d/one")));
    assert_eq!(after.snapshot_at("/d/two"), Some(file("/d/two")));
    let d = node_at(&after, "/d").unwrap();
    assert_eq!(d.children().len(), 2);
}

#[test]
fn removing_known_child_revokes_completeness() {
    let tree = empty()
        .update(MetadataSnapshot::directory("/d", true))
        .update(file("/d/one"))
        .update(file("/d/two"));

    let after = tree.invalidate("/d/one");
    assert_eq!(after.snapshot_at("/d"), Some(MetadataSnapshot::directory("/d", false)));
    assert_eq!(after.snapshot_at("/d/one"), None);
    assert_eq!(after.snapshot_at("/d/two"), Some(file("/d/two")));
}

#[test]
fn invalidating_inside_known_child_keeps_parent_complete() {
    let tree = empty()
        .update(MetadataSnapshot::directory("/d", true))
        .update(MetadataSnapshot::directory("/d/sub", true))
        .update(file("/d/sub/x"));

    let after = tree.invalidate("/d/sub/y");
    assert_eq!(after.snapshot_at("/d"), Some(MetadataSnapshot::directory("/d", true)));
    assert_eq!(after.snapshot_at("/d/sub"), Some(MetadataSnapshot::directory("/d/sub", false)));
    assert_eq!(after.snapshot_at("/d/sub/x"), Some(file("/d/sub/x")));
}

#[test]
fn empty_complete_directory_is_terminal() {
    let tree = empty().update(MetadataSnapshot::directory("/empty", true));
    let node = node_at(&tree, "/empty").unwrap();
    assert_eq!(node.kind(), NodeKind::CompleteDirectory);
    assert!(node.children().is_empty());
    assert_eq!(tree.snapshot_at("/empty/anything/below"), Some(MetadataSnapshot::missing("/empty/anything/below")));
}

#[test]
fn update_shares_untouched_subtrees() {
    let tree = empty()
        .update(file("/left/a"))
        .update(file("/left/b"))
        .update(file("/right/c"))
        .update(file("/right/d"));
    let left = node_at(&tree, "/left").unwrap();

    let updated = tree.update(file("/right/e"));
    assert!(Arc::ptr_eq(&node_at(&updated, "/left").unwrap(), &left));
    assert!(!Arc::ptr_eq(updated.root(), tree.root()));
    assert_eq!(tree.snapshot_at("/right/e"), None);
    assert_eq!(updated.snapshot_at("/right/e"), Some(file("/right/e")));
}

#[test]
fn split_relabels_without_copying_contents() {
    let tree = empty()
        .update(file("/a/b/c/x"))
        .update(file("/a/b/c/y"));
    let chain = node_at(&tree, "/a/b/c").unwrap();

    let updated = tree.update(file("/a/z"));
    let moved = node_at(&updated, "/a/b/c").unwrap();
    assert_eq!(moved.path_to_parent(), "b/c");
    for (old, new) in chain.children().iter().zip(moved.children()) {
        assert!(Arc::ptr_eq(old, new));
    }
}

#[test]
fn partial_segment_prefix_does_not_match() {
    let tree = empty().update(file("/src/lib.rs"));
    assert_eq!(tree.snapshot_at("/sr"), None);
    assert_eq!(tree.snapshot_at("/src/lib"), None);
    let tree = tree.update(file("/srcs/main.rs"));
    assert_eq!(tree.root().children().len(), 2);
    assert_eq!(tree.snapshot_at("/src/lib.rs"), Some(file("/src/lib.rs")));
    assert_eq!(tree.snapshot_at("/srcs/main.rs"), Some(file("/srcs/main.rs")));
}

#[test]
fn invalidating_ancestor_drops_whole_subtree() {
    let tree = empty()
        .update(file("/a/b/c.txt"))
        .update(file("/a/b/d.txt"))
        .update(file("/x"));
    let after = tree.invalidate("/a");
    assert_eq!(after.snapshot_at("/a/b/c.txt"), None);
    assert_eq!(after.snapshot_at("/a/b/d.txt"), None);
    assert_eq!(after.snapshot_at("/x"), Some(file("/x")));
    assert_eq!(after.root().node_count(), 2);
}
