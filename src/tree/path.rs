//! Path matching for the snapshot trie
//!
//! Stateless comparisons between a node label (`path_to_parent`, possibly several
//! segments long) and the unconsumed suffix of an absolute path. All offsets are
//! byte offsets; separators are ASCII so segment boundaries are always valid
//! `str` boundaries.

use crate::types::{CaseSensitivity, SEPARATOR};
use std::cmp::Ordering;

/// Relationship between a child label and a path suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
    /// The suffix is exactly the label.
    Same,
    /// The suffix continues below the label, past a separator.
    Descendant,
    /// The label continues below the suffix, past a separator.
    Ancestor,
    /// Both share `common_prefix` bytes of whole segments, then diverge.
    Diverging { common_prefix: usize },
    /// The first segments differ. Carries the order of the label relative to the suffix.
    Unrelated(Ordering),
}

/// Classify `child_path` against `path[offset..]`.
pub fn relate(child_path: &str, path: &str, offset: usize, case: CaseSensitivity) -> PathRelation {
    let child = child_path.as_bytes();
    let suffix = &path.as_bytes()[offset..];
    let shared = child.len().min(suffix.len());
    let mut last_separator = None;

    for i in 0..shared {
        let (c, s) = (case.fold(child[i]), case.fold(suffix[i]));
        if c != s {
            return diverged(child, suffix, i, last_separator, case);
        }
        if c == SEPARATOR {
            last_separator = Some(i);
        }
    }

    match child.len().cmp(&suffix.len()) {
        Ordering::Equal => PathRelation::Same,
        Ordering::Less if suffix[shared] == SEPARATOR => PathRelation::Descendant,
        Ordering::Greater if child[shared] == SEPARATOR => PathRelation::Ancestor,
        _ => diverged(child, suffix, shared, last_separator, case),
    }
}

fn diverged(
    child: &[u8],
    suffix: &[u8],
    at: usize,
    last_separator: Option<usize>,
    case: CaseSensitivity,
) -> PathRelation {
    match last_separator {
        Some(common_prefix) => PathRelation::Diverging { common_prefix },
        None => PathRelation::Unrelated(
            sort_key(child.get(at), case).cmp(&sort_key(suffix.get(at), case)),
        ),
    }
}

/// A segment end (separator or end of string) sorts before any other byte.
#[inline]
fn sort_key(byte: Option<&u8>, case: CaseSensitivity) -> u16 {
    match byte {
        None | Some(&SEPARATOR) => 0,
        Some(&b) => u16::from(case.fold(b)) + 1,
    }
}

/// Binary-search key: `Equal` whenever the label covers the suffix's first segment.
pub fn compare_with_common_prefix(
    child_path: &str,
    path: &str,
    offset: usize,
    case: CaseSensitivity,
) -> Ordering {
    match relate(child_path, path, offset, case) {
        PathRelation::Unrelated(ordering) => ordering,
        _ => Ordering::Equal,
    }
}

/// Order two labels by their first segment.
pub fn compare_first_segments(a: &str, b: &str, case: CaseSensitivity) -> Ordering {
    compare_with_common_prefix(a, b, 0, case)
}

/// Locate the child covering `path[offset..]` in a sorted slice.
///
/// Returns `Ok(index)` for a covering child, or `Err(index)` with the position
/// at which a new sibling keeps the slice sorted.
pub fn find_child<T>(
    children: &[T],
    label: impl Fn(&T) -> &str,
    path: &str,
    offset: usize,
    case: CaseSensitivity,
) -> Result<usize, usize> {
    children.binary_search_by(|child| compare_with_common_prefix(label(child), path, offset, case))
}

/// Offset of the first segment below a child labelled with `label_len` bytes.
#[inline]
pub fn descend(offset: usize, label_len: usize) -> usize {
    offset + label_len + 1
}

/// Panics unless `offset` starts a segment of `path`.
#[inline]
pub fn assert_segment_boundary(path: &str, offset: usize) {
    let bytes = path.as_bytes();
    assert!(
        offset < bytes.len(),
        "offset {} out of range for path {:?}",
        offset,
        path
    );
    assert!(
        bytes[offset] != SEPARATOR && (offset == 0 || bytes[offset - 1] == SEPARATOR),
        "offset {} is not at a segment boundary of {:?}",
        offset,
        path
    );
}

/// Panics unless `path` is absolute with non-empty segments.
pub fn assert_valid_absolute_path(path: &str) {
    assert!(
        is_valid_absolute_path(path),
        "invalid absolute path {:?}",
        path
    );
}

pub fn is_valid_absolute_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    match path.strip_prefix('/') {
        Some(rest) => rest.split('/').all(|segment| !segment.is_empty()),
        None => false,
    }
}

/// Absolute path of `name` directly below `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}
