use snapshot_vfs::tree::hasher;
use snapshot_vfs::{
    CaseSensitivity, DiskProbe, FileSystemAccess, FileType, MetadataSnapshot, ProbeError,
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn as_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[test]
fn disk_lookup_records_every_segment() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("pkg").join("src");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("lib.rs"), b"pub fn f() {}").unwrap();

    let access = FileSystemAccess::new(DiskProbe, CaseSensitivity::Sensitive);
    let file_path = as_str(&nested.join("lib.rs"));
    let node = access.lookup(&file_path).unwrap();

    assert_eq!(node.file_type(), FileType::File);
    match access.snapshot_at(&file_path) {
        Some(MetadataSnapshot::RegularFile(file)) => {
            assert_eq!(file.length, 13);
            assert_eq!(file.content_hash, hasher::hash_bytes(b"pub fn f() {}"));
        }
        other => panic!("unexpected snapshot {:?}", other),
    }
    assert_eq!(
        access.snapshot_at(&as_str(&nested)),
        Some(MetadataSnapshot::directory(as_str(&nested), false))
    );

    let below = node.get_child("not-a-dir").unwrap();
    assert_eq!(below.file_type(), FileType::Missing);
    assert!(access.hierarchy().root().is_well_formed(CaseSensitivity::Sensitive));
}

#[test]
fn invalidate_then_reprobe_sees_disk_changes() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("config.toml");
    let target_path = as_str(&target);

    let access = FileSystemAccess::new(DiskProbe, CaseSensitivity::Sensitive);
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::Missing);

    fs::write(&target, b"x = 1").unwrap();
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::Missing);

    access.invalidate(&target_path);
    assert_eq!(access.snapshot_at(&target_path), None);
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::File);
    assert_eq!(
        access.snapshot_at(&target_path).map(|s| s.file_type()),
        Some(FileType::File)
    );
}

#[test]
fn concurrent_lookups_converge_on_one_node() {
    let probes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&probes);
    let probe = move |path: &str| -> Result<MetadataSnapshot, ProbeError> {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::yield_now();
        Ok(MetadataSnapshot::directory(path, false))
    };
    let access = FileSystemAccess::new(probe, CaseSensitivity::Sensitive);
    let threads = 8;
    let barrier = Barrier::new(threads);

    let nodes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    access.lookup("/shared/dir").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for node in &nodes[1..] {
        assert!(Arc::ptr_eq(node, &nodes[0]));
    }
    assert!(probes.load(Ordering::SeqCst) >= 2);
    assert!(probes.load(Ordering::SeqCst) <= 2 * threads);
    assert_eq!(
        access.snapshot_at("/shared/dir"),
        Some(MetadataSnapshot::directory("/shared/dir", false))
    );
    let mut recorded = Vec::new();
    access
        .hierarchy()
        .accept(&mut |s: &MetadataSnapshot| recorded.push(s.absolute_path().to_string()));
    assert_eq!(recorded, vec!["/shared", "/shared/dir"]);
}

#[test]
fn case_insensitive_lookup_shares_cache_entry() {
    let probes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&probes);
    let probe = move |path: &str| -> Result<MetadataSnapshot, ProbeError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(MetadataSnapshot::directory(path, false))
    };
    let access = FileSystemAccess::new(probe, CaseSensitivity::Insensitive);
    let upper = access.lookup("/Docs").unwrap();
    let lower = access.lookup("/docs").unwrap();
    assert!(Arc::ptr_eq(&upper, &lower));
    assert_eq!(probes.load(Ordering::SeqCst), 1);
    assert!(access.snapshot_at("/DOCS").is_some());
}

#[test]
fn recorded_write_is_visible_without_probe() {
    let probes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&probes);
    let probe = move |path: &str| -> Result<MetadataSnapshot, ProbeError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(MetadataSnapshot::directory(path, false))
    };
    let access = FileSystemAccess::new(probe, CaseSensitivity::Sensitive);
    access.lookup("/out").unwrap();
    let written = MetadataSnapshot::regular_file("/out/result.bin", hasher::hash_bytes(b"ok"), 2);
    access.record(written.clone());

    let node = access.lookup("/out/result.bin").unwrap();
    assert_eq!(node.snapshot(), Some(&written));
    assert_eq!(probes.load(Ordering::SeqCst), 1);
}

#[test]
fn file_replaced_by_directory_then_recorded_child() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    fs::write(&target, b"old").unwrap();
    let target_path = as_str(&target);

    let access = FileSystemAccess::new(DiskProbe, CaseSensitivity::Sensitive);
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::File);

    fs::remove_file(&target).unwrap();
    fs::create_dir(&target).unwrap();
    fs::write(target.join("part.bin"), b"ab").unwrap();
    let child_path = as_str(&target.join("part.bin"));
    let written = MetadataSnapshot::regular_file(child_path.as_str(), hasher::hash_bytes(b"ab"), 2);
    access.record(written.clone());

    assert_eq!(access.snapshot_at(&child_path), Some(written.clone()));
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::Directory);
    assert_eq!(access.lookup(&child_path).unwrap().snapshot(), Some(&written));
    assert!(access.hierarchy().root().is_well_formed(CaseSensitivity::Sensitive));
}

#[test]
fn file_replaced_by_directory_then_invalidated_child() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    fs::write(&target, b"old").unwrap();
    let target_path = as_str(&target);

    let access = FileSystemAccess::new(DiskProbe, CaseSensitivity::Sensitive);
    assert_eq!(access.lookup(&target_path).unwrap().file_type(), FileType::File);

    fs::remove_file(&target).unwrap();
    fs::create_dir(&target).unwrap();
    fs::write(target.join("x"), b"new").unwrap();
    let child_path = as_str(&target.join("x"));
    access.invalidate(&child_path);

    assert_eq!(access.snapshot_at(&target_path), None);
    assert!(access.cached_node(&target_path).is_none());
    assert_eq!(access.lookup(&child_path).unwrap().file_type(), FileType::File);
    assert_eq!(
        access.snapshot_at(&target_path),
        Some(MetadataSnapshot::directory(target_path.as_str(), false))
    );
}

fn assert_cache_matches_trie(access: &FileSystemAccess, node: &Arc<snapshot_vfs::LazyNode>) {
    for child in node.cached_children() {
        assert_eq!(
            access.snapshot_at(child.absolute_path()),
            child.snapshot().cloned(),
            "cached {} disagrees with the trie",
            child.absolute_path()
        );
        assert_cache_matches_trie(access, &child);
    }
}

#[test]
fn racing_lookups_and_invalidations_keep_cache_and_trie_aligned() {
    let probe = |path: &str| -> Result<MetadataSnapshot, ProbeError> {
        thread::yield_now();
        if path.ends_with(".rs") {
            Ok(MetadataSnapshot::regular_file(path, [3u8; 32], 1))
        } else {
            Ok(MetadataSnapshot::directory(path, false))
        }
    };
    let access = FileSystemAccess::new(probe, CaseSensitivity::Sensitive);
    let threads = 6;
    let barrier = Barrier::new(threads);

    thread::scope(|scope| {
        for t in 0..threads {
            let access = &access;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    match (t + i) % 4 {
                        0 => access.invalidate("/a"),
                        1 => access.invalidate("/a/b"),
                        _ => {
                            access.lookup("/a/b/c.rs").unwrap();
                        }
                    }
                }
            });
        }
    });

    assert_cache_matches_trie(&access, access.root());
}
