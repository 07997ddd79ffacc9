//! Content fingerprints for regular files

use crate::types::Hash;
use std::fs::File;
use std::io;
use std::path::Path;

/// Fingerprint of an in-memory buffer.
pub fn hash_bytes(content: &[u8]) -> Hash {
    *blake3::hash(content).as_bytes()
}

/// Fingerprint of a file's contents, streamed from disk.
pub fn hash_file(path: &Path) -> io::Result<Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(*hasher.finalize().as_bytes())
}
