//! Probe collaborators
//!
//! A probe inspects the real filesystem for one absolute path. The lazy access
//! layer calls it at most once per cached entry, but racing callers may call it
//! more than once for the same path, so probes must be safe to repeat.

use crate::error::ProbeError;
use crate::snapshot::MetadataSnapshot;
use crate::tree::hasher;
use std::fs;
use std::io;
use std::path::Path;

/// Filesystem inspection for one path
pub trait Probe: Send + Sync {
    fn probe(&self, absolute_path: &str) -> Result<MetadataSnapshot, ProbeError>;
}

impl<F> Probe for F
where
    F: Fn(&str) -> Result<MetadataSnapshot, ProbeError> + Send + Sync,
{
    fn probe(&self, absolute_path: &str) -> Result<MetadataSnapshot, ProbeError> {
        self(absolute_path)
    }
}

/// Probe backed by `std::fs`
///
/// Files are fingerprinted with BLAKE3. Directories are reported incomplete,
/// since listing them is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl Probe for DiskProbe {
    fn probe(&self, absolute_path: &str) -> Result<MetadataSnapshot, ProbeError> {
        let metadata = match fs::metadata(absolute_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(MetadataSnapshot::missing(absolute_path));
            }
            Err(e) => return Err(ProbeError::new(absolute_path, e)),
        };
        if metadata.is_dir() {
            return Ok(MetadataSnapshot::directory(absolute_path, false));
        }
        let content_hash =
            hasher::hash_file(Path::new(absolute_path)).map_err(|e| ProbeError::new(absolute_path, e))?;
        Ok(MetadataSnapshot::regular_file(
            absolute_path,
            content_hash,
            metadata.len(),
        ))
    }
}
