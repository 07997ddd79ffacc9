//! Metadata Snapshots
//!
//! Immutable descriptions of what is known about one filesystem entry. These are
//! the values stored in the snapshot trie and produced by probes.

use crate::types::{FileType, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known regular file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegularFileSnapshot {
    pub absolute_path: String,
    #[serde(with = "hex_hash")]
    pub content_hash: Hash,
    pub length: u64,
}

/// Known directory
///
/// `complete` asserts that every direct child of the directory is recorded
/// alongside it; anything else directly below it does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub absolute_path: String,
    pub complete: bool,
}

/// Known absence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingSnapshot {
    pub absolute_path: String,
}

/// What is known about one path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataSnapshot {
    RegularFile(RegularFileSnapshot),
    Directory(DirectorySnapshot),
    Missing(MissingSnapshot),
}

impl MetadataSnapshot {
    pub fn regular_file(absolute_path: impl Into<String>, content_hash: Hash, length: u64) -> Self {
        MetadataSnapshot::RegularFile(RegularFileSnapshot {
            absolute_path: absolute_path.into(),
            content_hash,
            length,
        })
    }

    pub fn directory(absolute_path: impl Into<String>, complete: bool) -> Self {
        MetadataSnapshot::Directory(DirectorySnapshot {
            absolute_path: absolute_path.into(),
            complete,
        })
    }

    pub fn missing(absolute_path: impl Into<String>) -> Self {
        MetadataSnapshot::Missing(MissingSnapshot {
            absolute_path: absolute_path.into(),
        })
    }

    pub fn absolute_path(&self) -> &str {
        match self {
            MetadataSnapshot::RegularFile(file) => &file.absolute_path,
            MetadataSnapshot::Directory(dir) => &dir.absolute_path,
            MetadataSnapshot::Missing(missing) => &missing.absolute_path,
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            MetadataSnapshot::RegularFile(_) => FileType::File,
            MetadataSnapshot::Directory(_) => FileType::Directory,
            MetadataSnapshot::Missing(_) => FileType::Missing,
        }
    }

    /// Same knowledge, recorded for a different path.
    pub fn with_absolute_path(&self, absolute_path: impl Into<String>) -> Self {
        let absolute_path = absolute_path.into();
        match self {
            MetadataSnapshot::RegularFile(file) => MetadataSnapshot::RegularFile(RegularFileSnapshot {
                absolute_path,
                ..file.clone()
            }),
            MetadataSnapshot::Directory(dir) => MetadataSnapshot::Directory(DirectorySnapshot {
                absolute_path,
                complete: dir.complete,
            }),
            MetadataSnapshot::Missing(_) => MetadataSnapshot::Missing(MissingSnapshot { absolute_path }),
        }
    }

    /// Directory snapshot that claims completeness.
    pub fn is_complete_directory(&self) -> bool {
        matches!(self, MetadataSnapshot::Directory(dir) if dir.complete)
    }
}

impl fmt::Display for MetadataSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSnapshot::RegularFile(file) => write!(
                f,
                "file {} ({} bytes, {})",
                file.absolute_path,
                file.length,
                hex::encode(file.content_hash)
            ),
            MetadataSnapshot::Directory(dir) => write!(
                f,
                "directory {}{}",
                dir.absolute_path,
                if dir.complete { " (complete)" } else { "" }
            ),
            MetadataSnapshot::Missing(missing) => write!(f, "missing {}", missing.absolute_path),
        }
    }
}

/// Receives snapshots during a depth-first walk.
pub trait SnapshotVisitor {
    fn visit(&mut self, snapshot: &MetadataSnapshot);
}

impl<F> SnapshotVisitor for F
where
    F: FnMut(&MetadataSnapshot),
{
    fn visit(&mut self, snapshot: &MetadataSnapshot) {
        self(snapshot)
    }
}

mod hex_hash {
    use crate::types::Hash;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let mut hash = [0u8; 32];
        hex::decode_to_slice(&encoded, &mut hash).map_err(de::Error::custom)?;
        Ok(hash)
    }
}
