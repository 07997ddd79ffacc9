//! Core types shared by the snapshot trie and the lazy access layer.

use serde::{Deserialize, Serialize};

/// Hash: 256-bit content fingerprint (BLAKE3)
pub type Hash = [u8; 32];

/// Separator between path segments.
pub const SEPARATOR: u8 = b'/';

/// Segment comparison policy, fixed once per hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    /// Exact byte comparison
    #[default]
    Sensitive,
    /// ASCII letters are folded before comparison
    Insensitive,
}

impl CaseSensitivity {
    /// Map a byte to the value it is compared by.
    #[inline]
    pub(crate) fn fold(self, byte: u8) -> u8 {
        match self {
            CaseSensitivity::Sensitive => byte,
            CaseSensitivity::Insensitive => byte.to_ascii_lowercase(),
        }
    }
}

/// Type tag of a filesystem entry as seen by the lazy access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
    Missing,
    Unknown,
}

impl FileType {
    /// Files and missing entries cannot contain children.
    pub fn is_leaf(self) -> bool {
        matches!(self, FileType::File | FileType::Missing)
    }
}
