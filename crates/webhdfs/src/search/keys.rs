//! Attribute registry: semantic search keys and their wire field names.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Result, WebhdfsError};

use super::registry::Registry;

/// Semantic key a search expression can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKey {
    Path,
    Mtime,
    Owner,
    Repl,
    Type,
    Size,
    DirCount,
    FileCount,
    CountQuota,
    RawSize,
    SpaceQuota,
}

/// JSON shape of the field a key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Text,
}

/// Registry value for a search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyField {
    pub wire_name: &'static str,
    pub kind: ValueKind,
}

/// The process-wide attribute registry.
pub static SEARCH_KEYS: LazyLock<Registry<SearchKey, KeyField>> = LazyLock::new(|| {
    fn number(wire_name: &'static str) -> KeyField {
        KeyField {
            wire_name,
            kind: ValueKind::Number,
        }
    }
    fn text(wire_name: &'static str) -> KeyField {
        KeyField {
            wire_name,
            kind: ValueKind::Text,
        }
    }
    Registry::from_entries(
        "search keys",
        vec![
            (SearchKey::DirCount, number("directoryCount")),
            (SearchKey::FileCount, number("fileCount")),
            (SearchKey::CountQuota, number("quota")),
            (SearchKey::SpaceQuota, number("spaceQuota")),
            (SearchKey::RawSize, number("spaceConsumed")),
            (SearchKey::Path, text("pathSuffix")),
            (SearchKey::Mtime, number("modificationTime")),
            (SearchKey::Owner, text("owner")),
            (SearchKey::Repl, number("replication")),
            (SearchKey::Type, text("type")),
            (SearchKey::Size, number("length")),
        ],
    )
});

impl SearchKey {
    pub const ALL: [SearchKey; 11] = [
        Self::Path,
        Self::Mtime,
        Self::Owner,
        Self::Repl,
        Self::Type,
        Self::Size,
        Self::DirCount,
        Self::FileCount,
        Self::CountQuota,
        Self::RawSize,
        Self::SpaceQuota,
    ];

    /// Canonical user-facing name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Mtime => "mtime",
            Self::Owner => "owner",
            Self::Repl => "repl",
            Self::Type => "type",
            Self::Size => "size",
            Self::DirCount => "dir_count",
            Self::FileCount => "file_count",
            Self::CountQuota => "count_quota",
            Self::RawSize => "raw_size",
            Self::SpaceQuota => "space_quota",
        }
    }

    /// Wire field name in the default registry.
    pub fn wire_name(self) -> Result<&'static str> {
        SEARCH_KEYS.get(&self).map(|field| field.wire_name)
    }
}

impl FromStr for SearchKey {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "path" | "name" => Ok(Self::Path),
            "mtime" => Ok(Self::Mtime),
            "owner" => Ok(Self::Owner),
            "repl" | "replication" => Ok(Self::Repl),
            "type" => Ok(Self::Type),
            "size" | "length" => Ok(Self::Size),
            "dir_count" | "num_dir" => Ok(Self::DirCount),
            "file_count" | "num_file" => Ok(Self::FileCount),
            "count_quota" => Ok(Self::CountQuota),
            "raw_size" | "raw_length" => Ok(Self::RawSize),
            "space_quota" => Ok(Self::SpaceQuota),
            other => Err(WebhdfsError::InvalidKey(other.to_string())),
        }
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
