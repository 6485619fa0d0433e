//! Metadata records and result types exchanged with the WebHDFS service.
//!
//! Records keep the wire-format field names (`pathSuffix`, `length`, ...)
//! so that search keys resolve through the attribute registry and any
//! fields the service adds are carried along untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WebhdfsError};

pub(crate) const PATH_SUFFIX_FIELD: &str = "pathSuffix";
pub(crate) const TYPE_FIELD: &str = "type";
pub(crate) const LENGTH_FIELD: &str = "length";
pub(crate) const REPLICATION_FIELD: &str = "replication";
pub(crate) const MODIFICATION_TIME_FIELD: &str = "modificationTime";
pub(crate) const OWNER_FIELD: &str = "owner";

/// Filesystem object type as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectType {
    File,
    Directory,
    Symlink,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Directory => "DIRECTORY",
            Self::Symlink => "SYMLINK",
        }
    }

    /// Files and symlinks are both treated as file-like when filtering.
    pub fn is_file_like(self) -> bool {
        matches!(self, Self::File | Self::Symlink)
    }
}

impl FromStr for ObjectType {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "FILE" => Ok(Self::File),
            "DIRECTORY" => Ok(Self::Directory),
            "SYMLINK" => Ok(Self::Symlink),
            other => Err(WebhdfsError::MalformedResponse(format!(
                "unknown object type {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object type filter for listings and scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    File,
    Directory,
}

impl TypeFilter {
    pub fn matches(&self, object_type: ObjectType) -> bool {
        match self {
            Self::All => true,
            Self::File => object_type.is_file_like(),
            Self::Directory => object_type == ObjectType::Directory,
        }
    }

    pub fn includes_files(&self) -> bool {
        matches!(self, Self::All | Self::File)
    }

    pub fn includes_directories(&self) -> bool {
        matches!(self, Self::All | Self::Directory)
    }
}

impl FromStr for TypeFilter {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "file" | "files" => Ok(Self::File),
            "dir" | "dirs" | "directory" | "directories" => Ok(Self::Directory),
            other => Err(WebhdfsError::InvalidInput(format!(
                "unknown object type filter: {other}"
            ))),
        }
    }
}

/// One filesystem object's status, keyed by wire field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct MetadataRecord {
    object_type: ObjectType,
    fields: Map<String, Value>,
}

impl MetadataRecord {
    /// Builds a record from a decoded JSON object. The `type` field is required.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self> {
        let object_type = fields
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WebhdfsError::MalformedResponse("file status is missing \"type\"".to_string())
            })?
            .parse()?;
        Ok(Self {
            object_type,
            fields,
        })
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(WebhdfsError::MalformedResponse(format!(
                "expected a file status object, got {other}"
            ))),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn is_directory(&self) -> bool {
        self.object_type == ObjectType::Directory
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Final path component; empty for a status fetched with GETFILESTATUS.
    pub fn path_suffix(&self) -> &str {
        self.get(PATH_SUFFIX_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn length(&self) -> Option<i64> {
        self.get(LENGTH_FIELD).and_then(Value::as_i64)
    }

    pub fn replication(&self) -> Option<i64> {
        self.get(REPLICATION_FIELD).and_then(Value::as_i64)
    }

    pub fn owner(&self) -> Option<&str> {
        self.get(OWNER_FIELD).and_then(Value::as_str)
    }

    /// Modification time in epoch milliseconds.
    pub fn modification_time(&self) -> Option<i64> {
        self.get(MODIFICATION_TIME_FIELD).and_then(Value::as_i64)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.modification_time()?)
    }

    /// Inserts or replaces a field. The object type cannot be changed this way.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        if field == TYPE_FIELD {
            return;
        }
        self.fields.insert(field, value.into());
    }

    /// Merges a content summary into the record; summary fields win.
    pub fn merge_summary(&mut self, summary: &ContentSummary) {
        for (field, value) in summary.to_fields() {
            self.fields.insert(field.to_string(), value);
        }
    }
}

impl TryFrom<Map<String, Value>> for MetadataRecord {
    type Error = WebhdfsError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        Self::from_map(fields)
    }
}

impl From<MetadataRecord> for Map<String, Value> {
    fn from(record: MetadataRecord) -> Self {
        record.fields
    }
}

/// Aggregate statistics for a directory subtree (GETCONTENTSUMMARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    #[serde(default)]
    pub directory_count: i64,
    #[serde(default)]
    pub file_count: i64,
    #[serde(default)]
    pub length: i64,
    #[serde(default = "unset_quota")]
    pub quota: i64,
    #[serde(default)]
    pub space_consumed: i64,
    #[serde(default = "unset_quota")]
    pub space_quota: i64,
}

fn unset_quota() -> i64 {
    -1
}

impl ContentSummary {
    /// Fallback block used when a summary cannot be fetched.
    pub fn zeroed() -> Self {
        Self {
            directory_count: 0,
            file_count: 0,
            length: 0,
            quota: -1,
            space_consumed: 0,
            space_quota: -1,
        }
    }

    /// Synthesized summary for a single file: raw size is length times replication.
    pub fn single_file(length: i64, replication: i64) -> Self {
        Self {
            file_count: 1,
            length,
            space_consumed: length.saturating_mul(replication),
            ..Self::zeroed()
        }
    }

    /// Fields merged into an extended record. `length` is left to the file status.
    fn to_fields(self) -> [(&'static str, Value); 5] {
        [
            ("directoryCount", Value::from(self.directory_count)),
            ("fileCount", Value::from(self.file_count)),
            ("quota", Value::from(self.quota)),
            ("spaceQuota", Value::from(self.space_quota)),
            ("spaceConsumed", Value::from(self.space_consumed)),
        ]
    }
}

impl Default for ContentSummary {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// One visited directory: its path plus the matching children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanEntry {
    pub path: String,
    pub directories: Vec<MetadataRecord>,
    pub files: Vec<MetadataRecord>,
}

impl ScanEntry {
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            directories: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.directories.len() + self.files.len()
    }
}
