//! Metadata transport seam between the search engine and a WebHDFS service.

mod memory;

pub use memory::MemoryTransport;

use std::sync::Arc;

use crate::error::Result;
use crate::types::{ContentSummary, MetadataRecord};

/// Read-only metadata operations used by listings and scans.
pub trait Transport: Send + Sync {
    /// Child records of a directory (LISTSTATUS).
    fn list_status(&self, path: &str) -> Result<Vec<MetadataRecord>>;

    /// Aggregate statistics for a subtree (GETCONTENTSUMMARY).
    fn content_summary(&self, path: &str) -> Result<ContentSummary>;

    /// Status of the path itself (GETFILESTATUS).
    fn file_status(&self, path: &str) -> Result<MetadataRecord>;
}

/// Namespace-changing operations.
pub trait MutableTransport: Transport {
    /// Creates `path` and any missing parents (MKDIRS).
    fn make_dirs(&self, path: &str, permission: Option<&str>) -> Result<bool>;

    fn delete(&self, path: &str, recursive: bool) -> Result<bool>;

    fn rename(&self, path: &str, destination: &str) -> Result<bool>;

    fn set_owner(&self, path: &str, owner: Option<&str>, group: Option<&str>) -> Result<()>;

    fn set_permission(&self, path: &str, permission: &str) -> Result<()>;

    fn create_symlink(&self, path: &str, destination: &str, create_parent: bool) -> Result<()>;

    /// Appends `sources` to the file at `path`, in order, and removes them (CONCAT).
    fn concat(&self, path: &str, sources: &[&str]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn list_status(&self, path: &str) -> Result<Vec<MetadataRecord>> {
        (**self).list_status(path)
    }

    fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        (**self).content_summary(path)
    }

    fn file_status(&self, path: &str) -> Result<MetadataRecord> {
        (**self).file_status(path)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn list_status(&self, path: &str) -> Result<Vec<MetadataRecord>> {
        (**self).list_status(path)
    }

    fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        (**self).content_summary(path)
    }

    fn file_status(&self, path: &str) -> Result<MetadataRecord> {
        (**self).file_status(path)
    }
}
