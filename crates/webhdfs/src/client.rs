//! High-level WebHDFS client: listings, scans, status queries and
//! namespace operations over any [`Transport`].

use crate::config::WebhdfsConfig;
use crate::error::{Result, WebhdfsError};
use crate::http::HttpTransport;
use crate::listing::{self, ListOptions, Listing, PatternType};
use crate::path::{child_path, require_path};
use crate::scan::{self, Scan, ScanOptions};
use crate::transport::{MutableTransport, Transport};
use crate::types::{ContentSummary, MetadataRecord, ObjectType, TypeFilter};

#[derive(Debug, Clone)]
pub struct WebHdfsClient<T = HttpTransport> {
    transport: T,
}

impl WebHdfsClient<HttpTransport> {
    /// Connects to the first responsive host in `config`.
    pub fn connect(config: &WebhdfsConfig) -> Result<Self> {
        HttpTransport::connect(config).map(Self::new)
    }
}

impl<T: Transport> WebHdfsClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list_directory(
        &self,
        path: &str,
        type_filter: TypeFilter,
        pattern: Option<&str>,
        pattern_type: PatternType,
        ignore_errors: bool,
    ) -> Result<Vec<String>> {
        listing::list_directory(
            &self.transport,
            path,
            type_filter,
            pattern,
            pattern_type,
            ignore_errors,
        )
    }

    pub fn list_directory_extended(
        &self,
        path: &str,
        type_filter: TypeFilter,
        pattern: Option<&str>,
        pattern_type: PatternType,
        ignore_errors: bool,
        extended: bool,
    ) -> Result<Vec<MetadataRecord>> {
        listing::list_directory_extended(
            &self.transport,
            path,
            type_filter,
            pattern,
            pattern_type,
            ignore_errors,
            extended,
        )
    }

    /// One level of `path` with full control over filtering and projection.
    pub fn list(&self, path: &str, options: &ListOptions) -> Result<Listing> {
        listing::list_level(&self.transport, path, options)
    }

    pub fn scan(&self, root: &str, options: ScanOptions) -> Result<Scan<'_, T>> {
        scan::scan(&self.transport, root, options)
    }

    pub fn path_status(&self, path: &str) -> Result<MetadataRecord> {
        self.transport.file_status(require_path(path)?)
    }

    pub fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        self.transport.content_summary(require_path(path)?)
    }

    /// Object type at `path`, or `None` when the path does not resolve.
    /// Non-path failures still propagate.
    pub fn path_type(&self, path: &str) -> Result<Option<ObjectType>> {
        match self.path_status(path) {
            Ok(status) => Ok(Some(status.object_type())),
            Err(WebhdfsError::PathUnavailable { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.path_type(path)?.is_some())
    }

    pub fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.path_type(path)? == Some(ObjectType::File))
    }

    pub fn is_dir(&self, path: &str) -> Result<bool> {
        Ok(self.path_type(path)? == Some(ObjectType::Directory))
    }

    pub fn is_symlink(&self, path: &str) -> Result<bool> {
        Ok(self.path_type(path)? == Some(ObjectType::Symlink))
    }
}

impl<T: MutableTransport> WebHdfsClient<T> {
    pub fn make_dirs(&self, path: &str, permission: Option<&str>) -> Result<bool> {
        self.transport.make_dirs(require_path(path)?, permission)
    }

    pub fn delete(&self, path: &str, recursive: bool) -> Result<bool> {
        self.transport.delete(require_path(path)?, recursive)
    }

    pub fn rename(&self, path: &str, destination: &str) -> Result<bool> {
        let destination = require_path(destination)
            .map_err(|_| WebhdfsError::MissingArgument("destination".to_string()))?;
        self.transport.rename(require_path(path)?, destination)
    }

    pub fn set_owner(&self, path: &str, owner: Option<&str>, group: Option<&str>) -> Result<()> {
        if owner.is_none() && group.is_none() {
            return Err(WebhdfsError::MissingArgument("owner or group".to_string()));
        }
        self.transport.set_owner(require_path(path)?, owner, group)
    }

    pub fn set_permission(&self, path: &str, permission: &str) -> Result<()> {
        if permission.is_empty() {
            return Err(WebhdfsError::MissingArgument("permission".to_string()));
        }
        self.transport.set_permission(require_path(path)?, permission)
    }

    pub fn create_symlink(&self, path: &str, destination: &str, create_parent: bool) -> Result<()> {
        let destination = require_path(destination)
            .map_err(|_| WebhdfsError::MissingArgument("destination".to_string()))?;
        self.transport
            .create_symlink(require_path(path)?, destination, create_parent)
    }

    /// Appends `sources` to `target` in order. The sources no longer exist afterwards.
    pub fn concat(&self, target: &str, sources: &[&str]) -> Result<()> {
        let target = require_path(target)
            .map_err(|_| WebhdfsError::MissingArgument("target file".to_string()))?;
        if sources.is_empty() || sources.iter().any(|source| source.trim().is_empty()) {
            return Err(WebhdfsError::MissingArgument("source file list".to_string()));
        }
        self.transport.concat(target, sources)
    }

    /// Moves `source` to `target`.
    ///
    /// With a pattern and a directory source, each matching child
    /// `source/name` is renamed to `target/name` instead, and the directory
    /// itself stays. Returns the new paths of everything that moved.
    pub fn move_matching(
        &self,
        source: &str,
        target: &str,
        pattern: Option<&str>,
        pattern_type: PatternType,
    ) -> Result<Vec<String>> {
        let target = require_path(target)
            .map_err(|_| WebhdfsError::MissingArgument("target path".to_string()))?;
        let source = require_path(source)
            .map_err(|_| WebhdfsError::MissingArgument("source path".to_string()))?;

        let pattern = pattern.filter(|pattern| !pattern.is_empty());
        let source_is_dir = self.is_dir(source)?;
        if source_is_dir && self.is_file(target)? {
            return Err(WebhdfsError::InvalidInput(format!(
                "source path {source} is a directory and target path {target} is a file"
            )));
        }

        let Some(pattern) = pattern.filter(|_| source_is_dir) else {
            let moved = self.transport.rename(source, target)?;
            return Ok(if moved { vec![target.to_string()] } else { Vec::new() });
        };

        let names =
            self.list_directory(source, TypeFilter::All, Some(pattern), pattern_type, false)?;
        let mut moved = Vec::with_capacity(names.len());
        for name in names {
            let origin = child_path(source, &name);
            let destination = child_path(target, &name);
            if self.transport.rename(&origin, &destination)? {
                moved.push(destination);
            } else {
                log::warn!("move skipped path={} target={}", origin, destination);
            }
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn client() -> WebHdfsClient<MemoryTransport> {
        let transport = MemoryTransport::new();
        transport.add_dir("/data/x").unwrap();
        transport.add_file("/data/x/a.csv", 100, 3).unwrap();
        transport.add_symlink("/data/latest", "/data/x").unwrap();
        WebHdfsClient::new(transport)
    }

    #[test]
    fn path_predicates_follow_object_type() {
        let client = client();
        assert!(client.is_dir("/data/x").unwrap());
        assert!(client.is_file("/data/x/a.csv").unwrap());
        assert!(client.is_symlink("/data/latest").unwrap());
        assert!(!client.is_file("/data/x").unwrap());
        assert!(!client.exists("/data/missing").unwrap());
    }

    #[test]
    fn empty_paths_are_rejected() {
        let client = client();
        assert!(matches!(
            client.path_status(""),
            Err(WebhdfsError::MissingArgument(_))
        ));
        assert!(matches!(
            client.rename("/data/x", ""),
            Err(WebhdfsError::MissingArgument(_))
        ));
        assert!(matches!(
            client.set_owner("/data/x", None, None),
            Err(WebhdfsError::MissingArgument(_))
        ));
    }

    #[test]
    fn namespace_changes_are_visible_to_listings() {
        let client = client();
        assert!(client.make_dirs("/data/y/z", None).unwrap());
        assert!(client.rename("/data/x/a.csv", "/data/y/a.csv").unwrap());
        let names = client
            .list_directory("/data/y", TypeFilter::All, None, PatternType::Glob, false)
            .unwrap();
        assert_eq!(names, vec!["z", "a.csv"]);

        client.set_owner("/data/y/a.csv", Some("etl"), None).unwrap();
        assert_eq!(
            client.path_status("/data/y/a.csv").unwrap().owner(),
            Some("etl")
        );
        assert!(client.delete("/data/y", true).unwrap());
        assert!(!client.exists("/data/y").unwrap());
    }

    #[test]
    fn move_matching_moves_each_matching_child() {
        let client = client();
        client.transport().add_file("/data/x/b.csv", 200, 3).unwrap();
        client.transport().add_file("/data/x/notes.txt", 5, 1).unwrap();
        client.make_dirs("/archive", None).unwrap();

        let moved = client
            .move_matching("/data/x", "/archive", Some("*.csv"), PatternType::Glob)
            .unwrap();
        assert_eq!(moved, vec!["/archive/a.csv", "/archive/b.csv"]);

        let archived = client
            .list_directory("/archive", TypeFilter::All, None, PatternType::Glob, false)
            .unwrap();
        assert_eq!(archived, vec!["a.csv", "b.csv"]);
        let left = client
            .list_directory("/data/x", TypeFilter::All, None, PatternType::Glob, false)
            .unwrap();
        assert_eq!(left, vec!["notes.txt"]);
    }

    #[test]
    fn move_matching_without_pattern_renames_source() {
        let client = client();
        let moved = client
            .move_matching("/data/x", "/data/renamed", None, PatternType::Glob)
            .unwrap();
        assert_eq!(moved, vec!["/data/renamed"]);
        assert!(client.is_file("/data/renamed/a.csv").unwrap());
        assert!(!client.exists("/data/x").unwrap());
    }

    #[test]
    fn move_matching_rejects_directory_onto_file() {
        let client = client();
        client.transport().add_file("/data/plain", 1, 1).unwrap();
        assert!(matches!(
            client.move_matching("/data/x", "/data/plain", Some("*"), PatternType::Glob),
            Err(WebhdfsError::InvalidInput(_))
        ));
        assert!(matches!(
            client.move_matching("/data/x", "", None, PatternType::Glob),
            Err(WebhdfsError::MissingArgument(_))
        ));
    }

    #[test]
    fn concat_merges_sources_into_target() {
        let client = client();
        client.transport().add_file("/data/x/part-1", 20, 3).unwrap();
        client.transport().add_file("/data/x/part-2", 30, 3).unwrap();

        client
            .concat("/data/x/a.csv", &["/data/x/part-1", "/data/x/part-2"])
            .unwrap();
        assert_eq!(
            client.path_status("/data/x/a.csv").unwrap().length(),
            Some(150)
        );
        assert!(!client.exists("/data/x/part-1").unwrap());
        assert!(matches!(
            client.concat("/data/x/a.csv", &[]),
            Err(WebhdfsError::MissingArgument(_))
        ));
    }
}
