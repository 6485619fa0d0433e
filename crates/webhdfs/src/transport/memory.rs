//! In-memory namespace implementing both transport traits.
//!
//! Records carry the same wire fields a NameNode returns, so listings, scans
//! and client calls behave as they would against a live service. Individual
//! paths can be made to fail on listing or content summary.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{Result, WebhdfsError};
use crate::path::{child_path, normalize_path};
use crate::types::{
    ContentSummary, MetadataRecord, ObjectType, LENGTH_FIELD, MODIFICATION_TIME_FIELD,
    OWNER_FIELD, PATH_SUFFIX_FIELD, REPLICATION_FIELD, TYPE_FIELD,
};

use super::{MutableTransport, Transport};

const DEFAULT_OWNER: &str = "hdfs";
const DEFAULT_GROUP: &str = "supergroup";
const DEFAULT_BLOCK_SIZE: i64 = 134_217_728;
const DEFAULT_MODIFICATION_TIME: i64 = 1_361_834_700_000;

#[derive(Debug, Clone)]
struct Node {
    fields: Map<String, Value>,
    children: Vec<String>,
}

impl Node {
    fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            children: Vec::new(),
        }
    }

    fn object_type(&self) -> Option<ObjectType> {
        self.fields
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok())
    }

    fn is_directory(&self) -> bool {
        self.object_type() == Some(ObjectType::Directory)
    }

    fn int_field(&self, field: &str) -> i64 {
        self.fields.get(field).and_then(Value::as_i64).unwrap_or(0)
    }

    fn record(&self, path_suffix: &str) -> Result<MetadataRecord> {
        let mut fields = self.fields.clone();
        fields.insert(PATH_SUFFIX_FIELD.to_string(), Value::from(path_suffix));
        MetadataRecord::from_map(fields)
    }
}

#[derive(Debug, Default)]
struct Namespace {
    nodes: HashMap<String, Node>,
    summaries: HashMap<String, ContentSummary>,
    failing_listings: HashSet<String>,
    failing_summaries: HashSet<String>,
    listed: Vec<String>,
    summarized: Vec<String>,
}

impl Namespace {
    fn with_root() -> Self {
        let mut namespace = Self::default();
        namespace
            .nodes
            .insert("/".to_string(), Node::new(directory_fields("")));
        namespace
    }

    fn node(&self, path: &str, operation: &'static str) -> Result<&Node> {
        self.nodes
            .get(path)
            .ok_or_else(|| WebhdfsError::path_unavailable(path, operation, not_found(path)))
    }

    fn node_mut(&mut self, path: &str, operation: &'static str) -> Result<&mut Node> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| WebhdfsError::path_unavailable(path, operation, not_found(path)))
    }

    fn ensure_dir(&mut self, path: &str) -> Result<()> {
        match self.nodes.get(path) {
            Some(node) if node.is_directory() => return Ok(()),
            Some(_) => {
                return Err(WebhdfsError::Remote(format!(
                    "Parent path is not a directory: {path}"
                )))
            }
            None => {}
        }
        let (parent, name) = split_parent(path)?;
        self.ensure_dir(&parent)?;
        self.attach(&parent, name);
        self.nodes
            .insert(path.to_string(), Node::new(directory_fields(name)));
        Ok(())
    }

    fn insert(&mut self, path: &str, fields: Map<String, Value>) -> Result<()> {
        if self.nodes.contains_key(path) {
            return Err(WebhdfsError::Remote(format!("{path} already exists")));
        }
        let (parent, name) = split_parent(path)?;
        self.ensure_dir(&parent)?;
        self.attach(&parent, name);
        self.nodes.insert(path.to_string(), Node::new(fields));
        Ok(())
    }

    fn attach(&mut self, parent: &str, name: &str) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(name.to_string());
        }
    }

    fn detach(&mut self, path: &str) {
        if let Ok((parent, name)) = split_parent(path) {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.retain(|child| child != name);
            }
        }
    }

    fn subtree_keys(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        self.nodes
            .keys()
            .filter(|key| key.as_str() == path || key.starts_with(prefix.as_str()))
            .cloned()
            .collect()
    }

    fn summarize(&self, path: &str) -> Result<ContentSummary> {
        if let Some(summary) = self.summaries.get(path) {
            return Ok(*summary);
        }
        let node = self.node(path, "GETCONTENTSUMMARY")?;
        match node.object_type() {
            Some(ObjectType::Directory) => {
                let mut summary = ContentSummary {
                    directory_count: 1,
                    ..ContentSummary::zeroed()
                };
                for name in &node.children {
                    let child = self.summarize(&child_path(path, name))?;
                    summary.directory_count += child.directory_count;
                    summary.file_count += child.file_count;
                    summary.length += child.length;
                    summary.space_consumed += child.space_consumed;
                }
                Ok(summary)
            }
            Some(ObjectType::File) => Ok(ContentSummary::single_file(
                node.int_field(LENGTH_FIELD),
                node.int_field(REPLICATION_FIELD),
            )),
            _ => Ok(ContentSummary::zeroed()),
        }
    }
}

/// A WebHDFS namespace held in memory.
#[derive(Debug)]
pub struct MemoryTransport {
    namespace: Mutex<Namespace>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            namespace: Mutex::new(Namespace::with_root()),
        }
    }
}

impl MemoryTransport {
    /// Creates a namespace holding only `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory and any missing parents.
    pub fn add_dir(&self, path: &str) -> Result<()> {
        let path = absolute(path)?;
        self.namespace.lock().ensure_dir(&path)
    }

    /// Creates a file, creating missing parent directories.
    pub fn add_file(&self, path: &str, length: i64, replication: i64) -> Result<()> {
        let path = absolute(path)?;
        let (_, name) = split_parent(&path)?;
        let fields = file_fields(name, length, replication);
        self.namespace.lock().insert(&path, fields)
    }

    pub fn add_symlink(&self, path: &str, target: &str) -> Result<()> {
        let path = absolute(path)?;
        let (_, name) = split_parent(&path)?;
        let fields = symlink_fields(name, target);
        self.namespace.lock().insert(&path, fields)
    }

    /// Overrides a status field. `type` and `pathSuffix` are ignored.
    pub fn set_field(&self, path: &str, field: &str, value: impl Into<Value>) -> Result<()> {
        if field == TYPE_FIELD || field == PATH_SUFFIX_FIELD {
            return Ok(());
        }
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        let node = namespace.node_mut(&path, "SETFIELD")?;
        node.fields.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Pins the content summary reported for `path`.
    pub fn set_summary(&self, path: &str, summary: ContentSummary) {
        self.namespace
            .lock()
            .summaries
            .insert(normalize_path(path), summary);
    }

    /// Makes every LISTSTATUS of `path` fail.
    pub fn fail_listing(&self, path: &str) {
        self.namespace
            .lock()
            .failing_listings
            .insert(normalize_path(path));
    }

    /// Makes every GETCONTENTSUMMARY of `path` fail.
    pub fn fail_summary(&self, path: &str) {
        self.namespace
            .lock()
            .failing_summaries
            .insert(normalize_path(path));
    }

    /// Paths passed to `list_status`, in call order.
    pub fn listed_paths(&self) -> Vec<String> {
        self.namespace.lock().listed.clone()
    }

    pub fn summary_calls(&self) -> usize {
        self.namespace.lock().summarized.len()
    }

    /// Paths passed to `content_summary`, in call order.
    pub fn summarized_paths(&self) -> Vec<String> {
        self.namespace.lock().summarized.clone()
    }
}

impl Transport for MemoryTransport {
    fn list_status(&self, path: &str) -> Result<Vec<MetadataRecord>> {
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        namespace.listed.push(path.clone());
        if namespace.failing_listings.contains(&path) {
            return Err(WebhdfsError::path_unavailable(
                &path,
                "LISTSTATUS",
                permission_denied(&path),
            ));
        }

        let node = namespace.node(&path, "LISTSTATUS")?;
        if !node.is_directory() {
            return Ok(vec![node.record("")?]);
        }
        node.children
            .iter()
            .map(|name| namespace.node(&child_path(&path, name), "LISTSTATUS")?.record(name))
            .collect()
    }

    fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        namespace.summarized.push(path.clone());
        if namespace.failing_summaries.contains(&path) {
            return Err(WebhdfsError::path_unavailable(
                &path,
                "GETCONTENTSUMMARY",
                permission_denied(&path),
            ));
        }
        namespace.summarize(&path)
    }

    fn file_status(&self, path: &str) -> Result<MetadataRecord> {
        let path = absolute(path)?;
        let namespace = self.namespace.lock();
        namespace.node(&path, "GETFILESTATUS")?.record("")
    }
}

impl MutableTransport for MemoryTransport {
    fn make_dirs(&self, path: &str, permission: Option<&str>) -> Result<bool> {
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        namespace.ensure_dir(&path)?;
        if let Some(permission) = permission {
            let node = namespace.node_mut(&path, "MKDIRS")?;
            node.fields
                .insert("permission".to_string(), Value::from(permission));
        }
        Ok(true)
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool> {
        let path = absolute(path)?;
        if path == "/" {
            return Err(WebhdfsError::Remote("Cannot delete /".to_string()));
        }
        let mut namespace = self.namespace.lock();
        let Some(node) = namespace.nodes.get(&path) else {
            return Ok(false);
        };
        if !recursive && !node.children.is_empty() {
            return Err(WebhdfsError::Remote(format!("{path} is non empty")));
        }
        for key in namespace.subtree_keys(&path) {
            namespace.nodes.remove(&key);
            namespace.summaries.remove(&key);
        }
        namespace.detach(&path);
        Ok(true)
    }

    fn rename(&self, path: &str, destination: &str) -> Result<bool> {
        let source = absolute(path)?;
        let mut target = absolute(destination)?;
        let mut namespace = self.namespace.lock();
        if source == "/" || !namespace.nodes.contains_key(&source) {
            return Ok(false);
        }
        if namespace
            .nodes
            .get(&target)
            .is_some_and(Node::is_directory)
        {
            let (_, name) = split_parent(&source)?;
            target = child_path(&target, name);
        }
        let (target_parent, target_name) = split_parent(&target)?;
        let target_name = target_name.to_string();
        let inside_source = target.starts_with(format!("{source}/").as_str());
        let parent_is_dir = namespace
            .nodes
            .get(&target_parent)
            .is_some_and(Node::is_directory);
        if namespace.nodes.contains_key(&target) || inside_source || !parent_is_dir {
            return Ok(false);
        }

        for key in namespace.subtree_keys(&source) {
            if let Some(mut node) = namespace.nodes.remove(&key) {
                let moved = format!("{target}{}", &key[source.len()..]);
                if key == source {
                    node.fields
                        .insert(PATH_SUFFIX_FIELD.to_string(), Value::from(target_name.as_str()));
                }
                namespace.nodes.insert(moved, node);
            }
        }
        namespace.detach(&source);
        namespace.attach(&target_parent, &target_name);
        Ok(true)
    }

    fn set_owner(&self, path: &str, owner: Option<&str>, group: Option<&str>) -> Result<()> {
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        let node = namespace.node_mut(&path, "SETOWNER")?;
        if let Some(owner) = owner {
            node.fields.insert(OWNER_FIELD.to_string(), Value::from(owner));
        }
        if let Some(group) = group {
            node.fields.insert("group".to_string(), Value::from(group));
        }
        Ok(())
    }

    fn set_permission(&self, path: &str, permission: &str) -> Result<()> {
        let path = absolute(path)?;
        let mut namespace = self.namespace.lock();
        let node = namespace.node_mut(&path, "SETPERMISSION")?;
        node.fields
            .insert("permission".to_string(), Value::from(permission));
        Ok(())
    }

    fn create_symlink(&self, path: &str, destination: &str, create_parent: bool) -> Result<()> {
        let path = absolute(path)?;
        let (parent, name) = split_parent(&path)?;
        let mut namespace = self.namespace.lock();
        if !create_parent && !namespace.nodes.contains_key(&parent) {
            return Err(WebhdfsError::path_unavailable(
                &path,
                "CREATESYMLINK",
                format!("Parent directory doesn't exist: {parent}"),
            ));
        }
        namespace.insert(&path, symlink_fields(name, destination))
    }

    fn concat(&self, path: &str, sources: &[&str]) -> Result<()> {
        let target = absolute(path)?;
        let sources = sources
            .iter()
            .map(|source| absolute(source))
            .collect::<Result<Vec<_>>>()?;
        let mut namespace = self.namespace.lock();
        if namespace.node(&target, "CONCAT")?.object_type() != Some(ObjectType::File) {
            return Err(WebhdfsError::Remote(format!("{target} is not a file")));
        }

        let mut appended = 0;
        for source in &sources {
            if *source == target || sources.iter().filter(|other| *other == source).count() > 1 {
                return Err(WebhdfsError::Remote(format!(
                    "{source} is listed more than once or is the target"
                )));
            }
            let node = namespace.node(source, "CONCAT")?;
            if node.object_type() != Some(ObjectType::File) {
                return Err(WebhdfsError::Remote(format!("{source} is not a file")));
            }
            appended += node.int_field(LENGTH_FIELD);
        }

        for source in &sources {
            namespace.nodes.remove(source);
            namespace.detach(source);
        }
        let node = namespace.node_mut(&target, "CONCAT")?;
        let length = node.int_field(LENGTH_FIELD) + appended;
        node.fields
            .insert(LENGTH_FIELD.to_string(), Value::from(length));
        Ok(())
    }
}

fn absolute(path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(WebhdfsError::InvalidInput(format!(
            "path must be absolute: {path:?}"
        )));
    }
    Ok(normalize_path(path))
}

fn split_parent(path: &str) -> Result<(String, &str)> {
    match path.rsplit_once('/') {
        Some((_, "")) | None => Err(WebhdfsError::InvalidInput(format!(
            "path has no parent: {path:?}"
        ))),
        Some(("", name)) => Ok(("/".to_string(), name)),
        Some((parent, name)) => Ok((parent.to_string(), name)),
    }
}

fn not_found(path: &str) -> String {
    format!("File {path} does not exist.")
}

fn permission_denied(path: &str) -> String {
    format!("Permission denied: access=READ_EXECUTE, inode=\"{path}\"")
}

fn base_fields(name: &str, object_type: ObjectType) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(PATH_SUFFIX_FIELD.to_string(), Value::from(name));
    fields.insert(TYPE_FIELD.to_string(), Value::from(object_type.as_str()));
    fields.insert(OWNER_FIELD.to_string(), Value::from(DEFAULT_OWNER));
    fields.insert("group".to_string(), Value::from(DEFAULT_GROUP));
    fields.insert(
        MODIFICATION_TIME_FIELD.to_string(),
        Value::from(DEFAULT_MODIFICATION_TIME),
    );
    fields.insert(
        "accessTime".to_string(),
        Value::from(DEFAULT_MODIFICATION_TIME),
    );
    fields
}

fn directory_fields(name: &str) -> Map<String, Value> {
    let mut fields = base_fields(name, ObjectType::Directory);
    fields.insert(LENGTH_FIELD.to_string(), Value::from(0));
    fields.insert(REPLICATION_FIELD.to_string(), Value::from(0));
    fields.insert("blockSize".to_string(), Value::from(0));
    fields.insert("permission".to_string(), Value::from("755"));
    fields
}

fn file_fields(name: &str, length: i64, replication: i64) -> Map<String, Value> {
    let mut fields = base_fields(name, ObjectType::File);
    fields.insert(LENGTH_FIELD.to_string(), Value::from(length));
    fields.insert(REPLICATION_FIELD.to_string(), Value::from(replication));
    fields.insert("blockSize".to_string(), Value::from(DEFAULT_BLOCK_SIZE));
    fields.insert("permission".to_string(), Value::from("644"));
    fields
}

fn symlink_fields(name: &str, target: &str) -> Map<String, Value> {
    let mut fields = base_fields(name, ObjectType::Symlink);
    fields.insert(LENGTH_FIELD.to_string(), Value::from(0));
    fields.insert(REPLICATION_FIELD.to_string(), Value::from(0));
    fields.insert("symlink".to_string(), Value::from(target));
    fields.insert("permission".to_string(), Value::from("777"));
    fields
}
