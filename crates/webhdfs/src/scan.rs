//! Depth-bounded recursive scan producing one [`ScanEntry`] per directory.
//!
//! The walk is depth-first pre-order over an explicit stack of frames.
//! Every child directory is traversed whether or not it passes the filter;
//! filters only narrow what each entry reports. Skip paths match exactly, so
//! the descendants of a skipped directory are still visited if reached some
//! other way and are not skipped transitively.

use std::collections::HashSet;
use std::iter::FusedIterator;

use crate::cancel::CancellationToken;
use crate::error::{Result, WebhdfsError};
use crate::listing::{list_level, pattern_filter, ListOptions, PatternType};
use crate::path::{child_path, normalize_path, require_path};
use crate::search::SearchExpressionList;
use crate::transport::Transport;
use crate::types::{MetadataRecord, ScanEntry, TypeFilter};

/// Depth ceiling used when no positive maximum is given.
pub const DEFAULT_MAX_DEPTH: usize = 500;

/// Options for [`scan`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Deepest level expanded; the root is level 1. `None` or `0` means
    /// [`DEFAULT_MAX_DEPTH`].
    pub max_depth: Option<usize>,
    pub type_filter: TypeFilter,
    /// Name pattern, used only when no explicit `filter` is set.
    pub pattern: Option<String>,
    pub pattern_type: PatternType,
    pub filter: Option<SearchExpressionList>,
    /// Report unreadable directories as empty entries instead of failing.
    pub ignore_errors: bool,
    /// Exact directories not to expand. Trailing `/` is ignored.
    pub skip_paths: HashSet<String>,
    pub cancel: CancellationToken,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            type_filter: TypeFilter::All,
            pattern: None,
            pattern_type: PatternType::Glob,
            filter: None,
            ignore_errors: true,
            skip_paths: HashSet::new(),
            cancel: CancellationToken::noop(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_type_filter(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>, pattern_type: PatternType) -> Self {
        self.pattern = Some(pattern.into());
        self.pattern_type = pattern_type;
        self
    }

    pub fn with_filter(mut self, filter: SearchExpressionList) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    /// Adds directories not to expand. Trailing `/` is ignored.
    pub fn with_skip_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skip_paths
            .extend(paths.into_iter().map(|path| normalize_path(path.as_ref())));
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn effective_max_depth(&self) -> usize {
        match self.max_depth {
            Some(depth) if depth >= 1 => depth,
            _ => DEFAULT_MAX_DEPTH,
        }
    }

    /// The explicit filter, or a name filter built from the pattern.
    fn resolved_filter(&self) -> Result<Option<SearchExpressionList>> {
        match &self.filter {
            Some(filter) => Ok(Some(filter.clone())),
            None => pattern_filter(self.pattern.as_deref(), self.pattern_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScanFrame {
    path: String,
    depth: usize,
}

/// Starts a scan at `root`. The root status is fetched before returning.
///
/// A root that is not a directory, or that is itself a skip path, produces
/// no entries.
pub fn scan<'a, T: Transport + ?Sized>(
    transport: &'a T,
    root: &str,
    options: ScanOptions,
) -> Result<Scan<'a, T>> {
    let root = normalize_path(require_path(root)?);
    let filter = options.resolved_filter()?;
    let max_depth = options.effective_max_depth();
    let root_status = transport.file_status(&root)?;
    let skip_paths: HashSet<String> = options
        .skip_paths
        .iter()
        .map(|path| normalize_path(path))
        .collect();

    let mut frontier = Vec::new();
    if !root_status.is_directory() {
        log::debug!("scan root is not a directory path={}", root);
    } else if skip_paths.contains(&root) {
        log::debug!("scan root is skipped path={}", root);
    } else {
        frontier.push(ScanFrame {
            path: root,
            depth: 1,
        });
    }

    Ok(Scan {
        transport,
        frontier,
        filter,
        type_filter: options.type_filter,
        max_depth,
        ignore_errors: options.ignore_errors,
        skip_paths,
        cancel: options.cancel,
        finished: false,
    })
}

/// Lazy scan over a directory tree. Each `next` lists one directory.
///
/// After an error the iterator is exhausted. Iterating again requires a new
/// call to [`scan`], which fetches everything again.
pub struct Scan<'a, T: ?Sized> {
    transport: &'a T,
    frontier: Vec<ScanFrame>,
    filter: Option<SearchExpressionList>,
    type_filter: TypeFilter,
    max_depth: usize,
    ignore_errors: bool,
    skip_paths: HashSet<String>,
    cancel: CancellationToken,
    finished: bool,
}

impl<T: Transport + ?Sized> Scan<'_, T> {
    /// Directories waiting to be expanded.
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    fn finish(&mut self) {
        self.finished = true;
        self.frontier.clear();
    }

    fn expand(&mut self, frame: ScanFrame) -> Result<ScanEntry> {
        log::debug!("scan expanding path={} depth={}", frame.path, frame.depth);
        let options = ListOptions::new().with_extended(true);
        let children = match list_level(self.transport, &frame.path, &options) {
            Ok(listing) => listing.into_records(),
            Err(error) if self.ignore_errors && error.is_transport() => {
                log::debug!(
                    "scan ignored unreadable directory path={} error={}",
                    frame.path,
                    error
                );
                return Ok(ScanEntry::empty(frame.path));
            }
            Err(error) => return Err(error),
        };

        let (directories, files): (Vec<MetadataRecord>, Vec<MetadataRecord>) =
            children.into_iter().partition(MetadataRecord::is_directory);

        let child_depth = frame.depth + 1;
        if child_depth <= self.max_depth {
            let pending = directories
                .iter()
                .map(|record| child_path(&frame.path, record.path_suffix()))
                .filter(|path| !self.skip_paths.contains(path))
                .map(|path| ScanFrame {
                    path,
                    depth: child_depth,
                })
                .collect::<Vec<_>>();
            self.frontier.extend(pending.into_iter().rev());
        }

        let directories = if self.type_filter.includes_directories() {
            self.retain_matching(directories)?
        } else {
            Vec::new()
        };
        let files = if self.type_filter.includes_files() {
            self.retain_matching(files)?
        } else {
            Vec::new()
        };

        Ok(ScanEntry {
            path: frame.path,
            directories,
            files,
        })
    }

    fn retain_matching(&self, records: Vec<MetadataRecord>) -> Result<Vec<MetadataRecord>> {
        let Some(filter) = &self.filter else {
            return Ok(records);
        };
        let mut matching = Vec::with_capacity(records.len());
        for record in records {
            if filter.evaluate(&record)? {
                matching.push(record);
            }
        }
        Ok(matching)
    }
}

impl<T: Transport + ?Sized> Iterator for Scan<'_, T> {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let frame = self.frontier.pop()?;
        if self.cancel.is_cancelled().is_none() {
            log::info!(
                "scan cancelled path={} pending={}",
                frame.path,
                self.frontier.len()
            );
            self.finish();
            return Some(Err(WebhdfsError::Cancelled));
        }
        match self.expand(frame) {
            Ok(entry) => Some(Ok(entry)),
            Err(error) => {
                self.finish();
                Some(Err(error))
            }
        }
    }
}

impl<T: Transport + ?Sized> FusedIterator for Scan<'_, T> {}
