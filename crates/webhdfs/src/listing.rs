//! One-level directory listing with type filters, search filters and
//! extended statistics.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde_json::Value;

use crate::error::{Result, WebhdfsError};
use crate::path::{child_path, require_path};
use crate::search::{SearchExpression, SearchExpressionList, SearchKey, SearchOperator};
use crate::transport::Transport;
use crate::types::{ContentSummary, MetadataRecord, ObjectType, TypeFilter};

/// How a name pattern is matched against `pathSuffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    #[default]
    Glob,
    Regex,
}

impl PatternType {
    pub fn operator(self) -> SearchOperator {
        match self {
            Self::Glob => SearchOperator::Glob,
            Self::Regex => SearchOperator::Regex,
        }
    }
}

impl FromStr for PatternType {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "glob" => Ok(Self::Glob),
            "regex" => Ok(Self::Regex),
            other => Err(WebhdfsError::InvalidInput(format!(
                "unknown pattern type: {other}"
            ))),
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator().as_str())
    }
}

/// Builds the name filter for `pattern`. An absent or empty pattern means no filter.
pub fn pattern_filter(
    pattern: Option<&str>,
    pattern_type: PatternType,
) -> Result<Option<SearchExpressionList>> {
    match pattern {
        Some(pattern) if !pattern.is_empty() => {
            SearchExpression::new(SearchKey::Path, pattern_type.operator(), pattern)
                .map(|expression| Some(SearchExpressionList::single(expression)))
        }
        _ => Ok(None),
    }
}

/// Options for [`list_level`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub type_filter: TypeFilter,
    pub filter: Option<SearchExpressionList>,
    /// Merge content summaries (directories) or size x replication (files).
    pub extended: bool,
    /// Turn transport failures into an empty listing.
    pub ignore_errors: bool,
    /// Return one field per record instead of whole records.
    pub projection: Option<SearchKey>,
    /// Fetch directory summaries concurrently on the rayon pool. Off by
    /// default: summaries are requested one at a time, in listing order.
    pub parallel_summaries: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_filter(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    pub fn with_filter(mut self, filter: Option<SearchExpressionList>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn with_projection(mut self, key: SearchKey) -> Self {
        self.projection = Some(key);
        self
    }

    pub fn with_parallel_summaries(mut self, parallel: bool) -> Self {
        self.parallel_summaries = parallel;
        self
    }
}

/// Result of [`list_level`]: whole records, or one projected field per record.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Records(Vec<MetadataRecord>),
    Values(Vec<Value>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records of a non-projected listing; empty for a projection.
    pub fn into_records(self) -> Vec<MetadataRecord> {
        match self {
            Self::Records(records) => records,
            Self::Values(_) => Vec::new(),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Records(records) => records
                .into_iter()
                .map(|record| Value::Object(record.into()))
                .collect(),
            Self::Values(values) => values,
        }
    }
}

/// Lists the children of `path` that pass the type filter and search filter.
pub fn list_level<T: Transport + ?Sized>(
    transport: &T,
    path: &str,
    options: &ListOptions,
) -> Result<Listing> {
    let path = require_path(path)?;
    let children = match transport.list_status(path) {
        Ok(children) => children,
        Err(error) if options.ignore_errors && error.is_transport() => {
            log::debug!("listing ignored error path={} error={}", path, error);
            Vec::new()
        }
        Err(error) => return Err(error),
    };

    let mut records = Vec::with_capacity(children.len());
    for record in children {
        if !options.type_filter.matches(record.object_type()) {
            continue;
        }
        if let Some(filter) = &options.filter {
            if !filter.evaluate(&record)? {
                continue;
            }
        }
        records.push(record);
    }

    if options.extended {
        records = enrich(transport, path, records, options.parallel_summaries);
    }

    Ok(match options.projection {
        Some(key) => {
            let field = key.wire_name()?;
            Listing::Values(
                records
                    .iter()
                    .map(|record| record.get(field).cloned().unwrap_or(Value::Null))
                    .collect(),
            )
        }
        None => Listing::Records(records),
    })
}

/// Adds extended statistics to each record. Output order matches input
/// order whether or not summaries are fetched in parallel.
pub(crate) fn enrich<T: Transport + ?Sized>(
    transport: &T,
    parent: &str,
    records: Vec<MetadataRecord>,
    parallel: bool,
) -> Vec<MetadataRecord> {
    let extend = |mut record: MetadataRecord| {
        let summary = summary_for(transport, parent, &record);
        record.merge_summary(&summary);
        record
    };
    if parallel {
        records.into_par_iter().map(extend).collect()
    } else {
        records.into_iter().map(extend).collect()
    }
}

fn summary_for<T: Transport + ?Sized>(
    transport: &T,
    parent: &str,
    record: &MetadataRecord,
) -> ContentSummary {
    match record.object_type() {
        ObjectType::Directory => {
            let path = child_path(parent, record.path_suffix());
            match transport.content_summary(&path) {
                Ok(summary) => summary,
                Err(error) => {
                    log::warn!(
                        "content summary unavailable, using zeroed statistics path={} error={}",
                        path,
                        error
                    );
                    ContentSummary::zeroed()
                }
            }
        }
        ObjectType::File | ObjectType::Symlink => ContentSummary::single_file(
            record.length().unwrap_or(0),
            record.replication().unwrap_or(0),
        ),
    }
}

/// Names of the children of `path`, optionally matched against a name pattern.
pub fn list_directory<T: Transport + ?Sized>(
    transport: &T,
    path: &str,
    type_filter: TypeFilter,
    pattern: Option<&str>,
    pattern_type: PatternType,
    ignore_errors: bool,
) -> Result<Vec<String>> {
    let options = ListOptions::new()
        .with_type_filter(type_filter)
        .with_filter(pattern_filter(pattern, pattern_type)?)
        .with_ignore_errors(ignore_errors)
        .with_projection(SearchKey::Path);
    Ok(list_level(transport, path, &options)?
        .into_values()
        .into_iter()
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect())
}

/// Full status records of the children of `path`.
pub fn list_directory_extended<T: Transport + ?Sized>(
    transport: &T,
    path: &str,
    type_filter: TypeFilter,
    pattern: Option<&str>,
    pattern_type: PatternType,
    ignore_errors: bool,
    extended: bool,
) -> Result<Vec<MetadataRecord>> {
    let options = ListOptions::new()
        .with_type_filter(type_filter)
        .with_filter(pattern_filter(pattern, pattern_type)?)
        .with_ignore_errors(ignore_errors)
        .with_extended(extended);
    list_level(transport, path, &options).map(Listing::into_records)
}
