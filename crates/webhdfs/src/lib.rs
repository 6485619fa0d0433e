//! WebHDFS metadata client with structured search and recursive scanning.
//!
//! This crate provides:
//! - Registries of search keys, comparison operators and logical operators
//! - Postfix search expression lists evaluated against file status records
//! - One-level directory listings with type, pattern and search filtering
//! - A lazy depth-first scanner over directory trees
//! - A blocking HTTP transport and an in-memory transport

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod path;
pub mod scan;
pub mod search;
pub mod transport;
pub mod types;

// Re-export main types
pub use cancel::CancellationToken;
pub use client::WebHdfsClient;
pub use config::WebhdfsConfig;
pub use error::{Result, WebhdfsError};
pub use http::HttpTransport;
pub use listing::{
    list_directory, list_directory_extended, list_level, pattern_filter, ListOptions, Listing,
    PatternType,
};
pub use scan::{scan, Scan, ScanOptions, DEFAULT_MAX_DEPTH};
pub use search::{
    build_expression, combine, parse_postfix, LogicalOperator, Operand, SearchExpression,
    SearchExpressionList, SearchKey, SearchOperator, SearchToken,
};
pub use transport::{MemoryTransport, MutableTransport, Transport};
pub use types::{ContentSummary, MetadataRecord, ObjectType, ScanEntry, TypeFilter};
