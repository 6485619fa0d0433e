//! Command-line front end for listings and scans against a WebHDFS service.
//!
//! Usage: hdfs-scan --hosts nn1,nn2 scan /data --max-depth 2 --where "size>1024"

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use webhdfs::config::split_hosts;
use webhdfs::{
    parse_postfix, ContentSummary, ListOptions, PatternType, Result, ScanOptions, Transport,
    TypeFilter, WebHdfsClient, WebhdfsConfig,
};

#[derive(Parser, Debug)]
#[command(name = "hdfs-scan")]
#[command(about = "List, search and scan WebHDFS directory trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file; WEBHDFS_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated NameNode hosts, tried in order
    #[arg(long, global = true)]
    hosts: Option<String>,

    /// Full service URL, used instead of hosts and port
    #[arg(long, global = true)]
    url: Option<String>,

    /// User name sent with each request
    #[arg(short, long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List child names of a directory
    Ls {
        path: String,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List child status records, with content summaries
    Ll {
        path: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Skip content summaries
        #[arg(long)]
        brief: bool,
    },

    /// Walk a directory tree, printing one entry per directory
    Scan {
        path: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Deepest level expanded; the root is level 1
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
        /// Directories not to descend into
        #[arg(long = "skip", value_delimiter = ',')]
        skip_paths: Vec<String>,
        /// Fail on the first unreadable directory
        #[arg(long)]
        strict: bool,
    },

    /// Raw size and object count of each directory in a tree
    Du {
        path: String,
        /// Deepest level reported; the root is level 1. Whole tree by default
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Object types to keep: all, file or dir
    #[arg(short = 't', long = "type", default_value = "all")]
    type_filter: TypeFilter,

    /// Name pattern matched against each child's name
    #[arg(short, long)]
    pattern: Option<String>,

    /// Pattern syntax: glob or regex
    #[arg(long, default_value = "glob")]
    pattern_type: PatternType,

    /// Postfix search filter, e.g. "owner=hdfs size>1024 and"
    #[arg(short = 'w', long = "where")]
    filter: Option<String>,

    /// Treat unreadable directories as empty
    #[arg(long)]
    ignore_errors: bool,
}

fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = WebHdfsClient::connect(&load_config(&cli)?)?;

    match cli.command {
        Commands::Ls { path, filters } => handle_ls(&client, &path, &filters),
        Commands::Ll {
            path,
            filters,
            brief,
        } => handle_ll(&client, &path, &filters, !brief),
        Commands::Scan {
            path,
            filters,
            max_depth,
            skip_paths,
            strict,
        } => handle_scan(&client, &path, filters, max_depth, skip_paths, strict),
        Commands::Du { path, max_depth } => handle_du(&client, &path, max_depth),
    }
}

fn load_config(cli: &Cli) -> Result<WebhdfsConfig> {
    let mut config = WebhdfsConfig::load(cli.config.as_deref())?;
    if let Some(hosts) = &cli.hosts {
        config.hosts = split_hosts(hosts);
    }
    if let Some(url) = &cli.url {
        config.url = Some(url.clone());
    }
    if let Some(user) = &cli.user {
        config.user = Some(user.clone());
    }
    Ok(config)
}

fn list_options(filters: &FilterArgs) -> Result<ListOptions> {
    let filter = match &filters.filter {
        Some(text) => Some(parse_postfix(text)?),
        None => webhdfs::pattern_filter(filters.pattern.as_deref(), filters.pattern_type)?,
    };
    Ok(ListOptions::new()
        .with_type_filter(filters.type_filter)
        .with_filter(filter)
        .with_ignore_errors(filters.ignore_errors))
}

fn print_line(value: &impl Serialize) -> Result<()> {
    let line = serde_json::to_string(value)
        .map_err(|error| webhdfs::WebhdfsError::InvalidInput(error.to_string()))?;
    println!("{line}");
    Ok(())
}

fn handle_ls(client: &WebHdfsClient, path: &str, filters: &FilterArgs) -> Result<()> {
    let options = list_options(filters)?.with_projection(webhdfs::SearchKey::Path);
    for name in client.list(path, &options)?.into_values() {
        if let Some(name) = name.as_str() {
            println!("{name}");
        }
    }
    Ok(())
}

fn handle_ll(
    client: &WebHdfsClient,
    path: &str,
    filters: &FilterArgs,
    extended: bool,
) -> Result<()> {
    let options = list_options(filters)?.with_extended(extended);
    for record in client.list(path, &options)?.into_records() {
        print_line(&record)?;
    }
    Ok(())
}

fn handle_scan(
    client: &WebHdfsClient,
    path: &str,
    filters: FilterArgs,
    max_depth: Option<usize>,
    skip_paths: Vec<String>,
    strict: bool,
) -> Result<()> {
    let mut options = ScanOptions::new()
        .with_type_filter(filters.type_filter)
        .with_ignore_errors(!strict)
        .with_skip_paths(skip_paths);
    if let Some(depth) = max_depth {
        options = options.with_max_depth(depth);
    }
    if let Some(pattern) = filters.pattern {
        options = options.with_pattern(pattern, filters.pattern_type);
    }
    if let Some(text) = &filters.filter {
        options = options.with_filter(parse_postfix(text)?);
    }

    for entry in client.scan(path, options)? {
        print_line(&entry?)?;
    }
    Ok(())
}

fn handle_du(client: &WebHdfsClient, path: &str, max_depth: Option<usize>) -> Result<()> {
    for line in disk_usage(client, path, max_depth)? {
        print_line(&line)?;
    }
    Ok(())
}

/// One usage line per scanned directory. A directory whose summary cannot
/// be read is reported with zero sizes.
fn disk_usage<T: Transport>(
    client: &WebHdfsClient<T>,
    path: &str,
    max_depth: Option<usize>,
) -> Result<Vec<Value>> {
    let mut options = ScanOptions::new();
    if let Some(depth) = max_depth {
        options = options.with_max_depth(depth);
    }
    let mut lines = Vec::new();
    for entry in client.scan(path, options)? {
        let entry = entry?;
        let summary = client.content_summary(&entry.path).unwrap_or_else(|error| {
            log::warn!("content summary failed path={} error={error}", entry.path);
            ContentSummary::zeroed()
        });
        lines.push(json!({
            "path": entry.path,
            "length": summary.length,
            "spaceConsumed": summary.space_consumed,
            "objects": entry.object_count(),
        }));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use webhdfs::MemoryTransport;

    fn client() -> WebHdfsClient<MemoryTransport> {
        let transport = MemoryTransport::new();
        transport.add_file("/data/x/a", 100, 3).unwrap();
        transport.add_file("/data/x/deep/b", 200, 3).unwrap();
        transport.add_dir("/data/y").unwrap();
        WebHdfsClient::new(transport)
    }

    fn paths(lines: &[Value]) -> Vec<&str> {
        lines.iter().filter_map(|line| line["path"].as_str()).collect()
    }

    #[test]
    fn du_covers_the_whole_tree_by_default() {
        let lines = disk_usage(&client(), "/data", None).unwrap();
        assert_eq!(paths(&lines), vec!["/data", "/data/x", "/data/x/deep", "/data/y"]);
        assert_eq!(lines[0]["spaceConsumed"], json!(900));
        assert_eq!(lines[1]["objects"], json!(2));
    }

    #[test]
    fn du_honours_an_explicit_depth() {
        let lines = disk_usage(&client(), "/data", Some(1)).unwrap();
        assert_eq!(paths(&lines), vec!["/data"]);
    }

    #[test]
    fn du_zeroes_unreadable_summaries() {
        let client = client();
        client.transport().fail_summary("/data/x");
        let lines = disk_usage(&client, "/data", None).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1]["path"], json!("/data/x"));
        assert_eq!(lines[1]["spaceConsumed"], json!(0));
        assert_eq!(lines[1]["length"], json!(0));
        assert_eq!(lines[2]["spaceConsumed"], json!(600));
    }

    #[test]
    fn du_max_depth_is_optional_on_the_command_line() {
        let cli = Cli::try_parse_from(["hdfs-scan", "du", "/data"]).unwrap();
        assert!(matches!(cli.command, Commands::Du { max_depth: None, .. }));
    }
}
