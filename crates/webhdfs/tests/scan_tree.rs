use webhdfs::{
    list_directory_extended, list_level, scan, ListOptions, MemoryTransport, PatternType,
    ScanEntry, ScanOptions, SearchExpression, SearchKey, SearchOperator, TypeFilter,
    WebhdfsError,
};

fn data_tree() -> MemoryTransport {
    let transport = MemoryTransport::new();
    transport.add_file("/data/x/file100", 100, 3).unwrap();
    transport.add_file("/data/x/file200", 200, 3).unwrap();
    transport.add_dir("/data/y").unwrap();
    transport
}

fn names(records: &[webhdfs::MetadataRecord]) -> Vec<&str> {
    records.iter().map(|record| record.path_suffix()).collect()
}

fn raw_size(record: &webhdfs::MetadataRecord) -> Option<i64> {
    record.get("spaceConsumed").and_then(|value| value.as_i64())
}

fn collect(transport: &MemoryTransport, root: &str, options: ScanOptions) -> Vec<ScanEntry> {
    scan(transport, root, options)
        .unwrap()
        .collect::<webhdfs::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn data_scenario_at_depth_one() {
    let transport = data_tree();
    let entries = collect(&transport, "/data", ScanOptions::new().with_max_depth(1));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "/data");
    assert_eq!(names(&entries[0].directories), vec!["x", "y"]);
    assert!(entries[0].files.is_empty());
}

#[test]
fn data_scenario_recursing_into_x() {
    let transport = data_tree();
    let entries = collect(&transport, "/data", ScanOptions::new());
    let paths: Vec<&str> = entries.iter().map(|entry| entry.path.as_str()).collect();
    assert_eq!(paths, vec!["/data", "/data/x", "/data/y"]);

    let x = &entries[1];
    assert!(x.directories.is_empty());
    assert_eq!(names(&x.files), vec!["file100", "file200"]);
    assert_eq!(raw_size(&x.files[0]), Some(300));
    assert_eq!(raw_size(&x.files[1]), Some(600));

    let y = &entries[2];
    assert_eq!(y.object_count(), 0);
}

#[test]
fn directory_raw_size_is_reported_space_consumed() {
    let transport = data_tree();
    let entries = collect(&transport, "/data", ScanOptions::new().with_max_depth(1));
    let x = &entries[0].directories[0];
    assert_eq!(raw_size(x), Some(900));
    assert_eq!(x.get("fileCount").and_then(|value| value.as_i64()), Some(2));
}

#[test]
fn type_filter_partitions_children() {
    let transport = data_tree();
    transport.add_file("/data/readme", 10, 1).unwrap();
    transport.add_symlink("/data/latest", "/data/x").unwrap();

    let all = list_directory_extended(
        &transport,
        "/data",
        TypeFilter::All,
        None,
        PatternType::Glob,
        false,
        false,
    )
    .unwrap();
    let dirs = list_directory_extended(
        &transport,
        "/data",
        TypeFilter::Directory,
        None,
        PatternType::Glob,
        false,
        false,
    )
    .unwrap();
    let files = list_directory_extended(
        &transport,
        "/data",
        TypeFilter::File,
        None,
        PatternType::Glob,
        false,
        false,
    )
    .unwrap();

    let dir_names = names(&dirs);
    let file_names = names(&files);
    assert!(dir_names.iter().all(|name| !file_names.contains(name)));

    let mut union: Vec<&str> = dir_names.iter().chain(file_names.iter()).copied().collect();
    let mut everything = names(&all);
    union.sort_unstable();
    everything.sort_unstable();
    assert_eq!(union, everything);
    assert_eq!(file_names, vec!["readme", "latest"]);
}

#[test]
fn skip_set_is_exact_and_not_transitive() {
    let transport = MemoryTransport::new();
    transport.add_file("/a/b/inner/f", 1, 1).unwrap();
    transport.add_file("/a/c/g", 1, 1).unwrap();

    let entries = collect(
        &transport,
        "/a",
        ScanOptions::new().with_skip_paths(["/a/b/"]),
    );
    let paths: Vec<&str> = entries.iter().map(|entry| entry.path.as_str()).collect();
    assert_eq!(paths, vec!["/a", "/a/c"]);
    // The skipped directory is still reported as a child of its parent.
    assert_eq!(names(&entries[0].directories), vec!["b", "c"]);

    // Skipping a path below an unskipped directory stops only that path.
    let entries = collect(
        &transport,
        "/a",
        ScanOptions::new().with_skip_paths(["/a/b/inner"]),
    );
    let paths: Vec<&str> = entries.iter().map(|entry| entry.path.as_str()).collect();
    assert_eq!(paths, vec!["/a", "/a/b", "/a/c"]);
}

#[test]
fn depth_one_reports_no_grandchildren() {
    let transport = MemoryTransport::new();
    transport.add_file("/r/d1/d2/f", 1, 1).unwrap();
    let entries = collect(&transport, "/r", ScanOptions::new().with_max_depth(1));
    assert_eq!(entries.len(), 1);
    assert_eq!(names(&entries[0].directories), vec!["d1"]);
    assert!(transport.listed_paths().iter().all(|path| path != "/r/d1"));
}

#[test]
fn failed_summary_does_not_abort_scan() {
    let transport = data_tree();
    transport.fail_summary("/data/x");
    let entries = collect(&transport, "/data", ScanOptions::new());

    assert_eq!(entries.len(), 3);
    let x = &entries[0].directories[0];
    assert_eq!(x.path_suffix(), "x");
    assert_eq!(raw_size(x), Some(0));
    assert_eq!(x.get("quota").and_then(|value| value.as_i64()), Some(-1));
}

#[test]
fn failed_listing_aborts_strict_scan() {
    let transport = data_tree();
    transport.fail_listing("/data/x");
    let mut entries = scan(
        &transport,
        "/data",
        ScanOptions::new().with_ignore_errors(false),
    )
    .unwrap();

    assert!(entries.next().unwrap().is_ok());
    assert!(matches!(
        entries.next(),
        Some(Err(WebhdfsError::PathUnavailable { .. }))
    ));
    assert!(entries.next().is_none());
}

#[test]
fn failed_listing_is_empty_when_ignored() {
    let transport = data_tree();
    transport.fail_listing("/data/x");
    let entries = collect(&transport, "/data", ScanOptions::new());
    assert_eq!(entries[1], ScanEntry::empty("/data/x"));
    assert_eq!(entries[2].path, "/data/y");
}

#[test]
fn filter_selects_large_files_across_tree() {
    let transport = data_tree();
    let large = SearchExpression::new(SearchKey::Size, SearchOperator::Gt, 150).unwrap();
    let entries = collect(
        &transport,
        "/data",
        ScanOptions::new()
            .with_type_filter(TypeFilter::File)
            .with_filter(large.into()),
    );
    let matched: Vec<&str> = entries
        .iter()
        .flat_map(|entry| entry.files.iter().map(|record| record.path_suffix()))
        .collect();
    assert_eq!(matched, vec!["file200"]);
    assert!(entries.iter().all(|entry| entry.directories.is_empty()));
}

#[test]
fn listing_projection_returns_one_value_per_record() {
    let transport = data_tree();
    let options = ListOptions::new()
        .with_type_filter(TypeFilter::Directory)
        .with_extended(true)
        .with_projection(SearchKey::RawSize);
    let values = list_level(&transport, "/data", &options).unwrap().into_values();
    assert_eq!(values, vec![serde_json::json!(900), serde_json::json!(0)]);
}
