//! Remote path helpers. WebHDFS paths are always absolute and `/`-separated.

use crate::error::{Result, WebhdfsError};

/// Strips trailing separators for comparison; the root stays `/`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() && raw.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Joins a listed child's `pathSuffix` onto its parent directory.
pub fn child_path(parent: &str, suffix: &str) -> String {
    let parent = parent.trim_end_matches('/');
    format!("{parent}/{suffix}")
}

/// Rejects empty paths before any request is made.
pub(crate) fn require_path(path: &str) -> Result<&str> {
    if path.trim().is_empty() {
        return Err(WebhdfsError::MissingArgument("path".to_string()));
    }
    Ok(path)
}

/// Final path component, used when printing a root that has no `pathSuffix`.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_separators() {
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/a/b//"), "/a/b");
        assert_eq!(normalize_path("/a/b"), "/a/b");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn child_path_handles_root() {
        assert_eq!(child_path("/", "data"), "/data");
        assert_eq!(child_path("/data", "x"), "/data/x");
        assert_eq!(child_path("/data/", "x"), "/data/x");
    }

    #[test]
    fn empty_path_is_missing_argument() {
        assert!(matches!(
            require_path(""),
            Err(WebhdfsError::MissingArgument(_))
        ));
        assert_eq!(require_path("/tmp").unwrap(), "/tmp");
    }

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(file_name("/data/x"), "x");
        assert_eq!(file_name("/data/x/"), "x");
        assert_eq!(file_name("/"), "");
    }
}
