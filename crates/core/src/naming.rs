//! Path, title, and branch-name derivation shared by the store and sync engine.
//!
//! A document's logical `path` is `folder/subfolder/name` with no extension.
//! Its remote counterpart is the same path with a `.md` suffix unless the
//! document has already been linked to a different remote file.

use crate::error::CoreError;

/// File extension that marks a remote file as a document.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Prefix for branches created when submitting a document.
pub const BRANCH_PREFIX: &str = "docs-update";

/// Maximum length of a logical document path.
pub const MAX_PATH_LENGTH: usize = 512;

/// Maximum length of a document title.
pub const MAX_TITLE_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Remote -> local
// ---------------------------------------------------------------------------

/// Whether a remote file name denotes a markdown document.
pub fn is_markdown_file(name: &str) -> bool {
    name.ends_with(MARKDOWN_EXTENSION)
}

/// Derive a human-readable title from a remote file name.
///
/// Strips the `.md` extension and replaces `-` and `_` with spaces:
/// `getting-started.md` becomes `getting started`.
pub fn title_from_file_name(name: &str) -> String {
    let stem = name.strip_suffix(MARKDOWN_EXTENSION).unwrap_or(name);
    stem.replace(['-', '_'], " ")
}

/// Derive a logical document path from a remote file path.
///
/// Only a trailing `.md` is removed; `docs/intro.md` becomes `docs/intro`.
pub fn document_path_from_remote(remote_path: &str) -> String {
    remote_path
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(remote_path)
        .to_string()
}

// ---------------------------------------------------------------------------
// Local -> remote
// ---------------------------------------------------------------------------

/// The remote file path a document is written to.
///
/// A previously linked `github_path` wins so that renamed documents keep
/// updating the file they were imported from.
pub fn remote_path_for_document(path: &str, github_path: Option<&str>) -> String {
    match github_path {
        Some(existing) if !existing.is_empty() => existing.to_string(),
        _ => format!("{path}{MARKDOWN_EXTENSION}"),
    }
}

/// Reduce arbitrary text to lowercase alphanumerics separated by single hyphens.
pub fn slugify(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_hyphen = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_end_matches('-').to_string()
}

/// Build the branch name for one submission of a document.
///
/// The millisecond timestamp keeps repeated submissions of the same document
/// from colliding.
pub fn submission_branch_name(document_path: &str, timestamp_millis: i64) -> String {
    let slug = slugify(document_path);
    if slug.is_empty() {
        format!("{BRANCH_PREFIX}-{timestamp_millis}")
    } else {
        format!("{BRANCH_PREFIX}-{slug}-{timestamp_millis}")
    }
}

// ---------------------------------------------------------------------------
// Folder inference
// ---------------------------------------------------------------------------

/// The folder path a document path belongs to, or `None` for top-level paths.
///
/// Folder membership is derived from the path prefix only; there is no
/// stored reference between documents and folders.
pub fn folder_of(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(folder, _)| folder)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a logical document or folder path.
///
/// Paths are relative, `/`-separated, with no empty, `.` or `..` segments.
pub fn validate_path(path: &str) -> Result<(), CoreError> {
    if path.trim().is_empty() {
        return Err(CoreError::Validation("Path must not be empty".to_string()));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(CoreError::Validation(format!(
            "Path exceeds maximum length of {MAX_PATH_LENGTH} characters"
        )));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(CoreError::Validation(format!(
            "Path '{path}' must not start or end with '/'"
        )));
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(CoreError::Validation(format!(
                "Path '{path}' contains an invalid segment"
            )));
        }
    }
    Ok(())
}

/// Validate a document title (non-empty, bounded length).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_detection_is_suffix_based() {
        assert!(is_markdown_file("intro.md"));
        assert!(!is_markdown_file("intro.mdx"));
        assert!(!is_markdown_file("README"));
    }

    #[test]
    fn title_strips_extension_and_humanizes() {
        assert_eq!(title_from_file_name("intro.md"), "intro");
        assert_eq!(title_from_file_name("getting-started.md"), "getting started");
        assert_eq!(title_from_file_name("api_keys.md"), "api keys");
    }

    #[test]
    fn document_path_strips_only_trailing_extension() {
        assert_eq!(document_path_from_remote("docs/intro.md"), "docs/intro");
        assert_eq!(document_path_from_remote("a.md/b.md"), "a.md/b");
    }

    #[test]
    fn remote_path_prefers_existing_link() {
        assert_eq!(remote_path_for_document("api/auth", None), "api/auth.md");
        assert_eq!(
            remote_path_for_document("api/auth", Some("docs/AUTH.md")),
            "docs/AUTH.md"
        );
        assert_eq!(remote_path_for_document("api/auth", Some("")), "api/auth.md");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("API/Auth Guide!!"), "api-auth-guide");
        assert_eq!(slugify("--lead"), "lead");
        assert_eq!(slugify("///"), "");
    }

    #[test]
    fn branch_name_is_unique_per_timestamp() {
        let a = submission_branch_name("api/auth", 1_700_000_000_000);
        let b = submission_branch_name("api/auth", 1_700_000_000_001);
        assert_eq!(a, "docs-update-api-auth-1700000000000");
        assert_ne!(a, b);
        assert_eq!(submission_branch_name("!!", 5), "docs-update-5");
    }

    #[test]
    fn folder_is_directory_prefix() {
        assert_eq!(folder_of("api/auth"), Some("api"));
        assert_eq!(folder_of("api/v2/auth"), Some("api/v2"));
        assert_eq!(folder_of("readme"), None);
    }

    #[test]
    fn path_validation() {
        assert!(validate_path("api/auth").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/api").is_err());
        assert!(validate_path("api/").is_err());
        assert!(validate_path("api//auth").is_err());
        assert!(validate_path("api/../etc").is_err());
    }

    #[test]
    fn title_validation() {
        assert!(validate_title("Guide").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }
}
