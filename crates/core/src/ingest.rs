use crate::extractor::DocumentFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects resume files under `folder`, keeping only supported
/// extensions. Symlinks are followed. Paths come back sorted by their full
/// text so that ranking ties resolve the same way on every run.
pub fn discover_resume_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        if DocumentFormat::is_supported(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable_by(|left, right| left.as_os_str().cmp(right.as_os_str()));
    files
}
