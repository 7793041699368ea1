//! Reads a project directory into memory

use std::fs;
use std::path::{Component, Path, PathBuf};

use codeflow_core::{CodeflowConfig, ProjectFile};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use thiserror::Error;
use tracing::{debug, warn};

/// Per-directory ignore file honored in addition to the configured list.
pub const IGNORE_FILE: &str = ".codeflowignore";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Slash-separated path of `path` relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Patterns from the [`IGNORE_FILE`] at the top of `root`. A missing or
/// unreadable file yields an empty matcher.
pub fn ignore_rules(root: &Path) -> Gitignore {
    let file = root.join(IGNORE_FILE);
    let mut builder = GitignoreBuilder::new(root);
    if file.is_file() {
        if let Some(e) = builder.add(&file) {
            warn!("Failed to read {}: {}", file.display(), e);
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("Invalid pattern in {}: {}", file.display(), e);
        Gitignore::empty()
    })
}

/// Whether a file passes the extension and size filters.
pub fn accepts(path: &Path, size: u64, config: &CodeflowConfig) -> bool {
    let skipped_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.skip_extensions.iter().any(|s| s == ext));
    !skipped_ext && size <= config.max_file_bytes
}

/// Recursively read every file under `root`.
///
/// Entries whose name is on the ignore list are skipped along with
/// everything below them. Files are returned sorted by path, content read
/// as UTF-8 with invalid sequences replaced.
pub fn load_project(root: &Path, config: &CodeflowConfig) -> Result<Vec<ProjectFile>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::NotADirectory(root.to_path_buf()));
    }

    let ignored = config.ignore.clone();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(IGNORE_FILE)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !ignored.iter().any(|pattern| *pattern == name)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
        if !accepts(path, size, config) {
            debug!("Skipping {}", path.display());
            continue;
        }
        let Some(relative) = relative_path(root, path) else {
            warn!("Skipping non UTF-8 path {}", path.display());
            continue;
        };
        match fs::read(path) {
            Ok(bytes) => files.push(ProjectFile::new(relative, String::from_utf8_lossy(&bytes))),
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Loaded {} files from {}", files.len(), root.display());
    Ok(files)
}

/// File opened first: the first `index.js` or `App.js`, else the first file.
pub fn entry_file(files: &[ProjectFile]) -> Option<&ProjectFile> {
    files
        .iter()
        .find(|f| f.path.ends_with("index.js") || f.path.ends_with("App.js"))
        .or_else(|| files.first())
}
