//! Filesystem watcher feeding project edits into the pipeline

use std::path::{Path, PathBuf};

use codeflow_core::{CodeflowConfig, ProjectFile};
use codeflow_project::{accepts, ignore_rules, relative_path};
use ignore::gitignore::Gitignore;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::session::Edit;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("filesystem watch failed: {0}")]
    Notify(#[from] notify::Error),
}

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

/// Paths the watcher never reports: configured names anywhere in the
/// path, and anything the root ignore file matches.
#[derive(Clone)]
pub struct PathFilter {
    root: PathBuf,
    names: Vec<String>,
    rules: Gitignore,
}

impl PathFilter {
    pub fn new(root: &Path, config: &CodeflowConfig) -> Self {
        PathFilter {
            root: root.to_path_buf(),
            names: config.ignore.clone(),
            rules: ignore_rules(root),
        }
    }

    pub fn excludes(&self, path: &Path) -> bool {
        if should_ignore_path(path, &self.names) {
            return true;
        }
        match path.strip_prefix(&self.root) {
            Ok(relative) => self
                .rules
                .matched_path_or_any_parents(relative, path.is_dir())
                .is_ignore(),
            Err(_) => false,
        }
    }
}

/// Recursive watcher over a project root
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    root: PathBuf,
    config: CodeflowConfig,
    filter: PathFilter,
}

impl FileWatcher {
    /// Create a watcher for `root`. Nothing is reported until
    /// [`FileWatcher::start`] is called.
    ///
    /// The root is canonicalized when possible, since notify reports
    /// absolute paths.
    pub fn new(root: impl AsRef<Path>, config: &CodeflowConfig) -> Result<Self, WatchError> {
        let root = root.as_ref();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let filter = PathFilter::new(&root, config);
        let callback_filter = filter.clone();

        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                debug!("File system event: {:?}", event);
                handle_notify_event(event, &callback_filter, &event_tx);
            }
            Err(e) => error!("File system watch error: {}", e),
        })?;

        Ok(FileWatcher {
            watcher,
            event_rx,
            root,
            config: config.clone(),
            filter,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start watching the root recursively.
    pub fn start(&mut self) -> Result<(), WatchError> {
        info!("Watching directory: {}", self.root.display());
        self.watcher.watch(&self.root, RecursiveMode::Recursive)?;
        Ok(())
    }

    pub fn event_receiver(&mut self) -> &mut mpsc::UnboundedReceiver<WatchEvent> {
        &mut self.event_rx
    }

    /// Forward every event as a project edit until `edits` is closed.
    pub async fn forward(mut self, edits: mpsc::UnboundedSender<Edit>) {
        while let Some(event) = self.event_rx.recv().await {
            let Some(edit) = edit_for(&self.root, &event, &self.config, &self.filter).await else {
                continue;
            };
            if edits.send(edit).is_err() {
                debug!("Edit stream closed, stopping watcher");
                break;
            }
        }
    }
}

fn handle_notify_event(event: notify::Event, filter: &PathFilter, event_tx: &mpsc::UnboundedSender<WatchEvent>) {
    let make: fn(PathBuf) -> WatchEvent = match event.kind {
        notify::EventKind::Create(_) => WatchEvent::Created,
        notify::EventKind::Modify(_) => WatchEvent::Modified,
        notify::EventKind::Remove(_) => WatchEvent::Removed,
        _ => return,
    };
    for path in event.paths {
        if filter.excludes(&path) {
            continue;
        }
        if let Err(e) = event_tx.send(make(path)) {
            warn!("Failed to send watch event: {}", e);
        }
    }
}

/// Whether any component of `path` is on the ignore list.
pub fn should_ignore_path(path: &Path, ignore: &[String]) -> bool {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|name| ignore.iter().any(|pattern| pattern == name))
}

/// Project edit for a watch event. Writes re-read the file and replace its
/// content wholesale; files the loader would skip produce nothing.
pub async fn edit_for(root: &Path, event: &WatchEvent, config: &CodeflowConfig, filter: &PathFilter) -> Option<Edit> {
    match event {
        WatchEvent::Created(path) | WatchEvent::Modified(path) => {
            if filter.excludes(path) {
                debug!("Ignoring {}", path.display());
                return None;
            }
            let relative = relative_path(root, path)?;
            let metadata = tokio::fs::metadata(path).await.ok()?;
            if !metadata.is_file() || !accepts(path, metadata.len(), config) {
                return None;
            }
            match tokio::fs::read(path).await {
                Ok(bytes) => Some(Edit::FileWritten(ProjectFile::new(
                    relative,
                    String::from_utf8_lossy(&bytes),
                ))),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    None
                }
            }
        }
        WatchEvent::Removed(path) => relative_path(root, path).map(Edit::FileRemoved),
    }
}
