//! What the user currently has open, and the edits that change it

use codeflow_core::{FidelityMode, Language, ProjectFile};
use codeflow_project::entry_file;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Which graph the session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Structure of the single editor buffer.
    #[default]
    Scratch,
    /// File-level dependency graph of an opened project.
    Project,
}

/// A change to the session. Edits are applied in arrival order.
#[derive(Debug, Clone)]
pub enum Edit {
    /// The editor buffer was replaced. In project mode this is the
    /// active file's new content.
    Buffer(String),
    /// Explicit language tag for the scratch buffer, `None` to auto-detect.
    Language(Option<Language>),
    Mode(FidelityMode),
    OpenProject(Vec<ProjectFile>),
    CloseProject,
    /// Make the file at this path the one the editor shows.
    Activate(String),
    /// A project file was created or rewritten on disk.
    FileWritten(ProjectFile),
    /// A project file or directory was deleted.
    FileRemoved(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// Sorted by path.
    pub files: Vec<ProjectFile>,
    pub active: Option<String>,
}

impl Project {
    pub fn new(mut files: Vec<ProjectFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let active = entry_file(&files).map(|f| f.path.clone());
        Project { files, active }
    }

    pub fn active_file(&self) -> Option<&ProjectFile> {
        let active = self.active.as_deref()?;
        self.files.iter().find(|f| f.path == active)
    }

    fn write(&mut self, file: ProjectFile) {
        match self.files.binary_search_by(|f| f.path.cmp(&file.path)) {
            Ok(i) => self.files[i] = file,
            Err(i) => self.files.insert(i, file),
        }
    }

    /// Drop `path` and, if it is a directory, everything under it.
    fn remove(&mut self, path: &str) {
        let prefix = format!("{}/", path);
        self.files.retain(|f| f.path != path && !f.path.starts_with(&prefix));
        if self.active_file().is_none() {
            self.active = entry_file(&self.files).map(|f| f.path.clone());
        }
    }
}

/// Editor state a recomputation reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub scratch: String,
    pub language: Option<Language>,
    pub mode: FidelityMode,
    pub project: Option<Project>,
}

impl Session {
    pub fn new(mode: FidelityMode) -> Self {
        Session {
            mode,
            ..Session::default()
        }
    }

    pub fn view(&self) -> ViewMode {
        if self.project.is_some() {
            ViewMode::Project
        } else {
            ViewMode::Scratch
        }
    }

    /// Language of the active project file, taken from its extension.
    pub fn active_language(&self) -> Option<Language> {
        let project = self.project.as_ref()?;
        project.active.as_deref().map(Language::from_path)
    }

    pub fn apply(&mut self, edit: Edit) {
        match edit {
            Edit::Buffer(text) => match self.project.as_mut() {
                Some(project) => match project.active.clone() {
                    Some(path) => project.write(ProjectFile::new(path, text)),
                    None => warn!("Ignoring buffer edit: project has no open file"),
                },
                None => self.scratch = text,
            },
            Edit::Language(language) => self.language = language,
            Edit::Mode(mode) => {
                if mode != self.mode {
                    info!("Switched to {:?} mode", mode);
                }
                self.mode = mode;
            }
            Edit::OpenProject(files) => {
                let project = Project::new(files);
                info!(
                    "Opened project with {} files, active {}",
                    project.files.len(),
                    project.active.as_deref().unwrap_or("<none>")
                );
                self.project = Some(project);
            }
            Edit::CloseProject => {
                if self.project.take().is_some() {
                    info!("Closed project, back to scratch buffer");
                }
            }
            Edit::Activate(path) => match self.project.as_mut() {
                Some(project) if project.files.iter().any(|f| f.path == path) => project.active = Some(path),
                Some(_) => warn!("Cannot activate {}: not in project", path),
                None => debug!("Ignoring activate of {} outside project mode", path),
            },
            Edit::FileWritten(file) => match self.project.as_mut() {
                Some(project) => {
                    debug!("Project file written: {}", file.path);
                    project.write(file);
                }
                None => debug!("Ignoring write of {} outside project mode", file.path),
            },
            Edit::FileRemoved(path) => match self.project.as_mut() {
                Some(project) => {
                    debug!("Project file removed: {}", path);
                    project.remove(&path);
                }
                None => debug!("Ignoring removal of {} outside project mode", path),
            },
        }
    }
}
