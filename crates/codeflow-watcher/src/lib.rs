//! Debounced recomputation and filesystem watching

pub mod debounce;
pub mod pipeline;
pub mod session;
pub mod token;
pub mod watcher;


pub use debounce::Debouncer;
pub use pipeline::{GraphUpdate, RecomputePipeline};
pub use session::{Edit, Project, Session, ViewMode};
pub use token::{Token, TokenIssuer};
pub use watcher::{edit_for, should_ignore_path, FileWatcher, PathFilter, WatchError, WatchEvent};
