//! Project-level analysis: import resolution, dependency graph, loading

pub mod dependency;
pub mod imports;
pub mod loader;
pub mod readme;
pub mod resolver;


pub use dependency::{import_cycles, DependencyGraphBuilder, DependencyReport, EXTERNAL_LABEL};
pub use imports::{is_script_path, EstreeImportScanner, ImportScanner, ScanError, TreeSitterImportScanner};
pub use loader::{accepts, entry_file, ignore_rules, load_project, relative_path, LoadError, IGNORE_FILE};
pub use readme::{build_file_tree, feature_bullets, generate_readme, ReadmeError};
pub use resolver::{resolve, resolve_import_path, KnownPaths};
