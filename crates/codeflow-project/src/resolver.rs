//! Static resolution of import specifiers against the project's file set

use std::collections::HashSet;

use codeflow_core::ResolvedImport;

/// Suffixes tried, in order, when the normalized path is not a file itself.
pub const RESOLVE_SUFFIXES: &[&str] = &[".js", ".jsx", ".ts", ".tsx", "/index.js", "/index.jsx"];

/// Every file path of the open project, for membership tests.
#[derive(Debug, Clone, Default)]
pub struct KnownPaths(HashSet<String>);

impl KnownPaths {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        KnownPaths(iter.into_iter().map(Into::into).collect())
    }
}

/// Package names and absolute specifiers; only `.`-prefixed ones are
/// resolved against the project.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Directory part of a slash-separated path, `""` at the root.
fn dirname(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Join `specifier` onto the directory of `from_path` and collapse `.` and
/// `..` segments. `..` never climbs above the project root, and the result
/// carries no leading slash.
pub fn normalize_relative(from_path: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = dirname(from_path).split('/').filter(|s| !s.is_empty()).collect();
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments.join("/")
}

/// Resolve one import.
///
/// Non-relative specifiers come back verbatim (the caller treats them as
/// external). Relative ones resolve to the exact normalized path or the
/// first suffix in [`RESOLVE_SUFFIXES`] that names a known file, else
/// `None`.
pub fn resolve_import_path(from_path: &str, specifier: &str, known: &KnownPaths) -> Option<String> {
    if !is_relative(specifier) {
        return Some(specifier.to_string());
    }
    let base = normalize_relative(from_path, specifier);
    if known.contains(&base) {
        return Some(base);
    }
    RESOLVE_SUFFIXES
        .iter()
        .map(|suffix| format!("{}{}", base, suffix))
        .find(|candidate| known.contains(candidate))
}

/// Resolve one import into a [`ResolvedImport`] record.
pub fn resolve(from_path: &str, specifier: &str, known: &KnownPaths) -> ResolvedImport {
    ResolvedImport {
        from_path: from_path.to_string(),
        to_path: resolve_import_path(from_path, specifier, known),
        is_external: !is_relative(specifier),
    }
}
