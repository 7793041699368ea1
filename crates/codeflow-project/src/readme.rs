//! README generation from `package.json` and the project's file list

use codeflow_core::ProjectFile;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadmeError {
    #[error("could not find package.json in the project")]
    NoPackageJson,
    #[error("failed to parse package.json: {0}")]
    InvalidPackage(#[from] serde_json::Error),
}

/// Shown when no feature heuristic fires.
pub const NO_FEATURES: &str = "*No key features detected automatically.*";

/// A directory level of the drawn tree. Children keep first-seen order.
#[derive(Default)]
struct Dir {
    entries: Vec<(String, Dir)>,
}

impl Dir {
    fn child(&mut self, name: &str) -> &mut Dir {
        let pos = match self.entries.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.entries.push((name.to_string(), Dir::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    fn draw(&self, prefix: &str, out: &mut String) {
        let last = self.entries.len().saturating_sub(1);
        for (i, (name, dir)) in self.entries.iter().enumerate() {
            let (connector, extension) = if i == last { ("└── ", "    ") } else { ("├── ", "│   ") };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(name);
            out.push('\n');
            if !dir.entries.is_empty() {
                dir.draw(&format!("{}{}", prefix, extension), out);
            }
        }
    }
}

/// Draw the project's files as a tree under a `.` root. Paths containing
/// any of `ignore` are left out.
pub fn build_file_tree(files: &[ProjectFile], ignore: &[String]) -> String {
    let mut paths: Vec<&str> = files
        .iter()
        .map(|f| f.path.as_str())
        .filter(|path| !ignore.iter().any(|pattern| path.contains(pattern.as_str())))
        .collect();
    paths.sort_unstable();

    let mut root = Dir::default();
    for path in paths {
        path.split('/').fold(&mut root, |dir, part| dir.child(part));
    }

    let mut out = String::from(".\n");
    root.draw("", &mut out);
    out
}

fn merged_dependencies(pkg: &Value) -> Map<String, Value> {
    let mut all = Map::new();
    for key in ["dependencies", "devDependencies"] {
        if let Some(deps) = pkg.get(key).and_then(Value::as_object) {
            all.extend(deps.clone());
        }
    }
    all
}

/// Key-feature bullets guessed from dependencies and file paths.
pub fn feature_bullets(pkg: &Value, files: &[ProjectFile]) -> String {
    let deps = merged_dependencies(pkg);
    let has = |name: &str| deps.contains_key(name);
    let any_path = |test: &dyn Fn(&str) -> bool| files.iter().any(|f| test(&f.path));

    let mut features: Vec<&str> = Vec::new();
    if has("react") {
        features.push("Built with a modern, component-based **React** UI.");
    }
    if has("react-router-dom") {
        features.push("Includes **client-side routing** for a multi-page feel.");
    }
    if has("tailwindcss") {
        features.push("Styled utility-first with **Tailwind CSS**.");
    } else if any_path(&|p| p.ends_with(".scss") || p.ends_with(".sass")) {
        features.push("Uses **Sass** for advanced, nested styling.");
    }
    if has("axios") || has("fetch") {
        features.push("Connects to external data sources using **API fetching**.");
    }
    if has("firebase") {
        features.push("Integrated with **Firebase** for backend services (auth, database).");
    }
    if has("@xyflow/react") || has("d3") {
        features.push("Renders complex **data visualizations**.");
    }
    if any_path(&|p| p.contains("src/api") || p.contains("src/utils/api")) {
        features.push("Features a dedicated **API layer** for data management.");
    }
    if any_path(&|p| p.contains("src/components")) {
        features.push("Organized with a clean, **component-based** file structure.");
    }
    if any_path(&|p| p.ends_with(".ts") || p.ends_with(".tsx")) {
        features.push("Ensures code quality and type safety with **TypeScript**.");
    }

    if features.is_empty() {
        return NO_FEATURES.to_string();
    }
    features.iter().map(|f| format!("- {}", f)).collect::<Vec<_>>().join("\n")
}

fn key_list(pkg: &Value, key: &str) -> Option<String> {
    let deps = pkg.get(key)?.as_object()?;
    Some(deps.keys().map(|d| format!("- `{}`", d)).collect::<Vec<_>>().join("\n"))
}

/// Full README for the project, or an error when it has no readable
/// `package.json`.
pub fn generate_readme(files: &[ProjectFile], ignore: &[String]) -> Result<String, ReadmeError> {
    let pkg_file = files
        .iter()
        .find(|f| f.path.ends_with("package.json"))
        .ok_or(ReadmeError::NoPackageJson)?;
    let pkg: Value = serde_json::from_str(&pkg_file.content)?;

    let name = pkg.get("name").and_then(Value::as_str).unwrap_or("My Project");
    let description = pkg
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .unwrap_or("A description of the project. (Update this in your package.json!)");

    let scripts = match pkg.get("scripts").and_then(Value::as_object) {
        Some(scripts) => scripts
            .iter()
            .map(|(name, command)| {
                let command = command.as_str().map(str::to_string).unwrap_or_else(|| command.to_string());
                format!("- `npm run {}`: Runs `{}`", name, command)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        None => "*No scripts found.*".to_string(),
    };

    let mut dependencies = format!(
        "### Dependencies\n{}\n\n",
        key_list(&pkg, "dependencies").unwrap_or_else(|| "*None*".to_string())
    );
    if let Some(dev) = key_list(&pkg, "devDependencies").filter(|d| !d.is_empty()) {
        dependencies.push_str(&format!("### Dev Dependencies\n{}", dev));
    }

    let features = feature_bullets(&pkg, files);
    let tree = build_file_tree(files, ignore);

    Ok(format!(
        "
# {name}
{description}
## ✨ Key Features
{features}
## 🚀 Installation
```bash
npm install
```
## Usage
To run this project, use the following scripts:

{scripts}
## 📂 Project Structure
```
{tree}
```
## External Dependencies
{dependencies}
## 🤝 Contributing
Contributions are welcome!
## 📄 License
*This project is not licensed.*
## 📞 Contact
*your-email@example.com*
---
*This README was auto-generated by CodeFlow IDE.*
"
    ))
}
