//! Integration tests for CodeFlow
//!
//! These drive the CLI binary and the library crates together.

use std::path::Path;
use std::process::{Command, Output};

use codeflow_adapters::ParserRegistry;
use codeflow_core::{CodeflowConfig, FidelityMode};
use codeflow_project::{load_project, DependencyGraphBuilder};
use codeflow_watcher::{Edit, RecomputePipeline, Session, ViewMode};
use serde_json::Value;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "package.json",
        r#"{ "name": "demo", "scripts": { "dev": "vite" }, "dependencies": { "react": "^18" } }"#,
    );
    write(
        root,
        "src/index.js",
        "import React from 'react';\nimport App from './App';\nimport './index.css';\n",
    );
    write(root, "src/App.jsx", "import { api } from './api';\nexport default function App() {}\n");
    write(root, "src/api/index.js", "export const api = {};\n");
    write(root, "src/index.css", "body { margin: 0 }\n");
    write(root, "node_modules/react/index.js", "module.exports = {};\n");
    dir
}

fn codeflow(args: &[&str], config_dir: &Path) -> Output {
    let config = config_dir.join("codeflow.toml");
    Command::new(env!("CARGO_BIN_EXE_codeflow"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("failed to run codeflow")
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn labels(graph: &Value) -> Vec<&str> {
    graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["label"].as_str().unwrap())
        .collect()
}

#[test]
fn cli_help() {
    let dir = TempDir::new().unwrap();
    let output = codeflow(&["--help"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("codeflow"));
    assert!(stdout.contains("Live structure and dependency graphs for source code"));
}

#[test]
fn deps_prints_dependency_graph() {
    let project = sample_project();
    let graph = stdout_json(&codeflow(&["deps", project.path().to_str().unwrap()], project.path()));

    let edges = graph["edges"].as_array().unwrap();
    let internal: Vec<(&str, &str)> = edges
        .iter()
        .filter(|e| e["emphasized"] == Value::Bool(true))
        .map(|e| (e["source"].as_str().unwrap(), e["target"].as_str().unwrap()))
        .collect();
    assert_eq!(
        internal,
        vec![
            ("src/api/index.js", "src/App.jsx"),
            ("src/App.jsx", "src/index.js"),
            ("src/index.css", "src/index.js"),
        ]
    );
    assert!(labels(&graph).contains(&"react"));
    assert!(!labels(&graph).iter().any(|l| l.contains("node_modules")));
}

#[test]
fn readme_command() {
    let project = sample_project();
    let output = codeflow(&["readme", project.path().to_str().unwrap()], project.path());
    assert!(output.status.success());
    let readme = String::from_utf8_lossy(&output.stdout);
    assert!(readme.contains("\n# demo\n"));
    assert!(readme.contains("- `npm run dev`: Runs `vite`"));
    assert!(readme.contains("Features a dedicated **API layer** for data management."));
}

#[test]
fn ast_of_html_source() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "page.html", "<ul><li>one</li><li>two</li></ul>");
    let page = dir.path().join("page.html");
    let update = stdout_json(&codeflow(&["ast", page.to_str().unwrap()], dir.path()));
    assert_eq!(update["language"], "html");
    assert_eq!(update["view"], "scratch");
    assert_eq!(labels(&update["graph"]), vec!["<ul>", "<li>", "<li>"]);
}

#[test]
fn ast_of_css_parser_output() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "sheet.json",
        r#"{ "type": "StyleSheet", "children": [{
              "type": "Rule",
              "prelude": { "type": "SelectorList", "children": [{ "type": "Selector", "children": [{ "type": "ClassSelector", "name": "btn" }] }] },
              "block": { "type": "Block", "children": [{ "type": "Declaration", "property": "color", "value": { "type": "Raw", "value": "red" } }] }
           }] }"#,
    );
    let sheet = dir.path().join("sheet.json");
    let graph = stdout_json(&codeflow(&["ast", sheet.to_str().unwrap(), "--lang", "css"], dir.path()));
    assert_eq!(
        labels(&graph),
        vec!["StyleSheet", "Rule", "SelectorList", "Selector: .btn", "ClassSelector", "Block", "Declaration: color: ...", "Raw"]
    );
}

#[test]
fn parser_output_needs_a_language() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tree.json", "{}");
    let tree = dir.path().join("tree.json");
    let output = codeflow(&["ast", tree.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--lang is required"));
}

#[tokio::test]
async fn loaded_project_through_the_pipeline() {
    let project = sample_project();
    let config = CodeflowConfig::default();
    let files = load_project(project.path(), &config).unwrap();

    let pipeline = RecomputePipeline::new(ParserRegistry::from_config(&config), DependencyGraphBuilder::default());
    let mut session = Session::new(FidelityMode::Simple);
    session.apply(Edit::OpenProject(files));
    assert_eq!(session.project.as_ref().unwrap().active.as_deref(), Some("src/api/index.js"));
    session.apply(Edit::Activate("src/index.js".to_string()));

    pipeline.recompute(&session).await;
    let before = pipeline.latest().graph.edge_count();

    session.apply(Edit::Buffer("import React from 'react';\n".to_string()));
    pipeline.recompute(&session).await;
    let update = pipeline.latest();
    assert_eq!(update.view, ViewMode::Project);
    assert_eq!(update.graph.edge_count(), before - 2);
    assert!(update.graph.is_closed());
}
