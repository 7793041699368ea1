//! Unit tests for codeflow-core module

use crate::test_utils::tree_graph;
use crate::*;

#[test]
fn test_role_for_depth() {
    assert_eq!(NodeRole::for_depth(0), NodeRole::Input);
    assert_eq!(NodeRole::for_depth(3), NodeRole::Default);
}

#[test]
fn test_language_detection() {
    let test_cases = vec![
        ("src/App.jsx", Language::JavaScript),
        ("src/index.ts", Language::JavaScript),
        ("styles/site.css", Language::Css),
        ("public/index.html", Language::Html),
        ("Main.java", Language::Java),
        ("tool.py", Language::Python),
        ("README.md", Language::JavaScript),
    ];

    for (path, expected) in test_cases {
        assert_eq!(Language::from_path(path), expected, "Failed for {}", path);
    }
}

#[test]
fn test_language_and_mode_parsing() {
    assert_eq!("TS".parse::<Language>().unwrap(), Language::JavaScript);
    assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
    assert!("cobol".parse::<Language>().is_err());
    assert_eq!("advanced".parse::<FidelityMode>().unwrap(), FidelityMode::Advanced);
    assert_eq!("simple".parse::<FidelityMode>().unwrap(), FidelityMode::Simple);
}

#[test]
fn test_basename() {
    assert_eq!(basename("src/components/Button.jsx"), "Button.jsx");
    assert_eq!(basename("index.js"), "index.js");
    assert_eq!(ProjectFile::new("a/b.css", "").file_name(), "b.css");
}

#[test]
fn test_label_topology_ignores_ids() {
    let first = tree_graph(Family::Js, &[("Program", None), ("VariableDeclaration", Some(0))]);
    let second = tree_graph(Family::SimpleJs, &[("Program", None), ("VariableDeclaration", Some(0))]);
    assert_ne!(first.edges[0].id, second.edges[0].id);
    assert_eq!(first.label_topology(), second.label_topology());
}

#[test]
fn test_digraph_view() {
    let graph = tree_graph(
        Family::Dom,
        &[("<html>", None), ("<head>", Some(0)), ("<body>", Some(0)), ("<p>", Some(2))],
    );
    let digraph = graph.to_digraph();
    assert_eq!(digraph.node_count(), 4);
    assert_eq!(digraph.edge_count(), 3);
}

#[test]
fn test_graph_node_serialization() {
    let graph = tree_graph(Family::Dom, &[("<html>", None), ("<body>", Some(0))]);
    let json = serde_json::to_value(&graph).unwrap();

    assert_eq!(json["nodes"][0]["kind"], "input");
    assert_eq!(json["nodes"][1]["layoutHint"]["depth"], 1);
    assert_eq!(json["edges"][0]["source"], "dom-0");
    assert!(json["nodes"][0].get("external").is_none());

    let back: Graph = serde_json::from_value(json).unwrap();
    assert_eq!(back, graph);
}

#[test]
fn test_resolved_import_serialization() {
    let import = ResolvedImport {
        from_path: "src/a.js".to_string(),
        to_path: None,
        is_external: false,
    };
    let json = serde_json::to_string(&import).unwrap();
    assert_eq!(json, r#"{"fromPath":"src/a.js","toPath":null,"isExternal":false}"#);
}
