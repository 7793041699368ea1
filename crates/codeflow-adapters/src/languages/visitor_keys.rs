//! Visitor-key tables: node type → ordered child-bearing property keys

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Child-key enumeration supplied by a JS-family parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorKeys(HashMap<String, Vec<String>>);

impl VisitorKeys {
    /// Ordered child keys for `node_type`, or `None` for types the table
    /// does not know (the walk stops there).
    pub fn keys_for(&self, node_type: &str) -> Option<&[String]> {
        self.0.get(node_type).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a table shaped like `{ "Program": ["directives", "body"], ... }`.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Add or replace the entry for one node type.
    pub fn insert(&mut self, node_type: impl Into<String>, keys: &[&str]) {
        self.0
            .insert(node_type.into(), keys.iter().map(|k| k.to_string()).collect());
    }

    /// Table matching Babel's `VISITOR_KEYS` for core JavaScript, JSX and
    /// the common TypeScript node types.
    pub fn babel() -> Self {
        let mut table = VisitorKeys::default();
        for (node_type, keys) in BABEL_KEYS {
            table.insert(*node_type, keys);
        }
        table
    }
}

const FUNCTION: &[&str] = &["id", "typeParameters", "params", "returnType", "body"];
const CLASS: &[&str] = &[
    "decorators",
    "id",
    "typeParameters",
    "superClass",
    "superTypeParameters",
    "implements",
    "body",
];
const METHOD: &[&str] = &["decorators", "key", "typeParameters", "params", "returnType", "body"];
const PROPERTY: &[&str] = &["decorators", "key", "typeAnnotation", "value"];
const CALL: &[&str] = &["callee", "arguments", "typeParameters", "typeArguments"];
const MEMBER: &[&str] = &["object", "property"];
const BINARY: &[&str] = &["left", "right"];
const ARGUMENT: &[&str] = &["argument"];
const EXPRESSION: &[&str] = &["expression"];
const LEAF: &[&str] = &[];

const BABEL_KEYS: &[(&str, &[&str])] = &[
    // Program structure
    ("File", &["program"]),
    ("Program", &["directives", "body"]),
    ("Directive", &["value"]),
    ("DirectiveLiteral", LEAF),
    ("InterpreterDirective", LEAF),
    // Statements
    ("BlockStatement", &["directives", "body"]),
    ("BreakStatement", &["label"]),
    ("ContinueStatement", &["label"]),
    ("DebuggerStatement", LEAF),
    ("DoWhileStatement", &["body", "test"]),
    ("EmptyStatement", LEAF),
    ("ExpressionStatement", EXPRESSION),
    ("ForInStatement", &["left", "right", "body"]),
    ("ForOfStatement", &["left", "right", "body"]),
    ("ForStatement", &["init", "test", "update", "body"]),
    ("IfStatement", &["test", "consequent", "alternate"]),
    ("LabeledStatement", &["label", "body"]),
    ("ReturnStatement", ARGUMENT),
    ("SwitchStatement", &["discriminant", "cases"]),
    ("SwitchCase", &["test", "consequent"]),
    ("ThrowStatement", ARGUMENT),
    ("TryStatement", &["block", "handler", "finalizer"]),
    ("CatchClause", &["param", "body"]),
    ("WhileStatement", &["test", "body"]),
    ("WithStatement", &["object", "body"]),
    // Declarations
    ("FunctionDeclaration", FUNCTION),
    ("VariableDeclaration", &["declarations"]),
    ("VariableDeclarator", &["id", "init"]),
    ("ClassDeclaration", CLASS),
    ("ClassBody", &["body"]),
    ("ClassMethod", METHOD),
    ("ClassPrivateMethod", METHOD),
    ("ClassProperty", PROPERTY),
    ("ClassPrivateProperty", PROPERTY),
    ("ClassAccessorProperty", PROPERTY),
    ("PrivateName", &["id"]),
    ("StaticBlock", &["body"]),
    // Modules
    ("ImportDeclaration", &["specifiers", "source"]),
    ("ImportDefaultSpecifier", &["local"]),
    ("ImportNamespaceSpecifier", &["local"]),
    ("ImportSpecifier", &["imported", "local"]),
    ("ExportAllDeclaration", &["source"]),
    ("ExportDefaultDeclaration", &["declaration"]),
    ("ExportNamedDeclaration", &["declaration", "specifiers", "source"]),
    ("ExportSpecifier", &["local", "exported"]),
    ("ExportNamespaceSpecifier", &["exported"]),
    // Expressions
    ("ArrayExpression", &["elements"]),
    ("ArrowFunctionExpression", &["typeParameters", "params", "returnType", "body"]),
    ("AssignmentExpression", BINARY),
    ("AwaitExpression", ARGUMENT),
    ("BinaryExpression", BINARY),
    ("CallExpression", CALL),
    ("OptionalCallExpression", CALL),
    ("NewExpression", CALL),
    ("ClassExpression", CLASS),
    ("ConditionalExpression", &["test", "consequent", "alternate"]),
    ("FunctionExpression", FUNCTION),
    ("Import", LEAF),
    ("LogicalExpression", BINARY),
    ("MemberExpression", MEMBER),
    ("OptionalMemberExpression", MEMBER),
    ("MetaProperty", &["meta", "property"]),
    ("ObjectExpression", &["properties"]),
    ("ObjectMethod", METHOD),
    ("ObjectProperty", &["key", "value", "decorators"]),
    ("ParenthesizedExpression", EXPRESSION),
    ("SequenceExpression", &["expressions"]),
    ("SpreadElement", ARGUMENT),
    ("Super", LEAF),
    ("TaggedTemplateExpression", &["tag", "typeParameters", "quasi"]),
    ("TemplateLiteral", &["quasis", "expressions"]),
    ("TemplateElement", LEAF),
    ("ThisExpression", LEAF),
    ("UnaryExpression", ARGUMENT),
    ("UpdateExpression", ARGUMENT),
    ("YieldExpression", ARGUMENT),
    ("Decorator", EXPRESSION),
    // Patterns
    ("Identifier", &["typeAnnotation", "decorators"]),
    ("ArrayPattern", &["elements", "typeAnnotation"]),
    ("AssignmentPattern", &["left", "right", "decorators"]),
    ("ObjectPattern", &["properties", "typeAnnotation", "decorators"]),
    ("RestElement", &["argument", "typeAnnotation", "decorators"]),
    // Literals
    ("StringLiteral", LEAF),
    ("NumericLiteral", LEAF),
    ("BigIntLiteral", LEAF),
    ("BooleanLiteral", LEAF),
    ("NullLiteral", LEAF),
    ("RegExpLiteral", LEAF),
    // JSX
    ("JSXAttribute", &["name", "value"]),
    ("JSXClosingElement", &["name"]),
    ("JSXClosingFragment", LEAF),
    ("JSXElement", &["openingElement", "children", "closingElement"]),
    ("JSXEmptyExpression", LEAF),
    ("JSXExpressionContainer", EXPRESSION),
    ("JSXFragment", &["openingFragment", "children", "closingFragment"]),
    ("JSXIdentifier", LEAF),
    ("JSXMemberExpression", MEMBER),
    ("JSXNamespacedName", &["namespace", "name"]),
    ("JSXOpeningElement", &["name", "typeParameters", "typeArguments", "attributes"]),
    ("JSXOpeningFragment", LEAF),
    ("JSXSpreadAttribute", ARGUMENT),
    ("JSXSpreadChild", EXPRESSION),
    ("JSXText", LEAF),
    // TypeScript
    ("TSAnyKeyword", LEAF),
    ("TSArrayType", &["elementType"]),
    ("TSAsExpression", &["expression", "typeAnnotation"]),
    ("TSBooleanKeyword", LEAF),
    ("TSDeclareFunction", &["id", "typeParameters", "params", "returnType"]),
    ("TSEnumDeclaration", &["id", "members"]),
    ("TSEnumMember", &["id", "initializer"]),
    ("TSFunctionType", &["typeParameters", "parameters", "typeAnnotation"]),
    ("TSInterfaceBody", &["body"]),
    ("TSInterfaceDeclaration", &["id", "typeParameters", "extends", "body"]),
    ("TSIntersectionType", &["types"]),
    ("TSLiteralType", &["literal"]),
    ("TSModuleBlock", &["body"]),
    ("TSModuleDeclaration", &["id", "body"]),
    ("TSNonNullExpression", EXPRESSION),
    ("TSNullKeyword", LEAF),
    ("TSNumberKeyword", LEAF),
    ("TSParameterProperty", &["parameter", "decorators"]),
    ("TSPropertySignature", &["key", "typeAnnotation"]),
    ("TSQualifiedName", BINARY),
    ("TSStringKeyword", LEAF),
    ("TSTypeAliasDeclaration", &["id", "typeParameters", "typeAnnotation"]),
    ("TSTypeAnnotation", &["typeAnnotation"]),
    ("TSTypeLiteral", &["members"]),
    ("TSTypeParameter", &["constraint", "default"]),
    ("TSTypeParameterDeclaration", &["params"]),
    ("TSTypeParameterInstantiation", &["params"]),
    ("TSTypeReference", &["typeName", "typeParameters"]),
    ("TSUndefinedKeyword", LEAF),
    ("TSUnionType", &["types"]),
    ("TSUnknownKeyword", LEAF),
    ("TSVoidKeyword", LEAF),
];
