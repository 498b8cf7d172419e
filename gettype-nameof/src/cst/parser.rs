//! Tree-sitter based CST parser for C# source code.
//!
//! The tree-sitter tree is flattened into an arena with parent links so
//! rules can walk upwards from any node.

use crate::syntax::{text_range, Role, SyntaxKind, SyntaxTree};
use ruff_text_size::TextRange;
use smallvec::SmallVec;
use tree_sitter::Parser;

/// A point in source code (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Zero-indexed row number
    pub row: usize,
    /// Zero-indexed column (byte offset within line)
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            row: p.row,
            column: p.column,
        }
    }
}

/// Index of a node inside its [`CstTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A CST node with exact source location
#[derive(Debug, Clone)]
pub struct CstNode {
    /// Grammar node kind (e.g., "class_declaration", "identifier")
    pub raw_kind: &'static str,
    /// Classified kind
    pub kind: SyntaxKind,
    /// Field name this node occupies in its parent, if any
    pub field: Option<&'static str>,
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Start point (row, column)
    pub start_point: Point,
    /// Whether this is a named node (vs anonymous like punctuation)
    pub is_named: bool,
    /// Whether the parser inserted this node to recover from an error
    pub is_missing: bool,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

fn classify(raw_kind: &str, is_named: bool) -> SyntaxKind {
    // Depending on the grammar version `this` is a named node or a bare keyword.
    if raw_kind == "this" {
        return SyntaxKind::This;
    }
    if !is_named {
        return SyntaxKind::Other;
    }
    match raw_kind {
        "compilation_unit" => SyntaxKind::CompilationUnit,
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            SyntaxKind::NamespaceDeclaration
        }
        "class_declaration" => SyntaxKind::ClassDeclaration,
        "record_declaration" | "record_struct_declaration" => SyntaxKind::RecordDeclaration,
        "struct_declaration" => SyntaxKind::StructDeclaration,
        "interface_declaration" => SyntaxKind::InterfaceDeclaration,
        "enum_declaration" => SyntaxKind::EnumDeclaration,
        "method_declaration" => SyntaxKind::MethodDeclaration,
        "member_access_expression" => SyntaxKind::MemberAccess,
        "invocation_expression" => SyntaxKind::Invocation,
        "argument_list" => SyntaxKind::ArgumentList,
        "argument" => SyntaxKind::Argument,
        "identifier" => SyntaxKind::Identifier,
        "this_expression" => SyntaxKind::This,
        "comment" => SyntaxKind::Comment,
        "ERROR" => SyntaxKind::Error,
        _ => SyntaxKind::Other,
    }
}

/// A parsed CST tree
#[derive(Debug)]
pub struct CstTree {
    nodes: Vec<CstNode>,
    /// Original source code
    pub source: String,
    has_error: bool,
}

impl CstTree {
    /// Extract a slice of source code by byte range
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.source.get(start..end).unwrap_or_default()
    }

    /// The node stored at `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &CstNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the parser had to recover from syntax errors anywhere.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// All node ids in pre-order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// Find all nodes of a specific kind
    #[must_use]
    pub fn find_by_kind(&self, kind: SyntaxKind) -> Vec<NodeId> {
        self.node_ids().filter(|&id| self.node(id).kind == kind).collect()
    }

    /// Child of `node` stored under grammar field `field`.
    #[must_use]
    pub fn field_child(&self, node: NodeId, field: &str) -> Option<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).field == Some(field))
    }

    /// Named children of `node`.
    pub fn named_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node)
            .children
            .iter()
            .copied()
            .filter(|&c| self.node(c).is_named)
    }

    /// Whether `node` has an anonymous token child spelled `token`.
    #[must_use]
    pub fn has_token(&self, node: NodeId, token: &str) -> bool {
        self.node(node)
            .children
            .iter()
            .any(|&c| !self.node(c).is_named && self.node(c).raw_kind == token)
    }

    /// Modifier keywords (`sealed`, `partial`, ...) attached to a declaration.
    pub fn modifiers(&self, node: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.named_children(node)
            .filter(|&c| self.node(c).raw_kind == "modifier")
            .map(|c| self.text(c).trim())
    }

    fn push(
        &mut self,
        cursor: &tree_sitter::TreeCursor<'_>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let node = cursor.node();
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let raw_kind = node.kind();
        let is_named = node.is_named();
        self.nodes.push(CstNode {
            raw_kind,
            kind: classify(raw_kind, is_named),
            field: cursor.field_name(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_point: node.start_position().into(),
            is_named,
            is_missing: node.is_missing(),
            parent,
            children: SmallVec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    fn from_ts_tree(tree: &tree_sitter::Tree, source: &str) -> Self {
        let mut out = Self {
            nodes: Vec::new(),
            source: source.to_owned(),
            has_error: tree.root_node().has_error(),
        };
        let mut cursor = tree.walk();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut current = out.push(&cursor, None);
        // Iterative pre-order walk, deep expression chains must not overflow the stack.
        loop {
            if cursor.goto_first_child() {
                stack.push(current);
                current = out.push(&cursor, Some(current));
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    let parent = stack.last().copied();
                    current = out.push(&cursor, parent);
                    break;
                }
                if !cursor.goto_parent() {
                    return out;
                }
                match stack.pop() {
                    Some(parent) => current = parent,
                    None => return out,
                }
            }
        }
    }
}

impl SyntaxTree for CstTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn kind(&self, node: NodeId) -> SyntaxKind {
        self.node(node).kind
    }

    fn range(&self, node: NodeId) -> TextRange {
        let n = self.node(node);
        text_range(n.start_byte, n.end_byte)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.to_vec()
    }

    fn child(&self, node: NodeId, role: Role) -> Option<NodeId> {
        let (field, fallback_kind) = match (self.kind(node), role) {
            (SyntaxKind::MemberAccess, Role::Receiver) => ("expression", None),
            (SyntaxKind::MemberAccess, Role::Member) => ("name", None),
            (SyntaxKind::Invocation, Role::Callee) => ("function", None),
            (SyntaxKind::Invocation, Role::Arguments) => {
                ("arguments", Some(SyntaxKind::ArgumentList))
            }
            (_, Role::Name) => ("name", Some(SyntaxKind::Identifier)),
            _ => return None,
        };
        if let Some(child) = self.field_child(node, field) {
            return Some(child);
        }
        // Older grammar releases do not label every child with a field.
        match (fallback_kind, role) {
            (Some(kind), _) => self.named_children(node).find(|&c| self.kind(c) == kind),
            (None, Role::Receiver | Role::Callee) => self.named_children(node).next(),
            (None, _) => self.named_children(node).last(),
        }
    }

    fn text(&self, node: NodeId) -> &str {
        let n = self.node(node);
        self.slice(n.start_byte, n.end_byte)
    }
}

/// Error during CST parsing
#[derive(Debug, thiserror::Error)]
pub enum CstError {
    /// Failed to create parser
    #[error("Failed to create CST parser: {0}")]
    ParserCreation(String),
    /// Failed to parse source
    #[error("Failed to parse source as C#")]
    ParseFailed,
}

/// Tree-sitter based CST parser
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for C#
    ///
    /// # Errors
    /// Returns error if parser creation fails
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();

        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source code into a CST
    ///
    /// # Errors
    /// Returns error if parsing fails
    pub fn parse(&mut self, source: &str) -> Result<CstTree, CstError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;

        Ok(CstTree::from_ts_tree(&tree, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CstTree {
        CstParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn test_parse_simple_class() {
        let tree = parse("sealed class MyClass { void Log() { } }");

        assert_eq!(tree.kind(tree.root()), SyntaxKind::CompilationUnit);
        let classes = tree.find_by_kind(SyntaxKind::ClassDeclaration);
        assert_eq!(classes.len(), 1);
        let name = tree.child(classes[0], Role::Name).unwrap();
        assert_eq!(tree.text(name), "MyClass");
        assert!(tree.modifiers(classes[0]).any(|m| m == "sealed"));
    }

    #[test]
    fn test_byte_ranges_accurate() {
        let source = "class A { }";
        let tree = parse(source);

        let root = tree.node(tree.root());
        assert_eq!(root.start_byte, 0);
        assert_eq!(root.end_byte, source.len());
    }

    #[test]
    fn test_parent_links() {
        let tree = parse("class A { void M() { var n = GetType().Name; } }");

        let access = tree.find_by_kind(SyntaxKind::MemberAccess)[0];
        let class = crate::syntax::ancestors(&tree, access)
            .find(|&n| tree.kind(n).is_type_declaration())
            .unwrap();
        assert_eq!(tree.kind(class), SyntaxKind::ClassDeclaration);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_member_access_roles() {
        let tree = parse("class A { string M() => this.GetType().Name; }");

        let outer = tree
            .find_by_kind(SyntaxKind::MemberAccess)
            .into_iter()
            .find(|&n| tree.text(n) == "this.GetType().Name")
            .unwrap();
        let member = tree.child(outer, Role::Member).unwrap();
        assert_eq!(tree.text(member), "Name");
        let receiver = tree.child(outer, Role::Receiver).unwrap();
        assert_eq!(tree.kind(receiver), SyntaxKind::Invocation);
        let args = tree.child(receiver, Role::Arguments).unwrap();
        assert_eq!(crate::syntax::argument_count(&tree, args), 0);
    }

    #[test]
    fn test_find_smallest_covering() {
        let source = "class A { string M() => GetType().Name; }";
        let tree = parse(source);

        let start = source.find("GetType").unwrap();
        let end = start + "GetType().Name".len();
        let node = tree.covering_node(text_range(start, end)).unwrap();
        assert_eq!(tree.text(node), "GetType().Name");
    }

    #[test]
    fn test_error_recovery_flag() {
        assert!(!parse("class A { }").has_error());
        assert!(parse("class A { void M( }").has_error());
    }
}
