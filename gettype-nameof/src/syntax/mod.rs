//! Read-only view over a parsed source tree.
//!
//! Rules never see a concrete parser. They navigate through [`SyntaxTree`],
//! which the tree-sitter front end in [`crate::cst`] implements and which
//! tests can implement with a hand-built fake.

use ruff_text_size::{TextRange, TextSize};

/// Language-neutral node classification used by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of a document.
    CompilationUnit,
    /// `namespace N { ... }` or `namespace N;`.
    NamespaceDeclaration,
    /// `class C { ... }`.
    ClassDeclaration,
    /// `record R { ... }` and `record struct R { ... }`.
    RecordDeclaration,
    /// `struct S { ... }`.
    StructDeclaration,
    /// `interface I { ... }`.
    InterfaceDeclaration,
    /// `enum E { ... }`.
    EnumDeclaration,
    /// A method member.
    MethodDeclaration,
    /// `receiver.member`.
    MemberAccess,
    /// `callee(arguments)`.
    Invocation,
    /// The parenthesized argument list of an invocation.
    ArgumentList,
    /// A single argument inside an [`SyntaxKind::ArgumentList`].
    Argument,
    /// A simple identifier.
    Identifier,
    /// The `this` expression.
    This,
    /// A comment.
    Comment,
    /// A region the parser could not make sense of.
    Error,
    /// Anything the rules do not care about.
    Other,
}

impl SyntaxKind {
    /// Declarations that can own a `GetType()` call: classes, records and structs.
    #[must_use]
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration | Self::RecordDeclaration | Self::StructDeclaration
        )
    }
}

/// Labelled child positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Left side of a member access.
    Receiver,
    /// Right side (the accessed name) of a member access.
    Member,
    /// The invoked expression of an invocation.
    Callee,
    /// The argument list of an invocation.
    Arguments,
    /// The declared name of a declaration.
    Name,
}

/// The tree capability the rules need: kinds, spans, parents, children.
pub trait SyntaxTree {
    /// Cheap handle to a node of this tree.
    type Node: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    /// Root node of the document.
    fn root(&self) -> Self::Node;
    /// Kind of `node`.
    fn kind(&self, node: Self::Node) -> SyntaxKind;
    /// Byte range of `node` in the source text.
    fn range(&self, node: Self::Node) -> TextRange;
    /// Parent of `node`, `None` for the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// Children of `node` in source order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;
    /// Child of `node` playing `role`, if any.
    fn child(&self, node: Self::Node, role: Role) -> Option<Self::Node>;
    /// Source text covered by `node`.
    fn text(&self, node: Self::Node) -> &str;

    /// Smallest node whose range contains `range`.
    fn covering_node(&self, range: TextRange) -> Option<Self::Node> {
        let mut current = self.root();
        if !self.range(current).contains_range(range) {
            return None;
        }
        'descend: loop {
            for child in self.children(current) {
                if self.range(child).contains_range(range) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

/// Iterates the strict ancestors of `node`, nearest first.
pub fn ancestors<T: SyntaxTree + ?Sized>(
    tree: &T,
    node: T::Node,
) -> impl Iterator<Item = T::Node> + '_ {
    std::iter::successors(tree.parent(node), move |&n| tree.parent(n))
}

/// Number of [`SyntaxKind::Argument`] children of an argument list.
pub fn argument_count<T: SyntaxTree + ?Sized>(tree: &T, argument_list: T::Node) -> usize {
    tree.children(argument_list)
        .into_iter()
        .filter(|&c| tree.kind(c) == SyntaxKind::Argument)
        .count()
}

/// Builds a [`TextRange`] from byte offsets.
///
/// Offsets past `u32::MAX` saturate; such documents are far beyond what the
/// parser accepts anyway.
#[must_use]
pub fn text_range(start: usize, end: usize) -> TextRange {
    let clamp = |offset: usize| TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX));
    TextRange::new(clamp(start), clamp(end.max(start)))
}
