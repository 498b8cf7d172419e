//! Declaration-level symbol information.
//!
//! A [`SymbolResolver`] answers two questions: which type does a declaration
//! node declare, and what do we know about that type. The concrete resolver
//! for C# sources is [`crate::cst::SemanticModel`].

use compact_str::CompactString;
use smallvec::SmallVec;

/// Opaque handle to a [`TypeSymbol`] owned by a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// What sort of type a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `record` / `record class`
    Record,
    /// `struct`
    Struct,
    /// `record struct`
    RecordStruct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
}

impl TypeKind {
    /// Value types can never be derived from.
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct | Self::Enum)
    }
}

/// Kinds of members a type can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Methods, including operators and local overloads.
    Method,
    /// Properties and indexers.
    Property,
    /// Fields, constants and events.
    Field,
    /// Nested type declarations.
    NestedType,
}

/// A single declared member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSymbol {
    /// Member name as written (explicit interface implementations are
    /// qualified, e.g. `IFoo.GetType`).
    pub name: CompactString,
    /// Member kind.
    pub kind: MemberKind,
}

impl MemberSymbol {
    /// Creates a method member.
    pub fn method(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
        }
    }
}

/// Base type link of a [`TypeSymbol`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    /// No base type other than the implicit root object.
    None,
    /// A base declared in the analyzed sources.
    Source(TypeId),
    /// A base that is not declared in the analyzed sources.
    External(CompactString),
}

/// Resolved declaration of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    /// Simple name, without namespace, containing types or type parameters.
    pub name: CompactString,
    /// Dotted name including namespace and containing types.
    pub qualified_name: CompactString,
    /// Declaration kind.
    pub kind: TypeKind,
    /// Whether the type cannot be derived from.
    pub is_sealed: bool,
    /// Whether the type or any containing type has type parameters.
    pub is_generic: bool,
    /// Members declared directly on this type (all partial parts merged).
    pub members: SmallVec<[MemberSymbol; 8]>,
    /// Base class link.
    pub base_type: BaseType,
}

impl TypeSymbol {
    /// Whether this type itself declares a method named `name`.
    #[must_use]
    pub fn declares_method(&self, name: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.kind == MemberKind::Method && m.name.as_str() == name)
    }
}

/// The semantic capability the rules need.
pub trait SymbolResolver<N> {
    /// Type declared by the declaration node `declaration`.
    fn declared_type(&self, declaration: N) -> Option<TypeId>;
    /// Symbol data for `id`.
    fn type_symbol(&self, id: TypeId) -> Option<&TypeSymbol>;
}
