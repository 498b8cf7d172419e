//! Declaration-level semantic model built from parsed C# documents.
//!
//! The model knows every class, record, struct, interface and enum declared
//! in the analyzed sources: modifiers, type parameters, member names and the
//! base class link. That is all the rules need; expressions are never typed.

use super::parser::{CstTree, NodeId};
use crate::semantic::{
    BaseType, MemberKind, MemberSymbol, SymbolResolver, TypeId, TypeKind, TypeSymbol,
};
use crate::syntax::{ancestors, Role, SyntaxKind, SyntaxTree};
use compact_str::{format_compact, CompactString};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Index of a document inside an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

/// A type declaration as written in one document.
#[derive(Debug)]
struct RawDeclaration {
    document: DocumentId,
    node: NodeId,
    name: CompactString,
    namespace: CompactString,
    qualified_name: CompactString,
    /// `qualified_name` with a `` `N `` suffix on every generic part.
    metadata_name: CompactString,
    arity: usize,
    kind: TypeKind,
    is_sealed: bool,
    is_partial: bool,
    is_generic: bool,
    members: SmallVec<[MemberSymbol; 8]>,
    base_names: SmallVec<[TypeRef; 2]>,
}

/// A type as written in a base list: rightmost name and type argument count.
type TypeRef = (CompactString, usize);

/// Symbols for every type declared across a set of documents.
#[derive(Debug, Default)]
pub struct SemanticModel {
    types: Vec<TypeSymbol>,
    namespaces: Vec<CompactString>,
    arities: Vec<usize>,
    declarations: FxHashMap<(DocumentId, NodeId), TypeId>,
    by_qualified_name: FxHashMap<CompactString, TypeId>,
}

impl SemanticModel {
    /// Builds the model from every document of an analysis run.
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (DocumentId, &'a CstTree)>,
    {
        let mut model = Self::default();
        let mut base_names: Vec<SmallVec<[TypeRef; 2]>> = Vec::new();
        let mut partial: Vec<bool> = Vec::new();

        for (document, tree) in documents {
            for decl in collect_declarations(document, tree) {
                let existing = model
                    .by_qualified_name
                    .get(&decl.metadata_name)
                    .copied()
                    .filter(|id| decl.is_partial && partial[id.0 as usize]);
                if let Some(id) = existing {
                    let symbol = &mut model.types[id.0 as usize];
                    symbol.is_sealed |= decl.is_sealed;
                    symbol.is_generic |= decl.is_generic;
                    symbol.members.extend(decl.members);
                    base_names[id.0 as usize].extend(decl.base_names);
                    model.declarations.insert((decl.document, decl.node), id);
                    continue;
                }

                let id = TypeId(u32::try_from(model.types.len()).unwrap_or(u32::MAX));
                model.types.push(TypeSymbol {
                    name: decl.name,
                    qualified_name: decl.qualified_name,
                    kind: decl.kind,
                    is_sealed: decl.is_sealed,
                    is_generic: decl.is_generic,
                    members: decl.members,
                    base_type: BaseType::None,
                });
                model.namespaces.push(decl.namespace);
                model.arities.push(decl.arity);
                base_names.push(decl.base_names);
                partial.push(decl.is_partial);
                model.declarations.insert((decl.document, decl.node), id);
                model
                    .by_qualified_name
                    .entry(decl.metadata_name)
                    .or_insert(id);
            }
        }

        model.resolve_bases(&base_names);
        tracing::debug!(types = model.types.len(), "semantic model built");
        model
    }

    /// Resolver view scoped to one document.
    #[must_use]
    pub fn for_document(&self, document: DocumentId) -> DocumentSemantics<'_> {
        DocumentSemantics {
            model: self,
            document,
        }
    }

    /// All type symbols, indexed by [`TypeId`].
    #[must_use]
    pub fn types(&self) -> &[TypeSymbol] {
        &self.types
    }

    /// Looks a type up by its dotted metadata name (`App.Box`1.Item`).
    #[must_use]
    pub fn lookup(&self, qualified_name: &str) -> Option<TypeId> {
        self.by_qualified_name.get(qualified_name).copied()
    }

    /// Only the first base-list entry can name a class; later entries are interfaces.
    ///
    /// Candidates must match both the simple name and the number of type
    /// parameters: `Base<int>` never resolves to a non-generic `Base`.
    fn resolve_bases(&mut self, base_names: &[SmallVec<[TypeRef; 2]>]) {
        let mut by_simple_name: FxHashMap<(&str, usize), Vec<TypeId>> = FxHashMap::default();
        for (i, symbol) in self.types.iter().enumerate() {
            by_simple_name
                .entry((symbol.name.as_str(), self.arities[i]))
                .or_default()
                .push(TypeId(u32::try_from(i).unwrap_or(u32::MAX)));
        }

        let mut resolved = Vec::with_capacity(self.types.len());
        for (i, symbol) in self.types.iter().enumerate() {
            let Some((first, arity)) = base_names[i].first() else {
                resolved.push(BaseType::None);
                continue;
            };
            if !matches!(symbol.kind, TypeKind::Class | TypeKind::Record) {
                resolved.push(BaseType::None);
                continue;
            }
            let namespace = &self.namespaces[i];
            let candidates = by_simple_name
                .get(&(first.as_str(), *arity))
                .map_or(&[][..], Vec::as_slice);
            let best = candidates
                .iter()
                .copied()
                .find(|id| &self.namespaces[id.0 as usize] == namespace)
                .or_else(|| candidates.first().copied());
            let base = match best {
                Some(id) if self.types[id.0 as usize].kind == TypeKind::Interface => BaseType::None,
                Some(id) => BaseType::Source(id),
                None if looks_like_interface(first) => BaseType::None,
                None => BaseType::External(first.clone()),
            };
            resolved.push(base);
        }

        drop(by_simple_name);
        for (symbol, base) in self.types.iter_mut().zip(resolved) {
            symbol.base_type = base;
        }
    }
}

/// `IDisposable`, `IEquatable<T>`: the interface naming convention.
fn looks_like_interface(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase)
}

/// [`SymbolResolver`] over one document of a [`SemanticModel`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentSemantics<'a> {
    model: &'a SemanticModel,
    document: DocumentId,
}

impl SymbolResolver<NodeId> for DocumentSemantics<'_> {
    fn declared_type(&self, declaration: NodeId) -> Option<TypeId> {
        self.model
            .declarations
            .get(&(self.document, declaration))
            .copied()
    }

    fn type_symbol(&self, id: TypeId) -> Option<&TypeSymbol> {
        self.model.types.get(id.0 as usize)
    }
}

fn type_kind(tree: &CstTree, node: NodeId) -> Option<TypeKind> {
    match tree.kind(node) {
        SyntaxKind::ClassDeclaration => Some(TypeKind::Class),
        SyntaxKind::StructDeclaration => Some(TypeKind::Struct),
        SyntaxKind::RecordDeclaration
            if tree.node(node).raw_kind == "record_struct_declaration"
                || tree.has_token(node, "struct") =>
        {
            Some(TypeKind::RecordStruct)
        }
        SyntaxKind::RecordDeclaration => Some(TypeKind::Record),
        SyntaxKind::InterfaceDeclaration => Some(TypeKind::Interface),
        SyntaxKind::EnumDeclaration => Some(TypeKind::Enum),
        _ => None,
    }
}

fn type_parameter_count(tree: &CstTree, node: NodeId) -> usize {
    tree.named_children(node)
        .filter(|&c| tree.node(c).raw_kind == "type_parameter_list")
        .flat_map(|list| tree.named_children(list))
        .filter(|&p| tree.node(p).raw_kind == "type_parameter")
        .count()
}

/// `Base<int, string>` has two type arguments, so does the unbound `Base<,>`.
fn type_argument_count(tree: &CstTree, generic_name: NodeId) -> usize {
    let Some(list) = tree
        .named_children(generic_name)
        .find(|&c| tree.node(c).raw_kind == "type_argument_list")
    else {
        return 0;
    };
    match tree.named_children(list).count() {
        0 => {
            let children = tree.children(list);
            children.iter().filter(|&&c| tree.node(c).raw_kind == ",").count() + 1
        }
        n => n,
    }
}

fn with_arity(name: &str, arity: usize) -> CompactString {
    if arity == 0 {
        CompactString::from(name)
    } else {
        format_compact!("{name}`{arity}")
    }
}

fn declared_name(tree: &CstTree, node: NodeId) -> Option<CompactString> {
    tree.child(node, Role::Name)
        .map(|n| CompactString::from(tree.text(n)))
}

fn collect_declarations(document: DocumentId, tree: &CstTree) -> Vec<RawDeclaration> {
    let file_scoped: Option<(usize, CompactString)> = tree
        .named_children(tree.root())
        .find(|&c| tree.node(c).raw_kind == "file_scoped_namespace_declaration")
        .and_then(|ns| {
            let name = tree.field_child(ns, "name")?;
            Some((tree.node(ns).start_byte, CompactString::from(tree.text(name))))
        });

    let mut out = Vec::new();
    for node in tree.node_ids() {
        let Some(kind) = type_kind(tree, node) else {
            continue;
        };
        let Some(name) = declared_name(tree, node) else {
            continue;
        };

        let mut namespace_parts: Vec<CompactString> = Vec::new();
        let mut containing: Vec<CompactString> = Vec::new();
        let mut containing_metadata: Vec<CompactString> = Vec::new();
        let mut containing_generic = false;
        let mut inside_file_scoped = false;
        for ancestor in ancestors(tree, node) {
            match tree.kind(ancestor) {
                SyntaxKind::NamespaceDeclaration => {
                    if tree.node(ancestor).raw_kind == "file_scoped_namespace_declaration" {
                        inside_file_scoped = true;
                    }
                    if let Some(n) = tree.field_child(ancestor, "name") {
                        namespace_parts.push(tree.text(n).into());
                    }
                }
                k if k.is_type_declaration() || k == SyntaxKind::InterfaceDeclaration => {
                    let outer_arity = type_parameter_count(tree, ancestor);
                    containing_generic |= outer_arity > 0;
                    if let Some(n) = declared_name(tree, ancestor) {
                        containing_metadata.push(with_arity(&n, outer_arity));
                        containing.push(n);
                    }
                }
                _ => {}
            }
        }
        if !inside_file_scoped {
            if let Some((start, ns)) = &file_scoped {
                if *start <= tree.node(node).start_byte {
                    namespace_parts.push(ns.clone());
                }
            }
        }
        namespace_parts.reverse();
        containing.reverse();
        containing_metadata.reverse();
        let arity = type_parameter_count(tree, node);

        let namespace = CompactString::from(namespace_parts.join("."));
        let qualified_name = dotted(&namespace, containing.iter().chain([&name]));
        let own_metadata = with_arity(&name, arity);
        let metadata_name = dotted(&namespace, containing_metadata.iter().chain([&own_metadata]));

        let modifiers: SmallVec<[&str; 4]> = tree.modifiers(node).collect();
        let is_sealed = kind.is_value_type()
            || modifiers.iter().any(|&m| m == "sealed" || m == "static");

        out.push(RawDeclaration {
            document,
            node,
            name,
            namespace,
            qualified_name,
            metadata_name,
            arity,
            kind,
            is_sealed,
            is_partial: modifiers.contains(&"partial"),
            is_generic: containing_generic || arity > 0,
            members: collect_members(tree, node),
            base_names: collect_base_names(tree, node),
        });
    }
    out
}

fn dotted<'p>(
    namespace: &str,
    parts: impl Iterator<Item = &'p CompactString>,
) -> CompactString {
    let mut out = CompactString::from(namespace);
    for part in parts {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(part);
    }
    out
}

fn collect_members(tree: &CstTree, declaration: NodeId) -> SmallVec<[MemberSymbol; 8]> {
    let body = tree
        .field_child(declaration, "body")
        .or_else(|| {
            tree.named_children(declaration)
                .find(|&c| tree.node(c).raw_kind == "declaration_list")
        });
    let Some(body) = body else {
        return SmallVec::new();
    };

    let mut members = SmallVec::new();
    for member in tree.named_children(body) {
        let kind = match tree.node(member).raw_kind {
            "method_declaration" => MemberKind::Method,
            "property_declaration" | "indexer_declaration" => MemberKind::Property,
            "field_declaration" | "event_field_declaration" | "event_declaration" => {
                MemberKind::Field
            }
            _ if type_kind(tree, member).is_some() => MemberKind::NestedType,
            _ => continue,
        };
        let Some(name) = declared_name(tree, member) else {
            continue;
        };
        let explicit = tree
            .named_children(member)
            .find(|&c| tree.node(c).raw_kind == "explicit_interface_specifier");
        let name = match explicit {
            Some(spec) => {
                let interface = tree.text(spec).trim_end_matches('.').trim();
                format_compact!("{interface}.{name}")
            }
            None => name,
        };
        members.push(MemberSymbol { name, kind });
    }
    members
}

fn collect_base_names(tree: &CstTree, declaration: NodeId) -> SmallVec<[TypeRef; 2]> {
    tree.named_children(declaration)
        .filter(|&c| tree.node(c).raw_kind == "base_list")
        .flat_map(|list| tree.named_children(list))
        .filter_map(|entry| simple_type_name(tree, entry, 0))
        .collect()
}

/// Rightmost identifier of a type reference and its type argument count:
/// `A.B.Base<int>` is `(Base, 1)`.
fn simple_type_name(tree: &CstTree, node: NodeId, depth: usize) -> Option<TypeRef> {
    if depth > 8 {
        return None;
    }
    let n = tree.node(node);
    match n.raw_kind {
        "identifier" => Some((tree.text(node).into(), 0)),
        "generic_name" => tree
            .named_children(node)
            .find(|&c| tree.kind(c) == SyntaxKind::Identifier)
            .map(|c| (tree.text(c).into(), type_argument_count(tree, node))),
        "qualified_name" | "alias_qualified_name" => tree
            .field_child(node, "name")
            .or_else(|| tree.named_children(node).last())
            .and_then(|c| simple_type_name(tree, c, depth + 1)),
        "primary_constructor_base_type" => tree
            .named_children(node)
            .next()
            .and_then(|c| simple_type_name(tree, c, depth + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::CstParser;

    fn model_for(source: &str) -> (CstTree, SemanticModel) {
        let tree = CstParser::new().unwrap().parse(source).unwrap();
        let model = SemanticModel::build([(DocumentId(0), &tree)]);
        (tree, model)
    }

    fn symbol<'m>(model: &'m SemanticModel, name: &str) -> &'m TypeSymbol {
        let id = model.lookup(name).unwrap();
        &model.types()[id.0 as usize]
    }

    #[test]
    fn test_sealed_and_generic_flags() {
        let (_, model) = model_for(
            "namespace App { sealed class A { } class B { } sealed class C<T> { } struct S { } }",
        );

        assert!(symbol(&model, "App.A").is_sealed);
        assert!(!symbol(&model, "App.B").is_sealed);
        assert!(symbol(&model, "App.C`1").is_generic);
        assert!(symbol(&model, "App.S").is_sealed);
        assert_eq!(symbol(&model, "App.S").kind, TypeKind::Struct);
    }

    #[test]
    fn test_nested_type_inherits_outer_generic() {
        let (_, model) = model_for("class Outer<T> { sealed class Inner { } }");

        let inner = symbol(&model, "Outer`1.Inner");
        assert!(inner.is_sealed);
        assert!(inner.is_generic);
    }

    #[test]
    fn test_methods_collected() {
        let (_, model) = model_for(
            "sealed class A { public int GetType() => 1; string Name { get; } int field; }",
        );

        let a = symbol(&model, "A");
        assert!(a.declares_method("GetType"));
        assert!(!a.declares_method("Name"));
    }

    #[test]
    fn test_base_resolution() {
        let (_, model) = model_for(
            "class Base { } sealed class Derived : Base, IDisposable { } \
             sealed class Ext : Exception { } sealed class OnlyIface : IComparable { }",
        );

        let base = model.lookup("Base").unwrap();
        assert_eq!(symbol(&model, "Derived").base_type, BaseType::Source(base));
        assert_eq!(
            symbol(&model, "Ext").base_type,
            BaseType::External("Exception".into())
        );
        assert_eq!(symbol(&model, "OnlyIface").base_type, BaseType::None);
    }

    #[test]
    fn test_partial_parts_merge() {
        let (_, model) = model_for(
            "sealed partial class P { } partial class P { void GetType(int x) { } }",
        );

        assert_eq!(model.types().len(), 1);
        let p = symbol(&model, "P");
        assert!(p.is_sealed);
        assert!(p.declares_method("GetType"));
    }

    #[test]
    fn test_base_resolution_matches_arity() {
        let (_, model) = model_for(
            "class Base { } class Base<T> { } class Pair<K, V> { } \
             sealed class OfGeneric : Base<int> { } sealed class OfPlain : Base { } \
             sealed class OfPair : Pair<int, string> { } sealed class OfUnbound : Pair<,> { }",
        );

        let plain = model.lookup("Base").unwrap();
        let generic = model.lookup("Base`1").unwrap();
        let pair = model.lookup("Pair`2").unwrap();
        assert_ne!(plain, generic);
        assert_eq!(symbol(&model, "OfGeneric").base_type, BaseType::Source(generic));
        assert_eq!(symbol(&model, "OfPlain").base_type, BaseType::Source(plain));
        assert_eq!(symbol(&model, "OfPair").base_type, BaseType::Source(pair));
        assert_eq!(symbol(&model, "OfUnbound").base_type, BaseType::Source(pair));
    }

    #[test]
    fn test_partial_parts_with_different_arity_stay_apart() {
        let (_, model) = model_for(
            "partial class P<T> { public new string GetType() => \"\"; } \
             sealed partial class P { }",
        );

        assert_eq!(model.types().len(), 2);
        let generic = symbol(&model, "P`1");
        assert!(generic.is_generic);
        assert!(!generic.is_sealed);
        let plain = symbol(&model, "P");
        assert!(plain.is_sealed);
        assert!(!plain.is_generic);
        assert!(!plain.declares_method("GetType"));
    }

    #[test]
    fn test_explicit_interface_get_type_is_qualified() {
        let (_, model) = model_for(
            "interface IFoo { Type GetType(); } \
             sealed class A : IFoo { Type IFoo.GetType() => null; }",
        );

        let a = symbol(&model, "A");
        assert!(!a.declares_method("GetType"));
        assert!(a.declares_method("IFoo.GetType"));
        assert_eq!(a.base_type, BaseType::None);
    }

    #[test]
    fn test_declared_type_per_document() {
        let (tree, model) = model_for("sealed class A { }");

        let class = tree.find_by_kind(SyntaxKind::ClassDeclaration)[0];
        let resolver = model.for_document(DocumentId(0));
        assert!(resolver.declared_type(class).is_some());
        assert!(model.for_document(DocumentId(1)).declared_type(class).is_none());
    }
}
