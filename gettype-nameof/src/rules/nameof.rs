//! `GetType().Name` on a sealed type can be replaced with `nameof(Type)`.
//!
//! `this.GetType().Name` reads the runtime type, which for a sealed,
//! non-generic type is always the declaring type itself. The rewrite is
//! only proposed when nothing in the type's inheritance chain declares its
//! own `GetType` method, since such a method would change what the call
//! returns.

use super::ids::{CAT_SIMPLIFICATION, PROPERTY_PREFER, RULE_ID_GETTYPE_TO_NAMEOF};
use super::{Context, Finding, Rule, RuleMetadata};
use crate::config::ExternalBasePolicy;
use crate::cst::{CstTree, DocumentSemantics, NodeId};
use crate::semantic::{BaseType, SymbolResolver, TypeId};
use crate::syntax::{ancestors, argument_count, Role, SyntaxKind, SyntaxTree};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

const GET_TYPE: &str = "GetType";
const NAME: &str = "Name";

/// Metadata of [`GetTypeNameDetector`].
pub const METADATA: RuleMetadata = RuleMetadata {
    id: RULE_ID_GETTYPE_TO_NAMEOF,
    category: CAT_SIMPLIFICATION,
    title: "Use nameof instead of GetType().Name",
    message_format: "'{0}' can be replaced with '{1}'",
    severity: "warning",
    description: "On a sealed, non-generic type GetType().Name always yields the \
                  declaring type's name; nameof(Type) states that at compile time \
                  and follows renames.",
};

/// Tunables for [`GetTypeNameDetector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectorOptions {
    /// Treatment of base types outside the analyzed sources.
    pub external_bases: ExternalBasePolicy,
}

/// Finds `GetType().Name` and `this.GetType().Name` that can become `nameof`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTypeNameDetector {
    options: DetectorOptions,
}

impl GetTypeNameDetector {
    /// Creates a detector.
    #[must_use]
    pub const fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    /// Evaluates one node. Returns a finding only when the rewrite is safe.
    pub fn evaluate<T, R>(
        &self,
        tree: &T,
        resolver: &R,
        node: T::Node,
        context: &Context,
    ) -> Option<Finding>
    where
        T: SyntaxTree + ?Sized,
        R: SymbolResolver<T::Node> + ?Sized,
    {
        let anchor = match_get_type_name(tree, node)?;

        let Some(declaration) =
            ancestors(tree, anchor).find(|&n| tree.kind(n).is_type_declaration())
        else {
            tracing::trace!(?node, "no enclosing class, record or struct");
            return None;
        };
        let Some(id) = resolver.declared_type(declaration) else {
            tracing::trace!(?declaration, "declaration has no symbol");
            return None;
        };
        let symbol = resolver.type_symbol(id)?;
        if symbol.is_generic {
            tracing::trace!(ty = %symbol.qualified_name, "generic type");
            return None;
        }
        if !symbol.is_sealed {
            tracing::trace!(ty = %symbol.qualified_name, "type is not sealed");
            return None;
        }
        if self.chain_declares_get_type::<T::Node, R>(resolver, id) {
            tracing::trace!(ty = %symbol.qualified_name, "GetType may be shadowed");
            return None;
        }

        let range = tree.range(node);
        let original = tree.text(node).to_owned();
        let replacement = format!("nameof({})", symbol.name);
        let start = range.start();

        Some(Finding {
            rule_id: METADATA.id.to_owned(),
            category: METADATA.category.to_owned(),
            severity: METADATA.severity.to_owned(),
            message: format!("'{original}' can be replaced with '{replacement}'"),
            file: context.filename.clone(),
            line: context.line_index.line_index(start),
            col: context.line_index.column_index(start),
            start_byte: start.to_usize(),
            end_byte: range.end().to_usize(),
            properties: BTreeMap::from([(PROPERTY_PREFER.to_owned(), replacement.clone())]),
            original,
            replacement,
        })
    }

    /// Walks the type and its bases; true when any of them declares a
    /// `GetType` method, or when the chain cannot be followed safely.
    fn chain_declares_get_type<N, R>(&self, resolver: &R, start: TypeId) -> bool
    where
        R: SymbolResolver<N> + ?Sized,
    {
        let mut visited = FxHashSet::default();
        let mut current = Some(start);
        while let Some(id) = current {
            if !visited.insert(id) {
                tracing::trace!(?id, "inheritance cycle");
                return true;
            }
            let Some(symbol) = resolver.type_symbol(id) else {
                return true;
            };
            if symbol.declares_method(GET_TYPE) {
                return true;
            }
            current = match &symbol.base_type {
                BaseType::None => None,
                BaseType::Source(base) => Some(*base),
                BaseType::External(name) => match self.options.external_bases {
                    ExternalBasePolicy::Trust => None,
                    ExternalBasePolicy::Reject => {
                        tracing::trace!(base = %name, "external base rejected");
                        return true;
                    }
                },
            };
        }
        false
    }
}

/// Matches `GetType().Name` / `this.GetType().Name` and returns the anchor
/// node from which the enclosing type is searched.
fn match_get_type_name<T: SyntaxTree + ?Sized>(tree: &T, node: T::Node) -> Option<T::Node> {
    if tree.kind(node) != SyntaxKind::MemberAccess {
        return None;
    }
    let member = tree.child(node, Role::Member)?;
    if tree.kind(member) != SyntaxKind::Identifier || tree.text(member) != NAME {
        return None;
    }
    let receiver = tree.child(node, Role::Receiver)?;
    if tree.kind(receiver) != SyntaxKind::Invocation {
        return None;
    }
    let arguments = tree.child(receiver, Role::Arguments)?;
    if argument_count(tree, arguments) != 0 {
        return None;
    }
    let callee = tree.child(receiver, Role::Callee)?;
    match tree.kind(callee) {
        SyntaxKind::Identifier if tree.text(callee) == GET_TYPE => Some(callee),
        SyntaxKind::MemberAccess => {
            let name = tree.child(callee, Role::Member)?;
            if tree.kind(name) != SyntaxKind::Identifier || tree.text(name) != GET_TYPE {
                return None;
            }
            let target = tree.child(callee, Role::Receiver)?;
            (tree.kind(target) == SyntaxKind::This).then_some(target)
        }
        _ => None,
    }
}

impl Rule for GetTypeNameDetector {
    fn name(&self) -> &'static str {
        "GetTypeNameDetector"
    }

    fn metadata(&self) -> RuleMetadata {
        METADATA
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::MemberAccess]
    }

    fn visit_node(
        &self,
        tree: &CstTree,
        semantics: &DocumentSemantics<'_>,
        node: NodeId,
        context: &Context,
    ) -> Option<Vec<Finding>> {
        self.evaluate(tree, semantics, node, context).map(|f| vec![f])
    }
}
