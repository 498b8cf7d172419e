//! Centralized Rule IDs and categories.

/// Simplification: `GetType().Name` on a sealed type can be `nameof(Type)`
pub const RULE_ID_GETTYPE_TO_NAMEOF: &str = "GetTypeToNameOf";

/// Category of rules that replace an expression with a simpler equivalent.
pub const CAT_SIMPLIFICATION: &str = "Simplification";

/// Key of the `Finding::properties` entry holding the proposed replacement.
pub const PROPERTY_PREFER: &str = "prefer";
