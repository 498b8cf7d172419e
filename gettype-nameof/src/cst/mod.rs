//! CST (Concrete Syntax Tree) front end for C# sources.
//!
//! Tree-sitter parses each document into an arena [`CstTree`] with exact
//! byte ranges and parent links. [`SemanticModel`] is then built over all
//! trees of a run and answers the declaration questions the rules ask.
//!
//! # Design Principles
//!
//! - **Byte-range anchored**: findings and fixes use byte offsets into the
//!   original text, never structural matching
//! - **Declarations only**: the model records types, modifiers, members and
//!   base links; expressions are never typed

mod model;
mod parser;

pub use model::{DocumentId, DocumentSemantics, SemanticModel};
pub use parser::{CstError, CstNode, CstParser, CstTree, NodeId, Point};
