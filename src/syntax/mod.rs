//! In-memory document trees.
//!
//! A parser collaborator builds a [`DocumentTree`] from markup; the checker
//! reads it through [`DocumentSource`](crate::hir::DocumentSource). Only the
//! node kinds the checker cares about are modelled. Everything else can be
//! represented as [`NodeKind::Text`] or omitted.

mod tree;

pub use tree::{Descendants, DocumentTree, NodeKind, SyntaxNode};
