//! # linklint
//!
//! Cross-reference checker for structured-text documentation.
//!
//! Documents define objects (`.. class:: Widget`) and refer to them
//! (`:class:`Widget``). linklint indexes every definition by
//! `(role family, name)`, resolves every reference against that index and
//! reports what does not resolve cleanly: unresolved, ambiguous and
//! role-mismatched references, duplicate definitions, unknown roles and
//! malformed references.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! check   → Two-pass checking runs (Checker, Analysis)
//!   ↓
//! syntax  → In-memory document trees handed over by a parser
//!   ↓
//! hir     → Roles, definition index, resolver, findings
//!   ↓
//! base    → Primitives (DocId, Location)
//! ```
//!
//! ## Usage
//!
//! ```
//! use linklint::base::DocId;
//! use linklint::syntax::{DocumentTree, SyntaxNode};
//! use linklint::hir::FindingKind;
//!
//! let tree = DocumentTree::new(
//!     DocId::new(0),
//!     vec![
//!         SyntaxNode::definition("class", "MyClass", 1, vec![]),
//!         SyntaxNode::paragraph(4, vec![SyntaxNode::reference("class", "Unknown", 4)]),
//!     ],
//! );
//!
//! let report = linklint::check(&[tree]).unwrap().into_report();
//! assert_eq!(report.count(FindingKind::Unresolved), 1);
//! ```

/// Foundation types: DocId, Location
pub mod base;

/// Resolution core: roles, index, resolver, diagnostics
pub mod hir;

/// Document trees produced by a parser
pub mod syntax;

pub mod check;
pub mod config;
pub mod error;

pub use check::{Analysis, Checker, check};
pub use config::{CheckerConfig, Checks};
pub use error::{ConfigError, ContractViolation, Error, Result};
pub use hir::{Finding, FindingKind, Report, Resolution, Role, RoleFamily, RoleTable};
