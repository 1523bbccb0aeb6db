//! Resolution core.
//!
//! ```text
//! DocumentSource ──► nodes (extraction)
//!                      │ definitions          │ references
//!                      ▼                      ▼
//!                   index ───────────────► resolve
//!                                            │
//!                                            ▼
//!                                       diagnostics
//! ```
//!
//! The role tables in [`roles`] are the only place role compatibility is
//! decided.

pub mod diagnostics;
pub mod index;
pub mod nodes;
pub mod resolve;
pub mod roles;

pub use diagnostics::{DocumentGroup, Finding, FindingCollector, FindingKind, Report, Subject};
pub use index::{DefKey, DefinitionIndex};
pub use nodes::{
    BlockId, DocumentSource, Entity, Extracted, RawDefinition, RawReference, Reference,
};
pub use resolve::{Resolution, ResolvedReference, Resolver};
pub use roles::{Role, RoleFamily, RoleTable};
