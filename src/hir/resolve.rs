//! Name resolution: matching references against the definition index.
//!
//! Resolution is exact-match on `(family_of(declared role), target)`:
//!
//! 1. The declared role picks the family bucket. Other families are never
//!    consulted, so a function and a module with the same name cannot be
//!    confused.
//! 2. An empty bucket is [`Resolution::Unresolved`].
//! 3. A single entity is [`Resolution::Resolved`] if the [`RoleTable`]
//!    accepts its role, otherwise [`Resolution::RoleMismatch`].
//! 4. More than one entity is always [`Resolution::Ambiguous`]. There is no
//!    first-seen-wins: picking one would hide the duplicate definition.

use super::diagnostics::{Finding, FindingKind, Subject};
use super::index::DefinitionIndex;
use super::nodes::{Entity, Reference};
use super::roles::{Role, RoleTable};

/// The outcome of resolving one reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one compatible definition.
    Resolved(Entity),
    /// No definition under the reference's key.
    Unresolved,
    /// Every definition under the reference's key, in document order.
    Ambiguous(Vec<Entity>),
    /// One definition, but its role is not acceptable for the declared role.
    RoleMismatch { expected: Role, found: Entity },
}

impl Resolution {
    /// Check if the reference resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Get the resolved entity, if any.
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Resolution::Resolved(entity) => Some(entity),
            _ => None,
        }
    }

    /// The finding kind this outcome reports as, or `None` when resolved.
    pub fn finding_kind(&self) -> Option<FindingKind> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Unresolved => Some(FindingKind::Unresolved),
            Resolution::Ambiguous(_) => Some(FindingKind::Ambiguous),
            Resolution::RoleMismatch { .. } => Some(FindingKind::RoleMismatch),
        }
    }

    /// Turn a failed outcome into a finding for `reference`.
    pub fn to_finding(&self, reference: &Reference) -> Option<Finding> {
        let kind = self.finding_kind()?;
        let finding = Finding::new(
            kind,
            Subject::Reference,
            reference.site,
            reference.tag.clone(),
            reference.target.clone(),
        )
        .with_expected(reference.role);

        Some(match self {
            Resolution::Ambiguous(candidates) => finding.with_candidates(candidates.iter().cloned()),
            Resolution::RoleMismatch { found, .. } => finding.with_candidates([found.clone()]),
            _ => finding,
        })
    }
}

/// A reference together with its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReference {
    pub reference: Reference,
    pub resolution: Resolution,
}

/// Query-time resolution against a finished index.
///
/// A pure function of `(Reference, DefinitionIndex)`: the resolver holds
/// only shared borrows and can be used from several threads at once.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    index: &'a DefinitionIndex,
    roles: &'a RoleTable,
}

impl<'a> Resolver<'a> {
    /// Create a new resolver.
    pub fn new(index: &'a DefinitionIndex, roles: &'a RoleTable) -> Self {
        Self { index, roles }
    }

    /// Resolve a single reference.
    pub fn resolve(&self, reference: &Reference) -> Resolution {
        let declared = reference.role;
        let candidates = self.index.lookup(declared.family(), &reference.target);

        let resolution = match candidates {
            [] => Resolution::Unresolved,
            [entity] if self.roles.accepts(declared, entity.role) => {
                Resolution::Resolved(entity.clone())
            }
            [entity] => Resolution::RoleMismatch {
                expected: declared,
                found: entity.clone(),
            },
            _ => Resolution::Ambiguous(candidates.to_vec()),
        };

        tracing::trace!(
            site = %reference.site,
            role = %declared,
            name = %reference.target,
            outcome = ?resolution.finding_kind(),
            "resolve reference"
        );
        resolution
    }

    /// Resolve references in order, pairing each with its outcome.
    pub fn resolve_all<I>(&self, references: I) -> Vec<ResolvedReference>
    where
        I: IntoIterator<Item = Reference>,
    {
        references
            .into_iter()
            .map(|reference| {
                let resolution = self.resolve(&reference);
                ResolvedReference {
                    reference,
                    resolution,
                }
            })
            .collect()
    }
}
