//! Diagnostics: findings and the per-document report.
//!
//! Everything the checker notices about document content is a [`Finding`].
//! Findings are collected in any order and sorted into a [`Report`] whose
//! layout depends only on the findings themselves, never on traversal or
//! hash order, so equal inputs always give identical reports.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use crate::base::{DocId, Location};
use super::nodes::Entity;
use super::roles::Role;

// ============================================================================
// FINDING TYPES
// ============================================================================

/// What kind of problem a finding describes.
///
/// Declaration order is the report order for findings on the same line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FindingKind {
    /// A node declares a role outside the role enumeration.
    UnknownRole,
    /// A definition node without a usable name.
    MalformedDefinition,
    /// A reference without a usable target.
    MalformedReference,
    /// No definition under the reference's key.
    Unresolved,
    /// More than one definition under the reference's key.
    Ambiguous,
    /// Exactly one definition, but of an incompatible role.
    RoleMismatch,
    /// A key defined more than once.
    DuplicateDefinition,
    /// A reference inside the definition it points to.
    SelfLink,
    /// The same reference repeated within one paragraph.
    DuplicateInParagraph,
}

impl FindingKind {
    /// Stable code for the finding kind.
    pub const fn code(self) -> &'static str {
        match self {
            FindingKind::UnknownRole => codes::UNKNOWN_ROLE,
            FindingKind::MalformedDefinition => codes::MALFORMED_DEFINITION,
            FindingKind::MalformedReference => codes::MALFORMED_REFERENCE,
            FindingKind::Unresolved => codes::UNRESOLVED,
            FindingKind::Ambiguous => codes::AMBIGUOUS,
            FindingKind::RoleMismatch => codes::ROLE_MISMATCH,
            FindingKind::DuplicateDefinition => codes::DUPLICATE_DEFINITION,
            FindingKind::SelfLink => codes::SELF_LINK,
            FindingKind::DuplicateInParagraph => codes::DUPLICATE_IN_PARAGRAPH,
        }
    }
}

/// Codes for each finding kind.
pub mod codes {
    pub const UNRESOLVED: &str = "L0001";
    pub const AMBIGUOUS: &str = "L0002";
    pub const ROLE_MISMATCH: &str = "L0003";
    pub const DUPLICATE_DEFINITION: &str = "L0004";
    pub const MALFORMED_REFERENCE: &str = "L0005";
    pub const UNKNOWN_ROLE: &str = "L0006";
    pub const MALFORMED_DEFINITION: &str = "L0007";

    pub const SELF_LINK: &str = "L0101";
    pub const DUPLICATE_IN_PARAGRAPH: &str = "L0102";
}

/// Which kind of node a finding was raised for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    Definition,
    Reference,
}

/// A single reportable problem.
///
/// Field order is the sort order within a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Finding {
    pub location: Location,
    pub kind: FindingKind,
    pub subject: Subject,
    /// Role tag of a reference, or object type of a definition, as written.
    pub tag: SmolStr,
    pub name: SmolStr,
    /// The role the node declared, when it is a known one.
    pub expected: Option<Role>,
    /// Definitions involved: all candidates for an ambiguous reference or a
    /// duplicate key, the found entity for a role mismatch or self-link.
    pub candidates: Vec<Entity>,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        subject: Subject,
        location: Location,
        tag: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
    ) -> Self {
        Self {
            location,
            kind,
            subject,
            tag: tag.into(),
            name: name.into(),
            expected: None,
            candidates: Vec::new(),
        }
    }

    /// Set the declared role.
    pub fn with_expected(mut self, role: Role) -> Self {
        self.expected = Some(role);
        self
    }

    /// Set the definitions involved.
    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = Entity>) -> Self {
        self.candidates = candidates.into_iter().collect();
        self
    }

    /// Render a one-line human-readable message (without the location).
    pub fn message(&self) -> String {
        let (tag, name) = (&self.tag, &self.name);
        match self.kind {
            FindingKind::UnknownRole => match self.subject {
                Subject::Reference => format!("unknown role :{tag}: in reference to `{name}`"),
                Subject::Definition => format!("unknown definition type '{tag}' for `{name}`"),
            },
            FindingKind::MalformedDefinition if name.is_empty() => {
                format!("{tag} definition has no name")
            }
            FindingKind::MalformedDefinition => {
                format!("{tag} definition `{name}` is not a valid dotted name")
            }
            FindingKind::MalformedReference if name.is_empty() => {
                format!("reference :{tag}:`` has no target")
            }
            FindingKind::MalformedReference if name.starts_with('.') => {
                format!("relative reference :{tag}:`{name}` is not supported, use the full name")
            }
            FindingKind::MalformedReference => {
                format!("reference :{tag}:`{name}` is not a valid dotted name")
            }
            FindingKind::Unresolved => format!("unresolved reference :{tag}:`{name}`"),
            FindingKind::Ambiguous => format!(
                "ambiguous reference :{tag}:`{name}` could be: {}",
                describe_all(&self.candidates)
            ),
            FindingKind::RoleMismatch => {
                let expected = self.expected.map_or("?", Role::as_str);
                format!(
                    ":{tag}:`{name}` refers to {}, expected {expected}",
                    describe_all(&self.candidates)
                )
            }
            FindingKind::DuplicateDefinition => match self.candidates.first() {
                Some(first) => format!(
                    "duplicate definition of {tag} `{name}` (first defined at {})",
                    first.site
                ),
                None => format!("duplicate definition of {tag} `{name}`"),
            },
            FindingKind::SelfLink => format!("self-link to :{tag}:`{name}`"),
            FindingKind::DuplicateInParagraph => {
                format!("duplicate :{tag}:`{name}` in paragraph")
            }
        }
    }
}

fn describe_all(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(|e| format!("{} `{}` ({})", e.role, e.name, e.site))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.location, self.message(), self.kind.code())
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// The findings of one document, ordered by line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentGroup {
    pub document: DocId,
    pub findings: Vec<Finding>,
}

/// The result of a checking run: findings grouped by document.
///
/// Groups are ordered by [`DocId`], findings by their total order. Documents
/// without findings have no group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    groups: Vec<DocumentGroup>,
}

impl Report {
    /// Check if there are any findings. A harness can fail the build on this.
    pub fn has_findings(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get the total number of findings.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.findings.len()).sum()
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All document groups, in document order.
    pub fn groups(&self) -> &[DocumentGroup] {
        &self.groups
    }

    /// The group for a document, if it has findings.
    pub fn group(&self, doc: DocId) -> Option<&DocumentGroup> {
        self.groups
            .binary_search_by_key(&doc, |g| g.document)
            .ok()
            .map(|idx| &self.groups[idx])
    }

    /// All findings, in report order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.groups.iter().flat_map(|g| g.findings.iter())
    }

    /// Count findings of one kind.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings().filter(|f| f.kind == kind).count()
    }

    /// Merge several reports into one, keeping the report ordering.
    pub fn merge(reports: impl IntoIterator<Item = Report>) -> Report {
        let mut collector = FindingCollector::new();
        for report in reports {
            for group in report.groups {
                collector.extend(group.findings);
            }
        }
        collector.finish()
    }
}

// ============================================================================
// FINDING COLLECTOR
// ============================================================================

/// Collects findings during a checking run.
#[derive(Clone, Debug, Default)]
pub struct FindingCollector {
    findings: Vec<Finding>,
}

impl FindingCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding.
    pub fn add(&mut self, finding: Finding) {
        tracing::debug!(location = %finding.location, code = finding.kind.code(), "{}", finding.message());
        self.findings.push(finding);
    }

    /// Get the number of collected findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Check if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Sort and group everything collected into a report.
    pub fn finish(self) -> Report {
        let mut by_doc: BTreeMap<DocId, Vec<Finding>> = BTreeMap::new();
        for finding in self.findings {
            by_doc.entry(finding.location.doc).or_default().push(finding);
        }

        let groups = by_doc
            .into_iter()
            .map(|(document, mut findings)| {
                findings.sort_unstable();
                DocumentGroup { document, findings }
            })
            .collect();

        Report { groups }
    }
}

impl Extend<Finding> for FindingCollector {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for finding in iter {
            self.add(finding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(doc: u32, line: u32) -> Location {
        Location::new(DocId::new(doc), line)
    }

    fn unresolved(doc: u32, line: u32, name: &str) -> Finding {
        Finding::new(FindingKind::Unresolved, Subject::Reference, at(doc, line), "class", name)
            .with_expected(Role::Class)
    }

    #[test]
    fn test_empty_report() {
        let report = FindingCollector::new().finish();
        assert!(!report.has_findings());
        assert_eq!(report.len(), 0);
        assert!(report.group(DocId::new(0)).is_none());
    }

    #[test]
    fn test_report_groups_by_document_and_orders_by_line() {
        let mut collector = FindingCollector::new();
        collector.add(unresolved(1, 9, "C"));
        collector.add(unresolved(0, 7, "B"));
        collector.add(unresolved(1, 2, "A"));
        collector.add(unresolved(0, 3, "A"));

        let report = collector.finish();
        assert!(report.has_findings());
        assert_eq!(report.len(), 4);

        let docs: Vec<_> = report.groups().iter().map(|g| g.document).collect();
        assert_eq!(docs, vec![DocId::new(0), DocId::new(1)]);

        let lines: Vec<_> = report.findings().map(|f| f.location.line).collect();
        assert_eq!(lines, vec![3, 7, 2, 9]);

        let group = report.group(DocId::new(1)).unwrap();
        assert_eq!(group.findings[0].name, "A");
    }

    #[test]
    fn test_report_independent_of_insertion_order() {
        let findings = vec![
            unresolved(0, 5, "b"),
            unresolved(0, 5, "a"),
            Finding::new(FindingKind::UnknownRole, Subject::Reference, at(0, 5), "klass", "a"),
            unresolved(0, 1, "z"),
        ];

        let mut forward = FindingCollector::new();
        forward.extend(findings.clone());
        let mut backward = FindingCollector::new();
        backward.extend(findings.into_iter().rev());

        assert_eq!(forward.finish(), backward.finish());
    }

    #[test]
    fn test_same_line_orders_by_kind() {
        let mut collector = FindingCollector::new();
        collector.add(unresolved(0, 4, "a"));
        collector.add(Finding::new(FindingKind::UnknownRole, Subject::Reference, at(0, 4), "klass", "z"));

        let kinds: Vec<_> = collector.finish().findings().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::UnknownRole, FindingKind::Unresolved]);
    }

    #[test]
    fn test_count_by_kind() {
        let mut collector = FindingCollector::new();
        collector.add(unresolved(0, 1, "a"));
        collector.add(unresolved(0, 2, "b"));
        collector.add(Finding::new(FindingKind::SelfLink, Subject::Reference, at(0, 3), "mod", "m"));

        let report = collector.finish();
        assert_eq!(report.count(FindingKind::Unresolved), 2);
        assert_eq!(report.count(FindingKind::SelfLink), 1);
        assert_eq!(report.count(FindingKind::Ambiguous), 0);
    }

    #[test]
    fn test_merge_reports() {
        let mut a = FindingCollector::new();
        a.add(unresolved(1, 1, "x"));
        let mut b = FindingCollector::new();
        b.add(unresolved(0, 1, "y"));

        let merged = Report::merge([a.finish(), b.finish()]);
        assert_eq!(merged.groups().len(), 2);
        assert_eq!(merged.groups()[0].document, DocId::new(0));
    }

    #[test]
    fn test_messages() {
        let site = at(0, 2);
        let dup = Entity::new(Role::Class, "Dup", at(0, 1));
        let dup2 = Entity::new(Role::Class, "Dup", site);

        assert_eq!(unresolved(0, 1, "Unknown").message(), "unresolved reference :class:`Unknown`");
        assert_eq!(
            unresolved(0, 1, "Unknown").to_string(),
            "doc#0:1: unresolved reference :class:`Unknown` [L0001]"
        );

        let ambiguous = Finding::new(FindingKind::Ambiguous, Subject::Reference, at(0, 9), "class", "Dup")
            .with_candidates([dup.clone(), dup2.clone()]);
        assert_eq!(
            ambiguous.message(),
            "ambiguous reference :class:`Dup` could be: class `Dup` (doc#0:1), class `Dup` (doc#0:2)"
        );

        let duplicate = Finding::new(FindingKind::DuplicateDefinition, Subject::Definition, site, "class", "Dup")
            .with_candidates([dup, dup2]);
        assert_eq!(
            duplicate.message(),
            "duplicate definition of class `Dup` (first defined at doc#0:1)"
        );

        let mismatch = Finding::new(FindingKind::RoleMismatch, Subject::Reference, at(0, 5), "meth", "W.size")
            .with_expected(Role::Method)
            .with_candidates([Entity::new(Role::Attribute, "W.size", at(0, 3))]);
        assert_eq!(
            mismatch.message(),
            ":meth:`W.size` refers to attribute `W.size` (doc#0:3), expected method"
        );

        let malformed = Finding::new(FindingKind::MalformedReference, Subject::Reference, site, "func", "");
        assert_eq!(malformed.message(), "reference :func:`` has no target");

        let unknown = Finding::new(FindingKind::UnknownRole, Subject::Definition, site, "widget", "w");
        assert_eq!(unknown.message(), "unknown definition type 'widget' for `w`");

        let bad_def = Finding::new(FindingKind::MalformedDefinition, Subject::Definition, site, "function", "run()");
        assert_eq!(bad_def.message(), "function definition `run()` is not a valid dotted name");

        let empty_def = Finding::new(FindingKind::MalformedDefinition, Subject::Definition, site, "class", "");
        assert_eq!(empty_def.message(), "class definition has no name");
    }

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            FindingKind::UnknownRole,
            FindingKind::MalformedDefinition,
            FindingKind::MalformedReference,
            FindingKind::Unresolved,
            FindingKind::Ambiguous,
            FindingKind::RoleMismatch,
            FindingKind::DuplicateDefinition,
            FindingKind::SelfLink,
            FindingKind::DuplicateInParagraph,
        ];
        let codes: std::collections::BTreeSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
