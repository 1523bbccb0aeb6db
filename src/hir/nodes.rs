//! Node model: definitions and references extracted from a parsed document.
//!
//! The parser is an external collaborator. The checker only sees it through
//! [`DocumentSource`], which yields two independent lazy sequences of raw
//! nodes. Extraction turns raw nodes into [`Entity`] and [`Reference`]
//! values, or into findings when a node cannot be keyed (unknown role,
//! missing name). A node without a line is a broken tree, not a finding.

use smol_str::SmolStr;

use crate::base::{DocId, Location};
use crate::error::ContractViolation;
use super::diagnostics::{Finding, FindingKind, Subject};
use super::roles::{Role, RoleFamily, RoleTable};

/// Identifies the paragraph (or other inline block) a reference sits in.
///
/// Only meaningful within one document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// A definition-like node as the parser exposes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDefinition<'a> {
    /// Object type from the definition directive, e.g. `"class"`.
    pub objtype: &'a str,
    /// Fully qualified name being defined.
    pub name: &'a str,
    /// First line of the definition (1-indexed).
    pub line: Option<u32>,
    /// Last line covered by the definition, nested definitions included.
    pub end_line: Option<u32>,
}

/// A reference-like node as the parser exposes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReference<'a> {
    /// Role tag as written, e.g. `"class"` for `:class:`.
    pub tag: &'a str,
    /// Target as written.
    pub target: &'a str,
    /// Line of the reference (1-indexed).
    pub line: Option<u32>,
    /// Enclosing paragraph, if any.
    pub block: Option<BlockId>,
}

/// Capability interface over a parsed document tree.
///
/// Both sequences are finite and restartable by calling the method again.
pub trait DocumentSource {
    /// The document this tree was parsed from.
    fn document(&self) -> DocId;

    /// Definition-like nodes, in traversal order.
    fn definitions(&self) -> impl Iterator<Item = RawDefinition<'_>> + '_;

    /// Reference-like nodes, in traversal order.
    fn references(&self) -> impl Iterator<Item = RawReference<'_>> + '_;
}

/// A documented object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// Where the definition starts.
    pub site: Location,
    pub role: Role,
    pub name: SmolStr,
    /// Last line covered by the definition.
    pub end_line: u32,
}

impl Entity {
    pub fn new(role: Role, name: impl Into<SmolStr>, site: Location) -> Self {
        Self {
            site,
            role,
            name: name.into(),
            end_line: site.line,
        }
    }

    /// Set the last line covered by this definition.
    pub fn with_end_line(mut self, end_line: u32) -> Self {
        self.end_line = end_line;
        self
    }

    #[inline]
    pub fn family(&self) -> RoleFamily {
        self.role.family()
    }

    /// Check whether a location falls inside this definition.
    pub fn contains(&self, location: Location) -> bool {
        location.within(self.site.doc, self.site.line, self.end_line)
    }
}

/// A cross-reference occurrence, alive for a single checking run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub site: Location,
    /// The role the author asserted.
    pub role: Role,
    /// Tag as written, kept for messages.
    pub tag: SmolStr,
    /// Target name used for lookup.
    pub target: SmolStr,
    pub block: Option<BlockId>,
}

impl Reference {
    pub fn new(role: Role, target: impl Into<SmolStr>, site: Location) -> Self {
        Self {
            site,
            role,
            tag: SmolStr::new(role.as_str()),
            target: target.into(),
            block: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<SmolStr>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_block(mut self, block: BlockId) -> Self {
        self.block = Some(block);
        self
    }
}

/// The result of extracting one raw node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extracted<T> {
    /// The node can take part in resolution.
    Item(T),
    /// The node could not be keyed and is reported instead.
    Finding(Finding),
    /// The node is explicitly not a link (`!target`).
    Suppressed,
}

/// Marks a target that must not be linked.
const SUPPRESS_MARKER: char = '!';
/// Marks a target displayed by its last component only.
const SHORTEN_MARKER: char = '~';

/// Extract entities from a document's definition nodes.
pub fn definitions<S: DocumentSource>(
    source: &S,
) -> impl Iterator<Item = Result<Extracted<Entity>, ContractViolation>> + '_ {
    let doc = source.document();
    source.definitions().map(move |raw| extract_definition(doc, &raw))
}

/// Extract references from a document's reference nodes.
pub fn references<'a, S: DocumentSource>(
    source: &'a S,
    roles: &'a RoleTable,
) -> impl Iterator<Item = Result<Extracted<Reference>, ContractViolation>> + 'a {
    let doc = source.document();
    source
        .references()
        .map(move |raw| extract_reference(doc, &raw, roles))
}

fn extract_definition(
    doc: DocId,
    raw: &RawDefinition<'_>,
) -> Result<Extracted<Entity>, ContractViolation> {
    let Some(line) = raw.line else {
        return Err(ContractViolation::DefinitionWithoutLine {
            doc,
            objtype: raw.objtype.into(),
            name: raw.name.into(),
        });
    };
    let end_line = raw.end_line.unwrap_or(line);
    if end_line < line {
        return Err(ContractViolation::InvertedExtent {
            doc,
            objtype: raw.objtype.into(),
            name: raw.name.into(),
            start: line,
            end: end_line,
        });
    }

    let site = Location::new(doc, line);
    let Ok(role) = raw.objtype.parse::<Role>() else {
        return Ok(Extracted::Finding(Finding::new(
            FindingKind::UnknownRole,
            Subject::Definition,
            site,
            raw.objtype,
            raw.name,
        )));
    };
    let name = raw.name.trim();
    if !is_dotted_name(name) {
        return Ok(Extracted::Finding(Finding::new(
            FindingKind::MalformedDefinition,
            Subject::Definition,
            site,
            raw.objtype,
            name,
        )));
    }

    Ok(Extracted::Item(Entity::new(role, name, site).with_end_line(end_line)))
}

fn extract_reference(
    doc: DocId,
    raw: &RawReference<'_>,
    roles: &RoleTable,
) -> Result<Extracted<Reference>, ContractViolation> {
    let Some(line) = raw.line else {
        return Err(ContractViolation::ReferenceWithoutLine {
            doc,
            tag: raw.tag.into(),
            target: raw.target.into(),
        });
    };
    let site = Location::new(doc, line);

    let target = raw.target.trim();
    let Some(role) = roles.role_for_tag(raw.tag) else {
        return Ok(Extracted::Finding(Finding::new(
            FindingKind::UnknownRole,
            Subject::Reference,
            site,
            raw.tag,
            target,
        )));
    };

    if target.starts_with(SUPPRESS_MARKER) {
        tracing::trace!(%site, tag = raw.tag, name = target, "suppressed reference");
        return Ok(Extracted::Suppressed);
    }
    let target = target.strip_prefix(SHORTEN_MARKER).unwrap_or(target);
    if !is_dotted_name(target) {
        return Ok(Extracted::Finding(
            Finding::new(
                FindingKind::MalformedReference,
                Subject::Reference,
                site,
                raw.tag,
                target,
            )
            .with_expected(role),
        ));
    }

    let mut reference = Reference::new(role, target, site).with_tag(raw.tag);
    reference.block = raw.block;
    Ok(Extracted::Item(reference))
}

/// Check that every dot-separated segment is an identifier.
pub fn is_dotted_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}
