//! The two-pass checking run.
//!
//! Pass one extracts every definition and builds the [`DefinitionIndex`].
//! Pass two extracts references and resolves them against the finished,
//! read-only index. Both passes sort what they extracted by location first,
//! so the order a tree happens to yield siblings in never shows up in the
//! index or the report.

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::base::DocId;
use crate::config::{CheckerConfig, Checks};
use crate::error::{ConfigError, ContractViolation};
use crate::hir::nodes::{self, Extracted};
use crate::hir::{
    BlockId, DefinitionIndex, DocumentSource, Entity, Finding, FindingCollector, FindingKind,
    Reference, Report, ResolvedReference, Resolver, Role, RoleTable, Subject,
};

/// Everything a checking run produced.
#[derive(Clone, Debug)]
pub struct Analysis {
    index: DefinitionIndex,
    resolutions: Vec<ResolvedReference>,
    report: Report,
}

impl Analysis {
    /// The definition index built by pass one.
    pub fn index(&self) -> &DefinitionIndex {
        &self.index
    }

    /// Every extracted reference with its outcome, in document order.
    pub fn resolutions(&self) -> &[ResolvedReference] {
        &self.resolutions
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

/// Runs checks over parsed documents.
#[derive(Clone, Debug, Default)]
pub struct Checker {
    roles: RoleTable,
    checks: Checks,
}

impl Checker {
    /// Create a checker from configuration.
    pub fn new(config: &CheckerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            roles: config.role_table()?,
            checks: config.checks,
        })
    }

    /// Create a checker from an already built role table.
    pub fn with_roles(roles: RoleTable, checks: Checks) -> Self {
        Self { roles, checks }
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Run one checking run over `sources`, which share a single index.
    pub fn check<S: DocumentSource>(&self, sources: &[S]) -> Result<Analysis, ContractViolation> {
        let _span = tracing::debug_span!("check", documents = sources.len()).entered();
        let mut collector = FindingCollector::new();

        let index = self.index_definitions(sources, &mut collector)?;
        let references = self.extract_references(sources, &mut collector)?;

        let resolver = Resolver::new(&index, &self.roles);
        let resolutions = resolver.resolve_all(references);
        collector.extend(
            resolutions
                .iter()
                .filter_map(|r| r.resolution.to_finding(&r.reference)),
        );

        if self.checks.self_links {
            collector.extend(self_links(&resolutions));
        }
        if self.checks.paragraph_duplicates {
            collector.extend(paragraph_duplicates(&resolutions));
        }

        let report = collector.finish();
        tracing::debug!(
            references = resolutions.len(),
            findings = report.len(),
            "checking run complete"
        );

        Ok(Analysis {
            index,
            resolutions,
            report,
        })
    }

    /// Run an independent checking run per document, in parallel.
    ///
    /// Each run has its own index; results come back in input order.
    pub fn check_each<S>(&self, sources: &[S]) -> Vec<Result<Analysis, ContractViolation>>
    where
        S: DocumentSource + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.check(std::slice::from_ref(source)))
            .collect()
    }

    /// Pass one: extract definitions and build the index.
    fn index_definitions<S: DocumentSource>(
        &self,
        sources: &[S],
        collector: &mut FindingCollector,
    ) -> Result<DefinitionIndex, ContractViolation> {
        let _span = tracing::debug_span!("definitions").entered();

        let mut entities = Vec::new();
        for source in sources {
            for item in nodes::definitions(source) {
                match item? {
                    Extracted::Item(entity) => entities.push(entity),
                    Extracted::Finding(finding) => collector.add(finding),
                    Extracted::Suppressed => {}
                }
            }
        }
        entities.sort();

        let index: DefinitionIndex = entities.into_iter().collect();
        collector.extend(duplicate_definitions(&index));
        tracing::debug!(
            definitions = index.len(),
            keys = index.key_count(),
            "definition index built"
        );
        Ok(index)
    }

    /// Pass two, first half: extract references in document order.
    fn extract_references<S: DocumentSource>(
        &self,
        sources: &[S],
        collector: &mut FindingCollector,
    ) -> Result<Vec<Reference>, ContractViolation> {
        let _span = tracing::debug_span!("references").entered();

        let mut references = Vec::new();
        for source in sources {
            for item in nodes::references(source, &self.roles) {
                match item? {
                    Extracted::Item(reference) => references.push(reference),
                    Extracted::Finding(finding) => collector.add(finding),
                    Extracted::Suppressed => {}
                }
            }
        }
        references.sort();
        Ok(references)
    }
}

/// Check documents with the default configuration.
pub fn check<S: DocumentSource>(sources: &[S]) -> Result<Analysis, ContractViolation> {
    Checker::default().check(sources)
}

/// One finding per redefinition: every entity after the first in a bucket.
fn duplicate_definitions(index: &DefinitionIndex) -> Vec<Finding> {
    index
        .duplicates()
        .flat_map(|(key, entities)| {
            entities[1..].iter().map(move |entity| {
                Finding::new(
                    FindingKind::DuplicateDefinition,
                    Subject::Definition,
                    entity.site,
                    entity.role.as_str(),
                    key.name.clone(),
                )
                .with_expected(entity.role)
                .with_candidates(entities.iter().cloned())
            })
        })
        .collect()
}

/// References that resolve to the definition enclosing them.
fn self_links(resolutions: &[ResolvedReference]) -> Vec<Finding> {
    resolutions
        .iter()
        .filter_map(|r| {
            let entity: &Entity = r.resolution.entity()?;
            entity.contains(r.reference.site).then(|| {
                Finding::new(
                    FindingKind::SelfLink,
                    Subject::Reference,
                    r.reference.site,
                    r.reference.tag.clone(),
                    r.reference.target.clone(),
                )
                .with_expected(r.reference.role)
                .with_candidates([entity.clone()])
            })
        })
        .collect()
}

/// Second and later references to the same (role, target) within one paragraph.
fn paragraph_duplicates(resolutions: &[ResolvedReference]) -> Vec<Finding> {
    let mut seen: FxHashSet<(DocId, BlockId, Role, &str)> = FxHashSet::default();
    resolutions
        .iter()
        .map(|r| &r.reference)
        .filter_map(|reference| {
            let block = reference.block?;
            let key = (reference.site.doc, block, reference.role, reference.target.as_str());
            (!seen.insert(key)).then(|| {
                Finding::new(
                    FindingKind::DuplicateInParagraph,
                    Subject::Reference,
                    reference.site,
                    reference.tag.clone(),
                    reference.target.clone(),
                )
                .with_expected(reference.role)
            })
        })
        .collect()
}
