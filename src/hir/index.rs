//! Definition index: every definition keyed by (role family, qualified name).
//!
//! Keying by the pair rather than by name alone keeps `my_thing` the function
//! and `my_thing` the module in separate buckets. Buckets keep insertion order
//! and are never overwritten: a second definition under the same key is
//! appended and later reported as a duplicate.

use indexmap::{Equivalent, IndexMap};
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use super::nodes::Entity;
use super::roles::RoleFamily;

/// Lookup key of the definition index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefKey {
    pub family: RoleFamily,
    pub name: SmolStr,
}

impl DefKey {
    pub fn new(family: RoleFamily, name: impl Into<SmolStr>) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

/// Borrowed form of [`DefKey`] so lookups don't allocate.
///
/// Must hash exactly like `DefKey`: family first, then the name as a `str`.
#[derive(Hash)]
struct DefKeyRef<'a> {
    family: RoleFamily,
    name: &'a str,
}

impl Equivalent<DefKey> for DefKeyRef<'_> {
    fn equivalent(&self, key: &DefKey) -> bool {
        self.family == key.family && self.name == key.name.as_str()
    }
}

/// Index of all definitions in one checking run.
///
/// Written once by the definition pass, then only read.
#[derive(Clone, Debug, Default)]
pub struct DefinitionIndex {
    buckets: IndexMap<DefKey, Vec<Entity>, FxBuildHasher>,
    len: usize,
}

impl DefinitionIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to the bucket for its key.
    pub fn insert(&mut self, entity: Entity) {
        let key = DefKey::new(entity.family(), entity.name.clone());
        tracing::trace!(family = %key.family, name = %key.name, site = %entity.site, "index definition");
        self.buckets.entry(key).or_default().push(entity);
        self.len += 1;
    }

    /// All entities under `(family, name)`, in insertion order.
    pub fn lookup(&self, family: RoleFamily, name: &str) -> &[Entity] {
        self.buckets
            .get(&DefKeyRef { family, name })
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every bucket holding more than one entity, in index-construction order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&DefKey, &[Entity])> {
        self.buckets
            .iter()
            .filter(|(_, entities)| entities.len() > 1)
            .map(|(key, entities)| (key, entities.as_slice()))
    }

    /// Iterate over all buckets, in index-construction order.
    pub fn iter(&self) -> impl Iterator<Item = (&DefKey, &[Entity])> {
        self.buckets
            .iter()
            .map(|(key, entities)| (key, entities.as_slice()))
    }

    /// Get the total number of entities.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Extend<Entity> for DefinitionIndex {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl FromIterator<Entity> for DefinitionIndex {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
