//! Roles, role families and the compatibility table.
//!
//! Every decision about which roles may resolve to which lives here:
//!
//! - [`Role`] - the closed set of documented object types
//! - [`RoleFamily`] - the fixed grouping used as part of the index key
//! - [`RoleTable`] - reference tags and cross-role compatibility (configurable)
//!
//! Family membership is not configurable. A `:func:` reference and a
//! `:mod:` reference to the same name look in different buckets of the
//! definition index, so they can never resolve to each other's entity.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::ConfigError;

/// The kind of a documented object, or the kind a reference asks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    Module,
    Class,
    Exception,
    Type,
    Function,
    Data,
    Method,
    ClassMethod,
    StaticMethod,
    Attribute,
    Property,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 11] = [
        Role::Module,
        Role::Class,
        Role::Exception,
        Role::Type,
        Role::Function,
        Role::Data,
        Role::Method,
        Role::ClassMethod,
        Role::StaticMethod,
        Role::Attribute,
        Role::Property,
    ];

    /// The object-type name used by definition directives.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Module => "module",
            Role::Class => "class",
            Role::Exception => "exception",
            Role::Type => "type",
            Role::Function => "function",
            Role::Data => "data",
            Role::Method => "method",
            Role::ClassMethod => "classmethod",
            Role::StaticMethod => "staticmethod",
            Role::Attribute => "attribute",
            Role::Property => "property",
        }
    }

    /// The family this role is indexed under.
    pub const fn family(self) -> RoleFamily {
        match self {
            Role::Module => RoleFamily::Module,
            Role::Class | Role::Exception | Role::Type => RoleFamily::Type,
            Role::Function => RoleFamily::Function,
            Role::Data => RoleFamily::Data,
            Role::Method
            | Role::ClassMethod
            | Role::StaticMethod
            | Role::Attribute
            | Role::Property => RoleFamily::Member,
        }
    }

    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    /// Parse an object-type name such as `"staticmethod"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRole(s.to_string()))
    }
}

/// A group of closely related roles sharing one namespace in the index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoleFamily {
    Module,
    Type,
    Function,
    Data,
    Member,
}

impl RoleFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleFamily::Module => "module",
            RoleFamily::Type => "type",
            RoleFamily::Function => "function",
            RoleFamily::Data => "data",
            RoleFamily::Member => "member",
        }
    }

    /// The roles belonging to this family.
    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| role.family() == self)
    }
}

impl fmt::Display for RoleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference tags understood out of the box.
const DEFAULT_TAGS: &[(&str, Role)] = &[
    ("mod", Role::Module),
    ("class", Role::Class),
    ("exc", Role::Exception),
    ("type", Role::Type),
    ("func", Role::Function),
    ("data", Role::Data),
    ("meth", Role::Method),
    ("attr", Role::Attribute),
];

/// Cross-role resolutions the documentation toolchain itself performs.
/// `(declared, found)`: a reference declared as the first role may resolve
/// to a definition of the second.
const DEFAULT_COMPATIBLE: &[(Role, Role)] = &[
    (Role::Class, Role::Exception),
    (Role::Class, Role::Type),
    (Role::Exception, Role::Class),
    (Role::Method, Role::ClassMethod),
    (Role::Method, Role::StaticMethod),
    (Role::Attribute, Role::Property),
];

/// Domain prefix accepted in front of any tag (`py:class`).
const DOMAIN_PREFIX: &str = "py:";

/// Reference tags and role compatibility.
///
/// Compatibility is never transitive and never crosses families: a declared
/// role accepts itself plus whatever was explicitly allowed.
#[derive(Clone, Debug)]
pub struct RoleTable {
    tags: FxHashMap<SmolStr, Role>,
    /// Bitset of accepted found roles, indexed by declared role.
    accepts: [u16; Role::ALL.len()],
}

impl RoleTable {
    /// The default table: standard tags and the toolchain's compatibility rules.
    pub fn new() -> Self {
        let mut table = Self::exact();
        for &(declared, found) in DEFAULT_COMPATIBLE {
            table.accepts[declared as usize] |= found.bit();
        }
        table
    }

    /// Standard tags, but every role only accepts itself.
    pub fn exact() -> Self {
        let tags = DEFAULT_TAGS
            .iter()
            .map(|&(tag, role)| (SmolStr::new(tag), role))
            .collect();
        let mut accepts = [0; Role::ALL.len()];
        for role in Role::ALL {
            accepts[role as usize] = role.bit();
        }
        Self { tags, accepts }
    }

    /// Look up the role a reference tag declares.
    ///
    /// A leading `py:` domain prefix is ignored.
    pub fn role_for_tag(&self, tag: &str) -> Option<Role> {
        let tag = tag.strip_prefix(DOMAIN_PREFIX).unwrap_or(tag);
        self.tags.get(tag).copied()
    }

    /// Register an additional tag for a role.
    pub fn alias(&mut self, tag: &str, role: Role) -> Result<(), ConfigError> {
        let tag = tag.strip_prefix(DOMAIN_PREFIX).unwrap_or(tag);
        if tag.is_empty() {
            return Err(ConfigError::EmptyTag);
        }
        self.tags.insert(SmolStr::new(tag), role);
        Ok(())
    }

    /// Let references declared as `declared` resolve to `found` definitions.
    pub fn allow(&mut self, declared: Role, found: Role) -> Result<(), ConfigError> {
        if declared.family() != found.family() {
            return Err(ConfigError::CrossFamily {
                declared: declared.to_string(),
                found: found.to_string(),
            });
        }
        self.accepts[declared as usize] |= found.bit();
        Ok(())
    }

    /// Check whether a reference declared as `declared` may resolve to a
    /// definition of role `found`.
    #[inline]
    pub fn accepts(&self, declared: Role, found: Role) -> bool {
        self.accepts[declared as usize] & found.bit() != 0
    }

    /// All roles a declared role accepts, in declaration order.
    pub fn accepted_by(&self, declared: Role) -> impl Iterator<Item = Role> + '_ {
        Role::ALL
            .into_iter()
            .filter(move |&found| self.accepts(declared, found))
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Module, RoleFamily::Module)]
    #[case(Role::Class, RoleFamily::Type)]
    #[case(Role::Exception, RoleFamily::Type)]
    #[case(Role::Type, RoleFamily::Type)]
    #[case(Role::Function, RoleFamily::Function)]
    #[case(Role::Data, RoleFamily::Data)]
    #[case(Role::Method, RoleFamily::Member)]
    #[case(Role::ClassMethod, RoleFamily::Member)]
    #[case(Role::StaticMethod, RoleFamily::Member)]
    #[case(Role::Attribute, RoleFamily::Member)]
    #[case(Role::Property, RoleFamily::Member)]
    fn test_role_family(#[case] role: Role, #[case] family: RoleFamily) {
        assert_eq!(role.family(), family);
        assert!(family.roles().any(|r| r == role));
    }

    #[test]
    fn test_every_role_has_exactly_one_family() {
        let total: usize = [
            RoleFamily::Module,
            RoleFamily::Type,
            RoleFamily::Function,
            RoleFamily::Data,
            RoleFamily::Member,
        ]
        .into_iter()
        .map(|family| family.roles().count())
        .sum();
        assert_eq!(total, Role::ALL.len());
    }

    #[test]
    fn test_role_from_str_round_trips() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!("meth".parse::<Role>(), Err(ConfigError::UnknownRole(_))));
    }

    #[rstest]
    #[case("mod", Some(Role::Module))]
    #[case("class", Some(Role::Class))]
    #[case("exc", Some(Role::Exception))]
    #[case("type", Some(Role::Type))]
    #[case("func", Some(Role::Function))]
    #[case("data", Some(Role::Data))]
    #[case("meth", Some(Role::Method))]
    #[case("attr", Some(Role::Attribute))]
    #[case("py:func", Some(Role::Function))]
    #[case("obj", None)]
    #[case("function", None)]
    #[case("", None)]
    fn test_role_for_tag(#[case] tag: &str, #[case] expected: Option<Role>) {
        assert_eq!(RoleTable::new().role_for_tag(tag), expected);
    }

    #[test]
    fn test_every_role_accepts_itself() {
        for table in [RoleTable::new(), RoleTable::exact()] {
            for role in Role::ALL {
                assert!(table.accepts(role, role), "{role} should accept itself");
            }
        }
    }

    #[test]
    fn test_compatibility_never_crosses_families() {
        let table = RoleTable::new();
        for declared in Role::ALL {
            for found in Role::ALL {
                if table.accepts(declared, found) {
                    assert_eq!(declared.family(), found.family(), "{declared} -> {found}");
                }
            }
        }
    }

    #[rstest]
    #[case(Role::Class, &[Role::Class, Role::Exception, Role::Type])]
    #[case(Role::Exception, &[Role::Class, Role::Exception])]
    #[case(Role::Type, &[Role::Type])]
    #[case(Role::Method, &[Role::Method, Role::ClassMethod, Role::StaticMethod])]
    #[case(Role::Attribute, &[Role::Attribute, Role::Property])]
    #[case(Role::Function, &[Role::Function])]
    #[case(Role::Module, &[Role::Module])]
    #[case(Role::Data, &[Role::Data])]
    fn test_default_compatibility(#[case] declared: Role, #[case] expected: &[Role]) {
        let table = RoleTable::new();
        let accepted: Vec<_> = table.accepted_by(declared).collect();
        assert_eq!(accepted, expected);
    }

    #[test]
    fn test_method_and_attribute_are_not_interchangeable() {
        let table = RoleTable::new();
        assert!(!table.accepts(Role::Method, Role::Attribute));
        assert!(!table.accepts(Role::Attribute, Role::Method));
    }

    #[test]
    fn test_exact_table_only_accepts_identity() {
        let table = RoleTable::exact();
        assert!(!table.accepts(Role::Class, Role::Exception));
        assert_eq!(table.accepted_by(Role::Method).collect::<Vec<_>>(), vec![Role::Method]);
    }

    #[test]
    fn test_allow_within_family() {
        let mut table = RoleTable::new();
        table.allow(Role::Method, Role::Attribute).unwrap();
        assert!(table.accepts(Role::Method, Role::Attribute));
        assert!(!table.accepts(Role::Attribute, Role::Method));
    }

    #[test]
    fn test_allow_rejects_cross_family() {
        let mut table = RoleTable::new();
        let err = table.allow(Role::Function, Role::Module).unwrap_err();
        assert!(matches!(err, ConfigError::CrossFamily { .. }));
        assert!(!table.accepts(Role::Function, Role::Module));
    }

    #[test]
    fn test_alias() {
        let mut table = RoleTable::new();
        table.alias("py:exception", Role::Exception).unwrap();
        assert_eq!(table.role_for_tag("exception"), Some(Role::Exception));
        assert!(matches!(table.alias("py:", Role::Class), Err(ConfigError::EmptyTag)));
    }
}
