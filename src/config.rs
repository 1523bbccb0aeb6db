//! Checker configuration.
//!
//! The defaults reproduce the documentation toolchain's own cross-reference
//! rules. With the `serde` feature, a configuration can be read from JSON:
//!
//! ```json
//! {
//!   "checks": { "self_links": false },
//!   "aliases": [{ "tag": "exception", "role": "exception" }],
//!   "compatible": [{ "declared": "method", "found": "attribute" }]
//! }
//! ```

use crate::error::ConfigError;
use crate::hir::{Role, RoleTable};

/// Optional checks on top of reference resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Checks {
    /// Report references to the definition they appear in.
    pub self_links: bool,
    /// Report the same reference repeated within one paragraph.
    pub paragraph_duplicates: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            self_links: true,
            paragraph_duplicates: true,
        }
    }
}

/// An extra reference tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleAlias {
    pub tag: String,
    /// Object-type name, e.g. `"exception"`.
    pub role: String,
}

/// An extra accepted role for references declared with another role.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compatibility {
    pub declared: String,
    pub found: String,
}

/// Configuration for a [`Checker`](crate::Checker).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CheckerConfig {
    pub checks: Checks,
    /// Start from a table where every role only accepts itself.
    pub exact_roles_only: bool,
    pub aliases: Vec<RoleAlias>,
    pub compatible: Vec<Compatibility>,
}

impl CheckerConfig {
    /// Parse a JSON configuration.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the role table this configuration describes.
    pub fn role_table(&self) -> Result<RoleTable, ConfigError> {
        let mut table = if self.exact_roles_only {
            RoleTable::exact()
        } else {
            RoleTable::new()
        };

        for alias in &self.aliases {
            table.alias(&alias.tag, alias.role.parse::<Role>()?)?;
        }
        for compat in &self.compatible {
            table.allow(compat.declared.parse()?, compat.found.parse()?)?;
        }

        Ok(table)
    }
}
