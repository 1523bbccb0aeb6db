//! Error types.
//!
//! Problems in document *content* are never errors: they become
//! [`Finding`](crate::hir::Finding)s. The errors here cover a malformed input
//! tree handed over by the parser and invalid checker configuration.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::DocId;

/// The parsed tree broke the contract the checker relies on.
///
/// A checking run cannot attribute findings without a location, so these
/// abort the run for the offending document.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("{doc}: reference :{tag}:`{target}` has no source line")]
    ReferenceWithoutLine {
        doc: DocId,
        tag: SmolStr,
        target: SmolStr,
    },

    #[error("{doc}: {objtype} definition `{name}` has no source line")]
    DefinitionWithoutLine {
        doc: DocId,
        objtype: SmolStr,
        name: SmolStr,
    },

    #[error("{doc}: {objtype} definition `{name}` ends on line {end} before it starts on line {start}")]
    InvertedExtent {
        doc: DocId,
        objtype: SmolStr,
        name: SmolStr,
        start: u32,
        end: u32,
    },
}

/// Invalid checker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown role `{0}`")]
    UnknownRole(String),

    #[error("`{declared}` cannot accept `{found}`: roles belong to different families")]
    CrossFamily { declared: String, found: String },

    #[error("role tag must not be empty")]
    EmptyTag,

    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Any error the checker can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
