//! Foundation types for the checker.
//!
//! This module provides the fundamental types shared by every pass:
//! - [`DocId`] - Interned document identifiers
//! - [`Location`] - A line within a document
//!
//! This module has NO dependencies on other linklint modules.

mod doc_id;
mod location;

pub use doc_id::DocId;
pub use location::Location;
