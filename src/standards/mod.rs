//! Thread standards catalog and tolerance matching
//!
//! Storage is hidden behind [`StandardsRepository`]; the matching rules in
//! [`matching`] are the same whether rows come from the in-memory
//! [`StandardsCatalog`] or from a remote table.

pub mod catalog;
pub mod matching;

pub use catalog::{StandardsCatalog, StandardsRepository, ThreadStandardEntry, ThreadUnit};
pub use matching::{match_catalog, match_standards, Tolerance, ToleranceRange};
