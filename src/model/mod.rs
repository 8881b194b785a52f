//! Core data model types: the parsed part tree, attachment records, and run reports.

pub mod attachment;
pub mod part;
pub mod report;
