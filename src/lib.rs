//! `mimesplit` — separate a MIME multi-part message into its body text and its attachments.
//!
//! The body (the first part without a filename) is charset-decoded onto the
//! primary output; every other leaf part is written as a file into a
//! destination directory.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod split;
