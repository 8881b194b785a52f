//! Part classification and dispatch.
//!
//! The message tree is walked in document order. Containers are skipped, the
//! first part without a filename is the body, later nameless parts become
//! `nameless-part_NN.ext` files, and named parts are saved under their own
//! name.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use humansize::{format_size, BINARY};
use tracing::{debug, info, warn};

use crate::error::{Result, SplitError};
use crate::export::attachment::{neutralize_filename, write_attachment};
use crate::export::body::write_body;
use crate::export::extension::guess_extension;
use crate::model::attachment::{AttachmentKind, SavedAttachment};
use crate::model::part::{Leaf, Message, Part};
use crate::model::report::{BodyReport, Report};
use crate::parser::mime;

/// Tunables for a split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Charset used for a body that declares none.
    pub default_charset: String,
    /// Prefix of synthesized filenames.
    pub nameless_prefix: String,
    /// Neutralize path components in declared filenames.
    pub sanitize_filenames: bool,
    /// Content type → extension overrides, keys lowercased.
    pub extension_overrides: BTreeMap<String, String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            default_charset: "ascii".to_string(),
            nameless_prefix: "nameless-part".to_string(),
            sanitize_filenames: true,
            extension_overrides: BTreeMap::new(),
        }
    }
}

/// Where a leaf's payload goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// First nameless part: decoded with `charset` onto the primary output.
    Body { charset: String },
    /// Later nameless part, saved under a synthesized name.
    Unnamed { filename: String },
    /// Part with a declared filename.
    Named { filename: String },
}

/// Decide what to do with `leaf`, given how many nameless parts came before it.
pub fn classify(leaf: &Leaf, nameless_seen: usize, options: &SplitOptions) -> Disposition {
    match &leaf.filename {
        Some(name) => Disposition::Named {
            filename: name.clone(),
        },
        None if nameless_seen == 0 => Disposition::Body {
            charset: leaf
                .charset
                .clone()
                .unwrap_or_else(|| options.default_charset.clone()),
        },
        None => {
            let ext = guess_extension(&leaf.content_type, &options.extension_overrides);
            Disposition::Unnamed {
                filename: format!("{}_{nameless_seen:02}{ext}", options.nameless_prefix),
            }
        }
    }
}

/// Routes the parts of one message to the body and file sinks.
pub struct Splitter<'a, O: Write, D: Write> {
    destination: &'a Path,
    options: &'a SplitOptions,
    out: O,
    diag: D,
}

impl<'a, O: Write, D: Write> Splitter<'a, O, D> {
    /// Create a splitter writing body text to `out` and notices to `diag`.
    pub fn new(destination: &'a Path, options: &'a SplitOptions, out: O, diag: D) -> Self {
        Self {
            destination,
            options,
            out,
            diag,
        }
    }

    /// Walk `message` and write out every qualifying part.
    ///
    /// Stops at the first failure; whatever was written before remains.
    pub fn split(&mut self, message: &Message) -> Result<Report> {
        let mut report = Report::default();
        let mut nameless_seen = 0usize;

        for part in message.walk() {
            let leaf = match part {
                Part::Container { content_type, .. } => {
                    debug!(content_type = %content_type, "Skipping container");
                    continue;
                }
                Part::Leaf(leaf) => leaf,
            };

            let disposition = classify(leaf, nameless_seen, self.options);
            debug!(
                content_type = %leaf.content_type,
                size = leaf.payload.len(),
                ?disposition,
                "Classified part"
            );

            match disposition {
                Disposition::Body { charset } => {
                    let size = write_body(&mut self.out, &leaf.payload, &charset)?;
                    // Keeps following notices on their own line when the body lacks a final newline
                    self.diag
                        .write_all(b"\n")
                        .and_then(|()| self.diag.flush())
                        .map_err(SplitError::Output)?;
                    report.body = Some(BodyReport { charset, size });
                    nameless_seen += 1;
                }
                Disposition::Unnamed { filename } => {
                    let path = self.save(&filename, leaf)?;
                    report
                        .attachments
                        .push(saved(path, leaf, AttachmentKind::Unnamed));
                    nameless_seen += 1;
                }
                Disposition::Named { filename } => {
                    let filename = if self.options.sanitize_filenames {
                        let safe = neutralize_filename(&filename);
                        if safe != filename.as_str() {
                            warn!(declared = %filename, used = %safe, "Neutralized attachment filename");
                        }
                        safe.into_owned()
                    } else {
                        filename
                    };
                    let path = self.save(&filename, leaf)?;
                    report
                        .attachments
                        .push(saved(path, leaf, AttachmentKind::Named));
                }
            }
        }

        info!(
            body = report.body.is_some(),
            attachments = report.attachments.len(),
            total = %format_size(report.attachment_bytes(), BINARY),
            "Split complete"
        );
        Ok(report)
    }

    fn save(&mut self, filename: &str, leaf: &Leaf) -> Result<PathBuf> {
        write_attachment(&mut self.diag, self.destination, filename, &leaf.payload)
    }
}

fn saved(path: PathBuf, leaf: &Leaf, kind: AttachmentKind) -> SavedAttachment {
    SavedAttachment {
        path,
        content_type: leaf.content_type.clone(),
        size: leaf.payload.len() as u64,
        kind,
    }
}

/// Parse `raw_message` and split it into `destination`.
pub fn split_message<O: Write, D: Write>(
    raw_message: &[u8],
    destination: &Path,
    options: &SplitOptions,
    out: O,
    diag: D,
) -> Result<Report> {
    let message = mime::parse_message(raw_message)?;
    Splitter::new(destination, options, out, diag).split(&message)
}
