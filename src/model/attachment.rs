//! Attachment records.

use std::path::PathBuf;

/// How an attachment got its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// The part declared its own filename.
    Named,
    /// The filename was synthesized (`nameless-part_NN.ext`).
    Unnamed,
}

/// An attachment that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAttachment {
    /// Full path of the written file (destination directory joined with the filename).
    pub path: PathBuf,

    /// MIME content type of the source part (e.g. `"application/pdf"`).
    pub content_type: String,

    /// Number of bytes written.
    pub size: u64,

    /// Whether the filename was declared or synthesized.
    pub kind: AttachmentKind,
}
