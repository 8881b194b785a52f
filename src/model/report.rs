//! Summary of one split run.

use super::attachment::SavedAttachment;

/// What was written to the body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyReport {
    /// Charset used for decoding (declared or default).
    pub charset: String,
    /// Length of the decoded text in bytes.
    pub size: u64,
}

/// Everything a run wrote, in the order it was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// The body, if the message had a nameless part.
    pub body: Option<BodyReport>,
    /// Attachment files written, in document order.
    pub attachments: Vec<SavedAttachment>,
}

impl Report {
    /// Total bytes written to attachment files.
    pub fn attachment_bytes(&self) -> u64 {
        self.attachments.iter().map(|a| a.size).sum()
    }
}
