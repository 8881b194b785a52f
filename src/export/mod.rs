//! Output side: the body sink, the attachment file sink, and destination setup.

pub mod attachment;
pub mod body;
pub mod destination;
pub mod extension;
