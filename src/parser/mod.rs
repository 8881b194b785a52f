//! Input side: reading the raw message and turning it into a part tree.

pub mod mime;
pub mod source;
