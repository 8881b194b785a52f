//! Parsed message tree.
//!
//! A message is a tree of [`Part`]s: `multipart/*` containers whose children
//! are kept in document order, and leaves carrying decoded payload bytes.

/// Root of a parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Top-level part (a container for multi-part messages).
    pub root: Part,
}

/// One node of the message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// A `multipart/*` node (or an unnamed embedded message). Never written out.
    Container {
        /// Full content type, e.g. `"multipart/mixed"`.
        content_type: String,
        /// Child parts in document order.
        children: Vec<Part>,
    },
    /// A node carrying payload.
    Leaf(Leaf),
}

/// A part carrying payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Lowercased `main/sub` content type (`text/plain` when undeclared).
    pub content_type: String,
    /// Declared filename (Content-Disposition `filename`, else Content-Type `name`).
    pub filename: Option<String>,
    /// Declared charset, lowercased.
    pub charset: Option<String>,
    /// Transfer-decoded payload bytes. No charset conversion has been applied.
    pub payload: Vec<u8>,
}

impl Part {
    /// Full content type of this node.
    pub fn content_type(&self) -> &str {
        match self {
            Part::Container { content_type, .. } => content_type,
            Part::Leaf(leaf) => &leaf.content_type,
        }
    }

    /// Iterate over this node and all its descendants in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

impl Message {
    /// Iterate over every part of the message in document order.
    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    /// Iterate over the leaves only, in document order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.walk().filter_map(|part| match part {
            Part::Leaf(leaf) => Some(leaf),
            Part::Container { .. } => None,
        })
    }
}

/// Pre-order iterator returned by [`Part::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Part>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        if let Part::Container { children, .. } = part {
            // Reversed so the first child is popped next
            self.stack.extend(children.iter().rev());
        }
        Some(part)
    }
}

/// Main type of a `main/sub` content type string.
pub fn main_type(content_type: &str) -> &str {
    content_type.split('/').next().unwrap_or("").trim()
}
