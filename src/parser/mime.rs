//! MIME message parsing: converts the `mail-parser` part arena into a [`Message`] tree.
//!
//! Header parsing, boundaries, RFC 2047/2231 parameter decoding and transfer
//! decoding of binary parts are all left to `mail-parser`. The one thing done
//! here is recovering the transfer-decoded bytes of *text* parts before any
//! charset conversion, because `mail-parser` hands those back already turned
//! into UTF-8.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use mail_parser::{Encoding, MessageParser, MimeHeaders, PartType};
use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::model::part::{main_type, Leaf, Message, Part};

/// Maximum depth of nested containers (to prevent stack overflow on adversarial input).
const MAX_DEPTH: usize = 64;

/// Content type assumed when a part declares none.
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Base64 engine that accepts missing padding and non-zero trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parse a complete raw message (headers + body) into a part tree.
pub fn parse_message(raw_message: &[u8]) -> Result<Message> {
    let parser = MessageParser::default();
    let Some(parsed) = parser.parse(raw_message) else {
        // No header block (empty or headerless input): the whole input is one plain text part
        debug!(bytes = raw_message.len(), "No MIME structure, treating input as text/plain");
        return Ok(Message {
            root: Part::Leaf(Leaf {
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                filename: None,
                charset: None,
                payload: raw_message.to_vec(),
            }),
        });
    };

    debug!(parts = parsed.parts.len(), "Parsed MIME message");
    let root = convert_part(&parsed, parsed.raw_message(), 0, 0)?;
    Ok(Message { root })
}

/// Convert part `id` of `msg` (and everything below it) into a [`Part`].
///
/// `raw` is the buffer the part offsets of `msg` point into. For an embedded
/// message borrowed from its parent that is the parent's buffer, not the
/// embedded message's own slice.
fn convert_part(
    msg: &mail_parser::Message<'_>,
    raw: &[u8],
    id: usize,
    depth: usize,
) -> Result<Part> {
    if depth > MAX_DEPTH {
        return Err(SplitError::MimeError(format!(
            "parts nested deeper than {MAX_DEPTH} levels"
        )));
    }

    let part = msg
        .parts
        .get(id)
        .ok_or_else(|| SplitError::MimeError(format!("missing MIME part #{id}")))?;

    let content_type = content_type_of(part);
    let filename = part
        .attachment_name()
        .filter(|name| !name.is_empty())
        .map(String::from);
    let charset = part
        .content_type()
        .and_then(|ct| ct.attribute("charset"))
        .map(|cs| cs.trim().to_ascii_lowercase())
        .filter(|cs| !cs.is_empty());

    let payload = match &part.body {
        PartType::Multipart(children) => {
            let children = children
                .iter()
                .map(|&child| convert_part(msg, raw, child, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Part::Container {
                content_type,
                children,
            });
        }
        PartType::Message(inner) => {
            if filename.is_none() {
                // An unnamed embedded message is walked like a container
                let inner_raw = offset_buffer(raw, inner.raw_message());
                let root = convert_part(inner, inner_raw, 0, depth + 1)?;
                return Ok(Part::Container {
                    content_type,
                    children: vec![root],
                });
            }
            inner.raw_message().to_vec()
        }
        PartType::Text(_) | PartType::Html(_) => {
            let start = part.offset_body as usize;
            let end = part.offset_end as usize;
            let body = raw.get(start..end).ok_or_else(|| {
                SplitError::MimeError(format!(
                    "body of MIME part #{id} spans {start}..{end}, outside the {}-byte message",
                    raw.len()
                ))
            })?;
            transfer_decode(body, &part.encoding)
        }
        PartType::Binary(data) | PartType::InlineBinary(data) => data.to_vec(),
    };

    // A multipart declaration whose children could not be found is still a container
    if main_type(&content_type) == "multipart" {
        return Ok(Part::Container {
            content_type,
            children: Vec::new(),
        });
    }

    Ok(Part::Leaf(Leaf {
        content_type,
        filename,
        charset,
        payload,
    }))
}

/// Buffer that the part offsets of an embedded message refer to.
///
/// An embedded message borrowed from its parent keeps the parent's
/// coordinates; one that had to be transfer-decoded first owns its bytes and
/// is addressed relative to them.
fn offset_buffer<'r>(parent: &'r [u8], inner: &'r [u8]) -> &'r [u8] {
    let parent_range = parent.as_ptr_range();
    if parent_range.contains(&inner.as_ptr()) || inner.is_empty() {
        parent
    } else {
        inner
    }
}

/// Lowercased `main/sub` content type of a part.
fn content_type_of(part: &mail_parser::MessagePart<'_>) -> String {
    part.content_type()
        .map(|ct: &mail_parser::ContentType| {
            let main = ct.ctype();
            match ct.subtype() {
                Some(sub) => format!("{main}/{sub}"),
                None => main.to_string(),
            }
        })
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Reverse the Content-Transfer-Encoding of a raw body span.
///
/// Undecodable input is returned unchanged.
fn transfer_decode(body: &[u8], encoding: &Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Base64 => decode_base64(body).unwrap_or_else(|| {
            warn!(len = body.len(), "Invalid base64 body, keeping raw bytes");
            body.to_vec()
        }),
        Encoding::QuotedPrintable => {
            quoted_printable::decode(body, quoted_printable::ParseMode::Robust).unwrap_or_else(
                |e| {
                    warn!(error = %e, "Invalid quoted-printable body, keeping raw bytes");
                    body.to_vec()
                },
            )
        }
        Encoding::None => body.to_vec(),
    }
}

/// Decode base64, skipping line breaks and any other non-alphabet bytes.
fn decode_base64(body: &[u8]) -> Option<Vec<u8>> {
    let mut symbols: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();
    // A lone trailing symbol carries less than one byte
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }
    LENIENT_BASE64.decode(&symbols).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_of(part: &Part) -> &Leaf {
        match part {
            Part::Leaf(leaf) => leaf,
            Part::Container { content_type, .. } => panic!("expected leaf, got {content_type}"),
        }
    }

    #[test]
    fn test_decode_base64_ignores_line_breaks() {
        let body = b"SGVsbG8s\r\nIHdvcmxk\r\nIQ==\r\n";
        assert_eq!(decode_base64(body).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_decode_base64_missing_padding() {
        assert_eq!(decode_base64(b"SGk").unwrap(), b"Hi");
        assert_eq!(decode_base64(b"/w==").unwrap(), [0xFF]);
    }

    #[test]
    fn test_transfer_decode_quoted_printable() {
        let body = b"Caf=C3=A9 soft=\r\nbreak";
        assert_eq!(
            transfer_decode(body, &Encoding::QuotedPrintable),
            "Café softbreak".as_bytes()
        );
    }

    #[test]
    fn test_transfer_decode_identity() {
        assert_eq!(transfer_decode(b"plain", &Encoding::None), b"plain");
    }

    #[test]
    fn test_parse_single_part_message() {
        let raw = b"From: a@example.com\r\nSubject: Hi\r\nContent-Type: text/plain; charset=ISO-8859-1\r\nContent-Transfer-Encoding: quoted-printable\r\n\r\nFran=E7ois\r\n";
        let message = parse_message(raw).unwrap();
        let leaf = leaf_of(&message.root);
        assert_eq!(leaf.content_type, "text/plain");
        assert_eq!(leaf.charset.as_deref(), Some("iso-8859-1"));
        assert!(leaf.filename.is_none());
        // Charset conversion is not applied at this stage
        assert!(leaf.payload.starts_with(b"Fran\xE7ois"));
    }

    #[test]
    fn test_parse_multipart_with_attachment() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n",
            "\r\n",
            "--XYZ\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "Hello\r\n",
            "--XYZ\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "JVBERi0xLjQK\r\n",
            "--XYZ--\r\n",
        );
        let message = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(message.root.content_type(), "multipart/mixed");

        let leaves: Vec<&Leaf> = message.leaves().collect();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].content_type, "text/plain");
        assert_eq!(leaves[0].charset.as_deref(), Some("utf-8"));
        assert_eq!(leaves[0].payload, b"Hello");
        assert_eq!(leaves[1].filename.as_deref(), Some("report.pdf"));
        assert_eq!(leaves[1].payload, b"%PDF-1.4\n");
    }

    #[test]
    fn test_parse_missing_content_type_defaults_to_text_plain() {
        let raw = b"Subject: none\r\n\r\nbody\r\n";
        let message = parse_message(raw).unwrap();
        assert_eq!(leaf_of(&message.root).content_type, "text/plain");
        assert!(leaf_of(&message.root).charset.is_none());
    }

    #[test]
    fn test_parse_embedded_message_text_parts() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
            "\r\n",
            "--outer\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "cover note\r\n",
            "--outer\r\n",
            "Content-Type: message/rfc822\r\n",
            "\r\n",
            "From: b@example.com\r\n",
            "Content-Type: multipart/mixed; boundary=\"inner\"\r\n",
            "\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "forwarded text\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Disposition: attachment; filename=\"inner.txt\"\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "inner attachment =C3=A9\r\n",
            "--inner--\r\n",
            "--outer--\r\n",
        );
        let message = parse_message(raw.as_bytes()).unwrap();

        let leaves: Vec<&Leaf> = message.leaves().collect();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].payload, b"cover note");
        assert_eq!(leaves[1].payload, b"forwarded text");
        assert_eq!(leaves[2].filename.as_deref(), Some("inner.txt"));
        assert_eq!(leaves[2].payload, "inner attachment é".as_bytes());
    }

    #[test]
    fn test_offset_buffer_keeps_parent_for_borrowed_slice() {
        let parent = b"outer header\r\n\r\ninner message".as_slice();
        let inner = &parent[16..];
        assert_eq!(offset_buffer(parent, inner).as_ptr(), parent.as_ptr());

        let owned = b"decoded inner".to_vec();
        assert_eq!(offset_buffer(parent, &owned).as_ptr(), owned.as_ptr());
    }

    #[test]
    fn test_empty_input_is_empty_text_part() {
        let message = parse_message(b"").unwrap();
        let leaf = leaf_of(&message.root);
        assert_eq!(leaf.content_type, "text/plain");
        assert!(leaf.payload.is_empty());
    }

    #[test]
    fn test_headerless_input_is_text_part() {
        let message = parse_message(b"just some text\n").unwrap();
        let leaf = leaf_of(&message.root);
        assert_eq!(leaf.content_type, "text/plain");
        assert!(leaf.filename.is_none());
        assert!(leaf.charset.is_none());
        assert_eq!(leaf.payload, b"just some text\n");
    }
}
