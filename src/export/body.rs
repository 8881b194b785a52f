//! Body sink: charset-decode the body part and write it to the primary output.

use std::borrow::Cow;
use std::io::Write;

use crate::error::{Result, SplitError};

/// Decode `payload` with `charset` and write the text to `out`, then flush.
///
/// Nothing is written when decoding fails. Returns the number of bytes written.
pub fn write_body<W: Write>(out: &mut W, payload: &[u8], charset: &str) -> Result<u64> {
    let text = decode_text(payload, charset)?;
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(SplitError::Output)?;
    Ok(text.len() as u64)
}

/// Strictly decode bytes using a named charset.
///
/// Unlike display-oriented decoding, malformed input is an error rather than
/// being replaced with U+FFFD.
pub fn decode_text<'a>(payload: &'a [u8], charset: &str) -> Result<Cow<'a, str>> {
    let label = charset.trim().to_ascii_lowercase();
    let invalid = || SplitError::Decode {
        charset: charset.to_string(),
    };

    match label.as_str() {
        // WHATWG maps these labels to windows-1252, which accepts every byte
        "ascii" | "us-ascii" | "us" | "646" | "ansi_x3.4-1968" => {
            if payload.is_ascii() {
                std::str::from_utf8(payload)
                    .map(Cow::Borrowed)
                    .map_err(|_| invalid())
            } else {
                Err(invalid())
            }
        }
        "latin-1" | "latin1" | "l1" | "iso-8859-1" | "iso8859-1" | "iso_8859-1" => {
            Ok(Cow::Owned(payload.iter().map(|&b| char::from(b)).collect()))
        }
        _ => {
            let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| SplitError::UnsupportedEncoding(charset.to_string()))?;
            encoding
                .decode_without_bom_handling_and_without_replacement(payload)
                .ok_or_else(invalid)
        }
    }
}
