//! Guess a file extension from a MIME content type.

use std::collections::BTreeMap;

/// Built-in content type → extension table (leading dot included).
const EXTENSIONS: &[(&str, &str)] = &[
    ("application/gzip", ".gz"),
    ("application/javascript", ".js"),
    ("application/json", ".json"),
    ("application/msword", ".doc"),
    ("application/octet-stream", ".bin"),
    ("application/pdf", ".pdf"),
    ("application/pgp-signature", ".asc"),
    ("application/pkcs7-mime", ".p7m"),
    ("application/pkcs7-signature", ".p7s"),
    ("application/postscript", ".ps"),
    ("application/rtf", ".rtf"),
    ("application/vnd.ms-excel", ".xls"),
    ("application/vnd.ms-powerpoint", ".ppt"),
    ("application/vnd.oasis.opendocument.spreadsheet", ".ods"),
    ("application/vnd.oasis.opendocument.text", ".odt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/x-7z-compressed", ".7z"),
    ("application/x-tar", ".tar"),
    ("application/xml", ".xml"),
    ("application/zip", ".zip"),
    ("audio/mpeg", ".mp3"),
    ("audio/ogg", ".ogg"),
    ("audio/wav", ".wav"),
    ("audio/x-wav", ".wav"),
    ("image/bmp", ".bmp"),
    ("image/gif", ".gif"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/svg+xml", ".svg"),
    ("image/tiff", ".tiff"),
    ("image/webp", ".webp"),
    ("image/x-icon", ".ico"),
    ("message/rfc822", ".eml"),
    ("text/calendar", ".ics"),
    ("text/css", ".css"),
    ("text/csv", ".csv"),
    ("text/html", ".html"),
    ("text/markdown", ".md"),
    ("text/plain", ".txt"),
    ("text/rtf", ".rtf"),
    ("text/vcard", ".vcf"),
    ("text/x-vcard", ".vcf"),
    ("text/xml", ".xml"),
    ("video/mp4", ".mp4"),
    ("video/mpeg", ".mpeg"),
    ("video/quicktime", ".mov"),
];

/// Guess the extension for `content_type`, consulting `overrides` first.
///
/// Parameters after `;` are ignored and matching is case-insensitive.
/// Returns an empty string when the type is unknown.
pub fn guess_extension(content_type: &str, overrides: &BTreeMap<String, String>) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if let Some(ext) = overrides.get(&essence) {
        return ext.clone();
    }

    EXTENSIONS
        .binary_search_by(|(ctype, _)| (*ctype).cmp(essence.as_str()))
        .map(|idx| EXTENSIONS[idx].1.to_string())
        .unwrap_or_default()
}
