//! Content-based MIME detection.
//!
//! The sniffer never looks at the filename. Binary formats are recognised by
//! their magic numbers (via `infer`); content without a binary signature is
//! classified as markup, plain text, or the generic `application/octet-stream`.

use infer::MatcherType;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_XML: &str = "text/xml";
pub const IMAGE_SVG: &str = "image/svg+xml";

/// Markers of an active HTML document. Any of these anywhere in unsigned
/// content makes it `text/html`.
const HTML_MARKERS: &[&[u8]] = &[
    b"<!doctype html",
    b"<html",
    b"<head",
    b"<body",
    b"<script",
    b"<iframe",
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Signatures decided by this many leading bytes or fewer are coincidental
/// often enough in compressed data that they only count at offset zero.
const SHORT_SIGNATURE_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SniffError {
    #[error("signature matcher failed: {0}")]
    Matcher(String),
}

/// Determines the MIME type implied by a byte buffer's content.
///
/// No match is a normal outcome and yields [`OCTET_STREAM`]; `Err` is reserved
/// for failures of the detection primitive itself.
pub trait SignatureSniffer: Send + Sync {
    fn sniff(&self, bytes: &[u8]) -> Result<String, SniffError>;

    /// Sniff a window that starts inside a file rather than at its first byte.
    fn sniff_embedded(&self, bytes: &[u8]) -> Result<String, SniffError> {
        self.sniff(bytes)
    }
}

/// Magic-number sniffer backed by `infer`, with a text/markup fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicSniffer;

impl SignatureSniffer for MagicSniffer {
    fn sniff(&self, bytes: &[u8]) -> Result<String, SniffError> {
        Ok(detect(bytes, false).to_string())
    }

    /// Like [`sniff`](Self::sniff), but ignores binary signatures of
    /// [`SHORT_SIGNATURE_LEN`] bytes or fewer (MZ, cpio, COFF, MP3 frame sync).
    fn sniff_embedded(&self, bytes: &[u8]) -> Result<String, SniffError> {
        Ok(detect(bytes, true).to_string())
    }
}

fn detect(bytes: &[u8], embedded: bool) -> &'static str {
    if bytes.is_empty() {
        return OCTET_STREAM;
    }

    // infer's own text matchers are skipped so markup is classified in one place
    if let Some(kind) = infer::get(bytes) {
        if !matches!(kind.matcher_type(), MatcherType::Text)
            && !(embedded && has_short_signature(bytes, kind.mime_type()))
        {
            return kind.mime_type();
        }
    }

    classify_unsigned(bytes)
}

/// Whether the leading bytes alone already satisfy a matcher for `mime`.
fn has_short_signature(bytes: &[u8], mime: &str) -> bool {
    let prefix = &bytes[..bytes.len().min(SHORT_SIGNATURE_LEN)];
    infer::is_mime(prefix, mime)
}

fn classify_unsigned(bytes: &[u8]) -> &'static str {
    if HTML_MARKERS
        .iter()
        .any(|marker| contains_ignore_ascii_case(bytes, marker))
    {
        return TEXT_HTML;
    }

    let head = trim_leading_whitespace(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes));
    if starts_with_ignore_ascii_case(head, b"<svg") {
        return IMAGE_SVG;
    }
    if starts_with_ignore_ascii_case(head, b"<?xml") {
        return if contains_ignore_ascii_case(head, b"<svg") {
            IMAGE_SVG
        } else {
            TEXT_XML
        };
    }

    if is_plain_text(bytes) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Valid UTF-8 without control bytes other than tab, newline, form feed and
/// carriage return. A window cut out of a larger buffer may start or end in
/// the middle of a multi-byte sequence; those partial sequences are tolerated.
fn is_plain_text(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .take(3)
        .take_while(|b| (0x80..0xC0).contains(*b))
        .count();
    let body = &bytes[start..];

    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            // truncated sequence at the very end
            match std::str::from_utf8(&body[..e.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    !text.is_empty()
        && !text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0c'))
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn starts_with_ignore_ascii_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len()
        && haystack
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
}
