//! MIME consistency matrix.
//!
//! Decides which pairs of MIME types may legitimately appear together, and
//! which MIME types each file extension is expected to carry.

use crate::sniffer::{IMAGE_SVG, OCTET_STREAM, TEXT_PLAIN, TEXT_XML};

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Cross-category pairs that are tolerated, as `(container, content)`.
///
/// Closed list. A new compound format goes here only after deciding that its
/// cross-category content cannot be used to smuggle an active payload.
pub const COMPATIBLE_PAIRS: &[(&str, &str)] = &[
    // PDF bodies are text object syntax, compressed streams and XMP metadata
    ("application/pdf", TEXT_PLAIN),
    ("application/pdf", TEXT_XML),
    // ZIP-based compound documents carry XML parts
    ("application/zip", TEXT_XML),
    (DOCX, TEXT_XML),
    (XLSX, TEXT_XML),
    (PPTX, TEXT_XML),
    // SVG is XML text
    (IMAGE_SVG, TEXT_XML),
    (IMAGE_SVG, TEXT_PLAIN),
    // XMP packets and tEXt/iTXt chunks embedded in raster images
    ("image/jpeg", TEXT_PLAIN),
    ("image/jpeg", TEXT_XML),
    ("image/png", TEXT_PLAIN),
    ("image/png", TEXT_XML),
    ("image/gif", TEXT_PLAIN),
    ("image/gif", TEXT_XML),
    ("image/webp", TEXT_PLAIN),
    ("image/webp", TEXT_XML),
    ("image/tiff", TEXT_PLAIN),
    ("image/tiff", TEXT_XML),
    // compressed media bodies carry no signature of their own
    ("image/jpeg", OCTET_STREAM),
    ("image/png", OCTET_STREAM),
    ("image/gif", OCTET_STREAM),
    ("image/webp", OCTET_STREAM),
    ("image/avif", OCTET_STREAM),
    ("image/bmp", OCTET_STREAM),
    ("image/tiff", OCTET_STREAM),
    ("video/mp4", OCTET_STREAM),
    ("video/webm", OCTET_STREAM),
    ("video/quicktime", OCTET_STREAM),
    ("audio/mpeg", OCTET_STREAM),
    ("audio/ogg", OCTET_STREAM),
    ("audio/x-wav", OCTET_STREAM),
    ("audio/x-flac", OCTET_STREAM),
];

/// Normalize MIME type by stripping parameters and case folding
/// (e.g. "Image/JPEG; charset=binary" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

fn top_level(mime: &str) -> &str {
    mime.split('/').next().unwrap_or(mime)
}

/// Identical, or sharing a non-empty top-level category.
fn same_category(a: &str, b: &str) -> bool {
    a == b || (!a.is_empty() && top_level(a) == top_level(b))
}

/// Whether `content` may appear where `container` was established.
///
/// Identical types and types in the same top-level category are compatible;
/// across categories only the pairs in [`COMPATIBLE_PAIRS`] are.
pub fn compatible(container: &str, content: &str) -> bool {
    if same_category(container, content) {
        return true;
    }

    COMPATIBLE_PAIRS
        .iter()
        .any(|(outer, inner)| *outer == container && *inner == content)
}

/// MIME types a file extension is expected to carry. Empty for unknown
/// extensions.
pub fn expected_mime_types(extension: &str) -> &'static [&'static str] {
    match extension.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" | "jpe" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "avif" => &["image/avif"],
        "svg" => &[IMAGE_SVG],
        "bmp" => &["image/bmp"],
        "tif" | "tiff" => &["image/tiff"],
        "ico" => &["image/x-icon", "image/vnd.microsoft.icon"],
        // Videos
        "mp4" | "m4v" => &["video/mp4"],
        "webm" => &["video/webm"],
        "mov" => &["video/quicktime"],
        // Audio
        "mp3" => &["audio/mpeg"],
        "wav" => &["audio/x-wav", "audio/wav"],
        "ogg" => &["audio/ogg"],
        "flac" => &["audio/x-flac", "audio/flac"],
        // Documents
        "pdf" => &["application/pdf"],
        "docx" => &[DOCX, "application/zip"],
        "xlsx" => &[XLSX, "application/zip"],
        "pptx" => &[PPTX, "application/zip"],
        "txt" => &[TEXT_PLAIN],
        "xml" => &[TEXT_XML],
        "zip" => &["application/zip"],
        _ => &[],
    }
}
