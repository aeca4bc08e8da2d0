//! UploadGuard content inspection
//!
//! The stages that look at an uploaded file's bytes: signature sniffing, the
//! MIME consistency matrix, polyglot detection, script-pattern scanning, and
//! the orchestrator that sequences them into one verdict.

pub mod compatibility;
pub mod patterns;
pub mod polyglot;
pub mod sniffer;
pub mod traits;
pub mod validator;

pub use compatibility::{compatible, expected_mime_types, normalize_mime_type};
pub use patterns::{PatternHit, PatternScanner};
pub use sniffer::{MagicSniffer, SignatureSniffer, SniffError, OCTET_STREAM};
pub use traits::MalwareScanner;
pub use validator::{content_hash, UploadValidator};
