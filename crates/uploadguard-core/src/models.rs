//! Result model handed back to the upload route.

use serde::{Deserialize, Serialize};

pub const SCAN_CLEAN: &str = "CLEAN";
pub const SCAN_DISABLED: &str = "SCAN_DISABLED";
pub const SCAN_TIMEOUT: &str = "SCAN_TIMEOUT";
pub const SCAN_ERROR: &str = "SCAN_ERROR";

/// Verdict for one uploaded file.
///
/// Produced exactly once per call to the validator. `error_message` is present
/// iff `is_valid` is false; `warnings` holds advisory observations in the order
/// the pipeline made them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// MIME type established from the byte content; empty if the pipeline
    /// stopped before detection.
    pub detected_mime: String,
    pub file_size: u64,
    /// Hex SHA-256 of the full content; empty if the pipeline stopped before
    /// hashing.
    pub content_hash: String,
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
    pub malware_scan_result: Option<String>,
}

impl ValidationResult {
    /// The scan annotation is a signature name when the file was rejected as
    /// infected.
    pub fn is_infected(&self) -> bool {
        match self.malware_scan_result.as_deref() {
            None => false,
            Some(label) => ![SCAN_CLEAN, SCAN_DISABLED, SCAN_TIMEOUT, SCAN_ERROR].contains(&label),
        }
    }
}

/// Why the external scanner could not give an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Not configured, not installed, or unreachable at startup
    Disabled,
    Timeout,
    Error(String),
}

/// Outcome of one malware scan call-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    Infected(String),
    Unavailable(UnavailableReason),
}

impl ScanOutcome {
    /// Annotation stored in `ValidationResult::malware_scan_result`.
    pub fn label(&self) -> String {
        match self {
            ScanOutcome::Clean => SCAN_CLEAN.to_string(),
            ScanOutcome::Infected(name) => name.clone(),
            ScanOutcome::Unavailable(UnavailableReason::Disabled) => SCAN_DISABLED.to_string(),
            ScanOutcome::Unavailable(UnavailableReason::Timeout) => SCAN_TIMEOUT.to_string(),
            ScanOutcome::Unavailable(UnavailableReason::Error(_)) => SCAN_ERROR.to_string(),
        }
    }
}
