use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;

use uploadguard_core::error::LogLevel;
use uploadguard_core::{
    ScanOutcome, UnavailableReason, ValidationError, ValidationResult, ValidatorConfig,
};

use crate::compatibility::{compatible, expected_mime_types, normalize_mime_type};
use crate::patterns::PatternScanner;
use crate::polyglot;
use crate::sniffer::{MagicSniffer, SignatureSniffer, OCTET_STREAM};
use crate::traits::MalwareScanner;

/// Hex-encoded SHA-256 of the full content.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Upload validator
///
/// Runs the inspection stages in a fixed order and turns the first hard
/// failure, or the accumulated warnings, into one [`ValidationResult`]. Holds
/// only read-only state and can be shared across concurrent uploads.
pub struct UploadValidator {
    config: Arc<ValidatorConfig>,
    sniffer: Arc<dyn SignatureSniffer>,
    patterns: PatternScanner,
    scanner: Option<Arc<dyn MalwareScanner>>,
}

/// What the pipeline has established so far for one file.
struct Inspection {
    file_size: u64,
    content_hash: String,
    detected_mime: String,
    warnings: Vec<String>,
    malware_scan_result: Option<String>,
}

impl Inspection {
    fn new(file_size: u64) -> Self {
        Self {
            file_size,
            content_hash: String::new(),
            detected_mime: String::new(),
            warnings: Vec::new(),
            malware_scan_result: None,
        }
    }

    fn into_result(self, failure: Option<&ValidationError>) -> ValidationResult {
        ValidationResult {
            is_valid: failure.is_none(),
            detected_mime: self.detected_mime,
            file_size: self.file_size,
            content_hash: self.content_hash,
            error_message: failure.map(|e| e.to_string()),
            warnings: self.warnings,
            malware_scan_result: self.malware_scan_result,
        }
    }
}

impl UploadValidator {
    /// Validator with the magic-number sniffer and no malware scanner.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config: Arc::new(config),
            sniffer: Arc::new(MagicSniffer),
            patterns: PatternScanner,
            scanner: None,
        }
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn MalwareScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_sniffer(mut self, sniffer: Arc<dyn SignatureSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Validate an uploaded file.
    ///
    /// Never fails: every outcome, including internal faults of a stage, is
    /// expressed in the returned result.
    #[tracing::instrument(skip(self, content, claimed_content_type), fields(size = content.len()))]
    pub async fn validate(
        &self,
        filename: &str,
        content: &[u8],
        claimed_content_type: Option<&str>,
    ) -> ValidationResult {
        let start = Instant::now();
        let mut inspection = Inspection::new(content.len() as u64);

        match self
            .run(filename, content, claimed_content_type, &mut inspection)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    mime = %inspection.detected_mime,
                    warnings = inspection.warnings.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Upload accepted"
                );
                inspection.into_result(None)
            }
            Err(err) => {
                match err.log_level() {
                    LogLevel::Debug => {
                        tracing::debug!(code = err.error_code(), error = %err, "Upload rejected")
                    }
                    LogLevel::Warn => {
                        tracing::warn!(
                            code = err.error_code(),
                            error = %err,
                            hash = %inspection.content_hash,
                            "Upload rejected"
                        )
                    }
                    LogLevel::Error => {
                        tracing::error!(code = err.error_code(), error = %err, "Upload rejected")
                    }
                }
                inspection.into_result(Some(&err))
            }
        }
    }

    async fn run(
        &self,
        filename: &str,
        content: &[u8],
        claimed_content_type: Option<&str>,
        inspection: &mut Inspection,
    ) -> Result<(), ValidationError> {
        let extension = self.validate_extension(filename)?;
        self.validate_file_size(inspection.file_size)?;

        inspection.content_hash = content_hash(content);

        let detected = self
            .sniffer
            .sniff(content)
            .map_err(|e| ValidationError::DetectionFailed(e.to_string()))?;
        inspection.detected_mime = detected.clone();

        self.validate_mime_type(&detected)?;

        polyglot::check(self.sniffer.as_ref(), content, &detected)?;

        inspection
            .warnings
            .extend(crosscheck_declared_types(&extension, &detected, claimed_content_type));

        for hit in self.patterns.scan(content) {
            tracing::debug!(pattern = hit.name, offset = hit.offset, "Suspicious pattern");
            inspection.warnings.push(hit.warning());
        }

        if let Some(scanner) = &self.scanner {
            let outcome = scanner.scan(content).await;
            inspection.malware_scan_result = Some(outcome.label());
            match outcome {
                ScanOutcome::Clean => {}
                ScanOutcome::Infected(name) => {
                    return Err(ValidationError::MalwareDetected(name));
                }
                ScanOutcome::Unavailable(reason) => {
                    tracing::warn!(
                        scanner = scanner.name(),
                        reason = ?reason,
                        "Malware scan unavailable, accepting without scan"
                    );
                    inspection.warnings.push(unavailable_warning(&reason));
                }
            }
        }

        Ok(())
    }

    /// Validate file extension, returning it lower-cased.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let (_, extension) = filename
            .rsplit_once('.')
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;
        let extension = extension.to_lowercase();

        if !self.config.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.config.sorted_extensions(),
            });
        }

        Ok(extension)
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.config.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate detected MIME type against the allow-list
    pub fn validate_mime_type(&self, mime: &str) -> Result<(), ValidationError> {
        if !self.config.allowed_mime_types.contains(mime) {
            return Err(ValidationError::UnsupportedMimeType(mime.to_string()));
        }
        Ok(())
    }
}

/// Advisory checks of the claimed Content-Type and of the extension against
/// the detected type.
fn crosscheck_declared_types(
    extension: &str,
    detected: &str,
    claimed_content_type: Option<&str>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(claimed) = claimed_content_type
        .map(normalize_mime_type)
        .filter(|c| !c.is_empty())
    {
        // the claim names the container the detected content must fit in
        if claimed != OCTET_STREAM && !compatible(&claimed, detected) {
            tracing::debug!(claimed = %claimed, detected = %detected, "Content-Type mismatch");
            warnings.push(format!(
                "Content-Type mismatch: claimed {}, detected {}",
                claimed, detected
            ));
        }
    }

    let expected = expected_mime_types(extension);
    if !expected.is_empty() && !expected.contains(&detected) {
        warnings.push(format!(
            "Extension '.{}' does not match detected type {}",
            extension, detected
        ));
    }

    warnings
}

fn unavailable_warning(reason: &UnavailableReason) -> String {
    match reason {
        UnavailableReason::Disabled => {
            "Malware scan skipped: scanner is not available".to_string()
        }
        UnavailableReason::Timeout => {
            "Malware scan timed out; file was not scanned".to_string()
        }
        UnavailableReason::Error(e) => {
            format!("Malware scan failed ({}); file was not scanned", e)
        }
    }
}
