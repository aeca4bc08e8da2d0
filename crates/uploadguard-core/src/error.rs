//! Error types module
//!
//! Every hard failure of the validation pipeline is a `ValidationError`. The
//! orchestrator never returns these to its caller directly: the `Display` text
//! of the first failure becomes `ValidationResult::error_message`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for cheap rejections of malformed input
    Debug,
    /// Warning level - for type mismatches, polyglots and malware
    Warn,
    /// Error level - for unexpected failures of an inspection primitive
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid filename: {0} (a file extension is required)")]
    InvalidFilename(String),

    #[error("Invalid file extension: {} (allowed: {})", .extension, .allowed.join(", "))]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Failed to detect file type: {0}")]
    DetectionFailed(String),

    #[error("File type not allowed: {0}")]
    UnsupportedMimeType(String),

    #[error("Polyglot file detected: content at offset {offset} looks like {found}, expected {expected}")]
    PolyglotDetected {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("Malware detected: {0}")]
    MalwareDetected(String),
}

impl ValidationError {
    /// Machine-readable error code (e.g., "POLYGLOT_DETECTED")
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidFilename(_) => "INVALID_FILENAME",
            ValidationError::InvalidExtension { .. } => "INVALID_EXTENSION",
            ValidationError::EmptyFile => "EMPTY_FILE",
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::DetectionFailed(_) => "DETECTION_FAILED",
            ValidationError::UnsupportedMimeType(_) => "UNSUPPORTED_MIME_TYPE",
            ValidationError::PolyglotDetected { .. } => "POLYGLOT_DETECTED",
            ValidationError::MalwareDetected(_) => "MALWARE_DETECTED",
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            ValidationError::InvalidFilename(_)
            | ValidationError::InvalidExtension { .. }
            | ValidationError::EmptyFile
            | ValidationError::FileTooLarge { .. } => LogLevel::Debug,
            ValidationError::UnsupportedMimeType(_)
            | ValidationError::PolyglotDetected { .. }
            | ValidationError::MalwareDetected(_) => LogLevel::Warn,
            ValidationError::DetectionFailed(_) => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyglot_message_names_offset_and_types() {
        let err = ValidationError::PolyglotDetected {
            offset: 4096,
            expected: "image/png".to_string(),
            found: "text/html".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("4096"));
        assert!(msg.contains("image/png"));
        assert!(msg.contains("text/html"));
        assert_eq!(err.error_code(), "POLYGLOT_DETECTED");
    }

    #[test]
    fn extension_message_lists_allowed() {
        let err = ValidationError::InvalidExtension {
            extension: "exe".to_string(),
            allowed: vec!["jpg".to_string(), "png".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid file extension: exe (allowed: jpg, png)"
        );
    }

    #[test]
    fn malformed_input_logs_at_debug() {
        assert_eq!(ValidationError::EmptyFile.log_level(), LogLevel::Debug);
        assert_eq!(
            ValidationError::MalwareDetected("Eicar".to_string()).log_level(),
            LogLevel::Warn
        );
        assert_eq!(
            ValidationError::DetectionFailed("boom".to_string()).log_level(),
            LogLevel::Error
        );
    }
}
