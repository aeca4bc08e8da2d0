//! UploadGuard Core Library
//!
//! This crate provides the result model, error types and configuration that are
//! shared by the validation pipeline, the scanner adapters and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{MalwareScanConfig, ScanBackend, ValidatorConfig};
pub use error::ValidationError;
pub use models::{ScanOutcome, UnavailableReason, ValidationResult};
