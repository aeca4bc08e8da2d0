//! UploadGuard Services Layer
//!
//! Infrastructure adapters for the validation pipeline: the malware scanner
//! backends and the startup factory that picks one from configuration.

pub mod services;

#[cfg(feature = "clamav")]
pub use services::clamav::ClamAVScanner;
#[cfg(feature = "clamdscan")]
pub use services::clamdscan::ClamdscanScanner;
pub use services::{scanner_from_config, DisabledScanner};
