//! Traits for the validation pipeline

use async_trait::async_trait;
use uploadguard_core::ScanOutcome;

/// Optional malware scanner (e.g. ClamAV). Implemented by the services crate.
///
/// Infrastructure problems are reported as `ScanOutcome::Unavailable`, never
/// as a detection.
#[async_trait]
pub trait MalwareScanner: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    async fn scan(&self, data: &[u8]) -> ScanOutcome;
}
