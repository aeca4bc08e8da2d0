#[cfg(feature = "clamav")]
pub mod clamav;
#[cfg(feature = "clamdscan")]
pub mod clamdscan;

use async_trait::async_trait;
use std::sync::Arc;
#[cfg(any(feature = "clamav", feature = "clamdscan"))]
use std::time::Duration;

use uploadguard_core::{MalwareScanConfig, ScanBackend, ScanOutcome, UnavailableReason};
use uploadguard_processing::MalwareScanner;

#[cfg(feature = "clamav")]
pub use clamav::ClamAVScanner;
#[cfg(feature = "clamdscan")]
pub use clamdscan::ClamdscanScanner;

/// Stand-in used when scanning was requested but the backend cannot be
/// reached. Every scan reports `SCAN_DISABLED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledScanner;

#[async_trait]
impl MalwareScanner for DisabledScanner {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn scan(&self, _data: &[u8]) -> ScanOutcome {
        ScanOutcome::Unavailable(UnavailableReason::Disabled)
    }
}

/// Build the scanner for the configured backend.
///
/// Returns `None` when scanning is turned off. When it is turned on but the
/// backend does not answer its probe, logs once and returns [`DisabledScanner`].
pub async fn scanner_from_config(config: &MalwareScanConfig) -> Option<Arc<dyn MalwareScanner>> {
    if !config.enabled {
        tracing::info!("Malware scanning disabled");
        return None;
    }

    let scanner: Option<Arc<dyn MalwareScanner>> = match config.backend {
        #[cfg(feature = "clamav")]
        ScanBackend::Tcp => {
            let scanner = ClamAVScanner::with_timeout(
                config.clamav_host.clone(),
                config.clamav_port,
                Duration::from_secs(config.timeout_secs),
            );
            if scanner.ping().await {
                Some(Arc::new(scanner))
            } else {
                None
            }
        }
        #[cfg(feature = "clamdscan")]
        ScanBackend::Command => {
            let scanner = ClamdscanScanner::with_timeout(
                config.clamdscan_path.clone(),
                Duration::from_secs(config.timeout_secs),
            );
            if scanner.probe().await {
                Some(Arc::new(scanner))
            } else {
                None
            }
        }
        #[allow(unreachable_patterns)]
        _ => None,
    };

    match scanner {
        Some(scanner) => {
            tracing::info!(backend = scanner.name(), "Malware scanning enabled");
            Some(scanner)
        }
        None => {
            tracing::warn!(
                backend = ?config.backend,
                host = %config.clamav_host,
                port = config.clamav_port,
                "Malware scanner unreachable, scanning disabled"
            );
            Some(Arc::new(DisabledScanner))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_config_builds_no_scanner() {
        let config = MalwareScanConfig::default();
        assert!(scanner_from_config(&config).await.is_none());
    }

    #[cfg(feature = "clamdscan")]
    #[tokio::test]
    async fn unreachable_backend_downgrades_to_disabled() {
        let config = MalwareScanConfig {
            enabled: true,
            backend: ScanBackend::Command,
            clamdscan_path: "/nonexistent/uploadguard/clamdscan".to_string(),
            timeout_secs: 5,
            ..MalwareScanConfig::default()
        };

        let scanner = scanner_from_config(&config).await.unwrap();
        assert_eq!(scanner.name(), "disabled");
        assert_eq!(
            scanner.scan(b"data").await,
            ScanOutcome::Unavailable(UnavailableReason::Disabled)
        );
    }
}
