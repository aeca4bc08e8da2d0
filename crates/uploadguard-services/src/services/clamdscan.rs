use async_trait::async_trait;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::process::Command;

use uploadguard_core::{ScanOutcome, UnavailableReason};
use uploadguard_processing::MalwareScanner;

/// Scanner that hands the bytes to the `clamdscan` client through a temporary
/// file.
///
/// The temporary file is owned by the scan call and removed when it returns,
/// whether the scan succeeded, failed or timed out.
#[derive(Clone)]
pub struct ClamdscanScanner {
    binary: String,
    timeout: Duration,
}

impl ClamdscanScanner {
    pub fn new(binary: String) -> Self {
        Self::with_timeout(binary, Duration::from_secs(30))
    }

    pub fn with_timeout(binary: String, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// True if `clamdscan --version` runs successfully within the timeout.
    pub async fn probe(&self) -> bool {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .arg("--version")
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, binary = %self.binary, "clamdscan probe failed");
                false
            }
            Err(_) => false,
        }
    }

    fn write_temp_file(data: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("uploadguard-scan-")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(file)
    }
}

/// Signature name from `clamdscan` output such as
/// `/tmp/uploadguard-scan-x: Eicar-Test-Signature FOUND`.
pub fn parse_found_line(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| {
            let line = line.trim().strip_suffix("FOUND")?;
            let (_, name) = line.rsplit_once(": ")?;
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl MalwareScanner for ClamdscanScanner {
    fn name(&self) -> &'static str {
        "clamdscan"
    }

    async fn scan(&self, data: &[u8]) -> ScanOutcome {
        let start = Instant::now();

        let file = match Self::write_temp_file(data) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage file for clamdscan");
                return ScanOutcome::Unavailable(UnavailableReason::Error(format!(
                    "Failed to stage file for scanning: {}",
                    e
                )));
            }
        };

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .args(["--no-summary", "--stream"])
                .arg(file.path())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        let outcome = match output {
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeout.as_secs(),
                    "clamdscan timeout, continuing without scan"
                );
                ScanOutcome::Unavailable(UnavailableReason::Timeout)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, binary = %self.binary, "Failed to run clamdscan");
                ScanOutcome::Unavailable(UnavailableReason::Error(format!(
                    "Failed to run clamdscan: {}",
                    e
                )))
            }
            Ok(Ok(output)) => match output.status.code() {
                Some(0) => {
                    tracing::info!(
                        duration_ms = start.elapsed().as_millis(),
                        "File scan completed: clean"
                    );
                    ScanOutcome::Clean
                }
                Some(1) => {
                    let virus_name = parse_found_line(&String::from_utf8_lossy(&output.stdout));
                    tracing::warn!(
                        duration_ms = start.elapsed().as_millis(),
                        virus = %virus_name,
                        "File scan detected virus"
                    );
                    ScanOutcome::Infected(virus_name)
                }
                code => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::error!(code = ?code, stderr = %stderr.trim(), "clamdscan failed");
                    ScanOutcome::Unavailable(UnavailableReason::Error(format!(
                        "clamdscan exited with {:?}",
                        code
                    )))
                }
            },
        };

        drop(file);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_found_lines() {
        assert_eq!(
            parse_found_line("/tmp/uploadguard-scan-abc: Eicar-Test-Signature FOUND\n"),
            "Eicar-Test-Signature"
        );
        assert_eq!(
            parse_found_line("warning: something\n/tmp/x: Win.Test.EICAR_HDB-1 FOUND"),
            "Win.Test.EICAR_HDB-1"
        );
        assert_eq!(parse_found_line("/tmp/x: OK"), "unknown");
    }

    #[tokio::test]
    async fn missing_binary_is_a_scan_error() {
        let scanner = ClamdscanScanner::new("/nonexistent/uploadguard/clamdscan".to_string());
        assert!(matches!(
            scanner.scan(b"data").await,
            ScanOutcome::Unavailable(UnavailableReason::Error(_))
        ));
        assert!(!scanner.probe().await);
    }
}
