use async_trait::async_trait;
use clamav_client::{clean, TransportProtocol};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::str;
use std::time::{Duration, Instant};

use uploadguard_core::{ScanOutcome, UnavailableReason};
use uploadguard_processing::MalwareScanner;

/// clamd reached over its TCP socket.
#[derive(Clone)]
pub struct ClamAVScanner {
    host: String,
    port: u16,
    /// Upper bound for each scan operation (default: 30 seconds)
    timeout: Duration,
}

impl ClamAVScanner {
    /// Create a new ClamAVScanner.
    ///
    /// # Arguments
    /// * `host` - ClamAV daemon hostname
    /// * `port` - ClamAV daemon port (typically 3310)
    pub fn new(host: String, port: u16) -> Self {
        Self::with_timeout(host, port, Duration::from_secs(30))
    }

    /// Create with a custom scan timeout (for large files or slow ClamAV instances).
    pub fn with_timeout(host: String, port: u16, timeout: Duration) -> Self {
        Self {
            host,
            port,
            timeout,
        }
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn transport(&self) -> TimedTcp {
        TimedTcp {
            address: self.address(),
            timeout: self.timeout,
        }
    }

    /// Send `PING` to the daemon; true if it answered `PONG` within the timeout.
    pub async fn ping(&self) -> bool {
        let transport = self.transport();
        let result = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || clamav_client::ping(transport)),
        )
        .await;

        match result {
            Ok(Ok(Ok(response))) => response.starts_with(b"PONG"),
            Ok(Ok(Err(e))) => {
                tracing::debug!(error = %e, address = %self.address(), "ClamAV ping failed");
                false
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "ClamAV ping task failed");
                false
            }
            Err(_) => false,
        }
    }
}

/// TCP transport whose connect, reads and writes are each bounded by
/// `timeout`.
///
/// The scan runs on the blocking pool and outlives the async timeout that
/// abandons it; the socket timeouts make that thread give up on a hung daemon
/// instead of blocking forever.
struct TimedTcp {
    address: String,
    timeout: Duration,
}

impl TransportProtocol for TimedTcp {
    type Stream = TcpStream;

    fn connect(&self) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} did not resolve to any address", self.address),
            )
        }))
    }
}

/// Extract the signature name from a clamd reply such as
/// `stream: Eicar-Test-Signature FOUND`.
pub fn parse_signature_name(response: &str) -> String {
    if !response.contains("FOUND") {
        return "unknown".to_string();
    }
    response
        .split(':')
        .nth(1)
        .unwrap_or("unknown")
        .split_whitespace()
        .next()
        .filter(|name| *name != "FOUND")
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl MalwareScanner for ClamAVScanner {
    fn name(&self) -> &'static str {
        "clamd-tcp"
    }

    /// Scan in-memory data using sync API inside spawn_blocking to avoid !Send tokio futures.
    async fn scan(&self, data: &[u8]) -> ScanOutcome {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = %self.port, "Starting ClamAV scan");
        let data = data.to_vec();
        let transport = self.transport();

        let result = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                match clamav_client::scan_buffer(data.as_slice(), transport, None) {
                    Ok(response_bytes) => match clean(&response_bytes) {
                        Ok(true) => {
                            tracing::info!(
                                duration_ms = start.elapsed().as_millis(),
                                "File scan completed: clean"
                            );
                            ScanOutcome::Clean
                        }
                        Ok(false) => {
                            let response_str = match str::from_utf8(&response_bytes) {
                                Ok(s) => s.trim_end_matches('\0').trim(),
                                Err(_) => "unknown",
                            };
                            let virus_name = parse_signature_name(response_str);
                            tracing::warn!(
                                duration_ms = start.elapsed().as_millis(),
                                virus = %virus_name,
                                "File scan detected virus"
                            );
                            ScanOutcome::Infected(virus_name)
                        }
                        Err(e) => {
                            let error_msg = format!("Failed to parse ClamAV response: {}", e);
                            tracing::error!(error = %error_msg, "Failed to parse ClamAV response");
                            ScanOutcome::Unavailable(UnavailableReason::Error(error_msg))
                        }
                    },
                    Err(e) => {
                        let error_msg = format!("ClamAV scan error: {}", e);
                        tracing::error!(error = %error_msg, "ClamAV scan failed");
                        ScanOutcome::Unavailable(UnavailableReason::Error(error_msg))
                    }
                }
            }),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                let error_msg = format!("ClamAV scan task join error: {}", e);
                tracing::error!(error = %error_msg, "ClamAV scan panicked");
                ScanOutcome::Unavailable(UnavailableReason::Error(error_msg))
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeout.as_secs(),
                    "ClamAV scan timeout, continuing without scan"
                );
                ScanOutcome::Unavailable(UnavailableReason::Timeout)
            }
        }
    }
}
