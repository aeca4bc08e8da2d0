//! Configuration module
//!
//! The validator is configured once at process startup. `ValidatorConfig` is
//! built either explicitly or from the environment, checked with `validate()`,
//! and then handed to the orchestrator, which never mutates it.

use std::collections::HashSet;
use std::env;

const MAX_FILE_SIZE_MB: u64 = 10;
const MALWARE_SCAN_TIMEOUT_SECS: u64 = 30;
const CLAMAV_PORT: u16 = 3310;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp,pdf";
pub const DEFAULT_ALLOWED_MIME_TYPES: &str =
    "image/jpeg,image/png,image/gif,image/webp,application/pdf";

/// How the malware scanner is reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanBackend {
    /// clamd over its TCP socket
    Tcp,
    /// the `clamdscan` client binary
    Command,
}

impl ScanBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "tcp" => Some(ScanBackend::Tcp),
            "command" | "clamdscan" => Some(ScanBackend::Command),
            _ => None,
        }
    }
}

/// Malware scan adapter configuration
#[derive(Clone, Debug)]
pub struct MalwareScanConfig {
    pub enabled: bool,
    pub backend: ScanBackend,
    pub clamav_host: String,
    pub clamav_port: u16,
    pub clamdscan_path: String,
    /// Upper bound for one scan call-out
    pub timeout_secs: u64,
}

impl Default for MalwareScanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: ScanBackend::Tcp,
            clamav_host: "localhost".to_string(),
            clamav_port: CLAMAV_PORT,
            clamdscan_path: "clamdscan".to_string(),
            timeout_secs: MALWARE_SCAN_TIMEOUT_SECS,
        }
    }
}

/// Validator configuration
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    pub max_file_size: u64,
    /// Lower-cased, without leading dot
    pub allowed_extensions: HashSet<String>,
    pub allowed_mime_types: HashSet<String>,
    pub malware_scan: MalwareScanConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: parse_list(DEFAULT_ALLOWED_EXTENSIONS),
            allowed_mime_types: parse_list(DEFAULT_ALLOWED_MIME_TYPES),
            malware_scan: MalwareScanConfig::default(),
        }
    }
}

/// Split a comma separated list, trimming, lower-casing and dropping leading dots.
pub fn parse_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn megabytes_to_bytes(megabytes: u64) -> Result<u64, anyhow::Error> {
    megabytes.checked_mul(1024 * 1024).ok_or_else(|| {
        anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {} megabytes", megabytes)
    })
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

impl ValidatorConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a whole number of megabytes"))?;

        let backend_str = env::var("MALWARE_SCAN_BACKEND").unwrap_or_else(|_| "tcp".to_string());
        let backend = ScanBackend::parse(&backend_str).ok_or_else(|| {
            anyhow::anyhow!(
                "MALWARE_SCAN_BACKEND must be 'tcp' or 'command', got '{}'",
                backend_str
            )
        })?;

        let malware_scan = MalwareScanConfig {
            enabled: parse_bool(
                &env::var("ENABLE_MALWARE_SCAN").unwrap_or_else(|_| "false".to_string()),
                false,
            ),
            backend,
            clamav_host: env::var("CLAMAV_HOST").unwrap_or_else(|_| "localhost".to_string()),
            clamav_port: env::var("CLAMAV_PORT")
                .unwrap_or_else(|_| CLAMAV_PORT.to_string())
                .parse()
                .unwrap_or(CLAMAV_PORT),
            clamdscan_path: env::var("CLAMDSCAN_PATH")
                .unwrap_or_else(|_| "clamdscan".to_string()),
            timeout_secs: env::var("MALWARE_SCAN_TIMEOUT_SECS")
                .unwrap_or_else(|_| MALWARE_SCAN_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MALWARE_SCAN_TIMEOUT_SECS),
        };

        let config = ValidatorConfig {
            max_file_size: megabytes_to_bytes(max_file_size_mb)?,
            allowed_extensions: parse_list(
                &env::var("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
            ),
            allowed_mime_types: parse_list(
                &env::var("ALLOWED_MIME_TYPES")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_MIME_TYPES.to_string()),
            ),
            malware_scan,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE must be greater than zero"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if self.allowed_mime_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_MIME_TYPES must not be empty"));
        }

        if self.malware_scan.enabled && self.malware_scan.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "MALWARE_SCAN_TIMEOUT_SECS must be greater than zero when scanning is enabled"
            ));
        }

        Ok(())
    }

    /// Allowed extensions in a stable order, for messages.
    pub fn sorted_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.allowed_extensions.iter().cloned().collect();
        extensions.sort();
        extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_normalizes_entries() {
        let list = parse_list(" .JPG, png ,,Pdf ");
        assert_eq!(list.len(), 3);
        assert!(list.contains("jpg"));
        assert!(list.contains("png"));
        assert!(list.contains("pdf"));
    }

    #[test]
    fn default_config_is_valid() {
        let config = ValidatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.allowed_mime_types.contains("application/pdf"));
        assert!(!config.malware_scan.enabled);
    }

    #[test]
    fn validate_rejects_empty_allow_lists() {
        let config = ValidatorConfig {
            allowed_extensions: HashSet::new(),
            ..ValidatorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ValidatorConfig {
            allowed_mime_types: HashSet::new(),
            ..ValidatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = ValidatorConfig {
            max_file_size: 0,
            ..ValidatorConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ValidatorConfig::default();
        config.malware_scan.enabled = true;
        config.malware_scan.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn megabytes_convert_without_overflow() {
        assert_eq!(megabytes_to_bytes(10).unwrap(), 10 * 1024 * 1024);
        assert!(megabytes_to_bytes(u64::MAX / 1024).is_err());
        assert!(megabytes_to_bytes(u64::MAX).is_err());
    }

    #[test]
    fn scan_backend_parse() {
        assert_eq!(ScanBackend::parse("TCP"), Some(ScanBackend::Tcp));
        assert_eq!(ScanBackend::parse("command"), Some(ScanBackend::Command));
        assert_eq!(ScanBackend::parse("clamdscan"), Some(ScanBackend::Command));
        assert_eq!(ScanBackend::parse("icap"), None);
    }

    #[test]
    fn parse_bool_falls_back_to_default() {
        assert!(parse_bool("TRUE", false));
        assert!(parse_bool("1", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("maybe", true));
    }

    #[test]
    fn sorted_extensions_is_stable() {
        let config = ValidatorConfig::default();
        assert_eq!(
            config.sorted_extensions(),
            vec!["gif", "jpeg", "jpg", "pdf", "png", "webp"]
        );
    }
}
