use uploadguard_core::ValidationResult;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One table row: verdict, detected type, size, short hash, reason or warnings.
pub fn format_row(filename: &str, result: &ValidationResult) -> String {
    let verdict = if result.is_valid {
        "OK"
    } else if result.is_infected() {
        "INFECTED"
    } else {
        "REJECTED"
    };
    let detail = match &result.error_message {
        Some(message) => message.clone(),
        None => result.warnings.join("; "),
    };
    format!(
        "{:<30} {:<9} {:<24} {:>10} {:<12} {}",
        truncate_string(filename, 30),
        verdict,
        truncate_string(&result.detected_mime, 24),
        result.file_size,
        truncate_string(&result.content_hash, 12),
        detail
    )
}

/// Process exit code for a batch: 0 when every file passed, 2 when any was
/// infected, 1 for any other rejection.
pub fn exit_code<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) -> i32 {
    let mut code = 0;
    for result in results {
        if result.is_infected() {
            return 2;
        }
        if !result.is_valid {
            code = 1;
        }
    }
    code
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
