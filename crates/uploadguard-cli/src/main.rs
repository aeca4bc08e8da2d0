//! UploadGuard CLI — validate files the way the upload route would.
//!
//! Configuration comes from the environment (see `ValidatorConfig::from_env`).

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use uploadguard_cli::{exit_code, format_row, init_tracing};
use uploadguard_core::ValidatorConfig;
use uploadguard_processing::UploadValidator;
use uploadguard_services::scanner_from_config;

#[derive(Parser)]
#[command(name = "uploadguard", about = "Upload security validator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more files
    Validate {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Content-Type claimed by the uploader
        #[arg(long)]
        content_type: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ValidatorConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Validate {
            files,
            content_type,
            format,
        } => {
            let scanner = scanner_from_config(&config.malware_scan).await;
            let mut validator = UploadValidator::new(config);
            if let Some(scanner) = scanner {
                validator = validator.with_scanner(scanner);
            }

            let mut results = Vec::with_capacity(files.len());
            for path in &files {
                let content = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());

                let result = validator
                    .validate(&filename, &content, content_type.as_deref())
                    .await;
                results.push((filename, result));
            }

            match format {
                OutputFormat::Json => {
                    let out: Vec<serde_json::Value> = results
                        .iter()
                        .map(|(filename, result)| {
                            serde_json::json!({ "filename": filename, "result": result })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&out).context("Serialize results")?
                    );
                }
                OutputFormat::Table => {
                    for (filename, result) in &results {
                        println!("{}", format_row(filename, result));
                    }
                }
            }

            let code = exit_code(results.iter().map(|(_, result)| result));
            if code != 0 {
                let rejected = results.iter().filter(|(_, r)| !r.is_valid).count();
                tracing::info!(rejected, total = files.len(), "Some files were rejected");
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
