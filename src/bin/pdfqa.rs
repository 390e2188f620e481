//! Server binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig`, wires the production service, and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfqa::{
    api_key_from_env, backend, router, QaService, ServiceConfig,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"ENDPOINTS:
  POST /upload_pdfs    multipart/form-data, one or more parts named "files"
  POST /ask_question   {"question": "..."}  →  {"answer": "..."}
  GET  /health         liveness probe

EXAMPLES:
  # Serve on the default address with uploads in ./uploads
  pdfqa

  # Upload two PDFs, then ask
  curl -F files=@a.pdf -F files=@b.pdf http://localhost:8000/upload_pdfs
  curl -H 'content-type: application/json' \
       -d '{"question":"What is the capital of France?"}' \
       http://localhost:8000/ask_question

ENVIRONMENT VARIABLES:
  SAMBANOVA_API_KEY       Completion backend API key (required)
  sambanova-api-key       Same, accepted from a .env file
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Log filter, overrides --verbose

A .env file in the working directory is loaded before flags are parsed.
"#;

/// Answer questions grounded in uploaded PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Answer questions grounded in uploaded PDF documents",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PDFQA_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Directory holding uploaded PDFs (created if missing).
    #[arg(long, env = "PDFQA_UPLOAD_DIR", default_value = "./uploads")]
    upload_dir: PathBuf,

    /// Completion backend API key.
    #[arg(long, env = "SAMBANOVA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Completion request timeout in seconds.
    #[arg(long = "api-timeout", env = "PDFQA_API_TIMEOUT", default_value_t = 120)]
    api_timeout_secs: u64,

    /// Maximum upload request size in bytes.
    #[arg(long, env = "PDFQA_MAX_UPLOAD_BYTES", default_value_t = 64 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,
}

fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let api_key = cli.api_key.clone().or_else(api_key_from_env).unwrap_or_default();

    ServiceConfig::builder()
        .api_key(api_key)
        .upload_dir(&cli.upload_dir)
        .api_timeout_secs(cli.api_timeout_secs)
        .max_upload_bytes(cli.max_upload_bytes)
        .build()
        .context("invalid configuration")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads `env = ...` fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    info!(
        "Backend: {} at {}",
        backend::DEFAULT_MODEL,
        backend::DEFAULT_BASE_URL
    );

    let service = Arc::new(
        QaService::from_config(&config)
            .await
            .context("failed to start service")?,
    );
    let app = router(service, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!("Listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["pdfqa", "--api-key", "k"]).unwrap();
        assert_eq!(cli.bind, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(cli.api_timeout_secs, 120);
        assert!(!cli.verbose);

        let config = build_config(&cli).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.max_upload_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "pdfqa",
            "--api-key",
            "k",
            "--bind",
            "127.0.0.1:9000",
            "--upload-dir",
            "/tmp/docs",
            "--api-timeout",
            "30",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.bind.port(), 9000);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/docs"));
        assert_eq!(config.api_timeout_secs, 30);
        assert!(cli.verbose);
    }
}
