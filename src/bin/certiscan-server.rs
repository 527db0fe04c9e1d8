//! HTTP server binary for certiscan.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `VerifyConfig`, wires up the JWT credential validator, and serves the
//! axum router.

use anyhow::{Context, Result};
use certiscan::server::{auth::JwtValidator, router, AppState};
use certiscan::VerifyConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "certiscan-server",
    about = "Certificate verification service: decode the QR code embedded in uploaded documents",
    version
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080", env = "CERTISCAN_ADDR")]
    addr: SocketAddr,

    /// Rendering DPI for paginated documents (quality/latency trade-off).
    #[arg(long, default_value_t = 500, env = "CERTISCAN_DPI")]
    dpi: u32,

    /// Upscale factor applied to candidate images before decoding.
    #[arg(long, default_value_t = 2, env = "CERTISCAN_UPSCALE")]
    upscale: u32,

    /// Root directory for per-request scratch areas (system temp dir if unset).
    #[arg(long, env = "CERTISCAN_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// HS256 secret used to validate bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = 25 * 1024 * 1024, env = "CERTISCAN_MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = VerifyConfig::builder()
        .dpi(cli.dpi)
        .upscale_factor(cli.upscale);
    if let Some(dir) = cli.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    let config = builder.build().context("invalid pipeline configuration")?;

    let mut state = AppState::new(config, Arc::new(JwtValidator::new(cli.jwt_secret.as_bytes())));
    state.max_upload_bytes = cli.max_upload_bytes;

    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    info!("Listening on http://{}", cli.addr);

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
