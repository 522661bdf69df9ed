use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use lecturegen_core::{HttpTextGenerator, LectureService, Provider};
use tokio::net::TcpListener;

use crate::routes::{AppState, build_router};

mod routes;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Parser)]
#[command(name = "lecturegen-server")]
#[command(author, version, about = "HTTP API that turns a biology topic into an AI-generated lecture")]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "LECTUREGEN_PORT", default_value = "3000")]
    port: u16,

    /// Address to bind to
    #[arg(long, env = "LECTUREGEN_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// AI provider used for lecture generation
    #[arg(short, long, env = "LECTUREGEN_PROVIDER", default_value = "gemini")]
    provider: CliProvider,

    /// Allowed CORS origin (repeatable). Any origin is allowed when omitted.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,
}

/// Parse `--cors-origin` values, failing on the first one that is not a valid header value.
fn parse_cors_origins(origins: &[String]) -> Result<Vec<HeaderValue>> {
    origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {:?}", origin))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();
    let cors_origins = parse_cors_origins(&cli.cors_origins)?;

    // A missing key is fatal at startup, never a per-request error
    let generator = match HttpTextGenerator::from_env(provider) {
        Ok(generator) => generator,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        service: LectureService::new(Arc::new(generator)),
    };
    let app = build_router(state, cors_origins);

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .with_context(|| format!("Invalid address: {}:{}", cli.bind, cli.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!(
        "Server listening on http://{} (provider: {}, model: {})",
        addr,
        provider.name(),
        provider.config().model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            log::info!("Shutdown signal received, stopping server...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
