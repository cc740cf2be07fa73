use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use textsim_core::EngineConfig;
use textsim_core::config::{DEFAULT_MAX_CONTENT_CHARS, DEFAULT_MAX_DOCUMENTS, DEFAULT_MAX_RETAINED_CORPORA, DEFAULT_SIMILARITY_FLOOR};
use textsim_server::{build_app, engine::EngineHandle};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Pairs must score strictly above this to be reported by `similarity`
    #[arg(long, env = "TEXTSIM_SIMILARITY_FLOOR", default_value_t = DEFAULT_SIMILARITY_FLOOR)]
    similarity_floor: f64,
    /// Keep zero-score documents in search results
    #[arg(long, env = "TEXTSIM_KEEP_ZERO_SCORES", default_value_t = false)]
    keep_zero_scores: bool,
    /// Most documents or texts one request may carry
    #[arg(long, env = "TEXTSIM_MAX_DOCUMENTS", default_value_t = DEFAULT_MAX_DOCUMENTS)]
    max_documents: usize,
    /// Longest text accepted, in characters
    #[arg(long, env = "TEXTSIM_MAX_CONTENT_CHARS", default_value_t = DEFAULT_MAX_CONTENT_CHARS)]
    max_content_chars: usize,
    /// Named corpora kept in memory before the least recently used is evicted
    #[arg(long, env = "TEXTSIM_MAX_RETAINED_CORPORA", default_value_t = DEFAULT_MAX_RETAINED_CORPORA)]
    max_retained_corpora: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = EngineConfig {
        similarity_floor: args.similarity_floor,
        keep_zero_scores: args.keep_zero_scores,
        max_documents_per_request: args.max_documents,
        max_content_chars: args.max_content_chars,
        max_retained_corpora: args.max_retained_corpora,
    };
    let (engine, _worker) = EngineHandle::spawn(config)?;
    let app: Router = build_app(engine);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
