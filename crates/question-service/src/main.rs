use anyhow::Context;
use clap::Parser;
use question_service::{router, QuestionStore, SEED_QUESTIONS};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Question service: question CRUD and per-quiz lookup.
#[derive(Debug, Parser)]
#[command(name = "question-service", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "QUESTION_LISTEN", default_value = "127.0.0.1:8085")]
    listen: SocketAddr,

    /// Start with an empty store.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let store = QuestionStore::new();
    if !cli.no_seed {
        store.seed(SEED_QUESTIONS);
    }

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("binding {}", cli.listen))?;
    tracing::info!(addr = %cli.listen, "question service listening");

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
        .context("serving")?;

    Ok(())
}
