use anyhow::Context;
use clap::Parser;
use quiz_service::{router, AppState, HttpQuestionClient, QuizStore, Settings, SEED_QUIZZES};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Quiz service: quiz CRUD with questions fetched from the question service.
#[derive(Debug, Parser)]
#[command(name = "quiz-service", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "QUIZ_LISTEN", default_value = "127.0.0.1:8081")]
    listen: SocketAddr,

    /// Base URL of the question service; overrides the settings file.
    #[arg(long, env = "QUESTION_SERVICE_URL")]
    question_service_url: Option<String>,

    /// TOML settings file.
    #[arg(long, env = "QUIZ_CONFIG")]
    config: Option<PathBuf>,

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

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(url) = cli.question_service_url {
        settings.question_service.base_url = url;
        settings.validate().context("validating settings")?;
    }

    let client = HttpQuestionClient::new(
        settings.question_service.base_url.clone(),
        settings.client_timeout(),
    )
    .context("building question service client")?;

    let store = QuizStore::new();
    if !cli.no_seed {
        store.seed(SEED_QUIZZES);
    }

    let state = AppState::new(&settings, store, Arc::new(client));
    let app = router(state);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("binding {}", cli.listen))?;

    tracing::info!(
        addr = %cli.listen,
        question_service = %settings.question_service.base_url,
        "quiz service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
