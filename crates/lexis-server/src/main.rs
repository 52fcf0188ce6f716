use std::sync::Arc;

use tracing::info;

use lexis_api::AppStateInner;
use lexis_db::Database;
use lexis_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lexis=debug,lexis_api=debug,lexis_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::open(&config.db_path)?;

    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_days: config.token_days,
        default_language: config.default_language.clone(),
    });
    let app = lexis_api::router(state);

    let addr = config.addr()?;
    info!("Lexis server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lexis server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
