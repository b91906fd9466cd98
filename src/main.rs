use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use whatsfordinner_api::{
    config::Config,
    db::{self, PgUserStore},
    routes::{create_router, AppState},
    services::RecommendationBridge,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsfordinner_api=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let state = Arc::new(AppState {
        store: Arc::new(PgUserStore::new(pool)),
        bridge: RecommendationBridge::from_config(&config),
        token_secret: config.token_secret.clone(),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
