use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use senior_fitness_api::{
    config::Config, db::MongoProfileStore, routes::create_router,
    services::providers::gemini::GeminiProvider, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "senior_fitness_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = MongoProfileStore::connect(&config.mongodb_url, &config.mongodb_database).await?;
    let llm = GeminiProvider::new(
        config.gemini_api_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )?;

    let state = AppState::new(Arc::new(store), Arc::new(llm), &config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
