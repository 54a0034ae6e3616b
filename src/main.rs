use embed_proxy::{
    AppState, api::routes::create_router, browser::ChromiumEngine, config::Config,
    fetch::HttpFetcher, storage::SupabaseStorage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("embed_proxy=info")),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    let client = reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    // Create application state with explicitly constructed service handles
    let app_state = AppState {
        fetcher: Arc::new(HttpFetcher::new(client.clone())),
        storage: Arc::new(SupabaseStorage::new(
            client,
            config.supabase_url.clone(),
            config.supabase_secret_key.clone(),
        )),
        browser: Arc::new(ChromiumEngine::new()),
        config: Arc::new(config),
    };

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
