use storefront_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load .env (ignore if absent)
    let _ = dotenvy::dotenv();

    // 2. Load configuration and set up logging
    let config = Config::from_env();
    init_logger("info", config.is_production())?;

    tracing::info!("Storefront server starting...");

    // 3. Initialize server state (database, services)
    let state = ServerState::initialize(&config).await?;

    // 4. Run the HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
