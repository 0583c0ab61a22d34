use portal_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment setup (dotenv, logging)
    setup_environment()?;

    print_banner();

    tracing::info!("Dorm Portal Server starting...");

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize server state (room catalog, engines, workflow)
    let state = ServerState::initialize(&config);

    // 4. Run the HTTP server (background tasks start inside)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
