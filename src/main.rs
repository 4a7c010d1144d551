use tracing::info;

use stackship_core::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    stackship_core::util::init_logging();

    // Environment is the single configuration source
    let config = ServerConfig::from_env();

    // Log startup message
    info!("Starting StackShip Core server on port {}", config.port);

    // Run the server
    stackship_core::server::run_server(config).await
}
