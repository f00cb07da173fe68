//! Climate Query Service - Main Entry Point

use api::{init_logging, run_server, ServiceConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Climate Query Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Serving observations from {}", config.database.path);

    if let Err(e) = run_server(config).await {
        error!("Service failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
