//! PaintWall stroke server entry point.

use paintwall_server::{ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paintwall_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    paintwall_server::serve(config).await
}
