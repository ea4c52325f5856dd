use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dock_server::catalog::StationCatalog;
use dock_server::config::ServerConfig;
use dock_server::geoip::GeoResolver;
use dock_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dock_server=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let geo = GeoResolver::new(config.geo_resolver())?;
    let catalog = StationCatalog::new(config.station_catalog())?;
    info!(
        geoip = %config.geoip_url,
        feed = %config.station_feed_url,
        timeout_secs = config.http_timeout_secs,
        max_retries = config.max_retries,
        "upstream providers configured"
    );

    let state = AppState::new(geo, catalog, config.trust_forwarded_for);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Nearest Dock listening on http://{}", config.bind_addr);
    info!("  GET  /        - nearest station page");
    info!("  GET  /health  - health check");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
