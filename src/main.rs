//! Stepwise server.
//!
//! # API Endpoints
//!
//! - `POST /samples` - Ingest a sample envelope
//! - `GET /samples` - List stored samples (`since`, `limit`)
//! - `DELETE /samples` - Clear the sample store
//! - `GET /goals`, `PUT /goals` - Read or update daily goals
//! - `GET /summary` - Full dashboard summary
//! - `GET /insights`, `GET /predictions` - Summary subsets
//! - `GET /daily` - Daily aggregate history
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stepwise::api::{AppState, router};
use stepwise::config::Config;
use stepwise::storage::Storage;
use stepwise::tracker::Tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stepwise=info".parse()?))
        .init();

    let config = Config::from_env();

    info!(port = config.port, db_url = %config.database_url, "Starting Stepwise server");

    let storage = Storage::new(&config.database_url).await?;
    let tracker = Tracker::load(storage, config.default_goals).await?;
    info!("Database initialized");

    let app = router(AppState { tracker });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Stepwise is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
