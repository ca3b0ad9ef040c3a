use std::path::PathBuf;
use std::sync::Arc;

use rayjob_store::{JobStore, SqliteJobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod render;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rayjob_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RayJob Dashboard...");

    // Get store path from environment
    let store_path = PathBuf::from(
        std::env::var("SQLITE_PATH").unwrap_or_else(|_| "database/ray_jobs.db".to_string()),
    );

    if !store_path.exists() {
        tracing::warn!(
            "Job store not found at {}; pages return 503 until the poller creates it",
            store_path.display()
        );
    }

    // The poller owns the schema; the dashboard only ever reads
    let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::open_read_only(&store_path));

    // Build router with all endpoints
    let app = api::create_router(store);

    // Get bind address
    let addr =
        std::env::var("DASHBOARD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
