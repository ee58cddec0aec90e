use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};

use tickbox::api::{self, AppState};
use tickbox::settings::Settings;
use tickbox::store::Store;

#[tokio::main]
async fn main() {
    init_tracing();

    // ── Boot ───────────────────────────────────────────────────
    let settings = Settings::load().expect("Failed to load settings");

    let store = Store::open(&settings.data_path).expect("Failed to open task file");
    let count = store.list().expect("Failed to read task file").len();
    tracing::info!(tasks = count, path = %settings.data_path, "task file loaded");

    // ── Shared state ───────────────────────────────────────────
    let state = Arc::new(AppState { store });

    // ── Router ─────────────────────────────────────────────────
    let app = api::router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    // ── Start ──────────────────────────────────────────────────
    let addr = settings.bind_addr();
    tracing::info!("server running on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.unwrap();
}

#[cfg(feature = "console")]
fn init_tracing() {
    console_subscriber::init();
}

#[cfg(not(feature = "console"))]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tickbox=info")),
        )
        .init();
}
