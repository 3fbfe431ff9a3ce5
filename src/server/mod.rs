mod handlers;
mod state;
mod static_files;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::predictor::Predictor;

pub fn build_router(predictor: Predictor) -> Router {
    let state = Arc::new(AppState { predictor });

    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .route("/api/choices", get(handlers::choices))
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/predict", get(handlers::predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, predictor: Predictor) {
    let app = build_router(predictor);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Gharmol server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
