use crate::constants::SITEMAP_CONTENT_TYPE;
use crate::pipeline::Pipeline;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sheet-sitemap",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Runs the whole pipeline for every request; nothing is cached.
async fn sitemap(State(state): State<AppState>) -> Response {
    match state.pipeline.run().await {
        Ok(output) => {
            info!("Served sitemap with {} entries", output.report.accepted);
            ([(header::CONTENT_TYPE, SITEMAP_CONTENT_TYPE)], output.xml).into_response()
        }
        Err(e) => {
            error!("Sitemap generation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn metrics_text() -> Response {
    match crate::metrics::render() {
        Some(body) => body.into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

pub fn create_server(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap))
        .route("/metrics", get(metrics_text))
        .with_state(AppState { pipeline })
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(pipeline: Arc<Pipeline>, port: u16) -> anyhow::Result<()> {
    let app = create_server(pipeline);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Sitemap: http://localhost:{port}/sitemap.xml");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
