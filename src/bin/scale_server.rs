use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use marker_scale::config::server;
use marker_scale::service::handle_json_body;
use marker_scale::{ScaleEstimator, ScaleResult};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Base64 photos are large; the default 2 MB body limit is too tight.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = server::load_config(config_path.as_deref())?;
    let estimator = Arc::new(ScaleEstimator::new(config.estimator.clone()));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/process_image", post(process_image))
        .route("/favicon.ico", get(favicon))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(estimator);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    info!(
        "scale_server listening on {addr} (marker {} mm)",
        config.estimator.marker_size_mm
    );
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {e}"))
}

async fn process_image(State(estimator): State<Arc<ScaleEstimator>>, body: Bytes) -> Response {
    let handled = tokio::task::spawn_blocking(move || handle_json_body(&estimator, &body)).await;
    match handled {
        Ok(resp) => {
            let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_REQUEST);
            (status, Json(resp.body)).into_response()
        }
        Err(err) => {
            error!("scale estimation task failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScaleResult::failure("Internal server error")),
            )
                .into_response()
        }
    }
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
