use axum::{body::Bytes, extract::State, http::HeaderValue, routing::{get, post}, Json, Router};
use serde_json::Value;
use textsim_core::{EngineError, Response};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod engine;

use engine::EngineHandle;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
}

pub fn build_app(engine: EngineHandle) -> Router {
    let cors = cors_layer(std::env::var("TEXTSIM_CORS_ORIGINS").ok().as_deref());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rpc", post(rpc_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Any origin may call unless `origins` names a comma-separated allow list.
fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let listed: Vec<HeaderValue> = origins
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| o.parse().ok())
        .collect();
    let allow = if listed.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(listed) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

/// Forward one request envelope to the engine. Failures travel in-band as
/// `{id, error}`, so this always answers 200.
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<Response> {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return Json(Response::failure(Value::Null, &EngineError::from(e))),
    };
    let id = textsim_core::protocol::request_id(&request);
    match state.engine.call(request).await {
        Ok(resp) => Json(resp),
        Err(e) => {
            tracing::error!(error = %e, "engine unavailable");
            Json(Response::failure(id, &EngineError::Computation(e.to_string())))
        }
    }
}
