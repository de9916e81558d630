pub mod actions;
pub mod agent;
pub mod management;
pub mod media;
pub mod models;
pub mod rfid;
pub mod system;
pub mod tools;
pub mod tts;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the OpenKarotz Modern API"
    }))
}

/// Assemble the full HTTP surface, one nested router per functional area.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(welcome))
        .nest("/api/system", system::router())
        .nest("/api/action", actions::router())
        .nest("/api/agent", agent::router())
        .nest("/api/media", media::router())
        .nest("/api/rfid", rfid::router())
        .nest("/api/tts", tts::router())
        .nest("/api/management", management::router())
        .nest("/api/tools", tools::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
