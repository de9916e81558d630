use axum::{extract::State, routing::post, Json, Router};

use crate::{
    api::models::CommandResponse,
    device::{EarsRequest, LedRequest},
    error::Result,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leds", post(set_leds))
        .route("/ears", post(set_ears))
}

async fn set_leds(
    State(state): State<AppState>,
    Json(req): Json<LedRequest>,
) -> Result<Json<CommandResponse>> {
    tracing::debug!("LED request: {:?}", req);
    let message = state.device.lock().await.set_leds(&req).await?;
    Ok(Json(CommandResponse {
        return_code: 0,
        message,
    }))
}

async fn set_ears(
    State(state): State<AppState>,
    Json(req): Json<EarsRequest>,
) -> Result<Json<CommandResponse>> {
    tracing::debug!("Ears request: {:?}", req);
    let message = state.device.lock().await.set_ears(&req).await?;
    Ok(Json(CommandResponse {
        return_code: 0,
        message,
    }))
}
