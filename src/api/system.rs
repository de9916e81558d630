use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{
    api::models::{ActionResponse, SystemVersion},
    error::Result,
    fsio,
    state::AppState,
    status::{self, DeviceStatus},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/version", get(get_version))
        .route("/status", get(get_status))
        .route("/reboot", post(reboot))
        .route("/sleep", post(sleep))
        .route("/wakeup", post(wakeup))
        .route("/correct-permissions", post(correct_permissions))
}

async fn get_version(State(state): State<AppState>) -> Json<SystemVersion> {
    Json(SystemVersion {
        version: fsio::read_trimmed(&state.config.version_file(), "0"),
        patch: fsio::read_trimmed(&state.config.patch_file(), "0"),
    })
}

/// Full device snapshot, assembled fresh on every call.
async fn get_status(State(state): State<AppState>) -> Json<DeviceStatus> {
    Json(status::gather(&state.config).await)
}

async fn reboot(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Received reboot request");
    state.device.lock().await.reboot().await?;
    Ok(Json(ActionResponse::new("Karotz device is rebooting")))
}

async fn sleep(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Received sleep request");
    state.device.lock().await.sleep().await?;
    Ok(Json(ActionResponse::new("Karotz device is going to sleep")))
}

async fn wakeup(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Received wakeup request");
    state.device.lock().await.wakeup().await?;
    Ok(Json(ActionResponse::new("Karotz device is waking up")))
}

async fn correct_permissions(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>> {
    tracing::info!("Correcting permissions on the data directory");
    state.device.lock().await.correct_permissions().await?;
    Ok(Json(ActionResponse::new(
        "Data directory permissions have been corrected",
    )))
}
