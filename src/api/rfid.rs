//! RFID tag management.
//!
//! A tag is persisted as up to three sibling files keyed by its id:
//! `<id>.rfid` (assigned action), `<id>.name` and `<id>.color`. Tags are
//! never cached; every request reads the directory fresh.

use axum::{
    extract::{Path as UrlPath, State},
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;

use crate::{
    api::models::{ActionResponse, RfidActionType, RfidAssignment, RfidRename, RfidTag},
    error::{ApiError, Result},
    fsio,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/:tag_id", axum::routing::patch(rename_tag).delete(delete_tag))
        .route("/tags/:tag_id/assign", post(assign_tag))
        .route("/record/start", post(start_recording))
        .route("/record/stop", post(stop_recording))
        .route("/test", post(test_action))
}

/// Tag ids become filenames; anything but plain alphanumerics is
/// rejected before it can reach the filesystem.
fn validate_tag_id(tag_id: &str) -> Result<()> {
    if tag_id.is_empty() || !tag_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::Validation(format!(
            "Invalid tag id: '{}'",
            tag_id
        )));
    }
    Ok(())
}

fn tag_base_path(state: &AppState, tag_id: &str) -> PathBuf {
    state.config.rfid_dir().join(tag_id)
}

fn read_tag(state: &AppState, tag_id: &str) -> RfidTag {
    let base = tag_base_path(state, tag_id);
    let name = fsio::read_trimmed(
        &base.with_extension("name"),
        &format!("Tag {}", tag_id),
    );
    let color = fsio::read_trimmed(&base.with_extension("color"), "grey");

    let action_raw = fsio::read_trimmed(&base.with_extension("rfid"), "");
    let (action_type, action_url, karotz_action) = if action_raw.is_empty() {
        (None, None, None)
    } else if action_raw.starts_with("http") {
        (Some("url".to_string()), Some(action_raw), None)
    } else {
        (Some("karotz_action".to_string()), None, Some(action_raw))
    };

    RfidTag {
        tag_id: tag_id.to_string(),
        name,
        color,
        action_type,
        action_url,
        karotz_action,
    }
}

async fn list_tags(State(state): State<AppState>) -> Json<Vec<RfidTag>> {
    let Ok(entries) = std::fs::read_dir(state.config.rfid_dir()) else {
        return Json(Vec::new());
    };

    let mut tag_ids: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("rfid") {
                return None;
            }
            Some(path.file_stem()?.to_string_lossy().to_string())
        })
        .collect();
    tag_ids.sort();

    Json(tag_ids.iter().map(|id| read_tag(&state, id)).collect())
}

async fn rename_tag(
    State(state): State<AppState>,
    UrlPath(tag_id): UrlPath<String>,
    Json(req): Json<RfidRename>,
) -> Result<Json<RfidTag>> {
    validate_tag_id(&tag_id)?;
    tracing::info!("Renaming tag {} to '{}' ({})", tag_id, req.name, req.color);

    let base = tag_base_path(&state, &tag_id);
    fsio::write_file(&base.with_extension("name"), &req.name)
        .map_err(|e| ApiError::from_io(e, "tag name file"))?;
    fsio::write_file(&base.with_extension("color"), &req.color)
        .map_err(|e| ApiError::from_io(e, "tag color file"))?;

    Ok(Json(read_tag(&state, &tag_id)))
}

async fn assign_tag(
    State(state): State<AppState>,
    UrlPath(tag_id): UrlPath<String>,
    Json(req): Json<RfidAssignment>,
) -> Result<Json<ActionResponse>> {
    validate_tag_id(&tag_id)?;
    tracing::info!(
        "Assigning action '{}' to tag {}",
        req.action_type.as_str(),
        tag_id
    );

    let rfid_file = tag_base_path(&state, &tag_id).with_extension("rfid");
    fsio::write_file(&rfid_file, &req.value)
        .map_err(|e| ApiError::from_io(e, "tag action file"))?;

    Ok(Json(ActionResponse::new(format!(
        "Action '{}' assigned to tag {}",
        req.action_type.as_str(),
        tag_id
    ))))
}

/// Remove all three sibling files. Deleting an unknown or already
/// deleted tag succeeds the same way.
async fn delete_tag(
    State(state): State<AppState>,
    UrlPath(tag_id): UrlPath<String>,
) -> Result<Json<ActionResponse>> {
    validate_tag_id(&tag_id)?;
    tracing::info!("Deleting tag {}", tag_id);

    let base = tag_base_path(&state, &tag_id);
    for extension in ["rfid", "name", "color"] {
        let path = base.with_extension(extension);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| ApiError::from_io(e, "tag file"))?;
        }
    }

    Ok(Json(ActionResponse::new(format!(
        "Tag {} has been deleted",
        tag_id
    ))))
}

async fn start_recording(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Starting RFID recording mode");
    state.device.lock().await.rfid_record(true).await?;
    Ok(Json(ActionResponse::new("RFID recording started. Present a tag.")))
}

async fn stop_recording(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Stopping RFID recording mode");
    state.device.lock().await.rfid_record(false).await?;
    Ok(Json(ActionResponse::new("RFID recording stopped")))
}

/// Exercise an assignment without persisting it to any tag.
async fn test_action(
    State(state): State<AppState>,
    Json(req): Json<RfidAssignment>,
) -> Result<Json<ActionResponse>> {
    tracing::info!("Testing RFID action: {}", req.action_type.as_str());
    if let RfidActionType::Url = req.action_type {
        state.device.lock().await.play(&req.value).await?;
    }
    Ok(Json(ActionResponse::new("Test action executed successfully")))
}
