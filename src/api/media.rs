use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::path::Path;

use crate::{
    api::models::{
        ActionResponse, MediaItem, PlaybackCommand, PlaybackControlRequest,
        PlaybackRequest, Snapshot,
    },
    error::{ApiError, Result},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sounds", get(list_sounds))
        .route("/sounds/play", post(play_sound))
        .route("/sounds/control", post(control_playback))
        .route("/stories", get(list_stories))
        .route("/moods", get(list_moods))
        .route("/snapshots", get(list_snapshots).delete(clear_snapshots))
        .route("/snapshots/capture", post(capture_snapshot))
}

/// Files with the given extension directly inside `dir`; empty when the
/// directory is missing.
fn list_media(dir: &Path, extension: &str) -> Vec<MediaItem> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut items: Vec<MediaItem> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                return None;
            }
            let id = path.file_name()?.to_string_lossy().to_string();
            let name = path.file_stem()?.to_string_lossy().to_string();
            Some(MediaItem { id, name })
        })
        .collect();
    items.sort_by(|a, b| a.id.cmp(&b.id));
    items
}

async fn list_sounds(State(state): State<AppState>) -> Json<Vec<MediaItem>> {
    Json(list_media(&state.config.sounds_dir(), "mp3"))
}

async fn list_stories(State(state): State<AppState>) -> Json<Vec<MediaItem>> {
    Json(list_media(&state.config.stories_dir(), "mp3"))
}

/// Moods live one level deeper, in per-language subdirectories.
async fn list_moods(State(state): State<AppState>) -> Json<Vec<MediaItem>> {
    let moods_dir = state.config.moods_dir();
    let Ok(languages) = std::fs::read_dir(&moods_dir) else {
        return Json(Vec::new());
    };

    let mut moods = Vec::new();
    for language in languages.flatten() {
        if language.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            moods.extend(list_media(&language.path(), "mp3"));
        }
    }
    moods.sort_by(|a, b| a.id.cmp(&b.id));
    Json(moods)
}

async fn play_sound(
    State(state): State<AppState>,
    Json(req): Json<PlaybackRequest>,
) -> Result<Json<ActionResponse>> {
    let target = match (&req.id, &req.url) {
        (Some(id), _) => {
            let path = state.config.sounds_dir().join(id);
            if !path.exists() {
                return Err(ApiError::NotFound(format!(
                    "Sound with id '{}' not found",
                    id
                )));
            }
            tracing::info!("Playing sound with id: {}", id);
            path.to_string_lossy().to_string()
        }
        (None, Some(url)) => {
            tracing::info!("Playing sound from url: {}", url);
            url.clone()
        }
        (None, None) => {
            return Err(ApiError::Validation(
                "Either 'id' or 'url' must be provided".to_string(),
            ));
        }
    };

    state.device.lock().await.play(&target).await?;
    Ok(Json(ActionResponse::new("Sound playback started")))
}

async fn control_playback(
    State(state): State<AppState>,
    Json(req): Json<PlaybackControlRequest>,
) -> Result<Json<ActionResponse>> {
    tracing::info!("Sound control command: {:?}", req.command);
    match req.command {
        PlaybackCommand::Stop | PlaybackCommand::Quit => {
            state.device.lock().await.stop_playback().await?;
            Ok(Json(ActionResponse::new("Playback stopped")))
        }
        // Pause/resume would need player process interaction (signals or
        // a control pipe); acknowledged only for now.
        PlaybackCommand::Pause | PlaybackCommand::Resume => {
            Ok(Json(ActionResponse::new("Playback control command sent")))
        }
    }
}

async fn list_snapshots(State(state): State<AppState>) -> Json<Vec<Snapshot>> {
    let Ok(entries) = std::fs::read_dir(state.config.snapshots_dir()) else {
        return Json(Vec::new());
    };

    let mut snapshots: Vec<Snapshot> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
                return None;
            }
            let modified = entry.metadata().ok()?.modified().ok()?;
            let timestamp: DateTime<Local> = modified.into();
            Some(Snapshot {
                filename: path.file_name()?.to_string_lossy().to_string(),
                timestamp: timestamp.to_rfc3339(),
            })
        })
        .collect();
    snapshots.sort_by(|a, b| a.filename.cmp(&b.filename));
    Json(snapshots)
}

#[derive(Debug, Deserialize)]
struct CaptureParams {
    /// Skip the shutter sound.
    #[serde(default)]
    silent: bool,
}

async fn capture_snapshot(
    State(state): State<AppState>,
    Query(params): Query<CaptureParams>,
) -> Result<Json<ActionResponse>> {
    tracing::info!("Capturing snapshot (silent: {})", params.silent);
    state.device.lock().await.capture_snapshot(params.silent).await?;
    Ok(Json(ActionResponse::new("Snapshot captured successfully")))
}

async fn clear_snapshots(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Deleting all snapshots");
    let dir = state.config.snapshots_dir();
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Ok(Json(ActionResponse::new("Snapshot directory does not exist")));
    };

    for entry in entries.flatten() {
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            std::fs::remove_file(entry.path())
                .map_err(|e| ApiError::from_io(e, "snapshot"))?;
        }
    }
    Ok(Json(ActionResponse::new("All snapshots have been deleted")))
}
