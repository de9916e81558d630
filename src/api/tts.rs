use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{
    api::models::{ActionResponse, CacheItem, TtsGenerateRequest},
    config::Voice,
    device::TtsRequest,
    error::{ApiError, Result},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/voices", get(list_voices))
        .route("/generate", post(generate))
        .route("/cache", get(list_cache).delete(clear_cache))
}

async fn list_voices(State(state): State<AppState>) -> Json<Vec<Voice>> {
    Json(state.config.tts.voices.clone())
}

async fn generate(
    State(state): State<AppState>,
    Json(req): Json<TtsGenerateRequest>,
) -> Result<Json<ActionResponse>> {
    tracing::info!(
        "Generating speech with voice '{}' ({} chars)",
        req.voice,
        req.text.len()
    );

    let message = state
        .device
        .lock()
        .await
        .speak(&TtsRequest {
            text: req.text,
            voice: req.voice,
            nocache: req.nocache,
        })
        .await?;
    Ok(Json(ActionResponse::new(message)))
}

fn is_audio(name: &str) -> bool {
    name.ends_with(".mp3") || name.ends_with(".wav")
}

async fn list_cache(State(state): State<AppState>) -> Json<Vec<CacheItem>> {
    let Ok(entries) = std::fs::read_dir(state.config.tmp_dir()) else {
        return Json(Vec::new());
    };

    let mut items: Vec<CacheItem> = entries
        .flatten()
        .filter_map(|entry| {
            let filename = entry.file_name().to_string_lossy().to_string();
            if !is_audio(&filename) {
                return None;
            }
            let size_kb = entry.metadata().ok()?.len() / 1024;
            Some(CacheItem { filename, size_kb })
        })
        .collect();
    items.sort_by(|a, b| a.filename.cmp(&b.filename));
    Json(items)
}

async fn clear_cache(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Clearing TTS cache");
    let Ok(entries) = std::fs::read_dir(state.config.tmp_dir()) else {
        return Ok(Json(ActionResponse::new("Cache directory does not exist")));
    };

    for entry in entries.flatten() {
        let filename = entry.file_name().to_string_lossy().to_string();
        if is_audio(&filename) {
            std::fs::remove_file(entry.path())
                .map_err(|e| ApiError::from_io(e, "cache file"))?;
        }
    }
    Ok(Json(ActionResponse::new("TTS cache has been cleared")))
}
