//! Diagnostics: process listing, system logs, filesystem browsing and
//! RFID backup/restore.

use axum::{
    extract::{Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::path::Path;

use crate::{
    api::models::{ActionResponse, FileSystemItem, Process},
    command,
    error::{ApiError, Result},
    fsio,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/processes", get(list_processes))
        .route("/logs", get(get_logs).delete(clear_logs))
        .route("/files", get(list_files))
        .route("/backup/rfid", get(backup_rfid))
        .route("/restore/rfid", post(restore_rfid))
}

async fn list_processes(State(state): State<AppState>) -> Result<Json<Vec<Process>>> {
    let result = command::run(
        &state.config.bins.ps,
        &["-eo", "pid,user,comm"],
        state.config.command_timeout(),
    )
    .await;
    if !result.success {
        return Err(ApiError::Command(format!(
            "Failed to list processes: {}",
            result.output
        )));
    }

    let processes = result
        .output
        .lines()
        .skip(1) // header
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pid = parts.next()?.parse::<u32>().ok()?;
            let user = parts.next()?.to_string();
            let command = parts.collect::<Vec<_>>().join(" ");
            Some(Process { pid, user, command })
        })
        .collect();
    Ok(Json(processes))
}

async fn get_logs(State(state): State<AppState>) -> Result<String> {
    let path = &state.config.paths.log_file;
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) => Err(ApiError::from_io(
            e,
            &format!("log file {}", path.display()),
        )),
    }
}

async fn clear_logs(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Clearing system logs");
    fsio::write_file(&state.config.paths.log_file, "")
        .map_err(|e| ApiError::from_io(e, "log file"))?;
    Ok(Json(ActionResponse::new("System logs have been cleared")))
}

#[derive(Debug, Deserialize)]
struct ListFilesParams {
    directory: String,
}

async fn list_files(
    Query(params): Query<ListFilesParams>,
) -> Result<Json<Vec<FileSystemItem>>> {
    let dir = Path::new(&params.directory);
    if !dir.is_absolute() || !dir.is_dir() {
        return Err(ApiError::Validation(
            "Invalid or non-absolute directory path provided".to_string(),
        ));
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| ApiError::from_io(e, &format!("directory {}", dir.display())))?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| ApiError::from_io(e, &format!("directory {}", dir.display())))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let metadata = entry
            .metadata()
            .map_err(|e| ApiError::from_io(e, &name.clone()))?;

        items.push(if metadata.is_dir() {
            FileSystemItem {
                name,
                kind: "directory".to_string(),
                size: None,
            }
        } else {
            FileSystemItem {
                name,
                kind: "file".to_string(),
                size: Some(metadata.len()),
            }
        });
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(items))
}

async fn backup_rfid(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    tracing::info!("Creating RFID backup");

    let backup_path = std::env::temp_dir().join("rfid_backup.tar.gz");
    let backup_str = backup_path.to_string_lossy().to_string();
    let rfid_dir = state.config.rfid_dir().to_string_lossy().to_string();

    let result = command::run(
        &state.config.bins.tar,
        &["-czf", &backup_str, &rfid_dir],
        state.config.command_timeout(),
    )
    .await;
    if !result.success {
        return Err(ApiError::Command(format!(
            "RFID backup failed: {}",
            result.output
        )));
    }

    Ok(Json(ActionResponse::new(format!(
        "RFID backup created successfully at {}",
        backup_str
    ))))
}

/// Accept an uploaded backup tarball and unpack it in place.
async fn restore_rfid(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ActionResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid upload: {}", e)))?
        .ok_or_else(|| ApiError::Validation("No backup file uploaded".to_string()))?;

    let filename = field.file_name().unwrap_or("rfid_backup.tar.gz").to_string();
    tracing::info!("Restoring RFID data from file: {}", filename);

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(format!("Upload failed: {}", e)))?;

    let restore_path =
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), filename));
    std::fs::write(&restore_path, &data)
        .map_err(|e| ApiError::from_io(e, "restore upload"))?;

    let restore_str = restore_path.to_string_lossy().to_string();
    let result = command::run(
        &state.config.bins.tar,
        &["-xzf", &restore_str, "-C", "/"],
        state.config.command_timeout(),
    )
    .await;

    // The uploaded tarball is scratch either way.
    let _ = std::fs::remove_file(&restore_path);

    if !result.success {
        return Err(ApiError::Command(format!(
            "RFID restore failed: {}",
            result.output
        )));
    }
    Ok(Json(ActionResponse::new("RFID data restored successfully")))
}
