//! Application install and firmware update management.

use axum::{
    extract::{Path as UrlPath, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::path::Path;

use crate::{
    api::models::{ActionResponse, App, FlashRequest, UpdateInfo},
    command,
    error::{ApiError, Result},
    fsio,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apps", get(list_apps))
        .route("/apps/:app_id/install", post(install_app))
        .route("/updates", get(list_updates))
        .route("/updates/:update_id", get(read_update_file))
        .route("/updates/flash", post(flash_update))
}

/// Reject path separators and dot-dot segments before an identifier is
/// joined into a filesystem path.
fn validate_identifier(id: &str, what: &str) -> Result<()> {
    if id.is_empty()
        || id.contains('/')
        || id.contains('\\')
        || id.contains("..")
    {
        return Err(ApiError::Validation(format!("Invalid {}: '{}'", what, id)));
    }
    Ok(())
}

/// Every subdirectory of the apps directory is an installable app; an
/// `.installed` marker records a completed install.
async fn list_apps(State(state): State<AppState>) -> Json<Vec<App>> {
    let Ok(entries) = std::fs::read_dir(&state.config.paths.apps_dir) else {
        return Json(Vec::new());
    };

    let mut apps: Vec<App> = entries
        .flatten()
        .filter_map(|entry| {
            if !entry.file_type().ok()?.is_dir() {
                return None;
            }
            let dir = entry.path();
            let id = entry.file_name().to_string_lossy().to_string();
            Some(App {
                name: id.clone(),
                version: fsio::read_trimmed(&dir.join("version"), "0"),
                is_installed: dir.join(".installed").exists(),
                id,
            })
        })
        .collect();
    apps.sort_by(|a, b| a.id.cmp(&b.id));
    Json(apps)
}

async fn install_app(
    State(state): State<AppState>,
    UrlPath(app_id): UrlPath<String>,
) -> Result<Json<ActionResponse>> {
    validate_identifier(&app_id, "app id")?;
    tracing::info!("Received install request for app: {}", app_id);

    let install_script = state
        .config
        .paths
        .apps_dir
        .join(&app_id)
        .join("install.sh");
    if !install_script.exists() {
        return Err(ApiError::NotFound(format!(
            "Install script for app '{}' not found",
            app_id
        )));
    }

    state.device.lock().await.install_app(&install_script).await?;
    Ok(Json(ActionResponse::new(format!(
        "Application '{}' installed successfully",
        app_id
    ))))
}

fn update_package_path(state: &AppState, update_id: &str) -> std::path::PathBuf {
    state
        .config
        .paths
        .updates_dir
        .join(format!("{}.tar.gz", update_id))
}

fn update_info(dir: &Path, package_name: &str) -> UpdateInfo {
    let id = package_name.trim_end_matches(".tar.gz").to_string();
    let version = id.rsplit('-').next().unwrap_or("0").to_string();
    let description = fsio::read_trimmed(&dir.join(format!("{}.txt", id)), "");
    UpdateInfo {
        id,
        version,
        description,
    }
}

/// Update packages are tarballs dropped into the updates directory, each
/// optionally described by a sibling `.txt` file.
async fn list_updates(State(state): State<AppState>) -> Json<Vec<UpdateInfo>> {
    let dir = &state.config.paths.updates_dir;
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Json(Vec::new());
    };

    let mut updates: Vec<UpdateInfo> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".tar.gz") {
                return None;
            }
            Some(update_info(dir, &name))
        })
        .collect();
    updates.sort_by(|a, b| a.id.cmp(&b.id));
    Json(updates)
}

#[derive(Debug, Deserialize)]
struct ReadUpdateParams {
    /// File inside the package to read.
    file: String,
}

/// Read one file out of an update package without unpacking it.
async fn read_update_file(
    State(state): State<AppState>,
    UrlPath(update_id): UrlPath<String>,
    Query(params): Query<ReadUpdateParams>,
) -> Result<String> {
    validate_identifier(&update_id, "update id")?;
    tracing::info!("Reading file '{}' from update '{}'", params.file, update_id);

    let package = update_package_path(&state, &update_id);
    if !package.exists() {
        return Err(ApiError::NotFound(format!(
            "Update '{}' not found",
            update_id
        )));
    }

    let package_str = package.to_string_lossy().to_string();
    let result = command::run(
        &state.config.bins.tar,
        &["-xOzf", &package_str, &params.file],
        state.config.command_timeout(),
    )
    .await;

    if !result.success {
        return Err(ApiError::NotFound(format!(
            "File '{}' not found in update '{}': {}",
            params.file, update_id, result.output
        )));
    }
    Ok(result.output)
}

async fn flash_update(
    State(state): State<AppState>,
    Json(req): Json<FlashRequest>,
) -> Result<Json<ActionResponse>> {
    tracing::info!("Flashing update file: {}", req.file);

    let package = Path::new(&req.file);
    if !package.exists() {
        return Err(ApiError::NotFound(format!(
            "Update file not found: {}",
            req.file
        )));
    }

    state.device.lock().await.flash(package).await?;
    Ok(Json(ActionResponse::new("Firmware flashing process initiated")))
}
