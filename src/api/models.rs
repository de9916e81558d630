use serde::{Deserialize, Serialize};

/// Plain acknowledgement for endpoints whose work is a side effect.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a device-control command (LEDs, ears).
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub return_code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SystemVersion {
    pub version: String,
    pub patch: String,
}

#[derive(Debug, Serialize)]
pub struct MediaItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub filename: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackRequest {
    /// Media file from the local library.
    pub id: Option<String>,
    /// Remote stream to play instead.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackCommand {
    Pause,
    Stop,
    Quit,
    Resume,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackControlRequest {
    pub command: PlaybackCommand,
}

#[derive(Debug, Serialize)]
pub struct RfidTag {
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub action_type: Option<String>,
    pub action_url: Option<String>,
    pub karotz_action: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfidActionType {
    Url,
    KarotzAction,
    Eedomus,
    Vera,
    Zibase,
}

impl RfidActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::KarotzAction => "karotz_action",
            Self::Eedomus => "eedomus",
            Self::Vera => "vera",
            Self::Zibase => "zibase",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RfidAssignment {
    pub action_type: RfidActionType,
    pub value: String,
    pub secondary_value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RfidRename {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct TtsGenerateRequest {
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub nocache: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheItem {
    pub filename: String,
    pub size_kb: u64,
}

#[derive(Debug, Serialize)]
pub struct App {
    pub id: String,
    pub name: String,
    pub version: String,
    pub is_installed: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateInfo {
    pub id: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct FlashRequest {
    /// Path of the update package to flash.
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct Process {
    pub pid: u32,
    pub user: String,
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct FileSystemItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
