use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub bins: BinConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub limits: LimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Root for persistent data, run state and media libraries.
    pub data_dir: PathBuf,
    /// Web root holding the version/patch marker files.
    pub www_dir: PathBuf,
    /// Primary storage mount point reported in the status snapshot.
    pub primary_mount: PathBuf,
    /// Optional removable storage; reported as -1 when not mounted.
    pub usb_mount: PathBuf,
    /// sysfs-style root for network interface lookups.
    pub sysfs_net_dir: PathBuf,
    pub log_file: PathBuf,
    pub apps_dir: PathBuf,
    pub updates_dir: PathBuf,
}

/// External control programs. Every hardware mutation goes through one of
/// these, invoked as an argument vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinConfig {
    pub led: PathBuf,
    pub ears: PathBuf,
    pub player: PathBuf,
    pub tts: PathBuf,
    pub rfid_record: PathBuf,
    pub snapshot: PathBuf,
    pub flash: PathBuf,
    pub sleep: PathBuf,
    pub wakeup: PathBuf,
    pub reboot: PathBuf,
    pub chmod: PathBuf,
    pub killall: PathBuf,
    pub df: PathBuf,
    pub ps: PathBuf,
    pub tar: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Language subdirectory used when counting and listing moods.
    pub mood_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    pub voices: Vec<Voice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub language: String,
    pub gender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Bound on any single external command invocation.
    pub command_timeout_secs: u64,
}

pub const DEFAULT_LED_COLOR: &str = "00FF00";
pub const MIN_EAR_POSITION: u8 = 0;
pub const MAX_EAR_POSITION: u8 = 16;
pub const ZERO_MAC: &str = "00:00:00:00:00:00";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8090".to_string(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/usr/karotz/data"),
            www_dir: PathBuf::from("/www"),
            primary_mount: PathBuf::from("/usr"),
            usb_mount: PathBuf::from("/mnt/usbkey"),
            sysfs_net_dir: PathBuf::from("/sys/class/net"),
            log_file: PathBuf::from("/var/log/messages"),
            apps_dir: PathBuf::from("/usr/karotz/apps"),
            updates_dir: PathBuf::from("/usr/karotz/updates"),
        }
    }
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            led: PathBuf::from("/usr/karotz/bin/led_control"),
            ears: PathBuf::from("/usr/karotz/bin/ears_control"),
            player: PathBuf::from("/usr/bin/mplayer"),
            tts: PathBuf::from("/usr/bin/pico2wave"),
            rfid_record: PathBuf::from("/usr/karotz/bin/rfid_record"),
            snapshot: PathBuf::from("/usr/karotz/bin/snapshot.sh"),
            flash: PathBuf::from("/usr/karotz/bin/flash.sh"),
            sleep: PathBuf::from("/usr/karotz/bin/sleep.sh"),
            wakeup: PathBuf::from("/usr/karotz/bin/wakeup.sh"),
            reboot: PathBuf::from("/sbin/reboot"),
            chmod: PathBuf::from("/bin/chmod"),
            killall: PathBuf::from("/usr/bin/killall"),
            df: PathBuf::from("/bin/df"),
            ps: PathBuf::from("/bin/ps"),
            tar: PathBuf::from("/bin/tar"),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            mood_language: "fr".to_string(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voices: vec![
                Voice {
                    id: "alice".to_string(),
                    language: "en-US".to_string(),
                    gender: "female".to_string(),
                },
                Voice {
                    id: "bob".to_string(),
                    language: "en-GB".to_string(),
                    gender: "male".to_string(),
                },
                Voice {
                    id: "claire".to_string(),
                    language: "fr-FR".to_string(),
                    gender: "female".to_string(),
                },
            ],
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::ApiError::Internal(format!("Failed to read config: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::ApiError::Internal(format!("Failed to parse config: {}", e))
        })
    }

    /// Load the config named by `KAROTZ_API_CONFIG`, or the given default
    /// path, falling back to built-in defaults when neither file exists.
    pub fn load_with_fallback(default_path: &str) -> Self {
        let path = std::env::var("KAROTZ_API_CONFIG")
            .unwrap_or_else(|_| default_path.to_string());

        match Self::load(Path::new(&path)) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Using default configuration ({})", e);
                Self::default()
            }
        }
    }

    // Data and run-state subdirectories.

    pub fn run_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Run")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Tmp")
    }

    pub fn rfid_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Rfid")
    }

    pub fn moods_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Moods")
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Sounds")
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Stories")
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.paths.data_dir.join("Snapshots")
    }

    // Marker files controlling or reporting device state.

    pub fn version_file(&self) -> PathBuf {
        self.paths.www_dir.join("ok.version")
    }

    pub fn patch_file(&self) -> PathBuf {
        self.paths.www_dir.join("ok_patch")
    }

    pub fn led_color_file(&self) -> PathBuf {
        self.run_dir().join("led.color")
    }

    pub fn led_pulse_file(&self) -> PathBuf {
        self.run_dir().join("led.pulse")
    }

    pub fn ears_disabled_file(&self) -> PathBuf {
        self.run_dir().join("ears.disabled")
    }

    pub fn sleep_file(&self) -> PathBuf {
        self.run_dir().join("karotz.sleep")
    }

    pub fn sleep_time_file(&self) -> PathBuf {
        self.run_dir().join("karotz.time.sleep")
    }

    pub fn voice(&self, id: &str) -> Option<&Voice> {
        self.tts.voices.iter().find(|v| v.id == id)
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.limits.command_timeout_secs)
    }
}
