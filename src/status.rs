//! Status aggregation.
//!
//! Builds one `DeviceStatus` snapshot per request out of marker files,
//! directory counts, sysfs reads and `df` queries. Each field degrades
//! on its own: a single unreadable source never aborts the whole
//! snapshot.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{command, config::Config, fsio};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub version: String,
    pub patch: String,
    pub ears_disabled: bool,
    pub sleep_active: bool,
    pub sleep_time_remaining: i64,
    pub led_color: String,
    pub led_is_pulsing: bool,
    pub mac_address_eth: String,
    pub mac_address_wlan: String,
    pub storage_karotz_used_percent: i64,
    pub storage_usb_used_percent: i64,
    pub storage_karotz_free_space: String,
    pub storage_usb_free_space: String,
    pub count_tts_cache: usize,
    pub count_rfid_tags: usize,
    pub count_moods: usize,
    pub count_sounds: usize,
    pub count_stories: usize,
}

/// Disk usage for one mount point: (used percent, human-readable free
/// space). An unmounted or missing optional mount reports the -1
/// sentinel instead of failing the snapshot.
async fn disk_usage(config: &Config, path: &Path) -> (i64, String) {
    if !fsio::is_mounted(path) && !path.is_dir() {
        return (-1, "-1".to_string());
    }

    let timeout = Duration::from_secs(config.limits.command_timeout_secs);
    let result = command::run(
        &config.bins.df,
        &["-Ph", &path.to_string_lossy()],
        timeout,
    )
    .await;

    if !result.success {
        return (-1, "-1".to_string());
    }

    // df -Ph: Filesystem Size Used Avail Use% Mounted
    let Some(last_line) = result.output.lines().last() else {
        return (-1, "-1".to_string());
    };
    let fields: Vec<&str> = last_line.split_whitespace().collect();

    let percent = fields
        .get(4)
        .and_then(|f| f.trim_end_matches('%').parse::<i64>().ok())
        .unwrap_or(-1);
    let free = fields.get(3).map(|f| f.to_string()).unwrap_or_else(|| "-1".to_string());

    (percent, free)
}

fn sleep_time_remaining(config: &Config) -> i64 {
    let raw = fsio::read_trimmed(&config.sleep_time_file(), "0");
    match raw.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            // Reported loudly rather than silently zeroed.
            tracing::error!(
                "Non-numeric sleep time in {}: '{}'",
                config.sleep_time_file().display(),
                raw
            );
            0
        }
    }
}

/// Assemble a fresh status snapshot. Never persisted; every call
/// re-reads the filesystem.
pub async fn gather(config: &Config) -> DeviceStatus {
    let (karotz_used, karotz_free) = disk_usage(config, &config.paths.primary_mount).await;
    let (usb_used, usb_free) = disk_usage(config, &config.paths.usb_mount).await;

    DeviceStatus {
        version: fsio::read_trimmed(&config.version_file(), "0"),
        patch: fsio::read_trimmed(&config.patch_file(), "0"),
        ears_disabled: config.ears_disabled_file().exists(),
        sleep_active: config.sleep_file().exists(),
        sleep_time_remaining: sleep_time_remaining(config),
        led_color: fsio::read_trimmed(
            &config.led_color_file(),
            crate::config::DEFAULT_LED_COLOR,
        ),
        led_is_pulsing: fsio::read_trimmed(&config.led_pulse_file(), "0") == "1",
        mac_address_eth: fsio::mac_address(&config.paths.sysfs_net_dir, "eth0"),
        mac_address_wlan: fsio::mac_address(&config.paths.sysfs_net_dir, "wlan0"),
        storage_karotz_used_percent: karotz_used,
        storage_usb_used_percent: usb_used,
        storage_karotz_free_space: karotz_free,
        storage_usb_free_space: usb_free,
        count_tts_cache: fsio::count_files(&config.tmp_dir()),
        count_rfid_tags: fsio::count_files(&config.rfid_dir()),
        count_moods: fsio::count_files(
            &config.moods_dir().join(&config.media.mood_language),
        ),
        count_sounds: fsio::count_files(&config.sounds_dir()),
        count_stories: fsio::count_files(&config.stories_dir()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.data_dir = temp.path().join("data");
        config.paths.www_dir = temp.path().join("www");
        config.paths.sysfs_net_dir = temp.path().join("net");
        config.paths.primary_mount = temp.path().join("not-mounted");
        config.paths.usb_mount = temp.path().join("also-not-mounted");
        config
    }

    #[tokio::test]
    async fn defaults_apply_on_an_empty_filesystem() {
        let temp = TempDir::new().expect("temp dir");
        let config = test_config(&temp);

        let status = gather(&config).await;
        assert_eq!(status.version, "0");
        assert_eq!(status.patch, "0");
        assert!(!status.ears_disabled);
        assert!(!status.sleep_active);
        assert_eq!(status.sleep_time_remaining, 0);
        assert_eq!(status.led_color, crate::config::DEFAULT_LED_COLOR);
        assert!(!status.led_is_pulsing);
        assert_eq!(status.mac_address_eth, crate::config::ZERO_MAC);
        assert_eq!(status.count_rfid_tags, 0);
    }

    #[tokio::test]
    async fn unmounted_storage_reports_sentinel() {
        let temp = TempDir::new().expect("temp dir");
        let config = test_config(&temp);

        let status = gather(&config).await;
        assert_eq!(status.storage_usb_used_percent, -1);
        assert_eq!(status.storage_usb_free_space, "-1");
    }

    #[tokio::test]
    async fn marker_files_are_reflected() {
        let temp = TempDir::new().expect("temp dir");
        let config = test_config(&temp);

        fsio::write_file(&config.sleep_file(), "").expect("write");
        fsio::write_file(&config.sleep_time_file(), "120").expect("write");
        fsio::write_file(&config.led_color_file(), "FF0000\n").expect("write");
        fsio::write_file(&config.led_pulse_file(), "1").expect("write");
        fsio::write_file(&config.rfid_dir().join("0123ABCD.rfid"), "x").expect("write");

        let status = gather(&config).await;
        assert!(status.sleep_active);
        assert_eq!(status.sleep_time_remaining, 120);
        assert_eq!(status.led_color, "FF0000");
        assert!(status.led_is_pulsing);
        assert_eq!(status.count_rfid_tags, 1);
    }

    #[tokio::test]
    async fn garbage_sleep_time_degrades_to_zero() {
        let temp = TempDir::new().expect("temp dir");
        let config = test_config(&temp);
        fsio::write_file(&config.sleep_time_file(), "soon").expect("write");

        let status = gather(&config).await;
        assert_eq!(status.sleep_time_remaining, 0);
    }
}
