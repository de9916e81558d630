//! Device controller.
//!
//! Owns every hardware-facing mutation: LEDs, ear motors, the media
//! player, TTS, the camera and the power scripts. Held behind a mutex in
//! app state so that mutations of process-wide singletons (the LED state
//! files, the player process) serialize across requests.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

use crate::{
    command::{self, CommandOutcome},
    config::{Config, MAX_EAR_POSITION},
    error::{ApiError, Result},
    fsio,
};

#[derive(Debug, Clone, Deserialize)]
pub struct LedRequest {
    pub color: String,
    pub color2: Option<String>,
    #[serde(default)]
    pub pulse: bool,
    #[serde(default)]
    pub blink: bool,
    /// Skip persisting the color to the run-state files.
    #[serde(default, rename = "nomemory")]
    pub no_memory: bool,
    pub speed: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EarsRequest {
    pub left: Option<u8>,
    pub right: Option<u8>,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice: String,
    /// Bypass the cache and force regeneration.
    #[serde(default)]
    pub nocache: bool,
}

pub struct DeviceController {
    config: Arc<Config>,
}

impl DeviceController {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    async fn run(&self, program: &Path, args: &[&str]) -> CommandOutcome {
        command::run(program, args, self.config.command_timeout()).await
    }

    /// Drive the LEDs and persist the color unless `nomemory` is set.
    pub async fn set_leds(&self, req: &LedRequest) -> Result<String> {
        if req.pulse && req.blink {
            return Err(ApiError::Validation(
                "LED request cannot set both 'pulse' and 'blink'".to_string(),
            ));
        }

        let speed;
        let mut args: Vec<&str> = vec!["--color", &req.color];
        if let Some(color2) = &req.color2 {
            args.push("--color2");
            args.push(color2);
        }
        if req.pulse {
            args.push("--pulse");
        }
        if req.blink {
            args.push("--blink");
        }
        if let Some(s) = req.speed {
            speed = s.to_string();
            args.push("--speed");
            args.push(&speed);
        }

        let result = self.run(&self.config.bins.led, &args).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "LED command failed: {}",
                result.output
            )));
        }

        if !req.no_memory {
            let pulse_flag = if req.pulse { "1" } else { "0" };
            fsio::write_file(&self.config.led_color_file(), &req.color)
                .map_err(|e| ApiError::from_io(e, "led.color"))?;
            fsio::write_file(&self.config.led_pulse_file(), pulse_flag)
                .map_err(|e| ApiError::from_io(e, "led.pulse"))?;
        }

        tracing::info!("LED color set to {}", req.color);
        Ok(format!("LED color set to {}", req.color))
    }

    /// Move the ears to absolute positions, or reset them.
    pub async fn set_ears(&self, req: &EarsRequest) -> Result<String> {
        let args: Vec<String> = if req.reset {
            vec!["--reset".to_string()]
        } else {
            let mut args = Vec::new();
            for (name, position) in [("--left", req.left), ("--right", req.right)] {
                if let Some(p) = position {
                    if p > MAX_EAR_POSITION {
                        return Err(ApiError::Validation(format!(
                            "Ear position {} out of range 0..={}",
                            p, MAX_EAR_POSITION
                        )));
                    }
                    args.push(name.to_string());
                    args.push(p.to_string());
                }
            }
            if args.is_empty() {
                return Err(ApiError::Validation(
                    "Ears request requires 'left', 'right' or 'reset'".to_string(),
                ));
            }
            args
        };

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = self.run(&self.config.bins.ears, &arg_refs).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Ears command failed: {}",
                result.output
            )));
        }

        Ok("Ear positions updated".to_string())
    }

    pub async fn sleep(&self) -> Result<String> {
        self.simple_command(&self.config.bins.sleep, "Sleep").await
    }

    pub async fn wakeup(&self) -> Result<String> {
        self.simple_command(&self.config.bins.wakeup, "Wakeup").await
    }

    pub async fn reboot(&self) -> Result<String> {
        self.simple_command(&self.config.bins.reboot, "Reboot").await
    }

    pub async fn correct_permissions(&self) -> Result<String> {
        let data_dir = self.config.paths.data_dir.to_string_lossy().to_string();
        let result = self
            .run(&self.config.bins.chmod, &["-R", "755", &data_dir])
            .await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Permission correction failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    /// Play a local file or a stream URL through the media player.
    pub async fn play(&self, target: &str) -> Result<String> {
        let result = self.run(&self.config.bins.player, &[target]).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Playback failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    /// Stop playback by killing the player process. Killing a player that
    /// is not running is an already-achieved no-op, not an error.
    pub async fn stop_playback(&self) -> Result<String> {
        let player = self
            .config
            .bins
            .player
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let result = self.run(&self.config.bins.killall, &[&player]).await;
        if !result.success && !result.output.contains("no process") {
            return Err(ApiError::Command(format!(
                "Failed to stop playback: {}",
                result.output
            )));
        }
        Ok("Playback stopped".to_string())
    }

    /// Synthesize speech and play it, caching the generated audio. The
    /// cache key covers both voice and text so two voices never collide
    /// on the same entry.
    pub async fn speak(&self, req: &TtsRequest) -> Result<String> {
        let voice = self.config.voice(&req.voice).ok_or_else(|| {
            ApiError::Validation(format!("Unknown voice: {}", req.voice))
        })?;

        let cache_path = self.config.tmp_dir().join(tts_cache_name(&req.voice, &req.text));
        if let Some(parent) = cache_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::from_io(e, "TTS cache directory"))?;
        }

        if req.nocache || !cache_path.exists() {
            let cache_str = cache_path.to_string_lossy().to_string();
            let result = self
                .run(
                    &self.config.bins.tts,
                    &["--wave", &cache_str, "-l", &voice.language, &req.text],
                )
                .await;
            if !result.success {
                return Err(ApiError::Command(format!(
                    "TTS generation failed: {}",
                    result.output
                )));
            }
        }

        self.play(&cache_path.to_string_lossy()).await?;
        Ok("Speech generation and playback initiated".to_string())
    }

    pub async fn capture_snapshot(&self, silent: bool) -> Result<String> {
        let args: &[&str] = if silent { &["--silent"] } else { &[] };
        let result = self.run(&self.config.bins.snapshot, args).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Snapshot capture failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    pub async fn rfid_record(&self, start: bool) -> Result<String> {
        let flag = if start { "--start" } else { "--stop" };
        let result = self.run(&self.config.bins.rfid_record, &[flag]).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "RFID recording control failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    pub async fn install_app(&self, script: &Path) -> Result<String> {
        let result = self.run(script, &[]).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Installation failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    pub async fn flash(&self, package: &Path) -> Result<String> {
        let package_str = package.to_string_lossy().to_string();
        let result = self.run(&self.config.bins.flash, &[&package_str]).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "Flashing failed: {}",
                result.output
            )));
        }
        Ok(result.output)
    }

    async fn simple_command(&self, program: &Path, what: &str) -> Result<String> {
        let result = self.run(program, &[]).await;
        if !result.success {
            return Err(ApiError::Command(format!(
                "{} command failed: {}",
                what, result.output
            )));
        }
        Ok(result.output)
    }
}

/// Cache filename for a synthesized utterance.
fn tts_cache_name(voice: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    format!("{:x}.wav", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn controller(temp: &TempDir) -> DeviceController {
        let mut config = Config::default();
        config.paths.data_dir = temp.path().join("data");
        config.bins.led = "/bin/true".into();
        config.bins.ears = "/bin/true".into();
        DeviceController::new(Arc::new(config))
    }

    #[tokio::test]
    async fn led_pulse_and_blink_conflict_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let device = controller(&temp);

        let req = LedRequest {
            color: "FF0000".to_string(),
            color2: None,
            pulse: true,
            blink: true,
            no_memory: false,
            speed: None,
        };
        let err = device.set_leds(&req).await.expect_err("conflict");
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("pulse"));
        assert!(err.to_string().contains("blink"));
    }

    #[tokio::test]
    async fn led_color_is_persisted_unless_nomemory() {
        let temp = TempDir::new().expect("temp dir");
        let device = controller(&temp);

        let mut req = LedRequest {
            color: "0000FF".to_string(),
            color2: None,
            pulse: false,
            blink: false,
            no_memory: false,
            speed: None,
        };
        device.set_leds(&req).await.expect("set");
        assert_eq!(
            fsio::read_trimmed(&device.config.led_color_file(), ""),
            "0000FF"
        );
        assert_eq!(fsio::read_trimmed(&device.config.led_pulse_file(), ""), "0");

        req.color = "00FF00".to_string();
        req.no_memory = true;
        device.set_leds(&req).await.expect("set");
        // Still the previously persisted color.
        assert_eq!(
            fsio::read_trimmed(&device.config.led_color_file(), ""),
            "0000FF"
        );
    }

    #[tokio::test]
    async fn ears_position_out_of_range_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let device = controller(&temp);

        let req = EarsRequest {
            left: Some(17),
            right: None,
            reset: false,
        };
        let err = device.set_ears(&req).await.expect_err("out of range");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ears_request_without_positions_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let device = controller(&temp);

        let req = EarsRequest {
            left: None,
            right: None,
            reset: false,
        };
        assert!(device.set_ears(&req).await.is_err());
    }

    #[test]
    fn tts_cache_key_depends_on_voice() {
        let a = tts_cache_name("alice", "hello");
        let b = tts_cache_name("bob", "hello");
        assert_ne!(a, b);
    }
}
