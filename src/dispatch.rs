//! Batched action dispatch.
//!
//! Maps a generic `{type, params}` action descriptor onto the same typed
//! device operations the HTTP handlers use, and normalizes every outcome
//! into a uniform success/error envelope. Actions in a batch run
//! strictly sequentially, in submission order; one action's failure
//! never blocks the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    device::{EarsRequest, LedRequest},
    error::{ApiError, Result},
    state::AppState,
    status,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub action: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ActionResult {
    fn success(action: &str, data: Value) -> Self {
        Self {
            action: action.to_string(),
            status: "success".to_string(),
            data: Some(data),
            details: None,
        }
    }

    fn error(action: &str, details: String) -> Self {
        Self {
            action: action.to_string(),
            status: "error".to_string(),
            data: None,
            details: Some(details),
        }
    }
}

/// Every action type the agent endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    StatusGet,
    LedsSet,
    EarsSet,
    Reboot,
    Sleep,
    WakeUp,
}

impl ActionKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "status.get" => Some(Self::StatusGet),
            "leds.set" => Some(Self::LedsSet),
            "ears.set" => Some(Self::EarsSet),
            "device.reboot" => Some(Self::Reboot),
            "device.sleep" => Some(Self::Sleep),
            "device.wakeup" => Some(Self::WakeUp),
            _ => None,
        }
    }
}

/// Execute one action descriptor, capturing any failure into the result
/// envelope rather than propagating it.
pub async fn execute(state: &AppState, descriptor: &ActionDescriptor) -> ActionResult {
    let Some(kind) = ActionKind::parse(&descriptor.action_type) else {
        return ActionResult::error(
            &descriptor.action_type,
            format!("Unknown action type: {}", descriptor.action_type),
        );
    };

    match run_action(state, kind, &descriptor.params).await {
        Ok(data) => ActionResult::success(&descriptor.action_type, data),
        Err(e) => ActionResult::error(&descriptor.action_type, e.to_string()),
    }
}

/// Execute a batch in submission order, returning one result per action.
pub async fn execute_batch(
    state: &AppState,
    actions: &[ActionDescriptor],
) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());
    for descriptor in actions {
        results.push(execute(state, descriptor).await);
    }
    results
}

fn typed_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Map<String, Value>,
) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| ApiError::Validation(format!("Invalid parameters: {}", e)))
}

async fn run_action(
    state: &AppState,
    kind: ActionKind,
    params: &serde_json::Map<String, Value>,
) -> Result<Value> {
    match kind {
        ActionKind::StatusGet => {
            let snapshot = status::gather(&state.config).await;
            serde_json::to_value(snapshot)
                .map_err(|e| ApiError::Internal(e.to_string()))
        }
        ActionKind::LedsSet => {
            let req: LedRequest = typed_params(params)?;
            let message = state.device.lock().await.set_leds(&req).await?;
            Ok(serde_json::json!({ "return_code": 0, "message": message }))
        }
        ActionKind::EarsSet => {
            let req: EarsRequest = typed_params(params)?;
            let message = state.device.lock().await.set_ears(&req).await?;
            Ok(serde_json::json!({ "return_code": 0, "message": message }))
        }
        ActionKind::Reboot => {
            state.device.lock().await.reboot().await?;
            Ok(serde_json::json!({ "message": "Karotz device is rebooting" }))
        }
        ActionKind::Sleep => {
            state.device.lock().await.sleep().await?;
            Ok(serde_json::json!({ "message": "Karotz device is going to sleep" }))
        }
        ActionKind::WakeUp => {
            state.device.lock().await.wakeup().await?;
            Ok(serde_json::json!({ "message": "Karotz device is waking up" }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn test_state(temp: &TempDir) -> AppState {
        let mut config = Config::default();
        config.paths.data_dir = temp.path().join("data");
        config.paths.www_dir = temp.path().join("www");
        config.paths.sysfs_net_dir = temp.path().join("net");
        config.paths.primary_mount = temp.path().join("not-mounted");
        config.paths.usb_mount = temp.path().join("also-not-mounted");
        config.bins.led = "/bin/true".into();
        config.bins.ears = "/bin/true".into();
        config.bins.sleep = "/bin/true".into();
        config.bins.wakeup = "/bin/true".into();
        AppState::new(config)
    }

    fn descriptor(action_type: &str, params: Value) -> ActionDescriptor {
        ActionDescriptor {
            action_type: action_type.to_string(),
            params: match params {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
        }
    }

    #[tokio::test]
    async fn unknown_action_type_yields_error_envelope() {
        let temp = TempDir::new().expect("temp dir");
        let state = test_state(&temp);

        let result = execute(&state, &descriptor("bogus", Value::Null)).await;
        assert_eq!(result.status, "error");
        assert_eq!(result.details.as_deref(), Some("Unknown action type: bogus"));
    }

    #[tokio::test]
    async fn batch_runs_in_order_and_survives_a_failing_action() {
        let temp = TempDir::new().expect("temp dir");
        let state = test_state(&temp);

        let actions = vec![
            descriptor("status.get", Value::Null),
            descriptor("bogus", Value::Null),
            descriptor("device.sleep", Value::Null),
        ];
        let results = execute_batch(&state, &actions).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].action, "status.get");
        assert_eq!(results[0].status, "success");
        assert_eq!(results[1].status, "error");
        assert_eq!(
            results[1].details.as_deref(),
            Some("Unknown action type: bogus")
        );
        assert_eq!(results[2].action, "device.sleep");
        assert_eq!(results[2].status, "success");
    }

    #[tokio::test]
    async fn led_conflict_surfaces_as_error_envelope() {
        let temp = TempDir::new().expect("temp dir");
        let state = test_state(&temp);

        let result = execute(
            &state,
            &descriptor(
                "leds.set",
                serde_json::json!({ "color": "FF0000", "pulse": true, "blink": true }),
            ),
        )
        .await;
        assert_eq!(result.status, "error");
        let details = result.details.expect("details");
        assert!(details.contains("pulse"));
        assert!(details.contains("blink"));
    }

    #[tokio::test]
    async fn missing_required_param_is_a_validation_error_without_side_effects() {
        let temp = TempDir::new().expect("temp dir");
        let state = test_state(&temp);

        let result = execute(
            &state,
            &descriptor("leds.set", serde_json::json!({ "pulse": true })),
        )
        .await;
        assert_eq!(result.status, "error");
        assert!(!state.config.led_color_file().exists());
    }

    #[tokio::test]
    async fn status_action_carries_snapshot_data() {
        let temp = TempDir::new().expect("temp dir");
        let state = test_state(&temp);

        let result = execute(&state, &descriptor("status.get", Value::Null)).await;
        assert_eq!(result.status, "success");
        let data = result.data.expect("data");
        assert_eq!(data["version"], "0");
        assert_eq!(data["led_color"], crate::config::DEFAULT_LED_COLOR);
    }
}
