use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use karotz_api::{api, config::Config, state::AppState};

fn test_app(temp: &TempDir) -> axum::Router {
    let mut config = Config::default();
    config.paths.data_dir = temp.path().join("data");
    config.paths.www_dir = temp.path().join("www");
    config.paths.sysfs_net_dir = temp.path().join("net");
    config.paths.primary_mount = temp.path().join("not-mounted");
    config.paths.usb_mount = temp.path().join("also-not-mounted");
    config.paths.log_file = temp.path().join("messages");
    config.paths.apps_dir = temp.path().join("apps");
    config.paths.updates_dir = temp.path().join("updates");
    config.bins.led = "/bin/true".into();
    config.bins.ears = "/bin/true".into();
    config.bins.sleep = "/bin/true".into();
    config.bins.wakeup = "/bin/true".into();
    api::router(AppState::new(config))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn welcome_endpoint_responds() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app.oneshot(get("/api")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Welcome to the OpenKarotz Modern API");
}

#[tokio::test]
async fn status_reports_defaults_on_empty_filesystem() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app.oneshot(get("/api/system/status")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["version"], "0");
    assert_eq!(body["led_color"], "00FF00");
    assert_eq!(body["sleep_active"], false);
    assert_eq!(body["storage_usb_used_percent"], -1);
    assert_eq!(body["mac_address_eth"], "00:00:00:00:00:00");
}

#[tokio::test]
async fn led_pulse_and_blink_conflict_is_a_400() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/action/leds",
            serde_json::json!({ "color": "FF0000", "pulse": true, "blink": true }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("pulse"));
    assert!(message.contains("blink"));
}

#[tokio::test]
async fn led_request_succeeds_and_persists_color() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/action/leds",
            serde_json::json!({ "color": "0000FF" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["return_code"], 0);

    let persisted =
        std::fs::read_to_string(temp.path().join("data/Run/led.color")).expect("marker");
    assert_eq!(persisted, "0000FF");
}

#[tokio::test]
async fn agent_batch_preserves_order_across_failures() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/agent/mcp",
            serde_json::json!({
                "actions": [
                    { "type": "status.get" },
                    { "type": "bogus" },
                    { "type": "device.sleep" }
                ]
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let results = body["results"].as_array().expect("results");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["details"], "Unknown action type: bogus");
    assert_eq!(results[2]["status"], "success");
}

#[tokio::test]
async fn rfid_assign_then_list_round_trip() {
    let temp = TempDir::new().expect("temp dir");

    let response = test_app(&temp)
        .oneshot(json_request(
            "POST",
            "/api/rfid/tags/0123ABCD/assign",
            serde_json::json!({ "action_type": "url", "value": "http://example.com/a.mp3" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_app(&temp)
        .oneshot(get("/api/rfid/tags"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tags = body.as_array().expect("tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["tag_id"], "0123ABCD");
    assert_eq!(tags[0]["action_type"], "url");
    assert_eq!(tags[0]["action_url"], "http://example.com/a.mp3");
}

#[tokio::test]
async fn rfid_delete_removes_all_siblings_and_is_idempotent() {
    let temp = TempDir::new().expect("temp dir");

    let rfid_dir = temp.path().join("data/Rfid");
    std::fs::create_dir_all(&rfid_dir).expect("mkdir");
    for extension in ["rfid", "name", "color"] {
        std::fs::write(rfid_dir.join(format!("0123ABCD.{}", extension)), "x")
            .expect("write");
    }

    let response = test_app(&temp)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/rfid/tags/0123ABCD")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    for extension in ["rfid", "name", "color"] {
        assert!(!rfid_dir.join(format!("0123ABCD.{}", extension)).exists());
    }

    // Second delete of the same tag succeeds identically.
    let response = test_app(&temp)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/rfid/tags/0123ABCD")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Tag 0123ABCD has been deleted");
}

#[tokio::test]
async fn playing_an_unknown_sound_is_a_404() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/media/sounds/play",
            serde_json::json!({ "id": "missing.mp3" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn playback_without_id_or_url_is_a_400() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/media/sounds/play",
            serde_json::json!({}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_a_relative_directory_is_a_400() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(get("/api/tools/files?directory=relative/path"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_log_file_is_a_404() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app.oneshot(get("/api/tools/logs")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tts_with_unknown_voice_is_a_400() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tts/generate",
            serde_json::json!({ "text": "hello", "voice": "nobody" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn installing_an_unknown_app_is_a_404() {
    let temp = TempDir::new().expect("temp dir");
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/management/apps/clock/install",
            serde_json::json!({}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
