use anyhow::Context;
use karotz_api::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing once for the whole process.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("karotz_api=debug".parse()?),
        )
        .init();

    tracing::info!("Starting OpenKarotz API server");

    // Override the config path via KAROTZ_API_CONFIG if needed.
    let config = Config::load_with_fallback("/usr/karotz/etc/api.toml");
    let bind = config.server.bind.clone();

    let state = AppState::new(config);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    tracing::info!("Server listening on http://{}", bind);
    tracing::info!("Status endpoint: GET /api/system/status");
    tracing::info!("Agent endpoint:  POST /api/agent/mcp");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
