use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::{self, ActionDescriptor, ActionResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub results: Vec<ActionResult>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/mcp", post(handle_batch))
}

/// Run a batch of action descriptors sequentially, in submission order,
/// and return one envelope per action.
async fn handle_batch(
    State(state): State<AppState>,
    Json(req): Json<AgentRequest>,
) -> Json<AgentResponse> {
    tracing::debug!("Agent batch of {} action(s)", req.actions.len());
    let results = dispatch::execute_batch(&state, &req.actions).await;
    Json(AgentResponse { results })
}
