// SPDX-License-Identifier: MIT

//! JSON API routes: aggregated predictions, bin status updates, and the
//! server-sent-events heartbeat stream.

use crate::error::Result;
use crate::models::{AggregatedBin, BinAction};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/predict", get(predict))
        .route("/api/update-bin", post(update_bin))
        .route("/api/updates", get(updates))
}

/// Aggregated bin views: external predictions merged with local overrides.
/// Fails whole (HTTP 500) when the prediction service is unreachable.
async fn predict(State(state): State<Arc<AppState>>) -> Result<Json<Vec<AggregatedBin>>> {
    let bins = state.predictor.list(&state.status).await?;
    Ok(Json(bins))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBinRequest {
    bin_id: String,
    action: BinAction,
}

#[derive(Serialize)]
pub struct UpdateBinResponse {
    pub success: bool,
}

/// Record an operational action against a bin. The override is durable
/// before this returns; a failed persist is an error, never a silent no-op.
async fn update_bin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateBinRequest>,
) -> Result<Json<UpdateBinResponse>> {
    state.status.apply(&request.bin_id, request.action).await?;
    Ok(Json(UpdateBinResponse { success: true }))
}

/// Heartbeat payload pushed to connected clients.
#[derive(Serialize)]
struct Heartbeat {
    timestamp: String,
}

/// Long-lived SSE stream emitting a timestamp heartbeat at a fixed interval.
/// The interval lives inside the stream, so closing the connection drops the
/// stream and cancels the timer with it.
async fn updates(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let period = Duration::from_secs(state.config.heartbeat_secs);
    // First tick after one full period, matching the fixed cadence.
    let interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    let stream = IntervalStream::new(interval).map(|_| {
        let payload = Heartbeat {
            timestamp: now_rfc3339(),
        };
        Ok(Event::default().data(
            serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string()),
        ))
    });

    Sse::new(stream)
}
