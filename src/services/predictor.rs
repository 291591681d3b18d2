// SPDX-License-Identifier: MIT

//! Prediction service client and status aggregation.
//!
//! Fetches raw fill-level predictions from the external model service and
//! merges them with locally persisted overrides into the user-facing view.
//! An upstream failure fails the whole listing; there are no partial results
//! and no stale cache.

use crate::db::StatusStore;
use crate::error::AppError;
use crate::models::{AggregatedBin, BinOverride, BinPrediction, BinStatus};
use crate::time_utils::now_rfc3339;
use std::collections::HashMap;
use std::time::Duration;

/// Client for the external prediction model service.
#[derive(Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }

    /// Fetch raw predictions from the model service.
    pub async fn fetch(&self) -> Result<Vec<BinPrediction>, AppError> {
        let response = self.http.get(&self.endpoint).send().await.map_err(|e| {
            tracing::error!(error = %e, endpoint = %self.endpoint, "Prediction fetch failed");
            AppError::UpstreamUnavailable
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                endpoint = %self.endpoint,
                "Prediction service returned error status"
            );
            return Err(AppError::UpstreamUnavailable);
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Prediction response parse error");
            AppError::UpstreamUnavailable
        })
    }

    /// Fetch predictions and merge with the override store.
    pub async fn list(&self, status: &StatusStore) -> Result<Vec<AggregatedBin>, AppError> {
        let predictions = self.fetch().await?;
        let overrides = status.snapshot().await;
        Ok(aggregate(predictions, &overrides))
    }
}

/// Merge raw predictions with override records. `last_updated` is the
/// aggregation time, not the source's timestamp.
pub fn aggregate(
    predictions: Vec<BinPrediction>,
    overrides: &HashMap<String, BinOverride>,
) -> Vec<AggregatedBin> {
    let now = now_rfc3339();
    predictions
        .into_iter()
        .map(|pred| {
            let record = overrides.get(&pred.bin_id);
            AggregatedBin {
                status: BinStatus::classify(pred.predicted_fill, pred.insufficient_data),
                collected: record.map(|r| r.collected).unwrap_or(false),
                last_updated: now.clone(),
                bin_id: pred.bin_id,
                predicted_fill: pred.predicted_fill,
                insufficient_data: pred.insufficient_data,
                extra: pred.extra,
            }
        })
        .collect()
}
