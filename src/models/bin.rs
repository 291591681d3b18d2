//! Bin prediction, override, and aggregated view models.

use serde::{Deserialize, Serialize};

/// Raw prediction for one bin as returned by the external model service.
///
/// The service may attach extra fields (area, coordinates, minutes until
/// full); those are passed through to the aggregated view untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct BinPrediction {
    pub bin_id: String,
    pub predicted_fill: f64,
    #[serde(default)]
    pub insufficient_data: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Operational action a worker or admin can record against a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinAction {
    Collect,
    Schedule,
}

/// Persisted override record for one bin.
///
/// Flags are monotonic: once set they are never cleared through this
/// interface, though the timestamps update on repeated actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinOverride {
    #[serde(default)]
    pub collected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

/// Derived status of a bin, classified from the predicted fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinStatus {
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "critical")]
    Critical,
    #[serde(rename = "no-data")]
    NoData,
    #[serde(rename = "normal")]
    Normal,
}

impl BinStatus {
    /// Classify from the predicted fill level. Thresholds are inclusive
    /// lower bounds; `no-data` only applies below the critical threshold.
    pub fn classify(predicted_fill: f64, insufficient_data: bool) -> Self {
        if predicted_fill >= 100.0 {
            BinStatus::Full
        } else if predicted_fill >= 80.0 {
            BinStatus::Critical
        } else if insufficient_data {
            BinStatus::NoData
        } else {
            BinStatus::Normal
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, BinStatus::Full | BinStatus::Critical)
    }
}

/// User-facing merged view of one bin, computed fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedBin {
    pub bin_id: String,
    pub predicted_fill: f64,
    pub insufficient_data: bool,
    pub status: BinStatus,
    pub collected: bool,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
