//! Lifetime generation statistics (`GET /stats`).

use crate::error::ApiError;
use crate::generation::Summary;
use crate::settings::null_as_default;
use crate::studio::{map_send_error, read_json, StudioClient};
use serde::{Deserialize, Serialize};

/// Success/failure tally and spend across all batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(rename = "success_count", default, deserialize_with = "null_as_default")]
    pub success: u64,
    #[serde(rename = "failed_count", default, deserialize_with = "null_as_default")]
    pub failed: u64,
    #[serde(rename = "total_cost", default, deserialize_with = "null_as_default")]
    pub cost: f64,
}

impl GlobalStats {
    /// Fold a finished batch into the running totals.
    pub fn merge(&mut self, summary: &Summary) {
        self.success += summary.succeeded as u64;
        self.failed += summary.failed as u64;
        self.cost += summary.accumulated_cost;
    }

    /// Cost with four decimals, e.g. `$0.0450`.
    pub fn display_cost(&self) -> String {
        format_cost(self.cost)
    }
}

pub fn format_cost(cost: f64) -> String {
    let cost = if cost.is_finite() { cost } else { 0.0 };
    format!("${:.4}", cost)
}

#[derive(Debug, Clone)]
pub struct StatsStore {
    client: StudioClient,
}

impl StatsStore {
    pub fn new(client: StudioClient) -> Self {
        Self { client }
    }

    pub async fn fetch(&self) -> Result<GlobalStats, ApiError> {
        let response = self
            .client
            .http()
            .get(self.client.url("stats"))
            .send()
            .await
            .map_err(map_send_error)?;
        read_json(response).await
    }
}
