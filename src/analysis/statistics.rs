//! Aggregate statistics over the user's analysis history.
//!
//! The backend computes the aggregates so historical jobs that were never
//! loaded into the session are included. The snapshot is read-only and
//! refreshed on demand.

use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiResult};

use super::models::Statistics;

#[derive(Deserialize)]
struct StatisticsResponse {
    estadisticas: Statistics,
}

/// Fetches the pre-aggregated statistics snapshot.
pub struct StatisticsClient {
    api: Arc<ApiClient>,
}

impl StatisticsClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> ApiResult<Statistics> {
        let response: StatisticsResponse =
            self.api.get("/actividad-sospechosa/estadisticas/").await?;
        Ok(response.estadisticas)
    }
}
