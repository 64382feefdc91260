//! Promotion of a detection into a published alert.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::api::{ApiClient, ApiError, ApiResult};

use super::store::AnalysisJobStore;

#[derive(Deserialize)]
struct GenerateAlertResponse {
    alert_id: i64,
}

/// Result of a promotion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The notification service accepted the alert.
    Promoted { alert_id: i64 },
    /// The detection already carries an alert; no request was issued.
    AlreadyPromoted { alert_id: i64 },
}

impl PromotionOutcome {
    pub fn alert_id(&self) -> i64 {
        match self {
            PromotionOutcome::Promoted { alert_id }
            | PromotionOutcome::AlreadyPromoted { alert_id } => *alert_id,
        }
    }
}

/// Turns a single detection into a published alert and reconciles the
/// result back into the job store.
pub struct DetectionAlertPromoter {
    api: Arc<ApiClient>,
    store: Arc<AnalysisJobStore>,
}

impl DetectionAlertPromoter {
    pub fn new(api: Arc<ApiClient>, store: Arc<AnalysisJobStore>) -> Self {
        Self { api, store }
    }

    /// Publish an alert for the given detection.
    ///
    /// The detection must be known to the store. A detection that already
    /// carries an alert returns the existing alert id without a network
    /// call; the backend is not relied upon to deduplicate. On failure the
    /// detection is left unmodified and the notification service's message
    /// is surfaced verbatim.
    pub async fn promote(&self, detection_id: i64) -> ApiResult<PromotionOutcome> {
        let (job_id, detection) = self.store.find_detection(detection_id).ok_or_else(|| {
            ApiError::InvalidSelection(format!("detection {} is not known", detection_id))
        })?;

        if detection.alert_generated {
            if let Some(alert_id) = detection.alert_id {
                return Ok(PromotionOutcome::AlreadyPromoted { alert_id });
            }
        }

        let response: GenerateAlertResponse = self
            .api
            .post_empty(&format!(
                "/actividad-sospechosa/{}/generar_aviso/",
                detection_id
            ))
            .await?;

        self.store.apply_promotion(detection_id, response.alert_id);
        info!(
            detection_id,
            job_id,
            alert_id = response.alert_id,
            "Alert published for detection"
        );

        Ok(PromotionOutcome::Promoted {
            alert_id: response.alert_id,
        })
    }
}
