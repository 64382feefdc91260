//! Analysis job orchestration.
//!
//! Submits new jobs, polls in-flight jobs, fetches detail on completed jobs,
//! and reconciles every backend response into the job store. The store's
//! rank and generation rules decide whether a response still applies; the
//! orchestrator never mutates a job directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::catalog::{Camera, Video};

use super::models::{AnalysisJob, JobState};
use super::store::{AnalysisJobStore, UpsertOutcome};

#[derive(Deserialize)]
struct MyAnalysesResponse {
    analisis: Vec<AnalysisJob>,
}

#[derive(Deserialize)]
struct JobResponse {
    analisis: AnalysisJob,
}

#[derive(Serialize)]
struct StartAnalysisRequest<'a> {
    camera_id: &'a str,
    video_name: &'a str,
}

/// Result of a status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job is unknown or already terminal locally; no request was made.
    Skipped,
    /// The response was reconciled; the job is now in this state.
    Applied(JobState),
    /// The response arrived too late and was discarded by the store.
    Stale,
}

/// Coordinates analysis jobs between the backend and the local store.
pub struct AnalysisOrchestrator {
    api: Arc<ApiClient>,
    store: Arc<AnalysisJobStore>,
}

impl AnalysisOrchestrator {
    pub fn new(api: Arc<ApiClient>, store: Arc<AnalysisJobStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<AnalysisJobStore> {
        &self.store
    }

    /// Fetch the user's jobs and replace the visible set.
    /// On failure the store is left unchanged.
    pub async fn list_mine(&self) -> ApiResult<Vec<AnalysisJob>> {
        let response: MyAnalysesResponse =
            self.api.get("/actividad-sospechosa/mis_analisis/").await?;
        self.store.replace_all(response.analisis);
        Ok(self.store.jobs())
    }

    /// Submit a camera/video pair for analysis.
    ///
    /// Both must be selected; otherwise the call fails with
    /// `InvalidSelection` before any network activity. On success the
    /// server-assigned job is reconciled into the store and returned.
    pub async fn submit(
        &self,
        camera: Option<&Camera>,
        video: Option<&Video>,
    ) -> ApiResult<AnalysisJob> {
        let (camera, video) = match (camera, video) {
            (Some(camera), Some(video)) => (camera, video),
            _ => {
                return Err(ApiError::InvalidSelection(
                    "both a camera and a recorded video must be selected".to_string(),
                ))
            }
        };

        let request = StartAnalysisRequest {
            camera_id: &camera.id,
            video_name: &video.name,
        };
        let response: JobResponse = self
            .api
            .post("/actividad-sospechosa/iniciar_analisis/", &request)
            .await?;

        let job = response.analisis;
        info!(
            job_id = job.id,
            camera_id = %camera.id,
            video_name = %video.name,
            "Analysis submitted"
        );
        self.store.upsert(job.clone());
        Ok(job)
    }

    /// Check the backend state of one in-flight job.
    ///
    /// Polling a job that is unknown or already terminal locally is a no-op,
    /// not an error. A response describing an older state than the store
    /// already holds is discarded, never applied.
    pub async fn poll_status(&self, job_id: i64) -> ApiResult<PollOutcome> {
        match self.store.get(job_id) {
            None => {
                debug!(job_id, "Skipping poll of unknown job");
                return Ok(PollOutcome::Skipped);
            }
            Some(job) if job.state.is_terminal() => {
                debug!(job_id, state = ?job.state, "Skipping poll of terminal job");
                return Ok(PollOutcome::Skipped);
            }
            Some(_) => {}
        }

        let generation = self.store.generation();
        let response: JobResponse = self
            .api
            .post_empty(&format!(
                "/actividad-sospechosa/{}/verificar_estado/",
                job_id
            ))
            .await?;

        let state = response.analisis.state;
        match self.store.upsert_in(generation, response.analisis) {
            UpsertOutcome::StaleDiscarded => Ok(PollOutcome::Stale),
            _ => Ok(PollOutcome::Applied(state)),
        }
    }

    /// Fetch the full record of a known job, including its detections, and
    /// merge it into the store. Returns the merged snapshot.
    pub async fn fetch_detail(&self, job_id: i64) -> ApiResult<AnalysisJob> {
        if self.store.get(job_id).is_none() {
            return Err(ApiError::InvalidSelection(format!(
                "job {} is not known",
                job_id
            )));
        }

        let generation = self.store.generation();
        let response: JobResponse = self
            .api
            .get(&format!(
                "/actividad-sospechosa/{}/detalle_analisis/",
                job_id
            ))
            .await?;

        let fetched = response.analisis;
        self.store.upsert_in(generation, fetched.clone());
        Ok(self.store.get(job_id).unwrap_or(fetched))
    }
}
