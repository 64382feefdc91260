//! Data models for suspicious-activity analysis jobs.
//!
//! Defines job lifecycle states, jobs, detections, and aggregate statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ActivityCategory, ActivityType};

/// Lifecycle state of an analysis job.
///
/// Transitions are monotonic: `PENDING → PROCESSING → {COMPLETED, ERROR}`.
/// `COMPLETED` and `ERROR` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Processing,
    Completed, // terminal
    Error,     // terminal
}

impl JobState {
    /// Returns true if this is a terminal state (Completed or Error).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }

    /// Ordering rank used to reject stale updates.
    /// `PENDING` < `PROCESSING` < terminal; the two terminal states share a
    /// rank since neither may overwrite the other.
    pub fn rank(&self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::Processing => 1,
            JobState::Completed | JobState::Error => 2,
        }
    }

    /// The single action a job in this state offers to the operator.
    pub fn action(&self) -> JobAction {
        match self {
            JobState::Pending | JobState::Processing => JobAction::CheckStatus,
            JobState::Completed => JobAction::ViewDetail,
            JobState::Error => JobAction::ShowError,
        }
    }
}

/// What the UI may offer for a job in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    CheckStatus,
    ViewDetail,
    ShowError,
}

/// One timestamped activity instance found within a job's video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    /// Snapshot of the activity type at detection time, not a live
    /// reference into the catalog.
    pub activity_type: ActivityType,
    pub start_offset_seconds: f64,
    pub end_offset_seconds: f64,
    /// Always `end_offset_seconds - start_offset_seconds`.
    pub duration_seconds: f64,
    /// Confidence in percent, 0-100.
    pub confidence: f64,
    #[serde(default)]
    pub detected_objects: BTreeSet<String>,
    /// Once true, stays true; `alert_id` is set if and only if this is.
    pub alert_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One submitted video-analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    /// Backend-assigned identifier.
    pub id: i64,
    pub camera_id: String,
    pub video_name: String,
    #[serde(default)]
    pub video_url: String,
    pub state: JobState,
    /// Correlation id of the backend AI pipeline run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_job_id: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub detection_count: u32,
    /// Average confidence over the job's detections, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    /// Present iff `state == ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// `None` until a detail fetch; `Some(vec![])` means detail was fetched
    /// and nothing was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,
}

impl AnalysisJob {
    /// Detections, if detail has been fetched.
    pub fn detections(&self) -> &[Detection] {
        self.detections.as_deref().unwrap_or_default()
    }
}

/// Aggregate statistics over the user's analysis history, computed by the
/// backend so historical jobs not held in memory are included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub processing_jobs: u64,
    pub total_detections: u64,
    #[serde(default)]
    pub detections_by_category: BTreeMap<ActivityCategory, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    pub alerts_generated: u64,
}
