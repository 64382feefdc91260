//! Suspicious-activity analysis: jobs, the job store, orchestration,
//! detection-to-alert promotion, and aggregate statistics.

mod models;
mod orchestrator;
mod promoter;
mod statistics;
mod store;

pub use models::{AnalysisJob, Detection, JobAction, JobState, Statistics};
pub use orchestrator::{AnalysisOrchestrator, PollOutcome};
pub use promoter::{DetectionAlertPromoter, PromotionOutcome};
pub use statistics::StatisticsClient;
pub use store::{AnalysisJobStore, UpsertOutcome};
