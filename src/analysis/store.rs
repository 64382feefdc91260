//! In-memory store of the current user's analysis jobs.
//!
//! The store is the single mutable shared resource: every reconciliation of
//! a backend response routes through `upsert`/`replace_all`, which are the
//! only place the merge and ordering rules are enforced. Consumers read
//! cloned snapshots and never hold a second mutable copy of a job.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use super::models::{AnalysisJob, Detection};

/// Result of reconciling a job into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The job was not known and has been inserted.
    Inserted,
    /// The job was known and the update has been merged.
    Merged,
    /// The update described an older state (or an older store generation)
    /// and was discarded.
    StaleDiscarded,
}

struct Inner {
    jobs: HashMap<i64, AnalysisJob>,
    /// Bumped on every `replace_all`. Reconciliations started before the
    /// bump carry the old value and are discarded on arrival.
    generation: u64,
}

/// Authoritative view of the jobs belonging to the current session.
pub struct AnalysisJobStore {
    inner: Mutex<Inner>,
}

impl AnalysisJobStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: HashMap::new(),
                generation: 0,
            }),
        }
    }

    /// Current store generation. Capture it before issuing a request and
    /// pass it to [`upsert_in`](Self::upsert_in) when the response arrives.
    pub fn generation(&self) -> u64 {
        self.inner.lock().unwrap().generation
    }

    /// Insert or merge a job.
    ///
    /// Ordering is asserted by state rank, never by arrival time: a response
    /// describing a state that ranks below what the store already holds is
    /// discarded, and a terminal state is never replaced by the other
    /// terminal state.
    pub fn upsert(&self, job: AnalysisJob) -> UpsertOutcome {
        let mut inner = self.inner.lock().unwrap();
        Self::upsert_locked(&mut inner, job)
    }

    /// Like [`upsert`](Self::upsert), but additionally discards the update
    /// when the store generation has moved past `generation` (the visible
    /// set was replaced while the request was in flight).
    pub fn upsert_in(&self, generation: u64, job: AnalysisJob) -> UpsertOutcome {
        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            debug!(
                job_id = job.id,
                generation, current = inner.generation, "Discarding update from stale generation"
            );
            return UpsertOutcome::StaleDiscarded;
        }
        Self::upsert_locked(&mut inner, job)
    }

    fn upsert_locked(inner: &mut Inner, incoming: AnalysisJob) -> UpsertOutcome {
        match inner.jobs.get(&incoming.id) {
            None => {
                inner.jobs.insert(incoming.id, incoming);
                UpsertOutcome::Inserted
            }
            Some(existing) => {
                if incoming.state.rank() < existing.state.rank() {
                    debug!(
                        job_id = incoming.id,
                        stored = ?existing.state,
                        incoming = ?incoming.state,
                        "Discarding stale job update"
                    );
                    return UpsertOutcome::StaleDiscarded;
                }
                if existing.state.is_terminal() && incoming.state != existing.state {
                    debug!(
                        job_id = incoming.id,
                        stored = ?existing.state,
                        incoming = ?incoming.state,
                        "Refusing to replace a terminal state"
                    );
                    return UpsertOutcome::StaleDiscarded;
                }
                let merged = Self::merge(existing, incoming);
                inner.jobs.insert(merged.id, merged);
                UpsertOutcome::Merged
            }
        }
    }

    /// Field-level merge: the incoming record wins, but data the response
    /// does not carry never erases data the store already holds.
    fn merge(existing: &AnalysisJob, mut incoming: AnalysisJob) -> AnalysisJob {
        if incoming.detections.is_none() {
            incoming.detections = existing.detections.clone();
            // A summary without the detail payload also reports no count.
            if incoming.detection_count == 0 {
                incoming.detection_count = existing.detection_count;
            }
        }
        if incoming.completed_at.is_none() {
            incoming.completed_at = existing.completed_at;
        }
        if incoming.average_confidence.is_none() {
            incoming.average_confidence = existing.average_confidence;
        }
        if incoming.error_message.is_none() {
            incoming.error_message = existing.error_message.clone();
        }
        if incoming.external_job_id.is_none() {
            incoming.external_job_id = existing.external_job_id.clone();
        }
        incoming
    }

    /// Replace the entire visible set after a full list refresh.
    /// Bumps the generation so in-flight reconciliations are invalidated.
    pub fn replace_all(&self, jobs: Vec<AnalysisJob>) {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.jobs = jobs.into_iter().map(|job| (job.id, job)).collect();
    }

    /// Snapshot of one job.
    pub fn get(&self, id: i64) -> Option<AnalysisJob> {
        self.inner.lock().unwrap().jobs.get(&id).cloned()
    }

    /// Snapshot of all jobs, most recent first.
    pub fn jobs(&self) -> Vec<AnalysisJob> {
        let inner = self.inner.lock().unwrap();
        let mut jobs: Vec<AnalysisJob> = inner.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        jobs
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locate a detection across all known jobs.
    pub fn find_detection(&self, detection_id: i64) -> Option<(i64, Detection)> {
        let inner = self.inner.lock().unwrap();
        for job in inner.jobs.values() {
            if let Some(detections) = &job.detections {
                if let Some(detection) = detections.iter().find(|d| d.id == detection_id) {
                    return Some((job.id, detection.clone()));
                }
            }
        }
        None
    }

    /// Record a successful promotion on the detection, in place within its
    /// parent job. A detection that is already promoted is left untouched;
    /// the flag never goes back to false.
    ///
    /// Returns false if the detection is not known.
    pub fn apply_promotion(&self, detection_id: i64, alert_id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        for job in inner.jobs.values_mut() {
            if let Some(detections) = &mut job.detections {
                if let Some(detection) = detections.iter_mut().find(|d| d.id == detection_id) {
                    if !detection.alert_generated {
                        detection.alert_generated = true;
                        detection.alert_id = Some(alert_id);
                    }
                    return true;
                }
            }
        }
        false
    }
}

impl Default for AnalysisJobStore {
    fn default() -> Self {
        Self::new()
    }
}
