//! Stub backend lifecycle management.
//!
//! Spins up an in-process HTTP server that emulates the platform backend's
//! success envelope, so tests exercise the real client stack over the wire.
//! Each test gets an isolated backend with its own scriptable state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vigia_console::analysis::{AnalysisJob, JobState, Statistics};
use vigia_console::catalog::{ActivityType, Camera, Video};

use super::constants::*;

/// Scriptable backend state shared with the test body.
#[derive(Default)]
pub struct StubState {
    pub cameras: Vec<Camera>,
    pub videos: HashMap<String, Vec<Video>>,
    pub activity_types: Vec<ActivityType>,
    pub jobs: HashMap<i64, AnalysisJob>,
    /// States handed out by successive status checks, per job, front first.
    /// When empty, the stored job state is reported.
    pub status_script: HashMap<i64, Vec<JobState>>,
    pub statistics: Option<Statistics>,
    /// Id assigned to the next submitted job.
    pub next_job_id: i64,
    /// Id assigned to the next published alert.
    pub next_alert_id: i64,
    /// Endpoints that answer `{success: false, error}` with this message.
    pub reject: HashMap<&'static str, String>,
    /// Endpoints that answer with a raw HTTP error status.
    pub fail_http: HashMap<&'static str, u16>,
    /// Request counter per endpoint.
    pub hits: HashMap<&'static str, usize>,
}

type Shared = Arc<Mutex<StubState>>;

/// Stub backend instance bound to a random port.
///
/// When dropped, the server shuts down.
pub struct TestBackend {
    /// Base URL for the client under test (e.g., "http://127.0.0.1:12345").
    pub base_url: String,

    /// Backend state, for scripting behavior and asserting on traffic.
    pub state: Shared,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestBackend {
    /// Spawns a stub backend with empty state.
    pub async fn spawn() -> Self {
        Self::spawn_with(StubState {
            next_job_id: 1,
            next_alert_id: 1,
            ..Default::default()
        })
        .await
    }

    /// Spawns a stub backend with the given initial state.
    pub async fn spawn_with(state: StubState) -> Self {
        let shared: Shared = Arc::new(Mutex::new(state));

        let app = Router::new()
            // Readiness probe only; not part of the emulated backend API.
            .route("/", get(|| async { "ok" }))
            .route("/cameras/list_cameras/", get(list_cameras))
            .route("/cameras/list_videos/", get(list_videos))
            .route("/actividad-sospechosa/mis_analisis/", get(my_analyses))
            .route(
                "/actividad-sospechosa/tipos_actividad/",
                get(activity_types),
            )
            .route("/actividad-sospechosa/estadisticas/", get(statistics))
            .route(
                "/actividad-sospechosa/iniciar_analisis/",
                post(start_analysis),
            )
            .route(
                "/actividad-sospechosa/{id}/verificar_estado/",
                post(check_status),
            )
            .route(
                "/actividad-sospechosa/{id}/detalle_analisis/",
                get(analysis_detail),
            )
            .route(
                "/actividad-sospechosa/{id}/generar_aviso/",
                post(generate_alert),
            )
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub backend failed");
        });

        let backend = Self {
            base_url,
            state: shared,
            _shutdown_tx: Some(shutdown_tx),
        };
        backend.wait_for_ready().await;
        backend
    }

    /// Number of requests the backend has seen on an endpoint.
    pub fn hits(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .hits
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Stub backend did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Checks the scripted failure modes for an endpoint and records the hit.
/// Returns the canned response when one is configured.
fn gate(state: &mut StubState, endpoint: &'static str) -> Option<Response> {
    *state.hits.entry(endpoint).or_insert(0) += 1;

    if let Some(status) = state.fail_http.get(endpoint) {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Some((status, "backend unavailable").into_response());
    }
    if let Some(message) = state.reject.get(endpoint) {
        return Some(Json(json!({"success": false, "error": message})).into_response());
    }
    None
}

fn envelope(mut payload: Value) -> Response {
    payload["success"] = json!(true);
    Json(payload).into_response()
}

/// Status responses carry the job summary without the detail payload.
fn job_summary(job: &AnalysisJob) -> AnalysisJob {
    let mut summary = job.clone();
    summary.detections = None;
    summary
}

async fn list_cameras(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "list_cameras") {
        return response;
    }
    envelope(json!({"cameras": state.cameras}))
}

async fn list_videos(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "list_videos") {
        return response;
    }
    let camera_id = match params.get("camera_id") {
        Some(camera_id) => camera_id,
        None => {
            return Json(json!({"success": false, "error": "camera_id is required"}))
                .into_response()
        }
    };
    let videos = state.videos.get(camera_id).cloned().unwrap_or_default();
    envelope(json!({"videos": videos}))
}

async fn my_analyses(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "mis_analisis") {
        return response;
    }
    let mut jobs: Vec<AnalysisJob> = state.jobs.values().map(job_summary).collect();
    jobs.sort_by_key(|job| std::cmp::Reverse(job.id));
    envelope(json!({"analisis": jobs}))
}

async fn activity_types(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "tipos_actividad") {
        return response;
    }
    envelope(json!({"tipos_actividad": state.activity_types}))
}

async fn statistics(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "estadisticas") {
        return response;
    }
    match &state.statistics {
        Some(statistics) => envelope(json!({"estadisticas": statistics})),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no statistics seeded").into_response(),
    }
}

#[derive(serde::Deserialize)]
struct StartAnalysisBody {
    camera_id: String,
    video_name: String,
}

async fn start_analysis(
    State(state): State<Shared>,
    Json(body): Json<StartAnalysisBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "iniciar_analisis") {
        return response;
    }

    let id = state.next_job_id;
    state.next_job_id += 1;

    let job = AnalysisJob {
        id,
        camera_id: body.camera_id,
        video_name: body.video_name,
        video_url: String::new(),
        state: JobState::Pending,
        external_job_id: None,
        started_at: chrono::Utc::now(),
        completed_at: None,
        requester_name: "operador@condominio".to_string(),
        detection_count: 0,
        average_confidence: None,
        error_message: None,
        detections: None,
    };
    state.jobs.insert(id, job.clone());
    envelope(json!({"analisis": job}))
}

async fn check_status(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "verificar_estado") {
        return response;
    }

    let next_state = state
        .status_script
        .get_mut(&id)
        .filter(|script| !script.is_empty())
        .map(|script| script.remove(0));

    let job = match state.jobs.get_mut(&id) {
        Some(job) => job,
        None => return (StatusCode::NOT_FOUND, "no such analysis").into_response(),
    };
    if let Some(next_state) = next_state {
        job.state = next_state;
        if next_state.is_terminal() && job.completed_at.is_none() {
            job.completed_at = Some(chrono::Utc::now());
        }
    }
    let summary = job_summary(job);
    envelope(json!({"analisis": summary}))
}

async fn analysis_detail(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "detalle_analisis") {
        return response;
    }
    match state.jobs.get(&id) {
        Some(job) => envelope(json!({"analisis": job})),
        None => (StatusCode::NOT_FOUND, "no such analysis").into_response(),
    }
}

async fn generate_alert(State(state): State<Shared>, Path(detection_id): Path<i64>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(response) = gate(&mut state, "generar_aviso") {
        return response;
    }

    let alert_id = state.next_alert_id;
    let mut found = false;
    for job in state.jobs.values_mut() {
        if let Some(detections) = &mut job.detections {
            if let Some(detection) = detections.iter_mut().find(|d| d.id == detection_id) {
                detection.alert_generated = true;
                detection.alert_id = Some(alert_id);
                found = true;
                break;
            }
        }
    }
    if !found {
        return Json(json!({"success": false, "error": "detección no encontrada"}))
            .into_response();
    }
    state.next_alert_id += 1;
    envelope(json!({"alert_id": alert_id}))
}
