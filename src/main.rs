use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vigia_console::analysis::{
    AnalysisJob, AnalysisJobStore, AnalysisOrchestrator, DetectionAlertPromoter, JobState,
    PollOutcome, PromotionOutcome, StatisticsClient,
};
use vigia_console::api::{ApiClient, EnvTokenProvider, StaticTokenProvider, TokenProvider};
use vigia_console::catalog::{ActivityTypeCatalogClient, CameraCatalogClient, VideoCatalogClient};
use vigia_console::config::{AppConfig, CliConfig, FileConfig};

/// Env var consulted for the session token when none is configured.
const TOKEN_ENV_VAR: &str = "VIGIA_SESSION_TOKEN";

#[derive(Parser, Debug)]
#[command(
    name = "vigia-console",
    about = "Operator console for suspicious-activity video analysis"
)]
struct CliArgs {
    /// Base URL of the platform backend.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Timeout in seconds for backend requests.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_sec: u64,

    /// Session bearer token. Falls back to --token-file, then to the
    /// VIGIA_SESSION_TOKEN environment variable.
    #[clap(long)]
    pub token: Option<String>,

    /// Path to a file containing the session bearer token.
    #[clap(long)]
    pub token_file: Option<PathBuf>,

    /// Path to a TOML config file; its values override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the cameras available to the current user.
    Cameras,
    /// List the stored videos of a camera.
    Videos { camera_id: String },
    /// List the detectable activity types.
    ActivityTypes,
    /// List my analysis jobs.
    Jobs,
    /// Submit a recorded video of a camera for analysis.
    Submit {
        camera_id: String,
        video_name: String,
    },
    /// Check the status of one in-flight job.
    Status { job_id: i64 },
    /// Poll a job until it reaches a terminal state.
    Watch {
        job_id: i64,
        /// Seconds between status checks.
        #[clap(long, default_value_t = 5)]
        interval_sec: u64,
    },
    /// Show the detections of a completed job.
    Detail { job_id: i64 },
    /// Publish an alert from one of a job's detections.
    Promote { job_id: i64, detection_id: i64 },
    /// Show aggregate statistics over the analysis history.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let cli_config = CliConfig {
        base_url: cli_args.base_url.clone(),
        request_timeout_sec: cli_args.request_timeout_sec,
        token: cli_args.token.clone(),
        token_file: cli_args.token_file.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let tokens: Arc<dyn TokenProvider> = match &config.token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => Arc::new(EnvTokenProvider::new(TOKEN_ENV_VAR)),
    };

    let api = Arc::new(ApiClient::new(
        config.base_url.clone(),
        Duration::from_secs(config.request_timeout_sec),
        tokens,
    ));
    let store = Arc::new(AnalysisJobStore::new());
    let orchestrator = AnalysisOrchestrator::new(api.clone(), store.clone());

    match cli_args.command {
        Command::Cameras => {
            let cameras = CameraCatalogClient::new(api).list_cameras().await?;
            for camera in cameras {
                println!("{}\t{}\t{}", camera.id, camera.name, camera.location);
            }
        }
        Command::Videos { camera_id } => {
            let videos = VideoCatalogClient::new(api).list_videos(&camera_id).await?;
            for video in videos {
                println!(
                    "{}\t{} bytes\t{}",
                    video.name, video.size_bytes, video.last_modified
                );
            }
        }
        Command::ActivityTypes => {
            let types = ActivityTypeCatalogClient::new(api)
                .list_activity_types()
                .await?;
            for activity_type in types {
                println!(
                    "{}\t{}\t{}\t{}",
                    activity_type.id,
                    activity_type.name,
                    activity_type.category_display,
                    if activity_type.active { "active" } else { "inactive" }
                );
            }
        }
        Command::Jobs => {
            for job in orchestrator.list_mine().await? {
                print_job(&job);
            }
        }
        Command::Submit {
            camera_id,
            video_name,
        } => {
            let cameras = CameraCatalogClient::new(api.clone()).list_cameras().await?;
            let camera = cameras.iter().find(|c| c.id == camera_id);
            if camera.is_none() {
                warn!(camera_id = %camera_id, "Camera not found in catalog");
            }

            let video = match camera {
                Some(camera) => {
                    let videos = VideoCatalogClient::new(api.clone())
                        .list_videos(&camera.id)
                        .await?;
                    let video = videos.into_iter().find(|v| v.name == video_name);
                    if video.is_none() {
                        warn!(video_name = %video_name, "Video not found for camera");
                    }
                    video
                }
                None => None,
            };

            let job = orchestrator.submit(camera, video.as_ref()).await?;
            print_job(&job);
        }
        Command::Status { job_id } => {
            orchestrator.list_mine().await?;
            match orchestrator.poll_status(job_id).await? {
                PollOutcome::Skipped => match store.get(job_id) {
                    Some(job) => print_job(&job),
                    None => bail!("job {} is not known", job_id),
                },
                PollOutcome::Applied(state) => {
                    println!("job {} is now {:?}", job_id, state);
                }
                PollOutcome::Stale => {
                    println!("job {} already advanced past the polled state", job_id);
                }
            }
        }
        Command::Watch {
            job_id,
            interval_sec,
        } => {
            orchestrator.list_mine().await?;
            if store.get(job_id).is_none() {
                bail!("job {} is not known", job_id);
            }

            let mut ticker = tokio::time::interval(Duration::from_secs(interval_sec.max(1)));
            loop {
                ticker.tick().await;
                match orchestrator.poll_status(job_id).await {
                    Ok(PollOutcome::Applied(state)) => {
                        println!("job {} is {:?}", job_id, state);
                        if state.is_terminal() {
                            break;
                        }
                    }
                    Ok(PollOutcome::Skipped) => break,
                    Ok(PollOutcome::Stale) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!(job_id, error = %e, "Status check failed, retrying");
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            if let Some(job) = store.get(job_id) {
                print_job(&job);
            }
        }
        Command::Detail { job_id } => {
            orchestrator.list_mine().await?;
            let job = orchestrator.fetch_detail(job_id).await?;
            print_job(&job);
            for detection in job.detections() {
                println!(
                    "  #{}\t{}\t{:.1}s-{:.1}s\t{:.1}%\talert: {}",
                    detection.id,
                    detection.activity_type.name,
                    detection.start_offset_seconds,
                    detection.end_offset_seconds,
                    detection.confidence,
                    match detection.alert_id {
                        Some(alert_id) => format!("#{}", alert_id),
                        None => "-".to_string(),
                    }
                );
            }
        }
        Command::Promote {
            job_id,
            detection_id,
        } => {
            orchestrator.list_mine().await?;
            orchestrator.fetch_detail(job_id).await?;

            let promoter = DetectionAlertPromoter::new(api, store);
            match promoter.promote(detection_id).await? {
                PromotionOutcome::Promoted { alert_id } => {
                    println!("alert #{} published for detection {}", alert_id, detection_id);
                }
                PromotionOutcome::AlreadyPromoted { alert_id } => {
                    println!(
                        "detection {} already has alert #{}",
                        detection_id, alert_id
                    );
                }
            }
        }
        Command::Stats => {
            let stats = StatisticsClient::new(api).fetch().await?;
            println!(
                "jobs:       {} total, {} completed, {} processing",
                stats.total_jobs, stats.completed_jobs, stats.processing_jobs
            );
            println!(
                "detections: {} total, {} promoted to alerts",
                stats.total_detections, stats.alerts_generated
            );
            if let Some(average) = stats.average_confidence {
                println!("confidence: {:.1}% average", average);
            }
            for (category, count) in &stats.detections_by_category {
                println!("  {}\t{}", category.as_str(), count);
            }
        }
    }

    Ok(())
}

fn print_job(job: &AnalysisJob) {
    let status = match job.state {
        JobState::Error => format!(
            "ERROR: {}",
            job.error_message.as_deref().unwrap_or("unknown error")
        ),
        state => format!("{:?}", state).to_uppercase(),
    };
    println!(
        "#{}\t{}\t{}\t{}\t{} detections",
        job.id, job.camera_id, job.video_name, status, job.detection_count
    );
}
