//! Clients for the read-only catalog services.
//!
//! All three are pure reads: no state beyond the call itself, no automatic
//! retries. A failure is reported to the caller of that one call so the UI
//! can show it next to the control that triggered it.

use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiResult};

use super::models::{ActivityType, Camera, Video};

#[derive(Deserialize)]
struct CamerasResponse {
    cameras: Vec<Camera>,
}

#[derive(Deserialize)]
struct VideosResponse {
    videos: Vec<Video>,
}

#[derive(Deserialize)]
struct ActivityTypesResponse {
    tipos_actividad: Vec<ActivityType>,
}

/// Lists the cameras available to the current user.
pub struct CameraCatalogClient {
    api: Arc<ApiClient>,
}

impl CameraCatalogClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_cameras(&self) -> ApiResult<Vec<Camera>> {
        let response: CamerasResponse = self.api.get("/cameras/list_cameras/").await?;
        Ok(response.cameras)
    }
}

/// Lists the stored videos of a single camera.
pub struct VideoCatalogClient {
    api: Arc<ApiClient>,
}

impl VideoCatalogClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_videos(&self, camera_id: &str) -> ApiResult<Vec<Video>> {
        let path = format!(
            "/cameras/list_videos/?camera_id={}",
            urlencoding::encode(camera_id)
        );
        let response: VideosResponse = self.api.get(&path).await?;
        Ok(response.videos)
    }
}

/// Lists the detectable activity categories.
pub struct ActivityTypeCatalogClient {
    api: Arc<ApiClient>,
}

impl ActivityTypeCatalogClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_activity_types(&self) -> ApiResult<Vec<ActivityType>> {
        let response: ActivityTypesResponse =
            self.api.get("/actividad-sospechosa/tipos_actividad/").await?;
        Ok(response.tipos_actividad)
    }
}
