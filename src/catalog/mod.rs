//! Camera, video, and activity-type catalogs (read-only reference data).

mod client;
mod models;

pub use client::{ActivityTypeCatalogClient, CameraCatalogClient, VideoCatalogClient};
pub use models::{ActivityCategory, ActivityType, Camera, Video};
