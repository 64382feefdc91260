//! Reference data owned by the catalog services.
//!
//! Cameras, stored videos, and detectable activity types are immutable from
//! the console's perspective; they are fetched, displayed, and used to build
//! analysis submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A camera registered in the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

/// A recorded video stored for one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Storage key, unique within the camera.
    pub key: String,
    /// Display name, also the identifier used when submitting an analysis.
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
    pub url: String,
}

/// Category of detectable suspicious activity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityCategory {
    Intrusion,
    Theft,
    Vandalism,
    Violence,
    Loitering,
    Other,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Intrusion => "INTRUSION",
            ActivityCategory::Theft => "THEFT",
            ActivityCategory::Vandalism => "VANDALISM",
            ActivityCategory::Violence => "VIOLENCE",
            ActivityCategory::Loitering => "LOITERING",
            ActivityCategory::Other => "OTHER",
        }
    }
}

/// A detectable activity type, as described by the activity-type catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityType {
    pub id: i64,
    pub name: String,
    pub category: ActivityCategory,
    /// Human-readable category label, localized by the backend.
    pub category_display: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated search keywords used by the detection pipeline.
    #[serde(default)]
    pub keywords: String,
    pub active: bool,
}
