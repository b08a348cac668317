//! Activity data models for Garmin Connect API
//!
//! Only the fields that end up in a sheet row are modelled; everything
//! else in the list response is ignored.

use serde::Deserialize;

/// Activity summary returned from the activity list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Unique activity identifier
    pub activity_id: u64,

    /// User-provided or auto-generated activity name
    #[serde(default)]
    pub activity_name: Option<String>,

    /// Start time in local timezone (ISO 8601 or "YYYY-MM-DD HH:MM:SS")
    #[serde(default)]
    pub start_time_local: Option<String>,

    #[serde(default)]
    pub activity_type: Option<ActivityType>,

    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(default)]
    pub calories: Option<f64>,

    #[serde(default, rename = "averageHR")]
    pub average_hr: Option<f64>,

    #[serde(default, rename = "maxHR")]
    pub max_hr: Option<f64>,

    /// Total elevation gain in meters
    #[serde(default)]
    pub elevation_gain: Option<f64>,

    #[serde(default)]
    pub average_running_cadence_in_steps_per_minute: Option<f64>,
}

/// Activity type information
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    /// Type key (e.g., "running", "trail_running", "cycling")
    #[serde(default)]
    pub type_key: String,
}

impl ActivitySummary {
    /// The dedup key written to the first sheet column
    pub fn id_string(&self) -> String {
        self.activity_id.to_string()
    }

    /// Activity name, defaulting to "Run"
    pub fn display_name(&self) -> String {
        self.activity_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Run")
            .to_string()
    }

    /// Raw type key, or None when the list entry carries no type
    pub fn type_key(&self) -> Option<&str> {
        self.activity_type
            .as_ref()
            .map(|t| t.type_key.as_str())
            .filter(|k| !k.is_empty())
    }

    /// Date portion (YYYY-MM-DD) of the local start time
    pub fn date(&self) -> String {
        self.start_time_local
            .as_deref()
            .and_then(|s| s.split(['T', ' ']).next())
            .unwrap_or_default()
            .to_string()
    }
}
