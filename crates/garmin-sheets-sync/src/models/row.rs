use serde_json::Value;

use crate::models::{ActivitySummary, GearRecord};
use crate::sync::units;

/// Column titles, written when the destination sheet is empty
pub const HEADER: [&str; 14] = [
    "activity_id",
    "date",
    "activity_name",
    "distance_km",
    "duration_min",
    "avg_pace_min_per_km",
    "avg_hr",
    "max_hr",
    "calories",
    "avg_cadence",
    "elevation_gain",
    "activity_type",
    "shoe_name",
    "shoe_id",
];

/// One sheet row: an activity's display metrics plus its resolved gear
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub activity_id: String,
    pub date: String,
    pub activity_name: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub avg_pace_min_per_km: f64,
    pub avg_hr: f64,
    pub max_hr: f64,
    pub calories: f64,
    pub avg_cadence: f64,
    pub elevation_gain: f64,
    pub activity_type: String,
    pub shoe_name: String,
    pub shoe_id: String,
}

impl OutputRow {
    pub fn from_activity(activity: &ActivitySummary, gear: GearRecord) -> Self {
        Self {
            activity_id: activity.id_string(),
            date: activity.date(),
            activity_name: activity.display_name(),
            distance_km: units::distance_km(activity.distance),
            duration_min: units::duration_minutes(activity.duration),
            avg_pace_min_per_km: units::pace_min_per_km(activity.distance, activity.duration),
            avg_hr: activity.average_hr.unwrap_or_default(),
            max_hr: activity.max_hr.unwrap_or_default(),
            calories: activity.calories.unwrap_or_default(),
            avg_cadence: activity
                .average_running_cadence_in_steps_per_minute
                .unwrap_or_default(),
            elevation_gain: units::elevation_gain_rounded(activity.elevation_gain),
            activity_type: activity.type_key().unwrap_or("running").to_string(),
            shoe_name: gear.name,
            shoe_id: gear.id,
        }
    }

    /// Cell values in column order. The id is written as text so large
    /// Garmin ids never get reformatted by the sheet.
    pub fn to_cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.activity_id.as_str()),
            Value::from(self.date.as_str()),
            Value::from(self.activity_name.as_str()),
            number(self.distance_km),
            number(self.duration_min),
            number(self.avg_pace_min_per_km),
            number(self.avg_hr),
            number(self.max_hr),
            number(self.calories),
            number(self.avg_cadence),
            number(self.elevation_gain),
            Value::from(self.activity_type.as_str()),
            Value::from(self.shoe_name.as_str()),
            Value::from(self.shoe_id.as_str()),
        ]
    }

    pub fn header_cells() -> Vec<Value> {
        HEADER.iter().map(|h| Value::from(*h)).collect()
    }
}

/// Whole numbers go out as integers (`151`, not `151.0`)
fn number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else if value.is_finite() {
        Value::from(value)
    } else {
        Value::from(0)
    }
}
