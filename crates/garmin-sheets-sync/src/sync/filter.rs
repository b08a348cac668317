use serde_json::Value;

/// Type keys synced to the sheet
pub const RUNNING_TYPES: [&str; 4] = [
    "running",
    "track_running",
    "treadmill_running",
    "trail_running",
];

/// True when the type key names a running activity (case-insensitive)
pub fn is_running_type(type_key: &str) -> bool {
    RUNNING_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(type_key))
}

/// Checked on the raw list entry, so non-running entries are dropped
/// before they are parsed
pub fn is_running(activity: &Value) -> bool {
    activity
        .pointer("/activityType/typeKey")
        .and_then(Value::as_str)
        .is_some_and(is_running_type)
}
