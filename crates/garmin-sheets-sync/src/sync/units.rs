//! Display-unit conversions for sheet columns. Missing, zero or
//! non-finite inputs map to 0.

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Seconds to minutes, 2 decimals
pub fn duration_minutes(seconds: Option<f64>) -> f64 {
    present(seconds).map_or(0.0, |s| round_to(s / 60.0, 2))
}

/// Meters to kilometers, 2 decimals
pub fn distance_km(meters: Option<f64>) -> f64 {
    present(meters).map_or(0.0, |m| round_to(m / 1000.0, 2))
}

/// Average pace in min/km, 2 decimals
pub fn pace_min_per_km(distance_m: Option<f64>, duration_s: Option<f64>) -> f64 {
    match (present(distance_m), present(duration_s)) {
        (Some(meters), Some(seconds)) => round_to(seconds / (meters / 1000.0) / 60.0, 2),
        _ => 0.0,
    }
}

/// Elevation gain in meters, 1 decimal
pub fn elevation_gain_rounded(meters: Option<f64>) -> f64 {
    present(meters).map_or(0.0, |m| round_to(m, 1))
}
