//! Pure unit conversions from provider-native values to display units.

use chrono::{DateTime, Local};

const KELVIN_OFFSET: f64 = 273.15;

/// Meters per second to miles per hour.
pub const MPS_TO_MPH: f64 = 60.0 * 60.0 * 100.0 / 2.54 / 12.0 / 5280.0;

/// Kelvin to degrees Fahrenheit. No validation of physically impossible input.
pub fn to_fahrenheit(kelvin: f64) -> f64 {
    9.0 * (kelvin - KELVIN_OFFSET) / 5.0 + 32.0
}

pub fn to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn to_mph(meters_per_sec: f64) -> f64 {
    meters_per_sec * MPS_TO_MPH
}

/// Interpret `epoch_secs` as UTC seconds and project into the local time zone.
pub fn to_local_time(epoch_secs: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(epoch_secs, 0).map(|utc| utc.with_timezone(&Local))
}

/// Low end of a displayed range; rounded down.
pub fn low_display(min_kelvin: f64) -> i64 {
    to_fahrenheit(min_kelvin).floor() as i64
}

/// High end of a displayed range; rounded up.
pub fn high_display(max_kelvin: f64) -> i64 {
    to_fahrenheit(max_kelvin).ceil() as i64
}

/// 16-point compass label for a meteorological wind direction.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    let idx = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[idx]
}
