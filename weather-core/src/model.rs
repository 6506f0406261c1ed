use serde::{Deserialize, Serialize};

use crate::units::{compass_point, high_display, low_display, to_fahrenheit, to_local_time, to_mph};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One weather-condition entry as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    /// Category, e.g. "Clouds".
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Snapshot of one location's current weather.
///
/// Temperatures are Kelvin, wind speed is m/s and timestamps are UTC epoch
/// seconds; use the functions in [`crate::units`] to convert them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_id: i64,
    pub location_name: String,
    pub country_code: String,
    pub observed_at: i64,
    pub coordinates: Coordinates,
    pub temperature_raw: f64,
    pub feels_like_raw: Option<f64>,
    pub temperature_min_raw: f64,
    pub temperature_max_raw: f64,
    pub humidity_pct: u8,
    pub pressure: f64,
    pub visibility_m: Option<u32>,
    pub wind_speed_raw: f64,
    pub wind_gust_raw: Option<f64>,
    pub wind_direction_deg: f64,
    pub cloudiness_pct: u8,
    pub conditions: Vec<Condition>,
    pub sunrise: i64,
    pub sunset: i64,
    /// Shift in seconds from UTC at the location.
    pub timezone_offset: Option<i32>,
}

impl WeatherRecord {
    /// Decode a provider current-weather response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<OwCurrentResponse>(body).map(Self::from)
    }

    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    pub fn low_display(&self) -> i64 {
        low_display(self.temperature_min_raw)
    }

    pub fn high_display(&self) -> i64 {
        high_display(self.temperature_max_raw)
    }

    fn condition_text(&self) -> &str {
        self.primary_condition().map(|c| c.description.as_str()).unwrap_or("unknown")
    }

    /// One-line report.
    pub fn summary(&self) -> String {
        format!(
            "{}, {}: {}, {:.1}°F (low {}°F / high {}°F)",
            self.location_name,
            self.country_code,
            self.condition_text(),
            to_fahrenheit(self.temperature_raw),
            self.low_display(),
            self.high_display(),
        )
    }

    /// Multi-line report with every displayed measurement.
    pub fn detail(&self) -> String {
        let mut wind = format!(
            "  Wind:        {:.1} mph {} ({}°)",
            to_mph(self.wind_speed_raw),
            compass_point(self.wind_direction_deg),
            self.wind_direction_deg,
        );
        if let Some(gust) = self.wind_gust_raw {
            wind.push_str(&format!(", gusts {:.1} mph", to_mph(gust)));
        }

        let mut lines = vec![
            format!("{}, {}", self.location_name, self.country_code),
            format!("  Observed:    {}", local_time_text(self.observed_at)),
            format!("  Conditions:  {}", self.condition_text()),
            format!("  Temperature: {:.1}°F", to_fahrenheit(self.temperature_raw)),
        ];
        if let Some(feels_like) = self.feels_like_raw {
            lines.push(format!("  Feels like:  {:.1}°F", to_fahrenheit(feels_like)));
        }
        lines.extend([
            format!("  Range:       {}°F .. {}°F", self.low_display(), self.high_display()),
            format!("  Humidity:    {}%", self.humidity_pct),
            format!("  Pressure:    {} hPa", self.pressure),
            wind,
            format!("  Cloudiness:  {}%", self.cloudiness_pct),
            format!("  Sunrise:     {}", local_time_text(self.sunrise)),
            format!("  Sunset:      {}", local_time_text(self.sunset)),
            format!(
                "  Coordinates: {:.4}, {:.4}",
                self.coordinates.lat, self.coordinates.lon
            ),
        ]);

        lines.join("\n")
    }
}

fn local_time_text(epoch_secs: i64) -> String {
    to_local_time(epoch_secs)
        .map(|t| t.format("%Y-%m-%d %H:%M %Z").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<Condition>,
    main: OwMain,
    visibility: Option<u32>,
    wind: OwWind,
    clouds: OwClouds,
    dt: i64,
    sys: OwSys,
    timezone: Option<i32>,
    id: i64,
    name: String,
}

impl From<OwCurrentResponse> for WeatherRecord {
    fn from(r: OwCurrentResponse) -> Self {
        Self {
            location_id: r.id,
            location_name: r.name,
            country_code: r.sys.country,
            observed_at: r.dt,
            coordinates: Coordinates { lat: r.coord.lat, lon: r.coord.lon },
            temperature_raw: r.main.temp,
            feels_like_raw: r.main.feels_like,
            temperature_min_raw: r.main.temp_min,
            temperature_max_raw: r.main.temp_max,
            humidity_pct: r.main.humidity,
            pressure: r.main.pressure,
            visibility_m: r.visibility,
            wind_speed_raw: r.wind.speed,
            wind_gust_raw: r.wind.gust,
            wind_direction_deg: r.wind.deg,
            cloudiness_pct: r.clouds.all,
            conditions: r.weather,
            sunrise: r.sys.sunrise,
            sunset: r.sys.sunset,
            timezone_offset: r.timezone,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_BODY: &str = r#"{
        "coord": {"lon": -157.86, "lat": 21.31},
        "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
        "base": "stations",
        "main": {"temp": 300.15, "feels_like": 301.2, "temp_min": 298.71, "temp_max": 301.48,
                 "pressure": 1016, "humidity": 62},
        "visibility": 10000,
        "wind": {"speed": 5.14, "deg": 60, "gust": 7.2},
        "clouds": {"all": 20},
        "dt": 1700000000,
        "sys": {"type": 2, "id": 2036020, "country": "US", "sunrise": 1699979000, "sunset": 1700019000},
        "timezone": -36000,
        "id": 0,
        "name": "Honolulu",
        "cod": 200
    }"#;

    pub(crate) fn sample_record(name: &str) -> WeatherRecord {
        let mut record = WeatherRecord::from_json(SAMPLE_BODY).expect("sample must decode");
        record.location_name = name.to_string();
        record
    }

    #[test]
    fn decodes_provider_response() {
        let record = WeatherRecord::from_json(SAMPLE_BODY).expect("sample must decode");

        assert_eq!(record.location_name, "Honolulu");
        assert_eq!(record.country_code, "US");
        assert_eq!(record.coordinates, Coordinates { lat: 21.31, lon: -157.86 });
        assert_eq!(record.temperature_raw, 300.15);
        assert_eq!(record.humidity_pct, 62);
        assert_eq!(record.pressure, 1016.0);
        assert_eq!(record.wind_direction_deg, 60.0);
        assert_eq!(record.wind_gust_raw, Some(7.2));
        assert_eq!(record.cloudiness_pct, 20);
        assert_eq!(record.observed_at, 1_700_000_000);
        assert_eq!(record.timezone_offset, Some(-36000));
        assert_eq!(record.primary_condition().map(|c| c.main.as_str()), Some("Clouds"));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let body = r#"{
            "coord": {"lon": -72.68, "lat": 41.56},
            "weather": [],
            "main": {"temp": 280.0, "temp_min": 279.0, "temp_max": 281.0, "pressure": 1020, "humidity": 80},
            "wind": {"speed": 1.0},
            "clouds": {"all": 90},
            "dt": 1700000000,
            "sys": {"country": "US", "sunrise": 1699961000, "sunset": 1699997000},
            "id": 4835797,
            "name": "Middletown"
        }"#;

        let record = WeatherRecord::from_json(body).expect("minimal body must decode");
        assert!(record.feels_like_raw.is_none());
        assert!(record.visibility_m.is_none());
        assert_eq!(record.wind_direction_deg, 0.0);
        assert!(record.summary().contains("unknown"));
    }

    #[test]
    fn missing_required_field_is_a_decode_error() {
        let err = WeatherRecord::from_json(r#"{"cod": 200, "name": "Nowhere"}"#).unwrap_err();
        assert!(err.is_data());

        let err = WeatherRecord::from_json("<html>").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn summary_shows_converted_range() {
        let record = sample_record("Honolulu");
        let summary = record.summary();

        assert!(summary.starts_with("Honolulu, US: few clouds, 80.6°F"));
        // 298.71 K = 78.008 F, 301.48 K = 82.994 F
        assert!(summary.contains("low 78°F / high 83°F"));
    }

    #[test]
    fn detail_does_not_mutate_record() {
        let record = sample_record("Honolulu");
        let before = record.clone();

        let detail = record.detail();
        assert!(detail.contains("Humidity:    62%"));
        assert!(detail.contains("mph ENE (60°)"));
        assert!(detail.contains("gusts"));
        assert!(detail.contains("Coordinates: 21.3100, -157.8600"));
        assert_eq!(record, before);
    }

    #[test]
    fn detail_lists_one_measurement_per_line() {
        let mut record = sample_record("Honolulu");
        let lines: Vec<String> = record.detail().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Honolulu, US");
        assert!(lines[3].starts_with("  Temperature: 80.6°F"));
        assert!(lines[4].starts_with("  Feels like:"));
        assert!(lines[12].starts_with("  Coordinates:"));

        record.feels_like_raw = None;
        record.wind_gust_raw = None;
        let detail = record.detail();
        assert_eq!(detail.lines().count(), 12);
        assert!(!detail.contains("gusts"));
        assert!(!detail.ends_with('\n'));
    }
}
