use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for one location, replaced wholesale on each
/// successful search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// ISO 3166-1 alpha-2 country code, e.g. "GB".
    pub country: String,
    pub description: String,
    /// Numeric condition code from the weather service (see `conditions`).
    pub condition_code: u16,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    pub cloudiness_pct: u8,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// Shift of the city's local time from UTC, in seconds.
    pub timezone_offset_secs: i32,
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Whether `at` falls between sunrise and sunset, for day/night icon
    /// variants.
    pub fn is_daytime(&self, at: DateTime<Utc>) -> bool {
        at >= self.sunrise && at < self.sunset
    }
}

/// One 3-hour step of the 5-day forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub description: String,
    pub condition_code: u16,
    pub temp_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// The full 5-day / 3-hour forecast for one location, replaced wholesale
/// together with the matching [`WeatherSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub city: String,
    pub country: String,
    /// Shift of the city's local time from UTC, in seconds.
    pub timezone_offset_secs: i32,
    /// Ordered by timestamp, 3-hour cadence from the upstream service.
    pub entries: Vec<ForecastEntry>,
}

/// One geocoding candidate for the suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoSuggestion {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
}

impl GeoSuggestion {
    /// Display string in `"name[, state], country"` form; the state segment
    /// is omitted when the provider did not return one.
    pub fn display_label(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => {
                format!("{}, {}, {}", self.name, state, self.country)
            }
            _ => format!("{}, {}", self.name, self.country),
        }
    }
}
