//! HTTP gateway to the OpenWeatherMap API.
//!
//! Three thin async fetches: current weather, 5-day/3-hour forecast, and
//! geocoding suggestions. The first two surface failures as [`ApiError`];
//! suggestion lookups degrade to an empty list instead, since the dropdown
//! is never worth an error banner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{ForecastBundle, ForecastEntry, GeoSuggestion, WeatherSnapshot};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// How a weather or forecast fetch can fail. At the UI boundary every
/// variant collapses into the same generic "not found or error" message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to weather service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode weather service response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam between the state store and the network, so the store can be
/// exercised against a scripted gateway in tests.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, ApiError>;

    async fn forecast(&self, city: &str) -> Result<ForecastBundle, ApiError>;

    /// Geocoding candidates for a free-text query. Failures degrade to an
    /// empty list, never an error.
    async fn suggest(&self, query: &str, limit: usize) -> Vec<GeoSuggestion>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host, for tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, ApiError> {
        let parsed: OwCurrentResponse = self
            .get_json(
                "/data/2.5/weather",
                &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")],
            )
            .await?;

        let condition = parsed.weather.first();

        Ok(WeatherSnapshot {
            city: parsed.name,
            country: parsed.sys.country,
            description: condition
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            condition_code: condition.map(|w| w.id).unwrap_or_default(),
            temp_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
            cloudiness_pct: parsed.clouds.all,
            sunrise: unix_to_utc(parsed.sys.sunrise),
            sunset: unix_to_utc(parsed.sys.sunset),
            timezone_offset_secs: parsed.timezone,
            observed_at: unix_to_utc(parsed.dt),
        })
    }

    async fn forecast(&self, city: &str) -> Result<ForecastBundle, ApiError> {
        let parsed: OwForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")],
            )
            .await?;

        let entries = parsed
            .list
            .into_iter()
            .map(|e| {
                let condition = e.weather.first();
                ForecastEntry {
                    at: unix_to_utc(e.dt),
                    description: condition
                        .map(|w| w.description.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    condition_code: condition.map(|w| w.id).unwrap_or_default(),
                    temp_c: e.main.temp,
                    temp_min_c: e.main.temp_min,
                    temp_max_c: e.main.temp_max,
                    humidity_pct: e.main.humidity,
                    wind_speed_mps: e.wind.speed,
                }
            })
            .collect();

        Ok(ForecastBundle {
            city: parsed.city.name,
            country: parsed.city.country,
            timezone_offset_secs: parsed.city.timezone,
            entries,
        })
    }

    async fn suggest(&self, query: &str, limit: usize) -> Vec<GeoSuggestion> {
        let limit = limit.to_string();
        let result: Result<Vec<OwGeoCandidate>, ApiError> = self
            .get_json(
                "/geo/1.0/direct",
                &[
                    ("q", query),
                    ("limit", limit.as_str()),
                    ("appid", self.api_key.as_str()),
                ],
            )
            .await;

        match result {
            Ok(candidates) => candidates
                .into_iter()
                .map(|c| GeoSuggestion {
                    name: c.name,
                    state: c.state,
                    country: c.country,
                })
                .collect(),
            Err(err) => {
                tracing::debug!("suggestion lookup for {query:?} failed: {err}");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    id: u16,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: f64,
    #[serde(default)]
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
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
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    weather: Vec<OwCondition>,
    main: OwMain,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    name: String,
    #[serde(default)]
    state: Option<String>,
    country: String,
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Back off to a char boundary so multibyte bodies never split mid-char.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CURRENT_BODY: &str = r#"{
        "name": "London",
        "dt": 1727000000,
        "timezone": 3600,
        "weather": [{"id": 500, "description": "light rain"}],
        "main": {"temp": 14.2, "feels_like": 13.6, "temp_min": 12.0, "temp_max": 16.1, "pressure": 1008, "humidity": 82},
        "wind": {"speed": 4.6},
        "clouds": {"all": 75},
        "sys": {"country": "GB", "sunrise": 1726980000, "sunset": 1727024000}
    }"#;

    const FORECAST_BODY: &str = r#"{
        "city": {"name": "London", "country": "GB", "timezone": 3600},
        "list": [
            {
                "dt": 1727010000,
                "main": {"temp": 15.0, "feels_like": 14.1, "temp_min": 13.0, "temp_max": 16.0, "pressure": 1009, "humidity": 78},
                "weather": [{"id": 801, "description": "few clouds"}],
                "wind": {"speed": 3.2}
            },
            {
                "dt": 1727020800,
                "main": {"temp": 13.5, "feels_like": 12.8, "temp_min": 12.1, "temp_max": 13.9, "pressure": 1010, "humidity": 85},
                "weather": [{"id": 500, "description": "light rain"}],
                "wind": {"speed": 5.1}
            }
        ]
    }"#;

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::with_base_url("test-key".to_string(), server.uri())
    }

    #[tokio::test]
    async fn current_weather_parses_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(CURRENT_BODY, "application/json"))
            .mount(&server)
            .await;

        let snapshot = client_for(&server).current_weather("London").await.unwrap();

        assert_eq!(snapshot.city, "London");
        assert_eq!(snapshot.country, "GB");
        assert_eq!(snapshot.condition_code, 500);
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.humidity_pct, 82);
        assert_eq!(snapshot.pressure_hpa, 1008);
        assert_eq!(snapshot.cloudiness_pct, 75);
        assert_eq!(snapshot.timezone_offset_secs, 3600);
        assert_eq!(snapshot.sunrise.timestamp(), 1726980000);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404).set_body_raw(r#"{"message":"city not found"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).current_weather("Atlantis").await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn multibyte_error_body_truncates_on_a_char_boundary() {
        // 1 ASCII byte then two-byte chars, so byte 200 falls mid-char.
        let body = format!("a{}", "é".repeat(150));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(502).set_body_raw(body.clone(), "text/plain"))
            .mount(&server)
            .await;

        let err = client_for(&server).current_weather("London").await.unwrap_err();

        match err {
            ApiError::Status { status, body: truncated } => {
                assert_eq!(status, 502);
                assert!(truncated.ends_with("..."));
                assert!(truncated.len() < body.len());
                assert!(body.starts_with(truncated.trim_end_matches("...")));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn short_bodies_pass_through_untruncated() {
        assert_eq!(truncate_body("city not found"), "city not found");
        assert_eq!(truncate_body(&"x".repeat(200)), "x".repeat(200));
    }

    #[tokio::test]
    async fn forecast_parses_entries_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(FORECAST_BODY, "application/json"))
            .mount(&server)
            .await;

        let bundle = client_for(&server).forecast("London").await.unwrap();

        assert_eq!(bundle.city, "London");
        assert_eq!(bundle.entries.len(), 2);
        assert_eq!(bundle.entries[0].condition_code, 801);
        assert_eq!(bundle.entries[0].temp_min_c, 13.0);
        assert_eq!(bundle.entries[1].at.timestamp(), 1727020800);
    }

    #[tokio::test]
    async fn suggest_parses_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lond"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[
                    {"name": "London", "country": "GB"},
                    {"name": "London", "state": "Ontario", "country": "CA"}
                ]"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let suggestions = client_for(&server).suggest("Lond", 5).await;

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].display_label(), "London, GB");
        assert_eq!(suggestions[1].display_label(), "London, Ontario, CA");
    }

    #[tokio::test]
    async fn suggest_degrades_to_empty_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let suggestions = client_for(&server).suggest("Lond", 5).await;
        assert!(suggestions.is_empty());
    }
}
