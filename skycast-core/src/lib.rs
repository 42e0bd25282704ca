//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The HTTP gateway to the weather/geocoding API
//! - Shared domain models (snapshot, forecast, suggestions)
//! - The application state store and the search/suggest flow
//! - Durable local storage (last city, recent searches)
//!
//! It is used by `skycast-tui`, but can also be reused by other binaries or services.

pub mod api;
pub mod conditions;
pub mod config;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use api::{ApiError, OpenWeatherClient, WeatherGateway};
pub use config::Config;
pub use model::{ForecastBundle, ForecastEntry, GeoSuggestion, WeatherSnapshot};
pub use search::{SearchFlow, SuggestionLookup};
pub use storage::LocalStore;
pub use store::{AppState, Notice, NoticeLevel, SearchOutcome, WeatherStore};
