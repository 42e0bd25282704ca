//! Application state store: the single owner of fetched weather data.
//!
//! All mutation goes through [`WeatherStore::search`] and
//! [`WeatherStore::clear`]. A search fetches current weather and the 5-day
//! forecast concurrently and applies them together or not at all; overlapping
//! searches are resolved by request sequence number (newest wins), never by
//! arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::WeatherGateway;
use crate::model::{ForecastBundle, WeatherSnapshot};
use crate::storage::LocalStore;

/// Generic user-facing message for any failed weather/forecast fetch.
pub const SEARCH_FAILED_MESSAGE: &str = "City not found or network error. Please try again.";

/// Message for an empty search submission.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name to search for weather.";

/// Shared application state, read by the display views.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Last successfully searched city query.
    pub city: String,
    pub current: Option<WeatherSnapshot>,
    pub forecast: Option<ForecastBundle>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user notification (the web app's toast).
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What became of one `search` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Both fetches succeeded and the state was replaced.
    Applied,
    /// A fetch failed; previous data retained, error surfaced.
    Failed,
    /// Empty/whitespace input; nothing was fetched or changed.
    Rejected,
    /// A newer search started while this one was in flight; its result
    /// was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    state: AppState,
    notice: Option<Notice>,
}

#[derive(Debug)]
pub struct WeatherStore<G: WeatherGateway + ?Sized> {
    gateway: Arc<G>,
    storage: LocalStore,
    inner: Mutex<Inner>,
    /// Sequence number of the newest search issued so far.
    seq: AtomicU64,
}

/// Clears the loading flag when a search completes, on every exit path.
/// Only the newest search owns the flag.
struct LoadingGuard<'a, G: WeatherGateway + ?Sized> {
    store: &'a WeatherStore<G>,
    seq: u64,
}

impl<G: WeatherGateway + ?Sized> Drop for LoadingGuard<'_, G> {
    fn drop(&mut self) {
        if self.seq == self.store.seq.load(Ordering::SeqCst) {
            self.store.lock().state.loading = false;
        }
    }
}

impl<G: WeatherGateway + ?Sized> WeatherStore<G> {
    pub fn new(gateway: Arc<G>, storage: LocalStore) -> Self {
        Self {
            gateway,
            storage,
            inner: Mutex::new(Inner::default()),
            seq: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("state lock poisoned")
    }

    /// Snapshot of the current state for rendering.
    pub fn state(&self) -> AppState {
        self.lock().state.clone()
    }

    /// Pop the pending notice, if any.
    pub fn take_notice(&self) -> Option<Notice> {
        self.lock().notice.take()
    }

    /// If a last-searched city was persisted, search it again. Called once
    /// at startup.
    pub async fn restore(&self) -> Option<SearchOutcome> {
        let city = self.storage.last_city()?;
        Some(self.search(&city).await)
    }

    /// Look up current weather and forecast for `city`.
    ///
    /// Empty input is rejected before any network traffic. Both fetches run
    /// concurrently against the same query string and either both results
    /// are applied or neither is.
    pub async fn search(&self, city: &str) -> SearchOutcome {
        let city = city.trim();
        if city.is_empty() {
            self.lock().notice = Some(Notice {
                level: NoticeLevel::Error,
                message: EMPTY_QUERY_MESSAGE.to_string(),
            });
            return SearchOutcome::Rejected;
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.lock();
            inner.state.loading = true;
            inner.state.error = None;
        }
        let _loading = LoadingGuard { store: self, seq };

        let (current, forecast) =
            tokio::join!(self.gateway.current_weather(city), self.gateway.forecast(city));

        match (current, forecast) {
            (Ok(snapshot), Ok(bundle)) => {
                let message =
                    format!("Showing weather for {}, {}", snapshot.city, snapshot.country);

                {
                    // Staleness is decided and applied under the same lock,
                    // so a newer search cannot interleave between them.
                    let mut inner = self.lock();
                    if seq != self.seq.load(Ordering::SeqCst) {
                        tracing::debug!("search for {city:?} superseded before completion");
                        return SearchOutcome::Superseded;
                    }
                    inner.state.current = Some(snapshot);
                    inner.state.forecast = Some(bundle);
                    inner.state.city = city.to_string();
                    inner.state.error = None;
                    inner.notice = Some(Notice {
                        level: NoticeLevel::Info,
                        message,
                    });
                }

                if let Err(e) = self.storage.set_last_city(city) {
                    tracing::warn!("failed to persist last city: {e:#}");
                }

                SearchOutcome::Applied
            }
            (current, forecast) => {
                if let Err(e) = &current {
                    tracing::debug!("current weather fetch for {city:?} failed: {e}");
                }
                if let Err(e) = &forecast {
                    tracing::debug!("forecast fetch for {city:?} failed: {e}");
                }

                let mut inner = self.lock();
                if seq != self.seq.load(Ordering::SeqCst) {
                    tracing::debug!("search for {city:?} superseded before completion");
                    return SearchOutcome::Superseded;
                }
                inner.state.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                inner.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: SEARCH_FAILED_MESSAGE.to_string(),
                });

                SearchOutcome::Failed
            }
        }
    }

    /// Drop all fetched data and forget the persisted last city.
    pub fn clear(&self) {
        {
            let mut inner = self.lock();
            inner.state.current = None;
            inner.state.forecast = None;
            inner.state.city.clear();
            inner.state.error = None;
        }

        if let Err(e) = self.storage.clear_last_city() {
            tracing::warn!("failed to clear persisted last city: {e:#}");
        }
    }
}
