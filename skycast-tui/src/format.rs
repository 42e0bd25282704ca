//! Presentation-only helpers: unit conversion, date/time formatting, and
//! the noon-pick reduction of the 3-hour forecast series. Stateless pure
//! functions; the core never depends on any of this.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use skycast_core::model::ForecastEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Celsius,
    Fahrenheit,
}

impl Units {
    pub fn toggle(self) -> Self {
        match self {
            Units::Celsius => Units::Fahrenheit,
            Units::Fahrenheit => Units::Celsius,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
        }
    }
}

/// Rounded temperature with unit suffix, e.g. `"14°C"` / `"57°F"`.
pub fn format_temp(celsius: f64, units: Units) -> String {
    let value = match units {
        Units::Celsius => celsius,
        Units::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    };
    format!("{}{}", value.round() as i64, units.suffix())
}

/// Shift a UTC timestamp into the city's local time. Nonsense offsets fall
/// back to UTC.
pub fn city_local(at: DateTime<Utc>, offset_secs: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(offset_secs)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
    at.with_timezone(&offset)
}

/// Clock time like `"06:48"` in the city's local time.
pub fn format_clock(at: DateTime<Utc>, offset_secs: i32) -> String {
    city_local(at, offset_secs).format("%H:%M").to_string()
}

/// Full date like `"Monday, September 1, 2025"`.
pub fn format_full_date(at: DateTime<Utc>, offset_secs: i32) -> String {
    city_local(at, offset_secs).format("%A, %B %-d, %Y").to_string()
}

/// Short day pair like `("Mon", "Sep 1")` for forecast cards.
pub fn format_day(at: DateTime<Utc>, offset_secs: i32) -> (String, String) {
    let local = city_local(at, offset_secs);
    (local.format("%a").to_string(), local.format("%b %-d").to_string())
}

/// Reduce the 3-hour forecast series to one entry per day: the first entry
/// whose city-local hour falls in the 11:00–14:00 window, capped at 5 days.
pub fn daily_picks(entries: &[ForecastEntry], offset_secs: i32) -> Vec<&ForecastEntry> {
    let mut picks: Vec<&ForecastEntry> = Vec::new();
    let mut last_day: Option<(i32, u32)> = None;

    for entry in entries {
        let local = city_local(entry.at, offset_secs);
        if !(11..=14).contains(&local.hour()) {
            continue;
        }

        let day = (local.year(), local.ordinal());
        if last_day == Some(day) {
            continue;
        }
        last_day = Some(day);
        picks.push(entry);

        if picks.len() == 5 {
            break;
        }
    }

    picks
}
