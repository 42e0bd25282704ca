//! Display views: search bar with suggestion dropdown, the Current and
//! Forecast screens, and the footer with key hints and transient notices.
//! Everything here is read-only over the store's state snapshot.

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use skycast_core::conditions::{self, Background, Icon};
use skycast_core::store::{AppState, NoticeLevel};

use crate::app::{App, Page};
use crate::format::{self, Units};

pub fn draw(f: &mut Frame, app: &App, state: &AppState) {
    let area = f.size();

    // Whole-frame background follows the current condition, like the web
    // app's gradient.
    let bg = state
        .current
        .as_ref()
        .map(|s| background_color(conditions::background_for(s.condition_code)))
        .unwrap_or(DEFAULT_BG);
    f.render_widget(Block::default().style(Style::default().bg(bg)), area);

    let dropdown_height = if app.flow.has_suggestions() {
        app.flow.suggestions().len() as u16 + 2
    } else if !app.flow.recent().is_empty() {
        1
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(dropdown_height),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_tabs(f, rows[0], app.page);
    render_search_bar(f, rows[1], app, state);
    render_dropdown(f, rows[2], app);
    match app.page {
        Page::Current => render_current(f, rows[3], state, app.units),
        Page::Forecast => render_forecast(f, rows[3], state, app.units),
    }
    render_footer(f, rows[4], app);
}

const DEFAULT_BG: Color = Color::Rgb(28, 66, 112);

fn background_color(bg: Background) -> Color {
    match bg {
        Background::Stormy => Color::Rgb(40, 38, 62),
        Background::Rainy => Color::Rgb(28, 48, 70),
        Background::Snowy => Color::Rgb(66, 76, 92),
        Background::Cloudy => Color::Rgb(56, 60, 72),
        Background::Sunny => Color::Rgb(24, 84, 134),
    }
}

fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Thunderstorm => "⛈",
        Icon::Rain => "🌧",
        Icon::Snow => "❄",
        Icon::Atmosphere => "🌫",
        Icon::ClearDay => "☀",
        Icon::ClearNight => "🌙",
        Icon::CloudsDay => "⛅",
        Icon::CloudsNight | Icon::Clouds => "☁",
    }
}

fn render_tabs(f: &mut Frame, area: Rect, page: Page) {
    let titles = vec![Line::from("Current"), Line::from("Forecast")];
    let selected = match page {
        Page::Current => 0,
        Page::Forecast => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(" skycast "))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .divider(" | ");
    f.render_widget(tabs, area);
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &App, state: &AppState) {
    let title = if state.loading { " Search city (searching...) " } else { " Search city " };

    let line = Line::from(vec![
        Span::raw(app.flow.input().to_string()),
        Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn render_dropdown(f: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }

    if app.flow.has_suggestions() {
        let lines: Vec<Line> = app
            .flow
            .suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let style = if app.flow.highlighted() == Some(i) {
                    Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(s.display_label(), style))
            })
            .collect();

        let p = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Suggestions "));
        f.render_widget(p, area);
        return;
    }

    // No dropdown: a single line of recent searches instead.
    let mut spans = vec![Span::styled("Recent: ", Style::default().fg(Color::Gray))];
    for (i, entry) in app.flow.recent().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  •  "));
        }
        let style = if app.recent_cursor == Some(i) {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(entry.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_current(f: &mut Frame, area: Rect, state: &AppState, units: Units) {
    let block = Block::default().borders(Borders::ALL).title(" Current Weather ");

    if state.loading {
        render_centered(f, area, block, "Loading weather data...");
        return;
    }
    if let Some(error) = &state.error {
        render_error(f, area, block, error);
        return;
    }
    let Some(snapshot) = &state.current else {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Welcome to skycast",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Search for a city above to see current weather conditions."),
            Line::from("Start typing for suggestions; Enter searches."),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(welcome, area);
        return;
    };

    let now = Utc::now();
    let icon = icon_glyph(conditions::icon_for(
        snapshot.condition_code,
        snapshot.is_daytime(now),
    ));
    let tz = snapshot.timezone_offset_secs;

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}, {}", snapshot.city, snapshot.country),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                format::format_full_date(now, tz),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{icon}  {}", format::format_temp(snapshot.temp_c, units)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::raw(capitalize(&snapshot.description)),
            Span::styled(
                format!(
                    "   (feels like {})",
                    format::format_temp(snapshot.feels_like_c, units)
                ),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
        Line::from(format!(
            "Humidity: {}%   Wind: {:.1} m/s   Pressure: {} hPa   Cloudiness: {}%",
            snapshot.humidity_pct,
            snapshot.wind_speed_mps,
            snapshot.pressure_hpa,
            snapshot.cloudiness_pct
        )),
        Line::from(""),
        Line::from(format!(
            "Sunrise: {}   Sunset: {}",
            format::format_clock(snapshot.sunrise, tz),
            format::format_clock(snapshot.sunset, tz)
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_forecast(f: &mut Frame, area: Rect, state: &AppState, units: Units) {
    let block = Block::default().borders(Borders::ALL).title(" 5-Day Forecast ");

    if state.loading {
        render_centered(f, area, block, "Loading forecast data...");
        return;
    }
    if let Some(error) = &state.error {
        render_error(f, area, block, error);
        return;
    }
    let Some(forecast) = &state.forecast else {
        render_centered(
            f,
            area,
            block,
            "Search for a city to see the weather forecast for the next 5 days.",
        );
        return;
    };

    let tz = forecast.timezone_offset_secs;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 5-Day Forecast - {}, {} ", forecast.city, forecast.country));

    let rows: Vec<Row> = format::daily_picks(&forecast.entries, tz)
        .into_iter()
        .map(|day| {
            let (weekday, date) = format::format_day(day.at, tz);
            let icon = icon_glyph(conditions::icon_for(day.condition_code, true));
            Row::new(vec![
                Cell::from(format!("{weekday} {date}")),
                Cell::from(icon),
                Cell::from(format::format_temp(day.temp_c, units)),
                Cell::from(format!(
                    "{} / {}",
                    format::format_temp(day.temp_min_c, units),
                    format::format_temp(day.temp_max_c, units)
                )),
                Cell::from(format!("{}%", day.humidity_pct)),
                Cell::from(format!("{:.1} m/s", day.wind_speed_mps)),
                Cell::from(capitalize(&day.description)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Day", "", "Temp", "Min / Max", "Hum", "Wind", "Summary"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(13),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(1);

    f.render_widget(table, area);
}

fn render_centered(f: &mut Frame, area: Rect, block: Block, message: &str) {
    let p = Paragraph::new(vec![Line::from(""), Line::from(message)])
        .alignment(Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn render_error(f: &mut Frame, area: Rect, block: Block, error: &str) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Try searching for another city",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(block)
    .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" search  "),
        Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" suggestions/recent  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" page  "),
        Span::styled("F2", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}  ", app.units.toggle().suffix())),
        Span::styled("^L", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" clear data  "),
        Span::styled("^X", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" clear recent  "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ];

    if let Some((notice, _)) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));
    f.render_widget(p, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("Überzogen"), "Überzogen");
    }

    #[test]
    fn every_icon_has_a_glyph() {
        for icon in [
            Icon::Thunderstorm,
            Icon::Rain,
            Icon::Snow,
            Icon::Atmosphere,
            Icon::ClearDay,
            Icon::ClearNight,
            Icon::CloudsDay,
            Icon::CloudsNight,
            Icon::Clouds,
        ] {
            assert!(!icon_glyph(icon).is_empty());
        }
    }
}
