//! Interactive application loop: terminal lifecycle, keyboard handling,
//! the debounce tick for suggestion lookups, and fetch completions
//! delivered over an mpsc channel back onto the UI thread.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use skycast_core::model::GeoSuggestion;
use skycast_core::search::SUGGESTION_LIMIT;
use skycast_core::store::Notice;
use skycast_core::{LocalStore, OpenWeatherClient, SearchFlow, WeatherGateway, WeatherStore};

use crate::cli::Cli;
use crate::format::Units;
use crate::ui;

/// How long a notice stays in the footer.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Poll timeout; keeps the debounce tick responsive.
const TICK: Duration = Duration::from_millis(33);

/// Which of the two screens is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Current,
    Forecast,
}

impl Page {
    fn toggle(self) -> Self {
        match self {
            Page::Current => Page::Forecast,
            Page::Forecast => Page::Current,
        }
    }
}

/// Completions delivered from spawned fetch tasks.
enum AppEvent {
    Suggestions {
        generation: u64,
        results: Vec<GeoSuggestion>,
    },
}

pub struct App {
    store: Arc<WeatherStore<OpenWeatherClient>>,
    gateway: Arc<OpenWeatherClient>,
    storage: LocalStore,
    pub flow: SearchFlow,
    pub page: Page,
    pub units: Units,
    pub notice: Option<(Notice, Instant)>,
    /// Recent entry being browsed with the arrow keys while no
    /// suggestions are shown.
    pub recent_cursor: Option<usize>,
    events_tx: mpsc::Sender<AppEvent>,
    events_rx: mpsc::Receiver<AppEvent>,
    should_quit: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = skycast_core::Config::load()?;
    let api_key = config.api_key()?;

    let storage = LocalStore::open()?;
    let gateway = Arc::new(OpenWeatherClient::new(api_key));
    let store = Arc::new(WeatherStore::new(Arc::clone(&gateway), storage.clone()));

    let flow = SearchFlow::new(storage.recent_searches());
    let (events_tx, events_rx) = mpsc::channel(16);

    let mut app = App {
        store: Arc::clone(&store),
        gateway,
        storage,
        flow,
        page: Page::Current,
        units: if cli.fahrenheit { Units::Fahrenheit } else { Units::Celsius },
        notice: None,
        recent_cursor: None,
        events_tx,
        events_rx,
        should_quit: false,
    };

    // Startup search: an explicit CLI city wins over the remembered one.
    match cli.city {
        Some(city) => {
            tokio::spawn(async move {
                store.search(&city).await;
            });
        }
        None => {
            tokio::spawn(async move {
                store.restore().await;
            });
        }
    }

    let mut terminal = setup_terminal()?;
    let result = app.event_loop(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

impl App {
    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.should_quit {
            // Completions from spawned lookups.
            while let Ok(event) = self.events_rx.try_recv() {
                match event {
                    AppEvent::Suggestions { generation, results } => {
                        self.flow.apply_suggestions(generation, results);
                    }
                }
            }

            // Fire the debounced suggestion lookup once its quiet period
            // has elapsed.
            if let Some(lookup) = self.flow.take_due_lookup(Instant::now()) {
                let gateway = Arc::clone(&self.gateway);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let results = gateway.suggest(&lookup.query, SUGGESTION_LIMIT).await;
                    tx.send(AppEvent::Suggestions {
                        generation: lookup.generation,
                        results,
                    })
                    .await
                    .ok();
                });
            }

            if let Some(notice) = self.store.take_notice() {
                self.notice = Some((notice, Instant::now()));
            }
            if self.notice.as_ref().is_some_and(|(_, at)| at.elapsed() > NOTICE_TTL) {
                self.notice = None;
            }

            let state = self.store.state();
            terminal.draw(|f| ui::draw(f, self, &state))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('l') => self.store.clear(),
                KeyCode::Char('x') => self.clear_recent(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.type_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Tab => self.page = self.page.toggle(),
            KeyCode::F(2) => self.units = self.units.toggle(),
            KeyCode::Down => self.arrow_down(),
            KeyCode::Up => self.arrow_up(),
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                // Escape dismisses the suggestion list; with nothing shown
                // it quits.
                if self.flow.has_suggestions() {
                    self.flow.dismiss_suggestions();
                } else {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    fn type_char(&mut self, c: char) {
        let mut text = self.flow.input().to_string();
        text.push(c);
        self.flow.set_input(text, Instant::now());
        self.recent_cursor = None;
    }

    fn backspace(&mut self) {
        let mut text = self.flow.input().to_string();
        if text.pop().is_some() {
            self.flow.set_input(text, Instant::now());
        }
        self.recent_cursor = None;
    }

    /// Down: advance the suggestion highlight, or browse recent searches
    /// into the input when no suggestions are shown.
    fn arrow_down(&mut self) {
        if self.flow.has_suggestions() {
            self.flow.highlight_next();
            return;
        }

        let len = self.flow.recent().len();
        if len == 0 {
            return;
        }
        let next = match self.recent_cursor {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.browse_recent(next);
    }

    fn arrow_up(&mut self) {
        if self.flow.has_suggestions() {
            self.flow.highlight_prev();
            return;
        }

        let len = self.flow.recent().len();
        if len == 0 {
            return;
        }
        let next = match self.recent_cursor {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.browse_recent(next);
    }

    fn browse_recent(&mut self, index: usize) {
        if self.flow.select_recent(index).is_some() {
            self.recent_cursor = Some(index);
        }
    }

    /// Enter: commit the highlighted suggestion, or submit the raw input.
    fn submit(&mut self) {
        let query = if self.flow.highlighted().is_some() {
            self.flow.commit_highlighted()
        } else {
            self.flow.submit()
        };

        let Some(query) = query else {
            // Empty input; the store would reject it anyway, skip the round trip.
            return;
        };

        self.recent_cursor = None;
        self.persist_recent();

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            store.search(&query).await;
        });
    }

    fn clear_recent(&mut self) {
        self.flow.clear_recent();
        self.recent_cursor = None;
        if let Err(e) = self.storage.clear_recent_searches() {
            tracing::warn!("failed to clear recent searches: {e:#}");
        }
    }

    fn persist_recent(&self) {
        if let Err(e) = self.storage.set_recent_searches(self.flow.recent()) {
            tracing::warn!("failed to persist recent searches: {e:#}");
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal::disable_raw_mode().context("Failed to disable raw mode")?;
    term.show_cursor()?;
    Ok(())
}
