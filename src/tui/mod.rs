//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (definition or art still loading): draws every ~80ms so
//!   the skeleton and the art placeholder move.
//! - **Idle**: sleeps up to 500ms, only redraws on events, resizes or
//!   results from background fetches.
//!
//! ## Input Modes
//!
//! - **Browse** (default): single keys drive navigation, Tab/arrows move
//!   the word selection, Enter opens the selected word.
//! - **Search**: keystrokes edit the search field. Enter submits, Esc or Tab
//!   goes back to browsing.
//!
//! Searching, random picks and back/forward are ignored while a definition
//! is loading. History entries and words stay clickable.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::Provider;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::history::HistoryState;
use crate::core::lifecycle::{FetchTicket, run_art, run_definition};
use crate::core::state::App;
use crate::core::store::HistoryStore;
use crate::inference::{GeminiProvider, GenerativeBackend, OpenRouterProvider};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ContentEvent, ContentViewState, HistoryHit, HistoryPanelState, SearchBar, SearchButton,
    SearchEvent,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::Hit;

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Single-key commands and word selection.
    Browse,
    /// Text editing in the search field.
    Search,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub search_bar: SearchBar,
    pub content: ContentViewState,
    pub history: HistoryPanelState,
    pub input_mode: InputMode,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            search_bar: SearchBar::new(),
            content: ContentViewState::default(),
            history: HistoryPanelState::default(),
            input_mode: InputMode::Browse,
        }
    }
}

/// Runs `restore` when dropped, so every exit path out of `run`
/// (including `?` on a failed draw) leaves the terminal usable.
struct RestoreGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> RestoreGuard<F> {
    fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally (Alt+arrows arrive
        // unambiguously); terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Build a backend from the resolved provider and credentials.
///
/// A missing API key still yields a backend; it reports itself as
/// unconfigured and every fetch shows the missing-key error.
pub fn build_backend(config: &ResolvedConfig) -> Arc<dyn GenerativeBackend> {
    match config.provider {
        Provider::Gemini => Arc::new(GeminiProvider::new(
            config.api_key.clone(),
            Some(config.base_url.clone()),
        )),
        Provider::OpenRouter => Arc::new(OpenRouterProvider::new(
            config.api_key.clone(),
            Some(config.base_url.clone()),
        )),
    }
}

pub fn run(config: ResolvedConfig, initial_topic: Option<String>) -> std::io::Result<()> {
    let backend = build_backend(&config);
    let store = HistoryStore::new(config.history_path.clone());
    let history = store.load_or(HistoryState::with_topic(&config.default_topic));
    info!(
        "Loaded history from {} ({} topics, current {:?})",
        store.path().display(),
        history.topics.len(),
        history.current_topic()
    );

    let mut app = App::new(history, backend, config.generation.clone());
    if let Some(topic) = initial_topic {
        app.history.navigate_to(&topic);
    }
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    // Declared first so it drops last, after the mode guard
    let _restore_guard = RestoreGuard::new(ratatui::restore);
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let effect = update(&mut app, Action::Start);
    apply_effect(effect, &mut app, &store, &tx);

    // Animation timer
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'event_loop: loop {
        let animating = app.is_loading || app.art.is_none();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(event, &mut app, &mut tui) {
                debug!("User action: {:?}", action);
                let effect = update(&mut app, action);
                if apply_effect(effect, &mut app, &store, &tx) {
                    break 'event_loop;
                }
            }
        }

        // Handle background task actions (streamed fragments, art)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &mut app, &store, &tx) {
                break 'event_loop;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Carries out an effect. Returns `true` when the app should quit.
fn apply_effect(
    effect: Effect,
    app: &mut App,
    store: &HistoryStore,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::Navigated { fetch } => {
            if let Err(e) = store.save(&app.history) {
                warn!("Failed to save history to {}: {}", store.path().display(), e);
                app.status_message = format!("History not saved: {e}");
            }
            if let Some(ticket) = fetch {
                spawn_fetch(app, ticket, tx.clone());
            }
            false
        }
    }
}

fn spawn_fetch(app: &App, ticket: FetchTicket, tx: mpsc::Sender<Action>) {
    info!(
        "Spawning fetch generation {} for {:?}",
        ticket.generation, ticket.topic
    );
    tokio::spawn(run_definition(
        app.backend.clone(),
        app.settings.clone(),
        ticket.clone(),
        tx.clone(),
    ));
    tokio::spawn(run_art(app.backend.clone(), app.settings.clone(), ticket, tx));
}

/// Some intents make no sense while a definition is still loading.
fn gated(app: &mut App, action: Action) -> Option<Action> {
    if app.is_loading {
        app.status_message = "Still loading…".to_string();
        return None;
    }
    app.status_message.clear();
    Some(action)
}

/// Translates a terminal event into at most one core action, updating
/// presentation state along the way.
fn route_event(event: TuiEvent, app: &mut App, tui: &mut TuiState) -> Option<Action> {
    tui.search_bar.is_loading = app.is_loading;

    // Mode-independent events
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        TuiEvent::Back => return gated(app, Action::Back),
        TuiEvent::Forward => return gated(app, Action::Forward),
        TuiEvent::MouseClick(column, row) => return route_click(column, row, app, tui),
        _ => {}
    }

    match tui.input_mode {
        InputMode::Search => match event {
            TuiEvent::Escape | TuiEvent::Tab => {
                tui.input_mode = InputMode::Browse;
                None
            }
            other => match tui.search_bar.handle_event(&other)? {
                SearchEvent::Submit(query) => {
                    tui.input_mode = InputMode::Browse;
                    Some(Action::Search(query))
                }
                SearchEvent::ContentChanged => None,
            },
        },
        InputMode::Browse => match event {
            TuiEvent::InputChar('/') | TuiEvent::InputChar('s') => {
                tui.input_mode = InputMode::Search;
                None
            }
            TuiEvent::Paste(_) => {
                tui.input_mode = InputMode::Search;
                tui.search_bar.handle_event(&event);
                None
            }
            TuiEvent::InputChar('q') | TuiEvent::Escape => Some(Action::Quit),
            TuiEvent::InputChar('r') => gated(app, Action::Random),
            TuiEvent::InputChar('b') => gated(app, Action::Back),
            TuiEvent::InputChar('f') => gated(app, Action::Forward),
            TuiEvent::InputChar('c') => Some(Action::ClearHistory),
            TuiEvent::InputChar(digit @ '1'..='9') => digit
                .to_digit(10)
                .map(|n| Action::JumpTo(n as usize - 1)),
            other => match tui.content.handle_event(&other)? {
                ContentEvent::Activate(word) => Some(Action::WordClicked(word)),
            },
        },
    }
}

fn route_click(column: u16, row: u16, app: &mut App, tui: &mut TuiState) -> Option<Action> {
    match ui::hit_test(tui, app, column, row)? {
        Hit::Search(SearchButton::Back) => gated(app, Action::Back),
        Hit::Search(SearchButton::Forward) => gated(app, Action::Forward),
        Hit::Search(SearchButton::Random) => gated(app, Action::Random),
        Hit::Search(SearchButton::Field) => {
            tui.input_mode = InputMode::Search;
            None
        }
        Hit::Word(word) => Some(Action::WordClicked(word)),
        Hit::History(HistoryHit::Entry(index)) => Some(Action::JumpTo(index)),
        Hit::History(HistoryHit::Clear) => Some(Action::ClearHistory),
    }
}
