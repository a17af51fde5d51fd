//! # Actions
//!
//! Everything that can happen in infiwiki becomes an `Action`.
//! User searches for a topic? That's `Action::Search(query)`.
//! The backend streams a fragment? That's `Action::DefinitionChunk { .. }`.
//!
//! The `update()` function applies an action to the state and returns the
//! `Effect` the adapter must carry out. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Results from background fetches carry the generation they were started
//! for. Anything from a superseded generation is dropped on the floor.

use log::{debug, info};

use crate::core::fallback::fallback_art;
use crate::core::history::HistoryState;
use crate::core::lifecycle::FetchTicket;
use crate::core::state::App;
use crate::inference::AsciiArtData;

#[derive(Debug, PartialEq)]
pub enum Action {
    /// Fetch the current topic. Sent once when the app starts.
    Start,
    Search(String),
    WordClicked(String),
    Random,
    Back,
    Forward,
    JumpTo(usize),
    ClearHistory,
    DefinitionChunk { generation: u64, text: String },
    DefinitionDone { generation: u64 },
    DefinitionFailed { generation: u64, message: String },
    ArtReady { generation: u64, art: AsciiArtData },
    ArtFailed { generation: u64 },
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// History changed and must be persisted. `fetch` is set when the
    /// current topic changed and a new fetch has to be spawned.
    Navigated { fetch: Option<FetchTicket> },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Start => {
            let ticket = app.begin_fetch();
            Effect::Navigated {
                fetch: Some(ticket),
            }
        }
        Action::Search(query) | Action::WordClicked(query) => {
            navigate(app, |history| history.navigate_to(&query))
        }
        Action::Random => {
            let current = app.current_topic().to_string();
            let Some(topic) = app
                .random
                .pick(&current, &mut app.rng)
                .map(str::to_string)
            else {
                return Effect::None;
            };
            info!("Random topic: {:?}", topic);
            navigate(app, |history| history.navigate_to(&topic))
        }
        Action::Back => navigate(app, HistoryState::back),
        Action::Forward => navigate(app, HistoryState::forward),
        Action::JumpTo(index) => navigate(app, |history| history.jump_to(index)),
        Action::ClearHistory => navigate(app, |history| {
            history.clear();
            true
        }),

        Action::DefinitionChunk { generation, text } => {
            if !app.is_current(generation) {
                return discard("DefinitionChunk", generation);
            }
            app.content.push_str(&text);
            Effect::None
        }
        Action::DefinitionDone { generation } => {
            if !app.is_current(generation) {
                return discard("DefinitionDone", generation);
            }
            app.finish_loading();
            Effect::None
        }
        Action::DefinitionFailed {
            generation,
            message,
        } => {
            if !app.is_current(generation) {
                return discard("DefinitionFailed", generation);
            }
            app.content.clear();
            app.error = Some(message);
            app.finish_loading();
            Effect::None
        }
        Action::ArtReady { generation, art } => {
            if !app.is_current(generation) {
                return discard("ArtReady", generation);
            }
            app.art = Some(art);
            Effect::None
        }
        Action::ArtFailed { generation } => {
            if !app.is_current(generation) {
                return discard("ArtFailed", generation);
            }
            app.art = Some(fallback_art(app.current_topic()));
            Effect::None
        }

        Action::Quit => {
            app.cancel_fetch();
            Effect::Quit
        }
    }
}

/// Applies a history change. Only a change of the current topic starts a
/// new fetch; moves that land on the same topic keep the current content.
fn navigate(app: &mut App, change: impl FnOnce(&mut HistoryState) -> bool) -> Effect {
    let before = app.current_topic().to_string();
    if !change(&mut app.history) {
        return Effect::None;
    }
    let fetch = (app.current_topic() != before).then(|| app.begin_fetch());
    Effect::Navigated { fetch }
}

fn discard(kind: &str, generation: u64) -> Effect {
    debug!("Dropping stale {} from generation {}", kind, generation);
    Effect::None
}
