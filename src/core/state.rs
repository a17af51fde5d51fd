//! # Application State
//!
//! Core business state for infiwiki. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn GenerativeBackend>  // text + art generation
//! ├── settings: GenerationSettings         // models, art toggles, retry budget
//! ├── history: HistoryState                // visited topics + cursor
//! ├── content: String                      // streamed definition so far
//! ├── is_loading: bool                     // definition still streaming
//! ├── error: Option<String>                // definition failure
//! ├── art: Option<AsciiArtData>            // generated or fallback art
//! ├── generation_time: Option<Duration>    // how long the definition took
//! ├── lifecycle: Option<FetchLifecycle>    // active topic activation
//! ├── next_generation: u64                 // source of generation numbers
//! ├── random: RandomTopics                 // candidates for "Random"
//! ├── rng: SmallRng                        // drives random picks
//! └── status_message: String               // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::core::history::HistoryState;
use crate::core::lifecycle::{FetchLifecycle, FetchTicket};
use crate::core::random::RandomTopics;
use crate::inference::{AsciiArtData, GenerationSettings, GenerativeBackend};

pub struct App {
    pub backend: Arc<dyn GenerativeBackend>,
    pub settings: GenerationSettings,
    pub history: HistoryState,
    pub content: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub art: Option<AsciiArtData>,
    pub generation_time: Option<Duration>,
    pub lifecycle: Option<FetchLifecycle>,
    next_generation: u64,
    pub random: RandomTopics,
    pub rng: SmallRng,
    pub status_message: String,
}

impl App {
    pub fn new(
        history: HistoryState,
        backend: Arc<dyn GenerativeBackend>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            backend,
            settings,
            history,
            content: String::new(),
            is_loading: false,
            error: None,
            art: None,
            generation_time: None,
            lifecycle: None,
            next_generation: 0,
            random: RandomTopics::default(),
            rng: SmallRng::from_entropy(),
            status_message: String::new(),
        }
    }

    pub fn current_topic(&self) -> &str {
        self.history.current_topic()
    }

    /// Supersedes any running fetch and resets the view for the current topic.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        if let Some(previous) = self.lifecycle.take() {
            previous.cancel();
        }
        self.next_generation += 1;
        let lifecycle = FetchLifecycle::new(self.next_generation, self.current_topic().to_string());
        info!(
            "Fetch generation {} started for {:?}",
            lifecycle.generation, lifecycle.topic
        );

        self.is_loading = true;
        self.error = None;
        self.content.clear();
        self.art = None;
        self.generation_time = None;

        let ticket = lifecycle.ticket();
        self.lifecycle = Some(lifecycle);
        ticket
    }

    /// Cancels the running fetch, if any. Nothing it produces will be applied.
    pub fn cancel_fetch(&mut self) {
        if let Some(lifecycle) = self.lifecycle.take() {
            lifecycle.cancel();
        }
    }

    /// True if `generation` belongs to the active, uncancelled fetch.
    pub fn is_current(&self, generation: u64) -> bool {
        self.lifecycle
            .as_ref()
            .is_some_and(|l| l.generation == generation && !l.is_cancelled())
    }

    /// Marks the definition as settled and records how long it took.
    pub(crate) fn finish_loading(&mut self) {
        self.is_loading = false;
        self.generation_time = self.lifecycle.as_ref().map(|l| l.started_at.elapsed());
    }
}
