//! # Topic History
//!
//! Browser-style navigation over visited topics: a flat list plus a cursor.
//!
//! ```text
//! topics:  [ Hypertext, Entropy, Vortex ]
//!                         ▲
//!                   current_index = 1
//!
//! navigate_to("Fractal")  →  [ Hypertext, Entropy, Fractal ]   (Vortex dropped)
//! ```
//!
//! Navigating after going back discards the forward entries. There is no
//! branching tree.

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC: &str = "Hypertext";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub topics: Vec<String>,
    pub current_index: usize,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::with_topic(DEFAULT_TOPIC)
    }
}

impl HistoryState {
    /// A single-entry history positioned on `topic`.
    pub fn with_topic(topic: &str) -> Self {
        Self {
            topics: vec![topic.to_string()],
            current_index: 0,
        }
    }

    pub fn current_topic(&self) -> &str {
        &self.topics[self.current_index]
    }

    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_index + 1 < self.topics.len()
    }

    /// Pushes `topic` after the cursor, dropping any forward entries.
    ///
    /// Returns `false` (and leaves the history untouched) when the trimmed
    /// topic is empty or matches the current topic ignoring case.
    pub fn navigate_to(&mut self, topic: &str) -> bool {
        let topic = topic.trim();
        if topic.is_empty() || topic.to_lowercase() == self.current_topic().to_lowercase() {
            return false;
        }
        self.topics.truncate(self.current_index + 1);
        self.topics.push(topic.to_string());
        self.current_index = self.topics.len() - 1;
        true
    }

    /// Steps the cursor back. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Steps the cursor forward. Returns `false` at the newest entry.
    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Moves the cursor to `index`. Indexes outside the list are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.topics.len() {
            debug!(
                "Ignoring history jump to {} (only {} entries)",
                index,
                self.topics.len()
            );
            return false;
        }
        self.current_index = index;
        true
    }

    /// Collapses the history to the current topic only.
    pub fn clear(&mut self) {
        let current = self.current_topic().to_string();
        self.topics = vec![current];
        self.current_index = 0;
    }

    /// Checks the structural invariant for state read from outside the program.
    pub fn validate(&self) -> Result<(), String> {
        if self.topics.is_empty() {
            return Err("history has no topics".to_string());
        }
        if self.current_index >= self.topics.len() {
            return Err(format!(
                "current index {} out of range for {} topics",
                self.current_index,
                self.topics.len()
            ));
        }
        if let Some(pos) = self.topics.iter().position(|t| t.trim().is_empty()) {
            return Err(format!("topic {pos} is blank"));
        }
        Ok(())
    }
}
