//! # StatusBar Component
//!
//! Bottom line of the screen: which backend and model wrote the page, how
//! long the definition took, the latest status message and key hints.
//!
//! Purely presentational. All data arrives as props:
//!
//! ```rust,ignore
//! let mut status_bar = StatusBar::new(provider, model, app.generation_time, &app.status_message);
//! status_bar.render(frame, area);
//! ```
//!
//! Text is dropped from the right when the terminal is narrow, so the
//! attribution and timing stay visible.

use std::time::Duration;

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub const KEY_HINTS: &str = "/ search  r random  b/f back/fwd  Tab words  Enter open  c clear  q quit";

pub struct StatusBar<'a> {
    pub provider: &'a str,
    pub model_name: &'a str,
    pub generation_time: Option<Duration>,
    pub status_message: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        provider: &'a str,
        model_name: &'a str,
        generation_time: Option<Duration>,
        status_message: &'a str,
    ) -> Self {
        Self {
            provider,
            model_name,
            generation_time,
            status_message,
        }
    }

    fn attribution(&self) -> String {
        let mut text = format!("infiwiki · {} via {}", self.model_name, self.provider);
        if let Some(elapsed) = self.generation_time {
            text.push_str(&format!(" · {}ms", format_millis(elapsed)));
        }
        text
    }
}

/// Whole milliseconds, rounded to nearest.
pub fn format_millis(elapsed: Duration) -> u128 {
    (elapsed.as_micros() + 500) / 1000
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);
        let mut spans = vec![Span::styled(self.attribution(), dim)];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::styled(
                self.status_message,
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(" | ", dim));
        spans.push(Span::styled(KEY_HINTS, dim));

        frame.render_widget(Line::from(spans), area);
    }
}
