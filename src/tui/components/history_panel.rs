//! # HistoryPanel Component
//!
//! Side panel listing visited topics, newest at the bottom, with a Clear
//! button in the title. Only shown once there is somewhere to go back to.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `HistoryPanelState` lives in `TuiState` and remembers row positions
//! - `HistoryPanel` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::history::HistoryState;
use crate::tui::component::Component;

pub const HISTORY_PANEL_WIDTH: u16 = 30;
const CLEAR_LABEL: &str = "[Clear]";

/// What a click on the panel means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryHit {
    Entry(usize),
    Clear,
}

#[derive(Debug, Default)]
pub struct HistoryPanelState {
    /// `(row, entry index)` for each visible row, from the last render
    rows: Vec<(u16, usize)>,
    area: Rect,
    clear_button: Option<Rect>,
    pub scroll: usize,
}

impl HistoryPanelState {
    /// Maps a click to an entry or the Clear button. The current entry
    /// is not clickable.
    pub fn hit_test(&self, column: u16, row: u16, current_index: usize) -> Option<HistoryHit> {
        if let Some(button) = self.clear_button
            && row == button.y
            && column >= button.x
            && column < button.x + button.width
        {
            return Some(HistoryHit::Clear);
        }
        if column < self.area.x || column >= self.area.x + self.area.width {
            return None;
        }
        self.rows
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, index)| *index)
            .filter(|index| *index != current_index)
            .map(HistoryHit::Entry)
    }
}

/// Whether the panel is worth drawing at all.
pub fn is_visible(history: &HistoryState) -> bool {
    history.topics.len() > 1
}

pub struct HistoryPanel<'a> {
    pub history: &'a HistoryState,
    pub state: &'a mut HistoryPanelState,
}

impl Component for HistoryPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" History ")
            .padding(Padding::horizontal(1));

        // Clear button sits at the right end of the title row
        let clear_width = CLEAR_LABEL.width() as u16;
        let clear_button = (area.width > clear_width + 10).then(|| Rect {
            x: area.x + area.width - clear_width - 1,
            y: area.y,
            width: clear_width,
            height: 1,
        });
        frame.render_widget(block, area);
        if let Some(button) = clear_button {
            frame.render_widget(
                Span::styled(CLEAR_LABEL, Style::default().fg(Color::Red)),
                button,
            );
        }

        // Below the title row, past the left border and padding
        let list_area = Rect {
            x: area.x + 2,
            y: area.y + 1,
            width: area.width.saturating_sub(3),
            height: area.height.saturating_sub(1),
        };

        // Keep the current entry in view
        let visible = list_area.height as usize;
        let current = self.history.current_index;
        if current < self.state.scroll {
            self.state.scroll = current;
        } else if visible > 0 && current >= self.state.scroll + visible {
            self.state.scroll = current + 1 - visible;
        }

        let mut rows = Vec::new();
        let lines: Vec<Line> = self
            .history
            .topics
            .iter()
            .enumerate()
            .skip(self.state.scroll)
            .take(visible)
            .map(|(index, topic)| {
                rows.push((list_area.y + rows.len() as u16, index));
                let number = Span::styled(
                    format!("{:>2} ", index + 1),
                    Style::default().fg(Color::DarkGray),
                );
                let label = if index == current {
                    Span::styled(
                        topic.as_str(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(topic.as_str(), Style::default().fg(Color::Gray))
                };
                Line::from(vec![number, label])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), list_area);

        self.state.rows = rows;
        self.state.area = list_area;
        self.state.clear_button = clear_button;
    }
}
