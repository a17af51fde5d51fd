//! # SearchBar Component
//!
//! Top row of the screen: back/forward buttons, a one-line topic field and
//! a Random button.
//!
//! ## State Management
//!
//! The text buffer and cursor are internal state. `is_loading`,
//! `can_go_back`, `can_go_forward` and `focused` are props refreshed from the
//! app every frame. Button positions from the last render are kept for
//! mouse hit-testing.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border + one column of padding on each side
const HORIZONTAL_OVERHEAD: u16 = 4;
pub const SEARCH_BAR_HEIGHT: u16 = 3;

/// High-level events emitted by the SearchBar
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A trimmed, non-empty query was submitted. The field is cleared.
    Submit(String),
    ContentChanged,
}

/// Clickable buttons around the search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchButton {
    Back,
    Forward,
    Random,
    Field,
}

pub struct SearchBar {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Cursor position as byte offset in buffer
    cursor: usize,
    /// Searching, navigating and random picks are disabled while loading (Prop)
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Whether keystrokes go to the field (Prop)
    pub focused: bool,
    /// Button rectangles from the last render
    hit_boxes: Vec<(Rect, SearchButton)>,
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            is_loading: false,
            can_go_back: false,
            can_go_forward: false,
            focused: false,
            hit_boxes: Vec::new(),
        }
    }

    /// Which button (if any) was at the given screen position on the last render.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<SearchButton> {
        self.hit_boxes
            .iter()
            .find(|(rect, _)| contains(*rect, column, row))
            .map(|(_, button)| *button)
    }

    fn button_style(&self, enabled: bool) -> Style {
        if enabled && !self.is_loading {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    /// Returns the part of the buffer that fits in `width` columns with the
    /// cursor visible, plus the cursor's column within it.
    fn visible_window(&self, width: u16) -> (&str, u16) {
        let width = width as usize;
        let mut start = 0;
        while self.buffer[start..self.cursor].width() >= width.max(1) {
            start = next_char_boundary(&self.buffer, start);
        }
        let mut end = self.cursor;
        while end < self.buffer.len() {
            let next = next_char_boundary(&self.buffer, end);
            if self.buffer[start..next].width() > width {
                break;
            }
            end = next;
        }
        let cursor_col = self.buffer[start..self.cursor].width() as u16;
        (&self.buffer[start..end], cursor_col)
    }
}

impl Component for SearchBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};
        let [back_area, forward_area, field_area, random_area] =
            Layout::horizontal([Length(5), Length(5), Min(10), Length(10)]).areas(area);

        self.hit_boxes = vec![
            (back_area, SearchButton::Back),
            (forward_area, SearchButton::Forward),
            (field_area, SearchButton::Field),
            (random_area, SearchButton::Random),
        ];

        for (label, rect, enabled) in [
            ("<", back_area, self.can_go_back),
            (">", forward_area, self.can_go_forward),
            ("Random", random_area, true),
        ] {
            let style = self.button_style(enabled);
            let button = Paragraph::new(label)
                .centered()
                .style(style)
                .block(Block::bordered().border_type(BorderType::Rounded).border_style(style));
            frame.render_widget(button, rect);
        }

        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Search ");

        let inner_width = field_area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let (visible, cursor_col) = self.visible_window(inner_width);
        let line = if self.buffer.is_empty() && !self.focused {
            Line::from(Span::styled(
                "Press / to search",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(visible.to_string())
        };
        let field = Paragraph::new(line)
            .block(block.padding(ratatui::widgets::Padding::horizontal(1)));
        frame.render_widget(field, field_area);

        if self.focused {
            frame.set_cursor_position((field_area.x + 2 + cursor_col, field_area.y + 1));
        }
    }
}

impl EventHandler for SearchBar {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(SearchEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // The field is a single line
                let text = text.replace(['\n', '\r'], " ");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(SearchEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                SearchEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                SearchEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                SearchEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                SearchEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                SearchEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                SearchEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                let query = self.buffer.trim();
                if query.is_empty() || self.is_loading {
                    return None;
                }
                let query = query.to_string();
                self.buffer.clear();
                self.cursor = 0;
                Some(SearchEvent::Submit(query))
            }
            _ => None,
        }
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> SearchBar {
        let mut bar = SearchBar::new();
        for c in text.chars() {
            bar.handle_event(&TuiEvent::InputChar(c));
        }
        bar
    }

    fn rendered(bar: &mut SearchBar, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, SEARCH_BAR_HEIGHT)).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut bar = typed("ab");
        assert_eq!(bar.buffer, "ab");
        assert_eq!(bar.handle_event(&TuiEvent::Backspace), Some(SearchEvent::ContentChanged));
        assert_eq!(bar.buffer, "a");
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut bar = typed("  Entropy  ");
        assert_eq!(
            bar.handle_event(&TuiEvent::Submit),
            Some(SearchEvent::Submit("Entropy".to_string()))
        );
        assert!(bar.buffer.is_empty());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut bar = typed("   ");
        assert_eq!(bar.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_submit_disabled_while_loading() {
        let mut bar = typed("Flux");
        bar.is_loading = true;
        assert_eq!(bar.handle_event(&TuiEvent::Submit), None);
        assert_eq!(bar.buffer, "Flux", "query is kept for later");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut bar = typed("café");
        bar.handle_event(&TuiEvent::CursorLeft);
        bar.handle_event(&TuiEvent::Delete);
        assert_eq!(bar.buffer, "caf");
        bar.handle_event(&TuiEvent::CursorHome);
        bar.handle_event(&TuiEvent::InputChar('¡'));
        assert_eq!(bar.buffer, "¡caf");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut bar = SearchBar::new();
        bar.handle_event(&TuiEvent::Paste("two\nlines".to_string()));
        assert_eq!(bar.buffer, "two lines");
    }

    #[test]
    fn test_render_and_hit_test_buttons() {
        let mut bar = SearchBar::new();
        bar.can_go_back = true;
        let text = rendered(&mut bar, 60);
        assert!(text.contains("Search"));
        assert!(text.contains("Random"));
        assert!(text.contains("Press / to search"));

        assert_eq!(bar.hit_test(1, 1), Some(SearchButton::Back));
        assert_eq!(bar.hit_test(6, 1), Some(SearchButton::Forward));
        assert_eq!(bar.hit_test(20, 1), Some(SearchButton::Field));
        assert_eq!(bar.hit_test(55, 1), Some(SearchButton::Random));
        assert_eq!(bar.hit_test(20, 5), None);
    }

    #[test]
    fn test_long_query_keeps_cursor_end_visible() {
        let mut bar = typed("abcdefghijklmnopqrstuvwxyz");
        bar.focused = true;
        let (visible, cursor_col) = bar.visible_window(10);
        assert!(visible.ends_with('z'));
        assert!(cursor_col <= 10);
    }
}
