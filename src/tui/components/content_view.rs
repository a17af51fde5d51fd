//! # ContentView Component
//!
//! The streamed definition, laid out as wrapped lines of individually
//! selectable words. Selecting a word (keyboard) or clicking it (mouse)
//! navigates to it.
//!
//! ## Architecture
//!
//! `ContentView` is a transient component (created each frame) that wraps
//! `&'a mut ContentViewState` (persistent state) and the content (props).
//! The word layout is recomputed on every render and cached in the state,
//! so key handling and hit-testing between frames see what is on screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Strips punctuation around a token. `None` if nothing is left.
pub fn clickable_word(token: &str) -> Option<&str> {
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    (!word.is_empty()).then_some(word)
}

/// One selectable word on a wrapped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    pub line: usize,
    /// Byte range of the word within its line
    pub start: usize,
    pub end: usize,
    /// Screen column and width, for hit-testing
    pub col: u16,
    pub width: u16,
}

#[derive(Debug, Default, Clone)]
pub struct ContentLayout {
    pub lines: Vec<String>,
    pub words: Vec<WordSpan>,
}

impl ContentLayout {
    pub fn word_text(&self, index: usize) -> Option<&str> {
        let span = self.words.get(index)?;
        Some(&self.lines[span.line][span.start..span.end])
    }
}

/// Wraps `text` to `width` columns and records where every word landed.
pub fn layout_content(text: &str, width: u16) -> ContentLayout {
    let mut layout = ContentLayout::default();
    if width == 0 {
        return layout;
    }
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            layout.lines.push(String::new());
            continue;
        }
        for wrapped in textwrap::wrap(paragraph, &options) {
            let line_index = layout.lines.len();
            let line = wrapped.into_owned();
            let mut offset = 0;
            for token in line.split(' ') {
                if let Some(word) = clickable_word(token) {
                    let lead = token.len() - token.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
                    let start = offset + lead;
                    layout.words.push(WordSpan {
                        line: line_index,
                        start,
                        end: start + word.len(),
                        col: line[..start].width() as u16,
                        width: word.width() as u16,
                    });
                }
                offset += token.len() + 1;
            }
            layout.lines.push(line);
        }
    }
    layout
}

/// Events emitted by the content view.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    /// A word was activated; carries the punctuation-trimmed word.
    Activate(String),
}

/// Scroll, selection and layout cache. Persisted in `TuiState`.
#[derive(Debug, Default)]
pub struct ContentViewState {
    pub scroll: u16,
    pub selected: Option<usize>,
    pub layout: ContentLayout,
    /// Where the content was drawn on the last render
    pub area: Rect,
    /// Generation of the fetch whose content is shown
    generation: Option<u64>,
}

impl ContentViewState {
    /// Resets scroll and selection when a different fetch's content is shown.
    pub fn sync_generation(&mut self, generation: Option<u64>) {
        if self.generation != generation {
            self.generation = generation;
            self.scroll = 0;
            self.selected = None;
        }
    }

    pub fn selected_word(&self) -> Option<&str> {
        self.selected.and_then(|i| self.layout.word_text(i))
    }

    /// The word under a screen position, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let line = (row - area.y + self.scroll) as usize;
        let col = column - area.x;
        self.layout
            .words
            .iter()
            .position(|w| w.line == line && col >= w.col && col < w.col + w.width)
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let max = self.max_scroll() as i32;
        self.scroll = (self.scroll as i32 + delta).clamp(0, max) as u16;
    }

    fn max_scroll(&self) -> u16 {
        (self.layout.lines.len() as u16).saturating_sub(self.area.height)
    }

    fn select(&mut self, index: usize) {
        self.selected = Some(index);
        self.scroll_to_selected();
    }

    fn scroll_to_selected(&mut self) {
        let Some(span) = self.selected.and_then(|i| self.layout.words.get(i)) else {
            return;
        };
        let line = span.line as u16;
        let height = self.area.height.max(1);
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    fn step(&mut self, forward: bool) -> bool {
        let count = self.layout.words.len();
        if count == 0 {
            return false;
        }
        let next = match (self.selected, forward) {
            (None, true) => self.first_visible_word().unwrap_or(0),
            (None, false) => count - 1,
            (Some(i), true) => (i + 1).min(count - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.select(next);
        true
    }

    /// Moves to the word on the adjacent line nearest in column.
    fn step_line(&mut self, down: bool) -> bool {
        let Some(current) = self.selected.and_then(|i| self.layout.words.get(i)).cloned() else {
            return self.step(down);
        };
        let target_line = if down {
            current.line + 1
        } else if let Some(line) = current.line.checked_sub(1) {
            line
        } else {
            return false;
        };
        // Blank lines have no words; keep going until one does
        let mut line = target_line;
        loop {
            if line >= self.layout.lines.len() {
                return false;
            }
            let nearest = self
                .layout
                .words
                .iter()
                .enumerate()
                .filter(|(_, w)| w.line == line)
                .min_by_key(|(_, w)| w.col.abs_diff(current.col))
                .map(|(i, _)| i);
            if let Some(index) = nearest {
                self.select(index);
                return true;
            }
            if down {
                line += 1;
            } else if let Some(prev) = line.checked_sub(1) {
                line = prev;
            } else {
                return false;
            }
        }
    }

    fn first_visible_word(&self) -> Option<usize> {
        let top = self.scroll as usize;
        self.layout.words.iter().position(|w| w.line >= top)
    }
}

impl EventHandler for ContentViewState {
    type Event = ContentEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Tab | TuiEvent::CursorRight | TuiEvent::InputChar('l') => {
                self.step(true);
                None
            }
            TuiEvent::BackTab | TuiEvent::CursorLeft | TuiEvent::InputChar('h') => {
                self.step(false);
                None
            }
            TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
                self.step_line(true);
                None
            }
            TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
                self.step_line(false);
                None
            }
            TuiEvent::ScrollUp => {
                self.scroll_by(-1);
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_by(1);
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_by(-(self.area.height.max(1) as i32));
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_by(self.area.height.max(1) as i32);
                None
            }
            TuiEvent::Submit => self
                .selected_word()
                .map(|word| ContentEvent::Activate(word.to_string())),
            _ => None,
        }
    }
}

/// Transient render wrapper for the content.
pub struct ContentView<'a> {
    pub content: &'a str,
    /// Selection is only highlighted while the user is browsing (Prop)
    pub show_selection: bool,
    pub state: &'a mut ContentViewState,
}

impl Component for ContentView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.layout = layout_content(self.content, area.width);
        self.state.area = area;
        if let Some(i) = self.state.selected
            && i >= self.state.layout.words.len()
        {
            self.state.selected = None;
        }
        self.state.scroll = self.state.scroll.min(self.state.max_scroll());

        let selected = self.state.selected.filter(|_| self.show_selection);
        let selected_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let layout = &self.state.layout;
        let top = self.state.scroll as usize;
        let lines: Vec<Line> = layout
            .lines
            .iter()
            .enumerate()
            .skip(top)
            .take(area.height as usize)
            .map(|(line_index, text)| {
                let Some(span) = selected
                    .and_then(|i| layout.words.get(i))
                    .filter(|w| w.line == line_index)
                else {
                    return Line::from(text.as_str());
                };
                Line::from(vec![
                    Span::raw(&text[..span.start]),
                    Span::styled(&text[span.start..span.end], selected_style),
                    Span::raw(&text[span.end..]),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }
}
