//! # ArtDisplay Component
//!
//! Centered text-art above the definition. While the art is still being
//! generated a dim placeholder line is shown instead.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::inference::AsciiArtData;
use crate::tui::component::Component;

pub struct ArtDisplay<'a> {
    pub art: Option<&'a AsciiArtData>,
    pub spinner_frame: usize,
}

impl<'a> ArtDisplay<'a> {
    pub fn new(art: Option<&'a AsciiArtData>, spinner_frame: usize) -> Self {
        Self { art, spinner_frame }
    }

    /// Rows needed to show everything: art, then a blank row and the
    /// block-letter text when there is one.
    pub fn required_height(&self) -> u16 {
        let Some(art) = self.art else {
            return 1;
        };
        let mut rows = art.art.lines().count();
        if let Some(text) = &art.text {
            rows += 1 + text.lines().count();
        }
        rows.max(1) as u16
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let Some(art) = self.art else {
            const DOTS: [&str; 4] = ["", ".", "..", "..."];
            let dots = DOTS[(self.spinner_frame / 3) % DOTS.len()];
            return vec![Line::styled(
                format!("Drawing{dots:<3}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )];
        };
        let art_style = Style::default().fg(Color::Green);
        let mut lines: Vec<Line> = art
            .art
            .lines()
            .map(|l| Line::styled(l, art_style))
            .collect();
        if let Some(text) = &art.text {
            lines.push(Line::default());
            lines.extend(
                text.lines()
                    .map(|l| Line::styled(l, Style::default().fg(Color::Cyan))),
            );
        }
        lines
    }
}

impl Component for ArtDisplay<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.lines()).centered(), area);
    }
}
