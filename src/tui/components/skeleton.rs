//! Placeholder bars shown while the first fragment of a definition is on
//! its way. A brighter band sweeps across them to show progress.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

/// Bar widths in percent of the available width.
const BAR_WIDTHS: [u16; 5] = [100, 83, 100, 75, 66];
const BAND_WIDTH: usize = 6;

pub struct LoadingSkeleton {
    frame_index: usize,
}

impl LoadingSkeleton {
    pub fn new(frame_index: usize) -> Self {
        Self { frame_index }
    }
}

impl Component for LoadingSkeleton {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;
        let band_start = if width == 0 { 0 } else { self.frame_index % (width + BAND_WIDTH) };
        let dim = Style::default().fg(Color::DarkGray);
        let bright = Style::default().fg(Color::Gray);

        // Bars with a blank row between them
        let lines: Vec<Line> = BAR_WIDTHS
            .iter()
            .flat_map(|percent| {
                let len = width * *percent as usize / 100;
                let spans: Vec<Span> = (0..len)
                    .map(|x| {
                        let lit = x + BAND_WIDTH >= band_start && x < band_start;
                        Span::styled("▒", if lit { bright } else { dim })
                    })
                    .collect();
                [Line::from(spans), Line::default()]
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }
}
