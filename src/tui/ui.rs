use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::history_panel::{self, HISTORY_PANEL_WIDTH};
use crate::tui::components::search_bar::SEARCH_BAR_HEIGHT;
use crate::tui::components::{
    ArtDisplay, ContentView, HistoryHit, HistoryPanel, HistoryPanelState, LoadingSkeleton,
    SearchButton, StatusBar,
};
use crate::tui::{InputMode, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

const TITLE: &str = "I N F I N I T E   W I K I";
const EMPTY_CONTENT: &str = "Content could not be generated.";

/// Something clickable found under the mouse.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Search(SearchButton),
    Word(String),
    History(HistoryHit),
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [search_area, main_area, status_area] =
        Layout::vertical([Length(SEARCH_BAR_HEIGHT), Min(0), Length(1)]).areas(frame.area());

    // Search bar props
    tui.search_bar.is_loading = app.is_loading;
    tui.search_bar.can_go_back = app.history.can_go_back();
    tui.search_bar.can_go_forward = app.history.can_go_forward();
    tui.search_bar.focused = tui.input_mode == InputMode::Search;
    tui.search_bar.render(frame, search_area);

    let article_area = if history_panel::is_visible(&app.history) {
        let [article, panel] =
            Layout::horizontal([Min(20), Length(HISTORY_PANEL_WIDTH)]).areas(main_area);
        HistoryPanel {
            history: &app.history,
            state: &mut tui.history,
        }
        .render(frame, panel);
        article
    } else {
        tui.history = HistoryPanelState::default();
        main_area
    };

    draw_article(frame, article_area, app, tui, spinner_frame);

    StatusBar::new(
        app.backend.name(),
        &app.settings.text_model,
        app.generation_time,
        &app.status_message,
    )
    .render(frame, status_area);
}

fn draw_article(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let area = Rect {
        x: area.x + 2,
        width: area.width.saturating_sub(4),
        ..area
    };

    let mut art = ArtDisplay::new(app.art.as_ref(), spinner_frame);
    let art_height = art.required_height().min(area.height / 2).max(1);
    let [title_area, art_area, _, topic_area, _, body_area] = Layout::vertical([
        Length(1),
        Length(art_height),
        Length(1),
        Length(1),
        Length(1),
        Min(0),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(TITLE)
            .centered()
            .style(Style::default().fg(Color::DarkGray)),
        title_area,
    );
    art.render(frame, art_area);
    frame.render_widget(
        Line::styled(
            title_case(app.current_topic()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        topic_area,
    );

    tui.content
        .sync_generation(app.lifecycle.as_ref().map(|l| l.generation));
    let mut content_drawn = false;

    if let Some(error) = &app.error {
        draw_error(frame, body_area, error);
    } else if app.content.is_empty() && app.is_loading {
        LoadingSkeleton::new(spinner_frame).render(frame, body_area);
    } else if !app.content.is_empty() {
        ContentView {
            content: &app.content,
            show_selection: tui.input_mode == InputMode::Browse,
            state: &mut tui.content,
        }
        .render(frame, body_area);
        content_drawn = true;
    } else {
        frame.render_widget(
            Paragraph::new(EMPTY_CONTENT).style(Style::default().fg(Color::DarkGray)),
            body_area,
        );
    }

    if !content_drawn {
        // Nothing clickable is on screen
        tui.content.area = Rect::default();
        tui.content.selected = None;
    }
}

fn draw_error(frame: &mut Frame, area: Rect, message: &str) {
    let style = Style::default().fg(Color::Red);
    let paragraph = Paragraph::new(message)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .border_type(BorderType::Plain)
                .border_style(style)
                .title(" An Error Occurred "),
        );
    let height = u16::try_from(paragraph.line_count(area.width.saturating_sub(2)))
        .unwrap_or(u16::MAX)
        .min(area.height);
    frame.render_widget(paragraph, Rect { height, ..area });
}

/// Upper-cases the first letter of every word.
pub fn title_case(topic: &str) -> String {
    topic
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a screen position to whatever was drawn there on the last frame.
pub fn hit_test(tui: &TuiState, app: &App, column: u16, row: u16) -> Option<Hit> {
    if let Some(button) = tui.search_bar.hit_test(column, row) {
        return Some(Hit::Search(button));
    }
    if let Some(hit) = tui.history.hit_test(column, row, app.history.current_index) {
        return Some(Hit::History(hit));
    }
    tui.content
        .hit_test(column, row)
        .and_then(|index| tui.content.layout.word_text(index))
        .map(|word| Hit::Word(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn generation(app: &App) -> u64 {
        app.lifecycle.as_ref().unwrap().generation
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("order and chaos"), "Order And Chaos");
        assert_eq!(title_case("élan"), "Élan");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_loading_shows_skeleton_and_no_history_panel() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("Hypertext"));
        assert!(text.contains("▒▒▒"));
        assert!(text.contains("Drawing"));
        assert!(!text.contains("[Clear]"));
    }

    #[test]
    fn test_streamed_content_and_footer_time() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let generation = generation(&app);
        update(
            &mut app,
            Action::DefinitionChunk { generation, text: "Linked text, everywhere.".to_string() },
        );
        update(&mut app, Action::DefinitionDone { generation });
        update(&mut app, Action::ArtFailed { generation });

        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("Linked text, everywhere."));
        assert!(text.contains("│ Hypertext │"));
        assert!(text.contains("ms"));
    }

    #[test]
    fn test_error_panel_replaces_content() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let generation = generation(&app);
        update(
            &mut app,
            Action::DefinitionFailed { generation, message: "Error: quota".to_string() },
        );
        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("An Error Occurred"));
        assert!(text.contains("Error: quota"));
        assert!(!text.contains(EMPTY_CONTENT));
    }

    #[test]
    fn test_error_panel_taller_than_u16_fills_area() {
        // One word per wrapped line: 65_535 lines plus two borders
        let message = vec!["x"; 65_535].join(" ");
        let mut terminal = Terminal::new(TestBackend::new(3, 6)).unwrap();
        terminal
            .draw(|f| draw_error(f, f.area(), &message))
            .unwrap();
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].symbol(), "┌");
        assert_eq!(buffer[(1, 4)].symbol(), "x");
        assert_eq!(buffer[(0, 5)].symbol(), "└");
    }

    #[test]
    fn test_empty_content_placeholder() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let generation = generation(&app);
        update(&mut app, Action::DefinitionDone { generation });
        let mut tui = TuiState::new();
        assert!(draw(&app, &mut tui).contains(EMPTY_CONTENT));
    }

    #[test]
    fn test_history_panel_appears_after_navigation() {
        let mut app = test_app();
        update(&mut app, Action::Search("Flux".to_string()));
        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("[Clear]"));
        assert!(text.contains(" 1 Hypertext"));
    }

    #[test]
    fn test_clicking_a_word_hits_it() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let generation = generation(&app);
        update(&mut app, Action::DefinitionChunk { generation, text: "Alpha (beta).".to_string() });
        let mut tui = TuiState::new();
        draw(&app, &mut tui);

        let area = tui.content.area;
        assert!(area.width > 0);
        assert_eq!(
            hit_test(&tui, &app, area.x + 7, area.y),
            Some(Hit::Word("beta".to_string()))
        );
        assert_eq!(hit_test(&tui, &app, area.x + 5, area.y), None);
        assert_eq!(hit_test(&tui, &app, 1, 1), Some(Hit::Search(SearchButton::Back)));
    }

    #[test]
    fn test_nothing_clickable_while_skeleton_shows() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let mut tui = TuiState::new();
        draw(&app, &mut tui);
        assert_eq!(tui.content.area, Rect::default());
    }
}
