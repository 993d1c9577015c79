pub mod format;
pub mod leaderboard;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::{App, Feedback, Screen};
use crate::game::SessionResult;
use crate::runtime::Ticker;
use crate::store::KvStore;
use crate::ui::format::format_clock;
use crate::ui::leaderboard::render_leaderboard;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl<S: KvStore, T: Ticker> Widget for &App<S, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Home => render_home(area, buf),
            Screen::Playing => render_game(self, area, buf),
            Screen::NamePrompt => {
                if let Some(result) = &self.pending_result {
                    render_name_prompt(self, result, area, buf);
                }
            }
            Screen::Leaderboard => render_board(self, area, buf),
            Screen::ConfirmClear => {
                render_board(self, area, buf);
                render_confirm_clear(area, buf);
            }
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

fn feedback_line(feedback: Option<&Feedback>) -> Line<'static> {
    match feedback {
        Some(Feedback::Correct) => Line::from(Span::styled(
            "✓ Correct!",
            bold().fg(Color::Green),
        )),
        Some(Feedback::Incorrect { expected }) => Line::from(Span::styled(
            format!("✗ Not quite, the answer was {}", expected),
            bold().fg(Color::Red),
        )),
        Some(Feedback::Error(msg)) => Line::from(Span::styled(
            msg.clone(),
            bold().fg(Color::Yellow),
        )),
        None => Line::default(),
    }
}

/// Rectangle of the given size centered in `area`, clamped to it
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_home(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // subtitle
            Constraint::Min(0),    // how to play
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Multiplication Practice",
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(
        "Practice your multiplication tables from 1 to 15. See how many you can get right!",
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    let how_to = vec![
        Line::from(Span::styled("How to play", bold())),
        Line::from("• Type the product and press enter"),
        Line::from("• The timer runs until you stop the game"),
        Line::from("• Stop with esc and save your score to the top 10"),
    ];
    Paragraph::new(how_to)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    legend("(s)tart / (l)eaderboard / (q)uit")
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_game<S: KvStore, T: Ticker>(app: &App<S, T>, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // stats
            Constraint::Min(0),    // padding
            Constraint::Length(3), // problem
            Constraint::Length(3), // answer
            Constraint::Length(1), // feedback
            Constraint::Min(0),    // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let stats = format!(
        "Time {}   Correct {}   Total {}   Accuracy {}%",
        format_clock(app.timer.elapsed_seconds()),
        game.correct_count(),
        game.total_count(),
        game.accuracy()
    );
    Paragraph::new(Span::styled(stats, bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let problem = game.current_problem();
    Paragraph::new(Span::styled(problem.to_string(), bold().fg(Color::Magenta)))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(centered_rect(30, 3, chunks[2]), buf);

    let answer = if app.answer_input.is_empty() {
        Span::styled(
            "Enter your answer",
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        Span::styled(app.answer_input.clone(), bold())
    };
    Paragraph::new(answer)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(centered_rect(30, 3, chunks[3]), buf);

    Paragraph::new(feedback_line(app.feedback.as_ref()))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    legend("(enter) submit / (esc) stop game")
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn render_name_prompt<S: KvStore, T: Ticker>(
    app: &App<S, T>,
    result: &SessionResult,
    area: Rect,
    buf: &mut Buffer,
) {
    let popup = centered_rect(50, 14, area);
    Clear.render(popup, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 🎉 Great Job! ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(popup);
    block.render(popup, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(4), // stats
            Constraint::Length(1), // label
            Constraint::Length(3), // input
            Constraint::Length(1), // feedback
            Constraint::Length(1), // legend
        ])
        .split(inner);

    let stats = vec![
        Line::from(format!(
            "Score: {} / {}",
            result.score, result.total_questions
        )),
        Line::from(format!("Accuracy: {}%", result.accuracy)),
        Line::from(format!("Time: {}", format_clock(result.elapsed_seconds))),
    ];
    Paragraph::new(stats)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new("Enter your name for the leaderboard:")
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let name = if app.name_input.is_empty() {
        Span::styled("Your name", Style::default().add_modifier(Modifier::DIM))
    } else {
        Span::styled(app.name_input.clone(), bold())
    };
    Paragraph::new(name)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[2], buf);

    Paragraph::new(feedback_line(app.feedback.as_ref()))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    legend("(enter) submit / (esc) skip")
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_board<S: KvStore, T: Ticker>(app: &App<S, T>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_leaderboard(app.leaderboard.entries(), app.last_rank, chunks[0], buf);

    let keys = if app.leaderboard.is_empty() {
        "(s)tart / (b)ack"
    } else {
        "(s)tart / (c)lear / (b)ack"
    };
    legend(keys)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

fn render_confirm_clear(area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(54, 6, area);
    Clear.render(popup, buf);

    Paragraph::new(vec![
        Line::from("Are you sure you want to clear all leaderboard entries?"),
        Line::from("This cannot be undone."),
        Line::default(),
        Line::from(Span::styled("(y)es / (n)o", bold())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Clear Leaderboard ")
            .border_style(Style::default().fg(Color::Red)),
    )
    .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::leaderboard::Leaderboard;
    use crate::problem::ProblemGenerator;
    use crate::runtime::FixedTicker;
    use crate::store::MemoryKvStore;
    use crate::timer::SessionTimer;
    use std::time::Duration;

    fn create_test_app() -> App<MemoryKvStore> {
        App::new(
            Game::with_generator(ProblemGenerator::seeded(11)),
            SessionTimer::with_ticker(FixedTicker::new(Duration::from_secs(3600))),
            Leaderboard::open(MemoryKvStore::new()),
        )
    }

    fn render_to_string(app: &App<MemoryKvStore>, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_home_screen() {
        let app = create_test_app();
        let rendered = render_to_string(&app, Rect::new(0, 0, 100, 24));
        assert!(rendered.contains("Multiplication Practice"));
        assert!(rendered.contains("(s)tart"));
    }

    #[test]
    fn test_game_screen_shows_problem_and_stats() {
        let mut app = create_test_app();
        app.start_session();
        for _ in 0..65 {
            app.timer.tick();
        }
        let p = app.game.current_problem();
        let rendered = render_to_string(&app, Rect::new(0, 0, 100, 24));

        assert!(rendered.contains(&p.to_string()));
        assert!(rendered.contains(&format!("{} × {} = ?", p.operand1, p.operand2)));
        assert!(rendered.contains("Time 1:05"));
        assert!(rendered.contains("Accuracy 0%"));
        assert!(rendered.contains("Enter your answer"));
    }

    #[test]
    fn test_game_screen_shows_feedback() {
        let mut app = create_test_app();
        app.start_session();
        app.answer_input = "x".into();
        app.submit_answer();
        let rendered = render_to_string(&app, Rect::new(0, 0, 100, 24));
        assert!(rendered.contains("Please enter a valid number"));
    }

    #[test]
    fn test_name_prompt_summary() {
        let mut app = create_test_app();
        app.start_session();
        let p = app.game.current_problem();
        app.answer_input = p.answer.to_string();
        app.submit_answer();
        for _ in 0..7 {
            app.timer.tick();
        }
        app.stop_session();

        let rendered = render_to_string(&app, Rect::new(0, 0, 100, 24));
        assert!(rendered.contains("Score: 1 / 1"));
        assert!(rendered.contains("Accuracy: 100%"));
        assert!(rendered.contains("Time: 0:07"));
    }

    #[test]
    fn test_confirm_clear_overlay() {
        let mut app = create_test_app();
        app.screen = Screen::ConfirmClear;
        let rendered = render_to_string(&app, Rect::new(0, 0, 100, 24));
        assert!(rendered.contains("This cannot be undone."));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let mut app = create_test_app();
        for screen in [
            Screen::Home,
            Screen::Playing,
            Screen::Leaderboard,
            Screen::ConfirmClear,
        ] {
            app.screen = screen;
            let area = Rect::new(0, 0, 10, 4);
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert_eq!(*buffer.area(), area);
        }
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 5);
        let r = centered_rect(50, 10, area);
        assert_eq!(r, area);
        let r = centered_rect(10, 3, area);
        assert_eq!(r, Rect::new(5, 1, 10, 3));
    }
}
