use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::leaderboard::LeaderboardEntry;
use crate::ui::format::{format_clock, format_date, rank_label};

pub const EMPTY_MESSAGE: &str =
    "Complete a multiplication practice session to appear on the leaderboard.";

/// Ranked table of entries; `highlight` marks the row just added
pub fn render_leaderboard(
    entries: &[LeaderboardEntry],
    highlight: Option<usize>,
    area: Rect,
    buf: &mut Buffer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "🏆 Leaderboard",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    if entries.is_empty() {
        let empty = Paragraph::new(vec![
            ratatui::text::Line::from(Span::styled(
                "No scores yet!",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            ratatui::text::Line::from(Span::styled(
                EMPTY_MESSAGE,
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        empty.render(chunks[1], buf);
        return;
    }

    let header = Row::new(vec!["Rank", "Name", "Score", "Accuracy", "Time", "Date"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let style = if Some(idx) == highlight {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if idx < 3 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(rank_label(idx)),
                Cell::from(entry.player_name.clone()),
                Cell::from(format!("{}/{}", entry.score, entry.total_questions)),
                Cell::from(format!("{}%", entry.accuracy)),
                Cell::from(format_clock(entry.time_completed)),
                Cell::from(format_date(&entry.date)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL));

    Widget::render(table, chunks[1], buf);
}
