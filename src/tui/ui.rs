//! Stateless rendering for the terminal UI.

use super::app::App;
use crate::game::{Board, Cell, Mark};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Renders one frame from the latest orchestrator view.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let Some(view) = app.view() else {
        let waiting = Paragraph::new("Contacting opponent service...")
            .alignment(Alignment::Center)
            .block(Block::default().title(" Tic-my-Toe ").borders(Borders::ALL));
        frame.render_widget(waiting, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(1), // Headline
            Constraint::Length(1), // Opponent knowledge
            Constraint::Length(1), // Notices
            Constraint::Min(12),   // Board(s)
            Constraint::Length(1), // Score
            Constraint::Length(3), // Key help
        ])
        .split(area);

    let title = Paragraph::new("Tic-my-Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let headline_style = if view.error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let headline = Paragraph::new(view.headline.as_str())
        .style(headline_style)
        .alignment(Alignment::Center);
    frame.render_widget(headline, chunks[1]);

    let knowledge = Paragraph::new(view.knowledge.as_str())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(knowledge, chunks[2]);

    if let Some(notice) = &view.notice {
        let notice = Paragraph::new(notice.as_str())
            .style(Style::default().fg(Color::Magenta))
            .alignment(Alignment::Center);
        frame.render_widget(notice, chunks[3]);
    }

    let cursor = view.accepts_input.then_some(app.cursor());
    match view.exhibition {
        Some(exhibition) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[4]);
            draw_panel(frame, halves[0], "Your game", &view.board, cursor);
            let label = if view.training {
                "Training exhibition"
            } else {
                "Exhibition"
            };
            draw_panel(frame, halves[1], label, &exhibition, None);
        }
        None => draw_board(frame, chunks[4], &view.board, cursor),
    }

    let score = Paragraph::new(view.score.as_str()).alignment(Alignment::Center);
    frame.render_widget(score, chunks[5]);

    let help = Paragraph::new(
        "1-9 or arrows+Enter: move | n: new game | c: clear error | t: train | k: reset AI | s: status | q: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[6]);
}

/// A labelled board, used when the exhibition shares the screen.
fn draw_panel(frame: &mut Frame, area: Rect, label: &str, board: &Board, cursor: Option<usize>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(11)])
        .split(area);
    let label = Paragraph::new(label)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(label, rows[0]);
    draw_board(frame, rows[1], board, cursor);
}

fn draw_board(frame: &mut Frame, area: Rect, board: &Board, cursor: Option<usize>) {
    let board_area = center_rect(area, 40, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    draw_row(frame, rows[0], board, cursor, 0);
    draw_separator(frame, rows[1]);
    draw_row(frame, rows[2], board, cursor, 3);
    draw_separator(frame, rows[3]);
    draw_row(frame, rows[4], board, cursor, 6);
}

fn draw_row(frame: &mut Frame, area: Rect, board: &Board, cursor: Option<usize>, start: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
        ])
        .split(area);

    draw_cell(frame, cols[0], board, cursor, start);
    draw_separator_vertical(frame, cols[1]);
    draw_cell(frame, cols[2], board, cursor, start + 1);
    draw_separator_vertical(frame, cols[3]);
    draw_cell(frame, cols[4], board, cursor, start + 2);
}

fn draw_cell(frame: &mut Frame, area: Rect, board: &Board, cursor: Option<usize>, index: usize) {
    let (symbol, base_style) = match board.cell(index) {
        Some(Cell::Occupied(Mark::X)) => (
            " X ".to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Some(Cell::Occupied(Mark::O)) => (
            " O ".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        _ => (
            format!(" {} ", index + 1),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let style = if cursor == Some(index) {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let paragraph = Paragraph::new(symbol)
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn draw_separator(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("─".repeat(area.width as usize))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn draw_separator_vertical(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("│")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(sep, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(area.height.saturating_sub(height) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Length(area.width.saturating_sub(width) / 2),
        ])
        .split(vert[1])[1]
}
