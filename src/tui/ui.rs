//! Stateless UI rendering for the terminal client.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::app::App;
use connect_four::Verdict;
use connect_four_engine::{COLS, Cell, Marker, ROWS};

/// Renders the title, board and status line.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Title
            Constraint::Min(ROWS as u16 + 4),     // Board
            Constraint::Length(3),                // Status
            Constraint::Length(1),                // Help
        ])
        .split(area);

    let title = match app.role() {
        Some(role) => format!("Connect Four - {} ({})", role, role.marker()),
        None => "Connect Four".to_string(),
    };
    let title = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_board(frame, chunks[1], app);

    let status_style = match app.verdict() {
        Some(Verdict::Won) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Some(Verdict::Lost) | Some(Verdict::Aborted) => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
        Some(Verdict::Draw) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        None if app.failed() => Style::default().fg(Color::Red),
        None if app.my_turn() => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(app.status_message())
        .style(status_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    let help = Paragraph::new("←/→ or 1-7 choose a column, Enter drops, q quits")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let width = (COLS * 4 + 1) as u16 + 2;
    let height = ROWS as u16 + 4;
    let board_area = center_rect(area, width, height);

    let mut lines = Vec::with_capacity(ROWS + 2);

    let marker_row: Vec<Span> = (0..COLS)
        .map(|col| {
            if col == app.cursor() {
                Span::styled("  ▼ ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else {
                Span::raw("    ")
            }
        })
        .collect();
    lines.push(Line::from(marker_row));

    let board = app.board();
    for row in 0..ROWS {
        let mut spans = Vec::with_capacity(COLS * 2 + 1);
        for col in 0..COLS {
            spans.push(Span::styled("│", Style::default().fg(Color::Blue)));
            spans.push(cell_span(board.cell(row, col), col == app.cursor()));
        }
        spans.push(Span::styled("│", Style::default().fg(Color::Blue)));
        lines.push(Line::from(spans));
    }

    let ruler: String = (1..=COLS).map(|label| format!("  {} ", label)).collect();
    lines.push(Line::from(Span::styled(ruler, Style::default().fg(Color::DarkGray))));

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, board_area);
}

fn cell_span(cell: Cell, highlighted: bool) -> Span<'static> {
    let (symbol, style) = match cell {
        Cell::Empty => ("   ", Style::default().fg(Color::DarkGray)),
        Cell::Occupied(Marker::X) => (" X ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Cell::Occupied(Marker::O) => (" O ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    };
    let style = if highlighted { style.bg(Color::Black) } else { style };
    Span::styled(symbol, style)
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
