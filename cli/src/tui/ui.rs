//! TUI rendering.

use portscope_core::{AppType, Classification, InputMode, ProcessRecord, Session};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::format::{format_bytes, truncate};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const HELP: &str = "[Tab] View  [Space] Select  [k] Kill  [f] Filter Ports  [s] Sort Col  \
                    [o] Sort Order  [/] Search  [r] Refresh  [q] Quit";

pub fn draw(f: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(1), // Status
            Constraint::Length(1), // Prompt / notification
            Constraint::Min(5),    // Table
            Constraint::Length(6), // Details
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    draw_tabs(f, session, chunks[0]);
    draw_status(f, session, chunks[1]);
    draw_prompt(f, session, chunks[2]);
    draw_table(f, session, chunks[3]);
    draw_details(f, session, chunks[4]);
    draw_help(f, session, chunks[5]);
}

fn draw_tabs(f: &mut Frame, session: &Session, area: Rect) {
    let titles = [Classification::OwnedByCurrentUser, Classification::SystemOwned]
        .map(|group| group.display_name());
    let selected = match session.view().active_group {
        Classification::OwnedByCurrentUser => 0,
        Classification::SystemOwned => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" portscope "),
        );

    f.render_widget(tabs, area);
}

fn draw_status(f: &mut Frame, session: &Session, area: Rect) {
    let mut spans = Vec::new();
    if session.is_loading() {
        let frame = SPINNER[session.spinner_frame() % SPINNER.len()];
        spans.push(Span::styled(
            format!("{} Refreshing... ", frame),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        session.status_line(),
        Style::default().fg(Color::Gray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_prompt(f: &mut Frame, session: &Session, area: Rect) {
    let line = match session.mode() {
        InputMode::Searching { buffer } => Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(format!("{}_", buffer)),
        ]),
        InputMode::ConfirmingKill { .. } => Line::from(Span::styled(
            session.confirmation_prompt().unwrap_or_default(),
            Style::default().fg(Color::Red).bold(),
        )),
        InputMode::Normal => match session.notification() {
            Some(text) => Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(Color::Green),
            )),
            None if !session.view().search_text.is_empty() => Line::from(Span::styled(
                format!("Filter: {} (press / to edit)", session.view().search_text),
                Style::default().fg(Color::DarkGray),
            )),
            None => Line::default(),
        },
    };

    f.render_widget(Paragraph::new(line), area);
}

fn draw_table(f: &mut Frame, session: &Session, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} processes ", session.rows().len()));

    if let Some(error) = session.error() {
        let message = Paragraph::new(format!("Error: {}", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(message, area);
        return;
    }

    let header_cells = ["X", "PID", "Name", "Ports", "CPU%", "Mem", "Type"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = session.rows().iter().map(|row| {
        let marker = if row.selected { "[x]" } else { "[ ]" };

        let type_color = match row.app_type {
            AppType::GuiApp => Color::Magenta,
            AppType::DevTool => Color::Green,
            AppType::Binary => Color::Blue,
            AppType::Unknown => Color::DarkGray,
        };

        let cells = vec![
            Cell::from(marker).style(Style::default().fg(Color::Red)),
            Cell::from(row.pid.to_string()),
            Cell::from(truncate(&row.name, 24)),
            Cell::from(row.ports.clone()),
            Cell::from(format!("{:.1}", row.cpu_percent)),
            Cell::from(format_bytes(row.memory_bytes)),
            Cell::from(row.app_type.display_name()).style(Style::default().fg(type_color)),
        ];

        let style = if row.selected {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(8),
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = TableState::default();
    state.select(session.cursor());

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_details(f: &mut Frame, session: &Session, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Details ");

    let lines = match session.cursor_record() {
        Some(record) => detail_lines(record),
        None => vec![Line::from(Span::styled(
            "No process under cursor",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn detail_lines(record: &ProcessRecord) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan);
    let ports = portscope_core::format_ports(record);

    vec![
        Line::from(vec![
            Span::styled("Path: ", label),
            Span::raw(record.working_directory.clone()),
        ]),
        Line::from(vec![
            Span::styled("Command: ", label),
            Span::raw(record.command_line.clone()),
        ]),
        Line::from(vec![
            Span::styled("Full Ports: ", label),
            Span::raw(if ports.is_empty() { "-".to_string() } else { ports }),
        ]),
        Line::from(vec![
            Span::styled("Resources: ", label),
            Span::raw(format!(
                "CPU {:.1}%, Mem {}",
                record.cpu_percent,
                format_bytes(record.memory_bytes)
            )),
        ]),
    ]
}

fn draw_help(f: &mut Frame, session: &Session, area: Rect) {
    let help = match session.mode() {
        InputMode::Normal => HELP,
        InputMode::Searching { .. } => "Type to filter | Enter: done | Esc: done",
        InputMode::ConfirmingKill { .. } => "[y] Kill  [n/Esc] Cancel",
    };

    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}
