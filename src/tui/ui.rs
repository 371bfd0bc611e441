use std::time::Instant;

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, EditField, Mode};
use crate::dashboard::{available_actions, EmptyState, ListBody, MutationKind};
use crate::models::{platform_label, ConnectionHealth, DraftStatus, DraftSummary};

const COLUMN_WIDTHS: [Constraint; 8] = [
    Constraint::Percentage(24), // Meeting
    Constraint::Length(10),     // Platform
    Constraint::Percentage(30), // Subject
    Constraint::Length(11),     // Status
    Constraint::Length(9),      // Cost
    Constraint::Length(7),      // Tokens
    Constraint::Length(8),      // Latency
    Constraint::Length(13),     // Date
];

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + stats
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Drafts table
            Constraint::Length(1), // Banner
            Constraint::Length(1), // Pagination + keys
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_filters(frame, app, chunks[1]);
    render_drafts(frame, app, chunks[2]);
    render_banner(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);

    match &app.mode {
        Mode::ViewDraft => render_draft_detail(frame, app),
        Mode::Edit(_) => render_edit_form(frame, app),
        Mode::Send(_) => render_send_form(frame, app),
        Mode::ConfirmDelete(id) => render_confirm_delete(frame, app, id),
        Mode::Integrations => render_integrations(frame, app),
        Mode::Help => render_help(frame),
        Mode::Normal | Mode::Search => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.dashboard.stats();

    let block = Block::default()
        .title(" Follow-up Drafts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(format!(" {} total", stats.total), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(format!("{} generated", stats.generated), Style::default().fg(Color::Green)),
        Span::raw("  |  "),
        Span::styled(format!("{} sent", stats.sent), Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(format!("{} failed", stats.failed), Style::default().fg(Color::Red)),
        Span::raw("  |  "),
        Span::styled(
            format!("avg {} / {}", format_cost(stats.avg_cost), format_latency(stats.avg_latency)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.dashboard.query();
    let searching = matches!(app.mode, Mode::Search);

    let search_text = if searching {
        format!("{}_", app.search_input)
    } else if query.search.is_empty() {
        "(press /)".to_string()
    } else {
        query.search.clone()
    };

    let active = Style::default().fg(Color::Yellow);
    let idle = Style::default().fg(Color::White);

    let mut spans = vec![
        Span::raw(" Status: "),
        Span::styled(query.status.label(), active),
        Span::raw("   Range: "),
        Span::styled(query.date_range.label(), active),
        Span::raw("   Search: "),
        Span::styled(search_text, if searching { active } else { idle }),
    ];
    if app.dashboard.search_pending() {
        spans.push(Span::styled("  …", Style::default().fg(Color::DarkGray)));
    }
    if query.has_active_filters() {
        spans.push(Span::styled("   c:clear", Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching { Color::Yellow } else { Color::Blue }));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_drafts(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.dashboard.view(Instant::now());
    let block = Block::default().borders(Borders::ALL);

    match view.body {
        ListBody::Skeleton { rows } => {
            let placeholder = Style::default().fg(Color::DarkGray);
            let rows: Vec<Row> = (0..rows)
                .map(|_| Row::new(COLUMN_WIDTHS.iter().map(|_| Cell::from("░░░░░░"))).style(placeholder))
                .collect();
            let table = Table::new(rows, COLUMN_WIDTHS)
                .header(table_header())
                .block(block);
            frame.render_widget(table, area);
        }

        ListBody::Empty(empty) => render_empty(frame, empty, block, area),

        ListBody::Rows { visible } => {
            let rows: Vec<Row> = app
                .dashboard
                .items()
                .iter()
                .enumerate()
                .map(|(i, draft)| {
                    if i < visible {
                        draft_row(draft)
                    } else {
                        Row::new(COLUMN_WIDTHS.iter().map(|_| Cell::from("")))
                    }
                })
                .collect();

            let table = Table::new(rows, COLUMN_WIDTHS)
                .header(table_header())
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            let mut state = TableState::default();
            state.select(Some(app.selected_index));
            frame.render_stateful_widget(table, area, &mut state);
        }
    }
}

fn table_header() -> Row<'static> {
    Row::new(["Meeting", "Platform", "Subject", "Status", "Cost", "Tokens", "Latency", "Date"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

fn draft_row(draft: &DraftSummary) -> Row<'_> {
    let date = draft.sent_at.or_else(|| draft.start_time());

    Row::new(vec![
        Cell::from(draft.topic()),
        Cell::from(draft.platform()),
        Cell::from(draft.subject.as_deref().unwrap_or("—")),
        Cell::from(Span::styled(draft.status.label(), status_style(draft.status))),
        Cell::from(draft.cost.map(format_cost).unwrap_or_default()),
        Cell::from(draft.total_tokens().map(|t| t.to_string()).unwrap_or_default()),
        Cell::from(
            draft
                .latency_ms
                .map(|ms| format_latency(ms as f64))
                .unwrap_or_default(),
        ),
        Cell::from(date.map(format_date).unwrap_or_default()),
    ])
}

fn render_empty(frame: &mut Frame, empty: EmptyState, block: Block, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            empty.title(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(empty.hint(), Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.dashboard.view(Instant::now());

    let (text, color) = if let Some(banner) = view.banner {
        (banner, Color::Red)
    } else if let Some((id, kind)) = app.dashboard.mutation_pending() {
        (format!("Working: {} draft {}…", kind.label(), id), Color::Yellow)
    } else if let Some(flash) = &app.flash {
        (flash.clone(), Color::Green)
    } else {
        (String::new(), Color::White)
    };

    frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.dashboard.query();
    let pages = app.dashboard.total_pages().max(1);

    let loading = if app.dashboard.loading() { "Loading… " } else { "" };
    let row_keys = app
        .selected_draft()
        .map(|d| {
            available_actions(d.status)
                .iter()
                .map(|a| a.key_hint())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let status = format!(
        "{loading}Page {} of {} · {} drafts   {}  f:status t:range /:search [/]:page ?:help q:quit",
        query.page,
        pages,
        app.dashboard.total(),
        row_keys
    );

    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_draft_detail(frame: &mut Frame, app: &App) {
    let Some(draft) = app.selected_draft() else {
        return;
    };
    let area = centered_rect(70, 70, frame.area());

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Meeting:  ", label),
            Span::raw(draft.topic()),
            Span::styled(format!("  ({})", draft.platform()), label),
        ]),
        Line::from(vec![
            Span::styled("Host:     ", label),
            Span::raw(draft.host_email().unwrap_or("—")),
        ]),
        Line::from(vec![
            Span::styled("Status:   ", label),
            Span::styled(draft.status.label(), status_style(draft.status)),
        ]),
        Line::from(vec![
            Span::styled("Usage:    ", label),
            Span::raw(format!(
                "{} in / {} out tokens, {}, {}",
                draft.input_tokens.unwrap_or(0),
                draft.output_tokens.unwrap_or(0),
                draft.cost.map(format_cost).unwrap_or_else(|| "—".to_string()),
                draft
                    .latency_ms
                    .map(|ms| format_latency(ms as f64))
                    .unwrap_or_else(|| "—".to_string()),
            )),
        ]),
    ];

    if let Some(sent_to) = &draft.sent_to {
        lines.push(Line::from(vec![
            Span::styled("Sent to:  ", label),
            Span::raw(format!(
                "{} {}",
                sent_to,
                draft.sent_at.map(format_date).unwrap_or_default()
            )),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        draft.subject.as_deref().unwrap_or("(no subject)"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    for body_line in draft.body.as_deref().unwrap_or("(no content yet)").lines() {
        lines.push(Line::from(body_line));
    }

    let block = Block::default()
        .title(" Draft  (e:edit s:send o:open Esc:close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_edit_form(frame: &mut Frame, app: &App) {
    let Mode::Edit(form) = &app.mode else {
        return;
    };
    let area = centered_rect(70, 60, frame.area());

    let focused = Style::default().fg(Color::Yellow);
    let unfocused = Style::default().fg(Color::DarkGray);
    let (subject_style, body_style, subject_cursor, body_cursor) = match form.field {
        EditField::Subject => (focused, unfocused, "_", ""),
        EditField::Body => (unfocused, focused, "", "_"),
    };

    let mut lines = vec![
        Line::from(Span::styled("Subject", subject_style)),
        Line::from(format!("> {}{}", form.subject, subject_cursor)),
        Line::from(""),
        Line::from(Span::styled("Body", body_style)),
    ];
    lines.extend(body_lines(&form.body, body_cursor));
    lines.push(Line::from(""));
    lines.extend(mutation_status_lines(app, &form.draft_id, MutationKind::Update));

    let block = Block::default()
        .title(" Edit draft  (Tab:field Alt+Enter:newline Enter:save Esc:cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Body text as one `Line` per line, prefixed like an input, cursor on the last line.
fn body_lines(body: &str, cursor: &str) -> Vec<Line<'static>> {
    // A trailing newline yields an empty last line for the cursor
    let parts: Vec<&str> = body.split('\n').collect();
    let last = parts.len() - 1;
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            let prefix = if i == 0 { "> " } else { "  " };
            let cursor = if i == last { cursor } else { "" };
            Line::from(format!("{}{}{}", prefix, part.trim_end_matches('\r'), cursor))
        })
        .collect()
}

fn render_send_form(frame: &mut Frame, app: &App) {
    let Mode::Send(form) = &app.mode else {
        return;
    };
    let area = centered_rect(60, 25, frame.area());

    let mut lines = vec![
        Line::from("Recipient email"),
        Line::from(format!("> {}_", form.recipient)),
        Line::from(""),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }
    lines.extend(mutation_status_lines(app, &form.draft_id, MutationKind::Send));

    let block = Block::default()
        .title(" Send draft  (Enter:send Esc:cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_delete(frame: &mut Frame, app: &App, draft_id: &str) {
    let area = centered_rect(50, 20, frame.area());

    let mut lines = vec![
        Line::from(format!("Delete draft {}? This cannot be undone.", draft_id)),
        Line::from(""),
        Line::from(Span::styled("y:delete  n:cancel", Style::default().fg(Color::DarkGray))),
    ];
    lines.extend(mutation_status_lines(app, draft_id, MutationKind::Delete));

    let block = Block::default()
        .title(" Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Pending/failed state of a mutation, scoped to the popup that started it.
fn mutation_status_lines(app: &App, draft_id: &str, kind: MutationKind) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some((pending_id, pending_kind)) = app.dashboard.mutation_pending() {
        if pending_id == draft_id && *pending_kind == kind {
            lines.push(Line::from(Span::styled(
                "Working…",
                Style::default().fg(Color::Yellow),
            )));
        }
    }

    if let Some(error) = &app.dashboard.mutation_error {
        if error.draft_id == draft_id && error.kind == kind {
            lines.push(Line::from(Span::styled(
                format!("Couldn't {}: {}", kind.label(), error.message),
                Style::default().fg(Color::Red),
            )));
        }
    }

    lines
}

fn render_integrations(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, frame.area());

    let block = Block::default()
        .title(" Integrations  (x:disconnect r:reload Esc:close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = app
        .integrations
        .iter()
        .flat_map(|status| status.iter())
        .map(|(id, conn)| {
            let health = conn.health();
            let color = match health {
                ConnectionHealth::Connected => Color::Green,
                ConnectionHealth::ExpiringSoon => Color::Yellow,
                ConnectionHealth::NeedsReconnect => Color::Red,
                ConnectionHealth::NotConnected => Color::DarkGray,
            };
            let mut spans = vec![
                Span::styled(format!("{:<16}", platform_label(id)), Style::default().fg(Color::White)),
                Span::styled(format!("{:<20}", health.label()), Style::default().fg(color)),
            ];
            if let Some(email) = &conn.email {
                spans.push(Span::raw(email.clone()));
            }
            if let Some(synced) = conn.last_sync_at {
                spans.push(Span::styled(
                    format!("  synced {}", format_date(synced)),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(app.integrations.as_ref().map(|_| app.integration_index));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let (status, color) = if app.integrations_loading {
        ("Loading…".to_string(), Color::Yellow)
    } else if let Some(error) = &app.integrations_error {
        (error.clone(), Color::Red)
    } else {
        (String::new(), Color::White)
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(color)),
        chunks[1],
    );
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   ] / →    Next page",
        "   [ / ←    Previous page",
        "",
        " Filters:",
        "   f        Cycle status",
        "   t        Cycle date range",
        "   /        Search",
        "   c        Clear filters",
        "   r        Reload",
        "",
        " Draft actions:",
        "   Enter    View draft",
        "   e        Edit subject/body",
        "   s        Send",
        "   d        Delete",
        "   o        Open in browser",
        "",
        " General:",
        "   i        Integrations",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn status_style(status: DraftStatus) -> Style {
    let color = match status {
        DraftStatus::Pending => Color::Yellow,
        DraftStatus::Generating => Color::Blue,
        DraftStatus::Generated => Color::Green,
        DraftStatus::Sent => Color::Cyan,
        DraftStatus::Failed => Color::Red,
    };
    Style::default().fg(color)
}

fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}

fn format_latency(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.1}s", ms / 1000.0)
    } else {
        format!("{:.0}ms", ms)
    }
}

fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%b %d %H:%M").to_string()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_body_lines_split_on_newlines() {
        let lines = body_lines("Hi Sam,\r\nThanks for today.\n", "_");
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["> Hi Sam,", "  Thanks for today.", "  _"]);

        let single: Vec<String> = body_lines("", "").iter().map(|l| l.to_string()).collect();
        assert_eq!(single, vec!["> "]);
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(850.0), "850ms");
        assert_eq!(format_latency(2600.0), "2.6s");
    }

    #[test]
    fn test_format_cost_and_date() {
        assert_eq!(format_cost(0.01234), "$0.0123");
        let dt = Utc.with_ymd_and_hms(2026, 10, 3, 14, 5, 0).unwrap();
        assert_eq!(format_date(dt), "Oct 03 14:05");
    }

    #[test]
    fn test_centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, parent);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 25);
        assert_eq!(popup.y, 10);
    }
}
