use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, Wrap};

use super::super::display::{format_date, truncate};
use super::super::view::ViewRow;
use super::{Dialog, EDIT_FIELD_LABELS, EditForm, TuiState};

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);

pub(super) fn draw_tui(frame: &mut Frame, state: &mut TuiState) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let unwatched = state
        .rows
        .iter()
        .filter(|row| matches!(row, ViewRow::Episode(ep) if !ep.watched && ep.available <= state.today))
        .count();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "AIRLOG",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} shows", state.library.len()),
            Style::default().fg(MUTED),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{unwatched} out and unwatched"),
            Style::default().fg(MUTED),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(state.mode.label(), Style::default().fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Dashboard"));
    frame.render_widget(header, chunks[0]);

    let rows: Vec<Row> = state
        .rows
        .iter()
        .map(|row| match row {
            ViewRow::Today(date) => Row::new(vec![
                Cell::from(""),
                Cell::from(format!("── today {} ──", format_date(*date))),
                Cell::from(""),
                Cell::from(""),
            ])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ViewRow::Episode(episode) => {
                let (name, number) = state
                    .library
                    .get(&episode.show_key)
                    .map(|show| (show.name.clone(), show.episode_number(episode.index)))
                    .unwrap_or_else(|| ("?".to_string(), i64::from(episode.index)));
                let style = if episode.available > state.today {
                    Style::default().fg(MUTED)
                } else {
                    Style::default().fg(Color::Rgb(230, 230, 230))
                };
                Row::new(vec![
                    Cell::from(if episode.watched { "[x]" } else { "[ ]" }),
                    Cell::from(name),
                    Cell::from(format!("#{number}")),
                    Cell::from(format_date(episode.available)),
                ])
                .style(style)
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(60),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Seen", "Title", "Ep", "Available"])
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    )
    .block(panel_block("Episodes"))
    .row_highlight_style(
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    let controls = Paragraph::new(Line::from(Span::styled(
        "↑/↓ move  Space toggle watched  a add  e edit  d delete  v all/unwatched  q quit",
        Style::default().fg(MUTED),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[2]);

    let status_widget = Paragraph::new(state.status.clone())
        .style(status_style(&state.status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    match &state.dialog {
        Some(Dialog::ConfirmDelete { name, .. }) => {
            let popup_text = format!(
                "Delete show and its watch history?\n\n{}\n\nThis cannot be undone.\n\n[y / Enter] Delete   [n / Esc] Cancel",
                truncate(name, 56)
            );
            let popup_area = popup_rect_for_text(frame.area(), &popup_text);
            frame.render_widget(Clear, popup_area);
            let popup = Paragraph::new(popup_text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(modal_block("Confirm Delete"));
            frame.render_widget(popup, popup_area);
        }
        Some(Dialog::Edit(form)) => {
            let lines = edit_form_lines(form);
            let popup_area = centered_fixed_rect(60, lines.len() as u16 + 4, frame.area());
            frame.render_widget(Clear, popup_area);
            let popup = Paragraph::new(lines).block(modal_block("Edit Show"));
            frame.render_widget(popup, popup_area);
        }
        None => {}
    }
}

fn edit_form_lines(form: &EditForm) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, label) in EDIT_FIELD_LABELS.iter().enumerate() {
        let focused = idx == form.focus;
        let label_style = if focused {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        let cursor = if focused { "▏" } else { "" };
        lines.push(Line::from(Span::styled(label.to_string(), label_style)));
        lines.push(Line::from(format!("  {}{cursor}", form.fields[idx])));
    }
    lines
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(205, 165, 255))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let width = max_line_width
        .saturating_add(8)
        .clamp(40.min(available_width), 72.min(available_width));

    let available_height = area.height.saturating_sub(2).max(1);
    let height = line_count
        .saturating_add(4)
        .clamp(8.min(available_height), 16.min(available_height));

    centered_fixed_rect(width, height, area)
}
