//! Rendering of an [`App`] into one frame.
//!
//! Layout: navigation sidebar on the left; on the right an error banner (only
//! while a refresh has failed), the active view and a one-line key hint. An
//! open modal is drawn last, centered over everything else.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use task_core::{TaskStats, TaskStatus};

use crate::app::{App, CreateForm, FormField, Modal, View};

const SIDEBAR_WIDTH: u16 = 18;

pub fn draw<T>(frame: &mut Frame, app: &App<T>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(frame.area());

    draw_sidebar(frame, app, columns[0]);

    let banner_height = if app.error.is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    if let Some(error) = &app.error {
        draw_error_banner(frame, error, rows[0]);
    }
    match app.view {
        View::Dashboard => draw_dashboard(frame, app, rows[1]),
        View::Tasks => draw_tasks(frame, app, rows[1]),
    }
    draw_help(frame, app, rows[2]);

    if let Some(modal) = &app.modal {
        draw_modal(frame, modal);
    }
}

/// Percentage text for the dashboard. Absent or empty stats read `0%`.
pub fn completion_label(stats: Option<&TaskStats>) -> String {
    match stats {
        Some(stats) if stats.total > 0 => format!("{}%", stats.completion_percentage),
        _ => "0%".to_string(),
    }
}

/// Remaining-work sentence, only once there is at least one task.
pub fn summary_line(stats: Option<&TaskStats>) -> Option<String> {
    let stats = stats.filter(|s| s.total > 0)?;
    Some(format!(
        "You have {} tasks remaining out of {} total tasks.",
        stats.remaining(),
        stats.total
    ))
}

fn panel_title(title: &str, loading: bool) -> String {
    if loading {
        format!("{title} (loading...)")
    } else {
        title.to_string()
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Completed => Color::Green,
    }
}

fn draw_sidebar<T>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let items: Vec<ListItem> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let style = if *view == app.view {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!("{} {}", i + 1, view.title()), style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().title("TSA Portal").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn draw_error_banner(frame: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(error.to_string(), Style::default().fg(Color::Red)),
        Span::raw("  [r] Retry"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(banner, area);
}

fn draw_dashboard<T>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let block = Block::default()
        .title(panel_title("Task Statistics", app.loading))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let stats = app.stats.as_ref();
    let counter = |f: fn(&TaskStats) -> u64| stats.map(f).unwrap_or(0);
    let cards = [
        ("Total Tasks", counter(|s| s.total), Color::White),
        ("Pending", counter(|s| s.pending), status_color(TaskStatus::Pending)),
        ("In Progress", counter(|s| s.in_progress), status_color(TaskStatus::InProgress)),
        ("Completed", counter(|s| s.completed), status_color(TaskStatus::Completed)),
    ];
    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    for ((label, value, color), card_area) in cards.into_iter().zip(card_areas.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().title(label).borders(Borders::ALL));
        frame.render_widget(card, *card_area);
    }

    let percentage = stats
        .filter(|s| s.total > 0)
        .map(|s| s.completion_percentage)
        .unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().title("Complete").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((percentage / 100.0).clamp(0.0, 1.0))
        .label(completion_label(stats));
    frame.render_widget(gauge, rows[1]);

    if let Some(summary) = summary_line(stats) {
        frame.render_widget(Paragraph::new(summary), rows[2]);
    }
}

fn draw_tasks<T>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let form_height = if app.form.is_some() { 8 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(form_height),
            Constraint::Min(0),
        ])
        .split(area);

    let filter = Paragraph::new(Line::from(vec![
        Span::raw("Filter by status: "),
        Span::styled(app.filter.label(), Style::default().add_modifier(Modifier::BOLD)),
    ]));
    frame.render_widget(filter, rows[0]);

    if let Some(form) = &app.form {
        draw_form(frame, form, rows[1]);
    }

    let block = Block::default()
        .title(panel_title("Task Management", app.loading))
        .borders(Borders::ALL);
    let tasks = app.filtered_tasks();
    if tasks.is_empty() {
        let empty = Paragraph::new(app.empty_message()).block(block);
        frame.render_widget(empty, rows[2]);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("#{} ", task.id)),
                Span::styled(
                    format!("[{}] ", task.status.label()),
                    Style::default().fg(status_color(task.status)),
                ),
                Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ])];
            if !task.description.is_empty() {
                lines.push(Line::from(format!("    {}", task.description)));
            }
            lines.push(Line::from(Span::styled(
                format!(
                    "    Created: {}  Updated: {}",
                    task.created_at.format("%Y-%m-%d"),
                    task.updated_at.format("%Y-%m-%d")
                ),
                Style::default().fg(Color::DarkGray),
            )));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, rows[2], &mut state);
}

fn draw_form(frame: &mut Frame, form: &CreateForm, area: Rect) {
    let block = Block::default().title("New Task").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(inner);

    let field = |title: &'static str, value: &str, focused: bool| {
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Paragraph::new(value.to_string()).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border),
        )
    };
    frame.render_widget(
        field("Task title", &form.title, form.focus == FormField::Title),
        fields[0],
    );
    frame.render_widget(
        field(
            "Task description (optional)",
            &form.description,
            form.focus == FormField::Description,
        ),
        fields[1],
    );
}

fn draw_help<T>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let text = match (&app.modal, &app.form, app.view) {
        (Some(Modal::Alert(_)), _, _) => "Enter dismiss",
        (Some(Modal::ConfirmDelete { .. }), _, _) => "y delete  n cancel",
        (None, Some(_), View::Tasks) => "Tab next field  Enter create  Esc cancel",
        (None, _, View::Tasks) => {
            "↑/↓ select  a add  f filter  p/i/c set status  d delete  r refresh  Tab view  q quit"
        }
        (None, _, View::Dashboard) => "r refresh  Tab view  q quit",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_modal(frame: &mut Frame, modal: &Modal) {
    let (title, body) = match modal {
        Modal::Alert(message) => ("Error", format!("{message}\n\nPress Enter to dismiss.")),
        Modal::ConfirmDelete { id, title } => (
            "Delete task",
            format!("Are you sure you want to delete this task?\n\n#{id} {title}\n\n[y] yes  [n] no"),
        ),
    };
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
