use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, InputMode, StatusLevel};
use crate::domain::{format_target, Metric, MAX_METRICS};
use crate::editor::{PendingPolicy, DELETE_CONFIRM_LABEL, DELETE_TITLE};
use crate::modules::{AddMenu, FormField, MetricForm};
use layout::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_metric_list(f, areas.list, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if let Some(menu) = app.add_menu.as_ref() {
        draw_add_menu(f, areas.size, menu);
    }
    if app.is_confirming() {
        draw_delete_popup(f, areas.size, app);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Metrics",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Playbook", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.playbook_title)),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let policy = match app.editor.policy() {
        PendingPolicy::Replace => "replace",
        PendingPolicy::Reject => "reject",
    };
    let mut right_spans = vec![
        Span::styled("Rows ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}/{}  ", app.editor.len(), MAX_METRICS)),
        Span::styled("Queue ", Style::default().fg(Color::DarkGray)),
        Span::raw(policy),
    ];
    if app.ctx.changes_made {
        right_spans.push(Span::styled(
            "  [+]",
            Style::default().fg(Color::LightYellow),
        ));
    }
    let right = Paragraph::new(Line::from(right_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_metric_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.editor.is_empty() {
        vec![ListItem::new(Text::from(empty_lines()))]
    } else {
        app.editor
            .metrics()
            .iter()
            .enumerate()
            .map(|(index, metric)| {
                let lines = match app.form.as_ref().filter(|form| form.index() == index) {
                    Some(form) => form_lines(form),
                    None => metric_lines(metric),
                };
                ListItem::new(Text::from(lines))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Metrics")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !app.editor.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn empty_lines() -> Vec<Line<'static>> {
    vec![
        Line::from("No metrics yet."),
        Line::from(Span::styled(
            "Press a to add one.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Target line text for a saved metric
pub fn target_summary(metric: &Metric) -> String {
    if metric.target == 0 {
        "Target: No target set.".to_string()
    } else {
        format!(
            "Target: {} per run",
            format_target(metric.target, metric.metric_type)
        )
    }
}

pub fn description_summary(metric: &Metric) -> String {
    if metric.description.trim().is_empty() {
        "Description: No description.".to_string()
    } else {
        format!("Description: {}", metric.description)
    }
}

/// Read-only card for a metric row
pub fn metric_lines(metric: &Metric) -> Vec<Line<'static>> {
    let title = if metric.title.is_empty() {
        "(untitled)".to_string()
    } else {
        metric.title.clone()
    };
    vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", metric.metric_type.icon()),
                Style::default().fg(Color::LightCyan),
            ),
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(format!("   {}", target_summary(metric))),
        Line::from(Span::styled(
            format!("   {}", description_summary(metric)),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ]
}

fn form_lines(form: &MetricForm) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{} ", form.metric_type().icon()),
            Style::default().fg(Color::LightCyan),
        ),
        Span::styled(
            format!("Editing {} metric", form.metric_type().as_str()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    for field in FormField::ALL {
        let focused = form.focus() == field;
        let marker = if focused { "> " } else { "  " };
        let mut spans = vec![
            Span::raw(format!("  {marker}")),
            Span::styled(
                format!("{}: ", field.label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                form.value(field).to_string(),
                if focused {
                    Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
        ];
        if field == FormField::Target {
            spans.push(Span::styled(
                format!("  ({})", form.target_hint()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
    }

    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            format!("    {error}"),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(Span::styled(
        "    Enter=save  Esc=cancel  Tab=next field",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    lines
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let editing = app
        .ctx
        .editing
        .map(|index| format!("row {}", index + 1))
        .unwrap_or_else(|| "--".to_string());
    let mut spans = vec![
        Span::styled("Editing ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{editing}  ")),
    ];
    if let Some(task) = app.editor.pending_task() {
        spans.push(Span::styled("Queued ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!("{}  ", task.describe())));
    }
    if let Some(index) = app.editor.pending_deletion() {
        spans.push(Span::styled(
            "Confirm ",
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(format!("delete row {}", index + 1)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("add", "add <duration|currency|integer>"),
        ("edit", "edit <row>"),
        ("delete", "delete <row>"),
        ("save", "Write the playbook"),
        ("export", "export <csv|json>"),
        ("reload", "Reload config"),
        ("help", "Show keys"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn action_hints(app: &App) -> Line<'static> {
    let hints = if app.is_confirming() {
        "y=delete  n=cancel"
    } else if app.is_editing() {
        "Enter=save  Esc=cancel  ^a=add  ^e/^d=edit/delete selected  ^n/^p=move  ^w=write"
    } else {
        "a=add  e=edit  d=delete  w=write  :=command  ?=help  q=quit"
    };
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("add | edit | delete | save | export | quit");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_add_menu(f: &mut Frame, area: Rect, menu: &AddMenu) {
    let popup_area = centered_rect(60, 50, area);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = menu
        .options()
        .iter()
        .enumerate()
        .map(|(i, metric_type)| {
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::raw(format!("{} {} ", i + 1, metric_type.icon())),
                    Span::styled(
                        metric_type.title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("    {}", metric_type.example()),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title("Add metric")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    state.select(Some(menu.selected()));
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn draw_delete_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(60, 40, area);
    f.render_widget(Clear, popup_area);

    let message = app
        .editor
        .pending_warning()
        .map(|warning| warning.message())
        .unwrap_or_default();
    let lines = vec![
        Line::from(message),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(Color::LightRed)),
            Span::raw(DELETE_CONFIRM_LABEL),
            Span::raw("   "),
            Span::styled("[n] ", Style::default().fg(Color::DarkGray)),
            Span::raw("Cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(DELETE_TITLE)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(72, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("List"),
        Line::from("  j / k      Move selection"),
        Line::from("  a          Add metric"),
        Line::from("  e / Enter  Edit selected metric"),
        Line::from("  d          Delete selected metric"),
        Line::from("  w          Write playbook"),
        Line::from("  :          Command line (Up recalls the last one)"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Editing"),
        Line::from("  Tab        Next field"),
        Line::from("  Enter      Save metric"),
        Line::from("  Esc        Cancel"),
        Line::from("  Ctrl-n/p   Move selection"),
        Line::from("  Ctrl-a/e/d Add / edit / delete (saves the open metric first)"),
        Line::from("  Ctrl-w     Write playbook"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :add duration   :edit 2   :delete 3"),
        Line::from("  :export csv     :save     :reload"),
        Line::from(""),
        Line::from("Duration targets use dd:hh:mm, e.g. 00:02:30"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricType, Playbook};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_metric_lines_with_target() {
        let metric = Metric {
            title: "Time to resolve".to_string(),
            description: "Declared to resolved".to_string(),
            target: 2 * 86_400_000 + 3 * 3_600_000,
            ..Metric::new(MetricType::Duration)
        };
        let lines = metric_lines(&metric);
        assert_eq!(line_text(&lines[0]), "⏱ Time to resolve");
        assert_eq!(line_text(&lines[1]), "   Target: 02:03:00 per run");
        assert_eq!(
            line_text(&lines[2]),
            "   Description: Declared to resolved"
        );
    }

    #[test]
    fn test_metric_lines_without_target() {
        let metric = Metric {
            title: "Cost".to_string(),
            ..Metric::new(MetricType::Currency)
        };
        assert_eq!(target_summary(&metric), "Target: No target set.");
        assert_eq!(description_summary(&metric), "Description: No description.");
        assert_eq!(line_text(&metric_lines(&metric)[0]), "$ Cost");
    }

    #[test]
    fn test_command_hint_prefix() {
        assert_eq!(command_hint("exp"), Some("export <csv|json>"));
        assert_eq!(command_hint(""), None);
        assert_eq!(command_hint("zzz"), None);
    }

    #[test]
    fn test_render_list_and_delete_prompt() {
        let mut playbook = Playbook::new("Sev1 response");
        playbook.metrics.push(Metric {
            title: "Customers affected".to_string(),
            target: 12,
            ..Metric::new(MetricType::Integer)
        });
        let mut app = App::new(playbook, PendingPolicy::Replace);

        let text = screen(&app);
        assert!(text.contains("Sev1 response"));
        assert!(text.contains("Customers affected"));
        assert!(text.contains("Target: 12 per run"));

        app.request_delete(0);
        let text = screen(&app);
        assert!(text.contains(DELETE_TITLE));
        assert!(text.contains(DELETE_CONFIRM_LABEL));
    }

    #[test]
    fn test_render_open_form() {
        let mut app = App::new(Playbook::new("Drill"), PendingPolicy::Replace);
        app.request_add(MetricType::Duration);
        let text = screen(&app);
        assert!(text.contains("Editing duration metric"));
        assert!(text.contains("Editing row 1"));
        assert!(text.contains("dd:hh:mm"));
    }
}
