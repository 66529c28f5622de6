use std::collections::HashSet;

use chrono::NaiveDate;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState, Scrollbar, ScrollbarState, ScrollbarOrientation};
use ratatui::style::{Color, Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use crate::models::{Priority, Status, Task};
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

/// Row background for a task: completed and overdue take precedence over high priority
pub fn row_background(task: &Task, today: NaiveDate, config: &Config) -> Option<Color> {
    match task.display_status(today) {
        Status::Completed => Some(parse_color(&config.colors.completed_bg)),
        Status::Overdue => Some(parse_color(&config.colors.overdue_bg)),
        Status::Active if task.priority == Priority::High => Some(parse_color(&config.colors.high_priority_bg)),
        Status::Active => None,
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

pub fn render_task_table(
    f: &mut Frame,
    area: Rect,
    tasks: &[&Task],
    today: NaiveDate,
    marked: &HashSet<u64>,
    table_state: &mut TableState,
    config: &Config,
) {
    let fg_color = parse_color(&config.colors.fg);
    let highlight_bg = parse_color(&config.colors.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    // Marker, ID, Due, Priority and Status are fixed; the description takes the rest
    let fixed_widths: u16 = 3 + 5 + 10 + 8 + 9;
    let description_width = area
        .width
        .saturating_sub(2 + 1 + fixed_widths + 5)
        .max(8) as usize;

    let header = Row::new(["", "ID", "Description", "Due", "Priority", "Status"])
        .style(Style::default().fg(fg_color).add_modifier(Modifier::BOLD))
        .bottom_margin(0);

    let rows: Vec<Row> = tasks
        .iter()
        .map(|task| {
            let marker = if marked.contains(&task.id) { "[*]" } else { "[ ]" };
            let style = match row_background(task, today, config) {
                Some(bg) => Style::default().fg(get_contrast_text_color(bg)).bg(bg),
                None => Style::default().fg(fg_color),
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(task.id.to_string()),
                Cell::from(truncate(&task.description, description_width)),
                Cell::from(task.due_date.to_string()),
                Cell::from(task.priority.label()),
                Cell::from(task.display_status(today).label()),
            ])
            .style(style)
        })
        .collect();

    let table_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);
    let table_area = table_areas[0];
    let scrollbar_area = table_areas[1];

    let widths = [
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(9),
    ];
    let total_items = rows.len();
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .style(Style::default().fg(fg_color))
        .row_highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(table, table_area, table_state);

    // Borders and the header row
    let visible_items = table_area.height.saturating_sub(3) as usize;
    if total_items > visible_items && scrollbar_area.width > 0 && table_area.height > 3 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            table_area.y + 2,
            scrollbar_area.width,
            table_area.height.saturating_sub(3),
        );

        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(table_state.offset());

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}
