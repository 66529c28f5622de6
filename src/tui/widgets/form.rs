use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect, Constraint, Layout, Direction};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::tui::app::{TaskForm, TaskField};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::fixed_popup_area;

const FORM_WIDTH: u16 = 60;

/// Height of the popup: one bordered block per field plus the hint line and outer border
fn form_height(form: &TaskForm) -> u16 {
    form.fields().len() as u16 * 3 + 3
}

fn field_title(field: TaskField) -> &'static str {
    match field {
        TaskField::Description => "Description",
        TaskField::DueDate => "Due Date (YYYY-MM-DD)",
        TaskField::Priority => "Priority",
        TaskField::Status => "Status",
    }
}

/// Choice fields render as `< value >` so the cycling keys are discoverable
fn choice_line(value: &str, active: bool) -> String {
    if active {
        format!("< {} >", value)
    } else {
        format!("  {}", value)
    }
}

fn editor_line(editor: &mut Editor, width: usize) -> (String, usize) {
    editor.update_horizontal_scroll(width);
    editor.visible(width)
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &mut TaskForm, config: &Config) {
    if area.width < 2 || area.height < 2 {
        return;
    }

    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);
    let highlight_bg = parse_color(&config.colors.highlight_bg);
    let highlight_style = Style::default()
        .bg(highlight_bg)
        .fg(get_contrast_text_color(highlight_bg));
    let inactive_field_style = Style::default()
        .fg(fg_color)
        .add_modifier(Modifier::DIM);

    let popup = fixed_popup_area(area, FORM_WIDTH, form_height(form));
    f.render_widget(Clear, popup);

    let title = if form.is_edit() { "Edit task" } else { "New task" };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let fields = form.fields();
    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));
    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut cursor = None;
    for (index, &field) in fields.iter().enumerate() {
        let field_area = field_areas[index];
        let active = form.current_field == field;
        let style = if active { highlight_style } else { inactive_field_style };
        let content_width = field_area.width.saturating_sub(2) as usize;

        let content = match field {
            TaskField::Description | TaskField::DueDate => {
                let editor = if field == TaskField::Description {
                    &mut form.description
                } else {
                    &mut form.due_date
                };
                let (shown, column) = editor_line(editor, content_width);
                if active {
                    cursor = Some((field_area.x + 1 + column as u16, field_area.y + 1));
                }
                shown
            }
            TaskField::Priority => choice_line(form.priority.label(), active),
            TaskField::Status => choice_line(form.status.label(), active),
        };

        let paragraph = Paragraph::new(Line::from(Span::styled(content, style)))
            .block(Block::default().borders(Borders::ALL).title(field_title(field)));
        f.render_widget(paragraph, field_area);
    }

    let hint = format!(
        "Tab/↑↓: field • ←→: change • Enter/{}: save • Esc: cancel",
        crate::utils::format_key_binding_for_display(&config.key_bindings.save)
    );
    let hint_area = field_areas[fields.len()];
    f.render_widget(
        Paragraph::new(hint).style(inactive_field_style).alignment(Alignment::Center),
        hint_area,
    );

    if let Some((x, y)) = cursor {
        f.set_cursor_position((x, y));
    }
}
