use ratatui::Frame;
use ratatui::widgets::{Block, Borders};
use ratatui::style::Style;
use crate::tui::{App, Layout, Mode};
use crate::tui::app::Modal;
use crate::tui::widgets::{
    task_table::render_task_table,
    status_bar::render_status_bar,
    help::render_help,
    form::render_task_form,
    color::parse_color,
    confirm_delete::render_confirm_delete,
    context_menu::render_context_menu,
    filters_box::render_filters_box,
    message_box::render_message_box,
};
use crate::utils::format_key_binding_for_display as key;

/// Hints shown in the status bar for the current mode
pub fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::View => vec![
            format!("{}: New", key(&kb.new)),
            format!("{}: Edit", key(&kb.edit)),
            format!("{}: Done", key(&kb.mark_done)),
            format!("{}: Delete", key(&kb.delete)),
            format!("{}: Mark", key(&kb.toggle_select)),
            format!("{}: Menu", key(&kb.menu)),
            format!("{}: Filter", key(&kb.filter)),
            format!("{}: Refresh", key(&kb.refresh)),
            format!("{}: Help", key(&kb.help)),
            format!("{}: Quit", key(&kb.quit)),
        ],
        Mode::Form => vec![
            "Tab: Next field".to_string(),
            "←→: Change".to_string(),
            format!("Enter/{}: Save", key(&kb.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::Menu => vec![
            "↑↓: Choose".to_string(),
            "Enter: Run".to_string(),
            "Esc: Close".to_string(),
        ],
        Mode::Help => vec![format!("{}/Esc: Close help", key(&kb.help))],
    }
}

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let fg_color = parse_color(&app.config.colors.fg);
    let bg_color = parse_color(&app.config.colors.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Traker")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let tasks = app.store.filtered(app.ui.filter, app.today);
    render_task_table(
        f,
        layout.table_area,
        &tasks,
        app.today,
        &app.ui.marked,
        &mut app.ui.table_state,
        &app.config,
    );

    render_filters_box(f, layout.filters_area, &app.filter_summary(), &app.config);

    let hints = key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_deref(), &hints, &app.config);

    let area = layout.inner_area;
    match app.ui.mode {
        Mode::Form => {
            if let Some(form) = app.form.as_mut() {
                render_task_form(f, area, form, &app.config);
            }
        }
        Mode::Menu => {
            let target_count = app.target_ids().len();
            render_context_menu(f, area, app.ui.menu_index, target_count, &app.config);
        }
        Mode::Help => render_help(f, area, &app.config),
        Mode::View => {}
    }

    // Modals draw over everything else
    match &app.modal {
        Some(Modal::Message { title, body }) => render_message_box(f, area, title, body, &app.config),
        Some(Modal::ConfirmDelete { ids, selection }) => {
            render_confirm_delete(f, area, ids.len(), *selection, &app.config)
        }
        None => {}
    }
}
