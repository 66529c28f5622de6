use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {} / ↑ / ↓: Move selection\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!("  {}: Mark / unmark task\n", key(&kb.toggle_select)));
    text.push_str(&format!("  {}: Cycle status filter\n", key(&kb.filter)));
    text.push_str(&format!("  {}: Recheck due dates\n", key(&kb.refresh)));
    text.push('\n');

    text.push_str("Actions (marked tasks, or the selected one):\n");
    text.push_str(&format!("  {}: New task\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit task\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Mark as done\n", key(&kb.mark_done)));
    text.push_str(&format!("  {}: Delete\n", key(&kb.delete)));
    text.push_str(&format!("  {} / Enter: Action menu\n", key(&kb.menu)));
    text.push('\n');

    text.push_str("Task Form:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  ← / → / Space: Change priority or status\n");
    text.push_str(&format!("  Enter / {}: Save\n", key(&kb.save)));
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("Row colors:\n");
    text.push_str("  Completed, Overdue and High priority tasks are highlighted\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));

    text
}
