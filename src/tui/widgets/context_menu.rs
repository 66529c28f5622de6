use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::tui::app::MenuAction;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::fixed_popup_area;

/// Action menu for the selected or marked tasks
pub fn render_context_menu(f: &mut Frame, area: Rect, selected: usize, target_count: usize, config: &Config) {
    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);
    let highlight_bg = parse_color(&config.colors.highlight_bg);

    let width = MenuAction::ALL
        .iter()
        .map(|a| a.label().chars().count())
        .max()
        .unwrap_or(0) as u16
        + 8;
    let popup = fixed_popup_area(area, width.max(24), MenuAction::ALL.len() as u16 + 2);
    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = MenuAction::ALL.iter().map(|a| ListItem::new(a.label())).collect();
    let list = List::new(items)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("{} task(s)", target_count))
            .title_alignment(Alignment::Center))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_symbol("> ")
        .highlight_style(Style::default().fg(get_contrast_text_color(highlight_bg)).bg(highlight_bg));

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, popup, &mut state);
}
