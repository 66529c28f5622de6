use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::Config;
use crate::tui::widgets::color::parse_color;

pub fn render_filters_box(
    f: &mut Frame,
    area: Rect,
    summary: &str,
    config: &Config,
) {
    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);
    let title = format!("{}: Filter", crate::utils::format_key_binding_for_display(&config.key_bindings.filter));

    let paragraph = Paragraph::new(summary)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color));

    f.render_widget(paragraph, area);
}
