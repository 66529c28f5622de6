use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::Line;
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

/// Blocking message popup; the caller dismisses it on Enter or Esc
pub fn render_message_box(f: &mut Frame, area: Rect, title: &str, body: &str, config: &Config) {
    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);
    let style = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = body.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("Press Enter to continue", Style::default().add_modifier(Modifier::DIM)));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .style(style))
        .style(style)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
