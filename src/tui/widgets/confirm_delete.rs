use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::popup_area;

pub const OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm_delete(f: &mut Frame, area: Rect, count: usize, selection: usize, config: &Config) {
    let fg_color = parse_color(&config.colors.fg);
    let bg_color = parse_color(&config.colors.bg);
    let highlight_bg = parse_color(&config.colors.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let normal = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let mut all_lines = vec![
        Line::from(Span::styled(format!("Delete {} selected task(s)?", count), normal)),
        Line::from(""),
    ];

    for (index, option) in OPTIONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            normal
        };
        all_lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    all_lines.push(Line::from(""));
    all_lines.push(Line::from(Span::styled(
        "Use ↑↓ to navigate, Enter to confirm, Esc to cancel",
        normal,
    )));

    let paragraph = Paragraph::new(all_lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(normal))
        .style(normal)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
