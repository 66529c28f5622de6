use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub table_area: Rect,
    pub filters_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: ID, due date, priority and status columns plus a short description
    /// Height: 2 outer borders + 4 table rows + 3 filters + 1 status
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 10;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Split vertically: task table, filters (3 lines for borders + content), status (1 line)
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner_area);

        Self {
            inner_area,
            table_area: vertical[0],
            filters_area: vertical[1],
            status_area: vertical[2],
        }
    }
}
