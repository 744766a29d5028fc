use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub header: Rect,
    pub body: Rect,
    pub help: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    // Main vertical split: header | content | key help | status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Screen body
            Constraint::Length(1), // Key help
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    AppLayout {
        header: chunks[0],
        body: chunks[1],
        help: chunks[2],
        status_bar: chunks[3],
    }
}

/// Centered popup of `percent` of the area, clamped to `min` and to the area.
pub fn popup_area(area: Rect, percent: (u16, u16), min: (u16, u16)) -> Rect {
    let w = percent_of(area.width, percent.0)
        .max(min.0)
        .min(area.width.saturating_sub(4));
    let h = percent_of(area.height, percent.1)
        .max(min.1)
        .min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

fn percent_of(len: u16, percent: u16) -> u16 {
    let scaled = u32::from(len) * u32::from(percent.min(100)) / 100;
    u16::try_from(scaled).unwrap_or(len)
}
