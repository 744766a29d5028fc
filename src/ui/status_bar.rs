use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut parts: Vec<Span> = Vec::new();

    parts.push(Span::styled(
        format!(" [{}] ", state.provider_name),
        Theme::status_badge(),
    ));

    let status_style = if state.status_message.is_some() {
        Style::default().fg(Theme::ACCENT_AMBER).bg(Theme::BORDER_DIM)
    } else {
        Theme::status_bar()
    };
    parts.push(Span::styled(format!(" {} ", state.status_line()), status_style));

    // Screen indicator, right-aligned
    let screen = state.screen_name();
    let used: usize = parts.iter().map(|s| s.content.width()).sum();
    let remaining = (area.width as usize).saturating_sub(used + screen.len() + 3);
    parts.push(Span::styled(" ".repeat(remaining), Theme::status_bar()));
    parts.push(Span::styled(format!(" [{}] ", screen), Theme::status_badge()));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
