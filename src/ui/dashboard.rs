use crate::api::model::Session;
use crate::app::forms::{format_date, format_duration, format_percent};
use crate::app::state::AppState;
use crate::ui::spinner;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub const HELP: &[(&str, &str)] = &[
    ("↑↓", "Navigate"),
    ("Enter", "Resume"),
    ("n", "New session"),
    ("F5", "Reload"),
    ("l", "Sign out"),
    ("Esc", "Home"),
];

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let dashboard = &state.dashboard;
    let title = if dashboard.loading {
        " Your Sessions (loading...) ".to_string()
    } else {
        format!(" Your Sessions ({}) ", dashboard.sessions.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());

    if let Some(error) = &dashboard.error {
        let p = Paragraph::new(Line::from(Span::styled(format!(" {}", error), Theme::error_message())))
            .block(block);
        frame.render_widget(p, area);
        return;
    }
    if dashboard.loading && dashboard.sessions.is_empty() {
        let p = Paragraph::new(Line::from(Span::styled(
            format!(" {} Loading sessions...", spinner(state.tick_count)),
            Theme::notice(),
        )))
        .block(block);
        frame.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = dashboard
        .sessions
        .iter()
        .map(|s| session_item(s, &state.config.ui.date_format))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Theme::BG_SURFACE))
        .highlight_symbol("▌ ");
    let mut list_state = ListState::default().with_selected(Some(dashboard.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn session_item<'a>(session: &Session, date_format: &str) -> ListItem<'a> {
    let date = session
        .created_date()
        .map(|d| format_date(d, date_format))
        .unwrap_or_else(|| "-".to_string());

    let mut title = vec![Span::styled(
        format!("Practice session #{}", session.session_id),
        Theme::heading(),
    )];
    if session.is_resumable() {
        title.push(Span::raw("  "));
        title.push(Span::styled("[Resume]", Theme::key_hint()));
    }

    let labels = session.labels();
    let details = format!(
        "{}  ·  {}  ·  {}/{} attempted  ·  {} correct",
        date,
        format_duration(session.duration),
        session.attempted_count,
        session.question_count,
        format_percent(session.correct_count, session.attempted_count),
    );

    ListItem::new(vec![
        Line::from(title),
        Line::from(Span::styled(
            if labels.is_empty() { "All sections".to_string() } else { labels },
            Theme::text(),
        )),
        Line::from(Span::styled(details, Theme::secondary())),
        Line::default(),
    ])
}
