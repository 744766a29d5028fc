use crate::app::state::AppState;
use crate::ui::theme::Theme;
use crate::ui::spinner;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" GMAT Practice ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![
        Line::default(),
        Line::from(Span::styled("Practice smarter for the GMAT", Theme::heading())),
        Line::from(Span::styled(
            "Timed sessions across every section and topic, with worked solutions.",
            Theme::secondary(),
        )),
        Line::default(),
    ];

    let landing = &state.landing;
    if landing.signing_in {
        lines.push(Line::from(Span::styled(
            format!("{} Signing in with {}...", spinner(state.tick_count), state.provider_name),
            Theme::notice(),
        )));
        if let Some(prompt) = &landing.prompt {
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled("Open ", Theme::text()),
                Span::styled(prompt.verification_url.clone(), Theme::focused_row()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("and enter the code ", Theme::text()),
                Span::styled(prompt.user_code.clone(), Theme::key_hint()),
            ]));
            lines.push(Line::from(Span::styled(
                format!("The code expires in {} minutes.", prompt.expires_in / 60),
                Theme::muted(),
            )));
        }
    } else if state.signed_in {
        let name = state
            .user
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "back".to_string());
        lines.push(Line::from(Span::styled(format!("Welcome {}!", name), Theme::text())));
        lines.push(Line::from(Span::styled(
            "Press p to start practicing.",
            Theme::secondary(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Sign in to track your sessions and progress.",
            Theme::secondary(),
        )));
    }

    if let Some(message) = &landing.message {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(message.clone(), Theme::notice())));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

pub fn help(state: &AppState) -> &'static [(&'static str, &'static str)] {
    if state.landing.signing_in {
        &[("Esc", "Cancel sign-in"), ("Ctrl+C", "Quit")]
    } else if state.signed_in {
        &[
            ("p", "Start practicing"),
            ("e", "Edit profile"),
            ("l", "Sign out"),
            ("q", "Quit"),
        ]
    } else {
        &[("Enter", "Sign in"), ("p", "Start practicing"), ("q", "Quit")]
    }
}
