use crate::app::forms::ProfileForm;
use crate::app::state::AppState;
use crate::ui::key_hints;
use crate::ui::layout::popup_area;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

pub fn render(frame: &mut Frame, state: &AppState) {
    let Some(form) = state.profile.as_ref() else {
        return;
    };

    let popup = popup_area(frame.area(), (50, 50), (44, 16));
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Complete your profile ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Style::default().fg(Theme::ACCENT_LAVENDER))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Theme::BG_SURFACE));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    for (i, label) in ProfileForm::LABELS.iter().enumerate() {
        render_field(frame, rows[i], form, i, label);
    }

    let submit_style = if form.focus == 3 { Theme::selected() } else { Theme::key_hint() };
    let submit = if form.submitting { "Saving..." } else { "[ Save ]" };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(submit, submit_style))).alignment(Alignment::Center),
        Rect::new(rows[3].x, rows[3].y + 1, rows[3].width, 1),
    );
    frame.render_widget(
        Paragraph::new(key_hints(&[("Tab", "Next field"), ("Enter", "Save")])),
        rows[5],
    );
}

fn render_field(frame: &mut Frame, area: Rect, form: &ProfileForm, index: usize, label: &str) {
    let focused = form.focus == index;
    let block = Block::default()
        .title(format!(" {} ", label))
        .title_style(if focused { Theme::title() } else { Theme::muted() })
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(if focused { Theme::border_focused() } else { Theme::border() });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let field = &form.fields[index];
    frame.render_widget(Paragraph::new(field.value()).style(Theme::input_text()), inner);
    if focused && inner.width > 0 {
        let x = inner.x + field.cursor_col() as u16;
        frame.set_cursor_position((x.min(inner.right() - 1), inner.y));
    }
}
