use crate::app::forms::{CreateField, CreateSessionForm};
use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub const HELP: &[(&str, &str)] = &[
    ("↑↓", "Field"),
    ("←→", "Change"),
    ("0-9", "Edit number"),
    ("Enter", "Open / Start"),
    ("Esc", "Back"),
];

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let form = &state.create;
    let block = Block::default()
        .title(" Create a practice session ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());

    let mut lines: Vec<Line> = vec![Line::default()];
    for field in form.visible_fields() {
        let focused = field == form.focus;
        let marker = if focused { "❯ " } else { "  " };
        let label_style = if focused { Theme::focused_row() } else { Theme::secondary() };

        if field == CreateField::Start {
            lines.push(Line::default());
            let text = if form.submitting { "Creating..." } else { "[ Start ]" };
            let style = if focused { Theme::selected() } else { Theme::key_hint() };
            lines.push(Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(text, style),
            ]));
            continue;
        }

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<18}", field_label(field)), label_style),
            Span::styled(field_value(form, field), Theme::text()),
        ]));
    }

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(p, area);
}

fn field_label(field: CreateField) -> &'static str {
    match field {
        CreateField::Sections => "Sections",
        CreateField::Topics => "Topics",
        CreateField::Questions => "Questions",
        CreateField::QuestionCount => "Number",
        CreateField::Duration => "Duration",
        CreateField::Hours => "Hours",
        CreateField::Minutes => "Minutes",
        CreateField::Start => "",
    }
}

fn field_value(form: &CreateSessionForm, field: CreateField) -> String {
    match field {
        CreateField::Sections => form.sections.summary(),
        CreateField::Topics => form.topics.summary(),
        CreateField::Questions => format!("◂ {} ▸", form.question_policy.label()),
        CreateField::QuestionCount => form.question_count.to_string(),
        CreateField::Duration => format!("◂ {} ▸", form.duration_policy.label()),
        CreateField::Hours => form.hours.to_string(),
        CreateField::Minutes => format!("{:02}", form.minutes),
        CreateField::Start => String::new(),
    }
}
