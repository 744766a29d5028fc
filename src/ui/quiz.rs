use crate::api::model::option_label;
use crate::app::quiz::{format_clock, QuizMachine, QuizPhase};
use crate::app::state::AppState;
use crate::ui::markup;
use crate::ui::spinner;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn help(state: &AppState) -> &'static [(&'static str, &'static str)] {
    match state.quiz.as_ref().map(QuizMachine::phase) {
        Some(QuizPhase::AwaitingSelection) if state.quiz.as_ref().is_some_and(QuizMachine::is_paused) => {
            &[("Space", "Resume"), ("Esc", "Dashboard")]
        }
        Some(QuizPhase::AwaitingSelection) => &[
            ("A-E/↑↓", "Select"),
            ("Enter", "Submit"),
            ("Space", "Pause"),
            ("Esc", "Dashboard"),
        ],
        Some(QuizPhase::ShowingResult) => &[("Enter", "Next question"), ("Esc", "Dashboard")],
        _ => &[("Esc", "Dashboard")],
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(quiz) = state.quiz.as_ref() else {
        return;
    };

    let section = quiz
        .question()
        .map(|q| q.section.to_uppercase())
        .unwrap_or_else(|| "GMAT".to_string());
    let block = Block::default()
        .title(format!(" {} REVIEW ", section))
        .title_style(Theme::title())
        .title_bottom(Line::from(progress_spans(quiz)).right_aligned())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());

    let lines = match quiz.phase() {
        QuizPhase::Loading => vec![Line::from(Span::styled(
            format!("{} Loading question...", spinner(state.tick_count)),
            Theme::notice(),
        ))],
        QuizPhase::Error => vec![Line::from(Span::styled(
            quiz.error().unwrap_or_default().to_string(),
            Theme::error_message(),
        ))],
        _ if quiz.is_paused() => vec![
            Line::default(),
            Line::from(Span::styled("Paused", Theme::heading())),
            Line::from(Span::styled("Press Space to resume.", Theme::secondary())),
        ],
        _ => question_lines(state, quiz),
    };

    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(p, area);
}

fn progress_spans(quiz: &QuizMachine) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(info) = quiz.session() {
        spans.push(Span::styled(
            format!(" Question {}/{} ", info.attempted_count, info.question_count),
            Theme::secondary(),
        ));
        spans.push(Span::styled(
            format!(" This question: {} ", format_clock(quiz.question_secs())),
            Theme::secondary(),
        ));
        if let Some(left) = quiz.time_left() {
            spans.push(Span::styled(
                format!(" Total: {} ", format_clock(left)),
                Theme::notice(),
            ));
        }
    }
    spans
}

fn question_lines<'a>(state: &AppState, quiz: &'a QuizMachine) -> Vec<Line<'a>> {
    let Some(question) = quiz.question() else {
        return Vec::new();
    };
    let mut lines: Vec<Line> = markup::to_lines(&question.question_text)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Theme::text())))
        .collect();
    lines.push(Line::default());

    let answer = quiz
        .result()
        .and_then(|r| r.answer.trim().chars().next())
        .map(|c| c.to_ascii_uppercase());
    for (i, option) in question.options.iter().enumerate() {
        let label = option_label(i);
        let chosen = quiz.selected() == Some(label);
        let style = match answer {
            Some(correct) if label == correct => Theme::correct(),
            Some(_) if chosen => Theme::wrong(),
            None if chosen => Theme::selected(),
            _ => Theme::text(),
        };
        let text = markup::to_lines(&option.option).join(" ");
        lines.push(Line::from(vec![
            Span::styled(if chosen { "❯ " } else { "  " }, Theme::focused_row()),
            Span::styled(format!("{}. {}", label, text), style),
        ]));
    }

    if let Some(notice) = quiz.notice() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(notice.to_string(), Theme::notice())));
    }
    if quiz.phase() == QuizPhase::Submitting {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{} Submitting...", spinner(state.tick_count)),
            Theme::notice(),
        )));
    }

    if let Some(result) = quiz.result() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("Solution", Theme::heading()),
            Span::styled(
                format!("  (time taken {})", format_clock(quiz.question_secs())),
                Theme::muted(),
            ),
        ]));
        lines.extend(
            markup::to_lines(&result.solution_text)
                .into_iter()
                .map(|l| Line::from(Span::styled(l, Theme::secondary()))),
        );
    }
    lines
}
