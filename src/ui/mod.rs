mod create_session;
mod dashboard;
mod landing;
mod layout;
pub mod markup;
pub mod picker;
mod profile;
mod quiz;
mod status_bar;
mod theme;

use crate::app::state::{AppState, Screen};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use theme::Theme;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area);

    render_header(frame, app_layout.header, state);
    match state.screen {
        Screen::Landing => landing::render(frame, app_layout.body, state),
        Screen::Dashboard => dashboard::render(frame, app_layout.body, state),
        Screen::CreateSession => create_session::render(frame, app_layout.body, state),
        Screen::Quiz => quiz::render(frame, app_layout.body, state),
    }
    frame.render_widget(Paragraph::new(key_hints(help(state))), app_layout.help);
    status_bar::render(frame, app_layout.status_bar, state);

    // Popups
    picker::render(frame, state);
    profile::render(frame, state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(" mockme ", Theme::heading())];
    if let Some(user) = &state.user {
        spans.push(Span::styled(format!("· {}", user.display_name()), Theme::secondary()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn help(state: &AppState) -> &'static [(&'static str, &'static str)] {
    if state.profile.is_some() {
        return &[];
    }
    match state.screen {
        Screen::Landing => landing::help(state),
        Screen::Dashboard => dashboard::HELP,
        Screen::CreateSession => create_session::HELP,
        Screen::Quiz => quiz::help(state),
    }
}

/// Help line of `key Description` pairs.
pub(crate) fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {}", key), Theme::key_hint()));
        spans.push(Span::styled(format!(" {} ", desc), Theme::secondary()));
    }
    Line::from(spans)
}

pub(crate) fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick / 4 % SPINNER.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::*;
    use crate::app::forms::ProfileForm;
    use crate::app::quiz::QuizMachine;
    use crate::config::AppConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(state: &AppState) -> String {
        draw_sized(state, 100, 30)
    }

    fn draw_sized(state: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn state() -> AppState {
        AppState::new(AppConfig::default(), "Google")
    }

    #[test]
    fn landing_shows_sign_in_hint() {
        let mut s = state();
        s.landing.message = Some("Please sign in to start practicing.".into());
        let screen = draw(&s);
        assert!(screen.contains("GMAT Practice"));
        assert!(screen.contains("Please sign in to start practicing."));
        assert!(screen.contains("Not signed in"));
    }

    fn session() -> Session {
        Session {
            session_id: RecordId::new("42"),
            sections: Some(vec!["Quant".into()]),
            topics: Some(vec!["Algebra".into()]),
            created_at: "2024-03-05T10:00:00Z".into(),
            duration: Some(5400),
            attempted_count: 3,
            question_count: 10,
            correct_count: 2,
        }
    }

    #[test]
    fn dashboard_lists_sessions() {
        let mut s = state();
        s.screen = Screen::Dashboard;
        s.dashboard.loaded(vec![session()]);
        let screen = draw(&s);
        assert!(screen.contains("Practice session #42"));
        assert!(screen.contains("Quant / Algebra"));
        assert!(screen.contains("05/03/2024"));
        assert!(screen.contains("1h 30mins"));
        assert!(screen.contains("3/10"));
        assert!(screen.contains("66.67%"));
        assert!(screen.contains("[Resume]"));
    }

    #[test]
    fn dashboard_survives_invalid_date_format() {
        let mut s = state();
        s.config.ui.date_format = "%Q".into();
        s.screen = Screen::Dashboard;
        s.dashboard.loaded(vec![session()]);
        let screen = draw(&s);
        assert!(screen.contains("Practice session #42"));
        assert!(screen.contains("-  ·  1h 30mins"));
    }

    #[test]
    fn quiz_shows_question_and_progress() {
        let mut s = state();
        s.screen = Screen::Quiz;
        let target = QuestionTarget::Session(RecordId::new("s1"));
        let (mut quiz, _) = QuizMachine::open(Some(target.clone()));
        quiz.question_loaded(
            &target,
            QuestionPayload {
                data: Question {
                    id: RecordId::new("q1"),
                    question_text: "If \\(x = 2\\)<br>what is x&sup2;?".into(),
                    section: "quant".into(),
                    options: vec![
                        AnswerOption { option: "2".into() },
                        AnswerOption { option: "4".into() },
                    ],
                },
                session_info: Some(SessionInfo {
                    session_id: RecordId::new("s1"),
                    attempted_count: 2,
                    question_count: 10,
                    time_left: Some(125),
                }),
            },
        );
        s.quiz = Some(quiz);
        let screen = draw(&s);
        assert!(screen.contains("QUANT REVIEW"));
        assert!(screen.contains("If x = 2"));
        assert!(screen.contains("what is x²?"));
        assert!(screen.contains("A. 2"));
        assert!(screen.contains("B. 4"));
        assert!(screen.contains("Question 2/10"));
        assert!(screen.contains("Total: 02:05"));
    }

    #[test]
    fn profile_popup_renders_over_screen() {
        let mut s = state();
        s.profile = Some(ProfileForm::for_user(None));
        let screen = draw(&s);
        assert!(screen.contains("Complete your profile"));
        assert!(screen.contains("First Name"));
        assert!(screen.contains("[PROFILE]"));
    }

    #[test]
    fn picker_popup_shows_entries() {
        let mut s = state();
        s.screen = Screen::CreateSession;
        s.create.sections.set_entries(
            "",
            vec![Section {
                section_id: 1,
                title: "Verbal".into(),
                count: 12,
            }],
        );
        s.create.sections.toggle_current();
        s.create.sections.open = true;
        let screen = draw(&s);
        assert!(screen.contains("Sections (1 selected)"));
        assert!(screen.contains("[x]"));
        assert!(screen.contains("Verbal (12)"));
    }

    #[test]
    fn picker_cursor_stays_visible_on_short_terminal() {
        use crate::app::event::AppEvent;
        use crate::app::handler::handle_event;
        use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

        let mut s = state();
        s.screen = Screen::CreateSession;
        s.create.sections.set_entries(
            "",
            (0..20)
                .map(|i| Section {
                    section_id: i,
                    title: format!("Section {i}"),
                    count: 1,
                })
                .collect(),
        );
        s.create.sections.open = true;
        handle_event(&mut s, AppEvent::Terminal(Event::Resize(80, 12)));
        for _ in 0..8 {
            let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
            handle_event(&mut s, AppEvent::Terminal(Event::Key(down)));
        }
        let screen = draw_sized(&s, 80, 12);
        assert!(screen.contains("Section 8"));
        assert!(!screen.contains("Section 5"));
    }
}
