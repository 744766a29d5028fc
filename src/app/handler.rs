use crate::api::dispatch::{ApiReply, ApiRequest};
use crate::api::error::ApiError;
use crate::api::model::{QuestionTarget, User};
use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::forms::{
    CatalogEntry, CreateField, CreateSessionForm, LandingState, Picker, ProfileForm,
};
use crate::app::quiz::{QuizCommand, QuizMachine, QuizPhase};
use crate::app::state::*;
use crate::ui::picker::picker_rows;
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;

/// Actions to run once at launch: restore the signed-in user when a token
/// was stored, and open the quiz directly when a target was given.
pub fn startup(state: &mut AppState, has_token: bool, target: Option<QuestionTarget>) -> Vec<Action> {
    let mut actions = Vec::new();
    if has_token {
        state.signed_in = true;
        actions.push(Action::Api(ApiRequest::FetchUser));
    }
    if target.is_some() {
        actions.extend(open_quiz(state, target));
    }
    sync_ticker(state, &mut actions);
    actions
}

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    let mut actions = match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::Api(reply) => {
            state.dirty = true;
            handle_api(state, reply)
        }
        AppEvent::DevicePrompt(prompt) => {
            if state.landing.signing_in {
                state.landing.prompt = Some(prompt);
                state.dirty = true;
            }
            vec![]
        }
        AppEvent::SignedIn(result) => {
            state.dirty = true;
            handle_signed_in(state, result)
        }
        AppEvent::QuizTick { generation } => {
            if let Some(quiz) = state.quiz.as_mut() {
                if quiz.tick(generation) {
                    state.dirty = true;
                }
            }
            vec![]
        }
        AppEvent::Tick => {
            handle_tick(state);
            vec![]
        }
    };

    sync_ticker(state, &mut actions);
    actions
}

/// Keep the quiz ticker running exactly while the visible quiz is ticking,
/// restarting it whenever a new question arrives.
fn sync_ticker(state: &mut AppState, actions: &mut Vec<Action>) {
    let wanted = match (&state.quiz, state.screen) {
        (Some(quiz), Screen::Quiz) if quiz.is_ticking() => Some(quiz.generation()),
        _ => None,
    };
    if wanted == state.running_ticker {
        return;
    }
    if state.running_ticker.is_some() {
        actions.push(Action::StopQuizTicker);
    }
    if let Some(generation) = wanted {
        actions.push(Action::StartQuizTicker { generation });
    }
    state.running_ticker = wanted;
}

fn handle_tick(state: &mut AppState) {
    state.tick_count = state.tick_count.wrapping_add(1);
    let busy = state.landing.signing_in
        || (state.screen == Screen::Dashboard && state.dashboard.loading)
        || state
            .quiz
            .as_ref()
            .is_some_and(|q| matches!(q.phase(), QuizPhase::Loading | QuizPhase::Submitting));
    // spinner frames advance every 4 ticks
    if busy && state.tick_count % 4 == 0 {
        state.dirty = true;
    }
}

// --- navigation ---

fn open_landing(state: &mut AppState) {
    state.screen = Screen::Landing;
    state.quiz = None;
}

fn open_dashboard(state: &mut AppState) -> Vec<Action> {
    state.screen = Screen::Dashboard;
    state.quiz = None;
    state.clear_status();
    state.dashboard.start_loading();
    vec![Action::Api(ApiRequest::Sessions)]
}

fn open_create(state: &mut AppState) -> Vec<Action> {
    state.screen = Screen::CreateSession;
    state.quiz = None;
    state.clear_status();
    state.create = CreateSessionForm::default();
    vec![
        Action::Api(ApiRequest::Sections {
            search: String::new(),
        }),
        Action::Api(ApiRequest::Topics {
            search: String::new(),
        }),
    ]
}

fn open_quiz(state: &mut AppState, target: Option<QuestionTarget>) -> Vec<Action> {
    let (machine, command) = QuizMachine::open(target);
    state.screen = Screen::Quiz;
    state.quiz = Some(machine);
    state.clear_status();
    command.map(quiz_action).into_iter().collect()
}

fn quiz_action(command: QuizCommand) -> Action {
    match command {
        QuizCommand::Fetch(target) => Action::Api(ApiRequest::Question(target)),
        QuizCommand::Submit {
            option,
            question_id,
        } => Action::Api(ApiRequest::SubmitAnswer {
            option,
            question_id,
        }),
    }
}

fn reset_session(state: &mut AppState) {
    state.signed_in = false;
    state.user = None;
    state.profile = None;
    state.landing = LandingState::default();
    open_landing(state);
}

fn log_out(state: &mut AppState) -> Vec<Action> {
    reset_session(state);
    state.landing.message = Some("Signed out.".to_string());
    vec![Action::Logout]
}

/// The server rejected our token. The API client already evicted it; all
/// that is left is to return to the landing screen.
fn expire_session(state: &mut AppState) -> Vec<Action> {
    if state.signed_in || state.screen != Screen::Landing {
        tracing::info!("session expired, returning to landing screen");
    }
    reset_session(state);
    state.set_status("Your session has expired. Please sign in again.");
    vec![]
}

// --- API replies ---

fn handle_api(state: &mut AppState, reply: ApiReply) -> Vec<Action> {
    if reply.error().is_some_and(ApiError::is_unauthorized) {
        return expire_session(state);
    }

    match reply {
        ApiReply::User(Ok(user)) => {
            state.signed_in = true;
            if user.needs_profile() {
                state.profile = Some(ProfileForm::for_user(Some(&user)));
            }
            state.user = Some(user);
            vec![]
        }
        ApiReply::User(Err(_)) => {
            state.signed_in = false;
            state.user = None;
            vec![Action::Logout]
        }
        ApiReply::ProfileUpdated { update, result } => {
            if let Some(form) = state.profile.as_mut() {
                form.submitting = false;
            }
            match result {
                Ok(true) => {
                    let user = state.user.get_or_insert_with(User::default);
                    user.firstname = Some(update.firstname);
                    user.lastname = Some(update.lastname);
                    user.mobile_number = Some(update.mobile_number);
                    state.profile = None;
                    open_dashboard(state)
                }
                Ok(false) => {
                    state.set_status("Profile update was not accepted.");
                    vec![]
                }
                Err(_) => {
                    state.set_status("Failed to update profile. Please try again.");
                    vec![]
                }
            }
        }
        ApiReply::Sections { search, result } => {
            if let Ok(entries) = result {
                state.create.sections.set_entries(&search, entries);
            }
            vec![]
        }
        ApiReply::Topics { search, result } => {
            if let Ok(entries) = result {
                state.create.topics.set_entries(&search, entries);
            }
            vec![]
        }
        ApiReply::SessionCreated(result) => {
            state.create.submitting = false;
            match result {
                Ok(session_id) if state.screen == Screen::CreateSession => {
                    open_quiz(state, Some(QuestionTarget::Session(session_id)))
                }
                Ok(_) => vec![],
                Err(_) => {
                    state.set_status("Failed to create session. Please try again.");
                    vec![]
                }
            }
        }
        ApiReply::Sessions(result) => {
            if state.screen != Screen::Dashboard {
                return vec![];
            }
            match result {
                Ok(sessions) => {
                    if state.dashboard.loaded(sessions) {
                        return open_create(state);
                    }
                }
                Err(_) => state.dashboard.failed(),
            }
            vec![]
        }
        ApiReply::Question { target, result } => {
            if let Some(quiz) = state.quiz.as_mut() {
                match result {
                    Ok(payload) => quiz.question_loaded(&target, payload),
                    Err(_) => quiz.question_failed(&target),
                };
            }
            vec![]
        }
        ApiReply::Answer {
            question_id,
            result,
        } => {
            if let Some(quiz) = state.quiz.as_mut() {
                match result {
                    Ok(answer) => quiz.answer_received(&question_id, answer),
                    Err(_) => quiz.answer_failed(&question_id),
                };
            }
            vec![]
        }
    }
}

fn handle_signed_in(
    state: &mut AppState,
    result: Result<User, crate::api::dispatch::SignInError>,
) -> Vec<Action> {
    if !state.landing.signing_in {
        // cancelled while the exchange was in flight
        return vec![];
    }
    state.landing.signing_in = false;
    state.landing.prompt = None;
    match result {
        Ok(user) => {
            state.signed_in = true;
            state.landing.message = None;
            let needs_profile = user.needs_profile();
            if needs_profile {
                state.profile = Some(ProfileForm::for_user(Some(&user)));
            }
            state.user = Some(user);
            if needs_profile {
                vec![]
            } else {
                open_dashboard(state)
            }
        }
        Err(e) => {
            state.landing.message = Some(format!("Sign-in failed: {}", e));
            vec![]
        }
    }
}

// --- terminal input ---

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        CEvent::Resize(width, height) => {
            state.viewport = Rect::new(0, 0, width, height);
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    // Global keybindings
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    // Profile form captures all input when visible
    if state.profile.is_some() {
        return handle_profile_key(state, key);
    }

    match state.screen {
        Screen::Landing => handle_landing_key(state, key),
        Screen::Dashboard => handle_dashboard_key(state, key),
        Screen::CreateSession => handle_create_key(state, key),
        Screen::Quiz => handle_quiz_key(state, key),
    }
}

fn handle_landing_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if state.landing.signing_in {
        if key.code == KeyCode::Esc {
            state.landing.signing_in = false;
            state.landing.prompt = None;
            state.landing.message = Some("Sign-in cancelled.".to_string());
            return vec![Action::CancelSignIn];
        }
        return vec![];
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('d') if state.signed_in => {
            open_dashboard(state)
        }
        KeyCode::Enter | KeyCode::Char('s') => {
            state.landing.signing_in = true;
            state.landing.message = None;
            state.clear_status();
            vec![Action::SignIn]
        }
        KeyCode::Char('p') => {
            if state.signed_in {
                open_dashboard(state)
            } else {
                state.landing.message = Some("Please sign in to start practicing.".to_string());
                vec![]
            }
        }
        KeyCode::Char('e') if state.signed_in => {
            state.profile = Some(ProfileForm::for_user(state.user.as_ref()));
            vec![]
        }
        KeyCode::Char('l') if state.signed_in => log_out(state),
        KeyCode::Char('q') | KeyCode::Esc => vec![Action::Quit],
        _ => vec![],
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let Some(form) = state.profile.as_mut() else {
        return vec![];
    };
    if form.submitting {
        return vec![];
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Enter if form.focus < 3 => form.focus_next(),
        KeyCode::Enter => {
            if !form.is_complete() {
                state.set_status("First name is required.");
                return vec![];
            }
            form.submitting = true;
            let update = form.request();
            return vec![Action::Api(ApiRequest::UpdateUser(update))];
        }
        KeyCode::Esc => {
            // the profile is mandatory for users without a name
            if state.user.as_ref().is_some_and(|u| !u.needs_profile()) {
                state.profile = None;
            }
        }
        code => {
            if let Some(field) = form.focused_field() {
                match code {
                    KeyCode::Char(c) => field.insert_char(c),
                    KeyCode::Backspace => field.delete_back(),
                    KeyCode::Left => field.move_left(),
                    KeyCode::Right => field.move_right(),
                    KeyCode::Home => field.move_home(),
                    KeyCode::End => field.move_end(),
                    _ => {}
                }
            }
        }
    }
    vec![]
}

fn handle_dashboard_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        return open_dashboard(state);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.dashboard.move_up();
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.dashboard.move_down();
            vec![]
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            let target = state
                .dashboard
                .selected_session()
                .filter(|s| s.is_resumable())
                .map(|s| QuestionTarget::Session(s.session_id.clone()));
            match target {
                Some(target) => open_quiz(state, Some(target)),
                None => vec![],
            }
        }
        KeyCode::Char('n') => open_create(state),
        KeyCode::F(5) => open_dashboard(state),
        KeyCode::Char('l') => log_out(state),
        KeyCode::Esc => {
            open_landing(state);
            vec![]
        }
        KeyCode::Char('q') => vec![Action::Quit],
        _ => vec![],
    }
}

fn handle_create_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if state.create.sections.open || state.create.topics.open {
        return handle_picker_key(state, key);
    }
    if state.create.submitting {
        return vec![];
    }

    let form = &mut state.create;
    match key.code {
        KeyCode::Esc => return open_dashboard(state),
        KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
        KeyCode::Down | KeyCode::Tab => form.focus_next(),
        KeyCode::Left => form.adjust(false),
        KeyCode::Right => form.adjust(true),
        KeyCode::Backspace => form.pop_digit(),
        KeyCode::Char(c) if c.is_ascii_digit() => form.push_digit(c.to_digit(10).unwrap_or(0)),
        KeyCode::Enter | KeyCode::Char(' ') => match form.focus {
            CreateField::Sections => form.sections.open = true,
            CreateField::Topics => form.topics.open = true,
            CreateField::Start => {
                form.submitting = true;
                let request = form.request();
                state.set_status("Creating session...");
                return vec![Action::Api(ApiRequest::CreateSession(request))];
            }
            _ if key.code == KeyCode::Enter => form.focus_next(),
            _ => form.adjust(true),
        },
        _ => {}
    }
    vec![]
}

fn handle_picker_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let rows = picker_rows(state.viewport);
    let form = &mut state.create;
    if matches!(key.code, KeyCode::Esc | KeyCode::Tab) {
        form.sections.open = false;
        form.topics.open = false;
        return vec![];
    }

    let request = if form.sections.open {
        picker_key(&mut form.sections, key.code, rows).map(|search| ApiRequest::Sections { search })
    } else {
        picker_key(&mut form.topics, key.code, rows).map(|search| ApiRequest::Topics { search })
    };
    request.map(Action::Api).into_iter().collect()
}

/// Apply a key to an open picker. Returns the new search term when it
/// changed and the catalog has to be fetched again.
fn picker_key<T: CatalogEntry>(picker: &mut Picker<T>, code: KeyCode, rows: usize) -> Option<String> {
    match code {
        KeyCode::Up => {
            picker.move_up();
            picker.ensure_visible(rows);
        }
        KeyCode::Down => {
            picker.move_down();
            picker.ensure_visible(rows);
        }
        KeyCode::Enter => picker.toggle_current(),
        KeyCode::Backspace => {
            picker.search.delete_back();
            return Some(picker.search.text.clone());
        }
        KeyCode::Char(c) => {
            picker.search.insert_char(c);
            return Some(picker.search.text.clone());
        }
        _ => {}
    }
    None
}

fn handle_quiz_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if key.code == KeyCode::Esc {
        return open_dashboard(state);
    }
    let Some(quiz) = state.quiz.as_mut() else {
        return vec![];
    };

    match (quiz.phase(), key.code) {
        (QuizPhase::AwaitingSelection, KeyCode::Char(' ')) => {
            quiz.toggle_pause();
            vec![]
        }
        (QuizPhase::AwaitingSelection, KeyCode::Up) => {
            quiz.move_selection(-1);
            vec![]
        }
        (QuizPhase::AwaitingSelection, KeyCode::Down) => {
            quiz.move_selection(1);
            vec![]
        }
        (QuizPhase::AwaitingSelection, KeyCode::Char(c)) if c.is_ascii_alphabetic() => {
            quiz.select(c);
            vec![]
        }
        (QuizPhase::AwaitingSelection, KeyCode::Char(c)) if ('1'..='9').contains(&c) => {
            quiz.select_index(c as usize - '1' as usize);
            vec![]
        }
        (QuizPhase::AwaitingSelection, KeyCode::Enter) => match quiz.confirm() {
            Ok(command) => vec![quiz_action(command)],
            Err(_) => vec![],
        },
        (QuizPhase::ShowingResult, KeyCode::Enter | KeyCode::Char('n')) => {
            quiz.next_question().map(quiz_action).into_iter().collect()
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::*;
    use crate::config::AppConfig;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), "Google")
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn user(first: Option<&str>) -> User {
        User {
            firstname: first.map(str::to_string),
            ..User::default()
        }
    }

    fn session(id: &str, attempted: u32, total: u32) -> Session {
        Session {
            session_id: RecordId::new(id),
            sections: Some(vec!["Quant".into()]),
            topics: None,
            created_at: "2024-01-02T00:00:00Z".into(),
            duration: None,
            attempted_count: attempted,
            question_count: total,
            correct_count: 0,
        }
    }

    fn question_payload(id: &str) -> QuestionPayload {
        QuestionPayload {
            data: Question {
                id: RecordId::new(id),
                question_text: "Which is prime?".into(),
                section: "quant".into(),
                options: vec![
                    AnswerOption { option: "4".into() },
                    AnswerOption { option: "7".into() },
                ],
            },
            session_info: Some(SessionInfo {
                session_id: RecordId::new("s1"),
                attempted_count: 1,
                question_count: 5,
                time_left: None,
            }),
        }
    }

    fn unauthorized() -> AppEvent {
        AppEvent::Api(ApiReply::Sessions(Err(ApiError::Unauthorized)))
    }

    #[test]
    fn startup_with_token_fetches_user() {
        let mut s = state();
        let actions = startup(&mut s, true, None);
        assert_eq!(actions, vec![Action::Api(ApiRequest::FetchUser)]);
        assert!(s.signed_in);
    }

    #[test]
    fn startup_with_target_opens_quiz() {
        let mut s = state();
        let target = QuestionTarget::Question(RecordId::new("q3"));
        let actions = startup(&mut s, false, Some(target.clone()));
        assert_eq!(actions, vec![Action::Api(ApiRequest::Question(target))]);
        assert_eq!(s.screen, Screen::Quiz);
    }

    #[test]
    fn user_without_name_gets_profile_form() {
        let mut s = state();
        handle_event(&mut s, AppEvent::Api(ApiReply::User(Ok(user(None)))));
        assert!(s.profile.is_some());
        // mandatory: Esc does not close it
        handle_event(&mut s, key(KeyCode::Esc));
        assert!(s.profile.is_some());
    }

    #[test]
    fn failed_user_fetch_evicts_token() {
        let mut s = state();
        s.signed_in = true;
        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::User(Err(ApiError::InvalidResponse("x".into())))),
        );
        assert_eq!(actions, vec![Action::Logout]);
        assert!(!s.signed_in);
    }

    #[test]
    fn sign_in_flow_goes_to_dashboard() {
        let mut s = state();
        let actions = handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(actions, vec![Action::SignIn]);
        assert!(s.landing.signing_in);

        let actions = handle_event(&mut s, AppEvent::SignedIn(Ok(user(Some("Ada")))));
        assert_eq!(actions, vec![Action::Api(ApiRequest::Sessions)]);
        assert_eq!(s.screen, Screen::Dashboard);
    }

    #[test]
    fn cancelled_sign_in_ignores_late_reply() {
        let mut s = state();
        handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(handle_event(&mut s, key(KeyCode::Esc)), vec![Action::CancelSignIn]);
        handle_event(&mut s, AppEvent::SignedIn(Ok(user(Some("Ada")))));
        assert!(!s.signed_in);
        assert_eq!(s.screen, Screen::Landing);
    }

    #[test]
    fn practice_requires_sign_in() {
        let mut s = state();
        handle_event(&mut s, key(KeyCode::Char('p')));
        assert_eq!(
            s.landing.message.as_deref(),
            Some("Please sign in to start practicing.")
        );
        assert_eq!(s.screen, Screen::Landing);
    }

    #[test]
    fn profile_submit_updates_user() {
        let mut s = state();
        s.signed_in = true;
        handle_event(&mut s, AppEvent::Api(ApiReply::User(Ok(user(None)))));
        for c in "Ada".chars() {
            handle_event(&mut s, key(KeyCode::Char(c)));
        }
        for _ in 0..3 {
            handle_event(&mut s, key(KeyCode::Tab));
        }
        let actions = handle_event(&mut s, key(KeyCode::Enter));
        let update = ProfileUpdate {
            firstname: "Ada".into(),
            lastname: String::new(),
            mobile_number: String::new(),
        };
        assert_eq!(actions, vec![Action::Api(ApiRequest::UpdateUser(update.clone()))]);

        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::ProfileUpdated {
                update,
                result: Ok(true),
            }),
        );
        assert!(s.profile.is_none());
        assert_eq!(s.user.as_ref().and_then(|u| u.firstname.as_deref()), Some("Ada"));
        assert_eq!(actions, vec![Action::Api(ApiRequest::Sessions)]);
    }

    #[test]
    fn empty_dashboard_redirects_to_create() {
        let mut s = state();
        open_dashboard(&mut s);
        let actions = handle_event(&mut s, AppEvent::Api(ApiReply::Sessions(Ok(vec![]))));
        assert_eq!(s.screen, Screen::CreateSession);
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn resume_only_for_unfinished_sessions() {
        let mut s = state();
        open_dashboard(&mut s);
        handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Sessions(Ok(vec![
                session("1", 10, 10),
                session("2", 3, 10),
            ]))),
        );
        assert!(handle_event(&mut s, key(KeyCode::Enter)).is_empty());
        assert_eq!(s.screen, Screen::Dashboard);

        handle_event(&mut s, key(KeyCode::Down));
        let actions = handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::Question(QuestionTarget::Session(
                RecordId::new("2")
            )))]
        );
        assert_eq!(s.screen, Screen::Quiz);
    }

    #[test]
    fn dashboard_failure_shows_message() {
        let mut s = state();
        open_dashboard(&mut s);
        handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Sessions(Err(ApiError::InvalidResponse(
                "Invalid response format".into(),
            )))),
        );
        assert_eq!(
            s.dashboard.error.as_deref(),
            Some(crate::app::forms::SESSIONS_FAILED)
        );
    }

    #[test]
    fn unauthorized_reply_returns_to_landing() {
        let mut s = state();
        s.signed_in = true;
        s.user = Some(user(Some("Ada")));
        open_dashboard(&mut s);
        handle_event(&mut s, unauthorized());
        assert_eq!(s.screen, Screen::Landing);
        assert!(!s.signed_in);
        assert!(s.user.is_none());

        // a second rejected reply changes nothing further
        let actions = handle_event(&mut s, unauthorized());
        assert!(actions.is_empty());
        assert_eq!(s.screen, Screen::Landing);
    }

    #[test]
    fn unauthorized_during_quiz_stops_ticker() {
        let mut s = state();
        let target = QuestionTarget::Session(RecordId::new("s1"));
        open_quiz(&mut s, Some(target.clone()));
        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Question {
                target,
                result: Ok(question_payload("q1")),
            }),
        );
        assert_eq!(actions, vec![Action::StartQuizTicker { generation: 1 }]);

        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Answer {
                question_id: RecordId::new("q1"),
                result: Err(ApiError::Unauthorized),
            }),
        );
        assert_eq!(actions, vec![Action::StopQuizTicker]);
        assert!(s.quiz.is_none());
        assert_eq!(s.screen, Screen::Landing);
    }

    #[test]
    fn quiz_round_trip_drives_ticker() {
        let mut s = state();
        let target = QuestionTarget::Session(RecordId::new("s1"));
        open_quiz(&mut s, Some(target.clone()));
        handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Question {
                target: target.clone(),
                result: Ok(question_payload("q1")),
            }),
        );
        assert_eq!(s.running_ticker, Some(1));

        handle_event(&mut s, AppEvent::QuizTick { generation: 1 });
        assert_eq!(s.quiz.as_ref().unwrap().question_secs(), 1);

        // confirm without selection: no request
        assert!(handle_event(&mut s, key(KeyCode::Enter)).is_empty());

        handle_event(&mut s, key(KeyCode::Char('b')));
        let actions = handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::SubmitAnswer {
                option: 'b',
                question_id: RecordId::new("q1"),
            })]
        );

        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Answer {
                question_id: RecordId::new("q1"),
                result: Ok(QuizResult {
                    answer: "B".into(),
                    solution_text: "7 is prime".into(),
                }),
            }),
        );
        assert_eq!(actions, vec![Action::StopQuizTicker]);
        assert_eq!(s.running_ticker, None);

        let actions = handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(actions, vec![Action::Api(ApiRequest::Question(target))]);
    }

    #[test]
    fn leaving_quiz_stops_ticker() {
        let mut s = state();
        let target = QuestionTarget::Session(RecordId::new("s1"));
        open_quiz(&mut s, Some(target.clone()));
        handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Question {
                target,
                result: Ok(question_payload("q1")),
            }),
        );
        let actions = handle_event(&mut s, key(KeyCode::Esc));
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::Sessions), Action::StopQuizTicker]
        );
        assert_eq!(s.screen, Screen::Dashboard);
    }

    #[test]
    fn create_session_submits_form() {
        let mut s = state();
        open_create(&mut s);
        s.create.focus = CreateField::Start;
        let actions = handle_event(&mut s, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::CreateSession(NewSession {
                duration_seconds: None,
                topic_ids: vec![],
                section_ids: vec![],
                number_of_questions: None,
            }))]
        );
        let actions = handle_event(
            &mut s,
            AppEvent::Api(ApiReply::SessionCreated(Ok(RecordId::new("88")))),
        );
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::Question(QuestionTarget::Session(
                RecordId::new("88")
            )))]
        );
    }

    #[test]
    fn picker_search_refetches() {
        let mut s = state();
        open_create(&mut s);
        handle_event(&mut s, key(KeyCode::Enter));
        assert!(s.create.sections.open);
        let actions = handle_event(&mut s, key(KeyCode::Char('q')));
        assert_eq!(
            actions,
            vec![Action::Api(ApiRequest::Sections {
                search: "q".into()
            })]
        );
        handle_event(
            &mut s,
            AppEvent::Api(ApiReply::Sections {
                search: "q".into(),
                result: Ok(vec![Section {
                    section_id: 1,
                    title: "Quant".into(),
                    count: 30,
                }]),
            }),
        );
        handle_event(&mut s, key(KeyCode::Enter));
        handle_event(&mut s, key(KeyCode::Esc));
        assert!(!s.create.sections.open);
        assert_eq!(s.create.sections.chosen_ids(), vec![1]);
        assert_eq!(s.screen, Screen::CreateSession);
    }

    #[test]
    fn picker_scroll_follows_terminal_height() {
        let mut s = state();
        handle_event(&mut s, AppEvent::Terminal(CEvent::Resize(80, 12)));
        let rows = picker_rows(s.viewport);
        assert_eq!(rows, 3);

        open_create(&mut s);
        handle_event(&mut s, key(KeyCode::Enter));
        let sections = (0..20)
            .map(|i| Section {
                section_id: i,
                title: format!("Section {i}"),
                count: 1,
            })
            .collect();
        s.create.sections.set_entries("", sections);
        for _ in 0..8 {
            handle_event(&mut s, key(KeyCode::Down));
        }
        let picker = &s.create.sections;
        assert_eq!(picker.cursor, 8);
        assert!(picker.cursor < picker.scroll_offset + rows);
        assert_eq!(picker.scroll_offset, 6);

        for _ in 0..4 {
            handle_event(&mut s, key(KeyCode::Up));
        }
        let picker = &s.create.sections;
        assert_eq!(picker.cursor, 4);
        assert_eq!(picker.scroll_offset, 4);
    }
}
