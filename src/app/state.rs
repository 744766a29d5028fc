use crate::api::model::User;
use crate::app::forms::{CreateSessionForm, DashboardState, LandingState, ProfileForm};
use crate::app::quiz::QuizMachine;
use crate::config::AppConfig;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Dashboard,
    CreateSession,
    Quiz,
}

pub struct AppState {
    pub config: AppConfig,
    pub screen: Screen,
    pub user: Option<User>,
    pub signed_in: bool,
    /// Name of the configured identity provider.
    pub provider_name: String,
    pub landing: LandingState,
    /// Profile form overlay; captures input while open.
    pub profile: Option<ProfileForm>,
    pub dashboard: DashboardState,
    pub create: CreateSessionForm,
    pub quiz: Option<QuizMachine>,
    /// Generation of the quiz ticker the event loop is running, if any.
    pub running_ticker: Option<u64>,
    pub tick_count: u64,
    pub should_quit: bool,
    pub dirty: bool,
    pub status_message: Option<String>,
    /// Last known terminal size; popups size themselves from it.
    pub viewport: Rect,
}

impl AppState {
    pub fn new(config: AppConfig, provider_name: impl Into<String>) -> Self {
        Self {
            config,
            screen: Screen::Landing,
            user: None,
            signed_in: false,
            provider_name: provider_name.into(),
            landing: LandingState::default(),
            profile: None,
            dashboard: DashboardState::default(),
            create: CreateSessionForm::default(),
            quiz: None,
            running_ticker: None,
            tick_count: 0,
            should_quit: false,
            dirty: true,
            status_message: None,
            viewport: Rect::new(0, 0, 80, 24),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(text.into());
        self.dirty = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        match &self.user {
            Some(user) => format!("Signed in as {}", user.display_name()),
            None if self.signed_in => "Signed in".to_string(),
            None => "Not signed in".to_string(),
        }
    }

    pub fn screen_name(&self) -> &'static str {
        if self.profile.is_some() {
            return "PROFILE";
        }
        match self.screen {
            Screen::Landing => "HOME",
            Screen::Dashboard => "DASHBOARD",
            Screen::CreateSession => "NEW SESSION",
            Screen::Quiz => "QUIZ",
        }
    }
}
