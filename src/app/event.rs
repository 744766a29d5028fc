use crate::api::dispatch::{ApiReply, SignInError};
use crate::api::model::User;
use crate::auth::provider::DevicePrompt;
use crossterm::event::Event as CrosstermEvent;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Reply to an API request
    Api(ApiReply),

    /// Sign-in progress
    DevicePrompt(DevicePrompt),
    SignedIn(Result<User, SignInError>),

    /// One second elapsed on the quiz ticker for question `generation`
    QuizTick { generation: u64 },

    /// Tick for UI refresh
    Tick,
}
