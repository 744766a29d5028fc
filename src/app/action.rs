use crate::api::dispatch::ApiRequest;

#[derive(Debug, PartialEq)]
pub enum Action {
    Api(ApiRequest),
    SignIn,
    CancelSignIn,
    /// Drop the bearer token from the session context and its store.
    Logout,
    StartQuizTicker { generation: u64 },
    StopQuizTicker,
    Quit,
}
