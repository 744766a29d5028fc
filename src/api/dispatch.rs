//! Runs API calls off the event loop.
//!
//! Each [`ApiRequest`] is executed on its own tokio task; the outcome comes
//! back through the app event channel as an [`ApiReply`] so the handler
//! never awaits.

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::model::*;
use crate::app::event::AppEvent;
use crate::auth::provider::{AuthError, Authenticator};
use crate::auth::store::StoreError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    FetchUser,
    UpdateUser(ProfileUpdate),
    Sections { search: String },
    Topics { search: String },
    CreateSession(NewSession),
    Sessions,
    Question(QuestionTarget),
    SubmitAnswer { option: char, question_id: RecordId },
}

impl ApiRequest {
    fn name(&self) -> &'static str {
        match self {
            ApiRequest::FetchUser => "fetch_user",
            ApiRequest::UpdateUser(_) => "update_user",
            ApiRequest::Sections { .. } => "sections",
            ApiRequest::Topics { .. } => "topics",
            ApiRequest::CreateSession(_) => "create_session",
            ApiRequest::Sessions => "sessions",
            ApiRequest::Question(_) => "question",
            ApiRequest::SubmitAnswer { .. } => "submit_answer",
        }
    }
}

/// Outcome of an [`ApiRequest`], tagged with whatever the handler needs to
/// match it to the screen state that asked for it.
#[derive(Debug)]
pub enum ApiReply {
    User(Result<User, ApiError>),
    ProfileUpdated {
        update: ProfileUpdate,
        result: Result<bool, ApiError>,
    },
    Sections {
        search: String,
        result: Result<Vec<Section>, ApiError>,
    },
    Topics {
        search: String,
        result: Result<Vec<Topic>, ApiError>,
    },
    SessionCreated(Result<RecordId, ApiError>),
    Sessions(Result<Vec<Session>, ApiError>),
    Question {
        target: QuestionTarget,
        result: Result<QuestionPayload, ApiError>,
    },
    Answer {
        question_id: RecordId,
        result: Result<QuizResult, ApiError>,
    },
}

impl ApiReply {
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiReply::User(r) => r.as_ref().err(),
            ApiReply::ProfileUpdated { result, .. } => result.as_ref().err(),
            ApiReply::Sections { result, .. } => result.as_ref().err(),
            ApiReply::Topics { result, .. } => result.as_ref().err(),
            ApiReply::SessionCreated(r) => r.as_ref().err(),
            ApiReply::Sessions(r) => r.as_ref().err(),
            ApiReply::Question { result, .. } => result.as_ref().err(),
            ApiReply::Answer { result, .. } => result.as_ref().err(),
        }
    }
}

pub async fn perform(client: &ApiClient, request: ApiRequest) -> ApiReply {
    match request {
        ApiRequest::FetchUser => ApiReply::User(client.fetch_user().await),
        ApiRequest::UpdateUser(update) => {
            let result = client.update_user(&update).await;
            ApiReply::ProfileUpdated { update, result }
        }
        ApiRequest::Sections { search } => {
            let result = client.sections(&search).await;
            ApiReply::Sections { search, result }
        }
        ApiRequest::Topics { search } => {
            let result = client.topics(&search).await;
            ApiReply::Topics { search, result }
        }
        ApiRequest::CreateSession(session) => {
            ApiReply::SessionCreated(client.create_session(&session).await)
        }
        ApiRequest::Sessions => ApiReply::Sessions(client.sessions().await),
        ApiRequest::Question(target) => {
            let result = client.question(&target).await;
            ApiReply::Question { target, result }
        }
        ApiRequest::SubmitAnswer {
            option,
            question_id,
        } => {
            let result = client.submit_answer(option, &question_id).await;
            ApiReply::Answer {
                question_id,
                result,
            }
        }
    }
}

pub fn spawn_request(
    client: ApiClient,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    request: ApiRequest,
) {
    tokio::spawn(async move {
        let name = request.name();
        tracing::debug!(request = name, "api request");
        let reply = perform(&client, request).await;
        if let Some(e) = reply.error() {
            tracing::warn!(request = name, error = %e, "api request failed");
        }
        let _ = event_tx.send(AppEvent::Api(reply));
    });
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not store credentials: {0}")]
    Store(#[from] StoreError),
}

/// Obtain a credential from `authenticator`, exchange it at `/signup`, and
/// install the returned bearer token. The handle can be aborted to cancel.
pub fn spawn_sign_in(
    client: ApiClient,
    authenticator: Arc<dyn Authenticator>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = sign_in(&client, authenticator.as_ref()).await;
        match &result {
            Ok(_) => tracing::info!(provider = authenticator.name(), "signed in"),
            Err(e) => tracing::warn!(provider = authenticator.name(), error = %e, "sign-in failed"),
        }
        let _ = event_tx.send(AppEvent::SignedIn(result));
    })
}

async fn sign_in(client: &ApiClient, authenticator: &dyn Authenticator) -> Result<User, SignInError> {
    let credential = authenticator.authenticate().await?;
    let reply = client.signup(&credential.0).await?;
    client.context().sign_in(reply.jwt_token)?;
    Ok(reply.data.unwrap_or_default())
}
