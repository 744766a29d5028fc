//! REST client for the practice API.
//!
//! Wraps a reqwest [`Client`] with the configured base URL and the shared
//! [`SessionContext`]. Every reply passes through [`check_reply`], which
//! evicts the bearer token when the server answers 401.

use crate::api::error::ApiError;
use crate::api::model::*;
use crate::auth::context::SessionContext;
use crate::config::ApiConfig;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Standard `{ code, data }` reply wrapper.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: Option<u16>,
    data: T,
}

#[derive(Debug, Deserialize)]
struct CodeOnly {
    #[serde(default)]
    code: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    ctx: SessionContext,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, ctx: SessionContext) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mockme/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: join_base(&config.base_url, &config.prefix),
            ctx,
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send with the current bearer token attached, if any.
    async fn execute_authorized<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let token = self.ctx.token();
        let builder = match &token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        self.send(builder, token.as_deref()).await
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder, None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        sent_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        check_reply(status, &body, &self.ctx, sent_token)?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {e}")))
    }

    /// Exchange an identity-provider credential for a bearer token.
    pub async fn signup(&self, credential: &str) -> Result<SignupReply, ApiError> {
        let body = serde_json::json!({ "token": credential });
        let req = self.http.post(self.endpoint("signup")).json(&body);
        self.execute(req).await
    }

    pub async fn fetch_user(&self) -> Result<User, ApiError> {
        let req = self.http.get(self.endpoint("user"));
        let env: Envelope<User> = self.execute_authorized(req).await?;
        Ok(env.data)
    }

    /// Returns `true` when the server confirmed the update with code 200.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<bool, ApiError> {
        let req = self.http.put(self.endpoint("user")).json(update);
        let reply: CodeOnly = self.execute_authorized(req).await?;
        Ok(reply.code.unwrap_or(200) == 200)
    }

    pub async fn sections(&self, search: &str) -> Result<Vec<Section>, ApiError> {
        let mut req = self.http.get(self.endpoint("sections"));
        if !search.is_empty() {
            req = req.query(&[("search_section", search)]);
        }
        let env: Envelope<Vec<Section>> = self.execute_authorized(req).await?;
        Ok(env.data)
    }

    pub async fn topics(&self, search: &str) -> Result<Vec<Topic>, ApiError> {
        let mut req = self.http.get(self.endpoint("topics"));
        if !search.is_empty() {
            req = req.query(&[("search_topic", search)]);
        }
        let env: Envelope<Vec<Topic>> = self.execute_authorized(req).await?;
        Ok(env.data)
    }

    pub async fn create_session(&self, session: &NewSession) -> Result<RecordId, ApiError> {
        let req = self.http.post(self.endpoint("session")).json(session);
        let env: Envelope<CreatedSession> = self.execute_authorized(req).await?;
        Ok(env.data.session_id)
    }

    pub async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
        let req = self.http.get(self.endpoint("session"));
        let env: Envelope<serde_json::Value> = self.execute_authorized(req).await?;
        if !env.data.is_array() {
            return Err(ApiError::InvalidResponse("Invalid response format".into()));
        }
        serde_json::from_value(env.data)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse sessions: {e}")))
    }

    pub async fn question(&self, target: &QuestionTarget) -> Result<QuestionPayload, ApiError> {
        let req = self
            .http
            .get(self.endpoint("question"))
            .query(&[target.query()]);
        self.execute_authorized(req).await
    }

    /// Submit `option` (a lowercase letter) for `question_id`.
    pub async fn submit_answer(
        &self,
        option: char,
        question_id: &RecordId,
    ) -> Result<QuizResult, ApiError> {
        let option = option.to_ascii_lowercase().to_string();
        let req = self.http.get(self.endpoint("answer")).query(&[
            ("option", option.as_str()),
            ("question_id", question_id.as_str()),
        ]);
        let env: Envelope<QuizResult> = self.execute_authorized(req).await?;
        Ok(env.data)
    }
}

fn join_base(base_url: &str, prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, prefix)
    }
}

/// Classify a raw reply.
///
/// A 401 status or a body carrying `"code": 401` evicts the session
/// context and yields [`ApiError::Unauthorized`]. When the request carried
/// `sent_token`, only that token is evicted. Other non-success statuses
/// become [`ApiError::Status`].
pub fn check_reply(
    status: StatusCode,
    body: &[u8],
    ctx: &SessionContext,
    sent_token: Option<&str>,
) -> Result<(), ApiError> {
    let body_code = serde_json::from_slice::<CodeOnly>(body)
        .ok()
        .and_then(|c| c.code);

    if status == StatusCode::UNAUTHORIZED || body_code == Some(401) {
        let evicted = match sent_token {
            Some(token) => ctx.evict_token(token),
            None => ctx.evict(),
        };
        if evicted {
            tracing::warn!(%status, "server rejected credentials");
        }
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        let text = String::from_utf8_lossy(body);
        let message: String = text.chars().take(200).collect();
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str, prefix: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base.into(),
            prefix: prefix.into(),
            timeout_secs: 5,
        };
        ApiClient::new(&config, SessionContext::in_memory(None)).unwrap()
    }

    #[test]
    fn endpoint_joins_prefix() {
        assert_eq!(
            client("https://api.example.com/", "/mockme").endpoint("question"),
            "https://api.example.com/mockme/question"
        );
        assert_eq!(
            client("http://localhost:8000", "").endpoint("/user"),
            "http://localhost:8000/user"
        );
    }

    #[test]
    fn body_code_401_evicts_once() {
        let ctx = SessionContext::in_memory(Some("tok".into()));
        let body = br#"{"code": 401, "message": "token expired"}"#;

        let first = check_reply(StatusCode::OK, body, &ctx, Some("tok"));
        assert!(matches!(first, Err(ApiError::Unauthorized)));
        assert!(!ctx.is_authenticated());

        // a second rejected request still reports 401 but has nothing to clear
        let second = check_reply(StatusCode::UNAUTHORIZED, b"", &ctx, Some("tok"));
        assert!(matches!(second, Err(ApiError::Unauthorized)));
        assert!(!ctx.evict());
    }

    #[test]
    fn late_401_for_old_token_keeps_new_sign_in() {
        let ctx = SessionContext::in_memory(Some("new".into()));
        let res = check_reply(StatusCode::UNAUTHORIZED, b"", &ctx, Some("old"));
        assert!(res.unwrap_err().is_unauthorized());
        assert_eq!(ctx.token().as_deref(), Some("new"));
    }

    #[test]
    fn http_401_without_body_evicts() {
        let ctx = SessionContext::in_memory(Some("tok".into()));
        let res = check_reply(StatusCode::UNAUTHORIZED, b"not json", &ctx, None);
        assert!(res.unwrap_err().is_unauthorized());
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn server_errors_keep_token() {
        let ctx = SessionContext::in_memory(Some("tok".into()));
        let res = check_reply(StatusCode::INTERNAL_SERVER_ERROR, b"oops", &ctx, Some("tok"));
        match res {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(ctx.is_authenticated());
        assert!(check_reply(StatusCode::OK, br#"{"code": 200}"#, &ctx, Some("tok")).is_ok());
    }

    #[test]
    fn envelope_decodes_question_payload() {
        let body = r#"{"data": {"id": 9, "question_text": "2+2?<br>Pick one",
                       "section": "quant", "options": [{"option": "3"}, {"option": "4"}]},
                       "session_info": {"session_id": "s1", "attempted_count": 1,
                       "question_count": 10, "time_left": 600}}"#;
        let payload: QuestionPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.data.options.len(), 2);
        assert_eq!(payload.session_info.unwrap().time_left, Some(600));
    }
}
