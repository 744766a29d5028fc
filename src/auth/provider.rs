//! Identity providers.
//!
//! The API only needs an identity-provider credential to hand to `/signup`.
//! [`Authenticator`] hides how that credential is obtained so providers can
//! be swapped without touching the rest of the client.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

const GOOGLE_DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Identity-provider credential (for Google, an ID token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(pub String);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sign-in was denied")]
    Denied,
    #[error("sign-in code expired before it was approved")]
    Expired,
    #[error("identity provider is not configured: {0}")]
    NotConfigured(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Human-readable provider name for the landing screen.
    fn name(&self) -> &str;

    async fn authenticate(&self) -> Result<Credential, AuthError>;
}

/// Uses a credential supplied up front (command line or environment).
pub struct StaticAuthenticator {
    credential: String,
}

impl StaticAuthenticator {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    fn name(&self) -> &str {
        "provided credential"
    }

    async fn authenticate(&self) -> Result<Credential, AuthError> {
        let credential = self.credential.trim();
        if credential.is_empty() {
            return Err(AuthError::NotConfigured("empty credential".into()));
        }
        Ok(Credential(credential.to_string()))
    }
}

/// What the user must do to approve a device sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePrompt {
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
}

pub type PromptSink = Arc<dyn Fn(DevicePrompt) + Send + Sync>;

#[derive(Debug, Deserialize)]
struct DeviceCodeReply {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_uri")]
    verification_url: String,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
}

fn default_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Next step of the device-flow polling loop for a given token reply error.
#[derive(Debug, PartialEq, Eq)]
enum PollStep {
    Wait,
    SlowDown,
    Fail,
}

fn poll_step(error: &str) -> PollStep {
    match error {
        "authorization_pending" => PollStep::Wait,
        "slow_down" => PollStep::SlowDown,
        _ => PollStep::Fail,
    }
}

/// Google sign-in through the OAuth 2.0 device authorization grant.
///
/// The user approves the sign-in on another device by entering the code
/// reported through the prompt sink at the verification URL.
pub struct GoogleDeviceAuthenticator {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    scopes: String,
    prompt: PromptSink,
}

impl GoogleDeviceAuthenticator {
    pub fn new(client_id: String, client_secret: String, scopes: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            scopes,
            prompt: Arc::new(|_| {}),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptSink) -> Self {
        self.prompt = prompt;
        self
    }

    async fn request_device_code(&self) -> Result<DeviceCodeReply, AuthError> {
        let response = self
            .http
            .post(GOOGLE_DEVICE_CODE_URL)
            .form(&[("client_id", self.client_id.as_str()), ("scope", self.scopes.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(body));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Authenticator for GoogleDeviceAuthenticator {
    fn name(&self) -> &str {
        "Google"
    }

    async fn authenticate(&self) -> Result<Credential, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::NotConfigured("google_client_id is not set".into()));
        }

        let device = self.request_device_code().await?;
        tracing::info!(url = %device.verification_url, "device sign-in started");
        (self.prompt)(DevicePrompt {
            user_code: device.user_code.clone(),
            verification_url: device.verification_url.clone(),
            expires_in: device.expires_in,
        });

        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = Duration::from_secs(device.interval.max(1));

        loop {
            tokio::time::sleep(interval).await;
            if Instant::now() >= deadline {
                return Err(AuthError::Expired);
            }

            let reply: TokenReply = self
                .http
                .post(GOOGLE_TOKEN_URL)
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("device_code", device.device_code.as_str()),
                    ("grant_type", DEVICE_GRANT_TYPE),
                ])
                .send()
                .await?
                .json()
                .await?;

            if let Some(id_token) = reply.id_token {
                return Ok(Credential(id_token));
            }

            let error = reply.error.unwrap_or_default();
            match poll_step(&error) {
                PollStep::Wait => {}
                PollStep::SlowDown => interval += Duration::from_secs(5),
                PollStep::Fail => {
                    return Err(match error.as_str() {
                        "access_denied" => AuthError::Denied,
                        "expired_token" => AuthError::Expired,
                        _ => AuthError::Provider(
                            reply.error_description.unwrap_or(error),
                        ),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_trimmed_credential() {
        let auth = StaticAuthenticator::new("  eyJhbGci  ");
        assert_eq!(auth.authenticate().await.unwrap(), Credential("eyJhbGci".into()));
        assert!(matches!(
            StaticAuthenticator::new("").authenticate().await,
            Err(AuthError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn google_requires_client_id() {
        let auth = GoogleDeviceAuthenticator::new(String::new(), String::new(), "openid".into());
        assert!(matches!(
            auth.authenticate().await,
            Err(AuthError::NotConfigured(_))
        ));
    }

    #[test]
    fn polling_errors() {
        assert_eq!(poll_step("authorization_pending"), PollStep::Wait);
        assert_eq!(poll_step("slow_down"), PollStep::SlowDown);
        assert_eq!(poll_step("access_denied"), PollStep::Fail);
        assert_eq!(poll_step(""), PollStep::Fail);
    }

    #[test]
    fn device_reply_accepts_uri_alias() {
        let reply: DeviceCodeReply = serde_json::from_str(
            r#"{"device_code": "d", "user_code": "ABC-DEF",
                "verification_uri": "https://www.google.com/device", "expires_in": 1800}"#,
        )
        .unwrap();
        assert_eq!(reply.verification_url, "https://www.google.com/device");
        assert_eq!(reply.interval, 5);
    }
}
