//! Wire records exchanged with the practice API.
//!
//! Every record is an immutable snapshot of server state. Fields the server
//! may omit carry `#[serde(default)]` so a sparse payload still decodes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque record identifier. The API sends ids as either JSON strings or
/// integers depending on the endpoint, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Int(n) => RecordId(n.to_string()),
        })
    }
}

/// A past or in-progress practice session as listed on the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub session_id: RecordId,
    #[serde(default)]
    pub sections: Option<Vec<String>>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub attempted_count: u32,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub correct_count: u32,
}

impl Session {
    /// A session can be resumed until every question has been attempted.
    /// Untouched sessions are always resumable, even when empty.
    pub fn is_resumable(&self) -> bool {
        self.attempted_count == 0 || self.attempted_count != self.question_count
    }

    /// Section and topic labels joined with `" / "`.
    pub fn labels(&self) -> String {
        self.sections
            .iter()
            .chain(self.topics.iter())
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Calendar date the session was created on, if the timestamp parses.
    pub fn created_date(&self) -> Option<NaiveDate> {
        parse_date(&self.created_at)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// One answer choice as sent by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerOption {
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    pub id: RecordId,
    pub question_text: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

/// Progress of the session a question was served from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfo {
    pub session_id: RecordId,
    #[serde(default)]
    pub attempted_count: u32,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub time_left: Option<i64>,
}

/// Reply of `GET /question`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionPayload {
    pub data: Question,
    #[serde(default)]
    pub session_info: Option<SessionInfo>,
}

/// Outcome of an answer submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizResult {
    /// Uppercase letter of the correct option.
    pub answer: String,
    #[serde(default)]
    pub solution_text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Section {
    pub section_id: i64,
    pub title: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topic {
    pub topic_id: i64,
    pub title: String,
    #[serde(default)]
    pub count: u32,
}

/// Signed-in user profile. Extra server fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Users without a first name must fill in the profile form first.
    pub fn needs_profile(&self) -> bool {
        self.firstname.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    pub fn display_name(&self) -> String {
        match (self.firstname.as_deref(), self.lastname.as_deref()) {
            (Some(f), Some(l)) if !l.is_empty() => format!("{} {}", f, l),
            (Some(f), _) if !f.is_empty() => f.to_string(),
            _ => self.email.clone().unwrap_or_else(|| "signed in".to_string()),
        }
    }
}

/// Body of `PUT /user`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub firstname: String,
    pub lastname: String,
    pub mobile_number: String,
}

/// Body of `POST /session`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSession {
    pub duration_seconds: Option<u64>,
    pub topic_ids: Vec<i64>,
    pub section_ids: Vec<i64>,
    pub number_of_questions: Option<u32>,
}

/// Reply of `POST /signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupReply {
    pub jwt_token: String,
    #[serde(default)]
    pub data: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSession {
    pub session_id: RecordId,
}

/// Which question the quiz screen should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionTarget {
    Session(RecordId),
    Question(RecordId),
}

impl QuestionTarget {
    pub(crate) fn query(&self) -> (&'static str, &str) {
        match self {
            QuestionTarget::Session(id) => ("session_id", id.as_str()),
            QuestionTarget::Question(id) => ("question_id", id.as_str()),
        }
    }
}

/// Letter label for the option at `index`: 0 → `A`, 1 → `B`, ...
pub fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
