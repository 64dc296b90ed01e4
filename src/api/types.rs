//! API request and response types

use crate::session::{Progress, Session, Turn, COMPLETION_MESSAGE};
use crate::state_machine::SessionPhase;
use crate::transcript::TranscriptFormat;
use serde::{Deserialize, Serialize};

/// Request to unlock the interview
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Request to submit an answer
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Query for transcript export
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptQuery {
    #[serde(default)]
    pub format: TranscriptFormat,
}

/// Progress bar data
#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub answered: usize,
    pub total: usize,
    pub fraction: f64,
    pub label: String,
}

impl From<Progress> for ProgressView {
    fn from(progress: Progress) -> Self {
        Self {
            label: progress.label(),
            answered: progress.answered,
            total: progress.total,
            fraction: progress.fraction,
        }
    }
}

/// Everything the page needs to render. Interview content is withheld
/// until the password has been accepted.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressView>,
    /// Thank-you note, present once the interview has ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<&'static str>,
    pub transcript: Vec<Turn>,
}

impl SessionView {
    pub fn new(session: &Session, topic_count: usize) -> Self {
        if !session.is_authenticated() {
            return Self {
                phase: session.phase(),
                authenticated: false,
                current_prompt: None,
                progress: None,
                completion_message: None,
                transcript: Vec::new(),
            };
        }

        Self {
            phase: session.phase(),
            authenticated: true,
            current_prompt: Some(session.current_prompt().to_string()),
            progress: Some(session.progress(topic_count).into()),
            completion_message: (session.phase() == SessionPhase::Ended)
                .then_some(COMPLETION_MESSAGE),
            transcript: session.conversation().turns().to_vec(),
        }
    }
}

/// Tagged result of submitting an answer
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerResponse {
    Replied {
        reply: String,
        session: SessionView,
    },
    Failed {
        error_kind: &'static str,
        error: String,
        session: SessionView,
    },
}

/// Response with the fixed topic list
#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<&'static str>,
}

/// Response for version info
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
