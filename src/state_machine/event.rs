//! Events that can occur in a session

use crate::config::Secret;
use crate::llm::LlmError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Participant events
    PasswordSubmitted {
        password: Secret,
    },
    ConsentGiven,
    AnswerSubmitted {
        answer: String,
    },
    EndRequested,
    RestartRequested,

    // Model events
    ReplyReceived {
        answer: String,
        reply: String,
    },
    ReplyFailed {
        answer: String,
        error: LlmError,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::PasswordSubmitted { .. } => "password_submitted",
            Event::ConsentGiven => "consent_given",
            Event::AnswerSubmitted { .. } => "answer_submitted",
            Event::EndRequested => "end_requested",
            Event::RestartRequested => "restart_requested",
            Event::ReplyReceived { .. } => "reply_received",
            Event::ReplyFailed { .. } => "reply_failed",
        }
    }
}
