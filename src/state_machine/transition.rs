//! Pure state transition function

use super::{Effect, Event, SessionContext, SessionPhase};
use crate::session::ENDED_PROMPT;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_phase: SessionPhase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(phase: SessionPhase) -> Self {
        Self {
            new_phase: phase,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. None of them change the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("Enter the access password first.")]
    NotAuthenticated,
    #[error("Please confirm consent before answering.")]
    ConsentRequired,
    #[error("Please provide an answer before submitting.")]
    EmptyAnswer,
}

/// Pure transition function
///
/// Given the same phase, context and event it always produces the same
/// result, with no I/O.
pub fn transition(
    phase: SessionPhase,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (phase, event) {
        // ============================================================
        // Restart is accepted everywhere
        // ============================================================
        (_, Event::RestartRequested) => Ok(
            TransitionResult::new(SessionPhase::Unauthenticated).with_effect(Effect::ResetSession)
        ),

        // ============================================================
        // Authentication
        // ============================================================
        (SessionPhase::Unauthenticated, Event::PasswordSubmitted { password }) => {
            if context.password_matches(password.expose()) {
                Ok(TransitionResult::new(SessionPhase::Authenticated))
            } else {
                Err(TransitionError::IncorrectPassword)
            }
        }

        // Already past the gate: nothing to do
        (phase, Event::PasswordSubmitted { .. }) => Ok(TransitionResult::new(phase)),

        (SessionPhase::Unauthenticated, _) => Err(TransitionError::NotAuthenticated),

        // ============================================================
        // Consent
        // ============================================================
        (SessionPhase::Authenticated, Event::ConsentGiven) => {
            Ok(TransitionResult::new(SessionPhase::Active))
        }

        (phase @ (SessionPhase::Active | SessionPhase::Ended), Event::ConsentGiven) => {
            Ok(TransitionResult::new(phase))
        }

        (SessionPhase::Authenticated, _) => Err(TransitionError::ConsentRequired),

        // ============================================================
        // Answers (Active and Ended)
        // ============================================================
        (phase, Event::AnswerSubmitted { answer }) => {
            if answer.trim().is_empty() {
                return Err(TransitionError::EmptyAnswer);
            }
            Ok(TransitionResult::new(phase).with_effect(Effect::RequestReply { answer }))
        }

        (phase, Event::ReplyReceived { answer, reply }) => Ok(TransitionResult::new(phase)
            .with_effect(Effect::AppendExchange {
                answer,
                reply: reply.clone(),
            })
            .with_effect(Effect::set_prompt(reply))),

        (phase, Event::ReplyFailed { error, .. }) => {
            Ok(TransitionResult::new(phase).with_effect(Effect::ReportFailure { error }))
        }

        // ============================================================
        // Ending
        // ============================================================
        (SessionPhase::Active, Event::EndRequested) => Ok(
            TransitionResult::new(SessionPhase::Ended).with_effect(Effect::set_prompt(ENDED_PROMPT))
        ),

        (SessionPhase::Ended, Event::EndRequested) => Ok(TransitionResult::new(SessionPhase::Ended)),
    }
}
