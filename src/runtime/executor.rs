//! Drives one event through the state machine and carries out its effects

use crate::llm::LlmError;
use crate::session::Session;
use crate::state_machine::{transition, Effect, Event, SessionContext, TransitionError, TransitionResult};
use crate::turn_processor::{TurnOutcome, TurnProcessor};

/// What the caller should know after an event has been fully handled
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Reply recorded for a submitted answer
    pub reply: Option<String>,
    /// The model call failed; the conversation was left as it was
    pub failure: Option<LlmError>,
}

/// Run `event` against `session`, following up with the model call when the
/// transition asks for one. The caller holds the session lock for the whole
/// call, so one session never sees two turns interleave.
pub async fn dispatch(
    session: &mut Session,
    context: &SessionContext,
    processor: &TurnProcessor,
    event: Event,
) -> Result<DispatchOutcome, TransitionError> {
    let mut outcome = DispatchOutcome::default();
    let mut next = Some(event);

    while let Some(event) = next.take() {
        let event_name = event.name();
        let from = session.phase();

        let result = transition(from, context, event).inspect_err(|e| {
            tracing::info!(
                session = %session.id(),
                event = event_name,
                phase = from.as_str(),
                error = %e,
                "Event rejected"
            );
        })?;

        tracing::debug!(
            session = %session.id(),
            event = event_name,
            from = from.as_str(),
            to = result.new_phase.as_str(),
            effects = result.effects.len(),
            "Session transition"
        );

        if let Some(answer) = apply_transition(session, result, &mut outcome) {
            next = Some(match processor.process(session.conversation(), &answer).await {
                TurnOutcome::Replied(reply) => Event::ReplyReceived { answer, reply },
                TurnOutcome::Failed(error) => Event::ReplyFailed { answer, error },
            });
        }
    }

    Ok(outcome)
}

/// Apply a transition's phase and effects to the session.
///
/// Returns the answer to send to the model when the transition requested a
/// reply.
pub fn apply_transition(
    session: &mut Session,
    result: TransitionResult,
    outcome: &mut DispatchOutcome,
) -> Option<String> {
    session.set_phase(result.new_phase);

    let mut pending = None;
    for effect in result.effects {
        match effect {
            Effect::RequestReply { answer } => pending = Some(answer),
            Effect::AppendExchange { answer, reply } => {
                session.append_exchange(answer, reply.clone());
                outcome.reply = Some(reply);
            }
            Effect::SetPrompt { prompt } => session.set_prompt(prompt),
            Effect::ReportFailure { error } => {
                tracing::warn!(
                    session = %session.id(),
                    kind = error.kind.as_str(),
                    error = %error.message,
                    "Turn failed, conversation unchanged"
                );
                outcome.failure = Some(error);
            }
            Effect::ResetSession => session.reset(),
        }
    }
    pending
}
