//! Property-based tests for the state machine
//!
//! Random participant action sequences are driven through `transition` and
//! the runtime's effect application; session invariants must hold after
//! every step.

use super::*;
use crate::config::Secret;
use crate::llm::LlmError;
use crate::runtime::{apply_transition, DispatchOutcome};
use crate::session::{Role, Session, SessionId, OPENING_PROMPT};
use crate::system_prompt::INTERVIEW_TOPICS;
use proptest::prelude::*;

const PASSWORD: &str = "correct horse";

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new(&Secret::new(PASSWORD))
}

/// A participant action plus, for answers, how the model call turns out
#[derive(Debug, Clone)]
enum Action {
    Login(String),
    Consent,
    Answer { text: String, model_ok: bool },
    End,
    Restart,
}

/// Apply one action, completing the model round trip synchronously
fn step(
    session: &mut Session,
    ctx: &SessionContext,
    action: Action,
) -> Result<DispatchOutcome, TransitionError> {
    let mut outcome = DispatchOutcome::default();
    let (event, model_ok) = match action {
        Action::Login(p) => (Event::PasswordSubmitted { password: Secret::new(p) }, true),
        Action::Consent => (Event::ConsentGiven, true),
        Action::Answer { text, model_ok } => (Event::AnswerSubmitted { answer: text }, model_ok),
        Action::End => (Event::EndRequested, true),
        Action::Restart => (Event::RestartRequested, true),
    };

    let result = transition(session.phase(), ctx, event)?;
    if let Some(answer) = apply_transition(session, result, &mut outcome) {
        let follow_up = if model_ok {
            Event::ReplyReceived {
                reply: format!("feedback on {answer}"),
                answer,
            }
        } else {
            Event::ReplyFailed {
                answer,
                error: LlmError::network("Connection failed"),
            }
        };
        let result = transition(session.phase(), ctx, follow_up)?;
        assert!(apply_transition(session, result, &mut outcome).is_none());
    }
    Ok(outcome)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_password() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just(PASSWORD.to_string()),
        1 => "[a-z ]{0,16}",
    ]
}

fn arb_answer_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z][a-zA-Z ,.]{0,30}",
        1 => "[ \t\n]{0,4}",
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => arb_password().prop_map(Action::Login),
        2 => Just(Action::Consent),
        6 => (arb_answer_text(), any::<bool>())
            .prop_map(|(text, model_ok)| Action::Answer { text, model_ok }),
        1 => Just(Action::End),
        1 => Just(Action::Restart),
    ]
}

fn arb_phase() -> impl Strategy<Value = SessionPhase> {
    prop_oneof![
        Just(SessionPhase::Unauthenticated),
        Just(SessionPhase::Authenticated),
        Just(SessionPhase::Active),
        Just(SessionPhase::Ended),
    ]
}

fn assert_turns_alternate(session: &Session) {
    let turns = session.conversation().turns();
    assert_eq!(turns.len() % 2, 0, "odd number of turns");
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_session_invariants_hold(actions in proptest::collection::vec(arb_action(), 0..40)) {
        let ctx = test_context();
        let mut session = Session::new(SessionId::new());

        for action in actions {
            let len_before = session.conversation().len();
            let phase_before = session.phase();
            let prompt_before = session.current_prompt().to_string();

            let is_blank_answer = matches!(&action, Action::Answer { text, .. } if text.trim().is_empty());
            let result = step(&mut session, &ctx, action.clone());
            let len_after = session.conversation().len();

            match (&action, &result) {
                // Empty answers never mutate anything
                (Action::Answer { .. }, _) if is_blank_answer => {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(len_after, len_before);
                    prop_assert_eq!(session.current_prompt(), prompt_before.as_str());
                }
                (Action::Answer { model_ok: true, .. }, Ok(outcome)) => {
                    prop_assert_eq!(len_after, len_before + 2);
                    prop_assert!(outcome.reply.is_some());
                    prop_assert_eq!(Some(session.current_prompt()), outcome.reply.as_deref());
                }
                (Action::Answer { model_ok: false, .. }, Ok(outcome)) => {
                    prop_assert_eq!(len_after, len_before);
                    prop_assert!(outcome.failure.is_some());
                }
                (Action::Restart, _) => {
                    prop_assert!(result.is_ok());
                    prop_assert!(!session.is_authenticated());
                    prop_assert!(session.conversation().is_empty());
                    prop_assert_eq!(session.current_prompt(), OPENING_PROMPT);
                }
                (Action::Login(p), _) if phase_before == SessionPhase::Unauthenticated => {
                    prop_assert_eq!(session.is_authenticated(), p == PASSWORD);
                }
                _ => {}
            }

            // Rejected events never change the session
            if result.is_err() {
                prop_assert_eq!(session.phase(), phase_before);
                prop_assert_eq!(len_after, len_before);
            }

            // Once authenticated, only restart can lock the session again
            if phase_before.is_authenticated() && !matches!(action, Action::Restart) {
                prop_assert!(session.is_authenticated());
            }

            assert_turns_alternate(&session);
            let progress = session.progress(INTERVIEW_TOPICS.len());
            prop_assert!((0.0..=1.0).contains(&progress.fraction));
        }
    }

    #[test]
    fn prop_restart_always_locks(phase in arb_phase()) {
        let result = transition(phase, &test_context(), Event::RestartRequested).unwrap();
        prop_assert_eq!(result.new_phase, SessionPhase::Unauthenticated);
    }

    #[test]
    fn prop_wrong_password_never_authenticates(guess in "[a-z ]{0,16}") {
        prop_assume!(guess != PASSWORD);
        let result = transition(
            SessionPhase::Unauthenticated,
            &test_context(),
            Event::PasswordSubmitted { password: Secret::new(guess) },
        );
        prop_assert_eq!(result.unwrap_err(), TransitionError::IncorrectPassword);
    }

    #[test]
    fn prop_answers_only_request_replies_when_consented(phase in arb_phase(), text in arb_answer_text()) {
        let result = transition(phase, &test_context(), Event::AnswerSubmitted { answer: text.clone() });
        match result {
            Ok(r) => {
                prop_assert!(phase.accepts_answers());
                prop_assert!(!text.trim().is_empty());
                prop_assert_eq!(r.new_phase, phase);
                let requests_reply = matches!(r.effects.as_slice(), [Effect::RequestReply { .. }]);
                prop_assert!(requests_reply);
            }
            Err(_) => {
                prop_assert!(!phase.accepts_answers() || text.trim().is_empty());
            }
        }
    }
}
