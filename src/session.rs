//! Per-browser interview session
//!
//! A `Session` owns the phase, the append-only conversation and the prompt
//! currently shown to the participant. Only the runtime mutates it, and only
//! by applying effects produced by the state machine.

use crate::state_machine::SessionPhase;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub use crate::llm::MessageRole as Role;

/// Prompt shown before the first answer
pub const OPENING_PROMPT: &str = "Let's begin the interview. Can you please introduce yourself, your role in higher education, and your interest in AI?";

/// Prompt shown once the participant ends the interview
pub const ENDED_PROMPT: &str = "Interview ended";

/// Confirmation shown alongside the transcript once the interview has ended
pub const COMPLETION_MESSAGE: &str =
    "Interview completed! Thank you for your insights on AI in education.";

/// Opaque identifier carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only, ordered sequence of turns
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn user_turn_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role == Role::User)
            .count()
    }

    /// The last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Append a user answer and the reply to it as one unit
    fn push_exchange(&mut self, answer: impl Into<String>, reply: impl Into<String>) {
        self.turns.reserve(2);
        self.turns.push(Turn::new(Role::User, answer));
        self.turns.push(Turn::new(Role::Assistant, reply));
    }

    fn clear(&mut self) {
        self.turns.clear();
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut conversation = Self::default();
        for (answer, reply) in pairs {
            conversation.push_exchange(*answer, *reply);
        }
        conversation
    }
}

/// Interview progress derived from the conversation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// `answered / total`, clamped to `[0, 1]`
    pub fraction: f64,
}

impl Progress {
    pub fn of(conversation: &Conversation, total: usize) -> Self {
        let answered = conversation.user_turn_count();
        #[allow(clippy::cast_precision_loss)] // counts are tiny
        let fraction = if total == 0 {
            1.0
        } else {
            (answered as f64 / total as f64).clamp(0.0, 1.0)
        };
        Self {
            answered,
            total,
            fraction,
        }
    }

    pub fn label(&self) -> String {
        format!("{} out of {} questions answered", self.answered, self.total)
    }
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    phase: SessionPhase,
    conversation: Conversation,
    current_prompt: String,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            phase: SessionPhase::Unauthenticated,
            conversation: Conversation::default(),
            current_prompt: OPENING_PROMPT.to_string(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn progress(&self, topic_count: usize) -> Progress {
        Progress::of(&self.conversation, topic_count)
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.current_prompt = prompt.into();
    }

    pub(crate) fn append_exchange(&mut self, answer: impl Into<String>, reply: impl Into<String>) {
        self.conversation.push_exchange(answer, reply);
    }

    /// Drop everything back to a fresh, unauthenticated session
    pub(crate) fn reset(&mut self) {
        self.phase = SessionPhase::Unauthenticated;
        self.conversation.clear();
        self.current_prompt = OPENING_PROMPT.to_string();
    }
}
