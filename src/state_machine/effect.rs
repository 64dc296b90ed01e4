//! Effects produced by state transitions

use crate::llm::LlmError;

/// Effects to be executed after state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Ask the model for feedback and a follow-up question
    RequestReply { answer: String },

    /// Append the user answer and the model reply as one exchange
    AppendExchange { answer: String, reply: String },

    /// Replace the prompt shown to the participant
    SetPrompt { prompt: String },

    /// Tell the caller the turn failed; the conversation is left untouched
    ReportFailure { error: LlmError },

    /// Wipe conversation and prompt
    ResetSession,
}

impl Effect {
    pub fn set_prompt(prompt: impl Into<String>) -> Self {
        Effect::SetPrompt {
            prompt: prompt.into(),
        }
    }
}
