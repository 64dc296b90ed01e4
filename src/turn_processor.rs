//! Turns a participant answer into model feedback and a follow-up question
//!
//! Builds a bounded-context request (system prompt, the last few turns, the
//! wrapped answer), sends it, and reports a tagged outcome. Nothing here
//! touches the session; the runtime decides what to record.

use crate::config::ModelSettings;
use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService};
use crate::session::Conversation;
use crate::system_prompt::{build_system_prompt, wrap_answer, INTERVIEW_TOPICS};
use std::sync::Arc;

/// Number of prior turns sent with each request
pub const HISTORY_WINDOW: usize = 6;

/// What came back from the model for one answer
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Replied(String),
    Failed(LlmError),
}

pub struct TurnProcessor {
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    topic_count: usize,
    max_tokens: u32,
    temperature: f32,
    max_prompt_chars: usize,
}

impl TurnProcessor {
    pub fn new(llm: Arc<dyn LlmService>, settings: &ModelSettings) -> Self {
        Self::with_topics(llm, settings, INTERVIEW_TOPICS)
    }

    pub fn with_topics(llm: Arc<dyn LlmService>, settings: &ModelSettings, topics: &[&str]) -> Self {
        Self {
            llm,
            system_prompt: build_system_prompt(topics),
            topic_count: topics.len(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            max_prompt_chars: settings.max_prompt_chars,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topic_count
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Assemble the request for `answer` given the turns recorded so far.
    ///
    /// `max_prompt_chars` bounds every message after the system prompt. The
    /// raw answer is cut before wrapping so the follow-up instruction always
    /// survives; prior turns, newest first, fill whatever budget is left.
    pub fn build_request(&self, history: &Conversation, answer: &str) -> LlmRequest {
        let answer_budget = self
            .max_prompt_chars
            .saturating_sub(wrap_answer("").chars().count());
        let answer = match truncated_prefix(answer, answer_budget) {
            Some(prefix) => {
                tracing::warn!(
                    original_chars = answer.chars().count(),
                    max_chars = answer_budget,
                    "Answer truncated before sending"
                );
                prefix
            }
            None => answer,
        };
        let wrapped = wrap_answer(answer);

        let mut remaining = self.max_prompt_chars.saturating_sub(wrapped.chars().count());
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 1);
        for turn in history.recent(HISTORY_WINDOW).iter().rev() {
            if remaining == 0 {
                break;
            }
            let content = truncated_prefix(turn.content(), remaining).unwrap_or(turn.content());
            remaining -= content.chars().count();
            messages.push(LlmMessage {
                role: turn.role(),
                content: content.to_string(),
            });
        }
        messages.reverse();
        messages.push(LlmMessage::user(wrapped));

        LlmRequest {
            system: Some(self.system_prompt.clone()),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    /// Ask the model to respond to `answer`. No retry.
    pub async fn process(&self, history: &Conversation, answer: &str) -> TurnOutcome {
        let request = self.build_request(history, answer);
        match self.llm.complete(&request).await {
            Ok(response) => TurnOutcome::Replied(response.text),
            Err(e) => TurnOutcome::Failed(e),
        }
    }
}

/// The first `max_chars` characters of `text`, or `None` when it already fits
fn truncated_prefix(text: &str, max_chars: usize) -> Option<&str> {
    let (byte_idx, _) = text.char_indices().nth(max_chars)?;
    text.get(..byte_idx)
}
