//! Interviewer persona and the fixed topic list
//!
//! Topics drive the progress bar and are listed in the system prompt so the
//! model can steer towards areas the participant has not covered yet. They
//! are not asked as a literal sequence.

use std::fmt::Write;

/// Interview subject areas, in the order they are listed to the model
pub const INTERVIEW_TOPICS: &[&str] = &[
    "Background and current role in higher education",
    "Current use of AI tools in teaching and learning",
    "AI in assessment, feedback and academic integrity",
    "AI in research and scholarly work",
    "Institutional policy, guidance and staff training on AI",
    "Ethical concerns, bias and data privacy",
    "Impact of AI on students' skills and employability",
    "Future vision and recommendations for AI in higher education",
];

/// Base system prompt establishing the interviewer's role
const BASE_PROMPT: &str = r"You are an experienced and considerate interviewer in higher education, focusing on AI applications. Use British English in your responses, including spellings like 'democratised'. Ensure your responses are complete and not truncated.

After each user response, provide brief feedback and ask a relevant follow-up question based on their answer. Tailor your questions to the user's previous responses, avoiding repetition and exploring areas they haven't covered. Be adaptive and create a natural flow of conversation.";

/// Build the complete system prompt for an interview over `topics`.
pub fn build_system_prompt(topics: &[&str]) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    if !topics.is_empty() {
        prompt.push_str("\n\n<interview_topics>\n");
        prompt.push_str("Over the course of the interview, make sure these topics are covered:\n");
        for (i, topic) in topics.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {topic}", i + 1);
        }
        prompt.push_str("</interview_topics>");
    }

    prompt
}

/// Wrap a participant's answer in the instruction sent alongside it
pub fn wrap_answer(answer: &str) -> String {
    format!("User's answer: {answer}\nProvide feedback and ask a follow-up question.")
}
