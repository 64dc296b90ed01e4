//! Transcript export
//!
//! Renders the conversation as CSV or Markdown and packs it into a `data:`
//! link the browser can download directly. Decoding the link's payload gives
//! back the rendered transcript byte for byte.

use crate::session::{Role, Turn};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    #[default]
    Csv,
    Markdown,
}

impl TranscriptFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            TranscriptFormat::Csv => "text/csv",
            TranscriptFormat::Markdown => "text/markdown",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            TranscriptFormat::Csv => "interview_transcript.csv",
            TranscriptFormat::Markdown => "interview_transcript.md",
        }
    }
}

/// A rendered transcript ready to hand to the browser
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptExport {
    pub format: TranscriptFormat,
    pub filename: &'static str,
    pub content: String,
    /// `data:` URI carrying `content` base64-encoded
    pub href: String,
}

impl TranscriptExport {
    pub fn new(turns: &[Turn], format: TranscriptFormat, exported_at: DateTime<Utc>) -> Self {
        let content = match format {
            TranscriptFormat::Csv => render_csv(turns),
            TranscriptFormat::Markdown => render_markdown(turns, exported_at),
        };
        let href = data_uri(format.mime_type(), &content);
        Self {
            format,
            filename: format.filename(),
            content,
            href,
        }
    }
}

/// `role,content` rows in conversation order, with a header row
pub fn render_csv(turns: &[Turn]) -> String {
    let mut out = String::from("role,content\n");
    for turn in turns {
        out.push_str(turn.role().as_str());
        out.push(',');
        push_csv_field(&mut out, turn.content());
        out.push('\n');
    }
    out
}

fn push_csv_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

pub fn render_markdown(turns: &[Turn], exported_at: DateTime<Utc>) -> String {
    let mut out = String::from("# Interview Transcript\n\n");
    let _ = writeln!(out, "_Exported {}_", exported_at.format("%Y-%m-%d %H:%M UTC"));

    for turn in turns {
        out.push_str("\n---\n\n");
        let _ = writeln!(out, "**{}:** {}", speaker(turn.role()), turn.content());
    }
    out
}

/// Capitalised role name as shown in the transcript view
pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

fn data_uri(mime: &str, content: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(content.as_bytes()))
}
