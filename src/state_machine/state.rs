//! Session phase and the immutable context transitions are evaluated against

use crate::config::Secret;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Where a session sits in the interview lifecycle
///
/// `Unauthenticated -> Authenticated -> Active <-> Ended`, with restart
/// returning every phase to `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the access password
    Unauthenticated,
    /// Password accepted, consent not yet given
    Authenticated,
    /// Interview in progress
    Active,
    /// Participant pressed "End Interview". Display-only: answers are still accepted.
    Ended,
}

impl SessionPhase {
    pub fn is_authenticated(self) -> bool {
        !matches!(self, SessionPhase::Unauthenticated)
    }

    pub fn accepts_answers(self) -> bool {
        matches!(self, SessionPhase::Active | SessionPhase::Ended)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::Active => "active",
            SessionPhase::Ended => "ended",
        }
    }
}

/// Process-wide facts every transition may consult
#[derive(Debug, Clone)]
pub struct SessionContext {
    password_digest: [u8; 32],
}

impl SessionContext {
    pub fn new(access_password: &Secret) -> Self {
        Self {
            password_digest: digest(access_password.expose()),
        }
    }

    /// Compare digests so the comparison never short-circuits on the guess length
    pub fn password_matches(&self, guess: &str) -> bool {
        let guess = digest(guess);
        guess
            .iter()
            .zip(self.password_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
