//! Runtime that owns every live interview session
//!
//! Sessions live in memory only. Each one sits behind its own async mutex,
//! held across a whole turn, so submits within a session are serialized while
//! different sessions proceed independently. Only sessions that passed the
//! password gate are registered; idle ones expire lazily.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{apply_transition, dispatch, DispatchOutcome};

use crate::session::{Session, SessionId};
use crate::state_machine::{Event, SessionContext, TransitionError};
use crate::turn_processor::TurnProcessor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Registry entry for one browser session
struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// A live session bound to the current request
pub struct SessionHandle {
    pub id: SessionId,
    pub session: Arc<Mutex<Session>>,
}

/// Manager for all interview sessions
pub struct SessionManager {
    context: SessionContext,
    processor: TurnProcessor,
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(context: SessionContext, processor: TurnProcessor, ttl: Duration) -> Self {
        Self {
            context,
            processor,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.processor.topic_count()
    }

    pub fn model_id(&self) -> &str {
        self.processor.model_id()
    }

    /// Find the live session for `id`, refreshing its idle timer
    pub async fn find(&self, id: SessionId) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);

        let slot = sessions.get_mut(&id)?;
        slot.last_seen = now;
        Some(SessionHandle {
            id,
            session: Arc::clone(&slot.session),
        })
    }

    /// Start tracking `session`. Only sessions that got past the password
    /// gate are registered.
    pub async fn adopt(&self, session: Session) -> SessionHandle {
        let now = Instant::now();
        let id = session.id();
        let session = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(
            id,
            SessionSlot {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        tracing::info!(session = %id, active_sessions = sessions.len(), "Session created");

        SessionHandle { id, session }
    }

    fn prune(&self, sessions: &mut HashMap<SessionId, SessionSlot>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, slot| now.saturating_duration_since(slot.last_seen) < self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, remaining = sessions.len(), "Expired idle sessions");
        }
    }

    /// Handle one participant event on an already locked session
    pub async fn dispatch(
        &self,
        session: &mut Session,
        event: Event,
    ) -> Result<DispatchOutcome, TransitionError> {
        dispatch(session, &self.context, &self.processor, event).await
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
