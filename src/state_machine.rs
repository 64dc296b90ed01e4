//! Session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` decides, the runtime carries out the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{SessionContext, SessionPhase};
pub use transition::{transition, TransitionError, TransitionResult};
