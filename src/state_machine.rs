//! Chat conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! transition function decides, the chat runtime performs the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reply};
pub use event::Event;
pub use state::{ChatState, Language, Step};
pub use transition::transition;
