//! Core conversation state machine
//!
//! Pure transitions: given a session and the customer's text, produce the
//! next session plus a presentation-independent reply.

mod effect;
pub mod input;
mod reply;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use reply::Reply;
pub use state::{ConvState, Session};
pub use transition::{
    escalate, transition, ConvContext, TransitionResult, DEFAULT_CONFIRM_TOKEN,
    DEFAULT_RESTART_TOKEN,
};
