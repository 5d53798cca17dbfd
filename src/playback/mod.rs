//! Playback core: run selection, cursor, and the fixed-step scheduler.
//!
//! State transitions live in [`state`] as a pure function over an action
//! enum; [`controller`] wraps them in the single scheduling task that talks
//! to the rest of the app through channels.

mod controller;
mod state;

pub use controller::{run_controller, DEFAULT_POLL_INTERVAL};
pub use state::{Action, PlaybackState};
