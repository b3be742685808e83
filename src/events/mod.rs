//! Event handling for Strader.
//!
//! Terminal input is polled by [`EventHandler`] and turned into store
//! actions, with a tick emitted whenever the tick rate passes without input.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, KeyBinding, Modifiers};
